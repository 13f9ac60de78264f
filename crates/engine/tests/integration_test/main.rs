/// Integration tests for the cascade engine against an in-memory store:
/// child collection, cascades, delete fallback, triggering, paging and
/// instance bulk actions.

mod cascade;
mod collector;
mod helpers;
