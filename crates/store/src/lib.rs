//! Record Store client for the scheduling backend.
//!
//! This crate provides:
//! - `RecordStore` trait: one async operation per entity kind and verb
//! - `HttpRecordStore`: the JSON-over-HTTP implementation
//!
//! Every operation is a single round trip. Retries are the caller's concern.

pub mod http;
pub mod traits;

pub use http::HttpRecordStore;
pub use traits::{BulkAction, RecordStore};
