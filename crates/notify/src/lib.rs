//! User-facing status messages for bulk actions.
//!
//! This crate provides:
//! - `Notifier` trait: fire-and-forget `notify(message, severity)`
//! - Console, log, in-memory and webhook channels
//! - Minijinja rendering for webhook bodies
//! - `Dispatcher` that fans one message out to several channels

pub mod console;
pub mod dispatcher;
pub mod memory;
pub mod templating;
pub mod traits;
pub mod webhook;

pub use console::{ConsoleNotifier, LogNotifier};
pub use dispatcher::Dispatcher;
pub use memory::MemoryNotifier;
pub use traits::{Notice, Notifier, NotifyError, Severity};
pub use webhook::WebhookNotifier;
