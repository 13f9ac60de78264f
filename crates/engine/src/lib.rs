//! Cascading bulk state changes for templates, timers and their instances.
//!
//! The engine talks to the backend only through [`RecordStore`] and reports
//! to the user only through [`Notifier`].
//!
//! [`RecordStore`]: timekeeper_store::RecordStore
//! [`Notifier`]: timekeeper_notify::Notifier

pub mod actions;
pub mod aggregate;
pub mod cascade;
pub mod collector;
pub mod history;
pub mod outcome;
pub mod pager;
pub mod view;

pub use aggregate::{aggregate, Classification, LocalMutation, LocalPlan, Report, Summary};
pub use cascade::Cascade;
pub use collector::PageCollector;
pub use history::{ExecutionFilter, ExecutionHistory, ExecutionStats, OutcomeFilter};
pub use outcome::{CascadeAction, ErrorKind, Outcome, Removal};
pub use pager::{CountState, InstancePager, PagerError, PAGE_SIZES};
pub use view::ParentView;
