//! In-memory channel that records every notice.

use std::sync::Mutex;

use crate::traits::{Notice, Notifier, Severity};

/// Keeps delivered notices in order. Useful for assertions and for
/// front ends that render messages after an action completes.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }

    /// Drain and return recorded notices.
    pub fn take(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut n| std::mem::take(&mut *n))
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().ok().and_then(|n| n.last().cloned())
    }
}

#[async_trait::async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(Notice::new(message, severity));
        }
    }

    fn channel_name(&self) -> &str {
        "memory"
    }
}
