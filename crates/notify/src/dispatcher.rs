//! Fans one status message out to every configured channel.
//!
//! Channels are awaited in order. A slow or failing channel only delays
//! the ones after it; channels log their own delivery failures.

use std::time::Instant;

use crate::traits::{Notifier, Severity};

/// A [`Notifier`] that forwards to a list of channels.
#[derive(Default)]
pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
}

impl Dispatcher {
    /// Create an empty dispatcher (messages are dropped).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_channels(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    pub fn add_channel(&mut self, channel: Box<dyn Notifier>) {
        self.channels.push(channel);
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.channel_name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait::async_trait]
impl Notifier for Dispatcher {
    async fn notify(&self, message: &str, severity: Severity) {
        if self.channels.is_empty() {
            tracing::debug!(%severity, "No notification channels configured");
            return;
        }

        for channel in &self.channels {
            let start = Instant::now();
            channel.notify(message, severity).await;
            tracing::trace!(
                channel = channel.channel_name(),
                duration_ms = start.elapsed().as_millis() as u64,
                "notice dispatched"
            );
        }
    }

    fn channel_name(&self) -> &str {
        "dispatcher"
    }
}
