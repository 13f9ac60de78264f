//! Notifier trait definition and shared types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Errors raised while building or delivering through a channel.
///
/// These never reach callers of [`Notifier::notify`]; channels log them.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// How a status message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A status message as delivered to a channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl Notice {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            timestamp: Utc::now(),
        }
    }
}

/// Sink for user-facing status messages.
///
/// Delivery is best effort: implementations swallow (and log) their own
/// failures so a broken channel never affects the action being reported.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str, severity: Severity);

    /// Human-readable name for this channel (e.g., "webhook", "console").
    fn channel_name(&self) -> &str;
}

#[async_trait::async_trait]
impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    async fn notify(&self, message: &str, severity: Severity) {
        (**self).notify(message, severity).await
    }

    fn channel_name(&self) -> &str {
        (**self).channel_name()
    }
}
