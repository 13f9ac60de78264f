use thiserror::Error;

/// Failure of a single Record Store round trip.
///
/// Cloneable so per-parent cascade outcomes can carry the error that
/// stopped them after the join has completed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The endpoint does not exist or does not accept the verb.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.status(), Some(404 | 405 | 501))
    }

    /// Human-readable message without the status prefix.
    pub fn message(&self) -> String {
        match self {
            StoreError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
