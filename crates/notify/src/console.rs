//! Terminal and log channels.

use crate::traits::{Notifier, Severity};

/// Prints messages for an interactive user: errors to stderr, the rest to stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "[ok]",
        Severity::Error => "[error]",
        Severity::Info => "[info]",
    }
}

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => eprintln!("{} {}", marker(severity), message),
            _ => println!("{} {}", marker(severity), message),
        }
    }

    fn channel_name(&self) -> &str {
        "console"
    }
}

/// Routes messages into `tracing`; errors at `warn`, everything else at `info`.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => tracing::warn!(%severity, "{message}"),
            _ => tracing::info!(%severity, "{message}"),
        }
    }

    fn channel_name(&self) -> &str {
        "log"
    }
}
