mod cli;
mod commands;
mod terminal;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use timekeeper_core::config::{load_dotenv, NotifyConfig};
use timekeeper_core::Config;
use timekeeper_notify::{ConsoleNotifier, Dispatcher, LogNotifier, WebhookNotifier};
use timekeeper_store::HttpRecordStore;

use crate::cli::CliArgs;
use crate::commands::Ctx;
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let mut config = match args.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.api.timeout_seconds = timeout;
    }
    if let Some(webhook) = &args.webhook {
        config.notify.webhook_url = Some(webhook.clone());
    }
    config.log_summary();

    let store = HttpRecordStore::from_config(&config.api).context("invalid API configuration")?;
    let notifier = build_notifier(&config.notify, args.quiet)?;
    debug!(channels = ?notifier.channel_names(), "notification channels ready");

    let terminal = Terminal::new();
    let ctx = Ctx {
        store: &store,
        notifier: &notifier,
        config: &config,
        terminal: &terminal,
    };

    let ok = commands::run(args.command, &ctx).await?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn build_notifier(config: &NotifyConfig, quiet: bool) -> Result<Dispatcher> {
    let mut dispatcher = Dispatcher::empty();
    if quiet {
        dispatcher.add_channel(Box::new(LogNotifier));
    } else {
        dispatcher.add_channel(Box::new(ConsoleNotifier));
    }
    if let Some(url) = &config.webhook_url {
        let webhook = WebhookNotifier::from_config(url.clone(), config.webhook_template.clone())
            .context("invalid webhook configuration")?;
        dispatcher.add_channel(Box::new(webhook));
    }
    Ok(dispatcher)
}
