use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Page size used when collecting every instance of a template.
pub const DEFAULT_COLLECT_PAGE_SIZE: u32 = 200;

/// Page size of the primary instance listing.
pub const DEFAULT_INSTANCE_PAGE_SIZE: u32 = 50;

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub api: ApiConfig,
    pub paging: PagingConfig,
    pub notify: NotifyConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TIMEKEEPER_PROFILE`. When set (e.g. `STAGING`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TIMEKEEPER_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            api: ApiConfig::from_env_profiled(p),
            paging: PagingConfig::from_env_profiled(p),
            notify: NotifyConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  api:     base_url={}, timeout={}s", self.api.base_url, self.api.timeout_seconds);
        tracing::info!(
            "  paging:  instance_page_size={}, collect_page_size={}",
            self.paging.instance_page_size,
            self.paging.collect_page_size
        );
        tracing::info!("  notify:  webhook={}", if self.notify.is_configured() { "set" } else { "(none)" });
    }
}

// ── API ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin; `/api/...` paths are appended to it.
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl ApiConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            base_url: profiled_env_or(p, "API_BASE_URL", "http://localhost:8080"),
            timeout_seconds: profiled_env_u64(p, "API_TIMEOUT_SECONDS", 30),
        }
    }
}

// ── Paging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    pub instance_page_size: u32,
    pub collect_page_size: u32,
}

impl PagingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            instance_page_size: profiled_env_u32(p, "INSTANCE_PAGE_SIZE", DEFAULT_INSTANCE_PAGE_SIZE),
            collect_page_size: profiled_env_u32(p, "COLLECT_PAGE_SIZE", DEFAULT_COLLECT_PAGE_SIZE)
                .max(1),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            instance_page_size: DEFAULT_INSTANCE_PAGE_SIZE,
            collect_page_size: DEFAULT_COLLECT_PAGE_SIZE,
        }
    }
}

// ── Notify ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Optional webhook that receives every status message as JSON.
    pub webhook_url: Option<String>,
    /// Optional minijinja body template for the webhook (e.g. Slack payloads).
    pub webhook_template: Option<String>,
}

impl NotifyConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            webhook_url: profiled_env_opt(p, "NOTIFY_WEBHOOK_URL"),
            webhook_template: profiled_env_opt(p, "NOTIFY_WEBHOOK_TEMPLATE"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}
