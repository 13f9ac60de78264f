//! HTTP webhook channel.
//!
//! Posts every notice to a configured URL, either as the serialized
//! [`Notice`] or through a minijinja body template.

use std::collections::HashMap;

use crate::templating::{TemplateContext, TemplateRenderer};
use crate::traits::{Notice, Notifier, NotifyError, Severity};

/// Delivers notices as JSON over HTTP.
///
/// Environment variable references (`${VAR_NAME}`) in the URL and header
/// values are resolved at construction time.
#[derive(Debug)]
pub struct WebhookNotifier {
    /// Target URL (env vars already resolved).
    url: String,
    /// Custom headers to include on every request.
    headers: HashMap<String, String>,
    /// Optional minijinja body template; the notice is serialized directly otherwise.
    body_template: Option<String>,
    renderer: TemplateRenderer,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a new webhook notifier.
    ///
    /// Missing env vars and invalid body templates produce
    /// [`NotifyError::Config`].
    pub fn new(
        url: String,
        headers: HashMap<String, String>,
        body_template: Option<String>,
    ) -> Result<Self, NotifyError> {
        let resolved_url = resolve_env_vars(&url)?;

        let mut resolved_headers = HashMap::with_capacity(headers.len());
        for (key, value) in &headers {
            resolved_headers.insert(key.clone(), resolve_env_vars(value)?);
        }

        let renderer = TemplateRenderer::new();
        if let Some(ref tmpl) = body_template {
            renderer
                .validate(tmpl)
                .map_err(|e| NotifyError::Config(format!("invalid body template: {e}")))?;
        }

        Ok(Self {
            url: resolved_url,
            headers: resolved_headers,
            body_template,
            renderer,
            client: reqwest::Client::new(),
        })
    }

    /// Construct from config-level primitives (no custom headers).
    pub fn from_config(url: String, body_template: Option<String>) -> Result<Self, NotifyError> {
        Self::new(url, HashMap::new(), body_template)
    }

    fn render_body(&self, notice: &Notice) -> Result<String, NotifyError> {
        match &self.body_template {
            Some(tmpl) => self.renderer.render(tmpl, &TemplateContext::from(notice)),
            None => serde_json::to_string(notice)
                .map_err(|e| NotifyError::Config(format!("failed to serialize notice: {e}"))),
        }
    }

    /// Deliver one notice, surfacing failures to the caller.
    pub async fn deliver(&self, notice: &Notice) -> Result<(), NotifyError> {
        let body = self.render_body(notice)?;

        let mut request = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NotifyError::Config(format!(
                "webhook returned {status}: {body_text}"
            )));
        }

        tracing::debug!(url = %self.url, %status, "webhook notice delivered");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        let notice = Notice::new(message, severity);
        if let Err(e) = self.deliver(&notice).await {
            tracing::warn!(url = %self.url, error = %e, "webhook notice delivery failed");
        }
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}

/// Resolve `${VAR_NAME}` patterns in a string using `std::env::var`.
///
/// Returns an error if a referenced variable is not set.
fn resolve_env_vars(input: &str) -> Result<String, NotifyError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                var_name.push(c);
            }
            if !closed {
                return Err(NotifyError::Config(format!(
                    "unclosed env var reference in: {input}"
                )));
            }
            let value = std::env::var(&var_name).map_err(|_| {
                NotifyError::Config(format!("env var not found: {var_name}"))
            })?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}
