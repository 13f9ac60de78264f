//! Minijinja rendering for webhook bodies.
//!
//! Lets a webhook speak another service's payload format, e.g. a Slack
//! incoming webhook: `{"text": {{ message | tojson }}}`.
//!
//! Templates are arbitrary strings (not pre-registered), so a fresh
//! [`minijinja::Environment`] is created per render call.

use crate::traits::{Notice, NotifyError};

/// Context data available to body templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TemplateContext {
    pub message: String,
    /// `success`, `error` or `info`.
    pub severity: String,
    /// RFC 3339 timestamp of the notice.
    pub timestamp: String,
}

impl From<&Notice> for TemplateContext {
    fn from(notice: &Notice) -> Self {
        Self {
            message: notice.message.clone(),
            severity: notice.severity.to_string(),
            timestamp: notice.timestamp.to_rfc3339(),
        }
    }
}

/// Renders webhook body templates using minijinja.
#[derive(Debug, Default)]
pub struct TemplateRenderer {
    _private: (),
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.add_filter("lower", lower_filter);
        env.add_filter("upper", upper_filter);
        env.add_function("env", env_function);
        env
    }

    /// Render a template string for one notice.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the template is invalid or
    /// rendering fails.
    pub fn render(&self, template_str: &str, ctx: &TemplateContext) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(template_str, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Check template syntax without evaluating it.
    pub fn validate(&self, template_str: &str) -> Result<(), NotifyError> {
        let env = Self::build_env();
        env.template_from_str(template_str)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(())
    }
}

fn lower_filter(value: String) -> String {
    value.to_lowercase()
}

fn upper_filter(value: String) -> String {
    value.to_uppercase()
}

/// Global function: read an environment variable, empty when unset.
fn env_function(name: String) -> String {
    match std::env::var(&name) {
        Ok(val) => val,
        Err(_) => {
            tracing::warn!(var = %name, "Environment variable not found, returning empty string");
            String::new()
        }
    }
}
