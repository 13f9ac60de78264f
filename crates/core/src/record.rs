use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Parents ───────────────────────────────────────────────────

/// The two schedulable entity kinds that own a `suspended` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentKind {
    Template,
    Timer,
}

impl ParentKind {
    /// Collection path segment under `/api`.
    pub fn collection(&self) -> &'static str {
        match self {
            ParentKind::Template => "templates",
            ParentKind::Timer => "timers",
        }
    }

    /// Singular label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            ParentKind::Template => "template",
            ParentKind::Timer => "timer",
        }
    }

    /// Whether the backend spawns instances from records of this kind.
    pub fn owns_instances(&self) -> bool {
        matches!(self, ParentKind::Template)
    }
}

impl std::fmt::Display for ParentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn default_zone() -> String {
    "UTC".to_string()
}

/// `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn zone_or_utc<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|zone| zone.unwrap_or_else(default_zone))
}

/// A template or timer as stored by the backend.
///
/// Updates are full-body replacements, so fields this client does not
/// know about are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRecord {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    #[serde(default = "default_zone", deserialize_with = "zone_or_utc")]
    pub zone_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_time: Option<String>,
    #[serde(default)]
    pub suspended: bool,

    // Scope filters
    #[serde(default, deserialize_with = "null_as_default")]
    pub countries: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub regions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excluded_countries: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excluded_regions: Vec<String>,

    // Business filters
    #[serde(default, deserialize_with = "null_as_default")]
    pub flow_types: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_types: Vec<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ParentRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: None,
            cron_expression: None,
            zone_id: default_zone(),
            trigger_time: None,
            suspended: false,
            countries: Vec::new(),
            regions: Vec::new(),
            excluded_countries: Vec::new(),
            excluded_regions: Vec::new(),
            flow_types: Vec::new(),
            client_ids: Vec::new(),
            product_types: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Copy of this record with only the `suspended` flag changed.
    pub fn with_suspended(&self, suspended: bool) -> Self {
        Self {
            suspended,
            ..self.clone()
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.suspended {
            "SUSPENDED"
        } else {
            "ACTIVE"
        }
    }
}

// ── Instances ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Active,
    Suspended,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceStatus::Active => write!(f, "ACTIVE"),
            InstanceStatus::Suspended => write!(f, "SUSPENDED"),
            InstanceStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// An instance spawned from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub id: String,
    #[serde(rename = "templateId", alias = "parentId")]
    pub parent_id: String,
    pub status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

impl ChildRecord {
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>, status: InstanceStatus) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            status,
            last_success_at: None,
            zone_id: None,
            country: None,
            region: None,
            flow_type: None,
            client_id: None,
            product_type: None,
        }
    }
}

// ── Executions ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOutcome {
    Success,
    Failed,
    Skipped,
}

impl std::fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionOutcome::Success => write!(f, "SUCCESS"),
            ExecutionOutcome::Failed => write!(f, "FAILED"),
            ExecutionOutcome::Skipped => write!(f, "SKIPPED"),
        }
    }
}

impl std::str::FromStr for ExecutionOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUCCESS" => Ok(ExecutionOutcome::Success),
            "FAILED" => Ok(ExecutionOutcome::Failed),
            "SKIPPED" => Ok(ExecutionOutcome::Skipped),
            other => Err(format!("unknown execution outcome: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    Scheduled,
    Manual,
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerType::Scheduled => write!(f, "SCHEDULED"),
            TriggerType::Manual => write!(f, "MANUAL"),
        }
    }
}

impl std::str::FromStr for TriggerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SCHEDULED" => Ok(TriggerType::Scheduled),
            "MANUAL" => Ok(TriggerType::Manual),
            other => Err(format!("unknown trigger type: {other}")),
        }
    }
}

/// Immutable record of one run of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: String,
    #[serde(rename = "instanceId", alias = "parentId")]
    pub parent_id: String,
    pub scheduled_for: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outcome: Option<ExecutionOutcome>,
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ExecutionRecord {
    /// Wall time between start and finish, once both are known.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Short duration label: empty before start, `Running...` until finished.
    pub fn duration_label(&self) -> String {
        if self.started_at.is_none() {
            return String::new();
        }
        let Some(duration) = self.duration() else {
            return "Running...".to_string();
        };
        let ms = duration.num_milliseconds();
        if ms < 1_000 {
            return "< 1s".to_string();
        }
        let secs = (ms as f64 / 1000.0).round() as i64;
        if secs < 60 {
            format!("{secs}s")
        } else {
            format!("{}m {}s", secs / 60, secs % 60)
        }
    }
}

// ── Geo catalogs ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}
