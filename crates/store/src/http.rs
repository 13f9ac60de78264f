//! JSON-over-HTTP implementation of [`RecordStore`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use timekeeper_core::config::ApiConfig;
use timekeeper_core::{
    ChildRecord, Country, ExecutionRecord, ListQuery, Listing, ParentKind, ParentRecord, Region,
    StoreError,
};

use crate::traits::{BulkAction, RecordStore};

/// Client for the scheduling backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    base_url: String,
    base: Url,
    http: reqwest::Client,
}

/// Request body for the bulk endpoints.
#[derive(Serialize)]
struct IdsBody<'a> {
    ids: &'a [String],
}

impl HttpRecordStore {
    /// Create a client for `base_url` (the origin; `/api` is appended per call).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(StoreError::Config(format!(
                "base URL must start with http:// or https://, got '{base_url}'"
            )));
        }
        let base = Url::parse(&base_url)
            .map_err(|e| StoreError::Config(format!("invalid base URL '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::Config(format!("base URL '{base_url}' cannot carry a path")));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { base_url, base, http })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, StoreError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_seconds))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// URL of one parent record, with the id escaped as a single path segment.
    fn record_url(&self, kind: ParentKind, id: &str, suffix: Option<&str>) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always editable.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", kind.collection(), id])
                .extend(suffix);
        }
        url
    }

    /// Send the request and turn non-2xx answers into [`StoreError::Http`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let resp = request.send().await.map_err(transport_error)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = extract_error_message(status, &body);
            tracing::debug!(%status, %message, "record store returned non-2xx status");
            return Err(StoreError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        what: &'static str,
        request: RequestBuilder,
    ) -> Result<T, StoreError> {
        let resp = self.send(request).await?;
        let bytes = resp.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode {
            what,
            message: e.to_string(),
        })
    }

    async fn list<T: DeserializeOwned>(
        &self,
        what: &'static str,
        collection: &str,
        parent_key: &str,
        query: &ListQuery,
    ) -> Result<Listing<T>, StoreError> {
        let url = self.url(collection);
        tracing::debug!(%url, page = query.page, size = query.size, parent = ?query.parent_id, "listing");
        self.fetch(what, self.http.get(&url).query(&query_params(query, parent_key)))
            .await
    }
}

/// Encode a [`ListQuery`]; `parent_key` names the owner filter for the collection.
fn query_params(query: &ListQuery, parent_key: &str) -> Vec<(String, String)> {
    let mut params = vec![
        ("page".to_string(), query.page.to_string()),
        ("size".to_string(), query.size.to_string()),
    ];
    if let Some(parent_id) = &query.parent_id {
        params.push((parent_key.to_string(), parent_id.clone()));
    }
    params
}

/// Pick the most useful message out of an error response.
///
/// Prefers a JSON `message` field, then the raw body, then the status reason.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            if !message.is_empty() {
                return message.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Transport(format!("request timed out: {e}"))
    } else {
        StoreError::Transport(e.to_string())
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_parents(&self, kind: ParentKind) -> Result<Listing<ParentRecord>, StoreError> {
        let url = self.url(kind.collection());
        self.fetch(kind.collection(), self.http.get(&url)).await
    }

    async fn get_parent(&self, kind: ParentKind, id: &str) -> Result<ParentRecord, StoreError> {
        let url = self.record_url(kind, id, None);
        self.fetch(kind.collection(), self.http.get(url)).await
    }

    async fn create_parent(
        &self,
        kind: ParentKind,
        body: &ParentRecord,
    ) -> Result<ParentRecord, StoreError> {
        let url = self.url(kind.collection());
        self.fetch(kind.collection(), self.http.post(&url).json(body))
            .await
    }

    async fn update_parent(
        &self,
        kind: ParentKind,
        id: &str,
        body: &ParentRecord,
    ) -> Result<ParentRecord, StoreError> {
        let url = self.record_url(kind, id, None);
        self.fetch(kind.collection(), self.http.put(url).json(body))
            .await
    }

    async fn delete_parent(&self, kind: ParentKind, id: &str) -> Result<(), StoreError> {
        let url = self.record_url(kind, id, None);
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn trigger_parent(&self, kind: ParentKind, id: &str) -> Result<(), StoreError> {
        let url = self.record_url(kind, id, Some("_trigger"));
        self.send(self.http.post(url)).await?;
        Ok(())
    }

    async fn trigger_parents(&self, kind: ParentKind, ids: &[String]) -> Result<(), StoreError> {
        let url = self.url(&format!("{}/_trigger", kind.collection()));
        self.send(self.http.post(&url).json(&IdsBody { ids })).await?;
        Ok(())
    }

    async fn list_instances(&self, query: &ListQuery) -> Result<Listing<ChildRecord>, StoreError> {
        self.list("instances", "instances", "templateId", query).await
    }

    async fn bulk_instances(
        &self,
        action: BulkAction,
        ids: &[String],
    ) -> Result<Vec<ChildRecord>, StoreError> {
        let url = self.url(&format!("instances/{}", action.endpoint()));
        tracing::debug!(%url, count = ids.len(), "bulk instance action");
        self.fetch("instances", self.http.post(&url).json(&IdsBody { ids }))
            .await
    }

    async fn list_executions(
        &self,
        query: &ListQuery,
    ) -> Result<Listing<ExecutionRecord>, StoreError> {
        self.list("executions", "executions", "instanceId", query).await
    }

    async fn list_regions(&self) -> Result<Vec<Region>, StoreError> {
        let url = self.url("geo/regions");
        self.fetch("regions", self.http.get(&url)).await
    }

    async fn list_countries(&self, region: Option<&str>) -> Result<Vec<Country>, StoreError> {
        let url = self.url("geo/countries");
        let mut request = self.http.get(&url);
        if let Some(region) = region {
            request = request.query(&[("region", region)]);
        }
        self.fetch("countries", request).await
    }
}
