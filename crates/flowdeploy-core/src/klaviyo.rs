//! Minimal Klaviyo REST gateway.
//!
//! One attempt per call, no retry or backoff; upstream failures carry
//! the response status and the first structured error detail.

use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::HashMap;
use tracing::error;

use crate::error::{Error, Result};

const KLAVIYO_API_BASE: &str = "https://a.klaviyo.com/api";
const KLAVIYO_REVISION: &str = "2025-07-15";

/// Authenticated client for the Klaviyo REST API.
#[derive(Clone)]
pub struct KlaviyoClient {
    client: Client,
    base_url: String,
}

impl Default for KlaviyoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl KlaviyoClient {
    pub fn new() -> Self {
        Self::with_base_url(KLAVIYO_API_BASE)
    }

    /// Point the gateway at a different base URL. Used by tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Issue a single authenticated request and parse the JSON body.
    pub async fn request(
        &self,
        api_key: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Klaviyo-API-Key {api_key}"))
            .header("revision", KLAVIYO_REVISION)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = match extract_error_detail(&text) {
                Some(detail) => detail,
                None if text.trim().is_empty() => {
                    format!("Klaviyo request failed with status {status}")
                }
                None => text,
            };
            error!(%status, path, "Klaviyo request failed");
            return Err(Error::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the caller's account attributes.
    pub async fn get_account(&self, api_key: &str) -> Result<Value> {
        let accounts = self.request(api_key, Method::GET, "/accounts/", None).await?;
        accounts
            .get("data")
            .and_then(|data| data.get(0))
            .and_then(|account| account.get("attributes"))
            .cloned()
            .ok_or_else(|| Error::UnexpectedResponse("account listing is empty".to_string()))
    }

    /// List the account's metrics as a name-to-id map.
    pub async fn list_metrics(&self, api_key: &str) -> Result<HashMap<String, String>> {
        let metrics = self.request(api_key, Method::GET, "/metrics/", None).await?;

        let mut metric_map = HashMap::new();
        if let Some(entries) = metrics.get("data").and_then(Value::as_array) {
            for entry in entries {
                let name = entry
                    .get("attributes")
                    .and_then(|attributes| attributes.get("name"))
                    .and_then(Value::as_str);
                let id = entry.get("id").and_then(Value::as_str);
                if let (Some(name), Some(id)) = (name, id) {
                    metric_map.insert(name.to_string(), id.to_string());
                }
            }
        }
        Ok(metric_map)
    }

    /// Create a flow and return the created resource.
    pub async fn create_flow(&self, api_key: &str, payload: &Value) -> Result<Value> {
        let created = self
            .request(api_key, Method::POST, "/flows/", Some(payload))
            .await?;
        created
            .get("data")
            .cloned()
            .ok_or_else(|| Error::UnexpectedResponse("flow creation returned no data".to_string()))
    }
}

/// Read a field from the account's contact information block.
pub fn contact_field(account: &Value, field: &str) -> Option<String> {
    account
        .get("contact_information")
        .and_then(|info| info.get(field))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn extract_error_detail(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("errors")?
        .get(0)?
        .get("detail")?
        .as_str()
        .map(str::to_string)
}
