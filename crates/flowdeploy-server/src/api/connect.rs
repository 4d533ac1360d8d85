use axum::{Json, extract::State};
use flowdeploy_core::klaviyo::contact_field;
use flowdeploy_core::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::response::ApiResult;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub success: bool,
    /// Account attributes as returned by Klaviyo.
    pub account: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
}

// POST /connect
pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> ApiResult<Json<ConnectResponse>> {
    let api_key = request
        .api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| Error::Validation("API key is required".to_string()))?;

    let account = state.klaviyo.get_account(&api_key).await?;
    let sender_email = contact_field(&account, "default_sender_email");
    let sender_name = contact_field(&account, "default_sender_name");

    info!("Connected Klaviyo account");

    Ok(Json(ConnectResponse {
        success: true,
        account,
        sender_email,
        sender_name,
    }))
}
