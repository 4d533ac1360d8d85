use axum::{Json, extract::State};
use flowdeploy_core::klaviyo::contact_field;
use flowdeploy_core::notify::DeployNotification;
use flowdeploy_core::{Error, templates, transform};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::response::ApiResult;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub custom_name: Option<String>,
    /// Email of the person running the deploy, for the audit message.
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub success: bool,
    pub flow: Value,
}

// POST /deploy
pub async fn deploy(
    State(state): State<AppState>,
    Json(request): Json<DeployRequest>,
) -> ApiResult<Json<DeployResponse>> {
    let api_key = request
        .api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| Error::Validation("API key is required".to_string()))?;
    let template = request
        .template_id
        .as_deref()
        .and_then(templates::get)
        .ok_or_else(|| Error::Validation("Invalid template ID".to_string()))?;

    // The account must have a default sender configured before the flow
    // can send anything.
    let account = state.klaviyo.get_account(&api_key).await?;
    let sender_email = contact_field(&account, "default_sender_email");
    let sender_name = contact_field(&account, "default_sender_name");
    if sender_email.is_none() || sender_name.is_none() {
        return Err(Error::Validation(
            "Account is missing default sender email or name. Please configure these in Klaviyo settings."
                .to_string(),
        )
        .into());
    }

    let metric_map = state.klaviyo.list_metrics(&api_key).await?;
    let name = request.custom_name.as_deref().unwrap_or(template.name);
    let payload = transform::process_flow(&template.raw_definition, Some(name), Some(&metric_map));

    let flow = state.klaviyo.create_flow(&api_key, &payload).await?;

    info!(template = template.id, "Deployed flow template");

    let notification = DeployNotification {
        user_email: request
            .email
            .unwrap_or_else(|| "unknown@user.com".to_string()),
        account_name: contact_field(&account, "organization_name")
            .or(sender_name)
            .unwrap_or_else(|| "Unknown".to_string()),
        template_names: vec![template.name.to_string()],
        deployed: 1,
        requested: 1,
    };
    let notifier_state = state.clone();
    tokio::spawn(async move {
        notifier_state.notifier.notify_deploy(notification).await;
    });

    Ok(Json(DeployResponse {
        success: true,
        flow,
    }))
}
