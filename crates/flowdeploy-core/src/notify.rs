//! Slack deploy notifications.
//!
//! Best-effort side channel: failures are logged and swallowed, never
//! surfaced to the caller.

use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

/// Context for a deploy audit message.
#[derive(Debug, Clone)]
pub struct DeployNotification {
    pub user_email: String,
    pub account_name: String,
    pub template_names: Vec<String>,
    pub deployed: usize,
    pub requested: usize,
}

/// Posts deploy audit messages to a Slack incoming webhook.
pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: Client,
}

impl SlackNotifier {
    /// `None` disables the sink entirely.
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client: Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Send the deploy audit message. Never fails: a missing webhook or
    /// an unreachable Slack endpoint only produces a log line.
    pub async fn notify_deploy(&self, notification: DeployNotification) {
        let Some(webhook_url) = self.webhook_url.as_deref() else {
            debug!("Slack webhook not configured, skipping notification");
            return;
        };

        let message = json!({
            "blocks": [
                {
                    "type": "section",
                    "text": { "type": "mrkdwn", "text": "*Klaviyo Flow Builder Used*" }
                },
                {
                    "type": "section",
                    "fields": [
                        {
                            "type": "mrkdwn",
                            "text": format!("*User:*\n{}", notification.user_email)
                        },
                        {
                            "type": "mrkdwn",
                            "text": format!("*Account:*\n{}", notification.account_name)
                        },
                        {
                            "type": "mrkdwn",
                            "text": format!(
                                "*Flows Deployed:*\n{} of {}",
                                notification.deployed, notification.requested
                            )
                        },
                        {
                            "type": "mrkdwn",
                            "text": format!(
                                "*Selected Flows:*\n{}",
                                notification.template_names.join(", ")
                            )
                        }
                    ]
                },
                {
                    "type": "context",
                    "elements": [
                        {
                            "type": "mrkdwn",
                            "text": format!("Used at {}", Utc::now().to_rfc3339())
                        }
                    ]
                }
            ]
        });

        match self.client.post(webhook_url).json(&message).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Slack notification sent");
            }
            Ok(response) => {
                warn!(status = %response.status(), "Slack webhook rejected notification");
            }
            Err(err) => {
                warn!("Failed to send Slack notification: {err}");
            }
        }
    }
}
