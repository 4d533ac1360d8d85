//! Runtime configuration, read from the environment once at startup and
//! injected into the components that need it.

use std::net::SocketAddr;

const SLACK_WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";
const BIND_ENV: &str = "FLOWDEPLOY_BIND";

/// Configuration for the FlowDeploy server
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,
    /// Slack incoming webhook for deploy notifications. `None` disables
    /// the notification sink.
    pub slack_webhook_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            slack_webhook_url: None,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        let bind = std::env::var(BIND_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_else(default_bind);
        let slack_webhook_url = std::env::var(SLACK_WEBHOOK_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());

        Self {
            bind,
            slack_webhook_url,
        }
    }
}

fn default_bind() -> SocketAddr {
    "0.0.0.0:3000".parse().expect("Invalid socket address")
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn default_config_has_notifications_disabled() {
        let config = Config::default();
        assert_eq!(config.bind.port(), 3000);
        assert!(config.slack_webhook_url.is_none());
    }
}
