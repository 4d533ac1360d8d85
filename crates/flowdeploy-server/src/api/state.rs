use flowdeploy_core::klaviyo::KlaviyoClient;
use flowdeploy_core::notify::SlackNotifier;
use std::sync::Arc;

/// Application state shared across all API handlers
pub struct AppCore {
    pub klaviyo: KlaviyoClient,
    pub notifier: SlackNotifier,
}

impl AppCore {
    pub fn new(klaviyo: KlaviyoClient, notifier: SlackNotifier) -> Self {
        Self { klaviyo, notifier }
    }
}

pub type AppState = Arc<AppCore>;
