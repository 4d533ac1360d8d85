#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use flowdeploy_core::Config;
use flowdeploy_core::klaviyo::KlaviyoClient;
use flowdeploy_core::notify::SlackNotifier;
use flowdeploy_server::api::state::AppCore;
use flowdeploy_server::router;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,flowdeploy_server=debug".into()),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting FlowDeploy server");

    let config = Config::from_env();
    let notifier = SlackNotifier::new(config.slack_webhook_url.clone());
    if !notifier.is_enabled() {
        tracing::info!("Slack webhook URL not configured, deploy notifications disabled");
    }

    let state = Arc::new(AppCore::new(KlaviyoClient::new(), notifier));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind FlowDeploy listen address");

    tracing::info!("FlowDeploy running on http://{}", config.bind);

    axum::serve(listener, app)
        .await
        .expect("Failed to run axum server");
}
