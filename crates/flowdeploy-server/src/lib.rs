//! HTTP surface for FlowDeploy.

pub mod api;

use axum::{
    Json, Router,
    http::{Method, StatusCode, header},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use api::response::ErrorBody;
use api::state::AppState;

#[derive(serde::Serialize)]
struct Health {
    status: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "flowdeploy is working!".to_string(),
    })
}

async fn endpoint_not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Endpoint not found".to_string(),
        }),
    )
}

/// Build the application router with CORS and the not-found fallback.
pub fn router(state: AppState) -> Router {
    // Configure CORS; pre-flight OPTIONS is answered by the layer
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/connect", post(api::connect::connect))
        .route(
            "/templates",
            get(api::templates::list_templates).post(api::templates::list_templates),
        )
        .route("/deploy", post(api::deploy::deploy))
        .fallback(endpoint_not_found)
        .layer(cors)
        .with_state(state)
}
