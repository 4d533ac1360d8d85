//! Error types for FlowDeploy operations

use thiserror::Error;

/// FlowDeploy error taxonomy
#[derive(Error, Debug)]
pub enum Error {
    /// Request rejected before any upstream call was made.
    #[error("{0}")]
    Validation(String),

    /// Klaviyo answered with a non-success status.
    #[error("{detail}")]
    Upstream { status: u16, detail: String },

    /// Klaviyo answered 2xx but the body did not have the expected shape.
    #[error("Unexpected Klaviyo response: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for FlowDeploy operations
pub type Result<T> = std::result::Result<T, Error>;
