//! FlowDeploy core: bundled flow templates, the deployment transform and
//! the Klaviyo gateway.

pub mod config;
pub mod error;
pub mod klaviyo;
pub mod notify;
pub mod templates;
pub mod transform;

pub use config::Config;
pub use error::{Error, Result};
