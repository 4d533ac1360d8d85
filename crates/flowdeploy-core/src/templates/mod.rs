//! Bundled flow templates.

mod registry;

pub use registry::{FlowTemplate, TemplateSummary, get, list};
