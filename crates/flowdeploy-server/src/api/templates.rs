use axum::Json;
use flowdeploy_core::templates;
use flowdeploy_core::templates::TemplateSummary;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TemplatesResponse {
    pub templates: Vec<TemplateSummary>,
}

// GET|POST /templates. The listing needs no API key and no upstream call.
pub async fn list_templates() -> Json<TemplatesResponse> {
    Json(TemplatesResponse {
        templates: templates::list(),
    })
}
