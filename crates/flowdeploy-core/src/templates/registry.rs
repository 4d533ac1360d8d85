//! Fixed table of deployable flow templates.
//!
//! Definitions are embedded at compile time and parsed once; the table
//! is read-only and list order is declaration order.

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

/// A bundled flow template.
#[derive(Debug)]
pub struct FlowTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Flow resource as exported from the source account. Never mutated;
    /// the transform works on a copy.
    pub raw_definition: Value,
}

/// Listing entry returned by the templates route.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub available: bool,
}

static TEMPLATES: Lazy<Vec<FlowTemplate>> = Lazy::new(|| {
    vec![
        FlowTemplate {
            id: "abandoned-cart",
            name: "Abandoned Cart",
            description: "Recover abandoned carts with email reminders",
            raw_definition: parse_definition(include_str!("definitions/abandoned-cart.json")),
        },
        FlowTemplate {
            id: "post-purchase",
            name: "Post-Purchase Thank You",
            description: "Thank customers after their first purchase",
            raw_definition: parse_definition(include_str!("definitions/post-purchase.json")),
        },
        FlowTemplate {
            id: "upsell",
            name: "Upsell",
            description: "Increase order value with product recommendations",
            raw_definition: parse_definition(include_str!("definitions/upsell.json")),
        },
        FlowTemplate {
            id: "site-abandon",
            name: "Site Abandonment",
            description: "Re-engage visitors who left without purchasing",
            raw_definition: parse_definition(include_str!("definitions/site-abandon.json")),
        },
        FlowTemplate {
            id: "customer-winback",
            name: "Customer Winback",
            description: "Win back customers who haven't purchased recently",
            raw_definition: parse_definition(include_str!("definitions/customer-winback.json")),
        },
        FlowTemplate {
            id: "browse-abandonment",
            name: "Browse Abandonment",
            description: "Remind customers of products they viewed",
            raw_definition: parse_definition(include_str!("definitions/browse-abandonment.json")),
        },
        FlowTemplate {
            id: "abandoned-checkout",
            name: "Abandoned Checkout",
            description: "Recover checkouts that were started but not completed",
            raw_definition: parse_definition(include_str!("definitions/abandoned-checkout.json")),
        },
    ]
});

fn parse_definition(raw: &str) -> Value {
    serde_json::from_str(raw).expect("bundled flow definition is valid JSON")
}

/// Look up a template by id.
pub fn get(template_id: &str) -> Option<&'static FlowTemplate> {
    TEMPLATES.iter().find(|template| template.id == template_id)
}

/// List all templates in registry order.
pub fn list() -> Vec<TemplateSummary> {
    TEMPLATES
        .iter()
        .map(|template| TemplateSummary {
            id: template.id,
            name: template.name,
            description: template.description,
            available: true,
        })
        .collect()
}
