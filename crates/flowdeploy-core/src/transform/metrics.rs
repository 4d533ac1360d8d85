//! Metric reference remapping.
//!
//! The bundled fixtures reference metrics by the source account's ids.
//! A deploy rewrites them to the destination account's ids through the
//! name-to-id map built from the caller's metric listing.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::for_each_object;

/// Metric ids as they appear in the bundled fixtures, keyed to the
/// canonical metric names every Klaviyo account shares.
static SOURCE_METRICS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("RkmndL", "Added to Cart"),
        ("VyebRm", "Placed Order"),
        ("TKNikS", "Checkout Started"),
        ("VwdbGQ", "Ordered Product"),
        ("NbsVry", "Active on Site"),
        ("Yw4UfG", "Viewed Product"),
        ("Started Checkout", "Started Checkout"),
    ])
});

/// Resolve a fixture metric id to its canonical name. Unknown ids return
/// `None` and the caller leaves the reference unchanged.
pub fn resolve_source_metric(metric_id: &str) -> Option<&'static str> {
    SOURCE_METRICS.get(metric_id).copied()
}

/// Rewrite every metric reference in the tree through the resolver and
/// the destination account's name-to-id map. References that do not
/// resolve, or whose name is absent from the map, stay as authored.
pub(crate) fn replace_metric_ids(value: &mut Value, metric_map: &HashMap<String, String>) {
    for_each_object(value, &mut |object| {
        remap_field(object, "metric_id", metric_map);
        if object.get("type").and_then(Value::as_str) == Some("metric") {
            remap_field(object, "id", metric_map);
        }
    });
}

fn remap_field(object: &mut Map<String, Value>, field: &str, metric_map: &HashMap<String, String>) {
    let Some(current) = object.get(field).and_then(Value::as_str) else {
        return;
    };
    if let Some(mapped) = resolve_source_metric(current).and_then(|name| metric_map.get(name)) {
        object.insert(field.to_string(), Value::String(mapped.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::{replace_metric_ids, resolve_source_metric};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn resolves_known_source_metrics() {
        assert_eq!(resolve_source_metric("RkmndL"), Some("Added to Cart"));
        assert_eq!(resolve_source_metric("VyebRm"), Some("Placed Order"));
        assert_eq!(resolve_source_metric("Started Checkout"), Some("Started Checkout"));
    }

    #[test]
    fn unknown_source_metric_is_none() {
        assert_eq!(resolve_source_metric("nope"), None);
        assert_eq!(resolve_source_metric(""), None);
    }

    #[test]
    fn remaps_metric_id_fields_anywhere_in_the_tree() {
        let mut tree = json!({
            "outer": [{ "inner": { "metric_id": "RkmndL" } }]
        });
        let map = HashMap::from([("Added to Cart".to_string(), "M999".to_string())]);

        replace_metric_ids(&mut tree, &map);
        assert_eq!(tree["outer"][0]["inner"]["metric_id"], json!("M999"));
    }

    #[test]
    fn remaps_id_only_on_metric_typed_objects() {
        let mut tree = json!({
            "trigger": { "type": "metric", "id": "Yw4UfG" },
            "action": { "type": "send-email", "id": "Yw4UfG" }
        });
        let map = HashMap::from([("Viewed Product".to_string(), "M42".to_string())]);

        replace_metric_ids(&mut tree, &map);
        assert_eq!(tree["trigger"]["id"], json!("M42"));
        assert_eq!(tree["action"]["id"], json!("Yw4UfG"));
    }
}
