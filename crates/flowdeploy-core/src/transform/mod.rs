//! Flow deployment transform.
//!
//! Turns a bundled flow resource into a payload the Klaviyo flow-create
//! endpoint accepts: server-assigned fields are stripped, action ids are
//! downgraded to temporary ids and metric references are rewritten for
//! the destination account. The input is never mutated.

mod metrics;

pub use metrics::resolve_source_metric;

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Attributes Klaviyo assigns on creation; they must be absent from a
/// create payload.
const SERVER_ATTRIBUTE_FIELDS: [&str; 5] = ["created", "updated", "status", "archived", "trigger_type"];

/// Produce a deployable copy of `raw`.
///
/// `new_name` overrides the flow's display name when given. When
/// `metric_map` (metric name to destination id) is absent, metric
/// references are left as authored, which keeps the output usable for
/// previews.
pub fn process_flow(
    raw: &Value,
    new_name: Option<&str>,
    metric_map: Option<&HashMap<String, String>>,
) -> Value {
    let mut processed = raw.clone();

    if let Some(data) = processed.get_mut("data").and_then(Value::as_object_mut) {
        data.remove("id");
        data.remove("relationships");
        data.remove("links");

        if let Some(attributes) = data.get_mut("attributes").and_then(Value::as_object_mut) {
            for field in SERVER_ATTRIBUTE_FIELDS {
                attributes.remove(field);
            }
            if let Some(name) = new_name {
                attributes.insert("name".to_string(), Value::String(name.to_string()));
            }
            if let Some(definition) = attributes.get_mut("definition") {
                rewrite_actions(definition);
                if let Some(map) = metric_map {
                    metrics::replace_metric_ids(definition, map);
                }
                strip_list_triggers(definition);
            }
        }
    }

    processed
}

/// Actions in a create payload reference each other through client
/// assigned temporary ids. Persisted action ids, message ids and status
/// leftovers from the source account are dropped.
fn rewrite_actions(definition: &mut Value) {
    let Some(actions) = definition.get_mut("actions").and_then(Value::as_array_mut) else {
        return;
    };

    for action in actions {
        let Some(action) = action.as_object_mut() else {
            continue;
        };

        if let Some(id) = action.remove("id") {
            action.insert("temporary_id".to_string(), id);
        }

        let is_time_delay = action.get("type").and_then(Value::as_str) == Some("time-delay");
        if let Some(data) = action.get_mut("data").and_then(Value::as_object_mut) {
            data.remove("status");
            if let Some(message) = data.get_mut("message").and_then(Value::as_object_mut) {
                message.remove("id");
            }
            // delay_until_* only exists for day-granularity delays
            if is_time_delay && data.get("unit").and_then(Value::as_str) != Some("days") {
                data.remove("delay_until_time");
                data.remove("delay_until_weekdays");
            }
        }
    }
}

/// List triggers cannot be reproduced against the destination account's
/// own lists; drop the trigger set and its profile filter rather than
/// failing the deploy.
fn strip_list_triggers(definition: &mut Value) {
    let Some(definition) = definition.as_object_mut() else {
        return;
    };

    let has_list_trigger = definition
        .get("triggers")
        .and_then(Value::as_array)
        .is_some_and(|triggers| {
            triggers
                .iter()
                .any(|trigger| trigger.get("type").and_then(Value::as_str) == Some("list"))
        });

    if has_list_trigger {
        definition.insert("triggers".to_string(), Value::Array(Vec::new()));
        definition.remove("profile_filter");
    }
}

/// Depth-first walk calling `visit` on every JSON object in the tree.
/// Arrays are recursed element-wise, objects by value.
pub(crate) fn for_each_object(value: &mut Value, visit: &mut dyn FnMut(&mut Map<String, Value>)) {
    match value {
        Value::Array(items) => {
            for item in items {
                for_each_object(item, visit);
            }
        }
        Value::Object(object) => {
            visit(object);
            for item in object.values_mut() {
                for_each_object(item, visit);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::process_flow;
    use crate::templates;
    use serde_json::{Value, json};
    use std::collections::HashMap;

    fn sample_flow() -> Value {
        json!({
            "data": {
                "type": "flow",
                "id": "UVWXyZ",
                "attributes": {
                    "name": "Sample Flow",
                    "status": "live",
                    "archived": false,
                    "created": "2025-03-18T09:24:11+00:00",
                    "updated": "2025-06-02T14:05:37+00:00",
                    "trigger_type": "Metric",
                    "definition": {
                        "triggers": [{ "type": "metric", "id": "RkmndL" }],
                        "profile_filter": {
                            "condition_groups": [{
                                "conditions": [{
                                    "type": "profile-metric",
                                    "metric_id": "VyebRm",
                                    "measurement": "count"
                                }]
                            }]
                        },
                        "actions": [
                            {
                                "id": "1001",
                                "type": "time-delay",
                                "data": {
                                    "value": 4,
                                    "unit": "hours",
                                    "delay_until_time": "10:00",
                                    "delay_until_weekdays": ["monday"]
                                },
                                "links": { "next": ["1002"] }
                            },
                            {
                                "id": "1002",
                                "type": "send-email",
                                "data": {
                                    "status": "draft",
                                    "message": { "id": "Msg123", "name": "Reminder" }
                                },
                                "links": { "next": [] }
                            }
                        ],
                        "entry_action_id": "1001"
                    }
                },
                "relationships": { "tags": { "links": { "self": "..." } } },
                "links": { "self": "https://a.klaviyo.com/api/flows/UVWXyZ/" }
            }
        })
    }

    fn metric_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect()
    }

    #[test]
    fn strips_server_assigned_fields() {
        let processed = process_flow(&sample_flow(), None, None);
        let data = &processed["data"];

        assert!(data.get("id").is_none());
        assert!(data.get("relationships").is_none());
        assert!(data.get("links").is_none());

        let attributes = data["attributes"].as_object().unwrap();
        for field in ["created", "updated", "status", "archived", "trigger_type"] {
            assert!(attributes.get(field).is_none(), "{field} should be stripped");
        }
    }

    #[test]
    fn renames_action_ids_to_temporary_ids() {
        let processed = process_flow(&sample_flow(), None, None);
        let actions = processed["data"]["attributes"]["definition"]["actions"]
            .as_array()
            .unwrap();

        assert_eq!(actions[0]["temporary_id"], json!("1001"));
        assert_eq!(actions[1]["temporary_id"], json!("1002"));
        for action in actions {
            assert!(action.get("id").is_none());
        }
    }

    #[test]
    fn drops_message_ids_and_action_status() {
        let processed = process_flow(&sample_flow(), None, None);
        let email = &processed["data"]["attributes"]["definition"]["actions"][1];

        assert!(email["data"].get("status").is_none());
        assert!(email["data"]["message"].get("id").is_none());
        assert_eq!(email["data"]["message"]["name"], json!("Reminder"));
    }

    #[test]
    fn prunes_delay_until_fields_for_sub_day_delays() {
        let processed = process_flow(&sample_flow(), None, None);
        let delay = &processed["data"]["attributes"]["definition"]["actions"][0];

        assert!(delay["data"].get("delay_until_time").is_none());
        assert!(delay["data"].get("delay_until_weekdays").is_none());
        assert_eq!(delay["data"]["value"], json!(4));
    }

    #[test]
    fn keeps_delay_until_fields_for_day_delays() {
        let mut flow = sample_flow();
        flow["data"]["attributes"]["definition"]["actions"][0]["data"]["unit"] = json!("days");

        let processed = process_flow(&flow, None, None);
        let delay = &processed["data"]["attributes"]["definition"]["actions"][0];

        assert_eq!(delay["data"]["delay_until_time"], json!("10:00"));
        assert_eq!(delay["data"]["delay_until_weekdays"], json!(["monday"]));
    }

    #[test]
    fn overrides_name_only_when_given() {
        let renamed = process_flow(&sample_flow(), Some("My Custom Flow"), None);
        assert_eq!(renamed["data"]["attributes"]["name"], json!("My Custom Flow"));

        let kept = process_flow(&sample_flow(), None, None);
        assert_eq!(kept["data"]["attributes"]["name"], json!("Sample Flow"));
    }

    #[test]
    fn remaps_known_metric_references() {
        let map = metric_map(&[("Added to Cart", "M999"), ("Placed Order", "M100")]);
        let processed = process_flow(&sample_flow(), None, Some(&map));
        let definition = &processed["data"]["attributes"]["definition"];

        // metric-typed trigger id
        assert_eq!(definition["triggers"][0]["id"], json!("M999"));
        // nested metric_id inside the profile filter
        assert_eq!(
            definition["profile_filter"]["condition_groups"][0]["conditions"][0]["metric_id"],
            json!("M100")
        );
    }

    #[test]
    fn leaves_unknown_metric_references_untouched() {
        let mut flow = sample_flow();
        flow["data"]["attributes"]["definition"]["triggers"][0]["id"] = json!("zzUnknown");

        let map = metric_map(&[("Added to Cart", "M999")]);
        let processed = process_flow(&flow, None, Some(&map));

        assert_eq!(
            processed["data"]["attributes"]["definition"]["triggers"][0]["id"],
            json!("zzUnknown")
        );
    }

    #[test]
    fn leaves_unmapped_metric_references_untouched() {
        // Resolves to "Added to Cart" but the destination map has no such metric.
        let map = metric_map(&[("Placed Order", "M100")]);
        let processed = process_flow(&sample_flow(), None, Some(&map));

        assert_eq!(
            processed["data"]["attributes"]["definition"]["triggers"][0]["id"],
            json!("RkmndL")
        );
    }

    #[test]
    fn absent_metric_map_skips_remapping() {
        let processed = process_flow(&sample_flow(), None, None);
        assert_eq!(
            processed["data"]["attributes"]["definition"]["triggers"][0]["id"],
            json!("RkmndL")
        );
    }

    #[test]
    fn list_trigger_clears_triggers_and_profile_filter() {
        let mut flow = sample_flow();
        flow["data"]["attributes"]["definition"]["triggers"] = json!([
            { "type": "metric", "id": "RkmndL" },
            { "type": "list", "id": "List01" }
        ]);

        let processed = process_flow(&flow, None, None);
        let definition = &processed["data"]["attributes"]["definition"];

        assert_eq!(definition["triggers"], json!([]));
        assert!(definition.get("profile_filter").is_none());
    }

    #[test]
    fn definition_without_actions_or_triggers_passes_through() {
        let flow = json!({
            "data": {
                "type": "flow",
                "attributes": { "name": "Bare", "definition": {} }
            }
        });

        let processed = process_flow(&flow, None, None);
        assert_eq!(processed["data"]["attributes"]["definition"], json!({}));
    }

    #[test]
    fn processing_is_deterministic() {
        let map = metric_map(&[("Added to Cart", "M999")]);
        let first = process_flow(&sample_flow(), Some("Copy"), Some(&map));
        let second = process_flow(&sample_flow(), Some("Copy"), Some(&map));
        assert_eq!(first, second);
    }

    #[test]
    fn processing_leaves_registry_fixture_untouched() {
        let template = templates::get("abandoned-cart").unwrap();
        let before = template.raw_definition.to_string();

        let map = metric_map(&[("Added to Cart", "M999"), ("Placed Order", "M100")]);
        let _ = process_flow(&template.raw_definition, Some("Copy"), Some(&map));
        let _ = process_flow(&template.raw_definition, None, None);

        assert_eq!(template.raw_definition.to_string(), before);
    }

    #[test]
    fn bundled_templates_produce_clean_payloads() {
        let map = metric_map(&[
            ("Added to Cart", "M1"),
            ("Placed Order", "M2"),
            ("Checkout Started", "M3"),
            ("Ordered Product", "M4"),
            ("Active on Site", "M5"),
            ("Viewed Product", "M6"),
        ]);

        for summary in templates::list() {
            let template = templates::get(summary.id).unwrap();
            let processed = process_flow(&template.raw_definition, None, Some(&map));
            let data = &processed["data"];

            assert!(data.get("id").is_none(), "{}: data.id survived", summary.id);
            assert!(data.get("relationships").is_none());
            assert!(data.get("links").is_none());

            let actions = data["attributes"]["definition"]["actions"].as_array().unwrap();
            for action in actions {
                assert!(action.get("id").is_none(), "{}: action id survived", summary.id);
                assert!(action.get("temporary_id").is_some());
            }
        }
    }
}
