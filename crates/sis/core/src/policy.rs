//! Policy documents and resolution.

use serde_json::{Map, Value};

/// Policy document scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyScope {
    /// The single global default document.
    Default,
    /// A per-device override document.
    Device,
}

/// Shallow overlay of a device override onto the default document.
///
/// Top-level keys from the override win; all other default keys pass
/// through unchanged. Neither input document is mutated. A non-object
/// document is treated as empty.
pub fn effective_policy(default: &Value, device: Option<&Value>) -> Value {
    let mut merged: Map<String, Value> = match default {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    if let Some(Value::Object(overlay)) = device {
        for (key, value) in overlay {
            merged.insert(key.clone(), value.clone());
        }
    }

    Value::Object(merged)
}

/// Top-level keys exposed through the transparency view.
const TRANSPARENCY_FIELDS: [&str; 2] = ["monitoring", "screen_time"];

/// Reduced projection of an effective policy for student/operator display.
///
/// Only monitoring flags and screen-time fields are exposed, independent
/// of caller identity; everything else stays server-side.
pub fn transparency_view(effective: &Value) -> Value {
    let mut view = Map::new();
    if let Value::Object(map) = effective {
        for field in TRANSPARENCY_FIELDS {
            if let Some(value) = map.get(field) {
                view.insert(field.to_string(), value.clone());
            }
        }
    }
    Value::Object(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_keys_win_shallowly() {
        let default = json!({"screen_time": {"max_minutes": 60}, "wifi": {"ssid": "lab"}});
        let device = json!({"screen_time": {"max_minutes": 30}});
        let merged = effective_policy(&default, Some(&device));
        assert_eq!(merged["screen_time"]["max_minutes"], 30);
        assert_eq!(merged["wifi"]["ssid"], "lab");
    }

    #[test]
    fn absent_override_returns_default_alone() {
        let default = json!({"screen_time": {"max_minutes": 60}});
        let merged = effective_policy(&default, None);
        assert_eq!(merged, default);
    }

    #[test]
    fn overlay_does_not_merge_nested_objects() {
        // The merge is shallow by contract: the whole top-level value is
        // replaced, not deep-merged.
        let default = json!({"restrictions": {"a": 1, "b": 2}});
        let device = json!({"restrictions": {"a": 9}});
        let merged = effective_policy(&default, Some(&device));
        assert_eq!(merged["restrictions"], json!({"a": 9}));
    }

    #[test]
    fn transparency_view_hides_unrelated_fields() {
        let effective = json!({
            "monitoring": {"screen_record": true},
            "screen_time": {"max_minutes": 45},
            "wifi": {"psk": "secret"}
        });
        let view = transparency_view(&effective);
        assert_eq!(view["monitoring"]["screen_record"], true);
        assert_eq!(view["screen_time"]["max_minutes"], 45);
        assert!(view.get("wifi").is_none());
    }

    #[test]
    fn transparency_view_of_empty_policy_is_empty_object() {
        assert_eq!(transparency_view(&json!({})), json!({}));
    }
}
