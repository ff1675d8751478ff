//! Root shape coercion
//!
//! A syntactically valid response may still not be the expected top-level
//! object: models sometimes wrap the answer in a single-key envelope or
//! return an array containing one plausible object. Coercion is driven by
//! a "does this look like the thing we want" predicate so the same
//! mechanism serves every extraction flow.

use serde_json::{Map, Value};

/// Result of shape coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// A plausible object was recovered
    Found(Map<String, Value>),
    /// Nothing in the value satisfied the predicate
    NotFound,
}

impl Coerced {
    /// The recovered object, if any.
    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self {
            Coerced::Found(map) => Some(map),
            Coerced::NotFound => None,
        }
    }
}

/// Coerce `value` into the expected object shape.
///
/// A plausible object passes through unchanged; an array yields its first
/// plausible element; a single-key wrapper object is unwrapped one level
/// when its inner value is plausible. Everything else is [`Coerced::NotFound`].
pub fn coerce_object(value: Value, plausible: &dyn Fn(&Value) -> bool) -> Coerced {
    match value {
        Value::Array(items) => items
            .into_iter()
            .find(|item| plausible(item))
            .and_then(|item| match item {
                Value::Object(map) => Some(Coerced::Found(map)),
                _ => None,
            })
            .unwrap_or(Coerced::NotFound),
        Value::Object(map) => {
            if plausible(&Value::Object(map.clone())) {
                return Coerced::Found(map);
            }
            if map.len() == 1 {
                let inner = map.into_iter().next().map(|(_, v)| v).unwrap();
                if plausible(&inner) {
                    if let Value::Object(inner_map) = inner {
                        return Coerced::Found(inner_map);
                    }
                }
            }
            Coerced::NotFound
        }
        _ => Coerced::NotFound,
    }
}

/// Whether `value` plausibly is an extracted campaign object.
pub fn looks_like_campaign(value: &Value) -> bool {
    let Value::Object(map) = value else {
        return false;
    };
    map.get("clientName").map_or(false, Value::is_string)
        || map.get("campaignName").map_or(false, Value::is_string)
        || map.get("audit").map_or(false, Value::is_array)
        || map.get("pmProposalStrategies").map_or(false, Value::is_array)
        || map.get("pmOpecStrategies").map_or(false, Value::is_array)
}

/// Whether `value` plausibly is an extracted performance report.
pub fn looks_like_report(value: &Value) -> bool {
    value.is_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn campaign() -> Value {
        json!({"clientName": "Acme", "audit": []})
    }

    #[test]
    fn test_plausible_object_passes_through() {
        let coerced = coerce_object(campaign(), &looks_like_campaign);
        let map = coerced.into_object().unwrap();
        assert_eq!(map.get("clientName"), Some(&json!("Acme")));
    }

    #[test]
    fn test_array_yields_first_plausible_element() {
        let value = json!([{"noise": true}, campaign(), {"clientName": "Other"}]);
        let map = coerce_object(value, &looks_like_campaign)
            .into_object()
            .unwrap();
        assert_eq!(map.get("clientName"), Some(&json!("Acme")));
    }

    #[test]
    fn test_single_key_wrapper_is_unwrapped_once() {
        let value = json!({"result": campaign()});
        let map = coerce_object(value, &looks_like_campaign)
            .into_object()
            .unwrap();
        assert_eq!(map.get("clientName"), Some(&json!("Acme")));
    }

    #[test]
    fn test_implausible_shapes_are_not_found() {
        assert_eq!(
            coerce_object(json!([1, 2, 3]), &looks_like_campaign),
            Coerced::NotFound
        );
        assert_eq!(
            coerce_object(json!("just a string"), &looks_like_campaign),
            Coerced::NotFound
        );
        assert_eq!(
            coerce_object(json!({"a": 1, "b": 2}), &looks_like_campaign),
            Coerced::NotFound
        );
        // Two-key wrapper is not unwrapped
        assert_eq!(
            coerce_object(
                json!({"result": campaign(), "extra": 1}),
                &looks_like_campaign
            ),
            Coerced::NotFound
        );
    }

    #[test]
    fn test_campaign_predicate_accepts_any_anchor_field() {
        assert!(looks_like_campaign(&json!({"campaignName": "Spring"})));
        assert!(looks_like_campaign(&json!({"pmOpecStrategies": []})));
        assert!(!looks_like_campaign(&json!({"clientName": 42})));
        assert!(!looks_like_campaign(&json!([])));
    }
}
