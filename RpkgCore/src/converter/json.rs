//! Simple vs. verbose converter output
//!
//! Verbose output wraps every value in a typed envelope:
//!
//! ```json
//! { "name": { "$type": "ZString", "$val": "mainmenu" } }
//! ```
//!
//! Simple output is the same document with the envelopes unwrapped.

use serde_json::{Map, Value};

const TYPE_KEY: &str = "$type";
const VALUE_KEY: &str = "$val";

fn is_envelope(map: &Map<String, Value>) -> bool {
    map.contains_key(TYPE_KEY) && map.contains_key(VALUE_KEY)
}

/// Reduce verbose output to the simple shape.
///
/// Typed envelopes are replaced by their value and `$`-prefixed metadata
/// keys are dropped.
#[must_use]
pub fn strip_types(verbose: &Value) -> Value {
    match verbose {
        Value::Object(map) if is_envelope(map) => strip_types(&map[VALUE_KEY]),
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !key.starts_with('$'))
                .map(|(key, value)| (key.clone(), strip_types(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_types).collect()),
        other => other.clone(),
    }
}

/// Whether every field of `simple` appears, with the same value and under
/// the same key, in `verbose`.
#[must_use]
pub fn covers(simple: &Value, verbose: &Value) -> bool {
    is_subset(simple, &strip_types(verbose))
}

fn is_subset(part: &Value, whole: &Value) -> bool {
    match (part, whole) {
        (Value::Object(part), Value::Object(whole)) => part
            .iter()
            .all(|(key, value)| whole.get(key).is_some_and(|other| is_subset(value, other))),
        (Value::Array(part), Value::Array(whole)) => {
            part.len() == whole.len()
                && part.iter().zip(whole).all(|(a, b)| is_subset(a, b))
        }
        (a, b) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::testing::TrackingEngine;
    use crate::converter::{ConversionMode, Converter};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_strip_types() {
        let verbose = json!({
            "$schema": "x",
            "entity": {
                "$type": "SEntityTemplateReference",
                "$val": { "id": { "$type": "uint64", "$val": 7 } }
            },
            "list": [{ "$type": "int32", "$val": 1 }, 2]
        });
        assert_eq!(
            strip_types(&verbose),
            json!({ "entity": { "id": 7 }, "list": [1, 2] })
        );
    }

    #[test]
    fn test_covers() {
        let simple = json!({ "a": 1, "b": { "c": "x" } });
        let verbose = json!({
            "a": { "$type": "int32", "$val": 1 },
            "b": { "$type": "S", "$val": { "c": { "$type": "ZString", "$val": "x" }, "extra": true } }
        });
        assert!(covers(&simple, &verbose));

        let changed = json!({ "a": { "$type": "int32", "$val": 2 }, "b": { "c": "x" } });
        assert!(!covers(&simple, &changed));

        let missing = json!({ "b": { "c": "x" } });
        assert!(!covers(&simple, &missing));
    }

    #[test]
    fn test_verbose_superset_of_simple() {
        let converter = Converter::new(Arc::new(TrackingEngine::default()), "tracking");
        for data in [&b"mainmenu"[..], b"entity", b"a longer resource payload"] {
            let simple = converter
                .memory_to_json_string(data, ConversionMode::Simple)
                .unwrap()
                .to_value()
                .unwrap();
            let verbose = converter
                .memory_to_json_string(data, ConversionMode::Verbose)
                .unwrap()
                .to_value()
                .unwrap();
            assert!(covers(&simple, &verbose), "verbose output lost fields for {data:?}");
        }
    }
}
