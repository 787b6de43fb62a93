//! Utility functions for value conversion between configuration and the
//! resource controller's object model

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue, json};

use crate::api::Deployment;

/// Parameter key carrying the endpoint type of an instance
pub const SERVICE_ENDPOINTS_PARAM: &str = "service-endpoints";

/// Keep the resource-controller compatible deployments at `location`
///
/// Also returns every location a compatible deployment exists in, so the
/// caller can tell the user which locations would have worked.
pub fn filter_deployments(
    deployments: &[Deployment],
    location: &str,
) -> (Vec<Deployment>, BTreeSet<String>) {
    let mut matching = Vec::new();
    let mut locations = BTreeSet::new();
    for deployment in deployments.iter().filter(|d| d.rc_compatible) {
        locations.insert(deployment.location.clone());
        if deployment.location == location {
            matching.push(deployment.clone());
        }
    }
    (matching, locations)
}

/// Convert string parameters into the typed payload the service expects
///
/// `"true"`/`"false"` become booleans and `[..]` becomes a list of strings.
/// List elements are split on every comma and only surrounding `"` are
/// trimmed: there is no escaping, so `["a,b"]` yields two elements and
/// `["a", "b"]` keeps the space before the second element.
pub fn coerce_parameters(raw: &BTreeMap<String, String>) -> Map<String, JsonValue> {
    raw.iter()
        .map(|(key, value)| (key.clone(), coerce_parameter(value)))
        .collect()
}

fn coerce_parameter(value: &str) -> JsonValue {
    match value {
        "true" => json!(true),
        "false" => json!(false),
        v if v.starts_with('[') && v.ends_with(']') => {
            let inner = v.trim_start_matches('[').trim_end_matches(']');
            let items: Vec<&str> = inner.split(',').map(|a| a.trim_matches('"')).collect();
            json!(items)
        }
        v => json!(v),
    }
}

/// Location segment of a CRN (`crn:v1:bluemix:public:<service>:<location>:...`)
pub fn location_from_crn(crn: &str) -> Option<&str> {
    crn.split(':').nth(5)
}

/// Flatten a nested JSON value into dotted keys with string values
///
/// `{"a": {"b": 1}, "c": [true]}` becomes `{"a.b": "1", "c.0": "true"}`.
pub fn flatten(value: &JsonValue) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    flatten_into("", value, &mut out);
    out
}

fn flatten_into(prefix: &str, value: &JsonValue, out: &mut BTreeMap<String, String>) {
    let key = |k: &str| {
        if prefix.is_empty() {
            k.to_string()
        } else {
            format!("{}.{}", prefix, k)
        }
    };
    match value {
        JsonValue::Object(map) => {
            for (k, v) in map {
                flatten_into(&key(k), v, out);
            }
        }
        JsonValue::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_into(&key(&i.to_string()), v, out);
            }
        }
        JsonValue::Null => {}
        JsonValue::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Render a timestamp with millisecond precision (e.g. 2021-03-04T05:06:07.123Z)
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployment(location: &str, rc_compatible: bool) -> Deployment {
        Deployment {
            catalog_crn: format!("crn:v1:bluemix:public:globalcatalog::::deployment:{}", location),
            rc_compatible,
            location: location.to_string(),
        }
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_filter_deployments_matches_exact_location() {
        let deployments = vec![
            deployment("us-south", true),
            deployment("eu-de", true),
            deployment("US-SOUTH", true),
        ];
        let (matching, locations) = filter_deployments(&deployments, "us-south");
        assert_eq!(matching, vec![deployment("us-south", true)]);
        assert_eq!(
            locations.into_iter().collect::<Vec<_>>(),
            vec!["US-SOUTH", "eu-de", "us-south"]
        );
    }

    #[test]
    fn test_filter_deployments_ignores_incompatible() {
        let deployments = vec![deployment("us-south", false), deployment("eu-de", true)];
        let (matching, locations) = filter_deployments(&deployments, "us-south");
        assert!(matching.is_empty());
        assert_eq!(locations.into_iter().collect::<Vec<_>>(), vec!["eu-de"]);
    }

    #[test]
    fn test_filter_deployments_empty_input() {
        let (matching, locations) = filter_deployments(&[], "us-south");
        assert!(matching.is_empty());
        assert!(locations.is_empty());
    }

    #[test]
    fn test_coerce_parameters() {
        let coerced = coerce_parameters(&params(&[
            ("legacy", "true"),
            ("backups", "false"),
            ("members", r#"["a","b"]"#),
            ("plain", "x"),
            ("not_bool", "True"),
        ]));
        assert_eq!(coerced["legacy"], json!(true));
        assert_eq!(coerced["backups"], json!(false));
        assert_eq!(coerced["members"], json!(["a", "b"]));
        assert_eq!(coerced["plain"], json!("x"));
        assert_eq!(coerced["not_bool"], json!("True"));
    }

    #[test]
    fn test_coerce_list_has_no_escaping() {
        let coerced = coerce_parameters(&params(&[
            ("quoted_comma", r#"["a,b"]"#),
            ("spaced", r#"["a", "b"]"#),
            ("empty", "[]"),
        ]));
        assert_eq!(coerced["quoted_comma"], json!(["a", "b"]));
        assert_eq!(coerced["spaced"], json!(["a", " \"b"]));
        assert_eq!(coerced["empty"], json!([""]));
    }

    #[test]
    fn test_coerce_pass_through_is_idempotent() {
        let once = coerce_parameters(&params(&[("k", "value")]));
        let again = coerce_parameters(&params(&[("k", once["k"].as_str().unwrap())]));
        assert_eq!(once, again);
    }

    #[test]
    fn test_location_from_crn() {
        assert_eq!(
            location_from_crn("crn:v1:bluemix:public:databases-for-redis:us-south:a/acc:guid::"),
            Some("us-south")
        );
        assert_eq!(location_from_crn("crn:v1:short"), None);
    }

    #[test]
    fn test_flatten_nested_value() {
        let flat = flatten(&json!({
            "type": "create",
            "async": true,
            "state": {"progress": 100, "detail": null},
            "steps": ["a", "b"]
        }));
        assert_eq!(flat["type"], "create");
        assert_eq!(flat["async"], "true");
        assert_eq!(flat["state.progress"], "100");
        assert_eq!(flat["steps.1"], "b");
        assert!(!flat.contains_key("state.detail"));
    }

    #[test]
    fn test_format_timestamp() {
        let ts: DateTime<Utc> = "2021-03-04T05:06:07.5Z".parse().unwrap();
        assert_eq!(format_timestamp(&ts), "2021-03-04T05:06:07.500Z");
    }
}
