//! Differ - Compare a prior configuration with the desired one
//!
//! Providers use the resulting `ChangeSet` during update so that only the
//! attributes the user actually changed trigger remote work.

use std::collections::{BTreeSet, HashMap};

use crate::resource::Value;

/// Names of attributes that differ between two attribute maps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changed: BTreeSet<String>,
}

impl ChangeSet {
    /// Returns whether the named attribute changed
    pub fn has_change(&self, name: &str) -> bool {
        self.changed.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Changed attribute names in sorted order
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.changed.iter().map(|s| s.as_str())
    }
}

/// Compare desired attributes with prior attributes
pub fn diff(desired: &HashMap<String, Value>, prior: &HashMap<String, Value>) -> ChangeSet {
    ChangeSet {
        changed: find_changed_attributes(desired, prior).into_iter().collect(),
    }
}

/// Find changed attributes between desired and prior state
///
/// An attribute present on only one side counts as changed.
fn find_changed_attributes(
    desired: &HashMap<String, Value>,
    prior: &HashMap<String, Value>,
) -> Vec<String> {
    let mut changed = Vec::new();

    for (key, desired_value) in desired {
        // Skip internal attributes (starting with _)
        if key.starts_with('_') {
            continue;
        }

        match prior.get(key) {
            Some(prior_value) if prior_value == desired_value => {}
            _ => changed.push(key.clone()),
        }
    }

    for key in prior.keys() {
        if !key.starts_with('_') && !desired.contains_key(key) {
            changed.push(key.clone());
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn no_change_when_same() {
        let desired = attrs(&[("plan", Value::from("standard"))]);
        let prior = attrs(&[("plan", Value::from("standard"))]);

        let changes = diff(&desired, &prior);
        assert!(changes.is_empty());
        assert!(!changes.has_change("plan"));
    }

    #[test]
    fn change_when_different() {
        let desired = attrs(&[
            ("plan", Value::from("lite")),
            ("name", Value::from("db")),
        ]);
        let prior = attrs(&[
            ("plan", Value::from("standard")),
            ("name", Value::from("db")),
        ]);

        let changes = diff(&desired, &prior);
        assert!(changes.has_change("plan"));
        assert!(!changes.has_change("name"));
    }

    #[test]
    fn added_and_removed_attributes_are_changes() {
        let desired = attrs(&[("service_endpoints", Value::from("private"))]);
        let prior = attrs(&[("resource_group_id", Value::from("rg"))]);

        let changes = diff(&desired, &prior);
        assert_eq!(
            changes.attributes().collect::<Vec<_>>(),
            vec!["resource_group_id", "service_endpoints"]
        );
    }

    #[test]
    fn internal_attributes_are_ignored() {
        let desired = attrs(&[("_binding", Value::from("a"))]);
        let prior = attrs(&[("_binding", Value::from("b"))]);

        assert!(diff(&desired, &prior).is_empty());
    }
}
