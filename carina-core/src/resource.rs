//! Resource - Representing resources and their state

use std::collections::HashMap;

use crate::provider::{ProviderError, ProviderResult, Timeouts};

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource type (e.g., "ibm_resource_instance")
    pub resource_type: String,
    /// Resource name (identifier specified in DSL)
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Everything the engine persists for one managed resource between calls.
///
/// `C` is the declarative configuration record, `A` the computed attributes
/// projected from the remote side. `identifier` is the provider-assigned key;
/// `None` means the resource is not (or no longer) tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceData<C, A> {
    pub id: ResourceId,
    pub identifier: Option<String>,
    pub config: C,
    pub attributes: A,
    pub timeouts: Timeouts,
}

impl<C, A: Default> ResourceData<C, A> {
    pub fn new(id: ResourceId, config: C) -> Self {
        Self {
            id,
            identifier: None,
            config,
            attributes: A::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl<C, A> ResourceData<C, A> {
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = Some(identifier.into());
    }

    /// Forget the remote identifier so the next plan treats the resource as absent
    pub fn clear_identifier(&mut self) {
        self.identifier = None;
    }

    /// Identifier of a resource that is expected to exist remotely
    pub fn require_identifier(&self) -> ProviderResult<String> {
        self.identifier.clone().ok_or_else(|| {
            ProviderError::new("Resource has no identifier").for_resource(self.id.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_resource_data_has_no_identifier() {
        let data: ResourceData<(), ()> =
            ResourceData::new(ResourceId::new("instance", "db"), ());
        assert!(data.identifier.is_none());
        assert!(data.require_identifier().is_err());
    }

    #[test]
    fn identifier_can_be_set_and_cleared() {
        let mut data: ResourceData<(), ()> =
            ResourceData::new(ResourceId::new("instance", "db"), ());
        data.set_identifier("crn:v1:abc");
        assert_eq!(data.require_identifier().unwrap(), "crn:v1:abc");

        data.clear_identifier();
        assert_eq!(data.identifier, None);
    }

    #[test]
    fn value_as_str() {
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Bool(true).as_str(), None);
    }
}
