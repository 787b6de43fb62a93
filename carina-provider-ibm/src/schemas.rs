//! Schema of the `ibm_resource_instance` resource
//!
//! The engine hands the provider a typed configuration record and receives
//! the computed attributes back. The attribute schema below is what
//! configuration is validated against before any remote call.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use carina_core::resource::{ResourceData, Value};
use carina_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use regex::Regex;

/// Resource type name
pub const RESOURCE_INSTANCE: &str = "ibm_resource_instance";

/// Endpoint types an instance can be reached through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceEndpoints {
    Public,
    Private,
    PublicAndPrivate,
}

impl ServiceEndpoints {
    pub const ALL: [&'static str; 3] = ["public", "private", "public-and-private"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceEndpoints::Public => "public",
            ServiceEndpoints::Private => "private",
            ServiceEndpoints::PublicAndPrivate => "public-and-private",
        }
    }
}

impl fmt::Display for ServiceEndpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceEndpoints {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(ServiceEndpoints::Public),
            "private" => Ok(ServiceEndpoints::Private),
            "public-and-private" => Ok(ServiceEndpoints::PublicAndPrivate),
            other => Err(format!(
                "invalid service endpoints '{}', expected one of: {}",
                other,
                Self::ALL.join(", ")
            )),
        }
    }
}

/// Declarative configuration of a resource instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceInstanceConfig {
    pub name: String,
    /// Catalog name of the service offering (e.g., "cloud-object-storage")
    pub service: String,
    /// Catalog name of the plan
    pub plan: String,
    pub location: String,
    /// Falls back to the account's default resource group
    pub resource_group_id: Option<String>,
    pub parameters: BTreeMap<String, String>,
    pub tags: BTreeSet<String>,
    pub service_endpoints: Option<ServiceEndpoints>,
}

impl ResourceInstanceConfig {
    pub fn new(
        name: impl Into<String>,
        service: impl Into<String>,
        plan: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            service: service.into(),
            plan: plan.into(),
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn with_resource_group(mut self, id: impl Into<String>) -> Self {
        self.resource_group_id = Some(id.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_service_endpoints(mut self, endpoints: ServiceEndpoints) -> Self {
        self.service_endpoints = Some(endpoints);
        self
    }

    /// Configured tags in sorted order
    pub fn tag_list(&self) -> Vec<String> {
        self.tags.iter().cloned().collect()
    }

    /// Fill optional-computed fields left unset from `prior`
    ///
    /// Read populates these from the remote side, so an unset value means
    /// "keep what is there", not "remove".
    pub fn inherit_computed(&mut self, prior: &Self) {
        if self.resource_group_id.is_none() {
            self.resource_group_id = prior.resource_group_id.clone();
        }
        if self.tags.is_empty() {
            self.tags = prior.tags.clone();
        }
        if self.service_endpoints.is_none() {
            self.service_endpoints = prior.service_endpoints;
        }
    }

    /// Attribute view used for schema validation and change detection
    pub fn to_attributes(&self) -> HashMap<String, Value> {
        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::from(self.name.as_str()));
        attrs.insert("service".to_string(), Value::from(self.service.as_str()));
        attrs.insert("plan".to_string(), Value::from(self.plan.as_str()));
        attrs.insert("location".to_string(), Value::from(self.location.as_str()));
        if let Some(rg) = &self.resource_group_id {
            attrs.insert("resource_group_id".to_string(), Value::from(rg.as_str()));
        }
        if !self.parameters.is_empty() {
            let params = self
                .parameters
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                .collect();
            attrs.insert("parameters".to_string(), Value::Map(params));
        }
        if !self.tags.is_empty() {
            let tags = self.tags.iter().map(|t| Value::from(t.as_str())).collect();
            attrs.insert("tags".to_string(), Value::List(tags));
        }
        if let Some(endpoints) = self.service_endpoints {
            attrs.insert(
                "service_endpoints".to_string(),
                Value::from(endpoints.as_str()),
            );
        }
        attrs
    }
}

/// One entry of the plan history projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanHistoryEntry {
    pub resource_plan_id: String,
    pub start_date: String,
}

/// Attributes projected from the live instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceInstanceAttributes {
    pub status: Option<String>,
    pub crn: Option<String>,
    pub guid: Option<String>,
    pub dashboard_url: Option<String>,
    pub plan_history: Vec<PlanHistoryEntry>,
    pub account_id: Option<String>,
    pub resource_group_crn: Option<String>,
    pub resource_id: Option<String>,
    pub resource_plan_id: Option<String>,
    pub target_crn: Option<String>,
    pub state: Option<String>,
    pub type_: Option<String>,
    pub sub_type: Option<String>,
    pub allow_cleanup: Option<bool>,
    pub locked: Option<bool>,
    pub last_operation: BTreeMap<String, String>,
    pub resource_aliases_url: Option<String>,
    pub resource_bindings_url: Option<String>,
    pub resource_keys_url: Option<String>,
    pub created_at: Option<String>,
    pub created_by: Option<String>,
    pub update_at: Option<String>,
    pub update_by: Option<String>,
    pub deleted_at: Option<String>,
    pub deleted_by: Option<String>,
    pub scheduled_reclaim_at: Option<String>,
    pub scheduled_reclaim_by: Option<String>,
    pub restored_at: Option<String>,
    pub restored_by: Option<String>,
    pub resource_name: Option<String>,
    pub resource_crn: Option<String>,
    pub resource_status: Option<String>,
    pub resource_group_name: Option<String>,
    pub resource_controller_url: Option<String>,
    pub extensions: BTreeMap<String, String>,
}

/// Persisted record of one resource instance
pub type ResourceInstanceData = ResourceData<ResourceInstanceConfig, ResourceInstanceAttributes>;

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9:_ .-]+$").expect("tag pattern is a valid regex")
});

/// Validate a single tag: 1-128 characters from `A-Za-z0-9:_ .-`
pub fn validate_tag(value: &Value) -> Result<(), String> {
    let Value::String(tag) = value else {
        return Err("Expected string".to_string());
    };
    let len = tag.chars().count();
    if !(1..=128).contains(&len) {
        return Err(format!(
            "tag '{}' must be between 1 and 128 characters, got {}",
            tag, len
        ));
    }
    if !TAG_PATTERN.is_match(tag) {
        return Err(format!(
            "tag '{}' must match {}",
            tag,
            TAG_PATTERN.as_str()
        ));
    }
    Ok(())
}

/// Attribute schema of `ibm_resource_instance`
pub fn resource_instance_schema() -> ResourceSchema {
    let computed = |name: &str, desc: &str| {
        AttributeSchema::new(name, AttributeType::String)
            .computed()
            .with_description(desc)
    };

    ResourceSchema::new(RESOURCE_INSTANCE)
        .with_description("A resource instance managed by the IBM Cloud resource controller")
        .attribute(
            AttributeSchema::new("name", AttributeType::String)
                .required()
                .with_description("A name for the resource instance"),
        )
        .attribute(
            AttributeSchema::new("service", AttributeType::String)
                .required()
                .force_new()
                .with_description(
                    "The name of the service offering like cloud-object-storage, kms etc",
                ),
        )
        .attribute(
            AttributeSchema::new("plan", AttributeType::String)
                .required()
                .with_description("The plan type of the service"),
        )
        .attribute(
            AttributeSchema::new("location", AttributeType::String)
                .required()
                .force_new()
                .with_description("The location where the instance available"),
        )
        .attribute(
            AttributeSchema::new("resource_group_id", AttributeType::String)
                .optional_computed()
                .force_new()
                .with_description("The resource group id"),
        )
        .attribute(
            AttributeSchema::new(
                "parameters",
                AttributeType::Map(Box::new(AttributeType::String)),
            )
            .with_description("Arbitrary parameters to pass. Must be a JSON object"),
        )
        .attribute(
            AttributeSchema::new(
                "tags",
                AttributeType::List(Box::new(types::validated_string("Tag", validate_tag))),
            )
            .optional_computed(),
        )
        .attribute(
            AttributeSchema::new(
                "service_endpoints",
                types::string_enum(&ServiceEndpoints::ALL),
            )
            .optional_computed()
            .with_description(
                "Types of the service endpoints. Possible values are 'public', 'private', 'public-and-private'.",
            ),
        )
        .attribute(computed("status", "Status of resource instance"))
        .attribute(computed("crn", "CRN of resource instance"))
        .attribute(computed("guid", "Guid of resource instance"))
        .attribute(computed("dashboard_url", "Dashboard URL to access resource."))
        .attribute(computed("account_id", "An alpha-numeric value identifying the account ID."))
        .attribute(computed("resource_group_crn", "The long ID (full CRN) of the resource group"))
        .attribute(computed("resource_id", "The unique ID of the offering"))
        .attribute(computed(
            "resource_plan_id",
            "The unique ID of the plan associated with the offering",
        ))
        .attribute(computed(
            "target_crn",
            "The full deployment CRN as defined in the global catalog",
        ))
        .attribute(computed("state", "The current state of the instance."))
        .attribute(computed("type", "The type of the instance, e.g. service_instance."))
        .attribute(computed("sub_type", "The sub-type of instance, e.g. cfaas ."))
        .attribute(
            AttributeSchema::new("allow_cleanup", AttributeType::Bool)
                .computed()
                .with_description(
                    "Whether the instance is cleaned up when its region instance is deleted",
                ),
        )
        .attribute(
            AttributeSchema::new("locked", AttributeType::Bool)
                .computed()
                .with_description("Whether the instance is locked against changes"),
        )
        .attribute(
            AttributeSchema::new(
                "last_operation",
                AttributeType::Map(Box::new(AttributeType::String)),
            )
            .computed()
            .with_description("The status of the last operation requested on the instance"),
        )
        .attribute(
            AttributeSchema::new(
                "plan_history",
                AttributeType::List(Box::new(AttributeType::Map(Box::new(
                    AttributeType::String,
                )))),
            )
            .computed()
            .with_description("The plan history of the instance."),
        )
        .attribute(computed(
            "resource_aliases_url",
            "The relative path to the resource aliases for the instance.",
        ))
        .attribute(computed(
            "resource_bindings_url",
            "The relative path to the resource bindings for the instance.",
        ))
        .attribute(computed(
            "resource_keys_url",
            "The relative path to the resource keys for the instance.",
        ))
        .attribute(computed("created_at", "The date when the instance was created."))
        .attribute(computed("created_by", "The subject who created the instance."))
        .attribute(computed("update_at", "The date when the instance was last updated."))
        .attribute(computed("update_by", "The subject who updated the instance."))
        .attribute(computed("deleted_at", "The date when the instance was deleted."))
        .attribute(computed("deleted_by", "The subject who deleted the instance."))
        .attribute(computed(
            "scheduled_reclaim_at",
            "The date when the instance was scheduled for reclamation.",
        ))
        .attribute(computed(
            "scheduled_reclaim_by",
            "The subject who initiated the instance reclamation.",
        ))
        .attribute(computed(
            "restored_at",
            "The date when the instance under reclamation was restored.",
        ))
        .attribute(computed(
            "restored_by",
            "The subject who restored the instance back from reclamation.",
        ))
        .attribute(computed("resource_name", "The name of the resource"))
        .attribute(computed("resource_crn", "The crn of the resource"))
        .attribute(computed("resource_status", "The status of the resource"))
        .attribute(computed(
            "resource_group_name",
            "The resource group name in which resource is provisioned",
        ))
        .attribute(computed(
            "resource_controller_url",
            "The URL of the IBM Cloud dashboard that can be used to explore and view details about the resource",
        ))
        .attribute(
            AttributeSchema::new(
                "extensions",
                AttributeType::Map(Box::new(AttributeType::String)),
            )
            .computed()
            .with_description(
                "The extended metadata as a map associated with the resource instance.",
            ),
        )
}

#[cfg(test)]
mod tests {
    use carina_core::schema::TypeError;

    use super::*;

    fn config() -> ResourceInstanceConfig {
        ResourceInstanceConfig::new("db", "example-db", "standard", "us-south")
    }

    #[test]
    fn test_service_endpoints_round_trip_names() {
        for name in ServiceEndpoints::ALL {
            let parsed: ServiceEndpoints = name.parse().unwrap();
            assert_eq!(parsed.as_str(), name);
        }
        assert!("internal".parse::<ServiceEndpoints>().is_err());
    }

    #[test]
    fn test_minimal_config_is_valid() {
        let schema = resource_instance_schema();
        assert!(schema.validate(&config().to_attributes()).is_ok());
    }

    #[test]
    fn test_full_config_is_valid() {
        let config = config()
            .with_resource_group("rg-1")
            .with_parameter("legacy", "true")
            .with_tag("env:prod")
            .with_tag("team.db")
            .with_service_endpoints(ServiceEndpoints::Private);
        assert!(resource_instance_schema()
            .validate(&config.to_attributes())
            .is_ok());
    }

    #[test]
    fn test_invalid_tag_is_rejected() {
        let config = config().with_tag("bad/tag");
        let errors = resource_instance_schema()
            .validate(&config.to_attributes())
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            TypeError::AttributeError { name, inner } => {
                assert_eq!(name, "tags");
                assert!(matches!(**inner, TypeError::ListItemError { index: 0, .. }));
            }
            other => panic!("Expected AttributeError, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_tag_length() {
        assert!(validate_tag(&Value::from("a")).is_ok());
        assert!(validate_tag(&Value::from("x".repeat(128))).is_ok());
        assert!(validate_tag(&Value::from("x".repeat(129))).is_err());
        assert!(validate_tag(&Value::from("")).is_err());
        assert!(validate_tag(&Value::Bool(true)).is_err());
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = resource_instance_schema()
            .validate(&HashMap::new())
            .unwrap_err();
        let missing: Vec<String> = errors
            .iter()
            .filter_map(|e| match e {
                TypeError::MissingRequired { name } => Some(name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(missing, vec!["location", "name", "plan", "service"]);
    }

    #[test]
    fn test_service_and_location_force_replacement() {
        assert_eq!(
            resource_instance_schema().force_new_attributes(),
            vec!["location", "resource_group_id", "service"]
        );
    }

    #[test]
    fn test_inherit_computed_keeps_prior_values_for_unset_fields() {
        let prior = config()
            .with_resource_group("rg-1")
            .with_tag("team")
            .with_service_endpoints(ServiceEndpoints::Public)
            .with_parameter("legacy", "true");

        let mut desired = config();
        desired.inherit_computed(&prior);
        assert_eq!(desired.resource_group_id.as_deref(), Some("rg-1"));
        assert_eq!(desired.tag_list(), vec!["team"]);
        assert_eq!(desired.service_endpoints, Some(ServiceEndpoints::Public));
        // Plain optional fields are not inherited
        assert!(desired.parameters.is_empty());

        let mut explicit = config()
            .with_tag("env:prod")
            .with_service_endpoints(ServiceEndpoints::Private);
        explicit.inherit_computed(&prior);
        assert_eq!(explicit.tag_list(), vec!["env:prod"]);
        assert_eq!(explicit.service_endpoints, Some(ServiceEndpoints::Private));
    }

    #[test]
    fn test_to_attributes_omits_unset_optionals() {
        let attrs = config().to_attributes();
        assert_eq!(attrs.len(), 4);
        assert!(!attrs.contains_key("resource_group_id"));
        assert!(!attrs.contains_key("tags"));
    }
}
