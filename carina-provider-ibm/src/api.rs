//! Remote collaborators of the resource instance provider
//!
//! The provider only talks to IBM Cloud through these traits. `crate::http`
//! implements them over REST; tests substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status: {})", status.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string()))]
pub struct ApiError {
    /// HTTP status code, `None` when no response was received
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(Some(status), message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    pub fn is_gone(&self) -> bool {
        self.status == Some(410)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Resource Controller
// =============================================================================

/// A resource instance as returned by the resource controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceInstance {
    pub id: Option<String>,
    pub guid: Option<String>,
    pub crn: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub account_id: Option<String>,
    pub resource_group_id: Option<String>,
    pub resource_group_crn: Option<String>,
    pub resource_id: Option<String>,
    pub resource_plan_id: Option<String>,
    pub target_crn: Option<String>,
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub sub_type: Option<String>,
    pub allow_cleanup: Option<bool>,
    pub locked: Option<bool>,
    pub last_operation: Option<serde_json::Value>,
    pub dashboard_url: Option<String>,
    pub plan_history: Option<Vec<PlanHistoryItem>>,
    pub extensions: Option<serde_json::Map<String, serde_json::Value>>,
    pub resource_aliases_url: Option<String>,
    pub resource_bindings_url: Option<String>,
    pub resource_keys_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub scheduled_reclaim_at: Option<DateTime<Utc>>,
    pub scheduled_reclaim_by: Option<String>,
    pub restored_at: Option<DateTime<Utc>>,
    pub restored_by: Option<String>,
}

impl ResourceInstance {
    /// Current state, empty when the service omitted it
    pub fn state(&self) -> &str {
        self.state.as_deref().unwrap_or("")
    }
}

/// One entry of an instance's plan history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanHistoryItem {
    pub resource_plan_id: String,
    pub start_date: DateTime<Utc>,
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateInstanceRequest {
    pub name: String,
    /// Catalog CRN of the chosen deployment
    pub target: String,
    pub resource_group: String,
    pub resource_plan_id: String,
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// Body of an update request; only changed fields are populated
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateInstanceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
}

impl UpdateInstanceRequest {
    /// True when no top-level field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.resource_plan_id.is_none() && self.parameters.is_none()
    }
}

#[async_trait]
pub trait ResourceControllerApi: Send + Sync {
    async fn create_instance(&self, request: &CreateInstanceRequest) -> ApiResult<ResourceInstance>;

    async fn get_instance(&self, id: &str) -> ApiResult<ResourceInstance>;

    async fn update_instance(
        &self,
        id: &str,
        request: &UpdateInstanceRequest,
    ) -> ApiResult<ResourceInstance>;

    /// With `recursive`, bindings, aliases and keys are deleted as well
    async fn delete_instance(&self, id: &str, recursive: bool) -> ApiResult<()>;
}

// =============================================================================
// Global Catalog
// =============================================================================

/// A service offering found in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOffering {
    pub id: String,
    pub name: String,
    /// `None` when the offering carries no resource metadata (Cloud Foundry only)
    pub rc_provisionable: Option<bool>,
}

/// A plan/location combination recognized by the resource controller
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub catalog_crn: String,
    pub rc_compatible: bool,
    pub location: String,
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn find_service_by_name(
        &self,
        name: &str,
        include_children: bool,
    ) -> ApiResult<Vec<ServiceOffering>>;

    /// Plan id for a plan name within an offering, `None` when there is no such plan
    async fn get_plan_id(
        &self,
        offering: &ServiceOffering,
        plan_name: &str,
    ) -> ApiResult<Option<String>>;

    async fn get_plan_name(&self, plan_id: &str) -> ApiResult<String>;

    async fn get_service_name(&self, resource_id: &str) -> ApiResult<String>;

    async fn list_deployments(&self, plan_id: &str) -> ApiResult<Vec<Deployment>>;
}

// =============================================================================
// Tagging and Resource Groups
// =============================================================================

#[async_trait]
pub trait TaggingApi: Send + Sync {
    async fn get_tags_for_crn(&self, crn: &str) -> ApiResult<Vec<String>>;

    /// Detach tags only in `old`, attach tags only in `new`
    async fn update_tags_for_crn(&self, old: &[String], new: &[String], crn: &str)
    -> ApiResult<()>;
}

#[async_trait]
pub trait ResourceGroupApi: Send + Sync {
    /// Id of the account's default resource group
    async fn default_resource_group(&self) -> ApiResult<String>;
}

/// Tag names to detach and attach to move from `old` to `new`
pub fn tag_changes(old: &[String], new: &[String]) -> (Vec<String>, Vec<String>) {
    let detach = old.iter().filter(|t| !new.contains(t)).cloned().collect();
    let attach = new.iter().filter(|t| !old.contains(t)).cloned().collect();
    (detach, attach)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_status_helpers() {
        assert!(ApiError::with_status(404, "missing").is_not_found());
        assert!(ApiError::with_status(410, "gone").is_gone());
        assert!(!ApiError::transport("reset").is_not_found());
        assert_eq!(
            ApiError::with_status(500, "boom").to_string(),
            "boom (status: 500)"
        );
        assert_eq!(ApiError::transport("reset").to_string(), "reset (status: none)");
    }

    #[test]
    fn instance_deserializes_with_missing_fields() {
        let instance: ResourceInstance = serde_json::from_value(serde_json::json!({
            "id": "crn:v1:bluemix:public:databases:us-south:a/acc:guid::",
            "state": "active",
            "type": "service_instance",
            "created_at": "2021-03-04T05:06:07.123Z",
            "plan_history": [
                {"resource_plan_id": "plan-1", "start_date": "2021-03-04T05:06:07Z"}
            ]
        }))
        .unwrap();
        assert_eq!(instance.state(), "active");
        assert_eq!(instance.type_.as_deref(), Some("service_instance"));
        assert!(instance.deleted_at.is_none());
        assert_eq!(instance.plan_history.unwrap()[0].resource_plan_id, "plan-1");
    }

    #[test]
    fn update_request_skips_unset_fields() {
        let request = UpdateInstanceRequest {
            name: Some("renamed".to_string()),
            ..Default::default()
        };
        assert!(!request.is_empty());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"name": "renamed"})
        );
        assert!(UpdateInstanceRequest::default().is_empty());
    }

    #[test]
    fn tag_changes_split_detach_and_attach() {
        let old = vec!["a".to_string(), "b".to_string()];
        let new = vec!["b".to_string(), "c".to_string()];
        let (detach, attach) = tag_changes(&old, &new);
        assert_eq!(detach, vec!["a"]);
        assert_eq!(attach, vec!["c"]);
    }
}
