//! Error types for the resource instance provider

use carina_core::provider::ProviderError;
use carina_core::resource::ResourceId;
use carina_core::schema::TypeError;
use carina_core::waiter::WaitError;
use thiserror::Error;

use crate::api::{ApiError, ResourceInstance};

/// Errors raised while managing a resource instance
#[derive(Debug, Error)]
pub enum IbmError {
    /// Configuration rejected by the resource schema
    #[error("Invalid configuration: {}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    InvalidConfig { errors: Vec<TypeError> },

    /// Catalog lookup of the service offering failed or found nothing
    #[error("Error retrieving service offering {service}: {reason}")]
    ServiceNotFound { service: String, reason: String },

    #[error("{service} cannot be provisioned by resource controller")]
    NotProvisionable { service: String },

    #[error(
        "Cannot create instance of resource {service}\nUse 'ibm_service_instance' if the resource is a Cloud Foundry service"
    )]
    CloudFoundryOnly { service: String },

    #[error("Error retrieving plan {plan}: {reason}")]
    PlanNotFound { plan: String, reason: String },

    #[error("No deployment found for service plan : {plan}")]
    NoDeployments { plan: String },

    #[error(
        "No deployment found for service plan {plan} at location {location}.\nValid location(s) are: {}.\nUse 'ibm_service_instance' if the service is a Cloud Foundry service.",
        quoted_list(valid_locations)
    )]
    LocationNotSupported {
        plan: String,
        location: String,
        valid_locations: Vec<String>,
    },

    /// A remote call failed
    #[error("Error {operation}: {source}")]
    Api {
        operation: &'static str,
        #[source]
        source: ApiError,
    },

    /// Polling did not reach the target state
    #[error("Error waiting for resource instance ({id}) to be {goal}: {source}")]
    Wait {
        id: String,
        goal: &'static str,
        #[source]
        source: WaitError<ResourceInstance, ApiError>,
    },

    #[error("Resource instance has no identifier")]
    MissingIdentifier,
}

impl IbmError {
    pub fn api(operation: &'static str, source: ApiError) -> Self {
        IbmError::Api { operation, source }
    }

    /// HTTP status of the underlying remote failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            IbmError::Api { source, .. } => source.status,
            IbmError::Wait {
                source: WaitError::Refresh(e),
                ..
            } => e.status,
            _ => None,
        }
    }

    /// Wrap into the engine-facing error for `id`
    pub fn into_provider_error(self, id: &ResourceId) -> ProviderError {
        ProviderError::new(self.to_string())
            .for_resource(id.clone())
            .with_cause(self)
    }
}

pub type IbmResult<T> = Result<T, IbmError>;

/// Render `["a" "b"]` the way location lists are shown to users
fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("{:?}", i)).collect();
    format!("[{}]", quoted.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_error_lists_valid_locations() {
        let err = IbmError::LocationNotSupported {
            plan: "standard".to_string(),
            location: "eu-de".to_string(),
            valid_locations: vec!["us-east".to_string(), "us-south".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("at location eu-de"));
        assert!(message.contains(r#"["us-east" "us-south"]"#));
    }

    #[test]
    fn api_error_keeps_status() {
        let err = IbmError::api(
            "creating resource instance",
            ApiError::with_status(409, "conflict"),
        );
        assert_eq!(err.status(), Some(409));
        assert_eq!(
            err.to_string(),
            "Error creating resource instance: conflict (status: 409)"
        );
    }

    #[test]
    fn provider_error_carries_resource_and_source() {
        let id = ResourceId::new("ibm_resource_instance", "db");
        let err = IbmError::MissingIdentifier.into_provider_error(&id);
        assert_eq!(
            err.to_string(),
            "[ibm_resource_instance.db] Resource instance has no identifier"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
