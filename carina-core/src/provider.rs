//! Provider - Trait abstracting resource operations
//!
//! A Provider defines the lifecycle operations for the resource types of a
//! specific infrastructure (IBM Cloud, AWS, etc.). The engine drives these
//! callbacks and persists the `ResourceData` they mutate between calls.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::resource::{ResourceData, ResourceId};
use crate::schema::ResourceSchema;

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}.{}] {}", id.resource_type, id.name, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default time allowed for each of create, update and delete
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Per-operation deadlines for long-running lifecycle calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_OPERATION_TIMEOUT,
            update: DEFAULT_OPERATION_TIMEOUT,
            delete: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// Definition of resource types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type name (e.g., "ibm_resource_instance")
    fn name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.name())
    }
}

/// Main Provider trait
///
/// Each infrastructure provider implements this trait for a typed
/// configuration record (`Config`) and the computed attributes it projects
/// from the remote side (`Attributes`). All operations are async and involve
/// side effects; the engine persists whatever they leave in `ResourceData`,
/// including a partially populated record when an operation fails.
pub trait Provider: Send + Sync {
    type Config: Default + Send + Sync;
    type Attributes: Default + Send + Sync;

    /// Name of this Provider (e.g., "ibm")
    fn name(&self) -> &'static str;

    /// List of resource types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Create the resource described by `data.config`
    ///
    /// The identifier is recorded in `data` as soon as the remote side
    /// assigns one, so it survives a failure in any later step.
    fn create<'a>(
        &'a self,
        data: &'a mut ResourceData<Self::Config, Self::Attributes>,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Refresh every field of `data` from the live resource
    fn read<'a>(
        &'a self,
        data: &'a mut ResourceData<Self::Config, Self::Attributes>,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Move the live resource from `prior` to `data.config`
    fn update<'a>(
        &'a self,
        prior: &'a Self::Config,
        data: &'a mut ResourceData<Self::Config, Self::Attributes>,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Delete the resource and clear its identifier
    fn delete<'a>(
        &'a self,
        data: &'a mut ResourceData<Self::Config, Self::Attributes>,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Drift-detection predicate
    ///
    /// Returns `Ok(false)` when the resource is gone. May clear the identifier
    /// so the next plan re-creates it.
    fn exists<'a>(
        &'a self,
        data: &'a mut ResourceData<Self::Config, Self::Attributes>,
    ) -> BoxFuture<'a, ProviderResult<bool>>;

    /// Adopt an existing remote resource by its identifier
    fn import<'a>(
        &'a self,
        id: &'a ResourceId,
        identifier: &'a str,
    ) -> BoxFuture<'a, ProviderResult<ResourceData<Self::Config, Self::Attributes>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mock Provider for testing
    struct MockProvider;

    impl Provider for MockProvider {
        type Config = String;
        type Attributes = Option<String>;

        fn name(&self) -> &'static str {
            "mock"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn create<'a>(
            &'a self,
            data: &'a mut ResourceData<String, Option<String>>,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                data.set_identifier("mock-id-123");
                data.attributes = Some(data.config.clone());
                Ok(())
            })
        }

        fn read<'a>(
            &'a self,
            data: &'a mut ResourceData<String, Option<String>>,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                data.require_identifier()?;
                Ok(())
            })
        }

        fn update<'a>(
            &'a self,
            _prior: &'a String,
            data: &'a mut ResourceData<String, Option<String>>,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                data.attributes = Some(data.config.clone());
                Ok(())
            })
        }

        fn delete<'a>(
            &'a self,
            data: &'a mut ResourceData<String, Option<String>>,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                data.clear_identifier();
                Ok(())
            })
        }

        fn exists<'a>(
            &'a self,
            data: &'a mut ResourceData<String, Option<String>>,
        ) -> BoxFuture<'a, ProviderResult<bool>> {
            Box::pin(async move { Ok(data.identifier.is_some()) })
        }

        fn import<'a>(
            &'a self,
            id: &'a ResourceId,
            identifier: &'a str,
        ) -> BoxFuture<'a, ProviderResult<ResourceData<String, Option<String>>>> {
            Box::pin(async move {
                Ok(ResourceData::new(id.clone(), String::new()).with_identifier(identifier))
            })
        }
    }

    #[tokio::test]
    async fn mock_provider_create_records_identifier() {
        let provider = MockProvider;
        let mut data = ResourceData::new(ResourceId::new("test", "example"), "cfg".to_string());
        provider.create(&mut data).await.unwrap();
        assert_eq!(data.identifier, Some("mock-id-123".to_string()));
        assert!(provider.exists(&mut data).await.unwrap());
    }

    #[tokio::test]
    async fn mock_provider_delete_clears_identifier() {
        let provider = MockProvider;
        let id = ResourceId::new("test", "example");
        let mut data = provider.import(&id, "abc").await.unwrap();
        provider.delete(&mut data).await.unwrap();
        assert!(!provider.exists(&mut data).await.unwrap());
        assert!(provider.read(&mut data).await.is_err());
    }

    #[test]
    fn default_timeouts_are_ten_minutes() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.create, Duration::from_secs(600));
        assert_eq!(timeouts.update, Duration::from_secs(600));
        assert_eq!(timeouts.delete, Duration::from_secs(600));
    }

    #[test]
    fn provider_error_display_includes_resource() {
        let err = ProviderError::new("boom").for_resource(ResourceId::new("instance", "db"));
        assert_eq!(err.to_string(), "[instance.db] boom");
    }
}
