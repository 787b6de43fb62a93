//! Carina IBM Cloud Provider
//!
//! Manages `ibm_resource_instance`: instances of catalog services provisioned
//! through the IBM Cloud resource controller.
//!
//! ## Module Structure
//!
//! - `api` - Remote collaborator traits and wire types
//! - `config` - Provider configuration
//! - `error` - Error taxonomy
//! - `http` - REST implementation of the collaborators
//! - `provider` - IbmProvider implementation
//! - `resources` - Resource type definitions
//! - `schemas` - Resource instance schema and typed records
//! - `utils` - Deployment filtering, parameter coercion and value conversion

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod resources;
pub mod schemas;
pub mod utils;

// Re-export main types
pub use config::IbmProviderConfig;
pub use error::{IbmError, IbmResult};
pub use provider::{IbmClients, IbmProvider};
pub use schemas::{
    ResourceInstanceAttributes, ResourceInstanceConfig, ResourceInstanceData, ServiceEndpoints,
};
pub use utils::{coerce_parameters, filter_deployments};

use carina_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use carina_core::resource::{ResourceData, ResourceId};

use resources::resource_types;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for IbmProvider {
    type Config = ResourceInstanceConfig;
    type Attributes = ResourceInstanceAttributes;

    fn name(&self) -> &'static str {
        "ibm"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn create<'a>(
        &'a self,
        data: &'a mut ResourceInstanceData,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        let id = data.id.clone();
        Box::pin(async move {
            self.create_instance(data)
                .await
                .map_err(|e| e.into_provider_error(&id))
        })
    }

    fn read<'a>(&'a self, data: &'a mut ResourceInstanceData) -> BoxFuture<'a, ProviderResult<()>> {
        let id = data.id.clone();
        Box::pin(async move {
            self.read_instance(data)
                .await
                .map_err(|e| e.into_provider_error(&id))
        })
    }

    fn update<'a>(
        &'a self,
        prior: &'a ResourceInstanceConfig,
        data: &'a mut ResourceInstanceData,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        let id = data.id.clone();
        Box::pin(async move {
            self.update_instance(prior, data)
                .await
                .map_err(|e| e.into_provider_error(&id))
        })
    }

    fn delete<'a>(
        &'a self,
        data: &'a mut ResourceInstanceData,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        let id = data.id.clone();
        Box::pin(async move {
            self.delete_instance(data)
                .await
                .map_err(|e| e.into_provider_error(&id))
        })
    }

    fn exists<'a>(
        &'a self,
        data: &'a mut ResourceInstanceData,
    ) -> BoxFuture<'a, ProviderResult<bool>> {
        let id = data.id.clone();
        Box::pin(async move {
            self.instance_exists(data)
                .await
                .map_err(|e| e.into_provider_error(&id))
        })
    }

    /// Import is a read keyed on the given identifier
    fn import<'a>(
        &'a self,
        id: &'a ResourceId,
        identifier: &'a str,
    ) -> BoxFuture<'a, ProviderResult<ResourceInstanceData>> {
        Box::pin(async move {
            let mut data = ResourceData::new(id.clone(), ResourceInstanceConfig::default())
                .with_identifier(identifier);
            self.read_instance(&mut data)
                .await
                .map_err(|e| e.into_provider_error(id))?;
            Ok(data)
        })
    }
}
