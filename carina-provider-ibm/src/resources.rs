//! Resource type definitions for the IBM Cloud provider

use carina_core::provider::ResourceType;
use carina_core::schema::ResourceSchema;

use crate::schemas::{RESOURCE_INSTANCE, resource_instance_schema};

/// `ibm_resource_instance`
pub struct ResourceInstanceType;

impl ResourceType for ResourceInstanceType {
    fn name(&self) -> &'static str {
        RESOURCE_INSTANCE
    }

    fn schema(&self) -> ResourceSchema {
        resource_instance_schema()
    }
}

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![Box::new(ResourceInstanceType)]
}
