//! IBM Cloud resource instance provider implementation
//!
//! This module sequences catalog lookups, resource controller calls, state
//! polling and tag reconciliation for `ibm_resource_instance`, and projects
//! the live instance back onto the declarative record.
//!
//! Create is not atomic. Once the resource controller has accepted the
//! request the identifier is stored in the record, so an instance whose
//! polling or tagging fails stays reachable for a later read or delete.

use std::sync::Arc;
use std::time::Duration;

use carina_core::differ;
use carina_core::waiter::{NotFound, Refresh, StateChangeConf, WaitError, wait_for_state};
use log::{debug, error, info, warn};
use serde_json::{Map, Value as JsonValue, json};

use crate::api::{
    ApiError, CatalogApi, CreateInstanceRequest, Deployment, ResourceControllerApi,
    ResourceGroupApi, ResourceInstance, ServiceOffering, TaggingApi, UpdateInstanceRequest,
};
use crate::config::IbmProviderConfig;
use crate::error::{IbmError, IbmResult};
use crate::http::IbmHttpClient;
use crate::schemas::{
    PlanHistoryEntry, ResourceInstanceAttributes, ResourceInstanceConfig, ResourceInstanceData,
    resource_instance_schema,
};
use crate::utils::{
    SERVICE_ENDPOINTS_PARAM, coerce_parameters, filter_deployments, flatten, format_timestamp,
    location_from_crn,
};

// Instance states reported by the resource controller
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_IN_PROGRESS: &str = "in progress";
pub const STATUS_PROVISIONING: &str = "provisioning";
pub const STATUS_INACTIVE: &str = "inactive";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_REMOVED: &str = "removed";
pub const STATUS_PENDING_RECLAMATION: &str = "pending_reclamation";

/// Wait before the first poll of an operation
pub const POLL_DELAY: Duration = Duration::from_secs(10);

/// Wait between two polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Remote collaborators used by the provider
#[derive(Clone)]
pub struct IbmClients {
    pub resource_controller: Arc<dyn ResourceControllerApi>,
    pub catalog: Arc<dyn CatalogApi>,
    pub tagging: Arc<dyn TaggingApi>,
    pub resource_groups: Arc<dyn ResourceGroupApi>,
}

impl IbmClients {
    /// Serve every collaborator from one HTTP client
    pub fn from_http(client: Arc<IbmHttpClient>) -> Self {
        Self {
            resource_controller: client.clone(),
            catalog: client.clone(),
            tagging: client.clone(),
            resource_groups: client,
        }
    }
}

/// IBM Cloud resource instance provider
pub struct IbmProvider {
    config: IbmProviderConfig,
    clients: IbmClients,
}

impl IbmProvider {
    /// Create a provider talking to the endpoints in `config`
    pub fn new(config: IbmProviderConfig) -> IbmResult<Self> {
        let client = IbmHttpClient::new(config.clone())
            .map_err(|e| IbmError::api("creating HTTP client", e))?;
        Ok(Self::with_clients(
            config,
            IbmClients::from_http(Arc::new(client)),
        ))
    }

    pub fn with_clients(config: IbmProviderConfig, clients: IbmClients) -> Self {
        Self { config, clients }
    }

    pub fn config(&self) -> &IbmProviderConfig {
        &self.config
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Provision a new instance and populate `data` from it
    pub async fn create_instance(&self, data: &mut ResourceInstanceData) -> IbmResult<()> {
        validate(&data.config)?;
        let config = data.config.clone();

        let offering = self.find_offering(&config.service).await?;
        match offering.rc_provisionable {
            Some(true) => {}
            Some(false) => {
                return Err(IbmError::NotProvisionable {
                    service: config.service,
                });
            }
            None => {
                return Err(IbmError::CloudFoundryOnly {
                    service: config.service,
                });
            }
        }

        let plan_id = self.resolve_plan_id(&offering, &config.plan).await?;
        let target = self
            .resolve_deployment(&plan_id, &config.plan, &config.location)
            .await?;

        let resource_group = match &config.resource_group_id {
            Some(group) => group.clone(),
            None => self
                .clients
                .resource_groups
                .default_resource_group()
                .await
                .map_err(|e| IbmError::api("retrieving default resource group", e))?,
        };

        let request = CreateInstanceRequest {
            name: config.name.clone(),
            target: target.catalog_crn,
            resource_group,
            resource_plan_id: plan_id,
            parameters: build_parameters(&config, None),
        };

        info!(
            "Creating resource instance {} ({} / {}) at {}",
            request.name, config.service, config.plan, config.location
        );
        let instance = self
            .clients
            .resource_controller
            .create_instance(&request)
            .await
            .map_err(|e| {
                error!(
                    "Error when creating resource instance: {}, Instance info NAME->{}, LOCATION->{}, GROUP_ID->{}, PLAN_ID->{}",
                    e, request.name, request.target, request.resource_group, request.resource_plan_id
                );
                IbmError::api("creating resource instance", e)
            })?;

        let identifier = instance.id.clone().ok_or(IbmError::MissingIdentifier)?;
        data.set_identifier(identifier.clone());

        let settled = self
            .wait_for_instance(&identifier, create_state_conf(data.timeouts.create), "created")
            .await?;

        if !config.tags.is_empty() || self.config.env_tags_enabled() {
            let crn = settled.and_then(|i| i.crn).or(instance.crn);
            match crn {
                Some(crn) => {
                    let mut tags = config.tag_list();
                    for tag in self.config.env_tag_list() {
                        if !tags.contains(&tag) {
                            tags.push(tag);
                        }
                    }
                    self.reconcile_tags(&[], &tags, &crn, &identifier).await;
                }
                None => warn!(
                    "Resource instance ({}) has no CRN, skipping tags",
                    identifier
                ),
            }
        }

        self.read_instance(data).await
    }

    /// Refresh `data` from the live instance
    ///
    /// A missing instance is an error here; drift detection goes through
    /// `instance_exists` instead.
    pub async fn read_instance(&self, data: &mut ResourceInstanceData) -> IbmResult<()> {
        let identifier = data.identifier.clone().ok_or(IbmError::MissingIdentifier)?;

        let instance = self
            .clients
            .resource_controller
            .get_instance(&identifier)
            .await
            .map_err(|e| IbmError::api("retrieving resource instance", e))?;

        if let Some(crn) = &instance.crn {
            match self.clients.tagging.get_tags_for_crn(crn).await {
                Ok(tags) => data.config.tags = tags.into_iter().collect(),
                Err(e) => warn!(
                    "Error on get of resource instance tags ({}) tags: {}",
                    identifier, e
                ),
            }
        }

        let service = match &instance.resource_id {
            Some(resource_id) => Some(
                self.clients
                    .catalog
                    .get_service_name(resource_id)
                    .await
                    .map_err(|e| IbmError::api("retrieving service offering", e))?,
            ),
            None => None,
        };
        let plan = match &instance.resource_plan_id {
            Some(plan_id) => Some(
                self.clients
                    .catalog
                    .get_plan_name(plan_id)
                    .await
                    .map_err(|e| IbmError::api("retrieving plan", e))?,
            ),
            None => None,
        };

        apply_config(&instance, service, plan, &mut data.config);
        data.attributes = project_attributes(&instance, &self.config.console_url);
        Ok(())
    }

    /// Apply the fields that changed between `prior` and `data.config`
    pub async fn update_instance(
        &self,
        prior: &ResourceInstanceConfig,
        data: &mut ResourceInstanceData,
    ) -> IbmResult<()> {
        let identifier = data.identifier.clone().ok_or(IbmError::MissingIdentifier)?;
        validate(&data.config)?;
        data.config.inherit_computed(prior);
        let config = data.config.clone();
        let changes = differ::diff(&config.to_attributes(), &prior.to_attributes());

        let mut request = UpdateInstanceRequest::default();

        if changes.has_change("name") {
            request.name = Some(config.name.clone());
        }

        if changes.has_change("plan") {
            let offering = self.find_offering(&config.service).await?;
            request.resource_plan_id = Some(self.resolve_plan_id(&offering, &config.plan).await?);
        }

        if changes.has_change("parameters") || changes.has_change("service_endpoints") {
            // Parameters are replaced wholesale, so carry the live endpoint
            // setting over unless configuration names one
            let live = self.get_instance(&identifier).await?;
            request.parameters = Some(build_parameters(&config, live.parameters.as_ref()));
        }

        if changes.has_change("tags") {
            let live = self.get_instance(&identifier).await?;
            match live.crn {
                Some(crn) => {
                    self.reconcile_tags(&prior.tag_list(), &config.tag_list(), &crn, &identifier)
                        .await
                }
                None => warn!(
                    "Resource instance ({}) has no CRN, skipping tags",
                    identifier
                ),
            }
        }

        if request.is_empty() {
            debug!(
                "No instance fields changed for resource instance ({}), skipping update call",
                identifier
            );
        } else {
            info!("Updating resource instance {}", identifier);
            self.clients
                .resource_controller
                .update_instance(&identifier, &request)
                .await
                .map_err(|e| IbmError::api("updating resource instance", e))?;

            self.wait_for_instance(&identifier, update_state_conf(data.timeouts.update), "updated")
                .await?;
        }

        self.read_instance(data).await
    }

    /// Delete the instance with its bindings, aliases and keys
    pub async fn delete_instance(&self, data: &mut ResourceInstanceData) -> IbmResult<()> {
        let identifier = data.identifier.clone().ok_or(IbmError::MissingIdentifier)?;

        info!("Deleting resource instance {}", identifier);
        match self
            .clients
            .resource_controller
            .delete_instance(&identifier, true)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_gone() => {
                debug!("Resource instance {} is already gone", identifier);
                data.clear_identifier();
                return Ok(());
            }
            Err(e) => return Err(IbmError::api("deleting resource instance", e)),
        }

        self.wait_for_instance(&identifier, delete_state_conf(data.timeouts.delete), "deleted")
            .await?;

        data.clear_identifier();
        Ok(())
    }

    /// Whether the instance still exists
    ///
    /// Instances that are removed or pending reclamation count as absent and
    /// lose their identifier so the next plan re-creates them.
    pub async fn instance_exists(&self, data: &mut ResourceInstanceData) -> IbmResult<bool> {
        let Some(identifier) = data.identifier.clone() else {
            return Ok(false);
        };

        let instance = match self
            .clients
            .resource_controller
            .get_instance(&identifier)
            .await
        {
            Ok(instance) => instance,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(IbmError::api("getting resource instance", e)),
        };

        let state = instance.state();
        if state.contains(STATUS_REMOVED) || state.contains(STATUS_PENDING_RECLAMATION) {
            warn!(
                "Removing instance {} from state because it's in removed or pending_reclamation state",
                identifier
            );
            data.clear_identifier();
            return Ok(false);
        }

        Ok(instance.id.as_deref() == Some(identifier.as_str()))
    }

    // =========================================================================
    // Catalog Lookups
    // =========================================================================

    async fn find_offering(&self, service: &str) -> IbmResult<ServiceOffering> {
        let offerings = self
            .clients
            .catalog
            .find_service_by_name(service, true)
            .await
            .map_err(|e| IbmError::ServiceNotFound {
                service: service.to_string(),
                reason: e.to_string(),
            })?;

        offerings
            .into_iter()
            .next()
            .ok_or_else(|| IbmError::ServiceNotFound {
                service: service.to_string(),
                reason: "no matching offering in the catalog".to_string(),
            })
    }

    async fn resolve_plan_id(&self, offering: &ServiceOffering, plan: &str) -> IbmResult<String> {
        let plan_id = self
            .clients
            .catalog
            .get_plan_id(offering, plan)
            .await
            .map_err(|e| IbmError::PlanNotFound {
                plan: plan.to_string(),
                reason: e.to_string(),
            })?;

        plan_id.ok_or_else(|| IbmError::PlanNotFound {
            plan: plan.to_string(),
            reason: format!("no such plan for service {}", offering.name),
        })
    }

    /// Pick the first compatible deployment of the plan at `location`
    async fn resolve_deployment(
        &self,
        plan_id: &str,
        plan: &str,
        location: &str,
    ) -> IbmResult<Deployment> {
        let deployments = self
            .clients
            .catalog
            .list_deployments(plan_id)
            .await
            .map_err(|e| IbmError::api("retrieving deployments", e))?;
        if deployments.is_empty() {
            return Err(IbmError::NoDeployments {
                plan: plan.to_string(),
            });
        }

        let (matching, locations) = filter_deployments(&deployments, location);
        matching
            .into_iter()
            .next()
            .ok_or_else(|| IbmError::LocationNotSupported {
                plan: plan.to_string(),
                location: location.to_string(),
                valid_locations: locations.into_iter().collect(),
            })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn get_instance(&self, identifier: &str) -> IbmResult<ResourceInstance> {
        self.clients
            .resource_controller
            .get_instance(identifier)
            .await
            .map_err(|e| IbmError::api("getting resource instance", e))
    }

    /// Tag failures never fail the operation
    async fn reconcile_tags(&self, old: &[String], new: &[String], crn: &str, identifier: &str) {
        if let Err(e) = self.clients.tagging.update_tags_for_crn(old, new, crn).await {
            warn!(
                "Error on update of resource instance ({}) tags: {}",
                identifier, e
            );
        }
    }

    async fn wait_for_instance(
        &self,
        identifier: &str,
        conf: StateChangeConf,
        goal: &'static str,
    ) -> IbmResult<Option<ResourceInstance>> {
        let controller = self.clients.resource_controller.as_ref();
        let outcome = wait_for_state(&conf, || async move {
            refresh_instance(controller, identifier).await
        })
        .await
        .map_err(|source: WaitError<ResourceInstance, ApiError>| IbmError::Wait {
            id: identifier.to_string(),
            goal,
            source,
        })?;
        Ok(outcome.into_value())
    }
}

// =============================================================================
// State Tables
// =============================================================================

fn create_state_conf(timeout: Duration) -> StateChangeConf {
    StateChangeConf::new(
        &[STATUS_IN_PROGRESS, STATUS_INACTIVE, STATUS_PROVISIONING],
        &[STATUS_ACTIVE],
        timeout,
    )
    .with_failure(STATUS_FAILED)
    .with_delay(POLL_DELAY)
    .with_min_interval(POLL_INTERVAL)
}

fn update_state_conf(timeout: Duration) -> StateChangeConf {
    StateChangeConf::new(&[STATUS_IN_PROGRESS, STATUS_INACTIVE], &[STATUS_ACTIVE], timeout)
        .with_failure(STATUS_FAILED)
        .with_delay(POLL_DELAY)
        .with_min_interval(POLL_INTERVAL)
}

/// A deleted instance may be purged before it is ever seen as removed
fn delete_state_conf(timeout: Duration) -> StateChangeConf {
    StateChangeConf::new(
        &[STATUS_IN_PROGRESS, STATUS_INACTIVE, STATUS_ACTIVE],
        &[STATUS_REMOVED, STATUS_PENDING_RECLAMATION],
        timeout,
    )
    .with_failure(STATUS_FAILED)
    .with_delay(POLL_DELAY)
    .with_min_interval(POLL_INTERVAL)
    .with_not_found(NotFound::Complete)
}

async fn refresh_instance(
    controller: &dyn ResourceControllerApi,
    identifier: &str,
) -> Result<Refresh<ResourceInstance>, ApiError> {
    match controller.get_instance(identifier).await {
        Ok(instance) => {
            let state = instance.state().to_string();
            Ok(Refresh::Current {
                value: instance,
                state,
            })
        }
        Err(e) if e.is_not_found() => Ok(Refresh::Gone),
        Err(e) => Err(e),
    }
}

// =============================================================================
// Value Conversion
// =============================================================================

fn validate(config: &ResourceInstanceConfig) -> IbmResult<()> {
    resource_instance_schema()
        .validate(&config.to_attributes())
        .map_err(|errors| IbmError::InvalidConfig { errors })
}

/// Coerced parameters plus the `service-endpoints` key
///
/// The configured endpoint type wins over a same-named generic parameter;
/// without one, an endpoint type already set on `live` is carried over.
fn build_parameters(
    config: &ResourceInstanceConfig,
    live: Option<&Map<String, JsonValue>>,
) -> Map<String, JsonValue> {
    let mut params = coerce_parameters(&config.parameters);
    match config.service_endpoints {
        Some(endpoints) => {
            params.insert(SERVICE_ENDPOINTS_PARAM.to_string(), json!(endpoints.as_str()));
        }
        None => {
            if let Some(existing) = live.and_then(|p| p.get(SERVICE_ENDPOINTS_PARAM)) {
                params.insert(SERVICE_ENDPOINTS_PARAM.to_string(), existing.clone());
            }
        }
    }
    params
}

/// Copy the user-facing fields of the live instance into the configuration
fn apply_config(
    instance: &ResourceInstance,
    service: Option<String>,
    plan: Option<String>,
    config: &mut ResourceInstanceConfig,
) {
    if let Some(name) = &instance.name {
        config.name = name.clone();
    }
    if let Some(service) = service {
        config.service = service;
    }
    if let Some(plan) = plan {
        config.plan = plan;
    }
    if let Some(location) = instance.crn.as_deref().and_then(location_from_crn) {
        config.location = location.to_string();
    }
    if instance.resource_group_id.is_some() {
        config.resource_group_id = instance.resource_group_id.clone();
    }
    if let Some(endpoints) = instance
        .parameters
        .as_ref()
        .and_then(|p| p.get(SERVICE_ENDPOINTS_PARAM))
        .and_then(|v| v.as_str())
    {
        match endpoints.parse() {
            Ok(endpoints) => config.service_endpoints = Some(endpoints),
            Err(e) => warn!("Ignoring service endpoints of resource instance: {}", e),
        }
    }
}

fn project_attributes(instance: &ResourceInstance, console_url: &str) -> ResourceInstanceAttributes {
    let timestamp = |ts: &Option<chrono::DateTime<chrono::Utc>>| ts.as_ref().map(format_timestamp);

    ResourceInstanceAttributes {
        status: instance.state.clone(),
        crn: instance.crn.clone(),
        guid: instance.guid.clone(),
        dashboard_url: instance.dashboard_url.clone(),
        plan_history: instance
            .plan_history
            .iter()
            .flatten()
            .map(|item| PlanHistoryEntry {
                resource_plan_id: item.resource_plan_id.clone(),
                start_date: format_timestamp(&item.start_date),
            })
            .collect(),
        account_id: instance.account_id.clone(),
        resource_group_crn: instance.resource_group_crn.clone(),
        resource_id: instance.resource_id.clone(),
        resource_plan_id: instance.resource_plan_id.clone(),
        target_crn: instance.target_crn.clone(),
        state: instance.state.clone(),
        type_: instance.type_.clone(),
        sub_type: instance.sub_type.clone(),
        allow_cleanup: instance.allow_cleanup,
        locked: instance.locked,
        last_operation: instance
            .last_operation
            .as_ref()
            .map(flatten)
            .unwrap_or_default(),
        resource_aliases_url: instance.resource_aliases_url.clone(),
        resource_bindings_url: instance.resource_bindings_url.clone(),
        resource_keys_url: instance.resource_keys_url.clone(),
        created_at: timestamp(&instance.created_at),
        created_by: instance.created_by.clone(),
        update_at: timestamp(&instance.updated_at),
        update_by: instance.updated_by.clone(),
        deleted_at: timestamp(&instance.deleted_at),
        deleted_by: instance.deleted_by.clone(),
        scheduled_reclaim_at: timestamp(&instance.scheduled_reclaim_at),
        scheduled_reclaim_by: instance.scheduled_reclaim_by.clone(),
        restored_at: timestamp(&instance.restored_at),
        restored_by: instance.restored_by.clone(),
        resource_name: instance.name.clone(),
        resource_crn: instance.crn.clone(),
        resource_status: instance.state.clone(),
        resource_group_name: instance.resource_group_crn.clone(),
        resource_controller_url: Some(format!("{}/services/", console_url)),
        extensions: instance
            .extensions
            .as_ref()
            .map(|e| flatten(&JsonValue::Object(e.clone())))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::api::PlanHistoryItem;
    use crate::schemas::ServiceEndpoints;

    fn instance() -> ResourceInstance {
        ResourceInstance {
            id: Some("inst-1".to_string()),
            name: Some("db".to_string()),
            state: Some("active".to_string()),
            crn: Some("crn:v1:bluemix:public:example-db:us-south:a/acc:guid-1::".to_string()),
            resource_group_id: Some("rg-1".to_string()),
            resource_group_crn: Some("crn:v1:rg".to_string()),
            parameters: Some(
                json!({"service-endpoints": "private"})
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_parameters_prefers_configured_endpoints() {
        let config = ResourceInstanceConfig::new("db", "example-db", "standard", "us-south")
            .with_parameter("service-endpoints", "public")
            .with_parameter("legacy", "true")
            .with_service_endpoints(ServiceEndpoints::PublicAndPrivate);

        let params = build_parameters(&config, None);
        assert_eq!(params["service-endpoints"], json!("public-and-private"));
        assert_eq!(params["legacy"], json!(true));
    }

    #[test]
    fn test_build_parameters_carries_live_endpoints() {
        let config = ResourceInstanceConfig::new("db", "example-db", "standard", "us-south")
            .with_parameter("members", "[\"a\",\"b\"]");
        let live = instance().parameters;

        let params = build_parameters(&config, live.as_ref());
        assert_eq!(params["service-endpoints"], json!("private"));
        assert_eq!(params["members"], json!(["a", "b"]));
    }

    #[test]
    fn test_build_parameters_without_endpoints() {
        let config = ResourceInstanceConfig::new("db", "example-db", "standard", "us-south");
        assert!(build_parameters(&config, None).is_empty());
    }

    #[test]
    fn test_apply_config_reads_location_from_crn() {
        let mut config = ResourceInstanceConfig::default();
        apply_config(
            &instance(),
            Some("example-db".to_string()),
            Some("standard".to_string()),
            &mut config,
        );
        assert_eq!(config.name, "db");
        assert_eq!(config.service, "example-db");
        assert_eq!(config.plan, "standard");
        assert_eq!(config.location, "us-south");
        assert_eq!(config.resource_group_id.as_deref(), Some("rg-1"));
        assert_eq!(config.service_endpoints, Some(ServiceEndpoints::Private));
    }

    #[test]
    fn test_project_attributes_formats_present_timestamps_only() {
        let created: DateTime<Utc> = "2021-03-04T05:06:07Z".parse().unwrap();
        let instance = ResourceInstance {
            created_at: Some(created),
            plan_history: Some(vec![PlanHistoryItem {
                resource_plan_id: "plan-1".to_string(),
                start_date: created,
            }]),
            last_operation: Some(json!({"type": "create", "state": "succeeded"})),
            ..instance()
        };

        let attrs = project_attributes(&instance, "https://cloud.ibm.com");
        assert_eq!(attrs.created_at.as_deref(), Some("2021-03-04T05:06:07.000Z"));
        assert_eq!(attrs.deleted_at, None);
        assert_eq!(attrs.scheduled_reclaim_at, None);
        assert_eq!(attrs.plan_history[0].start_date, "2021-03-04T05:06:07.000Z");
        assert_eq!(attrs.last_operation["state"], "succeeded");
        assert_eq!(attrs.status.as_deref(), Some("active"));
        assert_eq!(attrs.resource_group_name.as_deref(), Some("crn:v1:rg"));
        assert_eq!(
            attrs.resource_controller_url.as_deref(),
            Some("https://cloud.ibm.com/services/")
        );
    }

    #[test]
    fn test_state_tables() {
        let create = create_state_conf(Duration::from_secs(600));
        assert!(create.pending.contains(&STATUS_PROVISIONING.to_string()));
        assert_eq!(create.target, vec![STATUS_ACTIVE]);
        assert_eq!(create.not_found, NotFound::Fail);

        let update = update_state_conf(Duration::from_secs(600));
        assert!(!update.pending.contains(&STATUS_PROVISIONING.to_string()));

        let delete = delete_state_conf(Duration::from_secs(600));
        assert!(delete.pending.contains(&STATUS_ACTIVE.to_string()));
        assert_eq!(delete.target, vec![STATUS_REMOVED, STATUS_PENDING_RECLAMATION]);
        assert_eq!(delete.not_found, NotFound::Complete);
    }
}
