//! REST implementation of the remote collaborators
//!
//! One `IbmHttpClient` serves the resource controller, global catalog,
//! global tagging and resource manager APIs. Requests carry an IAM bearer
//! token obtained from the configured API key and cached until shortly
//! before it expires.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, error};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value as JsonValue, json};
use tokio::sync::Mutex;

use crate::api::{
    ApiError, ApiResult, CatalogApi, CreateInstanceRequest, Deployment, ResourceControllerApi,
    ResourceGroupApi, ResourceInstance, ServiceOffering, TaggingApi, UpdateInstanceRequest,
    tag_changes,
};
use crate::config::IbmProviderConfig;

/// Maximum length of response body kept in error messages
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Upper bound on a single request, connection included
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// Tokens are refreshed this long before they expire
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// HTTP client for the IBM Cloud platform APIs
pub struct IbmHttpClient {
    client: Client,
    config: IbmProviderConfig,
    token: Mutex<Option<CachedToken>>,
}

impl IbmHttpClient {
    /// Create a client that authenticates with `config.api_key`
    pub fn new(config: IbmProviderConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("carina-provider-ibm/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    /// Create a client that always sends `token` and never calls IAM
    pub fn with_token(config: IbmProviderConfig, token: impl Into<String>) -> ApiResult<Self> {
        let client = Self::new(config)?;
        *client.token.try_lock().map_err(|_| ApiError::transport("token cache busy"))? =
            Some(CachedToken {
                access_token: token.into(),
                expires_at: DateTime::<Utc>::MAX_UTC,
            });
        Ok(client)
    }

    pub fn config(&self) -> &IbmProviderConfig {
        &self.config
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    async fn bearer_token(&self) -> ApiResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Utc::now()
        {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> ApiResult<CachedToken> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: i64,
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::transport("No API key configured (set IC_API_KEY)"))?;

        let url = format!("{}/identity/token", self.config.iam_url);
        debug!("POST {}", url);
        let request = self.client.post(&url).form(&[
            ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
            ("apikey", api_key),
        ]);
        let response: TokenResponse = receive_json(request).await?;

        let lifetime = (response.expires_in - TOKEN_REFRESH_MARGIN_SECS).max(0);
        Ok(CachedToken {
            access_token: response.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        })
    }

    // =========================================================================
    // Request Helpers
    // =========================================================================

    async fn request(&self, method: Method, url: Url) -> ApiResult<RequestBuilder> {
        debug!("{} {}", method, url);
        let token = self.bearer_token().await?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        receive_json(self.request(Method::GET, url).await?).await
    }
}

/// Append path segments to a base URL, percent-encoding each one
fn endpoint(base: &str, segments: &[&str]) -> ApiResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| ApiError::transport(format!("Invalid endpoint {}: {}", base, e)))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::transport(format!("Invalid endpoint {}", base)))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

async fn send(request: RequestBuilder) -> ApiResult<String> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::transport(format!("Failed to send request: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::transport(format!("Failed to read response body: {}", e)))?;

    if !status.is_success() {
        let message = error_message(&body);
        if status.as_u16() != 404 && status.as_u16() != 410 {
            error!("API error: {} - {}", status, message);
        }
        return Err(ApiError::with_status(status.as_u16(), message));
    }
    Ok(body)
}

async fn receive_json<T: DeserializeOwned>(request: RequestBuilder) -> ApiResult<T> {
    let body = send(request).await?;
    serde_json::from_str(&body)
        .map_err(|e| ApiError::transport(format!("Failed to parse response JSON: {}", e)))
}

/// Pull the service's error message out of a response body
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<JsonValue>(body) {
        let message = json
            .get("message")
            .or_else(|| json.pointer("/errors/0/message"))
            .or_else(|| json.get("errorMessage"))
            .and_then(|m| m.as_str());
        if let Some(message) = message {
            return message.to_string();
        }
    }
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    }
}

// =============================================================================
// Resource Controller
// =============================================================================

#[async_trait]
impl ResourceControllerApi for IbmHttpClient {
    async fn create_instance(&self, request: &CreateInstanceRequest) -> ApiResult<ResourceInstance> {
        let url = endpoint(&self.config.resource_controller_url, &["v2", "resource_instances"])?;
        receive_json(self.request(Method::POST, url).await?.json(request)).await
    }

    async fn get_instance(&self, id: &str) -> ApiResult<ResourceInstance> {
        let url = endpoint(
            &self.config.resource_controller_url,
            &["v2", "resource_instances", id],
        )?;
        self.get_json(url).await
    }

    async fn update_instance(
        &self,
        id: &str,
        request: &UpdateInstanceRequest,
    ) -> ApiResult<ResourceInstance> {
        let url = endpoint(
            &self.config.resource_controller_url,
            &["v2", "resource_instances", id],
        )?;
        receive_json(self.request(Method::PATCH, url).await?.json(request)).await
    }

    async fn delete_instance(&self, id: &str, recursive: bool) -> ApiResult<()> {
        let mut url = endpoint(
            &self.config.resource_controller_url,
            &["v2", "resource_instances", id],
        )?;
        url.query_pairs_mut()
            .append_pair("recursive", if recursive { "true" } else { "false" });
        send(self.request(Method::DELETE, url).await?).await?;
        Ok(())
    }
}

// =============================================================================
// Global Catalog
// =============================================================================

#[derive(Debug, Deserialize)]
struct CatalogList {
    #[serde(default)]
    resources: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    name: String,
    #[serde(default)]
    catalog_crn: Option<String>,
    #[serde(default)]
    metadata: Option<CatalogMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogMetadata {
    #[serde(default)]
    rc_compatible: bool,
    #[serde(default)]
    service: Option<ServiceMetadata>,
    #[serde(default)]
    deployment: Option<DeploymentMetadata>,
}

#[derive(Debug, Deserialize)]
struct ServiceMetadata {
    #[serde(default)]
    rc_provisionable: bool,
}

#[derive(Debug, Deserialize)]
struct DeploymentMetadata {
    #[serde(default)]
    location: String,
}

impl IbmHttpClient {
    async fn catalog_entry(&self, id: &str) -> ApiResult<CatalogEntry> {
        let url = endpoint(&self.config.global_catalog_url, &["api", "v1", id])?;
        self.get_json(url).await
    }

    async fn catalog_children(&self, id: &str, kind: &str) -> ApiResult<Vec<CatalogEntry>> {
        let url = endpoint(&self.config.global_catalog_url, &["api", "v1", id, kind])?;
        let list: CatalogList = self.get_json(url).await?;
        Ok(list.resources)
    }
}

#[async_trait]
impl CatalogApi for IbmHttpClient {
    async fn find_service_by_name(
        &self,
        name: &str,
        include_children: bool,
    ) -> ApiResult<Vec<ServiceOffering>> {
        let mut url = endpoint(&self.config.global_catalog_url, &["api", "v1"])?;
        url.query_pairs_mut()
            .append_pair("q", &format!("name:{} active:true", name))
            .append_pair("complete", "true");
        if include_children {
            url.query_pairs_mut().append_pair("include", "*");
        }

        let list: CatalogList = self.get_json(url).await?;
        Ok(list
            .resources
            .into_iter()
            .filter(|entry| entry.name == name)
            .map(|entry| ServiceOffering {
                rc_provisionable: entry
                    .metadata
                    .as_ref()
                    .and_then(|m| m.service.as_ref())
                    .map(|s| s.rc_provisionable),
                id: entry.id,
                name: entry.name,
            })
            .collect())
    }

    async fn get_plan_id(
        &self,
        offering: &ServiceOffering,
        plan_name: &str,
    ) -> ApiResult<Option<String>> {
        let plans = self.catalog_children(&offering.id, "plan").await?;
        Ok(plans
            .into_iter()
            .find(|plan| plan.name == plan_name)
            .map(|plan| plan.id))
    }

    async fn get_plan_name(&self, plan_id: &str) -> ApiResult<String> {
        Ok(self.catalog_entry(plan_id).await?.name)
    }

    async fn get_service_name(&self, resource_id: &str) -> ApiResult<String> {
        Ok(self.catalog_entry(resource_id).await?.name)
    }

    async fn list_deployments(&self, plan_id: &str) -> ApiResult<Vec<Deployment>> {
        let entries = self.catalog_children(plan_id, "deployment").await?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let metadata = entry.metadata.unwrap_or_default();
                Deployment {
                    catalog_crn: entry.catalog_crn.unwrap_or(entry.id),
                    rc_compatible: metadata.rc_compatible,
                    location: metadata.deployment.map(|d| d.location).unwrap_or_default(),
                }
            })
            .collect())
    }
}

// =============================================================================
// Global Tagging
// =============================================================================

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    items: Vec<TagItem>,
}

#[derive(Debug, Deserialize)]
struct TagItem {
    name: String,
}

impl IbmHttpClient {
    async fn post_tags(&self, action: &str, crn: &str, tags: &[String]) -> ApiResult<()> {
        let url = endpoint(&self.config.global_tagging_url, &["v3", "tags", action])?;
        let body = json!({
            "resources": [{"resource_id": crn}],
            "tag_names": tags,
        });
        send(self.request(Method::POST, url).await?.json(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl TaggingApi for IbmHttpClient {
    async fn get_tags_for_crn(&self, crn: &str) -> ApiResult<Vec<String>> {
        let mut url = endpoint(&self.config.global_tagging_url, &["v3", "tags"])?;
        url.query_pairs_mut().append_pair("attached_to", crn);
        let list: TagList = self.get_json(url).await?;
        Ok(list.items.into_iter().map(|t| t.name).collect())
    }

    async fn update_tags_for_crn(
        &self,
        old: &[String],
        new: &[String],
        crn: &str,
    ) -> ApiResult<()> {
        let (detach, attach) = tag_changes(old, new);
        if !detach.is_empty() {
            self.post_tags("detach", crn, &detach).await?;
        }
        if !attach.is_empty() {
            self.post_tags("attach", crn, &attach).await?;
        }
        Ok(())
    }
}

// =============================================================================
// Resource Manager
// =============================================================================

#[derive(Debug, Deserialize)]
struct ResourceGroupList {
    #[serde(default)]
    resources: Vec<ResourceGroup>,
}

#[derive(Debug, Deserialize)]
struct ResourceGroup {
    id: String,
}

#[async_trait]
impl ResourceGroupApi for IbmHttpClient {
    async fn default_resource_group(&self) -> ApiResult<String> {
        let mut url = endpoint(&self.config.resource_manager_url, &["v2", "resource_groups"])?;
        url.query_pairs_mut().append_pair("default", "true");
        if let Some(account_id) = &self.config.account_id {
            url.query_pairs_mut().append_pair("account_id", account_id);
        }

        let list: ResourceGroupList = self.get_json(url).await?;
        list.resources
            .into_iter()
            .next()
            .map(|group| group.id)
            .ok_or_else(|| ApiError::with_status(404, "No default resource group found"))
    }
}
