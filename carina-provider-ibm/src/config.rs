//! Provider configuration
//!
//! Endpoints default to the public IBM Cloud services; every one of them can
//! be overridden (tests point them at a local mock server).

use serde::Deserialize;

/// Environment variable holding tags applied to every instance created
pub const ENV_TAGS_VAR: &str = "IC_ENV_TAGS";

/// IBM Cloud provider options
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IbmProviderConfig {
    /// IAM API key used to obtain bearer tokens
    pub api_key: Option<String>,

    /// Account used when resolving the default resource group
    pub account_id: Option<String>,

    /// Comma-separated tags attached on create, read from `IC_ENV_TAGS`
    pub env_tags: Option<String>,

    pub iam_url: String,
    pub resource_controller_url: String,
    pub resource_manager_url: String,
    pub global_catalog_url: String,
    pub global_tagging_url: String,

    /// Base URL of the web console (used for the resource controller URL)
    pub console_url: String,
}

impl Default for IbmProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            account_id: None,
            env_tags: None,
            iam_url: "https://iam.cloud.ibm.com".to_string(),
            resource_controller_url: "https://resource-controller.cloud.ibm.com".to_string(),
            resource_manager_url: "https://resource-controller.cloud.ibm.com".to_string(),
            global_catalog_url: "https://globalcatalog.cloud.ibm.com".to_string(),
            global_tagging_url: "https://tags.global-search-tagging.cloud.ibm.com".to_string(),
            console_url: "https://cloud.ibm.com".to_string(),
        }
    }
}

impl IbmProviderConfig {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| lookup(k).filter(|v| !v.is_empty()))
        };

        let mut config = Self::default();
        config.api_key = first(&["IC_API_KEY", "IBMCLOUD_API_KEY"]);
        config.account_id = first(&["IC_ACCOUNT_ID"]);
        config.env_tags = first(&[ENV_TAGS_VAR]);

        let endpoints: [(&str, &mut String); 6] = [
            ("IBMCLOUD_IAM_API_ENDPOINT", &mut config.iam_url),
            (
                "IBMCLOUD_RESOURCE_CONTROLLER_API_ENDPOINT",
                &mut config.resource_controller_url,
            ),
            (
                "IBMCLOUD_RESOURCE_MANAGEMENT_API_ENDPOINT",
                &mut config.resource_manager_url,
            ),
            (
                "IBMCLOUD_RESOURCE_CATALOG_API_ENDPOINT",
                &mut config.global_catalog_url,
            ),
            ("IBMCLOUD_GT_API_ENDPOINT", &mut config.global_tagging_url),
            ("IBMCLOUD_CONSOLE_URL", &mut config.console_url),
        ];
        for (key, slot) in endpoints {
            if let Some(url) = first(&[key]) {
                *slot = url.trim_end_matches('/').to_string();
            }
        }

        config
    }

    /// Tags from `env_tags`, split on commas with blanks dropped
    pub fn env_tag_list(&self) -> Vec<String> {
        self.env_tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether environment-level tagging is switched on
    pub fn env_tags_enabled(&self) -> bool {
        self.env_tags.as_deref().is_some_and(|t| !t.is_empty())
    }
}
