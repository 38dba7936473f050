//! Configuration loading from TOML files and environment variables.

use crate::{ConfigError, ConfigStore};
use indexmap::IndexMap;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "rolegate.toml",
    "config.toml",
    "./config/rolegate.toml",
    "/etc/rolegate/rolegate.toml",
];

/// Declarative configuration as read from a TOML file.
///
/// Applying it into a [`ConfigStore`] goes through the validating setters,
/// so file input gets the same checks as programmatic input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoleGateConfig {
    /// Remote endpoint URL template with `:user` and `:role` placeholders.
    pub api_endpoint: Option<String>,
    /// Basic-auth user name for the remote endpoint.
    pub user_name: String,
    /// Basic-auth password for the remote endpoint.
    pub user_password: String,
    /// Cache backend location; absence disables caching.
    pub cache_url: Option<String>,
    /// External identifier -> role name, in declaration order.
    pub roles: IndexMap<String, String>,
    /// Role name -> whitelisted user identifiers.
    pub whitelist: IndexMap<String, Vec<String>>,
}

impl RoleGateConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply this configuration into a store.
    pub fn apply(&self, store: &ConfigStore) -> Result<(), ConfigError> {
        store.set_roles(self.roles.clone())?;
        for (role, members) in &self.whitelist {
            store.set_whitelist(role, members.iter().cloned())?;
        }
        if let Some(endpoint) = &self.api_endpoint {
            store.set_api_endpoint(endpoint.clone());
        }
        store.set_credentials(self.user_name.clone(), self.user_password.clone());
        if let Some(url) = &self.cache_url {
            store.set_cache_url(url.clone());
        }
        Ok(())
    }

    /// Generate an example TOML configuration.
    pub fn example_toml() -> String {
        r#"# RoleGate configuration
# Environment variables (ROLEGATE_*) override these settings

api_endpoint = "https://authz.example.com/check/:user/:role"
user_name = "svc-rolegate"
user_password = ""
cache_url = "redis://localhost:6379"

[roles]
"route/admin" = "admin"
"route/editor" = "editor"

[whitelist]
admin = ["alice"]
"#
        .to_string()
    }
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<RoleGateConfig, ConfigError> {
        let mut config = RoleGateConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = RoleGateConfig::from_file(&path)?;
        }

        self.apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("ROLEGATE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut RoleGateConfig) {
        if let Ok(val) = env::var("ROLEGATE_API_ENDPOINT") {
            config.api_endpoint = Some(val);
        }
        if let Ok(val) = env::var("ROLEGATE_USER_NAME") {
            config.user_name = val;
        }
        if let Ok(val) = env::var("ROLEGATE_USER_PASSWORD") {
            config.user_password = val;
        }
        if let Ok(val) = env::var("ROLEGATE_CACHE_URL") {
            config.cache_url = Some(val);
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
