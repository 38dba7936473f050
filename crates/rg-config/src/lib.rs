//! RoleGate configuration store.
//!
//! Holds the operator-supplied role table and per-role whitelists, plus the
//! plain remote-endpoint settings (URL template, credential pair, cache
//! backend URL). Role-table and whitelist mutations are validated here and
//! leave the prior state untouched on failure; the plain fields carry no
//! validation beyond the presence checks the resolver performs at use time.

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use rg_common::{RoleTable, RoleTableError};
use std::sync::Arc;
use thiserror::Error;

mod loader;

pub use loader::{ConfigLoader, RoleGateConfig};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid role table: {0}")]
    InvalidRoleTable(#[from] RoleTableError),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("invalid whitelist members for role {role}: {reason}")]
    InvalidMembers { role: String, reason: String },

    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Point-in-time view of the configuration.
///
/// Taken once per resolve pass so a concurrent mutation is observed either
/// entirely or not at all.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub role_table: RoleTable,
    pub whitelist: IndexMap<String, IndexSet<String>>,
    pub api_endpoint: Option<String>,
    pub user_name: String,
    pub user_password: String,
    pub cache_url: Option<String>,
}

impl ConfigSnapshot {
    /// Role names whose whitelist contains `user`, in role-table order.
    pub fn whitelist_roles_for(&self, user: &str) -> Vec<String> {
        self.whitelist
            .iter()
            .filter(|(_, members)| members.contains(user))
            .map(|(role, _)| role.clone())
            .collect()
    }
}

#[derive(Debug, Default)]
struct ConfigState {
    role_table: RoleTable,
    whitelist: IndexMap<String, IndexSet<String>>,
    api_endpoint: Option<String>,
    user_name: String,
    user_password: String,
    cache_url: Option<String>,
}

/// Shared configuration store.
///
/// Cloning is cheap and all clones observe the same state. Reads never block
/// each other; mutations serialize against reads, so a reader sees either
/// the old or the new configuration, never a partially applied one.
#[derive(Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<ConfigState>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the role table.
    ///
    /// On success the whitelist table is reset to one empty entry per role
    /// name; whitelist content for roles no longer declared is discarded.
    /// On failure the previous configuration is left untouched.
    pub fn set_roles<K, V, I>(&self, entries: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = RoleTable::new(entries)?;
        let whitelist: IndexMap<String, IndexSet<String>> = table
            .role_names()
            .map(|role| (role.to_string(), IndexSet::new()))
            .collect();

        let mut state = self.inner.write();
        state.role_table = table;
        state.whitelist = whitelist;
        Ok(())
    }

    /// Replace the whitelist for a declared role.
    pub fn set_whitelist<M, I>(&self, role: &str, members: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let members: IndexSet<String> = members.into_iter().map(Into::into).collect();

        let mut state = self.inner.write();
        if !state.whitelist.contains_key(role) {
            return Err(ConfigError::UnknownRole(role.to_string()));
        }
        if members.iter().any(|member| member.trim().is_empty()) {
            return Err(ConfigError::InvalidMembers {
                role: role.to_string(),
                reason: "blank member identifier".to_string(),
            });
        }
        state.whitelist.insert(role.to_string(), members);
        Ok(())
    }

    /// Current whitelist for a declared role.
    pub fn whitelist(&self, role: &str) -> Result<IndexSet<String>, ConfigError> {
        self.inner
            .read()
            .whitelist
            .get(role)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownRole(role.to_string()))
    }

    /// Role names with a non-empty whitelist, in role-table order.
    ///
    /// This is the gate deciding whether the resolver consults a role's
    /// whitelist at all.
    pub fn available_whitelists(&self) -> Vec<String> {
        self.inner
            .read()
            .whitelist
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(role, _)| role.clone())
            .collect()
    }

    /// Snapshot of the current role table.
    pub fn roles(&self) -> RoleTable {
        self.inner.read().role_table.clone()
    }

    pub fn set_api_endpoint(&self, template: impl Into<String>) {
        self.inner.write().api_endpoint = Some(template.into());
    }

    pub fn api_endpoint(&self) -> Option<String> {
        self.inner.read().api_endpoint.clone()
    }

    pub fn set_credentials(&self, user_name: impl Into<String>, user_password: impl Into<String>) {
        let mut state = self.inner.write();
        state.user_name = user_name.into();
        state.user_password = user_password.into();
    }

    pub fn set_cache_url(&self, url: impl Into<String>) {
        self.inner.write().cache_url = Some(url.into());
    }

    pub fn cache_url(&self) -> Option<String> {
        self.inner.read().cache_url.clone()
    }

    /// Atomic view of the whole configuration for a single resolve pass.
    pub fn snapshot(&self) -> ConfigSnapshot {
        let state = self.inner.read();
        ConfigSnapshot {
            role_table: state.role_table.clone(),
            whitelist: state.whitelist.clone(),
            api_endpoint: state.api_endpoint.clone(),
            user_name: state.user_name.clone(),
            user_password: state.user_password.clone(),
            cache_url: state.cache_url.clone(),
        }
    }
}
