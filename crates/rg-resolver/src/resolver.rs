//! Role Resolver
//!
//! Orchestrates the configuration store, the remote authorization checker,
//! and the role cache into a single `resolve` call. Whitelist-granted roles
//! never trigger a remote check and are never written into the cache, so a
//! later whitelist removal falls back to a fresh remote check once the
//! cached entry expires instead of silently losing a remote-granted role.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use rg_cache::{RedisRoleCache, RoleCache};
use rg_client::{AuthCheck, HttpAuthCheck, HttpAuthCheckConfig};
use rg_config::{ConfigSnapshot, ConfigStore};

use crate::error::Result;
use crate::ResolveError;

/// Resolves the set of roles a user holds.
pub struct RoleResolver {
    config: ConfigStore,
    checker: Option<Arc<dyn AuthCheck>>,
    cache: Option<Arc<dyn RoleCache>>,
}

impl RoleResolver {
    /// Resolver over `config` with no remote checker and no cache wired.
    pub fn new(config: ConfigStore) -> Self {
        Self {
            config,
            checker: None,
            cache: None,
        }
    }

    /// Wire the remote authorization checker. A resolver without one treats
    /// the remote endpoint as unconfigured and answers from whitelists alone.
    pub fn with_checker(mut self, checker: Arc<dyn AuthCheck>) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Wire a cache backend for remote-sourced results.
    pub fn with_cache(mut self, cache: Arc<dyn RoleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Wire checker and cache from the store's endpoint, credential, and
    /// cache-URL fields: the checker exists exactly when `api_endpoint` is
    /// set, the cache exactly when `cache_url` is set.
    pub async fn from_config(config: ConfigStore) -> Result<Self> {
        let snapshot = config.snapshot();
        let mut resolver = Self::new(config);

        if let Some(template) = snapshot.api_endpoint {
            let checker = HttpAuthCheck::new(HttpAuthCheckConfig {
                endpoint_template: template,
                user_name: snapshot.user_name,
                user_password: snapshot.user_password,
                ..Default::default()
            })?;
            resolver = resolver.with_checker(Arc::new(checker));
        }

        if let Some(url) = snapshot.cache_url {
            resolver = resolver.with_cache(Arc::new(RedisRoleCache::connect(&url).await?));
        }

        Ok(resolver)
    }

    /// Resolve the roles held by `user`, sorted lexicographically.
    pub async fn resolve(&self, user: &str) -> Result<Vec<String>> {
        let snapshot = self.config.snapshot();
        let whitelist_roles = snapshot.whitelist_roles_for(user);

        let Some(checker) = &self.checker else {
            let mut result = whitelist_roles;
            result.sort();
            debug!(user = %user, roles = ?result, "Resolved from whitelist only");
            return Ok(result);
        };

        let api_roles = self
            .api_roles(checker.as_ref(), &snapshot, user, &whitelist_roles)
            .await?;

        let mut result = whitelist_roles;
        result.extend(api_roles);
        result.sort();
        debug!(user = %user, roles = ?result, "Resolved");
        Ok(result)
    }

    /// [`RoleResolver::resolve`] bounded by a caller-supplied deadline.
    ///
    /// On expiry, outstanding remote checks are dropped and the cache is
    /// left untouched.
    pub async fn resolve_with_deadline(&self, user: &str, deadline: Duration) -> Result<Vec<String>> {
        tokio::time::timeout(deadline, self.resolve(user))
            .await
            .map_err(|_| ResolveError::DeadlineExceeded)?
    }

    /// Remote-sourced roles: cached when possible, computed otherwise.
    ///
    /// A cached entry is returned verbatim; whitelist changes made after the
    /// entry was written are not re-applied until it expires or is removed.
    /// Cache failures degrade to the uncached path: caching is an
    /// optimization, not a correctness requirement.
    async fn api_roles(
        &self,
        checker: &dyn AuthCheck,
        snapshot: &ConfigSnapshot,
        user: &str,
        whitelist_roles: &[String],
    ) -> Result<Vec<String>> {
        if let Some(cache) = &self.cache {
            match cache.has_entry(user).await {
                Ok(true) => match cache.roles(user).await {
                    Ok(cached) => {
                        debug!(user = %user, "Role cache hit");
                        return Ok(cached.into_iter().collect());
                    }
                    Err(e) => {
                        warn!(user = %user, error = %e, "Cache read failed, recomputing");
                    }
                },
                Ok(false) => {
                    let computed = self
                        .authorize(checker, snapshot, user, whitelist_roles)
                        .await?;
                    match cache.set_roles(user, &computed).await {
                        Ok(stored) => return Ok(stored.into_iter().collect()),
                        Err(e) => {
                            warn!(user = %user, error = %e, "Cache write failed");
                            return Ok(computed);
                        }
                    }
                }
                Err(e) => {
                    warn!(user = %user, error = %e, "Cache unreachable, recomputing");
                }
            }
        }

        self.authorize(checker, snapshot, user, whitelist_roles).await
    }

    /// One remote check per role not already granted by whitelist.
    ///
    /// Checks run concurrently; the first failure fails the whole pass, so
    /// the caller never sees a role list computed from an incomplete sweep.
    async fn authorize(
        &self,
        checker: &dyn AuthCheck,
        snapshot: &ConfigSnapshot,
        user: &str,
        whitelist_roles: &[String],
    ) -> Result<Vec<String>> {
        let checks = snapshot
            .role_table
            .iter()
            .filter(|(_, role)| !whitelist_roles.iter().any(|held| held.as_str() == *role))
            .map(|(external_id, role)| async move {
                let granted = checker.check(user, external_id).await?;
                Ok::<_, rg_client::CheckError>((role, granted))
            });

        let outcomes = futures::future::try_join_all(checks).await?;

        Ok(outcomes
            .into_iter()
            .filter(|(_, granted)| *granted)
            .map(|(role, _)| role.to_string())
            .collect())
    }
}
