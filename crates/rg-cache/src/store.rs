//! Role cache trait and backends.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::expiry::expires_at;

/// Hash field marking an entry whose resolved role set was empty.
pub const NO_ROLES_SENTINEL: &str = "no_roles";

/// Cache of previously resolved remote-sourced roles, keyed by user.
#[async_trait]
pub trait RoleCache: Send + Sync {
    /// Whether an entry exists for `user` (a cached empty set counts).
    async fn has_entry(&self, user: &str) -> Result<bool>;

    /// Cached role names for `user`; empty when the entry holds no roles or
    /// no entry exists ([`RoleCache::has_entry`] tells the two apart).
    async fn roles(&self, user: &str) -> Result<HashSet<String>>;

    /// Replace the entry for `user`, stamp the daily expiration, and return
    /// the freshly stored set.
    async fn set_roles(&self, user: &str, roles: &[String]) -> Result<HashSet<String>>;

    /// Delete the entry for `user`; succeeds when none exists.
    async fn remove(&self, user: &str) -> Result<()>;
}

// ============================================================================
// Redis Role Cache
// ============================================================================

/// Redis-backed cache: one hash per user key, one field per cached role
/// name. An empty resolution stores the single [`NO_ROLES_SENTINEL`] field
/// so presence is distinguishable from absence. Every entry expires at the
/// next 03:00 UTC boundary.
pub struct RedisRoleCache {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisRoleCache {
    /// Connect to the cache backend at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::Connection(e.to_string()))?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            prefix: "rolegate".to_string(),
        })
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn key(&self, user: &str) -> String {
        format!("{}:{}", self.prefix, user)
    }
}

#[async_trait]
impl RoleCache for RedisRoleCache {
    async fn has_entry(&self, user: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(self.key(user)).await?;
        Ok(exists)
    }

    async fn roles(&self, user: &str) -> Result<HashSet<String>> {
        let mut conn = self.conn.clone();
        let fields: Vec<String> = conn.hkeys(self.key(user)).await?;
        Ok(fields
            .into_iter()
            .filter(|field| field != NO_ROLES_SENTINEL)
            .collect())
    }

    async fn set_roles(&self, user: &str, roles: &[String]) -> Result<HashSet<String>> {
        let mut conn = self.conn.clone();
        let key = self.key(user);
        let expire_at = expires_at(Utc::now()).timestamp();

        // Whole-entry replace in one MULTI/EXEC: concurrent writers for the
        // same user interleave entries, never individual fields.
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.del(&key).ignore();
        if roles.is_empty() {
            pipe.hset(&key, NO_ROLES_SENTINEL, true).ignore();
        } else {
            for role in roles {
                pipe.hset(&key, role, true).ignore();
            }
        }
        pipe.expire_at(&key, expire_at).ignore();
        let () = pipe.query_async(&mut conn).await?;

        debug!(user = %user, count = roles.len(), "Stored role cache entry");
        self.roles(user).await
    }

    async fn remove(&self, user: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.key(user)).await?;
        Ok(())
    }
}

// ============================================================================
// In-Memory Role Cache (for testing/development)
// ============================================================================

/// In-memory cache with the same expiration behavior as the Redis backend.
/// The empty set is stored directly; the sentinel field is a Redis
/// representation detail.
#[derive(Default)]
pub struct MemoryRoleCache {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    roles: HashSet<String>,
    expires_at: chrono::DateTime<Utc>,
}

impl MemoryRoleCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_entry(&self, user: &str) -> Option<MemoryEntry> {
        let entries = self.entries.read();
        entries
            .get(user)
            .filter(|entry| entry.expires_at > Utc::now())
            .cloned()
    }
}

#[async_trait]
impl RoleCache for MemoryRoleCache {
    async fn has_entry(&self, user: &str) -> Result<bool> {
        Ok(self.live_entry(user).is_some())
    }

    async fn roles(&self, user: &str) -> Result<HashSet<String>> {
        Ok(self.live_entry(user).map(|entry| entry.roles).unwrap_or_default())
    }

    async fn set_roles(&self, user: &str, roles: &[String]) -> Result<HashSet<String>> {
        let roles: HashSet<String> = roles.iter().cloned().collect();
        let mut entries = self.entries.write();
        entries.insert(
            user.to_string(),
            MemoryEntry {
                roles: roles.clone(),
                expires_at: expires_at(Utc::now()),
            },
        );
        Ok(roles)
    }

    async fn remove(&self, user: &str) -> Result<()> {
        self.entries.write().remove(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn round_trips_a_role_set() {
        let cache = MemoryRoleCache::new();
        let stored = cache
            .set_roles("alice", &["r1".to_string()])
            .await
            .unwrap();
        assert_eq!(stored, HashSet::from(["r1".to_string()]));

        assert!(cache.has_entry("alice").await.unwrap());
        assert_eq!(cache.roles("alice").await.unwrap(), stored);
    }

    #[tokio::test]
    async fn empty_set_is_an_entry_not_an_absence() {
        let cache = MemoryRoleCache::new();
        cache.set_roles("alice", &[]).await.unwrap();

        assert!(cache.has_entry("alice").await.unwrap());
        assert!(cache.roles("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_entry_reads_as_absent_and_empty() {
        let cache = MemoryRoleCache::new();
        assert!(!cache.has_entry("nobody").await.unwrap());
        assert!(cache.roles("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_roles_replaces_the_prior_entry() {
        let cache = MemoryRoleCache::new();
        cache
            .set_roles("alice", &["r1".to_string(), "r2".to_string()])
            .await
            .unwrap();
        cache.set_roles("alice", &["r3".to_string()]).await.unwrap();

        assert_eq!(
            cache.roles("alice").await.unwrap(),
            HashSet::from(["r3".to_string()])
        );
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let cache = MemoryRoleCache::new();
        cache.set_roles("alice", &["r1".to_string()]).await.unwrap();

        cache.remove("alice").await.unwrap();
        assert!(!cache.has_entry("alice").await.unwrap());
        cache.remove("alice").await.unwrap();
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let cache = MemoryRoleCache::new();
        cache.set_roles("alice", &["r1".to_string()]).await.unwrap();

        // Force the entry past its boundary.
        {
            let mut entries = cache.entries.write();
            let entry = entries.get_mut("alice").unwrap();
            entry.expires_at = Utc::now() - Duration::seconds(1);
        }

        assert!(!cache.has_entry("alice").await.unwrap());
        assert!(cache.roles("alice").await.unwrap().is_empty());
    }
}
