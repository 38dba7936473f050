//! Role cache for RoleGate.
//!
//! Stores a user's previously resolved remote-sourced roles until a shared
//! daily refresh boundary (03:00 UTC). An entry holding an empty role set is
//! distinguishable from a missing entry, so "checked and found nothing" is
//! not re-checked on every resolve.

mod error;
mod expiry;
mod store;

pub use error::{CacheError, Result};
pub use expiry::expires_at;
pub use store::{MemoryRoleCache, RedisRoleCache, RoleCache, NO_ROLES_SENTINEL};
