//! RoleGate role resolution engine.
//!
//! Answers "which roles does this user hold" by combining three sources:
//! the statically configured per-role whitelists, a remote per-role yes/no
//! authorization endpoint, and a daily-expiring cache of previously
//! resolved remote results.
//!
//! ```rust,ignore
//! use rg_config::ConfigStore;
//! use rg_resolver::RoleResolver;
//!
//! let config = ConfigStore::new();
//! config.set_roles([("route/admin", "admin"), ("route/editor", "editor")])?;
//! config.set_whitelist("admin", ["alice"])?;
//! config.set_api_endpoint("https://authz.example.com/check/:user/:role");
//!
//! let resolver = RoleResolver::from_config(config).await?;
//! let roles = resolver.resolve("alice").await?;
//! ```

mod error;
mod resolver;

pub use error::{ResolveError, Result};
pub use resolver::RoleResolver;
