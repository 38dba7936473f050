//! Error types for role resolution

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// A remote role check failed at the transport level. Fatal for the
    /// whole resolve call: a partial role list is never returned.
    #[error("remote authorization check failed: {0}")]
    RemoteCheck(#[from] rg_client::CheckError),

    /// The cache backend could not be reached while wiring the resolver.
    /// Cache failures during resolution degrade to the uncached path
    /// instead of surfacing here.
    #[error("cache backend unavailable: {0}")]
    Cache(#[from] rg_cache::CacheError),

    /// The caller-supplied deadline expired before all checks completed.
    #[error("role resolution deadline exceeded")]
    DeadlineExceeded,
}

pub type Result<T> = std::result::Result<T, ResolveError>;
