//! Key-Value Cache
//!
//! The notification store keeps one JSON document per recipient in a
//! key-value cache. The cache is a collaborator behind the [`Cache`] trait so
//! the server can run against Redis in production and an in-process map when
//! Redis is not configured (and in tests).
//!
//! # Implementations
//!
//! - [`RedisCache`] - multiplexed async Redis connection
//! - [`MemoryCache`] - `RwLock<HashMap>` with optional expiry

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

mod memory;
mod redis_cache;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Errors raised by a cache backend
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached or rejected the command
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Backend(err.to_string())
    }
}

/// String-keyed cache of string values
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch the value stored under `key`, `None` on a miss
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`. `None` keeps the value until it is
    /// overwritten or deleted.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Remove `key`; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
