//! Cache layer
//!
//! In-process cache for upstream CMS responses. Proxy handlers consult it
//! before calling the CMS; the revalidation webhook drops the affected
//! entries when content changes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kickoff::cache::{create_cache, CacheLayer};
//! use kickoff::config::CacheConfig;
//!
//! let cache = create_cache(&CacheConfig::default()).expect("enabled by default");
//! cache.set("/api/categories?populate=*", &body, cache.default_ttl()).await?;
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Cache layer trait
///
/// The methods are generic, so the trait is used through concrete types
/// rather than as `dyn CacheLayer`.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value from cache
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>;

    /// Delete all values matching a glob pattern, returning how many were removed
    async fn delete_pattern(&self, pattern: &str) -> Result<u64>;
}

/// Create the response cache, or `None` when caching is disabled
pub fn create_cache(config: &CacheConfig) -> Option<Arc<MemoryCache>> {
    if !config.enabled || config.ttl_seconds == 0 {
        return None;
    }

    let ttl = Duration::from_secs(config.ttl_seconds);
    Some(Arc::new(MemoryCache::with_capacity_and_ttl(config.max_capacity, ttl)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_memory_cache() {
        let cache = create_cache(&CacheConfig::default()).unwrap();

        assert_eq!(cache.default_ttl(), Duration::from_secs(300));
        cache.set("key", &"value".to_string(), Duration::from_secs(60)).await.unwrap();
        let result: Option<String> = cache.get("key").await.unwrap();
        assert_eq!(result, Some("value".to_string()));
    }

    #[test]
    fn test_disabled_cache() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        assert!(create_cache(&config).is_none());
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let config = CacheConfig {
            ttl_seconds: 0,
            ..CacheConfig::default()
        };
        assert!(create_cache(&config).is_none());
    }
}
