//! Cache manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use keyward_core::config::CacheConfig;
use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_core::traits::cache::CacheProvider;

/// Cache manager that wraps the configured cache provider.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// The inner cache provider.
    inner: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Create a new cache manager from configuration.
    pub fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "memory")]
            "memory" => {
                info!(
                    max_capacity = config.memory.max_capacity,
                    "Initializing in-memory cache provider"
                );
                Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory"
                )));
            }
        };

        Ok(Self { inner })
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_provider_rejected() {
        let config = CacheConfig {
            provider: "redis".to_string(),
            ..CacheConfig::default()
        };
        let err = CacheManager::new(&config).unwrap_err();
        assert_eq!(err.kind, keyward_core::error::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_manager_delegates_to_memory() {
        let manager = CacheManager::new(&CacheConfig::default()).unwrap();
        manager
            .set_json("k", &vec![1, 2, 3], Duration::from_secs(60))
            .await
            .unwrap();
        let value: Option<Vec<i32>> = manager.get_json("k").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }
}
