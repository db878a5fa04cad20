//! Builds the configured object store.

use std::sync::Arc;

use cloudvault_core::config::StorageConfig;
use cloudvault_core::config::storage::StorageProvider;
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::ObjectStore;

use crate::providers::memory::MemoryObjectStore;

/// Create the object store selected by `config.provider`.
pub async fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    match config.provider {
        StorageProvider::Memory => {
            tracing::warn!("Using in-memory object store; objects are lost on restart");
            Ok(Arc::new(MemoryObjectStore::new()))
        }
        #[cfg(feature = "s3")]
        StorageProvider::S3 => {
            let store = crate::providers::s3::S3ObjectStore::new(&config.s3).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "s3"))]
        StorageProvider::S3 => Err(cloudvault_core::error::AppError::configuration(
            "storage.provider = \"s3\" requires building with the `s3` feature",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_provider_is_default() {
        let store = build_object_store(&StorageConfig::default())
            .await
            .expect("build");
        assert_eq!(store.provider_type(), "memory");
    }
}
