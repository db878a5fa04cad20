//! Bucket persistence.

use async_trait::async_trait;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{BucketId, TenantId};
use cloudvault_entity::bucket::Bucket;

/// Persistence for logical buckets.
#[async_trait]
pub trait BucketStore: Send + Sync + std::fmt::Debug + 'static {
    /// Create a bucket. A duplicate name within the tenant is a conflict.
    async fn insert(&self, bucket: &Bucket) -> AppResult<Bucket>;

    /// Find a bucket by ID.
    async fn find_by_id(&self, id: BucketId) -> AppResult<Option<Bucket>>;

    /// Buckets of a tenant, by name.
    async fn list_by_tenant(&self, tenant_id: TenantId) -> AppResult<Vec<Bucket>>;
}
