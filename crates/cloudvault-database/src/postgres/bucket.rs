//! Bucket store on PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{BucketId, TenantId};
use cloudvault_entity::bucket::Bucket;

use super::db_error;
use crate::store::BucketStore;

/// Bucket records in the `buckets` table.
#[derive(Debug, Clone)]
pub struct PgBucketStore {
    pool: PgPool,
}

impl PgBucketStore {
    /// Create a new bucket store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BucketStore for PgBucketStore {
    async fn insert(&self, bucket: &Bucket) -> AppResult<Bucket> {
        sqlx::query_as::<_, Bucket>(
            "INSERT INTO buckets (id, tenant_id, name, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(bucket.id)
        .bind(bucket.tenant_id)
        .bind(&bucket.name)
        .bind(bucket.created_by)
        .bind(bucket.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create bucket"))
    }

    async fn find_by_id(&self, id: BucketId) -> AppResult<Option<Bucket>> {
        sqlx::query_as::<_, Bucket>("SELECT * FROM buckets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find bucket"))
    }

    async fn list_by_tenant(&self, tenant_id: TenantId) -> AppResult<Vec<Bucket>> {
        sqlx::query_as::<_, Bucket>("SELECT * FROM buckets WHERE tenant_id = $1 ORDER BY name")
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list buckets"))
    }
}
