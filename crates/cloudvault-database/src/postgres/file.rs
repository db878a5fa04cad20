//! File store on PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{BucketId, FileId};
use cloudvault_entity::file::FileObject;

use super::db_error;
use crate::store::FileStore;

/// File records in the `files` table.
#[derive(Debug, Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    /// Create a new file store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for PgFileStore {
    async fn insert(&self, file: &FileObject) -> AppResult<FileObject> {
        sqlx::query_as::<_, FileObject>(
            "INSERT INTO files (id, tenant_id, bucket_id, key, name, size, mime_type, \
             parent_id, owner_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(file.id)
        .bind(file.tenant_id)
        .bind(file.bucket_id)
        .bind(&file.key)
        .bind(&file.name)
        .bind(file.size)
        .bind(&file.mime_type)
        .bind(file.parent_id)
        .bind(file.owner_id)
        .bind(file.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to register file"))
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<FileObject>> {
        sqlx::query_as::<_, FileObject>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find file"))
    }

    async fn find_by_key(&self, bucket_id: BucketId, key: &str) -> AppResult<Option<FileObject>> {
        sqlx::query_as::<_, FileObject>("SELECT * FROM files WHERE bucket_id = $1 AND key = $2")
            .bind(bucket_id)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find file by key"))
    }

    async fn delete(&self, id: FileId) -> AppResult<bool> {
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(db_error("Failed to delete file"))
    }
}
