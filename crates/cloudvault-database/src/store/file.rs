//! File metadata persistence.

use async_trait::async_trait;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{BucketId, FileId};
use cloudvault_entity::file::FileObject;

/// Persistence for registered file objects.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Register a file. A second registration of the same key is a conflict.
    async fn insert(&self, file: &FileObject) -> AppResult<FileObject>;

    /// Find a file by ID.
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<FileObject>>;

    /// Find a file by bucket and key.
    async fn find_by_key(&self, bucket_id: BucketId, key: &str) -> AppResult<Option<FileObject>>;

    /// Delete a file record. Returns `false` if it did not exist.
    async fn delete(&self, id: FileId) -> AppResult<bool>;
}
