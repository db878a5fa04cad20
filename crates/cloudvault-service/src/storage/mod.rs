//! Presign boundary: every signed URL and every object-store mutation is
//! checked against the policy engine first.

pub mod file;
pub mod multipart;
pub mod presign;

pub use file::FileService;
pub use multipart::MultipartService;
pub use presign::PresignService;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::BucketId;
use cloudvault_database::BucketStore;
use cloudvault_entity::bucket::Bucket;
use cloudvault_entity::file::FileObject;
use cloudvault_entity::permission::ResourceDescriptor;

pub(crate) async fn load_bucket(store: &dyn BucketStore, bucket_id: BucketId) -> AppResult<Bucket> {
    store
        .find_by_id(bucket_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Bucket {bucket_id} not found")))
}

/// Supplied keys must stay under the bucket's prefix.
pub(crate) fn ensure_key_in_bucket(bucket: &Bucket, key: &str) -> AppResult<()> {
    if bucket.owns_key(key) {
        Ok(())
    } else {
        Err(AppError::authorization("Object key is outside the bucket"))
    }
}

/// A file is reachable through its own grants or its bucket's.
pub(crate) fn file_resources(file: &FileObject) -> [ResourceDescriptor; 2] {
    [file.descriptor(), file.bucket_descriptor()]
}
