//! Seams between the transfer queue and the outside world.

use async_trait::async_trait;
use bytes::Bytes;

use cloudvault_core::result::AppResult;
use cloudvault_entity::file::FileObject;
use cloudvault_entity::wire::{
    AbortMultipartRequest, CompleteMultipartRequest, InitiateMultipartRequest,
    InitiateMultipartResponse, PresignRequest, PresignResponse, RegisterFileRequest,
    SignPartRequest, SignPartResponse,
};

/// The server endpoints a transfer needs.
#[async_trait]
pub trait TransferGateway: Send + Sync + std::fmt::Debug + 'static {
    /// Sign a single PUT or GET.
    async fn presign(&self, request: PresignRequest) -> AppResult<PresignResponse>;

    /// Record metadata for an object written with a single PUT.
    async fn register(&self, request: RegisterFileRequest) -> AppResult<FileObject>;

    /// Open a multipart session.
    async fn initiate(&self, request: InitiateMultipartRequest)
    -> AppResult<InitiateMultipartResponse>;

    /// Sign one part URL.
    async fn sign_part(&self, request: SignPartRequest) -> AppResult<SignPartResponse>;

    /// Assemble the parts and register the file.
    async fn complete(&self, request: CompleteMultipartRequest) -> AppResult<FileObject>;

    /// Discard a multipart session.
    async fn abort(&self, request: AbortMultipartRequest) -> AppResult<()>;
}

/// Moves bytes to and from signed URLs.
#[async_trait]
pub trait PartTransport: Send + Sync + std::fmt::Debug + 'static {
    /// PUT `body` and return the raw `ETag` header, if any.
    async fn put(
        &self,
        url: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> AppResult<Option<String>>;

    /// GET the whole object.
    async fn get(&self, url: &str) -> AppResult<Bytes>;
}
