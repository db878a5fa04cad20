//! S3-compatible object store provider.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart as S3CompletedPart};
use chrono::{DateTime, Utc};

use cloudvault_core::config::S3StorageConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::{ObjectInfo, ObjectPage, ObjectStore, PresignedUrl};
use cloudvault_core::types::CompletedPart;
use cloudvault_core::types::part::strip_etag_quotes;

/// Object store backed by a single physical S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build a client from configuration.
    ///
    /// Static credentials are used when an access key is configured;
    /// otherwise the default AWS credential chain applies.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket must be set"));
        }
        tracing::info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 object store"
        );

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "cloudvault-config",
            ));
        }
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(config.endpoint.clone());
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }

    fn presigning(expires_in: Duration) -> AppResult<PresigningConfig> {
        PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::validation(format!("Invalid presign lifetime: {e}")))
    }
}

fn storage_error<E: std::error::Error>(operation: &str, err: E) -> AppError {
    AppError::storage(format!("S3 {operation} failed: {}", DisplayErrorContext(err)))
}

fn expires_at(expires_in: Duration) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::from_std(expires_in).unwrap_or_default()
}

fn to_chrono(value: Option<&aws_sdk_s3::primitives::DateTime>) -> Option<DateTime<Utc>> {
    value.and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn create_multipart_upload(
        &self,
        key: &str,
        content_type: Option<&str>,
    ) -> AppResult<String> {
        let output = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(|e| storage_error("CreateMultipartUpload", e))?;

        output
            .upload_id()
            .map(str::to_string)
            .ok_or_else(|| AppError::storage("S3 returned no upload ID"))
    }

    async fn presign_upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl> {
        let request = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .presigned(Self::presigning(expires_in)?)
            .await
            .map_err(|e| storage_error("presign UploadPart", e))?;

        Ok(PresignedUrl {
            url: request.uri().to_string(),
            expires_at: expires_at(expires_in),
        })
    }

    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> AppResult<()> {
        let completed = parts
            .iter()
            .map(|p| {
                S3CompletedPart::builder()
                    .part_number(p.part_number)
                    .e_tag(format!("\"{}\"", p.etag))
                    .build()
            })
            .collect::<Vec<_>>();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| storage_error("CompleteMultipartUpload", e))?;
        Ok(())
    }

    async fn abort_multipart_upload(&self, key: &str, upload_id: &str) -> AppResult<()> {
        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| storage_error("AbortMultipartUpload", e))?;
        Ok(())
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: Option<&str>,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .presigned(Self::presigning(expires_in)?)
            .await
            .map_err(|e| storage_error("presign PutObject", e))?;

        Ok(PresignedUrl {
            url: request.uri().to_string(),
            expires_at: expires_at(expires_in),
        })
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        download_name: Option<&str>,
    ) -> AppResult<PresignedUrl> {
        let disposition = download_name
            .map(|name| format!("attachment; filename=\"{}\"", name.replace('"', "")));
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .set_response_content_disposition(disposition)
            .presigned(Self::presigning(expires_in)?)
            .await
            .map_err(|e| storage_error("presign GetObject", e))?;

        Ok(PresignedUrl {
            url: request.uri().to_string(),
            expires_at: expires_at(expires_in),
        })
    }

    async fn head_object(&self, key: &str) -> AppResult<Option<ObjectInfo>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(ObjectInfo {
                key: key.to_string(),
                size: output.content_length().unwrap_or_default(),
                etag: output.e_tag().map(|t| strip_etag_quotes(t).to_string()),
                last_modified: to_chrono(output.last_modified()),
            })),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_not_found() {
                    Ok(None)
                } else {
                    Err(storage_error("HeadObject", service_error))
                }
            }
        }
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_error("DeleteObject", e))?;
        Ok(())
    }

    async fn list_objects(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> AppResult<ObjectPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .set_continuation_token(continuation_token.map(str::to_string))
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| storage_error("ListObjectsV2", e))?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ObjectInfo {
                    key: object.key()?.to_string(),
                    size: object.size().unwrap_or_default(),
                    etag: object.e_tag().map(|t| strip_etag_quotes(t).to_string()),
                    last_modified: to_chrono(object.last_modified()),
                })
            })
            .collect();

        let next_continuation_token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectPage {
            objects,
            next_continuation_token,
        })
    }
}
