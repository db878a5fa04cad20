//! Runs one transfer job to a terminal status.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cloudvault_core::config::TransferConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{BucketId, CompletedPart, FolderId};
use cloudvault_entity::file::FileObject;
use cloudvault_entity::transfer::{TransferJob, TransferStatus};
use cloudvault_entity::wire::{
    AbortMultipartRequest, CompleteMultipartRequest, InitiateMultipartRequest, PresignAction,
    PresignRequest, RegisterFileRequest, SignPartRequest,
};

use crate::gateway::{PartTransport, TransferGateway};
use crate::plan::{PartRange, TransferStrategy, choose_strategy, plan_parts};
use crate::source::TransferSource;

/// What a queued job does once it reaches the worker.
#[derive(Debug)]
pub(crate) enum JobWork {
    Upload {
        source: Arc<dyn TransferSource>,
        bucket_id: BucketId,
        parent_id: Option<FolderId>,
        name: String,
    },
    Download {
        bucket_id: BucketId,
        key: String,
        path: std::path::PathBuf,
    },
}

/// How a job ended, before it is written to the snapshot.
enum Outcome {
    Complete(Option<FileObject>),
    Aborted,
}

/// Drives a single job, publishing every state change on `state`.
pub(crate) struct JobExecutor<'a> {
    pub gateway: &'a dyn TransferGateway,
    pub transport: &'a dyn PartTransport,
    pub config: &'a TransferConfig,
    pub state: &'a watch::Sender<TransferJob>,
    pub cancel: &'a CancellationToken,
}

impl JobExecutor<'_> {
    /// Run `work`; the caller has already moved the job to `Uploading`.
    pub async fn run(&self, work: JobWork) {
        let result = match &work {
            JobWork::Upload {
                source,
                bucket_id,
                parent_id,
                name,
            } => {
                let upload = Upload {
                    source: source.as_ref(),
                    bucket_id: *bucket_id,
                    parent_id: *parent_id,
                    name,
                };
                match choose_strategy(source.size(), self.config) {
                    TransferStrategy::SingleShot => self.single_shot(&upload).await,
                    TransferStrategy::Multipart => self.multipart(&upload).await,
                }
            }
            JobWork::Download {
                bucket_id,
                key,
                path,
            } => self.download(*bucket_id, key, path).await,
        };

        self.state.send_modify(|job| {
            job.finished_at = Some(Utc::now());
            match result {
                Ok(Outcome::Complete(file)) => {
                    job.status = TransferStatus::Complete;
                    job.progress_percent = 100;
                    job.file = file;
                }
                Ok(Outcome::Aborted) => job.status = TransferStatus::Aborted,
                Err(e) => {
                    job.status = TransferStatus::Error;
                    job.error = Some(e.message);
                }
            }
        });

        let job = self.state.borrow();
        info!(
            job_id = %job.id,
            status = ?job.status,
            error = job.error.as_deref().unwrap_or(""),
            "Transfer finished"
        );
    }

    async fn single_shot(&self, upload: &Upload<'_>) -> AppResult<Outcome> {
        let content_type = upload.source.content_type().map(str::to_string);
        let signed = self
            .gateway
            .presign(PresignRequest {
                bucket_id: upload.bucket_id,
                action: PresignAction::Upload,
                key: None,
                name: Some(upload.name.to_string()),
                parent_id: upload.parent_id,
                content_type: content_type.clone(),
            })
            .await?;
        self.set_key(&signed.key);

        let size = upload.source.size();
        let body = upload.source.read_range(0, size).await?;
        tokio::select! {
            put = self.transport.put(&signed.url, body, content_type.as_deref()) => { put?; }
            _ = self.cancel.cancelled() => return Ok(Outcome::Aborted),
        }

        let file = self
            .gateway
            .register(RegisterFileRequest {
                bucket_id: upload.bucket_id,
                key: signed.key,
                name: upload.name.to_string(),
                size: size as i64,
                mime_type: content_type,
                parent_id: upload.parent_id,
            })
            .await?;
        Ok(Outcome::Complete(Some(file)))
    }

    async fn multipart(&self, upload: &Upload<'_>) -> AppResult<Outcome> {
        let content_type = upload.source.content_type().map(str::to_string);
        let session = self
            .gateway
            .initiate(InitiateMultipartRequest {
                bucket_id: upload.bucket_id,
                name: upload.name.to_string(),
                content_type: content_type.clone(),
                parent_id: upload.parent_id,
            })
            .await?;
        self.set_key(&session.key);

        let remote = RemoteSession {
            bucket_id: upload.bucket_id,
            key: &session.key,
            upload_id: &session.upload_id,
        };
        let size = upload.source.size();
        let plan = plan_parts(size, self.config.part_size_bytes);
        let total = plan.len();

        for batch in plan.chunks(self.config.concurrency) {
            if self.cancel.is_cancelled() {
                self.abort_remote(&remote).await;
                return Ok(Outcome::Aborted);
            }
            let uploads = batch
                .iter()
                .map(|range| self.upload_part(&remote, upload.source, *range, total));
            let results = tokio::select! {
                results = join_all(uploads) => results,
                _ = self.cancel.cancelled() => {
                    self.abort_remote(&remote).await;
                    return Ok(Outcome::Aborted);
                }
            };
            if let Some(err) = results.into_iter().find_map(Result::err) {
                self.abort_remote(&remote).await;
                return Err(err);
            }
        }

        let mut parts = self.state.borrow().parts.clone();
        parts.sort_by_key(|p| p.part_number);
        self.state.send_modify(|job| job.parts = parts.clone());

        let completed = self
            .gateway
            .complete(CompleteMultipartRequest {
                bucket_id: upload.bucket_id,
                key: session.key.clone(),
                upload_id: session.upload_id.clone(),
                parts,
                name: upload.name.to_string(),
                size: size as i64,
                mime_type: content_type,
                parent_id: upload.parent_id,
            })
            .await;
        match completed {
            Ok(file) => Ok(Outcome::Complete(Some(file))),
            Err(e) => {
                self.abort_remote(&remote).await;
                Err(e)
            }
        }
    }

    async fn upload_part(
        &self,
        remote: &RemoteSession<'_>,
        source: &dyn TransferSource,
        range: PartRange,
        total: usize,
    ) -> AppResult<()> {
        let signed = self
            .gateway
            .sign_part(SignPartRequest {
                bucket_id: remote.bucket_id,
                key: remote.key.to_string(),
                upload_id: remote.upload_id.to_string(),
                part_number: range.part_number,
            })
            .await?;
        let body = source.read_range(range.offset, range.len).await?;
        let etag = self.transport.put(&signed.url, body, None).await?;

        let part = etag
            .map(|tag| CompletedPart::new(range.part_number, tag))
            .filter(|p| !p.etag.is_empty())
            .ok_or_else(|| {
                AppError::transfer(format!(
                    "Part {} was accepted without an ETag",
                    range.part_number
                ))
            })?;

        self.state.send_modify(|job| {
            job.parts.push(part);
            job.progress_percent = progress(job.parts.len(), total);
        });
        debug!(part_number = range.part_number, total, "Part uploaded");
        Ok(())
    }

    async fn download(&self, bucket_id: BucketId, key: &str, path: &Path) -> AppResult<Outcome> {
        let signed = self
            .gateway
            .presign(PresignRequest {
                bucket_id,
                action: PresignAction::Download,
                key: Some(key.to_string()),
                name: None,
                parent_id: None,
                content_type: None,
            })
            .await?;
        self.set_key(&signed.key);

        let body = tokio::select! {
            body = self.transport.get(&signed.url) => body?,
            _ = self.cancel.cancelled() => return Ok(Outcome::Aborted),
        };
        tokio::fs::write(path, &body).await?;
        self.state
            .send_modify(|job| job.total_size = body.len() as u64);
        Ok(Outcome::Complete(None))
    }

    async fn abort_remote(&self, remote: &RemoteSession<'_>) {
        let request = AbortMultipartRequest {
            bucket_id: remote.bucket_id,
            key: remote.key.to_string(),
            upload_id: remote.upload_id.to_string(),
        };
        if let Err(e) = self.gateway.abort(request).await {
            warn!(upload_id = %remote.upload_id, error = %e, "Failed to abort multipart upload");
        }
    }

    fn set_key(&self, key: &str) {
        self.state.send_modify(|job| job.key = Some(key.to_string()));
    }
}

struct Upload<'a> {
    source: &'a dyn TransferSource,
    bucket_id: BucketId,
    parent_id: Option<FolderId>,
    name: &'a str,
}

struct RemoteSession<'a> {
    bucket_id: BucketId,
    key: &'a str,
    upload_id: &'a str,
}

/// `round(done / total * 100)`.
pub(crate) fn progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done as f64 / total as f64) * 100.0).round().min(100.0) as u8
}
