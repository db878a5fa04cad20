//! CLI command definitions and dispatch.

pub mod download;
pub mod token;
pub mod upload;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use cloudvault_core::config::AppConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::types::JobId;
use cloudvault_entity::transfer::{TransferJob, TransferStatus};
use cloudvault_transfer::{HttpPartTransport, HttpTransferGateway, TransferQueue};

use crate::output::{self, JobRow, OutputFormat};

/// CloudVault command-line client
#[derive(Debug, Parser)]
#[command(name = "cloudvault", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Server base URL
    #[arg(short, long, default_value = "http://localhost:8080")]
    pub server: String,

    /// Bearer token; falls back to `CLOUDVAULT_TOKEN`
    #[arg(short, long)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload one or more files to a bucket
    Upload(upload::UploadArgs),
    /// Download an object to a local path
    Download(download::DownloadArgs),
    /// Sign a development identity token
    Token(token::TokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        match &self.command {
            Commands::Upload(args) => upload::execute(args, self, &config).await,
            Commands::Download(args) => download::execute(args, self, &config).await,
            Commands::Token(args) => token::execute(args, &config),
        }
    }

    fn bearer(&self) -> Result<String, AppError> {
        self.token
            .clone()
            .or_else(|| std::env::var("CLOUDVAULT_TOKEN").ok())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Pass --token or set CLOUDVAULT_TOKEN"))
    }

    /// Build a queue talking to the configured server.
    pub fn queue(&self, config: &AppConfig) -> Result<TransferQueue, AppError> {
        let gateway = HttpTransferGateway::new(&self.server, &self.bearer()?)?;
        TransferQueue::new(
            Arc::new(gateway),
            Arc::new(HttpPartTransport::new()),
            config.transfer.clone(),
        )
    }
}

/// Follow each job until it finishes, then print a summary.
///
/// Ctrl+C or SIGTERM cancels every job and waits for running multipart
/// sessions to be aborted remotely. Fails if any job did not complete.
pub async fn follow_jobs(
    queue: &TransferQueue,
    ids: &[JobId],
    format: OutputFormat,
) -> Result<(), AppError> {
    tokio::select! {
        result = watch_jobs(queue, ids, format) => result,
        _ = interrupt_signal() => {
            output::print_error("Interrupted, cancelling transfers");
            cancel_jobs(queue, ids).await?;
            Err(AppError::transfer("Transfers cancelled"))
        }
    }
}

/// Cancel `ids` and wait until each one is terminal. Jobs already
/// reported and forgotten are skipped.
async fn cancel_jobs(queue: &TransferQueue, ids: &[JobId]) -> Result<(), AppError> {
    let mut live = Vec::with_capacity(ids.len());
    for id in ids {
        if queue.job(*id).await.is_some() {
            queue.cancel(*id).await?;
            live.push(*id);
        }
    }
    for id in live {
        queue.wait(id).await?;
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn interrupt_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn watch_jobs(
    queue: &TransferQueue,
    ids: &[JobId],
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut finished: Vec<TransferJob> = Vec::with_capacity(ids.len());
    for id in ids {
        let mut updates = queue.subscribe(*id).await?;
        let mut last_progress = None;
        loop {
            let job = updates.borrow_and_update().clone();
            if last_progress != Some(job.progress_percent) && !job.status.is_terminal() {
                output::print_progress(&job);
                last_progress = Some(job.progress_percent);
            }
            if job.status.is_terminal() {
                finished.push(queue.forget(*id).await?);
                break;
            }
            if updates.changed().await.is_err() {
                return Err(AppError::internal("Transfer queue stopped"));
            }
        }
    }

    let rows: Vec<JobRow> = finished.iter().map(JobRow::from).collect();
    output::print_list(&rows, format);

    let failed = finished
        .iter()
        .filter(|j| j.status != TransferStatus::Complete)
        .count();
    if failed > 0 {
        return Err(AppError::transfer(format!("{failed} transfer(s) did not complete")));
    }
    output::print_success(&format!("{} transfer(s) complete", finished.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;

    use cloudvault_core::config::TransferConfig;
    use cloudvault_core::result::AppResult;
    use cloudvault_core::types::BucketId;
    use cloudvault_entity::file::FileObject;
    use cloudvault_entity::transfer::TransferDestination;
    use cloudvault_entity::wire::{
        AbortMultipartRequest, CompleteMultipartRequest, InitiateMultipartRequest,
        InitiateMultipartResponse, PresignRequest, PresignResponse, RegisterFileRequest,
        SignPartRequest, SignPartResponse,
    };
    use cloudvault_transfer::{MemorySource, PartTransport, TransferGateway};

    use super::*;

    /// Opens multipart sessions and counts aborts; nothing ever completes.
    #[derive(Debug, Default)]
    struct StalledServer {
        aborted: AtomicUsize,
    }

    #[async_trait]
    impl TransferGateway for StalledServer {
        async fn presign(&self, _request: PresignRequest) -> AppResult<PresignResponse> {
            Err(AppError::internal("unused"))
        }

        async fn register(&self, _request: RegisterFileRequest) -> AppResult<FileObject> {
            Err(AppError::internal("unused"))
        }

        async fn initiate(
            &self,
            request: InitiateMultipartRequest,
        ) -> AppResult<InitiateMultipartResponse> {
            Ok(InitiateMultipartResponse {
                upload_id: "upload-1".to_string(),
                key: format!("t/b/root/{}", request.name),
            })
        }

        async fn sign_part(&self, request: SignPartRequest) -> AppResult<SignPartResponse> {
            Ok(SignPartResponse {
                url: format!("stall://{}", request.part_number),
            })
        }

        async fn complete(&self, _request: CompleteMultipartRequest) -> AppResult<FileObject> {
            Err(AppError::internal("unused"))
        }

        async fn abort(&self, _request: AbortMultipartRequest) -> AppResult<()> {
            self.aborted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct StalledTransport;

    #[async_trait]
    impl PartTransport for StalledTransport {
        async fn put(
            &self,
            _url: &str,
            _body: Bytes,
            _content_type: Option<&str>,
        ) -> AppResult<Option<String>> {
            std::future::pending().await
        }

        async fn get(&self, _url: &str) -> AppResult<Bytes> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancel_jobs_aborts_running_and_pending() {
        let server = Arc::new(StalledServer::default());
        let queue = TransferQueue::new(
            server.clone(),
            Arc::new(StalledTransport),
            TransferConfig {
                multipart_threshold_bytes: 8,
                part_size_bytes: 8,
                concurrency: 2,
            },
        )
        .unwrap();

        let mut ids = Vec::new();
        for name in ["a.bin", "b.bin"] {
            let destination = TransferDestination::Bucket {
                bucket_id: BucketId::new(),
                parent_id: None,
                name: name.to_string(),
            };
            let source = Arc::new(MemorySource::new(name, vec![1u8; 32]));
            ids.push(queue.enqueue_upload(source, destination).await.unwrap());
        }
        let mut first = queue.subscribe(ids[0]).await.unwrap();
        first
            .wait_for(|job| job.key.is_some())
            .await
            .unwrap();

        cancel_jobs(&queue, &ids).await.unwrap();

        for id in &ids {
            let job = queue.job(*id).await.unwrap();
            assert_eq!(job.status, TransferStatus::Aborted);
        }
        assert_eq!(server.aborted.load(Ordering::SeqCst), 1);
    }
}
