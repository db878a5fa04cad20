//! File upload command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use uuid::Uuid;

use cloudvault_core::config::AppConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::types::{BucketId, FolderId};
use cloudvault_entity::transfer::TransferDestination;
use cloudvault_transfer::{FileSource, TransferSource};

use super::Cli;

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Files to upload, sent one after another
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Target bucket ID
    #[arg(short, long)]
    pub bucket: Uuid,

    /// Target folder ID
    #[arg(short, long)]
    pub parent: Option<Uuid>,
}

/// Execute the upload command
pub async fn execute(args: &UploadArgs, cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    let queue = cli.queue(config)?;
    let bucket_id = BucketId::from_uuid(args.bucket);
    let parent_id = args.parent.map(FolderId::from_uuid);

    let mut ids = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let source = FileSource::open(path).await?;
        let destination = TransferDestination::Bucket {
            bucket_id,
            parent_id,
            name: source.name().to_string(),
        };
        ids.push(queue.enqueue_upload(Arc::new(source), destination).await?);
    }

    super::follow_jobs(&queue, &ids, cli.format).await
}
