//! Object download command.

use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use cloudvault_core::config::AppConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::types::BucketId;

use super::Cli;

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Bucket ID
    #[arg(short, long)]
    pub bucket: Uuid,

    /// Object key
    #[arg(short, long)]
    pub key: String,

    /// Output path; defaults to the last key segment
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Execute the download command
pub async fn execute(args: &DownloadArgs, cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    let out = match &args.out {
        Some(path) => path.clone(),
        None => default_output(&args.key)?,
    };

    let queue = cli.queue(config)?;
    let id = queue
        .enqueue_download(BucketId::from_uuid(args.bucket), &args.key, out)
        .await?;
    super::follow_jobs(&queue, &[id], cli.format).await
}

fn default_output(key: &str) -> Result<PathBuf, AppError> {
    key.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| AppError::validation("Cannot derive a file name from the key; pass --out"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_uses_last_segment() {
        assert_eq!(
            default_output("t/b/root/abc-report.pdf").unwrap(),
            PathBuf::from("abc-report.pdf")
        );
        assert!(default_output("t/b/").is_err());
    }
}
