//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use cloudvault_entity::transfer::{TransferDirection, TransferJob, TransferStatus};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One transfer job as a table row.
#[derive(Debug, Serialize, Tabled)]
pub struct JobRow {
    /// Job ID
    #[tabled(rename = "Job")]
    pub id: String,
    /// Upload or download
    #[tabled(rename = "Direction")]
    pub direction: String,
    /// Local path or object key
    #[tabled(rename = "Source")]
    pub source: String,
    /// Final status
    #[tabled(rename = "Status")]
    pub status: String,
    /// Completion percentage
    #[tabled(rename = "Progress")]
    pub progress: String,
    /// Object key or failure
    #[tabled(rename = "Detail")]
    pub detail: String,
}

impl From<&TransferJob> for JobRow {
    fn from(job: &TransferJob) -> Self {
        let direction = match job.direction {
            TransferDirection::Upload => "upload",
            TransferDirection::Download => "download",
        };
        let status = match job.status {
            TransferStatus::Pending => "pending",
            TransferStatus::Uploading => "running",
            TransferStatus::Complete => "complete",
            TransferStatus::Error => "error",
            TransferStatus::Aborted => "aborted",
        };
        Self {
            id: job.id.to_string(),
            direction: direction.to_string(),
            source: job.source_ref.clone(),
            status: status.to_string(),
            progress: format!("{}%", job.progress_percent),
            detail: job
                .error
                .clone()
                .or_else(|| job.key.clone())
                .unwrap_or_default(),
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a progress line for a running job
pub fn print_progress(job: &TransferJob) {
    eprintln!("  {} {:>3}%  {}", job.id, job.progress_percent, job.source_ref);
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

#[cfg(test)]
mod tests {
    use cloudvault_entity::transfer::TransferDestination;

    use super::*;

    #[test]
    fn test_row_prefers_error_over_key() {
        let mut job = TransferJob::pending(
            TransferDirection::Upload,
            "/tmp/a.bin",
            TransferDestination::LocalPath { path: "a".into() },
            10,
        );
        job.key = Some("t/b/root/x-a.bin".to_string());
        assert_eq!(JobRow::from(&job).detail, "t/b/root/x-a.bin");

        job.status = TransferStatus::Error;
        job.error = Some("Part 2 was accepted without an ETag".to_string());
        let row = JobRow::from(&job);
        assert_eq!(row.status, "error");
        assert!(row.detail.contains("ETag"));
    }
}
