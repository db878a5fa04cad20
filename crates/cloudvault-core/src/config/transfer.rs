//! Client-side transfer tuning.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Thresholds and fan-out used by the transfer queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Files at or above this size use multipart upload (default 100 MiB).
    #[serde(default = "default_threshold")]
    pub multipart_threshold_bytes: u64,
    /// Size of every part but the last (default 20 MiB).
    #[serde(default = "default_part_size")]
    pub part_size_bytes: u64,
    /// Parts in flight per batch.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl TransferConfig {
    /// Reject settings that would make the part plan degenerate.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.part_size_bytes == 0 {
            return Err(AppError::configuration(
                "transfer.part_size_bytes must be positive",
            ));
        }
        if self.concurrency == 0 {
            return Err(AppError::configuration(
                "transfer.concurrency must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            multipart_threshold_bytes: default_threshold(),
            part_size_bytes: default_part_size(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_threshold() -> u64 {
    104_857_600 // 100 MiB
}

fn default_part_size() -> u64 {
    20_971_520 // 20 MiB
}

fn default_concurrency() -> usize {
    3
}
