//! JSON bodies exchanged between the HTTP API and its clients.

pub mod admin;
pub mod multipart;
pub mod presign;
pub mod share;

pub use admin::*;
pub use multipart::*;
pub use presign::*;
pub use share::*;

use validator::ValidationError;

/// Rejects names that are empty once trimmed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("must not be blank".into()))
    } else {
        Ok(())
    }
}
