//! Multipart part descriptors.

use serde::{Deserialize, Serialize};

/// Highest part number the multipart protocol allows.
pub const MAX_PART_NUMBER: i32 = 10_000;

/// A part that has been uploaded and acknowledged by the object store.
///
/// Serialized with the object store's own field names so the completion
/// payload can be forwarded unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    /// 1-based part number.
    #[serde(rename = "PartNumber")]
    pub part_number: i32,
    /// Integrity tag returned for the part, without surrounding quotes.
    #[serde(rename = "ETag")]
    pub etag: String,
}

impl CompletedPart {
    /// Create a part descriptor, stripping any wrapping quotes from the tag.
    pub fn new(part_number: i32, etag: impl AsRef<str>) -> Self {
        Self {
            part_number,
            etag: strip_etag_quotes(etag.as_ref()).to_string(),
        }
    }
}

/// Remove the double quotes object stores wrap around ETag header values.
pub fn strip_etag_quotes(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}
