//! Byte sources for uploads.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;

/// Random-access bytes to upload.
#[async_trait]
pub trait TransferSource: Send + Sync + std::fmt::Debug + 'static {
    /// Name registered for the uploaded file.
    fn name(&self) -> &str;

    /// Total size in bytes.
    fn size(&self) -> u64;

    /// MIME type, if known.
    fn content_type(&self) -> Option<&str>;

    /// Where the bytes come from, for display.
    fn describe(&self) -> String;

    /// Read `len` bytes starting at `offset`.
    async fn read_range(&self, offset: u64, len: u64) -> AppResult<Bytes>;
}

/// A file on local disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
    size: u64,
    content_type: Option<String>,
}

impl FileSource {
    /// Stat `path` and prepare it for upload.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(AppError::validation(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::validation("Path has no usable file name"))?;
        let content_type = guess_content_type(&name);
        Ok(Self {
            path,
            name,
            size: metadata.len(),
            content_type: Some(content_type),
        })
    }
}

#[async_trait]
impl TransferSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_range(&self, offset: u64, len: u64) -> AppResult<Bytes> {
        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(offset)).await?;
        let len = usize::try_from(len)
            .map_err(|_| AppError::validation("Part is too large for this platform"))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf).await?;
        Ok(Bytes::from(buf))
    }
}

/// Bytes already in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    bytes: Bytes,
    content_type: Option<String>,
}

impl MemorySource {
    /// Wrap `bytes` as an upload named `name`; the MIME type is guessed
    /// from the extension.
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content_type = guess_content_type(&name);
        Self {
            name,
            bytes: bytes.into(),
            content_type: Some(content_type),
        }
    }

    /// Override the guessed MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[async_trait]
impl TransferSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }

    async fn read_range(&self, offset: u64, len: u64) -> AppResult<Bytes> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let end = start.saturating_add(usize::try_from(len).unwrap_or(usize::MAX));
        if end > self.bytes.len() {
            return Err(AppError::validation(format!(
                "Range {offset}+{len} is past the end of {}",
                self.name
            )));
        }
        Ok(self.bytes.slice(start..end))
    }
}

fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn test_file_source_reads_ranges() {
        let mut tmp = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        tmp.write_all(b"0123456789").unwrap();

        let source = FileSource::open(tmp.path()).await.unwrap();
        assert_eq!(source.size(), 10);
        assert_eq!(source.content_type(), Some("text/plain"));
        assert_eq!(source.read_range(3, 4).await.unwrap(), Bytes::from_static(b"3456"));
        assert!(source.read_range(8, 4).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_source_bounds() {
        let source = MemorySource::new("a.bin", Bytes::from_static(b"abc"));
        assert_eq!(source.content_type(), Some("application/octet-stream"));
        assert_eq!(source.read_range(1, 2).await.unwrap(), Bytes::from_static(b"bc"));
        assert!(source.read_range(2, 2).await.is_err());
    }

    #[test]
    fn test_content_type_follows_extension() {
        assert_eq!(
            MemorySource::new("slides.docx", Bytes::new()).content_type(),
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        );
        assert_eq!(
            MemorySource::new("logo.svg", Bytes::new()).content_type(),
            Some("image/svg+xml")
        );
        assert_eq!(
            MemorySource::new("notes", Bytes::new()).content_type(),
            Some("application/octet-stream")
        );
        assert_eq!(
            MemorySource::new("raw.dat", Bytes::new())
                .with_content_type("text/csv")
                .content_type(),
            Some("text/csv")
        );
    }
}
