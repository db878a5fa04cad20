//! In-process object store.
//!
//! Presigned URLs are opaque `memory://signed/{token}` handles recorded in
//! the store. [`MemoryObjectStore::put_signed`] and
//! [`MemoryObjectStore::get_signed`] play the part of the storage endpoint
//! that a real client would send bytes to.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use uuid::Uuid;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::{ObjectInfo, ObjectPage, ObjectStore, PresignedUrl};
use cloudvault_core::types::CompletedPart;

use crate::keys::MAX_PART_NUMBER;

const SIGNED_PREFIX: &str = "memory://signed/";

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Bytes,
    etag: String,
    content_type: Option<String>,
    last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredPart {
    bytes: Bytes,
    etag: String,
}

#[derive(Debug)]
struct MultipartSession {
    key: String,
    content_type: Option<String>,
    parts: BTreeMap<i32, StoredPart>,
}

#[derive(Debug, Clone)]
enum SignedTarget {
    Put {
        key: String,
        content_type: Option<String>,
    },
    Part {
        upload_id: String,
        part_number: i32,
    },
    Get {
        key: String,
    },
}

#[derive(Debug, Default)]
struct MemoryState {
    objects: BTreeMap<String, StoredObject>,
    uploads: HashMap<String, MultipartSession>,
    signed: HashMap<String, (SignedTarget, DateTime<Utc>)>,
}

/// Object store kept entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a PUT against a signed URL and return the quoted ETag, the
    /// way an S3 endpoint reports it in the `ETag` header.
    pub async fn put_signed(&self, url: &str, body: Bytes) -> AppResult<String> {
        let mut state = self.state.lock().await;
        let target = Self::resolve(&state, url)?;
        let etag = content_etag(&body);
        match target {
            SignedTarget::Put { key, content_type } => {
                state.objects.insert(
                    key,
                    StoredObject {
                        bytes: body,
                        etag: etag.clone(),
                        content_type,
                        last_modified: Utc::now(),
                    },
                );
            }
            SignedTarget::Part {
                upload_id,
                part_number,
            } => {
                let session = state.uploads.get_mut(&upload_id).ok_or_else(|| {
                    AppError::not_found(format!("Multipart upload {upload_id} not found"))
                })?;
                session.parts.insert(
                    part_number,
                    StoredPart {
                        bytes: body,
                        etag: etag.clone(),
                    },
                );
            }
            SignedTarget::Get { .. } => {
                return Err(AppError::authorization("URL was not signed for PUT"));
            }
        }
        Ok(format!("\"{etag}\""))
    }

    /// Serve a GET against a signed URL.
    pub async fn get_signed(&self, url: &str) -> AppResult<Bytes> {
        let state = self.state.lock().await;
        match Self::resolve(&state, url)? {
            SignedTarget::Get { key } => state
                .objects
                .get(&key)
                .map(|o| o.bytes.clone())
                .ok_or_else(|| AppError::not_found(format!("Object {key} not found"))),
            _ => Err(AppError::authorization("URL was not signed for GET")),
        }
    }

    /// Store an object directly, bypassing signed URLs.
    pub async fn insert_object(&self, key: &str, body: Bytes) {
        let etag = content_etag(&body);
        self.state.lock().await.objects.insert(
            key.to_string(),
            StoredObject {
                bytes: body,
                etag,
                content_type: None,
                last_modified: Utc::now(),
            },
        );
    }

    /// Bytes of a stored object.
    pub async fn object_bytes(&self, key: &str) -> Option<Bytes> {
        self.state
            .lock()
            .await
            .objects
            .get(key)
            .map(|o| o.bytes.clone())
    }

    /// Content type recorded for a stored object.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .objects
            .get(key)
            .and_then(|o| o.content_type.clone())
    }

    /// Number of multipart sessions neither completed nor aborted.
    pub async fn open_multipart_uploads(&self) -> usize {
        self.state.lock().await.uploads.len()
    }

    fn resolve(state: &MemoryState, url: &str) -> AppResult<SignedTarget> {
        let token = url
            .strip_prefix(SIGNED_PREFIX)
            .ok_or_else(|| AppError::validation(format!("Not a memory-store URL: {url}")))?;
        let (target, expires_at) = state
            .signed
            .get(token)
            .ok_or_else(|| AppError::authorization("Unknown signature"))?;
        if Utc::now() > *expires_at {
            return Err(AppError::authorization("Signature has expired"));
        }
        Ok(target.clone())
    }

    async fn sign(&self, target: SignedTarget, expires_in: Duration) -> AppResult<PresignedUrl> {
        let ttl = chrono::Duration::from_std(expires_in)
            .map_err(|e| AppError::validation(format!("Invalid URL lifetime: {e}")))?;
        let expires_at = Utc::now() + ttl;
        let token = Uuid::new_v4().simple().to_string();
        self.state
            .lock()
            .await
            .signed
            .insert(token.clone(), (target, expires_at));
        Ok(PresignedUrl {
            url: format!("{SIGNED_PREFIX}{token}"),
            expires_at,
        })
    }
}

fn content_etag(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn create_multipart_upload(
        &self,
        key: &str,
        content_type: Option<&str>,
    ) -> AppResult<String> {
        let upload_id = Uuid::new_v4().simple().to_string();
        self.state.lock().await.uploads.insert(
            upload_id.clone(),
            MultipartSession {
                key: key.to_string(),
                content_type: content_type.map(str::to_string),
                parts: BTreeMap::new(),
            },
        );
        Ok(upload_id)
    }

    async fn presign_upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl> {
        if !(1..=MAX_PART_NUMBER).contains(&part_number) {
            return Err(AppError::validation(format!(
                "Part number {part_number} is outside 1..={MAX_PART_NUMBER}"
            )));
        }
        {
            let state = self.state.lock().await;
            let session = state.uploads.get(upload_id).ok_or_else(|| {
                AppError::not_found(format!("Multipart upload {upload_id} not found"))
            })?;
            if session.key != key {
                return Err(AppError::validation("Key does not match multipart upload"));
            }
        }
        self.sign(
            SignedTarget::Part {
                upload_id: upload_id.to_string(),
                part_number,
            },
            expires_in,
        )
        .await
    }

    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let session = state.uploads.get(upload_id).ok_or_else(|| {
            AppError::not_found(format!("Multipart upload {upload_id} not found"))
        })?;
        if session.key != key {
            return Err(AppError::validation("Key does not match multipart upload"));
        }
        if parts.is_empty() {
            return Err(AppError::validation("At least one part is required"));
        }
        if parts.windows(2).any(|w| w[0].part_number >= w[1].part_number) {
            return Err(AppError::validation(
                "Parts must be listed in ascending part-number order",
            ));
        }

        let mut body = BytesMut::new();
        let mut digest_input = Vec::with_capacity(parts.len() * 64);
        for part in parts {
            let stored = session.parts.get(&part.part_number).ok_or_else(|| {
                AppError::validation(format!("Part {} was never uploaded", part.part_number))
            })?;
            if stored.etag != part.etag {
                return Err(AppError::validation(format!(
                    "ETag mismatch for part {}",
                    part.part_number
                )));
            }
            body.extend_from_slice(&stored.bytes);
            digest_input.extend_from_slice(stored.etag.as_bytes());
        }

        let content_type = session.content_type.clone();
        let etag = format!("{}-{}", content_etag(&digest_input), parts.len());
        state.uploads.remove(upload_id);
        state.objects.insert(
            key.to_string(),
            StoredObject {
                bytes: body.freeze(),
                etag,
                content_type,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn abort_multipart_upload(&self, key: &str, upload_id: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        match state.uploads.get(upload_id).map(|s| s.key == key) {
            Some(true) => {
                state.uploads.remove(upload_id);
                Ok(())
            }
            Some(false) => Err(AppError::validation("Key does not match multipart upload")),
            None => Err(AppError::not_found(format!(
                "Multipart upload {upload_id} not found"
            ))),
        }
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: Option<&str>,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl> {
        self.sign(
            SignedTarget::Put {
                key: key.to_string(),
                content_type: content_type.map(str::to_string),
            },
            expires_in,
        )
        .await
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        _download_name: Option<&str>,
    ) -> AppResult<PresignedUrl> {
        self.sign(
            SignedTarget::Get {
                key: key.to_string(),
            },
            expires_in,
        )
        .await
    }

    async fn head_object(&self, key: &str) -> AppResult<Option<ObjectInfo>> {
        Ok(self.state.lock().await.objects.get(key).map(|o| ObjectInfo {
            key: key.to_string(),
            size: o.bytes.len() as i64,
            etag: Some(o.etag.clone()),
            last_modified: Some(o.last_modified),
        }))
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        self.state.lock().await.objects.remove(key);
        Ok(())
    }

    async fn list_objects(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> AppResult<ObjectPage> {
        let limit = usize::try_from(max_keys.max(1)).unwrap_or(1);
        let state = self.state.lock().await;
        let mut matching = state
            .objects
            .range(continuation_token.unwrap_or(prefix).to_string()..)
            .filter(|(key, _)| continuation_token.is_none_or(|token| key.as_str() > token))
            .take_while(|(key, _)| key.starts_with(prefix));

        let objects: Vec<ObjectInfo> = matching
            .by_ref()
            .take(limit)
            .map(|(key, o)| ObjectInfo {
                key: key.clone(),
                size: o.bytes.len() as i64,
                etag: Some(o.etag.clone()),
                last_modified: Some(o.last_modified),
            })
            .collect();
        let has_more = matching.next().is_some();
        let next_continuation_token = if has_more {
            objects.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ObjectPage {
            objects,
            next_continuation_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_single_put_and_get() {
        let store = MemoryObjectStore::new();
        let put = store.presign_put("t/b/root/a.txt", Some("text/plain"), TTL).await.expect("sign");
        let etag = store.put_signed(&put.url, Bytes::from_static(b"hello")).await.expect("put");
        assert!(etag.starts_with('"') && etag.ends_with('"'));

        let get = store.presign_get("t/b/root/a.txt", TTL, None).await.expect("sign");
        let body = store.get_signed(&get.url).await.expect("get");
        assert_eq!(&body[..], b"hello");
        assert_eq!(store.content_type("t/b/root/a.txt").await.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_get_url_cannot_be_used_for_put() {
        let store = MemoryObjectStore::new();
        let get = store.presign_get("k", TTL, None).await.expect("sign");
        assert!(store.put_signed(&get.url, Bytes::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_multipart_assembles_in_order() {
        let store = MemoryObjectStore::new();
        let upload_id = store.create_multipart_upload("k", None).await.expect("create");
        let mut parts = Vec::new();
        for (n, chunk) in [(2, "world"), (1, "hello ")] {
            let url = store.presign_upload_part("k", &upload_id, n, TTL).await.expect("sign");
            let etag = store.put_signed(&url.url, Bytes::from(chunk)).await.expect("put");
            parts.push(CompletedPart::new(n, etag));
        }

        let err = store
            .complete_multipart_upload("k", &upload_id, &parts)
            .await
            .expect_err("out-of-order parts rejected");
        assert_eq!(err.kind, cloudvault_core::error::ErrorKind::Validation);

        parts.sort_by_key(|p| p.part_number);
        store.complete_multipart_upload("k", &upload_id, &parts).await.expect("complete");
        assert_eq!(store.object_bytes("k").await.as_deref(), Some(&b"hello world"[..]));
        assert_eq!(store.open_multipart_uploads().await, 0);
    }

    #[tokio::test]
    async fn test_abort_releases_session() {
        let store = MemoryObjectStore::new();
        let upload_id = store.create_multipart_upload("k", None).await.expect("create");
        assert_eq!(store.open_multipart_uploads().await, 1);
        store.abort_multipart_upload("k", &upload_id).await.expect("abort");
        assert_eq!(store.open_multipart_uploads().await, 0);
        assert!(store.presign_upload_part("k", &upload_id, 1, TTL).await.is_err());
    }

    #[tokio::test]
    async fn test_part_number_bounds() {
        let store = MemoryObjectStore::new();
        let upload_id = store.create_multipart_upload("k", None).await.expect("create");
        assert!(store.presign_upload_part("k", &upload_id, 0, TTL).await.is_err());
        assert!(store.presign_upload_part("k", &upload_id, 10_001, TTL).await.is_err());
        assert!(store.presign_upload_part("k", &upload_id, 10_000, TTL).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_pages_with_continuation_token() {
        let store = MemoryObjectStore::new();
        for i in 0..5 {
            store.insert_object(&format!("p/{i}"), Bytes::from_static(b"x")).await;
        }
        store.insert_object("q/other", Bytes::from_static(b"x")).await;

        let first = store.list_objects("p/", None, 2).await.expect("list");
        assert_eq!(first.objects.len(), 2);
        let token = first.next_continuation_token.clone().expect("more pages");

        let second = store.list_objects("p/", Some(&token), 2).await.expect("list");
        assert_eq!(second.objects[0].key, "p/2");

        let third = store
            .list_objects("p/", second.next_continuation_token.as_deref(), 2)
            .await
            .expect("list");
        assert_eq!(third.objects.len(), 1);
        assert!(third.next_continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_expired_signature_rejected() {
        let store = MemoryObjectStore::new();
        let put = store.presign_put("k", None, Duration::from_secs(0)).await.expect("sign");
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(store.put_signed(&put.url, Bytes::new()).await.is_err());
    }
}
