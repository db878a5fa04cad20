//! Sequential transfer queue.
//!
//! Jobs run one at a time in enqueue order on a single background worker.
//! Each job's state lives in a `watch` channel, so callers can poll a
//! snapshot, subscribe to changes, or wait for a terminal status. Finished
//! jobs stay observable by ID until they are forgotten or pruned.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{RwLock, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use cloudvault_core::config::TransferConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{BucketId, JobId};
use cloudvault_entity::transfer::{
    TransferDestination, TransferDirection, TransferJob, TransferStatus,
};

use crate::executor::{JobExecutor, JobWork};
use crate::gateway::{PartTransport, TransferGateway};
use crate::source::TransferSource;

#[derive(Debug)]
struct JobSlot {
    state: Arc<watch::Sender<TransferJob>>,
    cancel: CancellationToken,
}

#[derive(Debug)]
struct QueuedJob {
    state: Arc<watch::Sender<TransferJob>>,
    cancel: CancellationToken,
    work: JobWork,
}

/// Client-side queue of uploads and downloads.
#[derive(Debug, Clone)]
pub struct TransferQueue {
    jobs: Arc<RwLock<HashMap<JobId, JobSlot>>>,
    sender: mpsc::UnboundedSender<QueuedJob>,
}

impl TransferQueue {
    /// Validate `config` and start the worker. Must be called inside a
    /// Tokio runtime; the worker stops once every handle is dropped.
    pub fn new(
        gateway: Arc<dyn TransferGateway>,
        transport: Arc<dyn PartTransport>,
        config: TransferConfig,
    ) -> AppResult<Self> {
        config.validate()?;
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(receiver, gateway, transport, config));
        Ok(Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            sender,
        })
    }

    /// Queue `source` for upload to a bucket destination.
    pub async fn enqueue_upload(
        &self,
        source: Arc<dyn TransferSource>,
        destination: TransferDestination,
    ) -> AppResult<JobId> {
        let TransferDestination::Bucket {
            bucket_id,
            parent_id,
            name,
        } = destination.clone()
        else {
            return Err(AppError::validation("Uploads need a bucket destination"));
        };
        if name.trim().is_empty() {
            return Err(AppError::validation("Upload name must not be empty"));
        }

        let job = TransferJob::pending(
            TransferDirection::Upload,
            source.describe(),
            destination,
            source.size(),
        );
        let work = JobWork::Upload {
            source,
            bucket_id,
            parent_id,
            name,
        };
        self.submit(job, work).await
    }

    /// Queue a download of `key` from `bucket_id` into `path`.
    pub async fn enqueue_download(
        &self,
        bucket_id: BucketId,
        key: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> AppResult<JobId> {
        let key = key.into();
        let path = path.into();
        let job = TransferJob::pending(
            TransferDirection::Download,
            key.clone(),
            TransferDestination::LocalPath { path: path.clone() },
            0,
        );
        let work = JobWork::Download {
            bucket_id,
            key,
            path,
        };
        self.submit(job, work).await
    }

    async fn submit(&self, job: TransferJob, work: JobWork) -> AppResult<JobId> {
        let id = job.id;
        let direction = job.direction;
        let source_ref = job.source_ref.clone();
        let (state, _) = watch::channel(job);
        let state = Arc::new(state);
        let cancel = CancellationToken::new();

        self.jobs.write().await.insert(
            id,
            JobSlot {
                state: state.clone(),
                cancel: cancel.clone(),
            },
        );
        self.sender
            .send(QueuedJob {
                state,
                cancel,
                work,
            })
            .map_err(|_| AppError::internal("Transfer worker has stopped"))?;

        info!(job_id = %id, direction = ?direction, source = %source_ref, "Transfer enqueued");
        Ok(id)
    }

    /// Current snapshot of a job.
    pub async fn job(&self, id: JobId) -> Option<TransferJob> {
        let jobs = self.jobs.read().await;
        jobs.get(&id).map(|slot| slot.state.borrow().clone())
    }

    /// Snapshots of every job, oldest first.
    pub async fn jobs(&self) -> Vec<TransferJob> {
        let jobs = self.jobs.read().await;
        let mut all: Vec<TransferJob> = jobs.values().map(|s| s.state.borrow().clone()).collect();
        all.sort_by_key(|job| job.created_at);
        all
    }

    /// Receiver that sees every state change of a job.
    pub async fn subscribe(&self, id: JobId) -> AppResult<watch::Receiver<TransferJob>> {
        let jobs = self.jobs.read().await;
        jobs.get(&id)
            .map(|slot| slot.state.subscribe())
            .ok_or_else(|| AppError::not_found(format!("Transfer job {id} not found")))
    }

    /// Wait until the job reaches a terminal status.
    pub async fn wait(&self, id: JobId) -> AppResult<TransferJob> {
        let mut receiver = self.subscribe(id).await?;
        let job = receiver
            .wait_for(|job| job.status.is_terminal())
            .await
            .map_err(|_| AppError::internal("Transfer job state was dropped"))?;
        Ok(job.clone())
    }

    /// Drop a finished job from the registry and return its final state.
    pub async fn forget(&self, id: JobId) -> AppResult<TransferJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get(&id)
            .map(|slot| slot.state.borrow().clone())
            .ok_or_else(|| AppError::not_found(format!("Transfer job {id} not found")))?;
        if !job.status.is_terminal() {
            return Err(AppError::conflict(format!(
                "Transfer job {id} is still {:?}",
                job.status
            )));
        }
        jobs.remove(&id);
        Ok(job)
    }

    /// Drop every finished job. Returns how many were removed.
    pub async fn prune_finished(&self) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, slot| !slot.state.borrow().status.is_terminal());
        let pruned = before - jobs.len();
        debug!(pruned, "Finished transfers pruned");
        pruned
    }

    /// Cancel a job.
    ///
    /// A pending job is aborted on the spot. A running job is signalled and
    /// reaches `Aborted` once its remote session has been discarded. Jobs
    /// that already finished are returned unchanged.
    pub async fn cancel(&self, id: JobId) -> AppResult<TransferJob> {
        let jobs = self.jobs.read().await;
        let slot = jobs
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Transfer job {id} not found")))?;

        let was_pending = slot.state.send_if_modified(|job| {
            if job.status != TransferStatus::Pending {
                return false;
            }
            job.status = TransferStatus::Aborted;
            job.finished_at = Some(Utc::now());
            true
        });
        slot.cancel.cancel();
        info!(job_id = %id, was_pending, "Transfer cancelled");
        Ok(slot.state.borrow().clone())
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<QueuedJob>,
    gateway: Arc<dyn TransferGateway>,
    transport: Arc<dyn PartTransport>,
    config: TransferConfig,
) {
    while let Some(queued) = receiver.recv().await {
        let started = queued.state.send_if_modified(|job| {
            if job.status != TransferStatus::Pending {
                return false;
            }
            job.status = TransferStatus::Uploading;
            true
        });
        let id = queued.state.borrow().id;
        if !started {
            debug!(job_id = %id, "Skipping cancelled transfer");
            continue;
        }

        info!(job_id = %id, "Transfer started");
        let executor = JobExecutor {
            gateway: gateway.as_ref(),
            transport: transport.as_ref(),
            config: &config,
            state: queued.state.as_ref(),
            cancel: &queued.cancel,
        };
        executor.run(queued.work).await;
    }
    debug!("Transfer queue closed");
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::Utc;
    use tokio::sync::{Mutex, Semaphore};

    use cloudvault_core::error::ErrorKind;

    use cloudvault_core::types::{FileId, TenantId, UserId};
    use cloudvault_entity::file::FileObject;
    use cloudvault_entity::wire::{
        AbortMultipartRequest, CompleteMultipartRequest, InitiateMultipartRequest,
        InitiateMultipartResponse, PresignAction, PresignRequest, PresignResponse,
        RegisterFileRequest, SignPartRequest, SignPartResponse,
    };

    use super::*;
    use crate::source::MemorySource;

    #[derive(Debug, Default)]
    struct Recorded {
        presigned: Vec<PresignRequest>,
        registered: Vec<RegisterFileRequest>,
        completed: Vec<CompleteMultipartRequest>,
        aborted: Vec<String>,
    }

    #[derive(Debug, Default)]
    struct MockGateway {
        calls: Mutex<Recorded>,
        fail_register: bool,
    }

    fn file_for(bucket_id: BucketId, key: &str, name: &str, size: i64) -> FileObject {
        FileObject {
            id: FileId::new(),
            tenant_id: TenantId::new(),
            bucket_id,
            parent_id: None,
            key: key.to_string(),
            name: name.to_string(),
            size,
            mime_type: None,
            owner_id: UserId::new(),
            created_at: Utc::now(),
        }
    }

    #[async_trait]
    impl TransferGateway for MockGateway {
        async fn presign(&self, request: PresignRequest) -> AppResult<PresignResponse> {
            let key = match request.action {
                PresignAction::Upload => format!("uploads/{}", request.name.clone().unwrap()),
                _ => request.key.clone().unwrap(),
            };
            self.calls.lock().await.presigned.push(request);
            Ok(PresignResponse {
                url: format!("mock://object/{key}"),
                key,
                expires_at: Utc::now(),
            })
        }

        async fn register(&self, request: RegisterFileRequest) -> AppResult<FileObject> {
            if self.fail_register {
                return Err(AppError::not_found("Object not found in storage"));
            }
            let file = file_for(request.bucket_id, &request.key, &request.name, request.size);
            self.calls.lock().await.registered.push(request);
            Ok(file)
        }

        async fn initiate(
            &self,
            request: InitiateMultipartRequest,
        ) -> AppResult<InitiateMultipartResponse> {
            Ok(InitiateMultipartResponse {
                upload_id: "upload-1".to_string(),
                key: format!("uploads/{}", request.name),
            })
        }

        async fn sign_part(&self, request: SignPartRequest) -> AppResult<SignPartResponse> {
            Ok(SignPartResponse {
                url: format!("mock://part/{}", request.part_number),
            })
        }

        async fn complete(&self, request: CompleteMultipartRequest) -> AppResult<FileObject> {
            let file = file_for(request.bucket_id, &request.key, &request.name, request.size);
            self.calls.lock().await.completed.push(request);
            Ok(file)
        }

        async fn abort(&self, request: AbortMultipartRequest) -> AppResult<()> {
            self.calls.lock().await.aborted.push(request.upload_id);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct MockTransport {
        parts: Mutex<BTreeMap<i32, Bytes>>,
        objects: Mutex<HashMap<String, Bytes>>,
        no_etag_part: Option<i32>,
        stall_part: Option<i32>,
        /// Every PUT takes one permit first.
        gate: Option<Arc<Semaphore>>,
        puts: AtomicUsize,
    }

    impl MockTransport {
        fn gated() -> (Self, Arc<Semaphore>) {
            let gate = Arc::new(Semaphore::new(0));
            let transport = Self {
                gate: Some(gate.clone()),
                ..Default::default()
            };
            (transport, gate)
        }
    }

    #[async_trait]
    impl PartTransport for MockTransport {
        async fn put(
            &self,
            url: &str,
            body: Bytes,
            _content_type: Option<&str>,
        ) -> AppResult<Option<String>> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            if let Some(part) = url.strip_prefix("mock://part/") {
                let number: i32 = part.parse().unwrap();
                if self.stall_part == Some(number) {
                    std::future::pending::<()>().await;
                }
                self.parts.lock().await.insert(number, body);
                if self.no_etag_part == Some(number) {
                    return Ok(None);
                }
                return Ok(Some(format!("\"etag-{number}\"")));
            }
            let key = url.trim_start_matches("mock://object/").to_string();
            self.objects.lock().await.insert(key, body);
            Ok(Some("\"whole\"".to_string()))
        }

        async fn get(&self, url: &str) -> AppResult<Bytes> {
            let key = url.trim_start_matches("mock://object/");
            Ok(self
                .objects
                .lock()
                .await
                .get(key)
                .cloned()
                .unwrap_or_else(|| Bytes::from_static(b"remote-bytes")))
        }
    }

    fn small_config() -> TransferConfig {
        TransferConfig {
            multipart_threshold_bytes: 10,
            part_size_bytes: 4,
            concurrency: 2,
        }
    }

    fn queue(gateway: &Arc<MockGateway>, transport: &Arc<MockTransport>) -> TransferQueue {
        TransferQueue::new(gateway.clone(), transport.clone(), small_config()).unwrap()
    }

    fn destination(name: &str) -> TransferDestination {
        TransferDestination::Bucket {
            bucket_id: BucketId::new(),
            parent_id: None,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_small_file_uses_single_put_and_registers() {
        let gateway = Arc::new(MockGateway::default());
        let transport = Arc::new(MockTransport::default());
        let queue = queue(&gateway, &transport);

        let source = Arc::new(MemorySource::new("notes.txt", Bytes::from_static(b"hello")));
        let id = queue.enqueue_upload(source, destination("notes.txt")).await.unwrap();
        let job = queue.wait(id).await.unwrap();

        assert_eq!(job.status, TransferStatus::Complete);
        assert_eq!(job.progress_percent, 100);
        assert_eq!(job.key.as_deref(), Some("uploads/notes.txt"));
        assert!(job.file.is_some());
        assert!(job.finished_at.is_some());

        let calls = gateway.calls.lock().await;
        assert_eq!(calls.registered.len(), 1);
        assert_eq!(calls.registered[0].size, 5);
        assert!(calls.completed.is_empty());
        assert_eq!(
            transport.objects.lock().await.get("uploads/notes.txt").unwrap(),
            &Bytes::from_static(b"hello")
        );
    }

    #[tokio::test]
    async fn test_large_file_uploads_parts_in_order() {
        let gateway = Arc::new(MockGateway::default());
        let transport = Arc::new(MockTransport::default());
        let queue = queue(&gateway, &transport);

        let body = Bytes::from_static(b"abcdefghijklmnopqr");
        let source = Arc::new(MemorySource::new("big.bin", body.clone()));
        let id = queue.enqueue_upload(source, destination("big.bin")).await.unwrap();
        let job = queue.wait(id).await.unwrap();

        assert_eq!(job.status, TransferStatus::Complete);
        assert_eq!(job.progress_percent, 100);
        let numbers: Vec<i32> = job.parts.iter().map(|p| p.part_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert!(job.parts.iter().all(|p| !p.etag.contains('"')));

        let calls = gateway.calls.lock().await;
        assert_eq!(calls.completed.len(), 1);
        assert_eq!(calls.completed[0].parts, job.parts);
        assert_eq!(calls.completed[0].size, 18);
        assert!(calls.aborted.is_empty());

        let parts = transport.parts.lock().await;
        let assembled: Vec<u8> = parts.values().flat_map(|b| b.to_vec()).collect();
        assert_eq!(assembled, body.to_vec());
        assert_eq!(parts[&5].len(), 2);
    }

    #[tokio::test]
    async fn test_part_without_etag_fails_and_aborts() {
        let gateway = Arc::new(MockGateway::default());
        let transport = Arc::new(MockTransport {
            no_etag_part: Some(3),
            ..Default::default()
        });
        let queue = queue(&gateway, &transport);

        let source = Arc::new(MemorySource::new("big.bin", vec![7u8; 18]));
        let id = queue.enqueue_upload(source, destination("big.bin")).await.unwrap();
        let job = queue.wait(id).await.unwrap();

        assert_eq!(job.status, TransferStatus::Error);
        assert!(job.error.unwrap().contains("ETag"));
        assert!(job.file.is_none());

        let calls = gateway.calls.lock().await;
        assert_eq!(calls.aborted, vec!["upload-1".to_string()]);
        assert!(calls.completed.is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_halt_queue() {
        let gateway = Arc::new(MockGateway {
            fail_register: true,
            ..Default::default()
        });
        let transport = Arc::new(MockTransport::default());
        let queue = queue(&gateway, &transport);

        let first = queue
            .enqueue_upload(Arc::new(MemorySource::new("a.txt", "aaa")), destination("a.txt"))
            .await
            .unwrap();
        let second = queue
            .enqueue_upload(
                Arc::new(MemorySource::new("b.bin", vec![1u8; 12])),
                destination("b.bin"),
            )
            .await
            .unwrap();

        let first = queue.wait(first).await.unwrap();
        let second = queue.wait(second).await.unwrap();
        assert_eq!(first.status, TransferStatus::Error);
        assert_eq!(second.status, TransferStatus::Complete);
        assert_eq!(queue.jobs().await.len(), 2);
    }

    async fn wait_for_status(queue: &TransferQueue, id: JobId, status: TransferStatus) {
        let mut updates = queue.subscribe(id).await.unwrap();
        updates.wait_for(|job| job.status == status).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_pending_job_never_runs() {
        let gateway = Arc::new(MockGateway::default());
        let (transport, gate) = MockTransport::gated();
        let transport = Arc::new(transport);
        let queue = queue(&gateway, &transport);

        let first = queue
            .enqueue_upload(Arc::new(MemorySource::new("a.txt", "a")), destination("a.txt"))
            .await
            .unwrap();
        let second = queue
            .enqueue_upload(Arc::new(MemorySource::new("b.txt", "b")), destination("b.txt"))
            .await
            .unwrap();
        wait_for_status(&queue, first, TransferStatus::Uploading).await;
        assert_eq!(queue.job(second).await.unwrap().status, TransferStatus::Pending);

        let cancelled = queue.cancel(second).await.unwrap();
        assert_eq!(cancelled.status, TransferStatus::Aborted);

        gate.add_permits(1);
        assert_eq!(queue.wait(first).await.unwrap().status, TransferStatus::Complete);
        assert_eq!(queue.wait(second).await.unwrap().status, TransferStatus::Aborted);
        assert_eq!(gateway.calls.lock().await.presigned.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_running_multipart_aborts_remote() {
        let gateway = Arc::new(MockGateway::default());
        let transport = Arc::new(MockTransport {
            stall_part: Some(2),
            ..Default::default()
        });
        let queue = queue(&gateway, &transport);

        let id = queue
            .enqueue_upload(
                Arc::new(MemorySource::new("big.bin", vec![0u8; 16])),
                destination("big.bin"),
            )
            .await
            .unwrap();
        let mut updates = queue.subscribe(id).await.unwrap();
        updates.wait_for(|job| !job.parts.is_empty()).await.unwrap();
        assert_eq!(updates.borrow().progress_percent, 25);

        queue.cancel(id).await.unwrap();
        let job = queue.wait(id).await.unwrap();
        assert_eq!(job.status, TransferStatus::Aborted);
        assert_eq!(gateway.calls.lock().await.aborted.len(), 1);
        assert!(gateway.calls.lock().await.completed.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_finished_job_is_unchanged() {
        let gateway = Arc::new(MockGateway::default());
        let transport = Arc::new(MockTransport::default());
        let queue = queue(&gateway, &transport);

        let id = queue
            .enqueue_upload(Arc::new(MemorySource::new("a.txt", "a")), destination("a.txt"))
            .await
            .unwrap();
        queue.wait(id).await.unwrap();
        let job = queue.cancel(id).await.unwrap();
        assert_eq!(job.status, TransferStatus::Complete);
    }

    #[tokio::test]
    async fn test_download_writes_local_file() {
        let gateway = Arc::new(MockGateway::default());
        let transport = Arc::new(MockTransport::default());
        let queue = queue(&gateway, &transport);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let id = queue
            .enqueue_download(BucketId::new(), "uploads/report.pdf", &path)
            .await
            .unwrap();
        let job = queue.wait(id).await.unwrap();

        assert_eq!(job.status, TransferStatus::Complete);
        assert_eq!(job.direction, TransferDirection::Download);
        assert_eq!(job.total_size, 12);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"remote-bytes");
        assert_eq!(
            gateway.calls.lock().await.presigned[0].action,
            PresignAction::Download
        );
    }

    #[tokio::test]
    async fn test_upload_needs_bucket_destination() {
        let gateway = Arc::new(MockGateway::default());
        let transport = Arc::new(MockTransport::default());
        let queue = queue(&gateway, &transport);

        let err = queue
            .enqueue_upload(
                Arc::new(MemorySource::new("a.txt", "a")),
                TransferDestination::LocalPath { path: "x".into() },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, cloudvault_core::error::ErrorKind::Validation);
        assert_eq!(transport.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_jobs_run_one_at_a_time_in_order() {
        let gateway = Arc::new(MockGateway::default());
        let (transport, gate) = MockTransport::gated();
        let transport = Arc::new(transport);
        let queue = queue(&gateway, &transport);

        let mut ids = Vec::new();
        for name in ["a.txt", "b.txt", "c.txt"] {
            let source = Arc::new(MemorySource::new(name, "x"));
            ids.push(queue.enqueue_upload(source, destination(name)).await.unwrap());
        }

        for (running, id) in ids.iter().enumerate() {
            wait_for_status(&queue, *id, TransferStatus::Uploading).await;
            for _ in 0..16 {
                tokio::task::yield_now().await;
            }
            for later in &ids[running + 1..] {
                assert_eq!(queue.job(*later).await.unwrap().status, TransferStatus::Pending);
            }
            assert_eq!(gateway.calls.lock().await.presigned.len(), running + 1);

            gate.add_permits(1);
            assert_eq!(queue.wait(*id).await.unwrap().status, TransferStatus::Complete);
        }

        let names: Vec<String> = gateway
            .calls
            .lock()
            .await
            .registered
            .iter()
            .map(|r| r.name.clone())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    /// Tracks how many part PUTs overlap and the order they start and end.
    #[derive(Debug, Default)]
    struct OverlapTransport {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        events: Mutex<Vec<(i32, bool)>>,
    }

    #[async_trait]
    impl PartTransport for OverlapTransport {
        async fn put(
            &self,
            url: &str,
            _body: Bytes,
            _content_type: Option<&str>,
        ) -> AppResult<Option<String>> {
            let number: i32 = url.trim_start_matches("mock://part/").parse().unwrap();
            self.events.lock().await.push((number, true));
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.events.lock().await.push((number, false));
            Ok(Some(format!("etag-{number}")))
        }

        async fn get(&self, _url: &str) -> AppResult<Bytes> {
            Ok(Bytes::new())
        }
    }

    #[tokio::test]
    async fn test_parts_go_in_bounded_batches() {
        let gateway = Arc::new(MockGateway::default());
        let transport = Arc::new(OverlapTransport::default());
        let queue =
            TransferQueue::new(gateway.clone(), transport.clone(), small_config()).unwrap();

        let source = Arc::new(MemorySource::new("big.bin", vec![3u8; 18]));
        let id = queue.enqueue_upload(source, destination("big.bin")).await.unwrap();
        assert_eq!(queue.wait(id).await.unwrap().status, TransferStatus::Complete);

        let concurrency = small_config().concurrency;
        assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), concurrency);

        let events = transport.events.lock().await;
        let position = |part: i32, started: bool| {
            events
                .iter()
                .position(|e| *e == (part, started))
                .unwrap()
        };
        let parts: Vec<i32> = (1..=5).collect();
        let batches: Vec<&[i32]> = parts.chunks(concurrency).collect();
        assert_eq!(batches.len(), 3);
        for pair in batches.windows(2) {
            let last_end = pair[0].iter().map(|p| position(*p, false)).max().unwrap();
            let next_start = pair[1].iter().map(|p| position(*p, true)).min().unwrap();
            assert!(last_end < next_start, "batch {:?} overlapped {:?}", pair[1], pair[0]);
        }
    }

    #[tokio::test]
    async fn test_forget_and_prune_finished_jobs() {
        let gateway = Arc::new(MockGateway::default());
        let (transport, gate) = MockTransport::gated();
        let transport = Arc::new(transport);
        let queue = queue(&gateway, &transport);

        let done = queue
            .enqueue_upload(Arc::new(MemorySource::new("a.txt", "a")), destination("a.txt"))
            .await
            .unwrap();
        let running = queue
            .enqueue_upload(Arc::new(MemorySource::new("b.txt", "b")), destination("b.txt"))
            .await
            .unwrap();
        gate.add_permits(1);
        queue.wait(done).await.unwrap();
        wait_for_status(&queue, running, TransferStatus::Uploading).await;

        let err = queue.forget(running).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let forgotten = queue.forget(done).await.unwrap();
        assert_eq!(forgotten.status, TransferStatus::Complete);
        assert!(queue.job(done).await.is_none());
        assert_eq!(queue.forget(done).await.unwrap_err().kind, ErrorKind::NotFound);

        gate.add_permits(1);
        queue.wait(running).await.unwrap();
        assert_eq!(queue.prune_finished().await, 1);
        assert!(queue.jobs().await.is_empty());
    }
}
