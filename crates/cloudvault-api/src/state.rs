//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use cloudvault_auth::{IdentityProvider, ShareTokenIssuer};
use cloudvault_core::config::AppConfig;
use cloudvault_core::traits::{AuditSink, NotificationSink, ObjectStore};
use cloudvault_database::postgres::{
    PgAuditStore, PgBucketStore, PgFileStore, PgPrincipalStore, PgShareStore,
};
use cloudvault_database::{
    BucketStore, DatabasePool, FileStore, MemoryStore, PrincipalStore, ShareStore,
};
use cloudvault_service::{
    AccessAdminService, AuditRecorder, FileService, MultipartService, NotificationDispatcher,
    PresignService, PrincipalService, ShareAccessService, ShareService,
};

/// The collaborators the services are built from.
#[derive(Debug, Clone)]
pub struct Backends {
    /// Bucket metadata.
    pub buckets: Arc<dyn BucketStore>,
    /// File metadata.
    pub files: Arc<dyn FileStore>,
    /// Users, teams, and policies.
    pub principals: Arc<dyn PrincipalStore>,
    /// Share records.
    pub shares: Arc<dyn ShareStore>,
    /// Audit log.
    pub audit: Arc<dyn AuditSink>,
    /// Object store.
    pub objects: Arc<dyn ObjectStore>,
    /// Outbound email.
    pub notifications: Arc<dyn NotificationSink>,
    /// Bearer token verification.
    pub identity: Arc<dyn IdentityProvider>,
}

impl Backends {
    /// Every metadata store backed by one in-memory store.
    pub fn memory(
        store: &MemoryStore,
        objects: Arc<dyn ObjectStore>,
        notifications: Arc<dyn NotificationSink>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let store = Arc::new(store.clone());
        Self {
            buckets: store.clone(),
            files: store.clone(),
            principals: store.clone(),
            shares: store.clone(),
            audit: store,
            objects,
            notifications,
            identity,
        }
    }

    /// Every metadata store backed by PostgreSQL.
    pub fn postgres(
        db: &DatabasePool,
        objects: Arc<dyn ObjectStore>,
        notifications: Arc<dyn NotificationSink>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let pool = db.pool().clone();
        Self {
            buckets: Arc::new(PgBucketStore::new(pool.clone())),
            files: Arc::new(PgFileStore::new(pool.clone())),
            principals: Arc::new(PgPrincipalStore::new(pool.clone())),
            shares: Arc::new(PgShareStore::new(pool.clone())),
            audit: Arc::new(PgAuditStore::new(pool)),
            objects,
            notifications,
            identity,
        }
    }
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Bearer token verification
    pub identity: Arc<dyn IdentityProvider>,
    /// Object store, for health reporting
    pub objects: Arc<dyn ObjectStore>,
    /// Principal resolution
    pub principals: Arc<PrincipalService>,
    /// Single-shot presign and registration
    pub presign: Arc<PresignService>,
    /// Multipart sessions
    pub multipart: Arc<MultipartService>,
    /// Buckets, listings, deletion
    pub files: Arc<FileService>,
    /// Share creation, listing, revocation
    pub shares: Arc<ShareService>,
    /// Public share access
    pub share_access: Arc<ShareAccessService>,
    /// Share token settings, for the session cookie
    pub tokens: Arc<ShareTokenIssuer>,
    /// Policy and team administration
    pub access_admin: Arc<AccessAdminService>,
    /// When the state was built
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire every service from `backends`.
    pub fn new(config: AppConfig, backends: Backends) -> Self {
        let audit = AuditRecorder::new(backends.audit.clone());
        let notifier = NotificationDispatcher::new(backends.notifications.clone());
        let tokens = Arc::new(ShareTokenIssuer::new(&config.auth));

        let presign = PresignService::new(
            backends.buckets.clone(),
            backends.files.clone(),
            backends.objects.clone(),
            audit.clone(),
            config.storage.clone(),
        );
        let multipart = MultipartService::new(
            backends.buckets.clone(),
            backends.files.clone(),
            backends.objects.clone(),
            audit.clone(),
            config.storage.clone(),
        );
        let files = FileService::new(
            backends.buckets.clone(),
            backends.files.clone(),
            backends.objects.clone(),
            audit.clone(),
            config.storage.clone(),
        );
        let shares = ShareService::new(
            backends.shares.clone(),
            backends.files.clone(),
            notifier.clone(),
            audit.clone(),
            config.share.clone(),
        );
        let share_access = ShareAccessService::new(
            backends.shares.clone(),
            backends.files.clone(),
            backends.objects.clone(),
            tokens.clone(),
            notifier,
            audit.clone(),
            config.share.clone(),
            &config.storage,
        );
        let access_admin = AccessAdminService::new(backends.principals.clone(), audit);

        Self {
            identity: backends.identity,
            objects: backends.objects,
            principals: Arc::new(PrincipalService::new(backends.principals)),
            presign: Arc::new(presign),
            multipart: Arc::new(multipart),
            files: Arc::new(files),
            shares: Arc::new(shares),
            share_access: Arc::new(share_access),
            tokens,
            access_admin: Arc::new(access_admin),
            config: Arc::new(config),
            started_at: Utc::now(),
        }
    }
}
