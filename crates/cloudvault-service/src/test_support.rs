//! Shared fixtures for service tests.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;

use cloudvault_auth::ShareTokenIssuer;
use cloudvault_core::config::{AuthConfig, ShareConfig, StorageConfig};
use cloudvault_core::types::{BucketId, TenantId, UserId};
use cloudvault_database::{MemoryStore, PrincipalStore, ShareStore};
use cloudvault_entity::bucket::Bucket;
use cloudvault_entity::file::{FileObject, NewFileObject};
use cloudvault_entity::permission::{Action, NewPolicy, PolicyOwner, ResourceType};
use cloudvault_entity::principal::{Role, User};
use cloudvault_storage::{MemoryObjectStore, keys};

use crate::audit::AuditRecorder;
use crate::context::RequestContext;
use crate::notification::{MemoryNotificationSink, NotificationDispatcher};
use crate::share::{ShareAccessService, ShareService};
use crate::storage::{FileService, MultipartService, PresignService};

pub(crate) struct Harness {
    pub store: MemoryStore,
    pub objects: MemoryObjectStore,
    pub notifications: MemoryNotificationSink,
    pub presign: PresignService,
    pub multipart: MultipartService,
    pub files: FileService,
    pub shares: ShareService,
    pub share_access: ShareAccessService,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let objects = MemoryObjectStore::new();
        let notifications = MemoryNotificationSink::new();

        let db = Arc::new(store.clone());
        let object_store = Arc::new(objects.clone());
        let audit = AuditRecorder::new(db.clone());
        let notifier = NotificationDispatcher::new(Arc::new(notifications.clone()));
        let storage = StorageConfig::default();
        let auth = AuthConfig {
            share_token_secret: "test-share-secret".to_string(),
            ..AuthConfig::default()
        };

        Self {
            presign: PresignService::new(
                db.clone(),
                db.clone(),
                object_store.clone(),
                audit.clone(),
                storage.clone(),
            ),
            multipart: MultipartService::new(
                db.clone(),
                db.clone(),
                object_store.clone(),
                audit.clone(),
                storage.clone(),
            ),
            files: FileService::new(
                db.clone(),
                db.clone(),
                object_store.clone(),
                audit.clone(),
                storage.clone(),
            ),
            shares: ShareService::new(
                db.clone(),
                db.clone(),
                notifier.clone(),
                audit.clone(),
                ShareConfig::default(),
            ),
            share_access: ShareAccessService::new(
                db.clone(),
                db,
                object_store,
                Arc::new(ShareTokenIssuer::new(&auth)),
                notifier,
                audit,
                ShareConfig::default(),
                &storage,
            ),
            store,
            objects,
            notifications,
        }
    }

    pub fn store_shares(&self) -> &dyn ShareStore {
        &self.store
    }

    pub async fn bucket(&self, tenant_id: TenantId) -> Bucket {
        let bucket = Bucket {
            id: BucketId::new(),
            tenant_id,
            name: format!("bucket-{}", BucketId::new()),
            created_by: UserId::new(),
            created_at: Utc::now(),
        };
        cloudvault_database::BucketStore::insert(&self.store, &bucket)
            .await
            .unwrap()
    }

    pub async fn user(&self, tenant_id: TenantId, role: Role) -> User {
        seed_user(&self.store, tenant_id, role).await
    }

    pub async fn context(&self, user: &User) -> RequestContext {
        context(&self.store, user).await
    }

    /// Register a file whose bytes already sit in the object store.
    pub async fn file(&self, bucket: &Bucket, owner: &User, name: &str) -> FileObject {
        let key = keys::upload_key(bucket.tenant_id, bucket.id, None, name);
        self.objects
            .insert_object(&key, Bytes::from_static(b"file-body"))
            .await;
        let file = NewFileObject {
            tenant_id: bucket.tenant_id,
            bucket_id: bucket.id,
            key,
            name: name.to_string(),
            size: 9,
            mime_type: None,
            parent_id: None,
            owner_id: owner.id,
        }
        .into_file();
        cloudvault_database::FileStore::insert(&self.store, &file)
            .await
            .unwrap()
    }

    /// Let background notification tasks run.
    pub async fn settle(&self) {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    /// Token of the most recent magic-link email.
    pub async fn last_magic_token(&self) -> String {
        let sent = self.notifications.sent().await;
        let body = &sent.last().unwrap().body;
        let start = body.find("token=").unwrap() + "token=".len();
        body[start..]
            .split_whitespace()
            .next()
            .unwrap()
            .to_string()
    }
}

pub(crate) async fn seed_user(store: &MemoryStore, tenant_id: TenantId, role: Role) -> User {
    let id = UserId::new();
    store
        .create_user_if_absent(&User {
            id,
            tenant_id,
            email: format!("{id}@example.com"),
            role,
            created_at: Utc::now(),
        })
        .await
        .unwrap()
}

pub(crate) async fn context(store: &MemoryStore, user: &User) -> RequestContext {
    RequestContext::new(store.load_principal(user).await.unwrap())
}

pub(crate) async fn grant_bucket(
    store: &MemoryStore,
    user: &User,
    bucket_id: Option<BucketId>,
    actions: &[Action],
) {
    let policy = NewPolicy {
        owner: PolicyOwner::User(user.id),
        resource_type: ResourceType::Bucket,
        resource_id: bucket_id.map(BucketId::into_uuid),
        actions: actions.iter().copied().collect(),
    }
    .into_policy(user.tenant_id);
    store.insert_policy(&policy).await.unwrap();
}
