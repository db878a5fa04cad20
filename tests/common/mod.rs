//! Shared harness for workspace integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use bytes::Bytes;
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use cloudvault_api::{AppState, Backends, build_router};
use cloudvault_auth::{JwtIdentityProvider, VerifiedIdentity};
use cloudvault_core::config::{AppConfig, MetadataBackend};
use cloudvault_core::types::{TenantId, UserId};
use cloudvault_database::{MemoryStore, PrincipalStore};
use cloudvault_entity::principal::{Role, User};
use cloudvault_service::MemoryNotificationSink;
use cloudvault_storage::MemoryObjectStore;

/// A response read fully into memory.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The full router over in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: MemoryStore,
    pub objects: MemoryObjectStore,
    pub notifications: MemoryNotificationSink,
    pub identity: JwtIdentityProvider,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.backend = MetadataBackend::Memory;
        config.auth.identity_secret = "integration-identity-secret".to_string();
        config.auth.share_token_secret = "integration-share-secret".to_string();

        let store = MemoryStore::new();
        let objects = MemoryObjectStore::new();
        let notifications = MemoryNotificationSink::new();
        let identity = JwtIdentityProvider::new(&config.auth);

        let backends = Backends::memory(
            &store,
            Arc::new(objects.clone()),
            Arc::new(notifications.clone()),
            Arc::new(JwtIdentityProvider::new(&config.auth)),
        );
        let state = AppState::new(config, backends);

        Self {
            router: build_router(state.clone()),
            state,
            store,
            objects,
            notifications,
            identity,
        }
    }

    /// Store a user and sign a bearer token for it.
    pub async fn user(&self, tenant_id: TenantId, role: Role) -> (User, String) {
        let id = UserId::new();
        let user = self
            .store
            .create_user_if_absent(&User {
                id,
                tenant_id,
                email: format!("{id}@example.com"),
                role,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let token = self.token_for(&user);
        (user, token)
    }

    pub fn token_for(&self, user: &User) -> String {
        let identity = VerifiedIdentity {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            tenant_id: user.tenant_id,
        };
        self.identity.issue(&identity, Duration::hours(1)).unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        self.send(method, uri, token, None, body).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Send with an explicit `Cookie` header.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Create a bucket through the API and return its ID.
    pub async fn create_bucket(&self, token: &str, name: &str) -> String {
        let response = self
            .post("/api/buckets", Some(token), serde_json::json!({ "name": name }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Upload `bytes` through presign, signed PUT, and register.
    pub async fn upload(&self, token: &str, bucket_id: &str, name: &str, bytes: &'static [u8]) -> Value {
        let signed = self
            .post(
                "/api/presign",
                Some(token),
                serde_json::json!({ "bucketId": bucket_id, "action": "upload", "name": name }),
            )
            .await;
        assert_eq!(signed.status, StatusCode::OK, "{:?}", signed.body);
        let url = signed.body["url"].as_str().unwrap();
        let key = signed.body["key"].as_str().unwrap();
        self.objects
            .put_signed(url, Bytes::from_static(bytes))
            .await
            .unwrap();

        let registered = self
            .post(
                "/api/files/register",
                Some(token),
                serde_json::json!({
                    "bucketId": bucket_id,
                    "key": key,
                    "name": name,
                    "size": bytes.len(),
                }),
            )
            .await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);
        registered.body["file"].clone()
    }

    /// Let background notification tasks run.
    pub async fn settle(&self) {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
    }

    /// Token of the most recent magic-link email.
    pub async fn last_magic_token(&self) -> String {
        let sent = self.notifications.sent().await;
        let body = &sent.last().expect("no email sent").body;
        let start = body.find("token=").unwrap() + "token=".len();
        body[start..]
            .split_whitespace()
            .next()
            .unwrap()
            .to_string()
    }
}
