//! HTTP implementations of the transfer seams.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_core::result::AppResult;
use cloudvault_entity::file::FileObject;
use cloudvault_entity::wire::{
    AbortMultipartRequest, AbortMultipartResponse, CompleteMultipartRequest, FileResponse,
    InitiateMultipartRequest, InitiateMultipartResponse, PresignRequest, PresignResponse,
    RegisterFileRequest, SignPartRequest, SignPartResponse,
};

use crate::gateway::{PartTransport, TransferGateway};

/// Talks to the CloudVault API with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpTransferGateway {
    client: Client,
    base_url: String,
}

impl HttpTransferGateway {
    /// Build a client for `base_url` authenticating as `token`.
    pub fn new(base_url: impl Into<String>, token: &str) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| AppError::validation("Token contains invalid header characters"))?;
        bearer.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;
        let response = check_status(response).await?;
        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Unexpected response body from {path}"),
                e,
            )
        })
    }
}

#[async_trait]
impl TransferGateway for HttpTransferGateway {
    async fn presign(&self, request: PresignRequest) -> AppResult<PresignResponse> {
        self.post("/api/presign", &request).await
    }

    async fn register(&self, request: RegisterFileRequest) -> AppResult<FileObject> {
        let response: FileResponse = self.post("/api/files/register", &request).await?;
        Ok(response.file)
    }

    async fn initiate(
        &self,
        request: InitiateMultipartRequest,
    ) -> AppResult<InitiateMultipartResponse> {
        self.post("/api/multipart/initiate", &request).await
    }

    async fn sign_part(&self, request: SignPartRequest) -> AppResult<SignPartResponse> {
        self.post("/api/multipart/sign-part", &request).await
    }

    async fn complete(&self, request: CompleteMultipartRequest) -> AppResult<FileObject> {
        let response: FileResponse = self.post("/api/multipart/complete", &request).await?;
        Ok(response.file)
    }

    async fn abort(&self, request: AbortMultipartRequest) -> AppResult<()> {
        let _: AbortMultipartResponse = self.post("/api/multipart/abort", &request).await?;
        Ok(())
    }
}

/// Plain HTTP PUT/GET against signed URLs; carries no credentials.
#[derive(Debug, Clone, Default)]
pub struct HttpPartTransport {
    client: Client,
}

impl HttpPartTransport {
    /// Create a transport with a fresh connection pool.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PartTransport for HttpPartTransport {
    async fn put(
        &self,
        url: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> AppResult<Option<String>> {
        let mut request = self.client.put(url).body(body);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let response = request.send().await.map_err(|e| network_error(url, e))?;
        let response = check_status(response).await?;
        Ok(response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string))
    }

    async fn get(&self, url: &str) -> AppResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;
        let response = check_status(response).await?;
        response.bytes().await.map_err(|e| network_error(url, e))
    }
}

fn network_error(url: &str, err: reqwest::Error) -> AppError {
    // Signed URLs carry credentials in the query string.
    let target = url.split('?').next().unwrap_or(url);
    AppError::with_source(ErrorKind::Transfer, format!("Request to {target} failed"), err)
}

async fn check_status(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {status}: {body}"));
    Err(AppError::new(kind_for_status(status), message))
}

fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::UNAUTHORIZED => ErrorKind::Authentication,
        StatusCode::FORBIDDEN => ErrorKind::Authorization,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
        StatusCode::CONFLICT => ErrorKind::Conflict,
        StatusCode::GONE => ErrorKind::Expired,
        s if s.is_server_error() => ErrorKind::ExternalService,
        _ => ErrorKind::Transfer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(kind_for_status(StatusCode::FORBIDDEN), ErrorKind::Authorization);
        assert_eq!(kind_for_status(StatusCode::BAD_GATEWAY), ErrorKind::ExternalService);
        assert_eq!(kind_for_status(StatusCode::IM_A_TEAPOT), ErrorKind::Transfer);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let gateway = HttpTransferGateway::new("http://localhost:8080/", "t").unwrap();
        assert_eq!(gateway.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_token_with_newline_rejected() {
        assert!(HttpTransferGateway::new("http://x", "bad\ntoken").is_err());
    }
}
