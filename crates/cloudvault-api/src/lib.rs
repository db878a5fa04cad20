//! # cloudvault-api
//!
//! HTTP API layer for CloudVault built on Axum.
//!
//! Authenticated endpoints live under `/api` and take an identity-provider
//! bearer token. The public share endpoints under `/shares` are reached by
//! external recipients and authenticate with a share-session token instead.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::{ApiError, ShareError};
pub use router::build_router;
pub use state::{AppState, Backends};
