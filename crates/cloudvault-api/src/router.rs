//! Route definitions for the CloudVault HTTP API.
//!
//! Authenticated routes are mounted under `/api`; public share routes under
//! `/shares`; `/health` sits at the root.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::{Router, middleware as axum_middleware};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = middleware::build_cors_layer(&state.config.server);

    let api_routes = Router::new()
        .merge(transfer_routes())
        .merge(bucket_routes())
        .merge(share_routes())
        .merge(admin_routes());

    Router::new()
        .nest("/api", api_routes)
        .merge(public_share_routes())
        .route("/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::request_logging))
        .with_state(state)
}

/// Presign, registration, and multipart
fn transfer_routes() -> Router<AppState> {
    Router::new()
        .route("/presign", post(handlers::presign::presign))
        .route("/files/register", post(handlers::presign::register))
        .route("/files/{id}", delete(handlers::file::delete_file))
        .route("/multipart/initiate", post(handlers::multipart::initiate))
        .route("/multipart/sign-part", post(handlers::multipart::sign_part))
        .route("/multipart/complete", post(handlers::multipart::complete))
        .route("/multipart/abort", post(handlers::multipart::abort))
}

/// Buckets and listings
fn bucket_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/buckets",
            get(handlers::bucket::list_buckets).post(handlers::bucket::create_bucket),
        )
        .route("/buckets/{id}/objects", get(handlers::bucket::list_objects))
}

/// Share management for creators
fn share_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shares",
            get(handlers::share::list_shares).post(handlers::share::create_share),
        )
        .route("/shares/{id}", delete(handlers::share::revoke_share))
}

/// Policies and teams
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/policies", post(handlers::admin::grant_policy))
        .route("/policies/{id}", delete(handlers::admin::delete_policy))
        .route("/teams", post(handlers::admin::create_team))
        .route("/teams/{id}/members", post(handlers::admin::add_member))
        .route(
            "/teams/{id}/members/{user_id}",
            put(handlers::admin::set_membership),
        )
}

/// Public share access
fn public_share_routes() -> Router<AppState> {
    Router::new()
        .route("/shares/verify", get(handlers::public_share::verify))
        .route("/shares/{id}", get(handlers::public_share::view_share))
        .route("/shares/{id}/auth", post(handlers::public_share::authenticate))
        .route("/shares/{id}/download", get(handlers::public_share::download))
}
