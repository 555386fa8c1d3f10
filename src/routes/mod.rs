//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the portal's JSON API under `/api` and serves the
//! static frontend bundle as a fallback. Every data route requires a portal
//! session; admin routes additionally require the admin role.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod portal;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::state::AppState;

fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/portal", get(portal::portal_view))
        .route(
            "/api/profile",
            get(dashboard::get_profile).put(dashboard::update_profile),
        )
        .route(
            "/api/projects",
            get(dashboard::list_projects).post(dashboard::create_project),
        )
        .route(
            "/api/projects/{id}",
            axum::routing::patch(dashboard::update_project).delete(dashboard::delete_project),
        )
        .route("/api/projects/{id}/status", post(dashboard::toggle_status))
        .route("/api/admin", get(admin::admin_data))
        .route("/api/admin/projects", post(admin::create_project))
        .route("/api/admin/seed", post(admin::seed_demo_data))
        .route("/api/admin/invoices", post(admin::upload_invoice))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// Resolve the directory holding the frontend bundle.
fn static_dir() -> PathBuf {
    std::env::var("PORTAL_STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"))
}

/// The full application: API routes plus the static frontend fallback.
pub fn app(state: AppState) -> Router {
    let static_service = ServeDir::new(static_dir()).append_index_html_on_directories(true);
    api_routes(state).fallback_service(static_service)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
