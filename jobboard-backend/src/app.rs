use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::handlers::{auth, jobs};
use crate::state::AppState;

// Request bodies are small JSON documents; 1 MB is generous.
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Build the primary axum router with the provided shared application state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/auth/signup", post(auth::signup::signup))
        .route("/auth/login", post(auth::login::login))
        .route("/auth/logout", post(auth::logout::logout))
        .route("/auth/me", get(auth::me::me))
        .route(
            "/auth/forgot-password",
            post(auth::forgot_password::forgot_password),
        )
        .route(
            "/auth/reset-password",
            post(auth::reset_password::reset_password),
        )
        .route(
            "/auth/update-password",
            post(auth::update_password::update_password),
        )
        .route("/jobs", get(jobs::list::list).post(jobs::create::create))
        .route("/jobs/locations", get(jobs::locations::locations))
        .route(
            "/jobs/{jobId}",
            get(jobs::get::get_job)
                .put(jobs::update::update)
                .delete(jobs::delete::delete_job),
        )
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(Extension(state));

    // Serve static frontend assets for everything outside /api.
    let static_service = ServeDir::new("static")
        .fallback(ServeDir::new("static").append_index_html_on_directories(true));

    Router::new()
        .nest("/api", api)
        .fallback_service(static_service)
}

async fn health_handler() -> impl IntoResponse {
    // Liveness: always return 200 OK when process is alive.
    (axum::http::StatusCode::OK, "OK")
}

async fn ready_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    // Readiness: a pooled connection must be obtainable.
    match state.db_pool.acquire().await {
        Ok(_) => (axum::http::StatusCode::OK, "OK"),
        Err(_) => (axum::http::StatusCode::SERVICE_UNAVAILABLE, "database unavailable"),
    }
}
