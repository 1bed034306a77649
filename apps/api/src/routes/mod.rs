pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::preview::handlers as preview;
use crate::programme::handlers as programme;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);
    let public = ServeDir::new(&state.config.public_dir);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Programme generation
        .route("/generate", post(programme::handle_generate))
        // Page-fit preview
        .route("/api/preview/check", post(preview::handle_preview_check))
        .route("/api/preview/dimensions", get(preview::handle_dimensions))
        .nest_service("/uploads", uploads)
        .fallback_service(public)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
