//! Musee server library logic.

pub mod api;
pub mod api_calques;
pub mod api_oeuvres;
pub mod api_parcours;
pub mod config;
pub mod form;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Extension, Json, Router,
};
use musee_db::DbPool;
use musee_media::MediaStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Media file store for target images, overlay images and audio.
    pub media: MediaStore,
}

/// Maximum body size for JSON endpoints (1 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Extra room on multipart bodies for boundaries and text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    // A create request may carry an image and an audio file.
    let upload_limit = state
        .media
        .settings()
        .max_upload_bytes
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let upload_routes = Router::new()
        .route(
            "/oeuvres",
            get(api_oeuvres::list_works_handler).post(api_oeuvres::create_work_handler),
        )
        .route(
            "/oeuvres/{id}/calques",
            get(api_calques::list_overlays_handler).post(api_calques::create_overlay_handler),
        )
        .route(
            "/calques/{id}/audio",
            put(api_calques::replace_overlay_audio_handler),
        )
        .layer(DefaultBodyLimit::max(upload_limit));

    let media_root = state.media.root().to_path_buf();
    tracing::info!(path = %media_root.display(), "serving media files at /media");

    Router::new()
        .route("/health", get(health))
        .route(
            "/oeuvres/{id}",
            get(api_oeuvres::get_work_handler).patch(api_oeuvres::update_work_handler),
        )
        .route(
            "/calques/{id}",
            get(api_calques::get_overlay_handler).patch(api_calques::update_overlay_handler),
        )
        .route(
            "/parcours",
            get(api_parcours::list_tours_handler).post(api_parcours::create_tour_handler),
        )
        .route("/parcours/{id}", get(api_parcours::get_tour_handler))
        .merge(upload_routes)
        .nest_service("/media", ServeDir::new(media_root))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
