//! Defines routes for the image upload and thumbnail pipeline.
//!
//! ## Structure
//! - `POST /images`             — upload an image (JSON body with base64 payload)
//! - `GET  /images/{*key}`      — download an original by its full storage key
//! - `GET  /thumbnails/{*key}`  — download the thumbnail derived from the
//!   original at `key` (the thumbnail's own key is never exposed)
//!
//! The wildcard `*key` matches the `{owner_id}/{image_id}.{ext}` shape.

use crate::{
    handlers::{
        download_handlers::{download_image, download_thumbnail},
        health_handlers::{healthz, readyz},
        upload_handlers::upload_image,
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all pipeline routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // upload + download endpoints
        .route("/images", post(upload_image))
        .route("/images/{*key}", get(download_image))
        .route("/thumbnails/{*key}", get(download_thumbnail))
}
