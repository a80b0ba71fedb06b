//! Upload handler.
//!
//! Validates the payload as a PNG or JPEG image, writes the original to the
//! primary storage area under its derived key, and enqueues one generation
//! request. Rejected payloads produce no side effect at all.

use crate::{
    errors::AppError,
    models::{image::decode_image, key::StorageKey},
    services::storage_service::Area,
    state::AppState,
};
use axum::{Json, extract::State, response::IntoResponse};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

/// Request body for `POST /images`. `image_data` is base64-encoded.
#[derive(Debug, Deserialize)]
pub struct UploadImageRequest {
    pub owner_id: String,
    pub image_id: String,
    pub image_data: String,
}

#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub message: String,
    /// Full storage key, extension included; required for later downloads.
    pub key: String,
}

/// `POST /images` — validate, store the original, enqueue generation.
pub async fn upload_image(
    State(state): State<AppState>,
    Json(req): Json<UploadImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = general_purpose::STANDARD
        .decode(&req.image_data)
        .map_err(|_| AppError::bad_request("image_data is not valid base64"))?;

    // Decode fully before touching storage; an invalid or disallowed
    // payload must leave no trace in the store or the queue.
    let (format, _pixels) = decode_image(&bytes)?;
    let key = StorageKey::new(&req.owner_id, &req.image_id, format)?;

    let stored = state
        .store
        .put(Area::Primary, &key.to_string(), &bytes)
        .await?;
    tracing::debug!(key = %stored.key, etag = ?stored.etag, "original image stored");

    // The original is already durable at this point. There is no rollback
    // and no internal retry if the enqueue fails; the caller gets a server
    // fault and may re-upload (the overwrite is harmless).
    if let Err(err) = state.queue.send(&stored.key) {
        tracing::error!(
            key = %stored.key,
            error = %err,
            "original stored but generation request could not be queued"
        );
        return Err(AppError::internal(
            "image stored but thumbnail generation could not be scheduled",
        ));
    }

    Ok(Json(UploadImageResponse {
        message: "Image uploaded successfully".into(),
        key: stored.key,
    }))
}
