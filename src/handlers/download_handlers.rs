//! Download handlers for originals and thumbnails.
//!
//! Both take a full original storage key in the path. Payloads stream from
//! disk; an absent key is a client error naming the key, anything else is a
//! distinct server fault.

use crate::{
    errors::AppError,
    models::{key::StorageKey, object::StoredObject},
    services::storage_service::{Area, StorageError},
    state::AppState,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use tokio_util::io::ReaderStream;

/// `GET /images/{*key}` — download the original's raw bytes.
///
/// Content type is derived from the key's extension (`image/{ext}`).
pub async fn download_image(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let parsed = StorageKey::parse(&key)?;
    let (meta, file) = state.store.get_reader(Area::Primary, &key).await?;

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    *response.status_mut() = StatusCode::OK;
    set_image_headers(response.headers_mut(), parsed.content_type(), &meta);
    Ok(response)
}

/// `GET /thumbnails/{*key}` — download the thumbnail derived from the
/// original at `key`.
///
/// The thumbnail key is derived here; callers never address thumbnails
/// directly. Absent means generation has not run yet, or the original never
/// existed — both are the same client error. Thumbnails are always JPEG.
pub async fn download_thumbnail(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let parsed = StorageKey::parse(&key)?;
    let (meta, file) = state
        .store
        .get_reader(Area::Thumbnail, &parsed.thumbnail_key())
        .await
        .map_err(|err| match err {
            // Report the key the caller supplied, not the derived one the
            // client never sees.
            StorageError::ObjectNotFound { .. } => AppError::bad_request(format!(
                "Invalid key `{key}` provided, key doesn't exist"
            )),
            other => AppError::from(other),
        })?;

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    *response.status_mut() = StatusCode::OK;
    set_image_headers(response.headers_mut(), "image/jpeg", &meta);
    Ok(response)
}

fn set_image_headers(headers: &mut HeaderMap, content_type: &'static str, meta: &StoredObject) {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));

    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&meta.size_bytes.max(0).to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );

    if let Ok(value) = HeaderValue::from_str(&meta.last_modified.to_rfc2822()) {
        headers.insert(header::LAST_MODIFIED, value);
    }
}
