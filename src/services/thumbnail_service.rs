//! Thumbnail generation: the queue consumer and the derivation itself.
//!
//! Each queue message carries the storage key of an original. The worker
//! reads the original from the primary area, resizes it to fit within
//! [`THUMBNAIL_MAX_DIM`] on both sides (aspect ratio preserved, never
//! cropped), re-encodes as JPEG, and writes the result under
//! `thumbnail_{key}` in the thumbnail area. Re-running a message overwrites
//! the same key with equivalent content, so at-least-once delivery is safe.

use crate::{
    models::{
        image::{ImageError, decode_image},
        key::{KeyError, StorageKey},
        object::StoredObject,
    },
    services::storage_service::{Area, ObjectStore, StorageError},
};
use std::io::Cursor;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Neither thumbnail dimension exceeds this bound.
pub const THUMBNAIL_MAX_DIM: u32 = 100;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// The original named by the message does not exist. Unrecoverable for
    /// this message; redelivery policy belongs to the queue, not to us.
    #[error("source object `{0}` is missing")]
    SourceMissing(String),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("encoding thumbnail: {0}")]
    Encode(#[source] image::ImageError),
}

/// Derive and store the thumbnail for the original at `raw_key`.
pub async fn generate_thumbnail(
    store: &ObjectStore,
    raw_key: &str,
) -> Result<StoredObject, ThumbnailError> {
    let key = StorageKey::parse(raw_key)?;

    let bytes = store
        .get(Area::Primary, raw_key)
        .await
        .map_err(|err| match err {
            StorageError::ObjectNotFound { key } => ThumbnailError::SourceMissing(key),
            other => ThumbnailError::Storage(other),
        })?;

    let (_, pixels) = decode_image(&bytes)?;
    let thumb = pixels.thumbnail(THUMBNAIL_MAX_DIM, THUMBNAIL_MAX_DIM);

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = thumb.to_rgb8();
    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, image::ImageFormat::Jpeg)
        .map_err(ThumbnailError::Encode)?;

    let stored = store
        .put(Area::Thumbnail, &key.thumbnail_key(), out.get_ref())
        .await?;
    Ok(stored)
}

/// Background consumer of the generation queue.
///
/// Runs until the sending half is dropped. A failed message is logged and
/// dropped; it never stops the loop or affects other messages.
pub struct ThumbnailWorker {
    store: ObjectStore,
    rx: mpsc::UnboundedReceiver<String>,
}

impl ThumbnailWorker {
    pub fn new(store: ObjectStore, rx: mpsc::UnboundedReceiver<String>) -> Self {
        Self { store, rx }
    }

    pub async fn run(mut self) {
        info!("thumbnail worker started");
        while let Some(key) = self.rx.recv().await {
            match generate_thumbnail(&self.store, &key).await {
                Ok(thumb) => info!(
                    key = %key,
                    thumbnail = %thumb.key,
                    size_bytes = thumb.size_bytes,
                    "thumbnail generated"
                ),
                Err(err) => error!(key = %key, error = %err, "thumbnail generation failed"),
            }
        }
        info!("generation queue closed, thumbnail worker stopping");
    }
}
