//! Storage keys.
//!
//! A [`StorageKey`] is the sole identifier of an uploaded image:
//! `{owner_id}/{image_id}.{ext}` with a lowercase extension taken from the
//! detected format. The key doubles as the object's path inside a storage
//! area, so the constructor enforces the shape instead of letting handlers
//! concatenate strings ad hoc. Thumbnail keys are always derived from the
//! original's key by prefixing; a thumbnail has no identifier of its own.

use crate::models::image::ImageFormat;
use std::fmt;
use thiserror::Error;

const MAX_KEY_LEN: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid storage key: {0}")]
pub struct KeyError(pub &'static str);

/// Validated `{owner_id}/{image_id}.{ext}` identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKey {
    owner_id: String,
    image_id: String,
    format: ImageFormat,
}

impl StorageKey {
    /// Build a key from its parts, validating each segment.
    pub fn new(
        owner_id: impl Into<String>,
        image_id: impl Into<String>,
        format: ImageFormat,
    ) -> Result<Self, KeyError> {
        let owner_id = owner_id.into();
        let image_id = image_id.into();
        validate_segment(&owner_id)?;
        validate_segment(&image_id)?;

        let key = Self {
            owner_id,
            image_id,
            format,
        };
        if key.to_string().len() > MAX_KEY_LEN {
            return Err(KeyError("exceeds maximum length"));
        }
        Ok(key)
    }

    /// Parse a full key string, enforcing the `{owner}/{id}.{ext}` shape.
    ///
    /// Callers of the download endpoints must know the key in full,
    /// extension included; anything else is a client error.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if raw.len() > MAX_KEY_LEN {
            return Err(KeyError("exceeds maximum length"));
        }
        let (path, ext) = raw
            .rsplit_once('.')
            .ok_or(KeyError("missing extension"))?;
        let format = ImageFormat::from_extension(ext).ok_or(KeyError("unknown extension"))?;
        let (owner_id, image_id) = path
            .split_once('/')
            .ok_or(KeyError("missing `/` separator"))?;
        Self::new(owner_id, image_id, format)
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// MIME type of the original object, `image/{extension}`.
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// Key of the derived thumbnail inside the thumbnail area.
    pub fn thumbnail_key(&self) -> String {
        format!("thumbnail_{self}")
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}.{}",
            self.owner_id,
            self.image_id,
            self.format.extension()
        )
    }
}

/// A segment may not be empty, contain a path separator, `..`, or
/// control characters. Keys are paths on disk; this closes the trivial
/// traversal vectors.
fn validate_segment(segment: &str) -> Result<(), KeyError> {
    if segment.is_empty() {
        return Err(KeyError("empty segment"));
    }
    if segment.contains('/') || segment.contains('\\') {
        return Err(KeyError("segment contains a path separator"));
    }
    if segment.contains("..") {
        return Err(KeyError("segment contains `..`"));
    }
    if segment.bytes().any(|b| b.is_ascii_control()) {
        return Err(KeyError("segment contains control characters"));
    }
    Ok(())
}
