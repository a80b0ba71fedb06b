//! Core data models for the image upload and thumbnail service.
//!
//! These value types enforce the invariants the handlers rely on: image
//! formats are detected from content rather than filename, storage keys
//! always have the `{owner_id}/{image_id}.{ext}` shape, and stored-object
//! metadata serializes naturally as JSON via `serde`.

pub mod image;
pub mod key;
pub mod object;
