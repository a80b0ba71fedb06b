//! pixelstore — image upload and thumbnail generation service.
//!
//! Four handlers coordinated through an object store and a generation
//! queue: upload validates and stores an original and enqueues one
//! generation request; a background worker derives a bounded JPEG
//! thumbnail; two download handlers serve the original or the thumbnail
//! back by storage key.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
