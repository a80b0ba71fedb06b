//! Shared application state handed to every handler.
//!
//! The store and the queue are constructed once at startup and injected
//! through axum state, so tests can substitute a temp-dir store and a held
//! queue receiver.

use crate::services::{queue_service::GenerationQueue, storage_service::ObjectStore};

#[derive(Clone)]
pub struct AppState {
    pub store: ObjectStore,
    pub queue: GenerationQueue,
}
