//! Injected service dependencies: the disk-backed object store and the
//! thumbnail generation queue. Handlers receive both through axum state;
//! nothing here is a module-level singleton.

pub mod queue_service;
pub mod storage_service;
pub mod thumbnail_service;
