//! Metadata describing an object held in a storage area.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata returned by storage reads and writes.
///
/// The payload bytes themselves are opaque and handled separately; this
/// struct carries only what the handlers need for response headers and
/// logging.
#[derive(Serialize, Clone, Debug)]
pub struct StoredObject {
    /// Storage key the object was written under (path-like, area-relative).
    pub key: String,

    /// Payload size in bytes.
    pub size_bytes: i64,

    /// MD5 checksum, computed on write. Reads that stream from disk leave
    /// this unset rather than re-hashing the payload.
    pub etag: Option<String>,

    /// Timestamp of the last write.
    pub last_modified: DateTime<Utc>,
}
