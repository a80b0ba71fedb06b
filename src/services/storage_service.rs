//! ObjectStore — key-addressed blob storage backed by the local disk.
//!
//! Objects live beneath `base_path/{key}` for the primary area and
//! `base_path/thumbnail/{key}` for the thumbnail sub-area. Writes go
//! through a temp file and an atomic rename, so a key is either absent or
//! holds a complete payload; overwriting an existing key is last-write-wins
//! by design (re-uploading the same `(owner_id, image_id)` replaces the
//! original silently).

use crate::models::object::StoredObject;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

/// Storage areas. Originals and thumbnails never share a key space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Area {
    Primary,
    Thumbnail,
}

/// Directory name of the thumbnail sub-area beneath the storage root.
pub const THUMBNAIL_SUBDIR: &str = "thumbnail";

const MAX_OBJECT_KEY_LEN: usize = 2048;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object `{key}` not found")]
    ObjectNotFound { key: String },
    #[error("invalid object key")]
    InvalidObjectKey,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// ObjectStore provides the two operations the pipeline needs:
/// - Put an object (atomic write of the payload, returns metadata)
/// - Get an object (whole payload, or an open file for streaming out)
///
/// The surface is deliberately small: no listing, no deletion, no
/// versioning. Every invariant the handlers rely on (per-key atomicity,
/// strong read-after-write consistency) holds per key on a local
/// filesystem.
#[derive(Clone)]
pub struct ObjectStore {
    base_path: PathBuf,
}

impl ObjectStore {
    /// Create a store rooted at `base_path`. Directories are created
    /// lazily on first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Root directory of the store, exposed for readiness probes.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Basic key validation to avoid trivial path traversal vectors.
    ///
    /// Handlers pass keys that already went through `StorageKey`, but the
    /// store rechecks because keys double as relative paths on disk.
    fn ensure_key_safe(&self, key: &str) -> StorageResult<()> {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(StorageError::InvalidObjectKey);
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(StorageError::InvalidObjectKey);
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(StorageError::InvalidObjectKey);
        }
        Ok(())
    }

    fn area_root(&self, area: Area) -> PathBuf {
        match area {
            Area::Primary => self.base_path.clone(),
            Area::Thumbnail => self.base_path.join(THUMBNAIL_SUBDIR),
        }
    }

    fn object_path(&self, area: Area, key: &str) -> StorageResult<PathBuf> {
        self.ensure_key_safe(key)?;
        Ok(self.area_root(area).join(key))
    }

    /// Write an object's payload under `key` in the given area.
    ///
    /// - Writes to a temp file next to the final location.
    /// - Computes the MD5 etag while writing.
    /// - Atomically renames into place, replacing any previous payload.
    ///
    /// Ensures durable writes (fsync) and cleans up the temp file on error.
    pub async fn put(&self, area: Area, key: &str, bytes: &[u8]) -> StorageResult<StoredObject> {
        let file_path = self.object_path(area, key)?;
        let parent = file_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or(StorageError::InvalidObjectKey)?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;
        if let Err(err) = file.write_all(bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }
        drop(file);

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StorageError::Io(err));
            }
        }

        let etag = format!("{:x}", md5::compute(bytes));
        debug!(key, area = ?area, size_bytes = bytes.len(), %etag, "stored object");

        Ok(StoredObject {
            key: key.to_string(),
            size_bytes: bytes.len() as i64,
            etag: Some(etag),
            last_modified: Utc::now(),
        })
    }

    /// Read an object's full payload.
    pub async fn get(&self, area: Area, key: &str) -> StorageResult<Bytes> {
        let file_path = self.object_path(area, key)?;
        match fs::read(&file_path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::ObjectNotFound {
                key: key.to_string(),
            }),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    /// Fetch an object for reading.
    ///
    /// Returns metadata from the filesystem and an opened [`File`] handle
    /// ready for streaming out without buffering the payload in memory.
    pub async fn get_reader(&self, area: Area, key: &str) -> StorageResult<(StoredObject, File)> {
        let file_path = self.object_path(area, key)?;
        let file = File::open(&file_path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StorageError::ObjectNotFound {
                    key: key.to_string(),
                }
            } else {
                StorageError::Io(err)
            }
        })?;

        let meta = file.metadata().await?;
        // Opening a directory succeeds on some platforms; reads from it
        // would only fail mid-stream, so classify it as a fault up front.
        if meta.is_dir() {
            return Err(StorageError::Io(io::Error::new(
                ErrorKind::Other,
                "object path is a directory",
            )));
        }
        let last_modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok((
            StoredObject {
                key: key.to_string(),
                size_bytes: meta.len() as i64,
                etag: None,
                last_modified,
            },
            file,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (ObjectStore, TempDir) {
        let dir = TempDir::new().unwrap();
        (ObjectStore::new(dir.path()), dir)
    }

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let (store, _dir) = store();
        let written = store.put(Area::Primary, "u1/img1.png", b"payload").await.unwrap();
        assert_eq!(written.key, "u1/img1.png");
        assert_eq!(written.size_bytes, 7);
        assert!(written.etag.is_some());

        let bytes = store.get(Area::Primary, "u1/img1.png").await.unwrap();
        assert_eq!(&bytes[..], b"payload");
    }

    #[tokio::test]
    async fn overwrite_is_last_write_wins() {
        let (store, _dir) = store();
        store.put(Area::Primary, "u1/img1.png", b"first").await.unwrap();
        store.put(Area::Primary, "u1/img1.png", b"second").await.unwrap();
        let bytes = store.get(Area::Primary, "u1/img1.png").await.unwrap();
        assert_eq!(&bytes[..], b"second");
    }

    #[tokio::test]
    async fn areas_do_not_share_keys() {
        let (store, dir) = store();
        store
            .put(Area::Thumbnail, "thumbnail_u1/img1.png", b"thumb")
            .await
            .unwrap();
        assert!(matches!(
            store.get(Area::Primary, "thumbnail_u1/img1.png").await,
            Err(StorageError::ObjectNotFound { .. })
        ));
        assert!(
            dir.path()
                .join(THUMBNAIL_SUBDIR)
                .join("thumbnail_u1/img1.png")
                .is_file()
        );
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let (store, _dir) = store();
        match store.get(Area::Primary, "u1/absent.png").await {
            Err(StorageError::ObjectNotFound { key }) => assert_eq!(key, "u1/absent.png"),
            other => panic!("expected ObjectNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsafe_keys_are_rejected() {
        let (store, _dir) = store();
        for key in ["", "/abs.png", "a/../../etc/passwd", "a\\b.png"] {
            assert!(matches!(
                store.put(Area::Primary, key, b"x").await,
                Err(StorageError::InvalidObjectKey)
            ));
        }
    }

    #[tokio::test]
    async fn get_reader_classifies_directories_as_faults() {
        let (store, dir) = store();
        std::fs::create_dir_all(dir.path().join("u1/pic.png")).unwrap();
        assert!(matches!(
            store.get_reader(Area::Primary, "u1/pic.png").await,
            Err(StorageError::Io(_))
        ));
    }

    #[tokio::test]
    async fn get_reader_reports_size() {
        let (store, _dir) = store();
        store.put(Area::Primary, "u1/img1.jpeg", b"0123456789").await.unwrap();
        let (meta, _file) = store.get_reader(Area::Primary, "u1/img1.jpeg").await.unwrap();
        assert_eq!(meta.size_bytes, 10);
        assert!(meta.etag.is_none());
    }
}
