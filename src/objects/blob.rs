//! The blob object (C4): a content-addressed snapshot of one file's bytes.

use crate::codec;
use crate::error::GitletError;
use crate::hash::{self, HashInput};
use crate::store::ObjectStore;
use std::fs;
use std::path::Path;

/// A snapshot of one file's byte content.
///
/// `raw` is the pre-compression `"blob <len>\0<content>"` framing; `uid` is
/// its SHA-1. `name` is the working-tree basename the blob was built from,
/// kept only for the caller's convenience (it is never hashed, and a blob
/// fetched back from the store always has `name = None`; callers that need
/// it re-attach it from the owning tree entry).
#[derive(Debug, Clone)]
pub struct Blob {
    raw: Vec<u8>,
    uid: String,
    name: Option<String>,
}

/// Equality of blobs is equality of `uid`, not of `name` (which a blob
/// read back from the store never carries).
impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for Blob {}

impl Blob {
    fn from_content(content: Vec<u8>, name: Option<String>) -> Self {
        let header = format!("blob {}\0", content.len());
        let mut raw = Vec::with_capacity(header.len() + content.len());
        raw.extend_from_slice(header.as_bytes());
        raw.extend_from_slice(&content);
        let uid = hash::hash([HashInput::Bytes(&raw)]);
        Blob { raw, uid, name }
    }

    /// Reads `path` fully and builds the canonical framed object for it.
    ///
    /// Fails with [`GitletError::NotReadable`] if `path` is missing, not a
    /// regular file, or unreadable.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GitletError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|_| GitletError::not_readable(path))?;
        if !metadata.is_file() {
            return Err(GitletError::not_readable(path));
        }
        let content = fs::read(path).map_err(|_| GitletError::not_readable(path))?;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Ok(Blob::from_content(content, name))
    }

    /// Same as [`Blob::from_file`] but returns only the identifier.
    pub fn compute_uid(path: impl AsRef<Path>) -> Result<String, GitletError> {
        Ok(Blob::from_file(path)?.uid)
    }

    /// The object identifier: `SHA1(raw)`.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The pre-compression framed bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The file content, with the `"blob <len>\0"` header stripped.
    pub fn content(&self) -> &[u8] {
        let nul = self.raw.iter().position(|&b| b == 0).expect("raw always has a header");
        &self.raw[nul + 1..]
    }

    /// The working-tree basename this blob was built from, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Compresses `raw` and writes it to `store` if absent.
    ///
    /// Re-persisting an already-stored blob is a no-op.
    pub fn persist(&self, store: &ObjectStore) -> Result<(), GitletError> {
        let compressed = codec::compress(&self.raw);
        store.write_if_absent(&self.uid, &compressed)
    }

    /// Fetches the compressed object for `uid` from `store`, decompresses
    /// it, and verifies its framing and hash.
    ///
    /// Fails with [`GitletError::NotFound`] if absent, or
    /// [`GitletError::Corrupt`] if the header is malformed, the declared
    /// length does not match the actual content length, or the recomputed
    /// hash does not match `uid`.
    pub fn read(store: &ObjectStore, uid: &str) -> Result<Self, GitletError> {
        let compressed = store.read(uid)?;
        let raw = codec::decompress(&compressed)
            .map_err(|_| GitletError::corrupt(uid, "stored object is not valid zlib data"))?;

        let nul = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| GitletError::corrupt(uid, "no NUL byte found in header"))?;
        let header = std::str::from_utf8(&raw[..nul])
            .map_err(|_| GitletError::corrupt(uid, "header is not valid UTF-8"))?;
        let declared_len: usize = header
            .strip_prefix("blob ")
            .and_then(|len| len.parse().ok())
            .ok_or_else(|| GitletError::corrupt(uid, format!("malformed header '{}'", header)))?;

        let content = &raw[nul + 1..];
        if content.len() != declared_len {
            return Err(GitletError::corrupt(
                uid,
                format!(
                    "header declares {} bytes but content is {} bytes",
                    declared_len,
                    content.len()
                ),
            ));
        }

        let recomputed = hash::hash([HashInput::Bytes(&raw)]);
        if recomputed != uid {
            return Err(GitletError::corrupt(
                uid,
                format!("recomputed hash {} does not match", recomputed),
            ));
        }

        Ok(Blob { raw, uid: recomputed, name: None })
    }
}
