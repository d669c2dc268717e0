//! Content-addressed object store (C3).
//!
//! Maps a 40-hex identifier to a path in the two-level sharded layout Git
//! uses (`objects/<uid[0:2]>/<uid[2:]>`) and writes objects atomically so a
//! reader can never observe a half-written file.

use crate::error::GitletError;
use log::debug;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A loose-object store rooted at a single `objects/` directory.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    objects_dir: PathBuf,
}

impl ObjectStore {
    /// Creates a store rooted at `objects_dir`. Does not touch the
    /// filesystem.
    pub fn new(objects_dir: impl Into<PathBuf>) -> Self {
        ObjectStore {
            objects_dir: objects_dir.into(),
        }
    }

    /// Computes the on-disk path for `uid` without touching the
    /// filesystem.
    pub fn path_for(&self, uid: &str) -> PathBuf {
        self.objects_dir.join(&uid[0..2]).join(&uid[2..])
    }

    /// Returns `true` if an object for `uid` is already present.
    pub fn contains(&self, uid: &str) -> bool {
        self.path_for(uid).exists()
    }

    /// Writes `bytes` under `uid` if no object is present yet; a no-op
    /// otherwise.
    ///
    /// The write goes to a sibling temporary file that is then renamed into
    /// place, so a concurrent reader never observes a partial object. If
    /// the filesystem rejects the atomic rename (e.g. a non-POSIX target),
    /// falls back to a plain, non-atomic rename.
    pub fn write_if_absent(&self, uid: &str, bytes: &[u8]) -> Result<(), GitletError> {
        let path = self.path_for(uid);
        if path.exists() {
            debug!("object {} already present, skipping write", uid);
            return Ok(());
        }

        let dir = path.parent().expect("object path always has a shard directory");
        fs::create_dir_all(dir)?;

        let tmp_path = dir.join(format!(".{}.tmp", &uid[2..]));
        {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(bytes)?;
            tmp_file.sync_all()?;
        }

        match fs::rename(&tmp_path, &path) {
            Ok(()) => {}
            Err(_) => {
                debug!("atomic rename unavailable for {}, falling back", uid);
                fs::rename(&tmp_path, &path)?;
            }
        }

        Ok(())
    }

    /// Reads the raw (still compressed) bytes stored under `uid`.
    ///
    /// Fails with [`GitletError::NotFound`] if no object is present.
    pub fn read(&self, uid: &str) -> Result<Vec<u8>, GitletError> {
        let path = self.path_for(uid);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(GitletError::not_found(uid))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The `objects/` directory this store is rooted at.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }
}
