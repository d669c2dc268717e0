//! The staging index (C5): the three-way `tracked` / `added` / `removed`
//! view of what the next commit would snapshot.
//!
//! Entries are keyed by canonicalized absolute path strings so the same
//! file is recognized regardless of how it was addressed on the command
//! line. The on-disk form is the versioned binary layout described in the
//! design notes (magic `GLDX`); a corrupt or unreadable index is never
//! fatal, callers fall back to an empty index and keep going.

use crate::error::GitletError;
use crate::objects::blob::Blob;
use crate::store::ObjectStore;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"GLDX";
const VERSION: u32 = 1;

/// The staged snapshot of the working tree relative to `HEAD`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    tracked: HashMap<String, String>,
    added: HashMap<String, String>,
    removed: HashSet<String>,
}

impl Index {
    /// An index with nothing tracked and nothing staged.
    pub fn new() -> Self {
        Index {
            tracked: HashMap::new(),
            added: HashMap::new(),
            removed: HashSet::new(),
        }
    }

    /// The `HEAD` snapshot this index was last synchronized to.
    pub fn tracked(&self) -> &HashMap<String, String> {
        &self.tracked
    }

    /// Files staged for addition or update, not yet committed.
    pub fn added(&self) -> &HashMap<String, String> {
        &self.added
    }

    /// Canonicalized paths staged for removal at the next commit.
    pub fn removed(&self) -> &HashSet<String> {
        &self.removed
    }

    /// Stages `path`: if its current content already matches what `HEAD`
    /// tracks, removes any stale staging entry for it without writing a
    /// blob; otherwise hashes and persists the content and records it in
    /// `added`.
    ///
    /// Staging a file always cancels a pending removal of the same path.
    ///
    /// Fails with [`GitletError::NotReadable`] if `path` is missing, not a
    /// regular file, or unreadable.
    pub fn add(&mut self, path: impl AsRef<Path>, store: &ObjectStore) -> Result<(), GitletError> {
        let path = path.as_ref();
        let key = canonical_key(path)?;
        self.removed.remove(&key);

        let current_uid = Blob::compute_uid(path)?;
        if self.tracked.get(&key) == Some(&current_uid) {
            self.added.remove(&key);
        } else {
            let blob = Blob::from_file(path)?;
            blob.persist(store)?;
            self.added.insert(key, blob.uid().to_string());
        }
        Ok(())
    }

    /// Unstages or stages-for-deletion `path`, which must resolve inside
    /// `repo_root`.
    ///
    /// If `path` is a directory, every tracked or staged entry whose
    /// resolved path falls under it is removed, and the whole subtree is
    /// deleted from disk in one recursive operation (unless `cached`).
    ///
    /// `cached` leaves the working-tree file alone and only updates the
    /// index; otherwise the target is deleted from disk once staging
    /// succeeds. Without `force`, removing a file that is tracked, still
    /// present on disk, and whose content no longer matches `HEAD` fails
    /// with [`GitletError::HasLocalModifications`] rather than silently
    /// discarding the change.
    ///
    /// Fails with [`GitletError::PathspecNoMatch`] if `path` (or, for a
    /// directory, everything under it) is neither tracked nor staged, or
    /// if it resolves outside `repo_root`.
    pub fn remove(
        &mut self,
        path: impl AsRef<Path>,
        repo_root: impl AsRef<Path>,
        cached: bool,
        force: bool,
    ) -> Result<(), GitletError> {
        let path = path.as_ref();
        let repo_root = repo_root.as_ref();

        let resolved = resolve_path(path)?;
        let canonical_root = fs::canonicalize(repo_root)?;
        if !resolved.starts_with(&canonical_root) {
            return Err(GitletError::pathspec_no_match(basename(path)));
        }

        if path.is_dir() {
            return self.remove_dir(path, &resolved, cached, force);
        }

        let key = resolved.to_string_lossy().into_owned();
        let tracked_uid = self.tracked.get(&key).cloned();
        let is_staged = self.added.contains_key(&key);

        if tracked_uid.is_none() && !is_staged {
            return Err(GitletError::pathspec_no_match(basename(path)));
        }

        if !force {
            if let Some(uid) = &tracked_uid {
                if path.is_file() {
                    let current = Blob::compute_uid(path)?;
                    if &current != uid {
                        return Err(GitletError::has_local_modifications(basename(path)));
                    }
                }
            }
        }

        self.added.remove(&key);
        if tracked_uid.is_some() {
            self.removed.insert(key);
        }

        if !cached && path.exists() {
            fs::remove_file(path)?;
            log::debug!("deleted working file {}", path.display());
        }

        Ok(())
    }

    /// The directory branch of [`Index::remove`]: every tracked or staged
    /// entry under `resolved_dir` is unstaged/marked-removed, then the
    /// directory is deleted in one recursive operation.
    fn remove_dir(
        &mut self,
        path: &Path,
        resolved_dir: &Path,
        cached: bool,
        force: bool,
    ) -> Result<(), GitletError> {
        let mut matches: HashSet<String> = HashSet::new();
        for key in self.tracked.keys().chain(self.added.keys()) {
            if Path::new(key).starts_with(resolved_dir) {
                matches.insert(key.clone());
            }
        }

        if matches.is_empty() {
            return Err(GitletError::pathspec_no_match(basename(path)));
        }

        if !force {
            for key in &matches {
                if let Some(uid) = self.tracked.get(key) {
                    let entry_path = Path::new(key);
                    if entry_path.is_file() {
                        let current = Blob::compute_uid(entry_path)?;
                        if &current != uid {
                            return Err(GitletError::has_local_modifications(basename(entry_path)));
                        }
                    }
                }
            }
        }

        for key in &matches {
            let was_tracked = self.tracked.contains_key(key);
            self.added.remove(key);
            if was_tracked {
                self.removed.insert(key.clone());
            }
        }

        if !cached && path.exists() {
            fs::remove_dir_all(path)?;
            log::debug!("deleted working directory {}", path.display());
        }

        Ok(())
    }

    /// Clears all staged changes, leaving `tracked` untouched.
    pub fn clean_stage_area(&mut self) {
        self.added.clear();
        self.removed.clear();
    }

    /// Replaces `tracked` with `new_tracked` (the snapshot a completed
    /// commit now represents) and clears the stage area.
    pub fn apply_head_snapshot(&mut self, new_tracked: HashMap<String, String>) {
        self.tracked = new_tracked;
        self.clean_stage_area();
    }

    /// Reads the index at `index_path`, or returns an empty index if the
    /// file is absent, truncated, or otherwise malformed.
    ///
    /// A malformed index is logged at `warn` and never propagated as an
    /// error: losing the stage area is recoverable, refusing to start
    /// is not.
    pub fn load_or_create(index_path: impl AsRef<Path>) -> Self {
        let index_path = index_path.as_ref();
        match fs::read(index_path) {
            Ok(bytes) => match Self::deserialize(&bytes) {
                Ok(index) => index,
                Err(e) => {
                    log::warn!(
                        "index at {} is corrupt ({}), starting with an empty index",
                        index_path.display(),
                        e
                    );
                    Index::new()
                }
            },
            Err(_) => Index::new(),
        }
    }

    /// Writes the index to `index_path` atomically (temp file + rename).
    pub fn save(&self, index_path: impl AsRef<Path>) -> Result<(), GitletError> {
        let index_path = index_path.as_ref();
        if let Some(parent) = index_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = index_path.with_extension("tmp");
        fs::write(&tmp_path, self.serialize())?;
        fs::rename(&tmp_path, index_path)?;
        Ok(())
    }

    fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&VERSION.to_be_bytes());
        write_hash_section(&mut buf, &self.tracked);
        write_hash_section(&mut buf, &self.added);
        write_path_section(&mut buf, &self.removed);
        buf
    }

    fn deserialize(bytes: &[u8]) -> Result<Self, GitletError> {
        let mut r = Reader::new(bytes);
        let magic = r.take(4)?;
        if magic != MAGIC.as_slice() {
            return Err(GitletError::format("not a gitlet index (bad magic)"));
        }
        let version = r.take_u32()?;
        if version != VERSION {
            return Err(GitletError::format(format!(
                "unsupported index version {}",
                version
            )));
        }
        let tracked = r.read_hash_section()?;
        let added = r.read_hash_section()?;
        let removed = r.read_path_section()?;
        Ok(Index {
            tracked,
            added,
            removed,
        })
    }
}

fn write_path(buf: &mut Vec<u8>, path: &str) {
    let bytes = path.as_bytes();
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

fn write_hash_section(buf: &mut Vec<u8>, section: &HashMap<String, String>) {
    buf.extend_from_slice(&(section.len() as u32).to_be_bytes());
    for (path, uid) in section {
        write_path(buf, path);
        let raw = hex::decode(uid).expect("uid is always 40 hex characters");
        buf.extend_from_slice(&raw);
    }
}

fn write_path_section(buf: &mut Vec<u8>, section: &HashSet<String>) {
    buf.extend_from_slice(&(section.len() as u32).to_be_bytes());
    for path in section {
        write_path(buf, path);
    }
}

/// A cursor over a byte slice that fails with [`GitletError::Format`]
/// instead of panicking on truncated input.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], GitletError> {
        let end = self.pos + len;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| GitletError::format("unexpected end of index data"))?;
        self.pos = end;
        Ok(slice)
    }

    fn take_u32(&mut self) -> Result<u32, GitletError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().expect("take(4) yields 4 bytes")))
    }

    fn read_path(&mut self) -> Result<String, GitletError> {
        let len = self.take_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| GitletError::format("path is not valid UTF-8"))
    }

    fn read_hash_section(&mut self) -> Result<HashMap<String, String>, GitletError> {
        let count = self.take_u32()?;
        let mut map = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let path = self.read_path()?;
            let raw = self.take(20)?;
            map.insert(path, hex::encode(raw));
        }
        Ok(map)
    }

    fn read_path_section(&mut self) -> Result<HashSet<String>, GitletError> {
        let count = self.take_u32()?;
        let mut set = HashSet::with_capacity(count as usize);
        for _ in 0..count {
            set.insert(self.read_path()?);
        }
        Ok(set)
    }
}

/// Resolves `path` to the canonical absolute path used as an index key.
/// Falls back to a lexical absolutization (no symlink resolution) for
/// paths that no longer exist on disk, so that removing an already-deleted
/// tracked file still resolves to the same key it was added under.
fn resolve_path(path: &Path) -> Result<PathBuf, GitletError> {
    match fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(_) => {
            if path.is_absolute() {
                Ok(path.to_path_buf())
            } else {
                Ok(std::env::current_dir()?.join(path))
            }
        }
    }
}

fn canonical_key(path: &Path) -> Result<String, GitletError> {
    Ok(resolve_path(path)?.to_string_lossy().into_owned())
}

/// The basename Git would print in its own error messages, falling back to
/// the full path for inputs with no final component (`.`, `/`).
fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
