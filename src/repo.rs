//! Repository root and `.gitlet` layout (C7).
//!
//! Every other component takes an explicit root path or the paths derived
//! from it, rather than reading a process-wide global: the repository a
//! call operates on is always a value passed by the caller, never implicit
//! state.

use crate::error::GitletError;
use std::fs;
use std::path::{Path, PathBuf};

const DIR_NAME: &str = ".gitlet";

/// A resolved repository: the working-tree root plus the derived paths
/// under its `.gitlet` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    /// Wraps `root` as a repository value without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Repository { root: root.into() }
    }

    /// Walks upward from `start` looking for a `.gitlet` directory,
    /// returning the first ancestor (inclusive of `start`) that has one.
    ///
    /// Fails with [`GitletError::NotFound`] if no ancestor is initialized.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, GitletError> {
        let mut current = start.as_ref().to_path_buf();
        loop {
            if current.join(DIR_NAME).is_dir() {
                return Ok(Repository::new(current));
            }
            if !current.pop() {
                return Err(GitletError::not_found("a .gitlet repository"));
            }
        }
    }

    /// The working-tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `true` if `.gitlet` exists under this root.
    pub fn is_initialized(&self) -> bool {
        self.gitlet_dir().is_dir()
    }

    /// Creates `.gitlet/{objects,refs/heads,refs/remotes,logs}`, an empty
    /// `HEAD` pointing at `refs/heads/main`, and an empty index, in one
    /// pass. Idempotent: re-initializing an already-initialized repository
    /// leaves existing objects, refs, and the index untouched.
    pub fn init(&self) -> Result<(), GitletError> {
        fs::create_dir_all(self.objects_dir())?;
        fs::create_dir_all(self.refs_heads_dir())?;
        fs::create_dir_all(self.refs_remotes_dir())?;
        fs::create_dir_all(self.logs_dir())?;

        let head = self.head_file();
        if !head.exists() {
            fs::write(&head, b"ref: refs/heads/main\n")?;
        }

        let index_file = self.index_file();
        if !index_file.exists() {
            crate::index::Index::new().save(&index_file)?;
        }

        Ok(())
    }

    /// The `.gitlet` directory.
    pub fn gitlet_dir(&self) -> PathBuf {
        self.root.join(DIR_NAME)
    }

    /// The `.gitlet/objects` directory, root of the [`crate::store::ObjectStore`].
    pub fn objects_dir(&self) -> PathBuf {
        self.gitlet_dir().join("objects")
    }

    /// The `.gitlet/index` file.
    pub fn index_file(&self) -> PathBuf {
        self.gitlet_dir().join("index")
    }

    /// The `.gitlet/HEAD` file.
    pub fn head_file(&self) -> PathBuf {
        self.gitlet_dir().join("HEAD")
    }

    /// The `.gitlet/refs/heads` directory.
    pub fn refs_heads_dir(&self) -> PathBuf {
        self.gitlet_dir().join("refs").join("heads")
    }

    /// The `.gitlet/refs/remotes` directory.
    pub fn refs_remotes_dir(&self) -> PathBuf {
        self.gitlet_dir().join("refs").join("remotes")
    }

    /// The `.gitlet/logs` directory.
    pub fn logs_dir(&self) -> PathBuf {
        self.gitlet_dir().join("logs")
    }
}
