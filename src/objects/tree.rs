//! The tree object and the tree builder (C6).
//!
//! A [`Tree`] is an ordered directory listing; [`build`] materializes the
//! whole tree object graph for the effective working-set a staged [`Index`]
//! describes, writing every subtree before the tree that references it.

use crate::codec;
use crate::error::GitletError;
use crate::hash::{self, HashInput};
use crate::index::Index;
use crate::store::ObjectStore;
use std::collections::BTreeMap;
use std::path::Path;

/// Mode string for a blob entry.
pub const BLOB_MODE: &str = "100644";
/// Mode string for a subtree entry.
pub const TREE_MODE: &str = "040000";

/// The well-known identifier of a tree with zero entries.
pub const EMPTY_TREE_UID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// One entry in a [`Tree`]: a mode, a name, and the identifier of the
/// object it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: &'static str,
    pub name: String,
    pub uid: String,
}

/// An ordered directory object.
///
/// `entries` is always sorted by `name`, byte-wise, before `raw` is
/// computed (this is what makes the root `uid` a pure function of the
/// working-set the tree was built from, independent of insertion order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    name: String,
    entries: Vec<TreeEntry>,
    raw: Vec<u8>,
    uid: String,
}

impl Tree {
    fn from_entries(name: String, mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        let payload = encode_payload(&entries);
        let header = format!("tree {}\0", payload.len());
        let mut raw = header.into_bytes();
        raw.extend_from_slice(&payload);
        let uid = hash::hash([HashInput::Bytes(&raw)]);
        Tree { name, entries, raw, uid }
    }

    /// The directory name this tree represents; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in this tree, sorted by name.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// The object identifier: `SHA1(raw)`.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The pre-compression framed bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Compresses `raw` and writes it to `store` if absent.
    fn persist(&self, store: &ObjectStore) -> Result<(), GitletError> {
        let compressed = codec::compress(&self.raw);
        store.write_if_absent(&self.uid, &compressed)
    }
}

fn encode_payload(entries: &[TreeEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(entry.mode.as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        out.extend_from_slice(entry.uid.as_bytes());
    }
    out
}

/// Remaps a canonicalized absolute path key to a `/`-separated path
/// relative to `repo_root`.
///
/// Paths that fall outside `repo_root` are not expected by any scenario in
/// this crate's test suite (see the open question in the design notes);
/// they are handled by falling back to the path's own components rather
/// than panicking.
fn relativize(abs_path: &str, repo_root: &Path) -> String {
    let path = Path::new(abs_path);
    let rel = path.strip_prefix(repo_root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Computes the effective working-set `tracked − removed + added`, with
/// keys remapped from canonicalized absolute paths to repository-relative
/// paths.
fn effective_working_set(index: &Index, repo_root: &Path) -> BTreeMap<String, String> {
    let mut working_set = BTreeMap::new();
    for (abs_path, uid) in index.tracked() {
        working_set.insert(relativize(abs_path, repo_root), uid.clone());
    }
    for abs_path in index.removed() {
        working_set.remove(&relativize(abs_path, repo_root));
    }
    for (abs_path, uid) in index.added() {
        working_set.insert(relativize(abs_path, repo_root), uid.clone());
    }
    working_set
}

/// Partitions `entries` (relative path → blob uid) into this level's blob
/// entries and its subdirectories, recurses into each subdirectory, and
/// persists every subtree before returning.
fn build_level(
    dir_name: &str,
    entries: &BTreeMap<String, String>,
    store: &ObjectStore,
) -> Result<Tree, GitletError> {
    let mut tree_entries = Vec::new();
    let mut subdirs: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

    for (path, uid) in entries {
        match path.split_once('/') {
            None => tree_entries.push(TreeEntry {
                mode: BLOB_MODE,
                name: path.clone(),
                uid: uid.clone(),
            }),
            Some((first, rest)) => {
                subdirs
                    .entry(first.to_string())
                    .or_default()
                    .insert(rest.to_string(), uid.clone());
            }
        }
    }

    for (name, sub_entries) in subdirs {
        let child = build_level(&name, &sub_entries, store)?;
        child.persist(store)?;
        tree_entries.push(TreeEntry {
            mode: TREE_MODE,
            name,
            uid: child.uid().to_string(),
        });
    }

    Ok(Tree::from_entries(dir_name.to_string(), tree_entries))
}

/// Builds the tree object graph for `index`'s effective working-set,
/// relative to `repo_root`, writing every object it transitively
/// references (children before parents) into `store`.
///
/// An empty working-set yields a tree with zero entries, whose `uid` is
/// [`EMPTY_TREE_UID`].
pub fn build(index: &Index, repo_root: &Path, store: &ObjectStore) -> Result<Tree, GitletError> {
    let working_set = effective_working_set(index, repo_root);
    let root = build_level("", &working_set, store)?;
    root.persist(store)?;
    Ok(root)
}
