//! gitlet-core: a content-addressed object store and staging index, the
//! plumbing layer of a small Git-like version control system.
//!
//! The crate exposes the object model ([`objects::blob`], [`objects::tree`]),
//! the object store they persist through ([`store`]), the staging
//! [`index`], and the repository layout that ties them to a working
//! directory on disk ([`repo`]). There is no porcelain (commit graph,
//! branches, remotes) here; see the design notes for what this layer
//! deliberately leaves to a layer above it.

pub mod codec;
pub mod error;
pub mod hash;
pub mod index;
pub mod objects;
pub mod repo;
pub mod store;

pub use error::{ErrorKind, GitletError, Result};
pub use index::Index;
pub use objects::blob::Blob;
pub use objects::tree::{Tree, TreeEntry};
pub use repo::Repository;
pub use store::ObjectStore;
