//! The two object kinds this store knows about: blobs and trees.

pub mod blob;
pub mod tree;
