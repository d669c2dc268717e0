//! SHA-1 over heterogeneous byte/text inputs (C1).
//!
//! Every object identifier in the store is the lowercase-hex SHA-1 of some
//! byte sequence. Inputs arrive either as raw bytes (file content, encoded
//! tree payloads) or as text (object headers); [`HashInput`] lets callers
//! hand both to [`hash`] without an intermediate allocation for the bytes
//! case.

use sha1::{Digest, Sha1};
use std::borrow::Cow;

/// One piece of a multi-part hash input.
///
/// Text is encoded to UTF-8 at the call site rather than the hasher
/// guessing an encoding; no separator is inserted between parts, so the
/// header/content split in an object's `raw` form must already contain
/// whatever delimiter the format requires (a NUL byte, in this crate).
pub enum HashInput<'a> {
    Bytes(&'a [u8]),
    Text(Cow<'a, str>),
}

impl<'a> From<&'a [u8]> for HashInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        HashInput::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for HashInput<'a> {
    fn from(text: &'a str) -> Self {
        HashInput::Text(Cow::Borrowed(text))
    }
}

impl From<String> for HashInput<'static> {
    fn from(text: String) -> Self {
        HashInput::Text(Cow::Owned(text))
    }
}

impl HashInput<'_> {
    fn as_bytes(&self) -> &[u8] {
        match self {
            HashInput::Bytes(b) => b,
            HashInput::Text(s) => s.as_bytes(),
        }
    }
}

/// Computes the 40-character lowercase-hex SHA-1 of the concatenation of
/// `inputs`, in order, with no separators inserted.
///
/// A zero-input call hashes the empty byte sequence, yielding
/// `da39a3ee5e6b4b0d3255bfef95601890afd80709`.
pub fn hash<'a, I>(inputs: I) -> String
where
    I: IntoIterator<Item = HashInput<'a>>,
{
    let mut hasher = Sha1::new();
    for input in inputs {
        hasher.update(input.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Convenience wrapper for the common case of hashing a single byte slice.
pub fn hash_bytes(bytes: &[u8]) -> String {
    hash([HashInput::Bytes(bytes)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_matches_well_known_sha1() {
        assert_eq!(hash_bytes(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn no_inputs_hashes_empty_sequence() {
        assert_eq!(
            hash(std::iter::empty()),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn hello_world_blob_header_matches_known_uid() {
        let content = b"Hello World!";
        let header = format!("blob {}\0", content.len());
        let uid = hash([HashInput::from(header.as_str()), HashInput::from(&content[..])]);
        assert_eq!(uid, "c57eff55ebc0c54973903af5f72bac72762cf4f4");
    }

    #[test]
    fn no_separator_is_inserted_between_parts() {
        let joined = hash_bytes(b"ab");
        let split = hash([HashInput::from("a"), HashInput::from("b")]);
        assert_eq!(joined, split);
    }

    #[test]
    fn is_pure_and_deterministic() {
        assert_eq!(hash_bytes(b"repeatable"), hash_bytes(b"repeatable"));
    }
}
