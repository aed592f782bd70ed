//! Byte-string keys: ordering, routing and the copy policy.
//!
//! Keys compare lexicographically byte by byte (the `Ord` of `[u8]`), so a proper
//! prefix sorts before any of its extensions and the empty key sorts first.

use alloc::vec::Vec;

/// A key as stored in the tree. Owned by the node that holds it.
pub(crate) type Key = Vec<u8>;

/// An opaque value as stored in a leaf.
pub(crate) type Value = Vec<u8>;

/// Copies a caller's key into tree-owned storage so later mutation of the caller's
/// buffer cannot reorder the tree.
#[inline]
pub(crate) fn copy_key(key: &[u8]) -> Key {
    key.to_vec()
}

/// Returns the index of the child to descend into: the position of the first
/// separator strictly greater than `key`, or `keys.len()` if there is none.
#[inline]
pub(crate) fn route(keys: &[Key], key: &[u8]) -> usize {
    keys.partition_point(|separator| separator.as_slice() <= key)
}

/// Searches a sorted leaf for `key`.
///
/// Returns `Ok(index)` on an exact match, or `Err(index)` with the position of the
/// first key greater than `key`.
#[inline]
pub(crate) fn search(keys: &[Key], key: &[u8]) -> Result<usize, usize> {
    keys.binary_search_by(|probe| probe.as_slice().cmp(key))
}
