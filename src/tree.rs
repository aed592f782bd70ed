use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;

use tracing::debug;

use crate::error::{Error, Result};
use crate::order::Order;
use crate::raw::{Handle, LeafNode, RawBPTree};

/// An in-memory ordered map from byte strings to byte strings, based on a [B+ tree].
///
/// Keys are ordered lexicographically by byte, so iteration yields them in
/// ascending `[u8]` order. Entries live only in the leaves; the leaves form a
/// singly linked chain that [`BPTree::iter`] walks without touching internal nodes.
///
/// The tree is single-threaded: mutation takes `&mut self`, and an [`Iter`] borrows
/// the tree for as long as it is alive, so a tree cannot change underneath a live
/// iterator.
///
/// # Examples
///
/// ```
/// use bptree::BPTree;
///
/// let mut tree = BPTree::new();
/// tree.put("apple", "sweet");
/// tree.put("banana", "honey");
/// tree.put("cinnamon", "savoury");
///
/// assert_eq!(tree.get("banana"), Some(&b"honey"[..]));
///
/// let keys: Vec<&[u8]> = tree.keys().collect();
/// assert_eq!(keys, [&b"apple"[..], b"banana", b"cinnamon"]);
/// ```
///
/// A tree with a custom branching factor:
///
/// ```
/// use bptree::{BPTree, Error};
///
/// let tree = BPTree::with_order(3).unwrap();
/// assert_eq!(tree.order().get(), 3);
///
/// assert_eq!(BPTree::with_order(2).unwrap_err(), Error::InvalidOrder { order: 2, min: 3 });
/// ```
///
/// [B+ tree]: https://en.wikipedia.org/wiki/B%2B_tree
pub struct BPTree {
    raw: RawBPTree,
}

/// A forward cursor over the entries of a [`BPTree`], in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`BPTree`]. Besides the
/// [`Iterator`] interface it offers [`has_next`](Iter::has_next) and
/// [`next_entry`](Iter::next_entry), which reports exhaustion as an error.
///
/// # Examples
///
/// ```
/// use bptree::{BPTree, Error};
///
/// let mut tree = BPTree::new();
/// tree.put([1u8], [10u8]);
///
/// let mut iter = tree.iter();
/// assert!(iter.has_next());
/// assert_eq!(iter.next_entry(), Ok((&[1u8][..], &[10u8][..])));
/// assert!(!iter.has_next());
/// assert_eq!(iter.next_entry(), Err(Error::NoNextElement));
/// ```
///
/// [`iter`]: BPTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a> {
    tree: &'a RawBPTree,
    leaf: Option<Handle>,
    index: usize,
    remaining: usize,
}

/// An iterator over the keys of a [`BPTree`], in ascending order.
///
/// This `struct` is created by the [`keys`] method on [`BPTree`].
///
/// [`keys`]: BPTree::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a> {
    inner: Iter<'a>,
}

/// An iterator over the values of a [`BPTree`], in ascending key order.
///
/// This `struct` is created by the [`values`] method on [`BPTree`].
///
/// [`values`]: BPTree::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a> {
    inner: Iter<'a>,
}

impl BPTree {
    /// Makes a new, empty tree with the default order of 4.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPTree;
    ///
    /// let tree = BPTree::new();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.order().get(), 4);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::from_order(Order::DEFAULT)
    }

    /// Makes a new, empty tree with the given branching factor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is below [`Order::MIN`].
    pub fn with_order(order: usize) -> Result<Self> {
        Ok(Self::from_order(Order::new(order)?))
    }

    /// Makes a new, empty tree with an already validated branching factor.
    #[must_use]
    pub fn from_order(order: Order) -> Self {
        debug!(%order, "created tree");
        Self {
            raw: RawBPTree::new(order),
        }
    }

    /// Returns the branching factor of the tree.
    #[must_use]
    pub fn order(&self) -> Order {
        self.raw.order()
    }

    /// Returns the number of entries in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of levels from the root to the leaves, zero when empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPTree;
    ///
    /// let mut tree = BPTree::with_order(3).unwrap();
    /// assert_eq!(tree.height(), 0);
    /// for k in 0u8..3 {
    ///     tree.put([k], b"");
    /// }
    /// assert_eq!(tree.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the value stored under `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPTree;
    ///
    /// let mut tree = BPTree::new();
    /// tree.put(b"a", b"1");
    /// assert_eq!(tree.get(b"a"), Some(&b"1"[..]));
    /// assert_eq!(tree.get(b"b"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.raw.get(key.as_ref()).map(Vec::as_slice)
    }

    /// Returns `true` if the tree contains `key`.
    #[must_use]
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.raw.get(key.as_ref()).is_some()
    }

    /// Inserts an entry, returning the value it replaced.
    ///
    /// The key is copied into the tree, so the caller's buffer may be reused
    /// afterward. An existing entry keeps its key and has its value overwritten.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPTree;
    ///
    /// let mut tree = BPTree::new();
    /// assert_eq!(tree.put([1u8], [1u8]), None);
    /// assert_eq!(tree.put([1u8], [2u8]), Some(vec![1]));
    /// assert_eq!(tree.get([1u8]), Some(&[2u8][..]));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn put(&mut self, key: impl AsRef<[u8]>, value: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.raw.insert(key.as_ref(), value.into())
    }

    /// Removes `key` from the tree, returning its value if it was present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPTree;
    ///
    /// let mut tree = BPTree::new();
    /// tree.put("k", "v");
    /// assert_eq!(tree.delete("k"), Some(b"v".to_vec()));
    /// assert_eq!(tree.delete("k"), None);
    /// ```
    pub fn delete(&mut self, key: impl AsRef<[u8]>) -> Option<Vec<u8>> {
        self.raw.remove(key.as_ref())
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&[u8], &[u8])> {
        self.raw.first_key_value().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Removes every entry, keeping the order.
    pub fn clear(&mut self) {
        debug!(len = self.raw.len(), "cleared tree");
        self.raw.clear();
    }

    /// Calls `visit` on every entry in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bptree::BPTree;
    ///
    /// let mut tree = BPTree::new();
    /// for k in [3u8, 1, 2] {
    ///     tree.put([k], [k * 10]);
    /// }
    ///
    /// let mut seen = Vec::new();
    /// tree.for_each(|key, value| seen.push((key[0], value[0])));
    /// assert_eq!(seen, [(1, 10), (2, 20), (3, 30)]);
    /// ```
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&[u8], &[u8]),
    {
        for (key, value) in self {
            visit(key, value);
        }
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Complexity
    ///
    /// O(1) to create the iterator; O(1) per step via linked leaves.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: &self.raw,
            leaf: self.raw.leftmost(),
            index: 0,
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the tree, in key order.
    pub fn values(&self) -> Values<'_> {
        Values { inner: self.iter() }
    }
}

impl Default for BPTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BPTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Extend<(K, V)> for BPTree
where
    K: AsRef<[u8]>,
    V: Into<Vec<u8>>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for BPTree
where
    K: AsRef<[u8]>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a> IntoIterator for &'a BPTree {
    type Item = (&'a [u8], &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<'a> Iter<'a> {
    /// Returns the leaf under the cursor, if it still has an entry to yield.
    fn current(&self) -> Option<&'a LeafNode> {
        let tree = self.tree;
        let leaf = tree.node(self.leaf?).as_leaf();
        (self.index < leaf.key_count()).then_some(leaf)
    }

    /// Returns `true` if [`next_entry`](Iter::next_entry) would yield an entry.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current().is_some()
    }

    /// Returns the entry under the cursor and advances it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoNextElement`] once every entry has been yielded.
    pub fn next_entry(&mut self) -> Result<(&'a [u8], &'a [u8])> {
        let leaf = self.current().ok_or(Error::NoNextElement)?;
        let entry = (leaf.key(self.index).as_slice(), leaf.value(self.index).as_slice());

        self.index += 1;
        self.remaining -= 1;
        if self.index == leaf.key_count() {
            self.leaf = leaf.next();
            self.index = 0;
        }

        Ok(entry)
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl FusedIterator for Iter<'_> {}

impl Clone for Iter<'_> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            leaf: self.leaf,
            index: self.index,
            remaining: self.remaining,
        }
    }
}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Keys<'_> {}

impl FusedIterator for Keys<'_> {}

impl fmt::Debug for Keys<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").field("remaining", &self.inner.remaining).finish()
    }
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Values<'_> {}

impl FusedIterator for Values<'_> {}

impl fmt::Debug for Values<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("remaining", &self.inner.remaining).finish()
    }
}
