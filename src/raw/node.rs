use smallvec::SmallVec;

use super::handle::Handle;
use super::key::{self, Key, Value};

// Inline room for the default order (3 keys) plus the transient overflow slot used
// between an insertion and the split it triggers. Larger orders spill to the heap.
const INLINE_KEYS: usize = 4;
const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

type Keys = SmallVec<[Key; INLINE_KEYS]>;
type Values = SmallVec<[Value; INLINE_KEYS]>;
type Children = SmallVec<[Handle; INLINE_CHILDREN]>;

#[allow(clippy::large_enum_variant)]
pub(crate) enum Node {
    Internal(InternalNode),
    Leaf(LeafNode),
}

// B+Tree: Internal nodes store separator keys and child handles.
pub(crate) struct InternalNode {
    parent: Option<Handle>,
    // keys[i] is the smallest key reachable through children[i + 1].
    keys: Keys,
    // Always keys.len() + 1 entries.
    children: Children,
}

// B+Tree: Leaf nodes store the entries and link to the next leaf in key order.
pub(crate) struct LeafNode {
    parent: Option<Handle>,
    next: Option<Handle>,
    keys: Keys,
    values: Values,
}

impl Node {
    /// Returns true if this is a leaf node.
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node, panicking if this is not internal.
    pub(crate) fn as_internal(&self) -> &InternalNode {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the number of keys in this node.
    pub(crate) fn key_count(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.key_count(),
            Node::Leaf(leaf) => leaf.key_count(),
        }
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        match self {
            Node::Internal(internal) => internal.parent,
            Node::Leaf(leaf) => leaf.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        match self {
            Node::Internal(internal) => internal.parent = parent,
            Node::Leaf(leaf) => leaf.parent = parent,
        }
    }
}

impl InternalNode {
    /// Creates a root holding a single separator between two children.
    pub(crate) fn new_root(left: Handle, separator: Key, right: Handle) -> Self {
        let mut keys = Keys::new();
        keys.push(separator);
        let mut children = Children::new();
        children.push(left);
        children.push(right);
        Self {
            parent: None,
            keys,
            children,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &Key {
        &self.keys[index]
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &[Key] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    #[cfg(test)]
    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Index of the child whose subtree may contain `key`.
    #[inline]
    pub(crate) fn route(&self, key: &[u8]) -> usize {
        key::route(&self.keys, key)
    }

    /// Position of `child` among this node's children.
    pub(crate) fn position_of(&self, child: Handle) -> Option<usize> {
        self.children.iter().position(|&h| h == child)
    }

    /// Replaces the separator at `index`, returning the previous one.
    pub(crate) fn replace_key(&mut self, index: usize, key: Key) -> Key {
        core::mem::replace(&mut self.keys[index], key)
    }

    /// Inserts `separator` at `index` with `child` immediately to its right.
    pub(crate) fn insert_child(&mut self, index: usize, separator: Key, child: Handle) {
        self.keys.insert(index, separator);
        self.children.insert(index + 1, child);
    }

    /// Removes the separator at `index` together with the child to its right.
    pub(crate) fn remove_child(&mut self, index: usize) -> (Key, Handle) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }

    /// Prepends a child; `separator` ends up between it and the former first child.
    pub(crate) fn push_front(&mut self, child: Handle, separator: Key) {
        self.keys.insert(0, separator);
        self.children.insert(0, child);
    }

    /// Appends a child; `separator` ends up between the former last child and it.
    pub(crate) fn push_back(&mut self, separator: Key, child: Handle) {
        self.keys.push(separator);
        self.children.push(child);
    }

    /// Removes the first child and the separator after it.
    pub(crate) fn pop_front(&mut self) -> (Handle, Key) {
        (self.children.remove(0), self.keys.remove(0))
    }

    /// Removes the last child and the separator before it.
    pub(crate) fn pop_back(&mut self) -> (Key, Handle) {
        match (self.keys.pop(), self.children.pop()) {
            (Some(key), Some(child)) => (key, child),
            _ => panic!("`InternalNode::pop_back()` - node has no separators"),
        }
    }

    /// Removes and returns the only remaining child of a node without separators.
    pub(crate) fn take_only_child(&mut self) -> Handle {
        assert!(
            self.keys.is_empty() && self.children.len() == 1,
            "`InternalNode::take_only_child()` - node has {} children",
            self.children.len()
        );
        self.children.remove(0)
    }

    /// Splits an overflowing node, keeping `at` keys on the left.
    ///
    /// The key at `at` is promoted: it is returned and stored in neither half. The
    /// right half inherits this node's parent.
    pub(crate) fn split(&mut self, at: usize) -> (Key, InternalNode) {
        let right = InternalNode {
            parent: self.parent,
            keys: self.keys.drain(at + 1..).collect(),
            children: self.children.drain(at + 1..).collect(),
        };
        let Some(promoted) = self.keys.pop() else {
            panic!("`InternalNode::split()` - split point {at} is out of range");
        };
        (promoted, right)
    }

    /// Absorbs a right sibling, pulling the parent's separator down between them.
    pub(crate) fn merge_with_right(&mut self, separator: Key, mut right: InternalNode) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
    }
}

impl LeafNode {
    /// Creates a leaf holding a single entry.
    pub(crate) fn with_entry(key: Key, value: Value) -> Self {
        let mut leaf = Self {
            parent: None,
            next: None,
            keys: Keys::new(),
            values: Values::new(),
        };
        leaf.push(key, value);
        leaf
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &Key {
        &self.keys[index]
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &Value {
        &self.values[index]
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub(crate) fn first_key(&self) -> Option<&Key> {
        self.keys.first()
    }

    #[inline]
    pub(crate) fn search(&self, key: &[u8]) -> Result<usize, usize> {
        key::search(&self.keys, key)
    }

    pub(crate) fn insert(&mut self, index: usize, key: Key, value: Value) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    pub(crate) fn remove(&mut self, index: usize) -> (Key, Value) {
        (self.keys.remove(index), self.values.remove(index))
    }

    pub(crate) fn replace_value(&mut self, index: usize, value: Value) -> Value {
        core::mem::replace(&mut self.values[index], value)
    }

    pub(crate) fn push(&mut self, key: Key, value: Value) {
        self.keys.push(key);
        self.values.push(value);
    }

    pub(crate) fn push_front(&mut self, key: Key, value: Value) {
        self.insert(0, key, value);
    }

    pub(crate) fn pop(&mut self) -> Option<(Key, Value)> {
        Some((self.keys.pop()?, self.values.pop()?))
    }

    pub(crate) fn pop_front(&mut self) -> Option<(Key, Value)> {
        if self.keys.is_empty() {
            return None;
        }
        Some(self.remove(0))
    }

    /// Splits an overflowing leaf, keeping `at` entries on the left.
    ///
    /// The right half takes over this leaf's parent and successor; the caller must
    /// link this leaf to the right half once it has a handle.
    pub(crate) fn split(&mut self, at: usize) -> LeafNode {
        LeafNode {
            parent: self.parent,
            next: self.next,
            keys: self.keys.drain(at..).collect(),
            values: self.values.drain(at..).collect(),
        }
    }

    /// Absorbs a right sibling, taking over its successor.
    pub(crate) fn merge_with_right(&mut self, mut right: LeafNode) {
        self.keys.append(&mut right.keys);
        self.values.append(&mut right.values);
        self.next = right.next;
    }
}
