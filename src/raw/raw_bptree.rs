use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::key::{self, Key, Value};
use super::node::{InternalNode, LeafNode, Node};
use crate::order::Order;

/// The core B+Tree implementation backing `BPTree`.
///
/// Every node records its parent handle. Splits on insertion and borrows/merges on
/// deletion walk upward through those handles instead of a recorded descent path.
pub(crate) struct RawBPTree {
    /// Arena storing all tree nodes.
    nodes: Arena<Node>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Handle to the first leaf, so iteration can start without a descent.
    leftmost: Option<Handle>,
    order: Order,
    /// Total number of key-value pairs in the tree.
    len: usize,
}

impl RawBPTree {
    /// Creates a new, empty tree.
    pub(crate) const fn new(order: Order) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            leftmost: None,
            order,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn order(&self) -> Order {
        self.order
    }

    pub(crate) const fn leftmost(&self) -> Option<Handle> {
        self.leftmost
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node {
        self.nodes.get(handle)
    }

    /// Number of levels from the root to the leaves; zero for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            height += 1;
            current = match self.nodes.get(handle) {
                Node::Internal(internal) => Some(internal.child(0)),
                Node::Leaf(_) => None,
            };
        }
        height
    }

    /// Clears all elements from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.leftmost = None;
        self.len = 0;
    }

    /// Descends from the root to the leaf whose key range covers `key`.
    fn find_leaf(&self, key: &[u8]) -> Option<Handle> {
        let mut current = self.root?;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(internal.route(key));
        }
        Some(current)
    }

    /// Returns the smallest key in the subtree rooted at `handle`.
    fn min_key(&self, mut handle: Handle) -> &Key {
        loop {
            match self.nodes.get(handle) {
                Node::Internal(internal) => handle = internal.child(0),
                Node::Leaf(leaf) => match leaf.first_key() {
                    Some(key) => return key,
                    None => panic!("`RawBPTree::min_key()` - empty leaf {handle:?} below the root"),
                },
            }
        }
    }

    pub(crate) fn get(&self, key: &[u8]) -> Option<&Value> {
        let leaf = self.nodes.get(self.find_leaf(key)?).as_leaf();
        let index = leaf.search(key).ok()?;
        Some(leaf.value(index))
    }

    pub(crate) fn first_key_value(&self) -> Option<(&Key, &Value)> {
        let leaf = self.nodes.get(self.leftmost?).as_leaf();
        if leaf.key_count() == 0 {
            return None;
        }
        Some((leaf.key(0), leaf.value(0)))
    }

    /// Inserts a key-value pair into the tree.
    /// Returns the old value if the key was already present.
    pub(crate) fn insert(&mut self, key: &[u8], value: Value) -> Option<Value> {
        let Some(leaf_handle) = self.find_leaf(key) else {
            let root = self.nodes.alloc(Node::Leaf(LeafNode::with_entry(key::copy_key(key), value)));
            self.root = Some(root);
            self.leftmost = Some(root);
            self.len = 1;
            return None;
        };

        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        match leaf.search(key) {
            Ok(index) => return Some(leaf.replace_value(index, value)),
            Err(index) => leaf.insert(index, key::copy_key(key), value),
        }
        let overflow = leaf.key_count() > self.order.max_keys();
        self.len += 1;

        if overflow {
            self.split_leaf(leaf_handle);
        }
        None
    }

    /// Splits an overflowing leaf and propagates the new separator upward.
    fn split_leaf(&mut self, leaf_handle: Handle) {
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        let right = leaf.split(self.order.split_point());
        let left_count = leaf.key_count();
        let right_count = right.key_count();

        // Right-biased: the first key of the right leaf stays there and is copied up.
        let separator = right.key(0).clone();
        let right_handle = self.nodes.alloc(Node::Leaf(right));
        self.nodes.get_mut(leaf_handle).as_leaf_mut().set_next(Some(right_handle));

        trace!(left = ?leaf_handle, right = ?right_handle, left_count, right_count, "split leaf");
        self.propagate_split(leaf_handle, separator, right_handle);
    }

    /// Inserts `separator` and the new `right` sibling of `left` into their parent,
    /// splitting ancestors as long as they overflow.
    fn propagate_split(&mut self, mut left: Handle, mut separator: Key, mut right: Handle) {
        loop {
            let Some(parent_handle) = self.nodes.get(left).parent() else {
                let root = self.nodes.alloc(Node::Internal(InternalNode::new_root(left, separator, right)));
                self.nodes.get_mut(left).set_parent(Some(root));
                self.nodes.get_mut(right).set_parent(Some(root));
                self.root = Some(root);
                trace!(root = ?root, height = self.height(), "grew new root");
                return;
            };

            let parent = self.nodes.get_mut(parent_handle).as_internal_mut();
            let Some(index) = parent.position_of(left) else {
                panic!("`RawBPTree::propagate_split()` - {left:?} is not a child of {parent_handle:?}");
            };
            parent.insert_child(index, separator, right);
            let overflow = parent.key_count() > self.order.max_keys();
            self.nodes.get_mut(right).set_parent(Some(parent_handle));

            if !overflow {
                return;
            }

            let parent = self.nodes.get_mut(parent_handle).as_internal_mut();
            let (promoted, sibling) = parent.split(self.order.split_point());
            let sibling_handle = self.nodes.alloc(Node::Internal(sibling));
            self.adopt_children(sibling_handle, 0);
            trace!(left = ?parent_handle, right = ?sibling_handle, "split internal node");

            left = parent_handle;
            separator = promoted;
            right = sibling_handle;
        }
    }

    /// Points the parent handle of `parent`'s children from index `from` onward at `parent`.
    fn adopt_children(&mut self, parent: Handle, from: usize) {
        let count = self.nodes.get(parent).as_internal().child_count();
        for index in from..count {
            let child = self.nodes.get(parent).as_internal().child(index);
            self.nodes.get_mut(child).set_parent(Some(parent));
        }
    }

    /// Removes a key from the tree and returns its value.
    pub(crate) fn remove(&mut self, key: &[u8]) -> Option<Value> {
        let leaf_handle = self.find_leaf(key)?;
        let node = self.nodes.get_mut(leaf_handle);
        let parent = node.parent();
        let leaf = node.as_leaf_mut();
        let index = leaf.search(key).ok()?;
        let (_, value) = leaf.remove(index);
        let remaining = leaf.key_count();
        self.len -= 1;

        if parent.is_none() {
            if remaining == 0 {
                self.clear();
                trace!("removed last entry");
            }
            return Some(value);
        }

        if remaining < self.order.min_keys() {
            self.rebalance(leaf_handle);
        }
        self.refresh_separator(key);

        Some(value)
    }

    /// Restores minimum occupancy from `handle` upward, borrowing from a sibling when
    /// one can spare a key and merging otherwise.
    fn rebalance(&mut self, mut handle: Handle) {
        let min = self.order.min_keys();

        loop {
            let Some(parent_handle) = self.nodes.get(handle).parent() else {
                self.collapse_root(handle);
                return;
            };
            if self.nodes.get(handle).key_count() >= min {
                return;
            }

            let parent = self.nodes.get(parent_handle).as_internal();
            let Some(index) = parent.position_of(handle) else {
                panic!("`RawBPTree::rebalance()` - {handle:?} is not a child of {parent_handle:?}");
            };
            let left = (index > 0).then(|| parent.child(index - 1));
            let right = (index + 1 < parent.child_count()).then(|| parent.child(index + 1));

            if let Some(left) = left
                && self.nodes.get(left).key_count() > min
            {
                self.borrow_from_left(handle, left, parent_handle, index);
                return;
            }
            if let Some(right) = right
                && self.nodes.get(right).key_count() > min
            {
                self.borrow_from_right(handle, right, parent_handle, index);
                return;
            }

            match (left, right) {
                (Some(left), _) => self.merge(left, handle, parent_handle, index - 1),
                (None, Some(right)) => self.merge(handle, right, parent_handle, index),
                (None, None) => panic!("`RawBPTree::rebalance()` - {handle:?} has no siblings"),
            }
            handle = parent_handle;
        }
    }

    /// Replaces an internal root left without separators by its only child.
    fn collapse_root(&mut self, root: Handle) {
        let Node::Internal(internal) = self.nodes.get_mut(root) else {
            return;
        };
        if internal.key_count() > 0 {
            return;
        }

        let child = internal.take_only_child();
        self.nodes.free(root);
        self.nodes.get_mut(child).set_parent(None);
        self.root = Some(child);
        trace!(root = ?child, height = self.height(), "collapsed root");
    }

    /// Moves the last entry (or child) of `left` to the front of `handle`.
    fn borrow_from_left(&mut self, handle: Handle, left: Handle, parent: Handle, index: usize) {
        if self.nodes.get(handle).is_leaf() {
            let Some((key, value)) = self.nodes.get_mut(left).as_leaf_mut().pop() else {
                panic!("`RawBPTree::borrow_from_left()` - {left:?} is empty");
            };
            let separator = key.clone();
            self.nodes.get_mut(handle).as_leaf_mut().push_front(key, value);
            self.nodes.get_mut(parent).as_internal_mut().replace_key(index - 1, separator);
        } else {
            let (key, child) = self.nodes.get_mut(left).as_internal_mut().pop_back();
            let separator = self.nodes.get_mut(parent).as_internal_mut().replace_key(index - 1, key);
            self.nodes.get_mut(handle).as_internal_mut().push_front(child, separator);
            self.nodes.get_mut(child).set_parent(Some(handle));
        }
        trace!(node = ?handle, from = ?left, "borrowed from left sibling");
    }

    /// Moves the first entry (or child) of `right` to the back of `handle`.
    fn borrow_from_right(&mut self, handle: Handle, right: Handle, parent: Handle, index: usize) {
        if self.nodes.get(handle).is_leaf() {
            let sibling = self.nodes.get_mut(right).as_leaf_mut();
            let Some((key, value)) = sibling.pop_front() else {
                panic!("`RawBPTree::borrow_from_right()` - {right:?} is empty");
            };
            let Some(separator) = sibling.first_key().cloned() else {
                panic!("`RawBPTree::borrow_from_right()` - {right:?} was emptied");
            };
            self.nodes.get_mut(handle).as_leaf_mut().push(key, value);
            self.nodes.get_mut(parent).as_internal_mut().replace_key(index, separator);
        } else {
            let (child, key) = self.nodes.get_mut(right).as_internal_mut().pop_front();
            let separator = self.nodes.get_mut(parent).as_internal_mut().replace_key(index, key);
            self.nodes.get_mut(handle).as_internal_mut().push_back(separator, child);
            self.nodes.get_mut(child).set_parent(Some(handle));
        }
        trace!(node = ?handle, from = ?right, "borrowed from right sibling");
    }

    /// Merges `right` into its left sibling `left`, removing the separator at
    /// `separator_index` and the handle of `right` from `parent`.
    fn merge(&mut self, left: Handle, right: Handle, parent: Handle, separator_index: usize) {
        let (separator, removed) = self.nodes.get_mut(parent).as_internal_mut().remove_child(separator_index);
        debug_assert_eq!(removed, right, "separator {separator_index} does not precede {right:?}");

        match self.nodes.take(right) {
            Node::Leaf(sibling) => {
                self.nodes.get_mut(left).as_leaf_mut().merge_with_right(sibling);
                if self.leftmost == Some(right) {
                    self.leftmost = Some(left);
                }
            }
            Node::Internal(sibling) => {
                let internal = self.nodes.get_mut(left).as_internal_mut();
                let first_moved = internal.child_count();
                internal.merge_with_right(separator, sibling);
                self.adopt_children(left, first_moved);
            }
        }
        trace!(left = ?left, right = ?right, parent = ?parent, "merged siblings");
    }

    /// Replaces the separator equal to a just-removed key by the smallest key of the
    /// subtree to its right.
    ///
    /// At most one separator can hold the removed key, and it lies on the search path
    /// for that key, so the walk stops at the first match.
    fn refresh_separator(&mut self, removed: &[u8]) {
        let Some(mut current) = self.root else {
            return;
        };

        while let Node::Internal(internal) = self.nodes.get(current) {
            let index = internal.route(removed);
            let child = internal.child(index);
            if index > 0 && internal.key(index - 1).as_slice() == removed {
                let min = self.min_key(child).clone();
                self.nodes.get_mut(current).as_internal_mut().replace_key(index - 1, min);
                return;
            }
            current = child;
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::uninlined_format_args)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl RawBPTree {
        /// Validates all B+Tree invariants. Panics with a descriptive message if any are violated.
        /// This is intended for use in tests to catch tree corruption.
        pub(crate) fn validate_invariants(&self) {
            let Some(root) = self.root else {
                assert_eq!(self.len, 0, "Empty tree should have len 0");
                assert!(self.leftmost.is_none(), "Empty tree should have no leftmost leaf");
                assert_eq!(self.nodes.len(), 0, "Empty tree should own no nodes");
                return;
            };

            let mut errors: Vec<String> = Vec::new();

            if self.nodes.get(root).parent().is_some() {
                errors.push(alloc::format!("Root {:?} has a parent", root));
            }
            if let Node::Internal(internal) = self.nodes.get(root)
                && internal.key_count() == 0
            {
                errors.push("Internal root has no separators".into());
            }

            // 1. Validate tree structure and collect all leaves
            let mut leaves: Vec<Handle> = Vec::new();
            let mut leaf_depth: Option<usize> = None;
            let mut node_count = 0;
            self.validate_node(root, 0, &mut leaf_depth, &mut leaves, &mut node_count, &mut errors);

            // 2. Validate leaf chain matches collected leaves
            self.validate_leaf_chain(&leaves, &mut errors);

            // 3. Validate len matches actual count
            let actual: usize = leaves.iter().map(|&h| self.nodes.get(h).key_count()).sum();
            if self.len != actual {
                errors.push(alloc::format!("len mismatch: self.len={}, actual count={}", self.len, actual));
            }

            // 4. Every live node is reachable from the root
            if self.nodes.len() != node_count {
                errors.push(alloc::format!(
                    "Arena holds {} nodes but {} are reachable",
                    self.nodes.len(),
                    node_count
                ));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        fn validate_node(
            &self,
            handle: Handle,
            depth: usize,
            leaf_depth: &mut Option<usize>,
            leaves: &mut Vec<Handle>,
            node_count: &mut usize,
            errors: &mut Vec<String>,
        ) {
            *node_count += 1;
            let node = self.nodes.get(handle);
            let is_root = Some(handle) == self.root;
            let count = node.key_count();

            if count > self.order.max_keys() {
                errors.push(alloc::format!("Node {:?} overflows with {} keys", handle, count));
            }
            if !is_root && count < self.order.min_keys() {
                errors.push(alloc::format!("Node {:?} underflows with {} keys", handle, count));
            }

            match node {
                Node::Leaf(leaf) => {
                    match *leaf_depth {
                        None => *leaf_depth = Some(depth),
                        Some(expected) if expected != depth => errors.push(alloc::format!(
                            "Leaf depth mismatch: expected {}, got {} at handle {:?}",
                            expected,
                            depth,
                            handle
                        )),
                        Some(_) => {}
                    }
                    if leaf.keys().windows(2).any(|pair| pair[0] >= pair[1]) {
                        errors.push(alloc::format!("Leaf keys not sorted at handle {:?}", handle));
                    }
                    leaves.push(handle);
                }
                Node::Internal(internal) => {
                    if internal.keys().windows(2).any(|pair| pair[0] >= pair[1]) {
                        errors.push(alloc::format!("Internal keys not sorted at handle {:?}", handle));
                    }
                    if internal.child_count() != count + 1 {
                        errors.push(alloc::format!(
                            "Node {:?} has {} keys but {} children",
                            handle,
                            count,
                            internal.child_count()
                        ));
                    }

                    for (i, &child) in internal.children().iter().enumerate() {
                        if self.nodes.get(child).parent() != Some(handle) {
                            errors.push(alloc::format!(
                                "Child {:?} of {:?} points at parent {:?}",
                                child,
                                handle,
                                self.nodes.get(child).parent()
                            ));
                        }
                        if i > 0 && self.min_key(child) != internal.key(i - 1) {
                            errors.push(alloc::format!(
                                "Separator {} of {:?} is {:?}, but the right subtree starts at {:?}",
                                i - 1,
                                handle,
                                internal.key(i - 1),
                                self.min_key(child)
                            ));
                        }
                        self.validate_node(child, depth + 1, leaf_depth, leaves, node_count, errors);
                    }
                }
            }
        }

        fn validate_leaf_chain(&self, leaves: &[Handle], errors: &mut Vec<String>) {
            if self.leftmost != leaves.first().copied() {
                errors.push(alloc::format!(
                    "leftmost mismatch: expected {:?}, got {:?}",
                    leaves.first(),
                    self.leftmost
                ));
            }

            for (i, &leaf) in leaves.iter().enumerate() {
                let expected = leaves.get(i + 1).copied();
                let next = self.nodes.get(leaf).as_leaf().next();
                if next != expected {
                    errors.push(alloc::format!(
                        "Leaf chain next mismatch at index {}: expected {:?}, got {:?}",
                        i,
                        expected,
                        next
                    ));
                }
            }

            let chained: Vec<&Key> = leaves.iter().flat_map(|&h| self.nodes.get(h).as_leaf().keys()).collect();
            if chained.windows(2).any(|pair| pair[0] >= pair[1]) {
                errors.push("Leaf chain is not globally ascending".into());
            }
        }

        fn entries(&self) -> Vec<(Key, Value)> {
            let mut entries = Vec::new();
            let mut current = self.leftmost;
            while let Some(handle) = current {
                let leaf = self.nodes.get(handle).as_leaf();
                for i in 0..leaf.key_count() {
                    entries.push((leaf.key(i).clone(), leaf.value(i).clone()));
                }
                current = leaf.next();
            }
            entries
        }
    }

    fn tree(order: usize) -> RawBPTree {
        RawBPTree::new(Order::new(order).unwrap())
    }

    const SCENARIO: [u8; 14] = [11, 18, 7, 15, 0, 16, 14, 33, 25, 42, 60, 2, 1, 74];

    #[test]
    fn empty_tree() {
        let mut tree = tree(3);
        assert_eq!(tree.get(b"a"), None);
        assert_eq!(tree.remove(b"a"), None);
        assert_eq!(tree.first_key_value(), None);
        assert_eq!(tree.height(), 0);
        tree.validate_invariants();
    }

    #[test]
    fn first_insert_creates_leaf_root() {
        let mut tree = tree(4);
        assert_eq!(tree.insert(b"k", b"v".to_vec()), None);
        assert_eq!(tree.root, tree.leftmost);
        assert!(tree.node(tree.root.unwrap()).is_leaf());
        assert_eq!(tree.height(), 1);
        tree.validate_invariants();
    }

    #[test]
    fn split_grows_root_with_right_biased_separator() {
        let mut tree = tree(3);
        for k in [1u8, 2, 3] {
            tree.insert(&[k], vec![k]);
        }
        tree.validate_invariants();

        let root = tree.node(tree.root.unwrap()).as_internal();
        assert_eq!(root.keys(), &[vec![2u8]]);
        let left = tree.node(root.child(0)).as_leaf();
        let right = tree.node(root.child(1)).as_leaf();
        assert_eq!(left.keys(), &[vec![1u8]]);
        assert_eq!(right.keys(), &[vec![2u8], vec![3]]);
        assert_eq!(left.next(), Some(root.child(1)));
    }

    #[test]
    fn cascading_splits_and_collapses() {
        for order in 3..=7 {
            let mut tree = tree(order);
            for k in 0u8..=255 {
                tree.insert(&[k], vec![k]);
                tree.validate_invariants();
            }
            assert!(tree.height() >= 3, "order {} height {}", order, tree.height());

            for k in 0u8..=255 {
                assert_eq!(tree.remove(&[k]), Some(vec![k]));
                tree.validate_invariants();
            }
            assert!(tree.is_empty());
            assert_eq!(tree.height(), 0);
        }
    }

    #[test]
    fn scenario_insert_then_delete_in_insertion_order() {
        for order in 3..=7 {
            let mut tree = tree(order);
            for k in SCENARIO {
                assert_eq!(tree.insert(&[k], k.to_string().into_bytes()), None);
                tree.validate_invariants();
            }
            assert_eq!(tree.len(), SCENARIO.len());

            let mut expected = SCENARIO.to_vec();
            expected.sort_unstable();
            let keys: Vec<u8> = tree.entries().into_iter().map(|(k, _)| k[0]).collect();
            assert_eq!(keys, expected);

            for (i, k) in SCENARIO.into_iter().enumerate() {
                assert_eq!(tree.remove(&[k]), Some(k.to_string().into_bytes()), "order {}", order);
                assert_eq!(tree.len(), SCENARIO.len() - i - 1);
                assert_eq!(tree.get(&[k]), None);
                tree.validate_invariants();
            }
        }
    }

    #[test]
    fn merging_three_times() {
        let keys = [7u8, 8, 4, 3, 2, 6, 11, 9, 10, 1, 12, 0, 5];
        let mut tree = tree(3);
        for k in keys {
            tree.insert(&[k], vec![k]);
        }
        tree.validate_invariants();

        for (i, k) in keys.into_iter().enumerate() {
            assert_eq!(tree.remove(&[k]), Some(vec![k]));
            tree.validate_invariants();

            let mut remaining: Vec<u8> = keys[i + 1..].to_vec();
            remaining.sort_unstable();
            let actual: Vec<u8> = tree.entries().into_iter().map(|(k, _)| k[0]).collect();
            assert_eq!(actual, remaining, "after removing {}", k);
        }
    }

    #[test]
    fn removing_separator_key_refreshes_ancestor() {
        let mut tree = tree(4);
        for k in 0u8..32 {
            tree.insert(&[k], vec![k]);
        }
        // Keys that currently act as separators somewhere in the tree.
        let root = tree.node(tree.root.unwrap()).as_internal();
        let separator = root.key(0).clone();

        assert!(tree.remove(&separator).is_some());
        tree.validate_invariants();
        let root = tree.node(tree.root.unwrap()).as_internal();
        assert!(root.keys().iter().all(|k| *k != separator));
    }

    #[test]
    fn absent_key_does_not_mutate() {
        let mut tree = tree(3);
        for k in [1u8, 2, 3] {
            tree.insert(&[k], vec![k]);
        }
        assert_eq!(tree.remove(&[4]), None);
        assert_eq!(tree.remove(&[]), None);
        assert_eq!(tree.len(), 3);
        tree.validate_invariants();
    }

    #[test]
    fn empty_key_and_value_are_entries() {
        let mut tree = tree(3);
        assert_eq!(tree.insert(b"", Vec::new()), None);
        assert_eq!(tree.get(b""), Some(&Vec::new()));
        assert_eq!(tree.insert(b"", vec![1]), Some(Vec::new()));
        assert_eq!(tree.first_key_value(), Some((&Vec::new(), &vec![1])));
        assert_eq!(tree.remove(b""), Some(vec![1]));
        tree.validate_invariants();
    }

    #[test]
    fn freed_nodes_are_reused() {
        let mut tree = tree(3);
        for round in 0..4u8 {
            for k in 0u8..64 {
                tree.insert(&[k], vec![round]);
            }
            for k in 0u8..64 {
                tree.remove(&[k]);
            }
            tree.validate_invariants();
        }
        assert!(tree.is_empty());
    }

    // Test operations enum for property testing
    #[derive(Clone, Debug)]
    enum Op {
        Insert(Vec<u8>, u8),
        Remove(Vec<u8>),
    }

    fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(0u8..8, 0..3)
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (key_strategy(), any::<u8>()).prop_map(|(k, v)| Op::Insert(k, v)),
            2 => key_strategy().prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn tree_invariants_maintained_after_operations(
            order in 3usize..=7,
            ops in prop::collection::vec(op_strategy(), 0..400),
        ) {
            let mut tree = tree(order);
            let mut model: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key, value) => {
                        prop_assert_eq!(tree.insert(&key, vec![value]), model.insert(key, vec![value]));
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(tree.remove(&key), model.remove(&key));
                    }
                }
                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
            }

            let expected: Vec<(Vec<u8>, Vec<u8>)> = model.into_iter().collect();
            prop_assert_eq!(tree.entries(), expected);
        }

        #[test]
        fn permutation_round_trip(order in 3usize..=7, keys in Just((0u8..=255).collect::<Vec<u8>>()).prop_shuffle()) {
            let mut tree = tree(order);
            for (i, &k) in keys.iter().enumerate() {
                prop_assert_eq!(tree.insert(&[k], vec![i as u8]), None);
            }
            tree.validate_invariants();

            for (i, &k) in keys.iter().enumerate() {
                prop_assert_eq!(tree.get(&[k]), Some(&vec![i as u8]));
            }
            let iterated: Vec<u8> = tree.entries().into_iter().map(|(k, _)| k[0]).collect();
            prop_assert_eq!(iterated, (0u8..=255).collect::<Vec<u8>>());

            for &k in keys.iter().rev() {
                prop_assert!(tree.remove(&[k]).is_some());
                tree.validate_invariants();
            }
            prop_assert!(tree.is_empty());
        }
    }
}
