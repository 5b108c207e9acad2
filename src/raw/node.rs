use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;

use super::entry::Entry;
use super::handle::Handle;
use crate::degree::Degree;
use crate::error::{Error, Result};

#[derive(Clone)]
pub(crate) enum Node<K, V> {
    Inner(InnerNode<K>),
    Leaf(LeafNode<K, V>),
}

// Separator keys route lookups: children[0] owns keys below keys[0], children[i]
// owns [keys[i - 1], keys[i]), and the last child owns everything from the last
// key upward.
#[derive(Clone)]
pub(crate) struct InnerNode<K> {
    keys: Vec<K>,
    children: Vec<Handle>,
}

#[derive(Clone)]
pub(crate) struct LeafNode<K, V> {
    entries: Vec<Entry<K, V>>,
}

/// Outcome of splitting an over-capacity node: the separator promoted to the
/// parent and the new right-hand sibling.
pub(crate) struct SplitResult<K, N> {
    pub(crate) key: K,
    pub(crate) sibling: N,
}

impl<K, V> Node<K, V> {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns true if the node holds no keys. An inner node in this state may
    /// still carry a single child.
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Node::Inner(inner) => inner.is_empty(),
            Node::Leaf(leaf) => leaf.is_empty(),
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> Result<&mut LeafNode<K, V>> {
        match self {
            Node::Leaf(leaf) => Ok(leaf),
            Node::Inner(_) => Err(Error::InternalConsistency("expected leaf node")),
        }
    }

    pub(crate) fn as_inner_mut(&mut self) -> Result<&mut InnerNode<K>> {
        match self {
            Node::Inner(inner) => Ok(inner),
            Node::Leaf(_) => Err(Error::InternalConsistency("expected inner node")),
        }
    }
}

impl<K> InnerNode<K> {
    pub(crate) fn new(degree: Degree) -> Self {
        Self {
            keys: Vec::with_capacity(degree.get() + 1),
            children: Vec::with_capacity(degree.get() + 2),
        }
    }

    /// Builds a two-child node, as needed when the root splits.
    pub(crate) fn with_children(degree: Degree, left: Handle, key: K, right: Handle) -> Self {
        let mut node = Self::new(degree);
        node.keys.push(key);
        node.children.push(left);
        node.children.push(right);
        node
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn first_child(&self) -> Option<Handle> {
        self.children.first().copied()
    }

    pub(crate) fn last_child(&self) -> Option<Handle> {
        self.children.last().copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn is_over_capacity(&self, degree: Degree) -> bool {
        self.keys.len() > degree.get()
    }

    /// The only child of a node that has lost all of its separators.
    pub(crate) fn sole_child(&self) -> Option<Handle> {
        match self.children.as_slice() {
            [child] if self.keys.is_empty() => Some(*child),
            _ => None,
        }
    }

    /// Position of `child` among this node's children, by identity.
    pub(crate) fn find_node(&self, child: Handle) -> Result<usize> {
        self.children
            .iter()
            .position(|&candidate| candidate == child)
            .ok_or(Error::InternalConsistency("child not found in parent"))
    }

    /// Removes `child` together with the separator it shares with a neighbour:
    /// the key before it, or the key after it when it is the first child.
    /// Returns the position the child occupied.
    pub(crate) fn delete_child(&mut self, child: Handle) -> Result<usize> {
        let index = self.find_node(child)?;
        self.children.remove(index);

        if self.children.is_empty() {
            self.keys.clear();
        } else if index > 0 {
            self.keys.remove(index - 1);
        } else if !self.keys.is_empty() {
            self.keys.remove(0);
        }

        Ok(index)
    }

    /// Places `child` ahead of the current first child, delimited by `separator`.
    pub(crate) fn prepend_child(&mut self, separator: K, child: Handle) {
        self.keys.insert(0, separator);
        self.children.insert(0, child);
    }

    /// Splits this node at the midpoint. The middle key is promoted and kept by
    /// neither half; the right half moves to the returned sibling.
    pub(crate) fn split(&mut self) -> SplitResult<K, InnerNode<K>> {
        let mid = self.keys.len() / 2;

        let mut sibling = InnerNode {
            keys: Vec::with_capacity(self.keys.capacity()),
            children: Vec::with_capacity(self.children.capacity()),
        };
        sibling.keys.extend(self.keys.drain(mid + 1..));
        sibling.children.extend(self.children.drain(mid + 1..));

        let key = self.keys.remove(mid);
        SplitResult { key, sibling }
    }
}

impl<K: Ord> InnerNode<K> {
    /// Index of the child owning `key`: the number of separators `<= key`.
    #[inline]
    fn slot_for<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.keys.partition_point(|separator| separator.borrow() <= key)
    }

    #[inline]
    pub(crate) fn child_for_key<Q>(&self, key: &Q) -> Handle
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.children[self.slot_for(key)]
    }

    /// Inserts `child` directly to the right of the child that owns `key`, with
    /// `key` becoming the separator between them.
    pub(crate) fn add_child(&mut self, key: K, child: Handle) {
        let slot = self.slot_for(&key);
        self.keys.insert(slot, key);
        self.children.insert(slot + 1, child);
    }
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new(degree: Degree) -> Self {
        Self {
            entries: Vec::with_capacity(degree.get() + 1),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn is_over_capacity(&self, degree: Degree) -> bool {
        self.entries.len() > degree.get()
    }

    pub(crate) fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    pub(crate) fn min_key(&self) -> Option<&K> {
        self.entries.first().map(|entry| &entry.key)
    }

    pub(crate) fn max_key(&self) -> Option<&K> {
        self.entries.last().map(|entry| &entry.key)
    }
}

impl<K: Ord, V> LeafNode<K, V> {
    #[inline]
    fn search<Q>(&self, key: &Q) -> core::result::Result<usize, usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.entries.binary_search_by(|entry| entry.key.borrow().cmp(key))
    }

    /// Inserts at the sorted position. May leave the leaf over capacity; the
    /// caller is responsible for splitting it.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<()> {
        match self.search(&key) {
            Ok(_) => Err(Error::DuplicateKey),
            Err(index) => {
                self.entries.insert(index, Entry::new(key, value));
                Ok(())
            }
        }
    }

    pub(crate) fn find<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            Ok(index) => Ok(&self.entries[index].value),
            Err(_) => Err(Error::KeyNotFound),
        }
    }

    /// Removes the entry for `key`, reporting whether there was one.
    pub(crate) fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            Ok(index) => {
                self.entries.remove(index);
                true
            }
            Err(_) => false,
        }
    }
}

impl<K: Clone, V> LeafNode<K, V> {
    /// Splits this leaf at the midpoint. The upper half, starting with the
    /// promoted key, moves to the returned sibling.
    pub(crate) fn split(&mut self) -> SplitResult<K, LeafNode<K, V>> {
        let mid = self.entries.len() / 2;

        let mut entries = Vec::with_capacity(self.entries.capacity());
        entries.extend(self.entries.drain(mid..));
        let key = entries[0].key.clone();

        SplitResult {
            key,
            sibling: LeafNode { entries },
        }
    }
}

impl<K: fmt::Display> fmt::Display for InnerNode<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Inner: [")?;
        for (index, key) in self.keys.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        f.write_str("]]")
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for LeafNode<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Leaf: [")?;
        for (index, entry) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{entry}")?;
        }
        f.write_str("]]")
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Node<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Inner(inner) => inner.fmt(f),
            Node::Leaf(leaf) => leaf.fmt(f),
        }
    }
}
