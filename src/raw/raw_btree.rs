use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;

use smallvec::SmallVec;
use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{InnerNode, LeafNode, Node, SplitResult};
use crate::degree::Degree;
use crate::error::{Error, Result};

/// The arena-backed tree behind [`BTree`](crate::BTree).
#[derive(Clone)]
pub(crate) struct RawBTree<K, V> {
    /// Every live node, leaves and inner nodes alike.
    nodes: Arena<Node<K, V>>,
    /// Absent exactly when the tree holds no entries.
    root: Option<Handle>,
    degree: Degree,
    len: usize,
}

/// Inner nodes visited on the way down, root first.
type Path = SmallVec<[Handle; 16]>;

impl<K, V> RawBTree<K, V> {
    pub(crate) const fn new(degree: Degree) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            degree,
            len: 0,
        }
    }

    pub(crate) const fn degree(&self) -> Degree {
        self.degree
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of node levels, counting the leaf level. Zero for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            height += 1;
            current = match self.nodes.get(handle) {
                Some(Node::Inner(inner)) => inner.first_child(),
                _ => None,
            };
        }
        height
    }

    fn node(&self, handle: Handle) -> Result<&Node<K, V>> {
        self.nodes.get(handle).ok_or(Error::InternalConsistency("dangling node handle"))
    }

    fn leaf_mut(&mut self, handle: Handle) -> Result<&mut LeafNode<K, V>> {
        self.nodes
            .get_mut(handle)
            .ok_or(Error::InternalConsistency("dangling node handle"))?
            .as_leaf_mut()
    }

    fn inner_mut(&mut self, handle: Handle) -> Result<&mut InnerNode<K>> {
        self.nodes
            .get_mut(handle)
            .ok_or(Error::InternalConsistency("dangling node handle"))?
            .as_inner_mut()
    }

    /// Frees a node that has already been unlinked from its parent.
    fn release(&mut self, handle: Handle) -> Result<Node<K, V>> {
        self.nodes.take(handle).ok_or(Error::InternalConsistency("node released twice"))
    }

    /// Smallest key stored under `handle`, found by following first children.
    fn min_key(&self, handle: Handle) -> Result<&K> {
        let mut current = handle;
        loop {
            match self.node(current)? {
                Node::Inner(inner) => {
                    current = inner
                        .first_child()
                        .ok_or(Error::InternalConsistency("inner node has no children"))?;
                }
                Node::Leaf(leaf) => {
                    return leaf.min_key().ok_or(Error::InternalConsistency("empty leaf below a live node"));
                }
            }
        }
    }

    /// Largest key stored under `handle`, found by following last children.
    fn max_key(&self, handle: Handle) -> Result<&K> {
        let mut current = handle;
        loop {
            match self.node(current)? {
                Node::Inner(inner) => {
                    current = inner
                        .last_child()
                        .ok_or(Error::InternalConsistency("inner node has no children"))?;
                }
                Node::Leaf(leaf) => {
                    return leaf.max_key().ok_or(Error::InternalConsistency("empty leaf below a live node"));
                }
            }
        }
    }

    pub(crate) fn first_key(&self) -> Result<&K> {
        self.min_key(self.root.ok_or(Error::EmptyTree)?)
    }

    pub(crate) fn last_key(&self) -> Result<&K> {
        self.max_key(self.root.ok_or(Error::EmptyTree)?)
    }

    /// Stores the sibling produced by a split and returns the promoted key with
    /// the sibling's handle.
    fn alloc_sibling<N>(&mut self, split: SplitResult<K, N>, wrap: fn(N) -> Node<K, V>) -> SplitResult<K, Handle> {
        let sibling = self.nodes.alloc(wrap(split.sibling));
        trace!(target: "btree_index::split", sibling = sibling.to_index(), "split node");
        SplitResult {
            key: split.key,
            sibling,
        }
    }

    /// Replaces the root with a new inner node over the old root and its
    /// split-off sibling. The tree gains one level.
    fn grow_root(&mut self, old_root: Handle, split: SplitResult<K, Handle>) {
        let root = InnerNode::with_children(self.degree, old_root, split.key, split.sibling);
        let handle = self.nodes.alloc(Node::Inner(root));
        self.root = Some(handle);
        trace!(
            target: "btree_index::split",
            root = handle.to_index(),
            left = old_root.to_index(),
            right = split.sibling.to_index(),
            "grew new root"
        );
    }

    /// Replaces an emptied root: an inner root yields to its sole child, a leaf
    /// root leaves the tree empty. The tree loses one level.
    fn collapse_root(&mut self, root: Handle) -> Result<()> {
        match self.release(root)? {
            Node::Leaf(_) => {
                self.root = None;
                self.nodes.clear();
                trace!(target: "btree_index::collapse", "tree emptied");
            }
            Node::Inner(inner) => {
                let child = inner
                    .sole_child()
                    .ok_or(Error::InternalConsistency("emptied root has no surviving child"))?;
                self.root = Some(child);
                trace!(target: "btree_index::collapse", root = child.to_index(), "promoted sole child to root");
            }
        }
        Ok(())
    }
}

impl<K: Ord + Clone, V> RawBTree<K, V> {
    /// Walks from `root` to the leaf that owns `key`.
    fn descend<Q>(&self, root: Handle, key: &Q) -> Result<(Path, Handle)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path = Path::new();
        let mut current = root;
        loop {
            match self.node(current)? {
                Node::Inner(inner) => {
                    path.push(current);
                    current = inner.child_for_key(key);
                }
                Node::Leaf(_) => return Ok((path, current)),
            }
        }
    }

    pub(crate) fn find<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root.ok_or(Error::EmptyTree)?;
        loop {
            match self.node(current)? {
                Node::Inner(inner) => current = inner.child_for_key(key),
                Node::Leaf(leaf) => return leaf.find(key),
            }
        }
    }

    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<()> {
        let Some(root) = self.root else {
            let mut leaf = LeafNode::new(self.degree);
            leaf.insert(key, value)?;
            let handle = self.nodes.alloc(Node::Leaf(leaf));
            self.root = Some(handle);
            self.len = 1;
            trace!(target: "btree_index::insert", root = handle.to_index(), "planted root leaf");
            return Ok(());
        };

        let degree = self.degree;
        let (mut path, leaf) = self.descend(root, &key)?;
        let overflowing = {
            let node = self.leaf_mut(leaf)?;
            node.insert(key, value)?;
            node.is_over_capacity(degree)
        };
        self.len += 1;

        if !overflowing {
            return Ok(());
        }

        let split = self.leaf_mut(leaf)?.split();
        let mut split = self.alloc_sibling(split, Node::Leaf);
        let mut left = leaf;

        while let Some(parent) = path.pop() {
            let inner = self.inner_mut(parent)?;
            inner.add_child(split.key, split.sibling);
            if !inner.is_over_capacity(degree) {
                return Ok(());
            }

            let next = inner.split();
            split = self.alloc_sibling(next, Node::Inner);
            left = parent;
        }

        // The split reached the root.
        self.grow_root(left, split);
        Ok(())
    }

    pub(crate) fn delete<Q>(&mut self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(root) = self.root else {
            return Ok(false);
        };

        let (path, leaf) = self.descend(root, key)?;
        let emptied = {
            let node = self.leaf_mut(leaf)?;
            if !node.delete(key) {
                return Ok(false);
            }
            node.is_empty()
        };
        self.len -= 1;

        if emptied {
            self.collapse(leaf, path)?;
        }
        Ok(true)
    }

    /// Unwinds `path` after `leaf` lost its last entry, removing every node
    /// that ends up with no keys.
    fn collapse(&mut self, leaf: Handle, mut path: Path) -> Result<()> {
        let mut emptied = leaf;

        while self.node(emptied)?.is_empty() {
            let Some(parent) = path.pop() else {
                return self.collapse_root(emptied);
            };

            if self.node(emptied)?.is_leaf() {
                self.inner_mut(parent)?.delete_child(emptied)?;
                self.release(emptied)?;
                trace!(
                    target: "btree_index::collapse",
                    leaf = emptied.to_index(),
                    parent = parent.to_index(),
                    "removed empty leaf"
                );
            } else {
                self.fold_into_sibling(parent, emptied)?;
            }

            emptied = parent;
        }

        Ok(())
    }

    /// Removes the keyless inner node `emptied` from `parent` and hands its
    /// surviving child to the neighbour that took over its key range.
    fn fold_into_sibling(&mut self, parent: Handle, emptied: Handle) -> Result<()> {
        let degree = self.degree;

        let inner = self.inner_mut(parent)?;
        let position = inner.delete_child(emptied)?;
        // The first child's range passes right, any other's passes left.
        let sibling = inner.child(position.saturating_sub(1));

        let remain = match self.release(emptied)? {
            Node::Inner(node) => node
                .sole_child()
                .ok_or(Error::InternalConsistency("emptied inner node has no surviving child"))?,
            Node::Leaf(_) => return Err(Error::InternalConsistency("expected inner node")),
        };

        if position == 0 {
            let separator = self.min_key(sibling)?.clone();
            self.inner_mut(sibling)?.prepend_child(separator, remain);
        } else {
            let separator = self.min_key(remain)?.clone();
            self.inner_mut(sibling)?.add_child(separator, remain);
        }
        trace!(
            target: "btree_index::collapse",
            removed = emptied.to_index(),
            child = remain.to_index(),
            sibling = sibling.to_index(),
            "folded orphaned child into sibling"
        );

        let node = self.inner_mut(sibling)?;
        if node.is_over_capacity(degree) {
            let split = node.split();
            let split = self.alloc_sibling(split, Node::Inner);
            self.inner_mut(parent)?.add_child(split.key, split.sibling);
        }

        Ok(())
    }

    /// Walks the whole tree and reports the first broken invariant.
    pub(crate) fn validate(&self) -> Result<()> {
        struct Frame<'a, K> {
            handle: Handle,
            depth: usize,
            lower: Option<&'a K>,
            upper: Option<&'a K>,
        }

        let Some(root) = self.root else {
            if self.len != 0 || !self.nodes.is_empty() {
                return Err(Error::InternalConsistency("empty tree still holds entries"));
            }
            return Ok(());
        };

        let mut stack: Vec<Frame<'_, K>> = Vec::new();
        stack.push(Frame {
            handle: root,
            depth: 0,
            lower: None,
            upper: None,
        });

        let mut leaf_depth = None;
        let mut previous: Option<&K> = None;
        let mut entries = 0;
        let mut visited = 0;

        while let Some(frame) = stack.pop() {
            visited += 1;
            match self.node(frame.handle)? {
                Node::Leaf(leaf) => {
                    if *leaf_depth.get_or_insert(frame.depth) != frame.depth {
                        return Err(Error::InternalConsistency("leaves at different depths"));
                    }
                    if leaf.is_empty() {
                        return Err(Error::InternalConsistency("empty leaf persisted"));
                    }
                    if leaf.is_over_capacity(self.degree) {
                        return Err(Error::InternalConsistency("leaf over capacity"));
                    }
                    if leaf.entries().windows(2).any(|pair| pair[0] >= pair[1]) {
                        return Err(Error::InternalConsistency("leaf entries out of order"));
                    }

                    for entry in leaf.entries() {
                        if frame.lower.is_some_and(|lower| entry.key < *lower)
                            || frame.upper.is_some_and(|upper| entry.key >= *upper)
                        {
                            return Err(Error::InternalConsistency("key outside its separator range"));
                        }
                        if previous.is_some_and(|previous| *previous >= entry.key) {
                            return Err(Error::InternalConsistency("keys not strictly ascending"));
                        }
                        previous = Some(&entry.key);
                    }
                    entries += leaf.len();
                }
                Node::Inner(inner) => {
                    if inner.child_count() != inner.key_count() + 1 {
                        return Err(Error::InternalConsistency("separator and child counts disagree"));
                    }
                    if inner.is_empty() {
                        return Err(Error::InternalConsistency("empty inner node persisted"));
                    }
                    if inner.is_over_capacity(self.degree) {
                        return Err(Error::InternalConsistency("inner node over capacity"));
                    }
                    if inner.keys().windows(2).any(|pair| pair[0] >= pair[1]) {
                        return Err(Error::InternalConsistency("separators out of order"));
                    }

                    // Reverse order so the leftmost child is visited first.
                    let keys = inner.keys();
                    for (index, &child) in inner.children().iter().enumerate().rev() {
                        stack.push(Frame {
                            handle: child,
                            depth: frame.depth + 1,
                            lower: if index == 0 { frame.lower } else { Some(&keys[index - 1]) },
                            upper: keys.get(index).or(frame.upper),
                        });
                    }
                }
            }
        }

        if entries != self.len {
            return Err(Error::InternalConsistency("tracked length disagrees with stored entries"));
        }
        if visited != self.nodes.len() {
            return Err(Error::InternalConsistency("unreachable nodes left in the arena"));
        }
        Ok(())
    }
}

impl<K: fmt::Display, V: fmt::Display> RawBTree<K, V> {
    /// Writes one line per level, nodes left to right.
    pub(crate) fn fmt_levels(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.root else {
            return f.write_str("[Empty]");
        };

        let mut level = alloc::vec![root];
        let mut first_line = true;
        while !level.is_empty() {
            if !first_line {
                f.write_str("\n")?;
            }
            first_line = false;

            let mut next = Vec::new();
            for (index, &handle) in level.iter().enumerate() {
                if index > 0 {
                    f.write_str(" ")?;
                }
                let node = self.nodes.get(handle).ok_or(fmt::Error)?;
                write!(f, "{node}")?;
                if let Node::Inner(inner) = node {
                    next.extend_from_slice(inner.children());
                }
            }
            level = next;
        }
        Ok(())
    }
}
