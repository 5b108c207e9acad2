use core::borrow::Borrow;
use core::fmt;

use crate::degree::Degree;
use crate::error::Result;
use crate::raw::RawBTree;

/// An ordered key/value index based on a [B-Tree].
///
/// Every node holds at most [`max_entries`](BTree::max_entries) keys. Values
/// live only in the leaves; inner nodes hold separator keys that route each
/// lookup to exactly one child. All leaves sit at the same depth.
///
/// Inserting into a full leaf splits it and promotes a separator into its
/// parent, which may split in turn; when the root splits the tree grows by one
/// level. Deleting never rebalances partially filled nodes. A node is only
/// removed once it holds no keys at all, and when the root is left with a
/// single child that child becomes the new root.
///
/// It is a logic error for a key to be modified in such a way that the key's
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the tree.
///
/// [B-Tree]: https://en.wikipedia.org/wiki/B-tree
///
/// # Examples
///
/// ```
/// use btree_index::{BTree, Error};
///
/// let mut stock = BTree::new(4);
///
/// stock.insert("apples", 12)?;
/// stock.insert("pears", 4)?;
/// stock.insert("plums", 0)?;
///
/// // Keys are unique.
/// assert_eq!(stock.insert("pears", 9), Err(Error::DuplicateKey));
/// assert_eq!(stock.find("pears"), Ok(&4));
///
/// // Misses are reported, not panicked on.
/// assert_eq!(stock.find("quinces"), Err(Error::KeyNotFound));
///
/// assert!(stock.delete("plums"));
/// assert!(!stock.delete("plums"));
/// assert_eq!(stock.len(), 2);
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone)]
pub struct BTree<K, V> {
    raw: RawBTree<K, V>,
}

impl<K, V> BTree<K, V> {
    /// Makes a new, empty `BTree` whose nodes hold at most `max_entries` keys.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is below [`Degree::MIN`]. Use
    /// [`BTree::with_degree`] to validate the value up front.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(3);
    ///
    /// // entries can now be inserted into the empty tree
    /// tree.insert(1, "a").unwrap();
    /// ```
    #[must_use]
    pub const fn new(max_entries: usize) -> Self {
        match Degree::new(max_entries) {
            Ok(degree) => Self::with_degree(degree),
            Err(_) => panic!("`BTree::new()` - max entries must be at least `Degree::MIN`!"),
        }
    }

    /// Makes a new, empty `BTree` with an already validated degree.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::{BTree, Degree};
    ///
    /// let degree = Degree::try_from(16)?;
    /// let tree: BTree<u64, u64> = BTree::with_degree(degree);
    /// assert_eq!(tree.max_entries(), 16);
    /// # Ok::<(), btree_index::Error>(())
    /// ```
    #[must_use]
    pub const fn with_degree(degree: Degree) -> Self {
        Self {
            raw: RawBTree::new(degree),
        }
    }

    /// Returns the number of entries in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(3);
    /// assert!(tree.is_empty());
    /// tree.insert(1, "a").unwrap();
    /// assert!(!tree.is_empty());
    /// ```
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of node levels, leaves included. An empty tree has
    /// height zero and a tree whose root is a leaf has height one.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(3);
    /// assert_eq!(tree.height(), 0);
    ///
    /// for key in [10, 20, 30] {
    ///     tree.insert(key, ()).unwrap();
    /// }
    /// assert_eq!(tree.height(), 1);
    ///
    /// // The fourth key overflows the root leaf.
    /// tree.insert(40, ()).unwrap();
    /// assert_eq!(tree.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the maximum number of keys a node holds before it splits.
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.raw.degree().get()
    }

    /// Returns the degree the tree was built with.
    #[must_use]
    pub const fn degree(&self) -> Degree {
        self.raw.degree()
    }
}

impl<K: Ord + Clone, V> BTree<K, V> {
    /// Inserts a key/value pair into the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`](crate::Error::DuplicateKey) if the key
    /// is already present. The stored value is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::{BTree, Error};
    ///
    /// let mut tree = BTree::new(3);
    /// assert_eq!(tree.insert(37, "a"), Ok(()));
    /// assert_eq!(tree.insert(37, "b"), Err(Error::DuplicateKey));
    /// assert_eq!(tree.find(&37), Ok(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        self.raw.insert(key, value)
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// The key may be any borrowed form of the tree's key type, but the
    /// ordering on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`](crate::Error::EmptyTree) if the tree holds
    /// no entries and [`Error::KeyNotFound`](crate::Error::KeyNotFound) if the
    /// key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::{BTree, Error};
    ///
    /// let mut tree = BTree::new(3);
    /// assert_eq!(tree.find(&1), Err(Error::EmptyTree));
    ///
    /// tree.insert(1, "a")?;
    /// assert_eq!(tree.find(&1), Ok(&"a"));
    /// assert_eq!(tree.find(&2), Err(Error::KeyNotFound));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key)
    }

    /// Removes `key` from the tree, returning `true` if it was present.
    ///
    /// A miss leaves the tree untouched. Nodes left without keys are removed,
    /// which may shrink the tree by one level.
    ///
    /// # Panics
    ///
    /// Panics if the tree's structure is found to be corrupt while removing
    /// emptied nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::{BTree, Error};
    ///
    /// let mut tree = BTree::new(3);
    /// tree.insert(1, "a")?;
    /// assert!(tree.delete(&1));
    /// assert!(!tree.delete(&1));
    /// assert_eq!(tree.find(&1), Err(Error::EmptyTree));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.raw.delete(key) {
            Ok(removed) => removed,
            Err(err) => panic!("`BTree::delete()` - {err}"),
        }
    }

    /// Returns the smallest key in the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`](crate::Error::EmptyTree) if the tree holds
    /// no entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::{BTree, Error};
    ///
    /// let mut tree = BTree::new(3);
    /// assert_eq!(tree.min_key(), Err(Error::EmptyTree));
    /// for key in [30, 10, 20] {
    ///     tree.insert(key, ())?;
    /// }
    /// assert_eq!(tree.min_key(), Ok(&10));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn min_key(&self) -> Result<&K> {
        self.raw.first_key()
    }

    /// Returns the largest key in the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`](crate::Error::EmptyTree) if the tree holds
    /// no entries.
    pub fn max_key(&self) -> Result<&K> {
        self.raw.last_key()
    }

    /// Checks every structural invariant of the tree: separator and child
    /// counts agree, keys ascend strictly and stay inside the range their
    /// ancestors route to them, all leaves share one depth, no node is empty
    /// or over capacity, and the tracked length matches the stored entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalConsistency`](crate::Error::InternalConsistency)
    /// naming the first violation found.
    ///
    /// # Examples
    ///
    /// ```
    /// use btree_index::BTree;
    ///
    /// let mut tree = BTree::new(2);
    /// for key in 0..100 {
    ///     tree.insert(key, key).unwrap();
    /// }
    /// assert_eq!(tree.validate(), Ok(()));
    /// ```
    pub fn validate(&self) -> Result<()> {
        self.raw.validate()
    }
}

impl<K, V> Default for BTree<K, V> {
    /// Creates an empty `BTree` with [`Degree::DEFAULT`].
    fn default() -> Self {
        Self::with_degree(Degree::DEFAULT)
    }
}

impl<K, V> fmt::Debug for BTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BTree")
            .field("len", &self.len())
            .field("height", &self.height())
            .field("max_entries", &self.max_entries())
            .finish()
    }
}

/// Renders the tree one level per line, nodes left to right.
///
/// ```
/// use btree_index::BTree;
///
/// let mut tree = BTree::new(3);
/// assert_eq!(tree.to_string(), "[Empty]");
///
/// for key in [10, 20, 30, 70, 60] {
///     tree.insert(key, key * 10).unwrap();
/// }
/// assert_eq!(
///     tree.to_string(),
///     "[Inner: [30]]\n[Leaf: [(10->100), (20->200)]] [Leaf: [(30->300), (60->600), (70->700)]]"
/// );
/// ```
impl<K: fmt::Display, V: fmt::Display> fmt::Display for BTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt_levels(f)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::Error;
    use alloc::format;
    use alloc::string::{String, ToString};
    use pretty_assertions::assert_eq;

    #[test]
    #[should_panic(expected = "`BTree::new()` - max entries must be at least `Degree::MIN`!")]
    fn new_rejects_degree_one() {
        let _: BTree<u8, u8> = BTree::new(1);
    }

    #[test]
    fn default_uses_default_degree() {
        let tree: BTree<u8, u8> = BTree::default();
        assert_eq!(tree.max_entries(), Degree::DEFAULT.get());
        assert!(tree.is_empty());
        assert_eq!(tree.to_string(), "[Empty]");
    }

    #[test]
    fn debug_summarises_shape() {
        let mut tree = BTree::new(3);
        for key in [10, 20, 30, 70, 60] {
            tree.insert(key, ()).unwrap();
        }
        assert_eq!(format!("{tree:?}"), "BTree { len: 5, height: 2, max_entries: 3 }");
    }

    #[test]
    fn borrowed_lookups() {
        let mut tree: BTree<String, u32> = BTree::new(2);
        for (index, name) in ["delta", "alpha", "echo", "charlie", "bravo"].into_iter().enumerate() {
            tree.insert(name.to_string(), u32::try_from(index).unwrap()).unwrap();
        }

        assert_eq!(tree.find("alpha"), Ok(&1));
        assert_eq!(tree.find("foxtrot"), Err(Error::KeyNotFound));
        assert_eq!(tree.min_key().map(String::as_str), Ok("alpha"));
        assert_eq!(tree.max_key().map(String::as_str), Ok("echo"));

        assert!(tree.delete("charlie"));
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn clone_is_independent() {
        let mut original = BTree::new(3);
        for key in 0..20 {
            original.insert(key, key).unwrap();
        }

        let mut copy = original.clone();
        for key in 0..10 {
            assert!(copy.delete(&key));
        }
        copy.insert(100, 100).unwrap();

        assert_eq!(original.len(), 20);
        assert_eq!(original.find(&5), Ok(&5));
        assert_eq!(original.find(&100), Err(Error::KeyNotFound));
        assert_eq!(copy.find(&5), Err(Error::KeyNotFound));
        assert_eq!(original.validate(), Ok(()));
        assert_eq!(copy.validate(), Ok(()));
    }
}
