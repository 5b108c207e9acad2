use core::fmt;

use crate::error::{Error, Result};

/// The maximum number of keys a node may hold before it must split.
///
/// Every node of a tree shares the same degree, fixed when the tree is built.
///
/// # Examples
///
/// ```
/// use btree_index::{BTree, Degree};
///
/// let degree = Degree::new(3).unwrap();
/// let tree: BTree<u32, &str> = BTree::with_degree(degree);
/// assert_eq!(tree.max_entries(), 3);
///
/// assert!(Degree::new(1).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Degree(usize);

impl Degree {
    /// The smallest supported degree. A degree of one would split inner nodes
    /// into a keyless half.
    pub const MIN: usize = 2;

    /// The degree used by [`Default`].
    pub const DEFAULT: Self = Self(128);

    /// Validates `max_entries` as a degree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDegree`] if `max_entries < Degree::MIN`.
    pub const fn new(max_entries: usize) -> Result<Self> {
        if max_entries < Self::MIN {
            return Err(Error::InvalidDegree {
                max_entries,
                min: Self::MIN,
            });
        }
        Ok(Self(max_entries))
    }

    /// Returns the maximum number of keys per node.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for Degree {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for Degree {
    type Error = Error;

    fn try_from(max_entries: usize) -> Result<Self> {
        Self::new(max_entries)
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
