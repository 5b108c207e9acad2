/// Errors reported by [`BTree`](crate::BTree) operations.
///
/// `DuplicateKey`, `KeyNotFound` and `EmptyTree` are caller errors and leave the
/// tree untouched. `InternalConsistency` means a structural invariant is already
/// broken; there is no recovery from it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum Error {
    /// The key being inserted is already present.
    #[error("key is already present in the tree")]
    DuplicateKey,
    /// The key being looked up is not present.
    #[error("key was not found in the tree")]
    KeyNotFound,
    /// The tree holds no entries.
    #[error("tree is empty")]
    EmptyTree,
    /// The requested degree is below the supported minimum.
    #[error("max entries must be at least {min}, got {max_entries}")]
    InvalidDegree {
        /// The rejected value.
        max_entries: usize,
        /// The smallest accepted value.
        min: usize,
    },
    /// A structural invariant was found broken.
    #[error("tree invariant violated: {0}")]
    InternalConsistency(&'static str),
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;
