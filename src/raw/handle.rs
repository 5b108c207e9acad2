use core::num::NonZero;

// Narrower under test so the capacity limit is reachable.
#[cfg(test)]
type Slot = u16;
#[cfg(not(test))]
type Slot = u32;

/// Names one node in a tree's arena.
///
/// The tree keeps its root as an `Option<Handle>`, absent when the tree is
/// empty, and inner nodes list their children as handles. Nodes have no
/// parent links; delete finds an emptied child in its parent by comparing
/// handles, so equality means "same arena slot" and nothing more.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<Slot>);

impl Handle {
    /// Largest arena index a handle can name.
    pub(crate) const MAX: usize = (Slot::MAX - 1) as usize;

    /// Handle for the arena slot at `index`. Stored offset by one so that
    /// zero stays free for the `None` root.
    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        let slot = (index + 1) as Slot;
        match NonZero::new(slot) {
            Some(slot) => Self(slot),
            None => panic!("`Handle::from_index()` - handle overflowed to zero!"),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
