use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage for tree nodes.
///
/// A released slot is parked on the free list and handed out again by the next
/// allocation, so handles stay dense while the tree grows and shrinks.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.to_index()] = Some(element);
            return handle;
        }

        // `slots.len() < Handle::MAX` keeps the new index addressable.
        assert!(
            self.slots.len() < Handle::MAX,
            "`Arena::alloc()` - arena is at maximum capacity ({})",
            Handle::MAX
        );
        self.slots.push(Some(element));
        Handle::from_index(self.slots.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.to_index()).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots.get_mut(handle.to_index()).and_then(Option::as_mut)
    }

    /// Removes the element, returning its slot to the free list.
    pub(crate) fn take(&mut self, handle: Handle) -> Option<T> {
        let element = self.slots.get_mut(handle.to_index())?.take()?;
        self.free.push(handle);
        Some(element)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn released_slot_is_reused() {
        let mut arena: Arena<&str> = Arena::new();
        let first = arena.alloc("leaf");
        let second = arena.alloc("inner");
        assert_eq!(arena.take(first), Some("leaf"));
        assert_eq!(arena.get(first), None);
        assert_eq!(arena.alloc("sibling"), first);
        assert_eq!(arena.get(second), Some(&"inner"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn double_take_is_rejected() {
        let mut arena: Arena<u32> = Arena::new();
        let handle = arena.alloc(7);
        assert_eq!(arena.take(handle), Some(7));
        assert_eq!(arena.take(handle), None);
        assert!(arena.is_empty());
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.alloc(value);
                        model.push((handle, value));
                    }
                    Operation::Replace(which, value) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        if let Some(slot) = arena.get_mut(handle) {
                            *slot = value;
                        }
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let (handle, expected) = model.swap_remove(index);
                        prop_assert_eq!(arena.take(handle), Some(expected));
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
                prop_assert_eq!(arena.is_empty(), model.is_empty());

                for &(handle, value) in &model {
                    prop_assert_eq!(arena.get(handle), Some(&value));
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        Replace(usize, u32),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::Replace(which, value)),
            8 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }
}
