use alloc::vec::Vec;

use super::handle::Handle;

/// Dense slot storage addressed by [`Handle`].
///
/// The arena is the sole owner of every node in a tree. Freed slots go on a free
/// list and are handed out again by the next [`Arena::alloc`].
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

    /// Number of live elements.
    #[cfg(test)]
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.to_index()] = Some(element);
            return handle;
        }

        assert!(
            self.slots.len() <= Handle::MAX,
            "`Arena::alloc()` - arena is at maximum capacity ({})",
            Handle::MAX
        );
        self.slots.push(Some(element));
        Handle::from_index(self.slots.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match self.slots.get(handle.to_index()) {
            Some(Some(element)) => element,
            _ => panic!("`Arena::get()` - {handle:?} is not live"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match self.slots.get_mut(handle.to_index()) {
            Some(Some(element)) => element,
            _ => panic!("`Arena::get_mut()` - {handle:?} is not live"),
        }
    }

    /// Removes the element and recycles its slot.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let Some(element) = self.slots.get_mut(handle.to_index()).and_then(Option::take) else {
            panic!("`Arena::take()` - {handle:?} is not live");
        };
        self.free.push(handle);
        element
    }

    pub(crate) fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
