use core::fmt;

/// A handle to a node slot in an [`Arena`].
///
/// Handles are plain indices. Holding one conveys no ownership; a node is live for as long as it
/// is reachable from the tree root, and its slot is reclaimed explicitly when it is unlinked.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    fn from_index(index: usize) -> NodeId {
        NodeId(u32::try_from(index).expect("arena index exceeds u32::MAX"))
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Growable slot storage with a free list of reclaimed slots.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<NodeId>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Returns the number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn alloc(&mut self, element: T) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.slots[id.index()].is_none());
                self.slots[id.index()] = Some(element);
                id
            }
            None => {
                let id = NodeId::from_index(self.slots.len());
                self.slots.push(Some(element));
                id
            }
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &T {
        self.slots[id.index()]
            .as_ref()
            .expect("`Arena::get()` - slot is vacant")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        self.slots[id.index()]
            .as_mut()
            .expect("`Arena::get_mut()` - slot is vacant")
    }

    /// Removes the element at `id`, returning it and reclaiming the slot.
    pub(crate) fn take(&mut self, id: NodeId) -> T {
        let element = self.slots[id.index()]
            .take()
            .expect("`Arena::take()` - slot is vacant");
        self.free.push(id);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
