use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::{Slot, SlotId};

/// Owns every slot, split into the ordered live window and a free-list.
///
/// Invariants:
/// - a slot id is in at most one of `ordered` / `free`;
/// - after reconciliation, `ordered` indexes are ascending with no gaps.
#[derive(Clone, Debug)]
pub(crate) struct SlotPool<T, N> {
    slots: Vec<Slot<T, N>>,
    vacant: Vec<SlotId>,
    pub(crate) ordered: VecDeque<SlotId>,
    pub(crate) free: VecDeque<SlotId>,
    created: usize,
}

impl<T, N> SlotPool<T, N> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            ordered: VecDeque::new(),
            free: VecDeque::new(),
            created: 0,
        }
    }

    pub(crate) fn slot(&self, id: SlotId) -> &Slot<T, N> {
        &self.slots[id.0]
    }

    pub(crate) fn slot_mut(&mut self, id: SlotId) -> &mut Slot<T, N> {
        &mut self.slots[id.0]
    }

    /// Pops the most recently freed slot when recycling, otherwise allocates.
    pub(crate) fn take_or_create(&mut self, recycle: bool) -> SlotId {
        if recycle {
            if let Some(id) = self.free.pop_back() {
                return id;
            }
        }
        self.create()
    }

    fn create(&mut self) -> SlotId {
        self.created += 1;
        if let Some(id) = self.vacant.pop() {
            return id;
        }
        self.slots.push(Slot::new());
        SlotId(self.slots.len() - 1)
    }

    /// Returns a slot's storage for reuse. The caller must have removed it from both lists.
    pub(crate) fn destroy(&mut self, id: SlotId) {
        self.slots[id.0].clear();
        self.vacant.push(id);
    }

    pub(crate) fn first_index(&self) -> Option<usize> {
        self.ordered.front().map(|&id| self.slot(id).index())
    }

    pub(crate) fn last_index(&self) -> Option<usize> {
        self.ordered.back().map(|&id| self.slot(id).index())
    }

    /// Slots currently alive (window + free-list).
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    /// Total number of slot allocations so far.
    pub(crate) fn created(&self) -> usize {
        self.created
    }

    /// Position of `id` in the window, if it is there. `ordered` holds consecutive indexes, so
    /// the slot's own index locates it.
    pub(crate) fn ordered_position(&self, id: SlotId) -> Option<usize> {
        let first = self.first_index()?;
        let pos = self.slot(id).index().checked_sub(first)?;
        (self.ordered.get(pos) == Some(&id)).then_some(pos)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
        self.ordered.clear();
        self.free.clear();
    }
}
