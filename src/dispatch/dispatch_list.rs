//! Compacting ordered list that stays consistent while it is being walked.
//!
//! Callbacks stored in the list may add or remove entries (including
//! themselves) while a dispatch over the same list is in flight. Every
//! in-flight dispatch owns a [`Cycle`]: the index of the next slot to visit and
//! the number of live slots it is allowed to visit, fixed when the cycle
//! started. Removals shift both markers of every cycle they precede; pushes
//! land past `end` and are only seen by later cycles.

/// Identifier of one in-flight dispatch over a [`DispatchList`]
pub(crate) type CycleId = u64;

#[derive(Debug)]
struct Slot<T> {
    id: u64,
    value: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cycle {
    id: CycleId,
    /// Index of the next slot to hand out
    next: usize,
    /// Live slots this cycle may still reach (exclusive upper bound)
    end: usize,
}

#[derive(Debug)]
pub(crate) struct DispatchList<T> {
    slots: Vec<Slot<T>>,
    cycles: Vec<Cycle>,
}

impl<T> Default for DispatchList<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            cycles: Vec::new(),
        }
    }
}

impl<T> DispatchList<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `id`. Ids must be unique within the list.
    pub(crate) fn push(
        &mut self,
        id: u64,
        value: T,
    ) {
        debug_assert!(!self.contains(id), "duplicate slot id {id}");
        self.slots.push(Slot { id, value });
    }

    /// Remove the slot registered under `id`, shifting every active cycle so
    /// none of them skips or repeats a slot.
    ///
    /// Returns `None` if no such slot exists (already removed).
    pub(crate) fn remove(
        &mut self,
        id: u64,
    ) -> Option<T> {
        let index = self.slots.iter().position(|slot| slot.id == id)?;
        let slot = self.slots.remove(index);

        for cycle in self.cycles.iter_mut() {
            if index < cycle.end {
                cycle.end -= 1;
                if index < cycle.next {
                    cycle.next -= 1;
                }
            }
        }

        Some(slot.value)
    }

    pub(crate) fn contains(
        &self,
        id: u64,
    ) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    /// Start a cycle over the slots that are live right now.
    pub(crate) fn begin_cycle(
        &mut self,
        id: CycleId,
    ) {
        self.cycles.push(Cycle {
            id,
            next: 0,
            end: self.slots.len(),
        });
    }

    /// Hand out the next slot of cycle `id`, or `None` once the cycle is
    /// exhausted or no longer known to this list.
    pub(crate) fn next_in_cycle(
        &mut self,
        id: CycleId,
    ) -> Option<&T> {
        let cycle = self.cycles.iter_mut().find(|cycle| cycle.id == id)?;
        if cycle.next >= cycle.end {
            return None;
        }

        let index = cycle.next;
        cycle.next += 1;
        self.slots.get(index).map(|slot| &slot.value)
    }

    /// Forget cycle `id`. Unknown ids are ignored.
    pub(crate) fn end_cycle(
        &mut self,
        id: CycleId,
    ) {
        self.cycles.retain(|cycle| cycle.id != id);
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn is_dispatching(&self) -> bool {
        !self.cycles.is_empty()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|slot| &slot.value)
    }
}
