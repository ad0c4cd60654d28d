use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use super::dispatch_list::CycleId;
use super::dispatch_list::DispatchList;
use crate::Record;

/// Listener invoked with `(payload, store snapshot, event name)`.
///
/// Same contract as observers: a panicking listener aborts the rest of the
/// emit.
pub type ListenerFn = Arc<dyn Fn(Option<&Value>, &Record, &str) + Send + Sync>;

/// Per-registration listener identity
pub type ListenerId = u64;

pub(crate) struct Listener {
    callback: ListenerFn,
}

impl fmt::Debug for Listener {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Listener").finish_non_exhaustive()
    }
}

/// Named synthetic events, each with its listeners in registration order.
///
/// Independent from store mutation: events only fire when application code
/// emits them.
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    events: HashMap<String, DispatchList<Listener>>,
    next_id: ListenerId,
    // Shared by every event so a cycle id stays unique even when an event is
    // removed and registered again while it is being emitted
    next_cycle: CycleId,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(
        &mut self,
        event: &str,
        callback: ListenerFn,
    ) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;

        self.events
            .entry(event.to_string())
            .or_insert_with(DispatchList::new)
            .push(id, Listener { callback });

        trace!(listener_id = id, event, "Listener registered");
        id
    }

    /// Remove one registration. Returns `false` when the listener or the
    /// whole event is already gone.
    pub(crate) fn remove_listener(
        &mut self,
        event: &str,
        id: ListenerId,
    ) -> bool {
        let removed = self
            .events
            .get_mut(event)
            .and_then(|listeners| listeners.remove(id))
            .is_some();
        if removed {
            trace!(listener_id = id, event, "Listener removed");
        }
        removed
    }

    /// Drop every listener of `event`. Returns `false` for unknown events.
    pub(crate) fn remove_event(
        &mut self,
        event: &str,
    ) -> bool {
        self.events.remove(event).is_some()
    }

    /// Start emitting `event`; `None` if nobody ever registered for it.
    pub(crate) fn begin_cycle(
        &mut self,
        event: &str,
    ) -> Option<CycleId> {
        let listeners = self.events.get_mut(event)?;

        let cycle = self.next_cycle;
        self.next_cycle += 1;
        listeners.begin_cycle(cycle);
        Some(cycle)
    }

    pub(crate) fn next_listener(
        &mut self,
        event: &str,
        cycle: CycleId,
    ) -> Option<ListenerFn> {
        self.events
            .get_mut(event)?
            .next_in_cycle(cycle)
            .map(|listener| listener.callback.clone())
    }

    pub(crate) fn end_cycle(
        &mut self,
        event: &str,
        cycle: CycleId,
    ) {
        if let Some(listeners) = self.events.get_mut(event) {
            listeners.end_cycle(cycle);
        }
    }

    pub(crate) fn listener_count(
        &self,
        event: &str,
    ) -> Option<usize> {
        self.events.get(event).map(|listeners| listeners.len())
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn is_emitting(
        &self,
        event: &str,
    ) -> bool {
        self.events.get(event).is_some_and(|listeners| listeners.is_dispatching())
    }
}
