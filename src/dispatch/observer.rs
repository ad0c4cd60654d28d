use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::dispatch_list::CycleId;
use super::dispatch_list::DispatchList;
use super::key_existence::intersects;
use crate::Record;

/// Callback invoked with the current store snapshot when one of the watched
/// keys changed.
///
/// Callbacks must not panic: a panic unwinds through `update_store` and the
/// rest of that dispatch cycle is skipped.
pub type ObserverFn = Arc<dyn Fn(&Record) + Send + Sync>;

/// Unique, monotonically assigned observer identity
pub type ObserverId = u64;

pub(crate) struct Observer {
    callback: ObserverFn,
    watched_keys: Vec<String>,
}

impl Observer {
    #[inline]
    fn watches_any(
        &self,
        updated_keys: &[String],
    ) -> bool {
        intersects(updated_keys, &self.watched_keys)
    }
}

impl fmt::Debug for Observer {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Observer")
            .field("watched_keys", &self.watched_keys)
            .finish_non_exhaustive()
    }
}

/// Ordered observers, each watching an explicit set of keys.
#[derive(Debug, Default)]
pub(crate) struct ObserverRegistry {
    observers: DispatchList<Observer>,
    next_id: ObserverId,
    next_cycle: CycleId,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(
        &mut self,
        callback: ObserverFn,
        watched_keys: Vec<String>,
    ) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;

        trace!(observer_id = id, ?watched_keys, "Observer registered");
        self.observers.push(id, Observer { callback, watched_keys });
        id
    }

    /// Returns `false` if the observer was already removed.
    pub(crate) fn remove(
        &mut self,
        id: ObserverId,
    ) -> bool {
        let removed = self.observers.remove(id).is_some();
        if removed {
            trace!(observer_id = id, "Observer removed");
        }
        removed
    }

    pub(crate) fn begin_cycle(&mut self) -> CycleId {
        let cycle = self.next_cycle;
        self.next_cycle += 1;
        self.observers.begin_cycle(cycle);
        cycle
    }

    /// Advance `cycle` to the next observer interested in any of
    /// `updated_keys`. Each observer is considered at most once per cycle.
    pub(crate) fn next_interested(
        &mut self,
        cycle: CycleId,
        updated_keys: &[String],
    ) -> Option<ObserverFn> {
        while let Some(observer) = self.observers.next_in_cycle(cycle) {
            if observer.watches_any(updated_keys) {
                return Some(observer.callback.clone());
            }
        }
        None
    }

    pub(crate) fn end_cycle(
        &mut self,
        cycle: CycleId,
    ) {
        self.observers.end_cycle(cycle);
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}
