//! Unsubscribe handles returned by registrations.
//!
//! Handles only hold a weak reference to the store: keeping one alive does not
//! keep the store alive, and dropping one does not unsubscribe.

use std::sync::Weak;

use super::fluxible_store::StoreInner;
use crate::ListenerId;
use crate::ObserverId;

/// Returned by [`crate::FluxibleStore::add_observer`]
#[derive(Debug, Clone)]
pub struct ObserverHandle {
    inner: Weak<StoreInner>,
    id: ObserverId,
}

impl ObserverHandle {
    pub(crate) fn new(
        inner: Weak<StoreInner>,
        id: ObserverId,
    ) -> Self {
        Self { inner, id }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Remove the observer. Safe to call from inside any callback, including
    /// the observer's own; calling it again is a no-op returning `false`.
    pub fn unsubscribe(&self) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = inner.state.lock().observers.remove(self.id);
        removed
    }
}

/// Returned by [`crate::FluxibleStore::add_event`]
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    inner: Weak<StoreInner>,
    event: String,
    id: ListenerId,
}

impl ListenerHandle {
    pub(crate) fn new(
        inner: Weak<StoreInner>,
        event: String,
        id: ListenerId,
    ) -> Self {
        Self { inner, event, id }
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    /// Remove this registration. Returns whether anything was removed:
    /// `false` once already removed or after the whole event was removed.
    pub fn unsubscribe(&self) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = inner.state.lock().events.remove_listener(&self.event, self.id);
        removed
    }
}

/// Returned by [`crate::FluxibleStore::add_events`]: one registration per event
#[derive(Debug, Clone)]
pub struct ListenersHandle {
    handles: Vec<ListenerHandle>,
}

impl ListenersHandle {
    pub(crate) fn new(handles: Vec<ListenerHandle>) -> Self {
        Self { handles }
    }

    pub fn handles(&self) -> &[ListenerHandle] {
        &self.handles
    }

    /// Remove every registration; returns how many were still present.
    pub fn unsubscribe(&self) -> usize {
        self.handles.iter().filter(|handle| handle.unsubscribe()).count()
    }
}
