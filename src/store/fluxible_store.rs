use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::trace;

use super::handles::ListenerHandle;
use super::handles::ListenersHandle;
use super::handles::ObserverHandle;
use super::StoreBuilder;
use crate::encode_record;
use crate::ArmedWrite;
use crate::CycleId;
use crate::Error;
use crate::EventBus;
use crate::ListenerFn;
use crate::ObserverRegistry;
use crate::PersistScheduler;
use crate::Record;
use crate::Result;
use crate::SavedBlob;
use crate::StorageBackend;
use crate::StorageError;
use crate::STORAGE_KEY;

/// Progress of the one-time initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InitStatus {
    /// Waiting for the asynchronous backend to return the saved record
    Pending,
    Ready,
    Failed(String),
}

/// Persistence state, present only when a backend was configured
#[derive(Debug)]
pub(crate) struct Persistence {
    pub(crate) backend: StorageBackend,
    pub(crate) stringify: bool,
    /// `None` until the saved record has been restored
    pub(crate) persisted_keys: Option<Vec<String>>,
    pub(crate) scheduler: PersistScheduler,
}

impl Persistence {
    #[inline]
    fn tracks(
        &self,
        key: &str,
    ) -> bool {
        self.persisted_keys
            .as_ref()
            .is_some_and(|keys| keys.iter().any(|persisted| persisted == key))
    }
}

#[derive(Debug)]
pub(crate) struct StoreState {
    /// Copy-on-write: snapshots handed out keep the record they were taken from
    pub(crate) store: Arc<Record>,
    pub(crate) observers: ObserverRegistry,
    pub(crate) events: EventBus,
    pub(crate) persistence: Option<Persistence>,
}

#[derive(Debug)]
pub(crate) struct StoreInner {
    pub(crate) state: Mutex<StoreState>,
    /// Runtime the persistence timers are spawned on
    pub(crate) runtime: Option<Handle>,
    pub(crate) init_status: watch::Sender<InitStatus>,
}

/// Handle to one store instance.
///
/// Cloning is cheap and every clone refers to the same store. All callbacks
/// run on the caller's thread, inside `update_store` / `emit_event`, with no
/// internal lock held, so they may call back into the store.
#[derive(Debug, Clone)]
pub struct FluxibleStore {
    pub(crate) inner: Arc<StoreInner>,
}

impl FluxibleStore {
    pub fn builder(initial_store: Record) -> StoreBuilder {
        StoreBuilder::new(initial_store)
    }

    /// Read-only snapshot of the current store
    pub fn store(&self) -> Arc<Record> {
        self.inner.state.lock().store.clone()
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<Value> {
        self.inner.state.lock().store.get(key).cloned()
    }

    /// Merge `partial` into the store and notify the observers watching any
    /// of its keys, each at most once.
    ///
    /// Every call restarts the persistence debounce window; a write is armed
    /// when a persisted key changed since the last write.
    pub fn update_store(
        &self,
        partial: Record,
    ) {
        let updated_keys: Vec<String> = partial.keys().cloned().collect();

        let cycle = {
            let mut state = self.inner.state.lock();
            let StoreState {
                store, persistence, ..
            } = &mut *state;

            if let Some(persistence) = persistence.as_mut() {
                persistence.scheduler.cancel();
            }

            let record = Arc::make_mut(store);
            for (key, value) in partial {
                if let Some(persistence) = persistence.as_mut() {
                    if !persistence.scheduler.is_dirty() && persistence.tracks(&key) {
                        persistence.scheduler.mark_dirty();
                    }
                }
                record.insert(key, value);
            }

            state.observers.begin_cycle()
        };

        trace!(?updated_keys, cycle, "Store updated");
        self.notify_observers(cycle, &updated_keys);

        let armed = self
            .inner
            .state
            .lock()
            .persistence
            .as_mut()
            .and_then(|persistence| persistence.scheduler.arm());
        if let Some(armed) = armed {
            self.spawn_persist(armed);
        }
    }

    fn notify_observers(
        &self,
        cycle: CycleId,
        updated_keys: &[String],
    ) {
        let _guard = DispatchGuard {
            inner: &self.inner,
            target: DispatchTarget::Observers,
            cycle,
        };

        loop {
            let next = {
                let mut state = self.inner.state.lock();
                state
                    .observers
                    .next_interested(cycle, updated_keys)
                    .map(|callback| (callback, state.store.clone()))
            };

            match next {
                Some((callback, snapshot)) => callback(&snapshot),
                None => break,
            }
        }
    }

    /// Watch `keys`; `callback` runs after any `update_store` touching at
    /// least one of them.
    pub fn add_observer<F, I, K>(
        &self,
        callback: F,
        keys: I,
    ) -> ObserverHandle
    where
        F: Fn(&Record) + Send + Sync + 'static,
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let watched_keys = keys.into_iter().map(Into::into).collect();
        let id = self.inner.state.lock().observers.add(Arc::new(callback), watched_keys);

        ObserverHandle::new(Arc::downgrade(&self.inner), id)
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.inner.state.lock().observers.len()
    }

    pub fn add_event<F>(
        &self,
        event: &str,
        callback: F,
    ) -> ListenerHandle
    where
        F: Fn(Option<&Value>, &Record, &str) + Send + Sync + 'static,
    {
        self.add_listener(event, Arc::new(callback))
    }

    /// Register the same callback under every name in `events`.
    pub fn add_events<F, I, E>(
        &self,
        events: I,
        callback: F,
    ) -> ListenersHandle
    where
        F: Fn(Option<&Value>, &Record, &str) + Send + Sync + 'static,
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let callback: ListenerFn = Arc::new(callback);
        let handles = events
            .into_iter()
            .map(|event| self.add_listener(event.as_ref(), callback.clone()))
            .collect();

        ListenersHandle::new(handles)
    }

    fn add_listener(
        &self,
        event: &str,
        callback: ListenerFn,
    ) -> ListenerHandle {
        let id = self.inner.state.lock().events.add(event, callback);
        ListenerHandle::new(Arc::downgrade(&self.inner), event.to_string(), id)
    }

    /// Drop every listener of `event`. Returns `false` for unknown events.
    pub fn remove_event(
        &self,
        event: &str,
    ) -> bool {
        let removed = self.inner.state.lock().events.remove_event(event);
        if removed {
            debug!(event, "Event removed");
        }
        removed
    }

    pub fn remove_events<I, E>(
        &self,
        events: I,
    ) where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        for event in events {
            self.remove_event(event.as_ref());
        }
    }

    /// Number of listeners under `event`, `None` if it is unknown
    pub fn listener_count(
        &self,
        event: &str,
    ) -> Option<usize> {
        self.inner.state.lock().events.listener_count(event)
    }

    /// Invoke the listeners of `event` in registration order.
    ///
    /// Returns `None` when the event is unknown, otherwise how many listeners
    /// ran. Listeners registered while the emit is running only see later
    /// emits.
    pub fn emit_event(
        &self,
        event: &str,
        payload: Option<Value>,
    ) -> Option<usize> {
        self.emit(event, payload.as_ref())
    }

    /// Emit the same payload to every event in `events`, in order.
    pub fn emit_events<I, E>(
        &self,
        events: I,
        payload: Option<Value>,
    ) where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        for event in events {
            self.emit(event.as_ref(), payload.as_ref());
        }
    }

    fn emit(
        &self,
        event: &str,
        payload: Option<&Value>,
    ) -> Option<usize> {
        let cycle = self.inner.state.lock().events.begin_cycle(event);
        let Some(cycle) = cycle else {
            trace!(event, "Emit on unknown event");
            return None;
        };

        let _guard = DispatchGuard {
            inner: &self.inner,
            target: DispatchTarget::Event(event),
            cycle,
        };

        let mut invoked = 0;
        loop {
            let next = {
                let mut state = self.inner.state.lock();
                state
                    .events
                    .next_listener(event, cycle)
                    .map(|listener| (listener, state.store.clone()))
            };

            match next {
                Some((listener, snapshot)) => {
                    listener(payload, &snapshot, event);
                    invoked += 1;
                }
                None => break,
            }
        }

        trace!(event, invoked, "Event emitted");
        Some(invoked)
    }

    /// Keys participating in persistence; `None` without persistence or while
    /// the asynchronous restore is still running.
    pub fn persisted_keys(&self) -> Option<Vec<String>> {
        self.inner
            .state
            .lock()
            .persistence
            .as_ref()
            .and_then(|persistence| persistence.persisted_keys.clone())
    }

    /// Wait until initialization finished.
    ///
    /// Resolves immediately unless an asynchronous backend is still restoring;
    /// surfaces the restore failure if it did not succeed.
    pub async fn ready(&self) -> Result<()> {
        let mut status = self.inner.init_status.subscribe();
        let status = status
            .wait_for(|status| *status != InitStatus::Pending)
            .await
            .map_err(|_| Error::Fatal("store dropped during initialization".into()))?
            .clone();

        match status {
            InitStatus::Failed(reason) => Err(StorageError::RestoreFailed(reason).into()),
            _ => Ok(()),
        }
    }

    /// Write the pending persisted record right away instead of waiting for
    /// the debounce window. Does nothing when no write is outstanding.
    pub async fn flush(&self) -> Result<()> {
        if let Some((backend, blob)) = self.inner.claim_write(|scheduler| scheduler.settle_now())? {
            debug!("Flushing persisted store");
            backend.write(STORAGE_KEY, blob).await?;
        }
        Ok(())
    }

    fn spawn_persist(
        &self,
        armed: ArmedWrite,
    ) {
        let Some(runtime) = self.inner.runtime.as_ref() else {
            error!("Persistence armed without a runtime; write skipped");
            return;
        };

        let inner = Arc::downgrade(&self.inner);
        runtime.spawn(async move {
            tokio::select! {
                _ = armed.token.cancelled() => {}
                _ = tokio::time::sleep(armed.window) => {
                    if let Some(inner) = inner.upgrade() {
                        inner.persist_if_current(armed.generation).await;
                    }
                }
            }
        });
    }
}

impl StoreInner {
    /// Snapshot the persisted keys if `claim` grants the write.
    fn claim_write<F>(
        &self,
        claim: F,
    ) -> Result<Option<(StorageBackend, SavedBlob)>>
    where
        F: FnOnce(&mut PersistScheduler) -> bool,
    {
        let mut state = self.state.lock();
        let StoreState {
            store, persistence, ..
        } = &mut *state;

        let Some(persistence) = persistence.as_mut() else {
            return Ok(None);
        };
        if !claim(&mut persistence.scheduler) {
            return Ok(None);
        }

        // Read at write time, not at arm time
        let to_save: Record = persistence
            .persisted_keys
            .iter()
            .flatten()
            .filter_map(|key| store.get(key).map(|value| (key.clone(), value.clone())))
            .collect();

        let blob = encode_record(to_save, persistence.stringify)?;
        Ok(Some((persistence.backend.clone(), blob)))
    }

    async fn persist_if_current(
        &self,
        generation: u64,
    ) {
        match self.claim_write(|scheduler| scheduler.settle(generation)) {
            Ok(Some((backend, blob))) => {
                debug!(generation, "Persisting store");
                if let Err(e) = backend.write(STORAGE_KEY, blob).await {
                    error!(generation, "Persisting store failed: {:?}", e);
                }
            }
            Ok(None) => trace!(generation, "Superseded persist timer"),
            Err(e) => error!(generation, "Encoding persisted store failed: {:?}", e),
        }
    }
}

enum DispatchTarget<'a> {
    Observers,
    Event(&'a str),
}

/// Releases a dispatch cycle, also when a callback unwinds.
struct DispatchGuard<'a> {
    inner: &'a StoreInner,
    target: DispatchTarget<'a>,
    cycle: CycleId,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        match self.target {
            DispatchTarget::Observers => state.observers.end_cycle(self.cycle),
            DispatchTarget::Event(event) => state.events.end_cycle(event, self.cycle),
        }
    }
}
