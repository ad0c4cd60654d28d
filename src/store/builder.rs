//! Assembles a [`FluxibleStore`].
//!
//! ## Example
//! ```ignore
//! let store = StoreBuilder::new(initial_store)
//!     .persist(PersistConfig::sync(storage, |saved| pick_user(saved)))
//!     .on_init(|store| println!("restored: {store:?}"))
//!     .build()?;
//! ```
//!
//! Initialization never notifies observers or listeners. The init callback
//! runs exactly once after the store is fully initialized, whichever
//! persistence mode is configured, and never if initialization fails.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::warn;

use super::fluxible_store::InitStatus;
use super::fluxible_store::Persistence;
use super::fluxible_store::StoreInner;
use super::fluxible_store::StoreState;
use super::init::apply_restored_since;
use super::init::decode_saved;
use super::init::restore_input;
use super::init::restore_into;
use crate::AsyncStorage;
use crate::Error;
use crate::EventBus;
use crate::FluxibleStore;
use crate::ObserverRegistry;
use crate::PersistConfig;
use crate::PersistScheduler;
use crate::Record;
use crate::RestoreFn;
use crate::Result;
use crate::StorageBackend;
use crate::StoreSettings;
use crate::STORAGE_KEY;

/// Runs once initialization completed, with the initialized store.
pub type InitCallback = Box<dyn FnOnce(&Record) + Send>;

/// Plain initialization input, see [`create_store`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Seed values; the store starts as a copy of them
    pub initial_store: Record,
    pub persist: Option<PersistConfig>,
}

/// Build a store from `config`, running `init_callback` once initialized.
pub fn create_store(
    config: Config,
    init_callback: Option<InitCallback>,
) -> Result<FluxibleStore> {
    let mut builder = StoreBuilder::new(config.initial_store);
    if let Some(persist) = config.persist {
        builder = builder.persist(persist);
    }
    builder.init_callback = init_callback;
    builder.build()
}

pub struct StoreBuilder {
    initial_store: Record,
    persist: Option<PersistConfig>,
    settings: StoreSettings,
    init_callback: Option<InitCallback>,
}

impl StoreBuilder {
    pub fn new(initial_store: Record) -> Self {
        Self {
            initial_store,
            persist: None,
            settings: StoreSettings::default(),
            init_callback: None,
        }
    }

    pub fn persist(
        mut self,
        persist: PersistConfig,
    ) -> Self {
        self.persist = Some(persist);
        self
    }

    pub fn settings(
        mut self,
        settings: StoreSettings,
    ) -> Self {
        self.settings = settings;
        self
    }

    pub fn on_init<F>(
        mut self,
        callback: F,
    ) -> Self
    where
        F: FnOnce(&Record) + Send + 'static,
    {
        self.init_callback = Some(Box::new(callback));
        self
    }

    /// Assemble the store.
    ///
    /// With a synchronous backend the saved record is restored before this
    /// returns, and backend or decoding failures are returned here. With an
    /// asynchronous backend the restore runs in the background; see
    /// [`FluxibleStore::ready`].
    ///
    /// Persistence timers run on the current tokio runtime, so configuring
    /// persistence outside of one is an error.
    pub fn build(self) -> Result<FluxibleStore> {
        let StoreBuilder {
            initial_store,
            persist,
            settings,
            init_callback,
        } = self;
        settings.validate()?;

        let runtime = Handle::try_current().ok();
        let mut store = initial_store;
        let mut pending_restore = None;

        let persistence = match persist {
            None => None,
            Some(persist) => {
                if runtime.is_none() {
                    return Err(Error::config("persistence requires a running tokio runtime"));
                }

                let persisted_keys = match &persist.backend {
                    StorageBackend::Sync(storage) => {
                        let saved = storage.get_item(STORAGE_KEY)?;
                        Some(restore_into(&mut store, saved, &persist.restore)?)
                    }
                    StorageBackend::Async(storage) => {
                        pending_restore = Some((storage.clone(), persist.restore.clone()));
                        None
                    }
                };

                Some(Persistence {
                    backend: persist.backend,
                    stringify: persist.stringify,
                    persisted_keys,
                    scheduler: PersistScheduler::new(settings.persist.debounce_window()),
                })
            }
        };

        let initial_status = if pending_restore.is_some() { InitStatus::Pending } else { InitStatus::Ready };
        let (init_status, _) = watch::channel(initial_status);

        let inner = Arc::new(StoreInner {
            state: Mutex::new(StoreState {
                store: Arc::new(store),
                observers: ObserverRegistry::new(),
                events: EventBus::new(),
                persistence,
            }),
            runtime,
            init_status,
        });
        let fluxible = FluxibleStore { inner };

        match (pending_restore, fluxible.inner.runtime.as_ref()) {
            (Some((storage, restore)), Some(runtime)) => {
                debug!("Restoring persisted store in the background");
                runtime.spawn(restore_async(
                    fluxible.clone(),
                    storage,
                    restore,
                    init_callback,
                ));
            }
            _ => {
                debug!("Store initialized");
                if let Some(callback) = init_callback {
                    callback(&fluxible.store());
                }
            }
        }

        Ok(fluxible)
    }
}

async fn restore_async(
    fluxible: FluxibleStore,
    storage: Arc<dyn AsyncStorage>,
    restore: RestoreFn,
    init_callback: Option<InitCallback>,
) {
    let status = match try_restore_async(&fluxible, storage, restore).await {
        Ok(()) => {
            if let Some(callback) = init_callback {
                callback(&fluxible.store());
            }
            InitStatus::Ready
        }
        Err(e) => {
            error!("Restoring persisted store failed: {:?}", e);
            InitStatus::Failed(e.to_string())
        }
    };

    fluxible.inner.init_status.send_replace(status);
}

async fn try_restore_async(
    fluxible: &FluxibleStore,
    storage: Arc<dyn AsyncStorage>,
    restore: RestoreFn,
) -> Result<()> {
    let saved = decode_saved(storage.get_item(STORAGE_KEY).await?)?;

    // Merge over the store as it is now: updates may have landed meanwhile
    let snapshot = fluxible.store();
    let restored = restore(restore_input(&snapshot, saved.as_ref()));

    let mut state = fluxible.inner.state.lock();
    let StoreState {
        store, persistence, ..
    } = &mut *state;

    let persisted_keys = apply_restored_since(Arc::make_mut(store), restored, &snapshot, saved.as_ref());
    match persistence.as_mut() {
        Some(persistence) => persistence.persisted_keys = Some(persisted_keys),
        None => warn!("Restore finished on a store without persistence"),
    }
    Ok(())
}
