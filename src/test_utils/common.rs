use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::Value;

use crate::FluxibleStore;
use crate::Record;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// `json!({...})` object into a [`Record`]
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(record) => record,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Store without persistence seeded with `initial`
pub fn plain_store(initial: Value) -> FluxibleStore {
    FluxibleStore::builder(record(initial)).build().expect("build store")
}

/// Shared call counter for callbacks
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
