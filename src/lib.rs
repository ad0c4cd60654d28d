//! In-memory key-value store with selective observers, a synthetic event bus
//! and debounced persistence to a pluggable key-value backend.
//!
//! ```ignore
//! let store = FluxibleStore::builder(initial).build()?;
//! let handle = store.add_observer(|store| println!("{store:?}"), ["count"]);
//! store.update_store(partial);
//! handle.unsubscribe();
//! ```

mod config;
mod constants;
mod dispatch;
mod errors;
mod persist;
mod storage;
mod store;

pub use config::*;
pub use constants::STORAGE_KEY;
pub use dispatch::*;
pub use errors::*;
pub use persist::*;
pub use storage::*;
pub use store::*;

/// Dynamically typed store record: key to JSON value
pub type Record = serde_json::Map<String, serde_json::Value>;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
