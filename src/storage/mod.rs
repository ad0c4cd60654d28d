//! Backing storage boundary for persistence.
//!
//! The store only ever talks to a backend through [`SyncStorage`] or
//! [`AsyncStorage`], always under [`crate::STORAGE_KEY`]. Shipped adaptors
//! are `MemoryStorage`, `AsyncMemoryStorage` and `SledStorage`.

mod adaptors;
mod backend;
mod codec;

pub use adaptors::*;
pub use backend::*;
pub(crate) use codec::*;
