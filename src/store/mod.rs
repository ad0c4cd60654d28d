//! The store: mutation, observer notification, events and the persistence
//! wiring around them.

mod builder;
mod fluxible_store;
mod handles;
mod init;

pub use builder::*;
pub use fluxible_store::FluxibleStore;
pub use handles::*;
