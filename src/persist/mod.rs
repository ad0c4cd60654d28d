//! Debounced persistence of the persisted key subset.

mod persist_config;
mod scheduler;

pub use persist_config::*;
pub(crate) use scheduler::*;

#[cfg(test)]
mod scheduler_test;
