pub mod mem_storage;

pub use mem_storage::*;
