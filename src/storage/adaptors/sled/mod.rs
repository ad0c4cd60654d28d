mod sled_storage;

pub use sled_storage::*;
