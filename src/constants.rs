//! Wire-level constants shared by the persistence layer.

/// Key under which the persisted record is read from and written to the
/// backing storage. Other implementations read the same key, so it must not
/// change.
pub const STORAGE_KEY: &str = "fluxible-js";

/// Quiet period after the last update before a pending write is issued.
pub(crate) const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 200;

/// Env var prefix used by [`crate::StoreSettings::load`]
pub(crate) const SETTINGS_ENV_PREFIX: &str = "FLUXIBLE";
