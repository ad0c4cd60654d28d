use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_PERSIST_DEBOUNCE_MS;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PersistSettings {
    /// Quiet period (milliseconds) required after the last update before the
    /// persisted keys are written to the backing storage
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for PersistSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl PersistSettings {
    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(Error::config("persist.debounce_ms must be at least 1ms"));
        }
        Ok(())
    }

    #[inline]
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    DEFAULT_PERSIST_DEBOUNCE_MS
}
