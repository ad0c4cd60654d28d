//! Store settings.
//!
//! Settings are layered with the following priority (lowest first):
//! 1. Default values (hardcoded)
//! 2. Optional TOML settings file
//! 3. Environment variables prefixed with `FLUXIBLE__`
//!    (e.g. `FLUXIBLE__PERSIST__DEBOUNCE_MS=50`)

mod persist;
pub use persist::*;

#[cfg(test)]
mod config_test;

//---
use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::SETTINGS_ENV_PREFIX;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StoreSettings {
    /// Persistence scheduler parameters
    #[serde(default)]
    pub persist: PersistSettings,
}

impl StoreSettings {
    /// Load settings from defaults, an optional file and the environment.
    ///
    /// # Arguments
    /// * `path` - Optional TOML file overriding the defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            config = config.add_source(File::with_name(path).required(true));
        }

        let settings: Self = config
            .add_source(
                Environment::with_prefix(SETTINGS_ENV_PREFIX)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Overlay an extra settings file on top of the current values
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let settings: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.persist.validate()
    }
}
