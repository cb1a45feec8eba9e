//! Configuration management for the leak watcher.
//!
//! Two layers live here:
//! - [`LeakWatchSettings`]: host-level settings (process name, dump storage, simple-mode tick
//!   timings) loaded hierarchically from defaults, an optional file and environment variables.
//! - [`LeakWatcherConfig`] / [`WatchOptions`]: the per-enable request handed to
//!   `enable_leak_watcher`, normalized into an immutable [`ActiveConfig`].
mod app;
mod schedule;
mod storage;
mod watcher;
pub use app::*;
pub use schedule::*;
pub use storage::*;
pub use watcher::*;


use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

const ENV_PREFIX: &str = "LEAK_WATCH";

/// Main settings container for a watcher instance
///
/// Hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables prefixed with `LEAK_WATCH__` (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct LeakWatchSettings {
    /// Identity of the watched application process
    #[serde(default)]
    pub app: AppSettings,
    /// Where dump artifacts are written
    #[serde(default)]
    pub storage: StorageSettings,
    /// Tick timings used when no structured config overrides them
    #[serde(default)]
    pub schedule: ScheduleSettings,
}

impl Debug for LeakWatchSettings {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LeakWatchSettings")
            .field("process_name", &self.app.process_name)
            .field("dump_dir", &self.storage.dump_dir())
            .finish()
    }
}

impl LeakWatchSettings {
    /// Loads settings from hierarchical sources without validation.
    ///
    /// # Example
    /// ```ignore
    /// std::env::set_var("LEAK_WATCH__APP__PROCESS_NAME", "com.example.app");
    /// let settings = LeakWatchSettings::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let settings: Self = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Applies additional overrides from file; environment variables still win.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let settings: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Validates every section and returns the validated instance
    pub fn validate(self) -> Result<Self> {
        self.app.validate()?;
        self.storage.validate()?;
        self.schedule.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
