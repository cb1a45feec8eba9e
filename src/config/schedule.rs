use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::constants::DEFAULT_DUMP_DELAY_MS;
use crate::constants::DEFAULT_GC_INTERVAL_MS;
use crate::Error;
use crate::Result;
use crate::TickIntervals;

/// Tick timings for simple mode, where the request carries no intervals of its own
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScheduleSettings {
    #[serde(default = "default_gc_interval_ms")]
    pub gc_interval_ms: u64,

    /// Delay between a GC tick and the dump tick it schedules
    #[serde(default = "default_dump_delay_ms")]
    pub dump_delay_ms: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            gc_interval_ms: default_gc_interval_ms(),
            dump_delay_ms: default_dump_delay_ms(),
        }
    }
}

impl ScheduleSettings {
    /// Simple-mode tick intervals; a zero value falls back to its default
    pub fn intervals(&self) -> TickIntervals {
        let gc_interval_ms =
            non_zero_or(self.gc_interval_ms, DEFAULT_GC_INTERVAL_MS, "gc_interval_ms");
        let dump_delay_ms =
            non_zero_or(self.dump_delay_ms, DEFAULT_DUMP_DELAY_MS, "dump_delay_ms");
        TickIntervals {
            gc_interval: Duration::from_millis(gc_interval_ms),
            dump_delay: Duration::from_millis(dump_delay_ms),
        }
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.gc_interval_ms == 0 {
            return Err(Error::Settings(ConfigError::Message(
                "gc_interval_ms cannot be 0".into(),
            )));
        }
        if self.dump_delay_ms == 0 {
            return Err(Error::Settings(ConfigError::Message(
                "dump_delay_ms cannot be 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_gc_interval_ms() -> u64 {
    DEFAULT_GC_INTERVAL_MS
}
fn default_dump_delay_ms() -> u64 {
    DEFAULT_DUMP_DELAY_MS
}

fn non_zero_or(
    value: u64,
    default: u64,
    field: &str,
) -> u64 {
    if value == 0 {
        warn!(field, default, "zero tick interval, using default");
        default
    } else {
        value
    }
}
