use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::ScheduleSettings;
use crate::constants::DEFAULT_CHECK_INTERVAL_MS;
use crate::constants::DEFAULT_DUMP_HEAP_WAIT_TIME_MS;
use crate::constants::DEFAULT_MAX_STORED_HEAP_DUMPS;
use crate::constants::DEFAULT_RETAINED_INVISIBLE_THRESHOLD;
use crate::constants::DEFAULT_RETAINED_VISIBLE_THRESHOLD;
use crate::Error;
use crate::Result;
use crate::RetainedCountPolicy;
use crate::ThresholdPolicy;
use crate::TickIntervals;
use crate::UnconditionalPolicy;
use crate::WatchFilter;

/// Categories of objects the host can report when they are torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WatchTarget {
    CustomComponent,
    Window,
    NodeContainer,
    XComponent,
    Ability,
}

impl WatchTarget {
    pub const ALL: [WatchTarget; 5] = [
        WatchTarget::CustomComponent,
        WatchTarget::Window,
        WatchTarget::NodeContainer,
        WatchTarget::XComponent,
        WatchTarget::Ability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchTarget::CustomComponent => "CustomComponent",
            WatchTarget::Window => "Window",
            WatchTarget::NodeContainer => "NodeContainer",
            WatchTarget::XComponent => "XComponent",
            WatchTarget::Ability => "Ability",
        }
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        WatchTarget::ALL
            .into_iter()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| Error::ConfigInvalid(format!("unknown watch target `{s}`")))
    }
}

/// Structured leak watcher configuration, in the shape hosts send it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakWatcherConfig {
    /// Single watch target token; empty means every target
    #[serde(default)]
    pub object_watcher: String,

    /// Native ids of the only objects of interest; empty means no restriction
    #[serde(default, rename = "objectUniqueIDs")]
    pub object_unique_ids: Vec<u64>,

    /// GC tick period (ms)
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,

    /// Survivors needed to act while the app is in the foreground
    #[serde(default = "default_retained_visible_threshold")]
    pub retained_visible_threshold: u32,

    /// Survivors needed to act while the app is in the background
    #[serde(default = "default_retained_invisible_threshold")]
    pub retained_invisible_threshold: u32,

    /// Dumps kept on disk; each dump is a manifest plus a snapshot file
    #[serde(default = "default_max_stored_heap_dumps")]
    pub max_stored_heap_dumps: u32,

    /// Delay between a GC tick and its dump tick (ms), must be below `check_interval`
    #[serde(default = "default_dump_heap_wait_time_ms")]
    pub dump_heap_wait_time_ms: u64,

    /// Type names ignored unless their id is allow-listed (case-insensitive)
    #[serde(default)]
    pub white_list: Vec<String>,
}

impl Default for LeakWatcherConfig {
    fn default() -> Self {
        Self {
            object_watcher: String::new(),
            object_unique_ids: Vec::new(),
            check_interval: default_check_interval(),
            retained_visible_threshold: default_retained_visible_threshold(),
            retained_invisible_threshold: default_retained_invisible_threshold(),
            max_stored_heap_dumps: default_max_stored_heap_dumps(),
            dump_heap_wait_time_ms: default_dump_heap_wait_time_ms(),
            white_list: Vec::new(),
        }
    }
}

impl LeakWatcherConfig {
    /// Tick intervals after substituting defaults for an unusable pair
    pub fn effective_intervals(&self) -> TickIntervals {
        if self.check_interval > 0
            && self.dump_heap_wait_time_ms > 0
            && self.dump_heap_wait_time_ms < self.check_interval
        {
            TickIntervals {
                gc_interval: Duration::from_millis(self.check_interval),
                dump_delay: Duration::from_millis(self.dump_heap_wait_time_ms),
            }
        } else {
            warn!(
                check_interval = self.check_interval,
                dump_heap_wait_time_ms = self.dump_heap_wait_time_ms,
                "invalid check interval / dump wait pair, using defaults"
            );
            TickIntervals {
                gc_interval: Duration::from_millis(DEFAULT_CHECK_INTERVAL_MS),
                dump_delay: Duration::from_millis(DEFAULT_DUMP_HEAP_WAIT_TIME_MS),
            }
        }
    }

    /// Retention limit in files: two files per stored dump
    pub fn effective_max_stored_files(&self) -> usize {
        let dumps = if self.max_stored_heap_dumps == 0 {
            DEFAULT_MAX_STORED_HEAP_DUMPS
        } else {
            self.max_stored_heap_dumps
        };
        dumps as usize * 2
    }

    /// The watch target token after id restriction is taken into account
    pub fn effective_object_watcher(&self) -> &str {
        if self.object_unique_ids.is_empty() {
            &self.object_watcher
        } else {
            WatchTarget::CustomComponent.as_str()
        }
    }
}

fn default_check_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL_MS
}
fn default_retained_visible_threshold() -> u32 {
    DEFAULT_RETAINED_VISIBLE_THRESHOLD
}
fn default_retained_invisible_threshold() -> u32 {
    DEFAULT_RETAINED_INVISIBLE_THRESHOLD
}
fn default_max_stored_heap_dumps() -> u32 {
    DEFAULT_MAX_STORED_HEAP_DUMPS
}
fn default_dump_heap_wait_time_ms() -> u64 {
    DEFAULT_DUMP_HEAP_WAIT_TIME_MS
}

/// What `enable_leak_watcher` was asked to watch
#[derive(Debug, Clone, PartialEq)]
pub enum WatchOptions {
    /// Plain list of watch target tokens; thresholds are bypassed
    Targets(Vec<String>),
    /// Full configuration object
    Config(LeakWatcherConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Simple,
    Structured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub visible: u32,
    pub invisible: u32,
}

/// Normalized, immutable configuration of one enabled session
#[derive(Debug, Clone)]
pub struct ActiveConfig {
    pub mode: WatchMode,
    pub targets: Vec<WatchTarget>,
    pub filter: WatchFilter,
    pub thresholds: Thresholds,
    pub intervals: TickIntervals,
    pub max_stored_files: usize,
}

impl ActiveConfig {
    /// Validates and normalizes an enable request.
    ///
    /// Only an unrecognized watch target is rejected; every other unusable value is replaced by
    /// its default.
    pub fn from_options(
        options: &WatchOptions,
        schedule: &ScheduleSettings,
    ) -> Result<Self> {
        let active = match options {
            WatchOptions::Targets(tokens) => ActiveConfig {
                mode: WatchMode::Simple,
                targets: parse_targets(tokens)?,
                filter: WatchFilter::default(),
                thresholds: Thresholds {
                    visible: DEFAULT_RETAINED_VISIBLE_THRESHOLD,
                    invisible: DEFAULT_RETAINED_INVISIBLE_THRESHOLD,
                },
                intervals: schedule.intervals(),
                max_stored_files: DEFAULT_MAX_STORED_HEAP_DUMPS as usize * 2,
            },
            WatchOptions::Config(config) => {
                let watcher = config.effective_object_watcher();
                let tokens: Vec<String> = if watcher.is_empty() {
                    Vec::new()
                } else {
                    vec![watcher.to_string()]
                };
                ActiveConfig {
                    mode: WatchMode::Structured,
                    targets: parse_targets(&tokens)?,
                    filter: WatchFilter::new(
                        config.object_unique_ids.iter().copied(),
                        config.white_list.iter().map(String::as_str),
                    ),
                    thresholds: Thresholds {
                        visible: config.retained_visible_threshold,
                        invisible: config.retained_invisible_threshold,
                    },
                    intervals: config.effective_intervals(),
                    max_stored_files: config.effective_max_stored_files(),
                }
            }
        };
        debug!(?active, "normalized leak watcher config");
        Ok(active)
    }

    /// Decision policy matching the configuration mode
    pub fn policy(&self) -> Arc<dyn ThresholdPolicy> {
        match self.mode {
            WatchMode::Simple => Arc::new(UnconditionalPolicy),
            WatchMode::Structured => Arc::new(RetainedCountPolicy::new(
                self.thresholds.visible,
                self.thresholds.invisible,
            )),
        }
    }

    pub fn is_structured(&self) -> bool {
        self.mode == WatchMode::Structured
    }
}

/// Parses watch target tokens; an empty list selects every target
pub fn parse_targets(tokens: &[String]) -> Result<Vec<WatchTarget>> {
    if tokens.is_empty() {
        return Ok(WatchTarget::ALL.to_vec());
    }
    let mut targets = Vec::with_capacity(tokens.len());
    for token in tokens {
        let target: WatchTarget = token.parse()?;
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    Ok(targets)
}
