use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::ActiveConfig;
use crate::AppState;
use crate::ThresholdPolicy;
use crate::WatchedObject;

/// Receives `[manifest, snapshot]` after every automatic dump
pub type DumpCallback = Arc<dyn Fn(Vec<PathBuf>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Disabled,
    /// Transient while an enable request is being applied
    Enabling,
    Enabled,
}

/// What the last collect tick saw, consumed by the dump tick that follows it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSnapshot {
    /// Watch list before the collection
    pub leak_list: Vec<WatchedObject>,
    pub app_state: AppState,
    /// Whether a full collection was forced
    pub collected: bool,
}

/// Everything one enable call established; replaced wholesale on the next one
pub(crate) struct Session {
    pub(crate) epoch: u64,
    pub(crate) config: ActiveConfig,
    pub(crate) policy: Arc<dyn ThresholdPolicy>,
    pub(crate) callback: DumpCallback,
    pub(crate) dump_dir: PathBuf,
}

impl fmt::Debug for Session {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Session")
            .field("epoch", &self.epoch)
            .field("config", &self.config)
            .field("dump_dir", &self.dump_dir)
            .finish()
    }
}
