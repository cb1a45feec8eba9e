//! Decision policies consulted on every collect and dump tick.
mod retained_count;
mod unconditional;
pub use retained_count::*;
pub use unconditional::*;

#[cfg(test)]
mod policy_test;

use std::collections::HashSet;

use crate::WatchedObject;

/// Visibility of the watched application at the time of a collect tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    Foreground,
    Background,
    /// Process exists but is neither foreground nor background
    Other,
    /// Process missing or the query failed
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    /// Deciding whether to force a full collection
    Collect,
    /// Deciding whether to write a dump
    Dump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Act,
}

impl Decision {
    pub fn is_act(&self) -> bool {
        matches!(self, Decision::Act)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyContext {
    pub phase: TickPhase,
    /// Registry size on collect; survivors of the last collection on dump
    pub watch_count: usize,
    pub app_state: AppState,
}

pub trait ThresholdPolicy: Send + Sync {
    fn decide(
        &self,
        ctx: &PolicyContext,
    ) -> Decision;
}

/// Entries of `after` whose hash was already present in `before`
pub fn survivors(
    before: &[WatchedObject],
    after: &[WatchedObject],
) -> Vec<WatchedObject> {
    let before: HashSet<u64> = before.iter().map(|o| o.hash).collect();
    after
        .iter()
        .filter(|o| before.contains(&o.hash))
        .cloned()
        .collect()
}
