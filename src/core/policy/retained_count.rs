use tracing::debug;

use super::AppState;
use super::Decision;
use super::PolicyContext;
use super::ThresholdPolicy;

/// Acts only once enough objects are retained for the current visibility.
///
/// Used by structured configurations. An unknown app state never acts; a live process in any
/// state other than foreground or background acts without a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetainedCountPolicy {
    visible_threshold: u32,
    invisible_threshold: u32,
}

impl RetainedCountPolicy {
    pub fn new(
        visible_threshold: u32,
        invisible_threshold: u32,
    ) -> Self {
        Self {
            visible_threshold,
            invisible_threshold,
        }
    }
}

impl ThresholdPolicy for RetainedCountPolicy {
    fn decide(
        &self,
        ctx: &PolicyContext,
    ) -> Decision {
        let threshold = match ctx.app_state {
            AppState::Unknown => {
                debug!(phase = ?ctx.phase, "app state unknown, skipping");
                return Decision::Skip;
            }
            AppState::Other => return Decision::Act,
            AppState::Foreground => self.visible_threshold,
            AppState::Background => self.invisible_threshold,
        };

        if (ctx.watch_count as u64) < u64::from(threshold) {
            debug!(
                phase = ?ctx.phase,
                watch_count = ctx.watch_count,
                threshold,
                "retained objects below threshold"
            );
            Decision::Skip
        } else {
            Decision::Act
        }
    }
}
