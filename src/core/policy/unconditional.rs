use super::Decision;
use super::PolicyContext;
use super::ThresholdPolicy;
use super::TickPhase;

/// Simple-mode policy: always collect, dump whenever anything is watched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnconditionalPolicy;

impl ThresholdPolicy for UnconditionalPolicy {
    fn decide(
        &self,
        ctx: &PolicyContext,
    ) -> Decision {
        match ctx.phase {
            TickPhase::Collect => Decision::Act,
            TickPhase::Dump if ctx.watch_count > 0 => Decision::Act,
            TickPhase::Dump => Decision::Skip,
        }
    }
}
