use std::collections::VecDeque;

use tokio::time::Instant;

use super::TickIntervals;

/// Deadlines of the next collect tick and of every dump tick still pending
#[derive(Clone, Debug)]
pub struct TickTimer {
    intervals: TickIntervals,
    gc_deadline: Instant,
    dump_deadlines: VecDeque<Instant>,
}

impl TickTimer {
    pub fn new(intervals: TickIntervals) -> Self {
        Self {
            intervals,
            gc_deadline: Instant::now() + intervals.gc_interval,
            dump_deadlines: VecDeque::new(),
        }
    }

    pub fn gc_deadline(&self) -> Instant {
        self.gc_deadline
    }

    pub fn next_dump_deadline(&self) -> Option<Instant> {
        self.dump_deadlines.front().copied()
    }

    pub fn pending_dumps(&self) -> usize {
        self.dump_deadlines.len()
    }

    /// Called once a collect tick has been handled: reschedules the next collect and queues the
    /// dump that follows this one
    pub fn collect_done(&mut self) {
        let now = Instant::now();
        self.gc_deadline = now + self.intervals.gc_interval;
        self.dump_deadlines.push_back(now + self.intervals.dump_delay);
    }

    pub fn pop_dump(&mut self) -> Option<Instant> {
        self.dump_deadlines.pop_front()
    }
}
