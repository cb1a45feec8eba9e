use std::fmt;
use std::sync::Arc;
use std::sync::Weak;

use dashmap::DashMap;
#[cfg(test)]
use mockall::automock;
use tracing::debug;
use tracing::trace;

use super::Watchable;

/// Invoked once with the tracking token after the object has been reclaimed
pub type ReclaimCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Observes object reclamation without keeping objects alive
#[cfg_attr(test, automock)]
pub trait WeakTracker: Send + Sync {
    /// Starts tracking `object`; a second call with the same token replaces the first
    fn track(
        &self,
        object: &Arc<dyn Watchable>,
        token: u64,
        on_reclaim: ReclaimCallback,
    );

    /// Drops every tracking entry without firing callbacks
    fn untrack_all(&self);
}

/// Requests a full collection from the host runtime
#[cfg_attr(test, automock)]
pub trait GarbageCollector: Send + Sync {
    fn force_full_gc(&self);
}

struct TrackedEntry {
    object: Weak<dyn Watchable>,
    on_reclaim: ReclaimCallback,
}

/// Tracker built on `std::sync::Weak`.
///
/// Rust reclaims an object as soon as its last strong reference drops; a sweep notices that
/// and fires the pending callbacks. Acting as the [`GarbageCollector`], a forced collection is
/// a sweep.
#[derive(Default)]
pub struct WeakRefTracker {
    entries: DashMap<u64, TrackedEntry>,
}

impl fmt::Debug for WeakRefTracker {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WeakRefTracker")
            .field("tracked", &self.entries.len())
            .finish()
    }
}

impl WeakRefTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked(&self) -> usize {
        self.entries.len()
    }

    /// Fires the callback of every tracked object that no longer exists.
    ///
    /// Callbacks run after their entry left the map, so they may call back into the tracker.
    pub fn sweep(&self) -> usize {
        let dead: Vec<u64> = self
            .entries
            .iter()
            .filter(|entry| entry.object.strong_count() == 0)
            .map(|entry| *entry.key())
            .collect();

        let mut reclaimed = 0;
        for token in dead {
            // The token may have been re-tracked for a live object since the scan
            let removed = self
                .entries
                .remove_if(&token, |_, entry| entry.object.strong_count() == 0);
            if let Some((_, entry)) = removed {
                trace!(token, "tracked object reclaimed");
                (entry.on_reclaim)(token);
                reclaimed += 1;
            }
        }
        reclaimed
    }
}

impl WeakTracker for WeakRefTracker {
    fn track(
        &self,
        object: &Arc<dyn Watchable>,
        token: u64,
        on_reclaim: ReclaimCallback,
    ) {
        self.entries.insert(
            token,
            TrackedEntry {
                object: Arc::downgrade(object),
                on_reclaim,
            },
        );
    }

    fn untrack_all(&self) {
        self.entries.clear();
    }
}

impl GarbageCollector for WeakRefTracker {
    fn force_full_gc(&self) {
        let reclaimed = self.sweep();
        debug!(reclaimed, remaining = self.entries.len(), "full collection");
    }
}
