use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::trace;

use super::IdentityHasher;
use super::WeakTracker;
use super::Watchable;
use crate::Result;
use crate::StorageError;

/// Descriptor of one watched object, as written into leak lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedObject {
    pub hash: u64,
    pub name: String,
    pub msg: String,
}

struct RegistryEntry {
    seq: u64,
    object: WatchedObject,
}

/// Live watched objects keyed by identity hash.
///
/// Entries disappear when their object is reclaimed or when the registry is cleared.
/// Registering an object again replaces its descriptor.
pub struct WatchRegistry {
    entries: Arc<DashMap<u64, RegistryEntry>>,
    hasher: Arc<dyn IdentityHasher>,
    tracker: Arc<dyn WeakTracker>,
    next_seq: AtomicU64,
}

impl fmt::Debug for WatchRegistry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WatchRegistry")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl WatchRegistry {
    pub fn new(
        hasher: Arc<dyn IdentityHasher>,
        tracker: Arc<dyn WeakTracker>,
    ) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            hasher,
            tracker,
            next_seq: AtomicU64::new(0),
        }
    }

    /// Registers `object`, returning its descriptor.
    ///
    /// A missing object registers nothing.
    pub fn register(
        &self,
        object: Option<&Arc<dyn Watchable>>,
        message: &str,
    ) -> Option<WatchedObject> {
        let object = object?;
        let hash = self.hasher.hash(object);
        let descriptor = WatchedObject {
            hash,
            name: object.type_name().to_string(),
            msg: message.to_string(),
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            hash,
            RegistryEntry {
                seq,
                object: descriptor.clone(),
            },
        );

        let entries = Arc::downgrade(&self.entries);
        self.tracker.track(
            object,
            hash,
            Arc::new(move |token| {
                if let Some(entries) = entries.upgrade() {
                    if entries.remove(&token).is_some() {
                        trace!(token, "watched object reclaimed");
                    }
                }
            }),
        );

        debug!(hash, name = %descriptor.name, msg = %descriptor.msg, "watching object");
        Some(descriptor)
    }

    /// Snapshot of every live entry in registration order
    pub fn current_list(&self) -> Vec<WatchedObject> {
        let mut entries: Vec<(u64, WatchedObject)> = self
            .entries
            .iter()
            .map(|entry| (entry.seq, entry.object.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, object)| object).collect()
    }

    /// The current list as a JSON array
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.current_list()).map_err(|e| StorageError::Manifest(e).into())
    }

    pub fn contains(
        &self,
        hash: u64,
    ) -> bool {
        self.entries.contains_key(&hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry and stops tracking their objects
    pub fn clear(&self) {
        self.tracker.untrack_all();
        self.entries.clear();
    }
}
