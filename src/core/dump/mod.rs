//! Heap dump production.
//!
//! A dump is a pair of files sharing one timestamp token: the snapshot written by the host's
//! native primitive and a `.jsleaklist` manifest tying the snapshot checksum to the leak list
//! captured at dump time.
mod coordinator;
mod manifest;
mod raw_heap;
mod snapshotter;
pub use coordinator::*;
pub use manifest::*;
pub use raw_heap::*;
pub use snapshotter::*;
