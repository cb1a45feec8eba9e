//! Leak watching for managed application runtimes.
//!
//! Objects the host reports as torn down are watched through weak references. On a timer the
//! watcher decides whether enough of them are retained to force a full collection, and whether
//! the survivors justify a heap dump. Dumps are written as a snapshot plus a leak-list manifest
//! and kept under a bounded retention limit.
mod config;
mod constants;
mod core;
mod errors;
pub mod utils;
mod watcher;

pub use crate::config::*;
pub use crate::core::*;
pub use errors::*;
pub use utils::*;
pub use watcher::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
