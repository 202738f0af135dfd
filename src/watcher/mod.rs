// src/watcher/mod.rs

//! Watch-process lifecycle.
//!
//! File watching itself is delegated entirely to the bundler subprocess;
//! this module only manages that subprocess's lifetime. [`WatchManager`]
//! is the single place a watch process can be started or stopped from.

pub mod manager;

pub use manager::WatchManager;
