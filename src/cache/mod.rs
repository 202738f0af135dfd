// src/cache/mod.rs

//! Hash-based incremental cache.
//!
//! Each mode owns one partition under a shared cache root:
//!
//! ```text
//! .packwatch/cache/
//!   dev/fingerprint
//!   prod/fingerprint
//! ```
//!
//! - [`fingerprint`] computes and persists the content-hash summary of an
//!   invocation's input set.
//! - [`store`] wraps an invocation in `run_if_changed`, skipping it when
//!   the fingerprint is unchanged.
//! - [`clean`] reconciles the on-disk partitions: modes are mutually
//!   exclusive, so at most one mode's artifacts occupy disk space.

pub mod clean;
pub mod fingerprint;
pub mod store;

pub use clean::clean_preserving;
pub use fingerprint::Fingerprint;
pub use store::{CacheOutcome, CacheStore};
