//! Cache replacement-policy engine for set-associative cache simulators.
//!
//! This crate implements the victim-selection and state-update logic a host
//! simulator calls on every cache access:
//! 1. **Baselines:** True LRU stack and random replacement.
//! 2. **SHiP:** Per-instruction signature counters steering insertion into the LRU stack.
//! 3. **RRIP:** Re-reference prediction values with whole-set ageing.
//! 4. **Set dueling:** Leader sets voting between LRU and MRU insertion.
//! 5. **Support:** Configuration, statistics, and error types.
//!
//! The host simulator owns trace replay, tags, and timing; one
//! [`ReplacementState`] models the replacement hardware of one cache level.

/// Common types shared with the host (addresses, access data, errors).
pub mod common;
/// Replacement engine configuration (defaults, enums, JSON loading).
pub mod config;
/// Per-level replacement state, line metadata, and policies.
pub mod cache;
/// Replacement statistics collection and reporting.
pub mod stats;

/// Per-level replacement state; construct with `ReplacementState::new`.
pub use crate::cache::ReplacementState;
/// Error type returned by fallible engine calls.
pub use crate::common::ReplError;
/// Root configuration type; use `ReplacementConfig::default()` or deserialize from JSON.
pub use crate::config::ReplacementConfig;
