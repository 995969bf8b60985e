//! Common types shared by the replacement engine and its host.
//!
//! This module provides the vocabulary of the host contract:
//! 1. **Address Types:** Strong types for physical addresses and instruction pointers.
//! 2. **Access Data:** Access kinds, line states, and the per-call argument structs.
//! 3. **Error Handling:** The engine's error enum.

/// Physical address and instruction pointer types.
pub mod addr;

/// Per-access data passed by the host.
pub mod data;

/// Error type for construction and per-access validation.
pub mod error;

pub use addr::{Pc, PhysAddr};
pub use data::{Access, AccessSource, AccessType, LineState, VictimQuery};
pub use error::ReplError;
