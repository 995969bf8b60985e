//! Per-access data exchanged with the host simulator.
//!
//! The host describes every call with the same vocabulary: which set and way,
//! the state of the line involved, who issued the request and whether it hit.

use super::addr::{Pc, PhysAddr};
use super::error::ReplError;

/// Kind of memory reference that caused a cache access.
///
/// Numeric ids follow the host's order: 0 fetch, 1 load, 2 store, 3 prefetch,
/// 4 writeback (see `TryFrom<u32>`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Instruction fetch.
    Fetch,
    /// Data load.
    #[default]
    Load,
    /// Data store.
    Store,
    /// Hardware prefetch request.
    Prefetch,
    /// Writeback of a dirty line from an upper level.
    Writeback,
}

impl TryFrom<u32> for AccessType {
    type Error = ReplError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Self::Fetch),
            1 => Ok(Self::Load),
            2 => Ok(Self::Store),
            3 => Ok(Self::Prefetch),
            4 => Ok(Self::Writeback),
            other => Err(ReplError::UnknownAccessType(other)),
        }
    }
}

/// Component that issued the access, as numbered by the host.
///
/// The engine does not interpret the value; it is carried for logging only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AccessSource(pub u32);

impl From<u32> for AccessSource {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Host-visible state of one physical cache line.
///
/// Only `tag` is consulted by the engine (it keys the insertion-signature map);
/// the remaining bits mirror what the host keeps per line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineState {
    /// Address tag currently held by the line.
    pub tag: u64,
    /// Whether the line holds valid data.
    pub valid: bool,
    /// Whether the line has been written since it was filled.
    pub dirty: bool,
}

impl LineState {
    /// Creates a valid, clean line holding `tag`.
    pub const fn valid(tag: u64) -> Self {
        Self {
            tag,
            valid: true,
            dirty: false,
        }
    }
}

/// A completed cache access, reported after every hit or fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Access {
    /// Set index of the access.
    pub set: usize,
    /// Way that was hit, or that was just filled on a miss.
    pub way: usize,
    /// State of the line at `way` after the access.
    pub line: LineState,
    /// Hardware thread that issued the access.
    pub thread_id: u32,
    /// Instruction pointer of the access.
    pub pc: Pc,
    /// Kind of reference.
    pub access_type: AccessType,
    /// `true` on a hit, `false` when `way` was refilled.
    pub hit: bool,
    /// Issuing component.
    pub source: AccessSource,
}

impl Access {
    /// Describes a hit on `way` of `set` by the instruction at `pc`.
    pub const fn hit(set: usize, way: usize, tag: u64, pc: u64) -> Self {
        Self::new(set, way, tag, pc, true)
    }

    /// Describes a fill of `way` of `set` after a miss by the instruction at `pc`.
    pub const fn miss(set: usize, way: usize, tag: u64, pc: u64) -> Self {
        Self::new(set, way, tag, pc, false)
    }

    const fn new(set: usize, way: usize, tag: u64, pc: u64, hit: bool) -> Self {
        Self {
            set,
            way,
            line: LineState::valid(tag),
            thread_id: 0,
            pc: Pc(pc),
            access_type: AccessType::Load,
            hit,
            source: AccessSource(0),
        }
    }

    /// Overrides the kind of reference.
    #[must_use]
    pub const fn with_type(mut self, access_type: AccessType) -> Self {
        self.access_type = access_type;
        self
    }

    /// Overrides the issuing component.
    #[must_use]
    pub const fn with_source(mut self, source: AccessSource) -> Self {
        self.source = source;
        self
    }

    /// Overrides the issuing thread.
    #[must_use]
    pub const fn with_thread(mut self, thread_id: u32) -> Self {
        self.thread_id = thread_id;
        self
    }
}

/// Arguments of a victim-selection call.
///
/// Issued only on a miss to a full set.
#[derive(Clone, Copy, Debug, Default)]
pub struct VictimQuery<'a> {
    /// Set that needs a victim.
    pub set: usize,
    /// Host state of every way in the set, or empty if the host does not
    /// provide it. When non-empty its length must equal the associativity.
    pub candidates: &'a [LineState],
    /// Hardware thread that issued the missing access.
    pub thread_id: u32,
    /// Instruction pointer of the missing access.
    pub pc: Pc,
    /// Physical address of the missing access.
    pub paddr: PhysAddr,
    /// Kind of reference.
    pub access_type: AccessType,
    /// Issuing component.
    pub source: AccessSource,
}

impl VictimQuery<'_> {
    /// Query for `set` carrying no line states and default request metadata.
    pub const fn for_set(set: usize) -> Self {
        Self {
            set,
            candidates: &[],
            thread_id: 0,
            pc: Pc(0),
            paddr: PhysAddr(0),
            access_type: AccessType::Load,
            source: AccessSource(0),
        }
    }
}
