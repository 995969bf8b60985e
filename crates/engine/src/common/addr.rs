//! Address and instruction-pointer types.
//!
//! The host passes raw 64-bit values for both the physical address of an access
//! and the instruction pointer that issued it. These newtypes keep the two apart
//! at call sites that take both.

/// A physical address as reported by the host simulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

/// The instruction pointer (PC) of the access that triggered a lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pc(pub u64);

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }
}

impl Pc {
    /// Creates a new instruction pointer from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(pc: u64) -> Self {
        Self(pc)
    }

    /// Returns the raw 64-bit value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Folds the PC into a signature index for a table of `table_size` entries.
    ///
    /// This is a plain modulo of the PC, so neighbouring instructions map to
    /// neighbouring entries. `table_size` must be non-zero.
    #[inline(always)]
    pub const fn signature(&self, table_size: usize) -> u64 {
        self.0 % table_size as u64
    }
}
