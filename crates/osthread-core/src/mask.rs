//! Core affinity bitmask and ideal-core request types
//!
//! A [`CoreMask`] carries one bit per logical core (bit `n` = core `n`).
//! It is the portable representation the backend translates into whatever
//! the host uses natively (`cpu_set_t` or the emulated 32-core set).

use core::fmt;
use crate::constants::MAX_CORES;

/// Raw encoding of [`IdealCore::UseDefault`]
pub const IDEAL_CORE_USE_DEFAULT: i32 = -2;

/// Raw encoding of [`IdealCore::NoUpdate`]
pub const IDEAL_CORE_NO_UPDATE: i32 = -3;

/// Bitmask of logical cores a thread may run on
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct CoreMask(u64);

impl CoreMask {
    /// Mask selecting no core
    pub const EMPTY: CoreMask = CoreMask(0);

    /// Create a mask from raw bits
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        CoreMask(bits)
    }

    /// Mask selecting a single core
    ///
    /// Cores beyond [`MAX_CORES`] produce an empty mask.
    #[inline]
    pub const fn single(core: usize) -> Self {
        if core < MAX_CORES {
            CoreMask(1u64 << core)
        } else {
            CoreMask(0)
        }
    }

    /// Mask selecting cores `0..count`
    #[inline]
    pub const fn first_n(count: usize) -> Self {
        if count >= MAX_CORES {
            CoreMask(u64::MAX)
        } else {
            CoreMask((1u64 << count) - 1)
        }
    }

    /// Get the raw bits
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Check if no core is selected
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if `core` is selected
    #[inline]
    pub const fn contains(self, core: usize) -> bool {
        core < MAX_CORES && (self.0 & (1u64 << core)) != 0
    }

    /// Return a copy with `core` selected
    #[inline]
    pub const fn with(self, core: usize) -> Self {
        if core < MAX_CORES {
            CoreMask(self.0 | (1u64 << core))
        } else {
            self
        }
    }

    /// Index of the lowest selected core
    #[inline]
    pub const fn lowest_core(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// Number of selected cores
    #[inline]
    pub const fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate over the selected core indices, lowest first
    pub fn iter(self) -> CoreIter {
        CoreIter { remaining: self.0 }
    }
}

impl From<u64> for CoreMask {
    #[inline]
    fn from(bits: u64) -> Self {
        CoreMask(bits)
    }
}

impl From<CoreMask> for u64 {
    #[inline]
    fn from(mask: CoreMask) -> Self {
        mask.0
    }
}

impl fmt::Debug for CoreMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoreMask({:#b})", self.0)
    }
}

impl fmt::Display for CoreMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Iterator over the cores of a [`CoreMask`]
pub struct CoreIter {
    remaining: u64,
}

impl Iterator for CoreIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let core = self.remaining.trailing_zeros() as usize;
        self.remaining &= self.remaining - 1;
        Some(core)
    }
}

/// Ideal core requested when creating a thread or changing its affinity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdealCore {
    /// Prefer this core index
    Core(i32),

    /// Resolve to the first core of the process's available set
    UseDefault,

    /// Keep the stored ideal core (only meaningful when setting affinity)
    NoUpdate,
}

impl IdealCore {
    /// Decode a raw ideal-core value using the sentinel encoding
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            IDEAL_CORE_USE_DEFAULT => IdealCore::UseDefault,
            IDEAL_CORE_NO_UPDATE => IdealCore::NoUpdate,
            core => IdealCore::Core(core),
        }
    }

    /// Encode as a raw ideal-core value
    pub const fn as_raw(self) -> i32 {
        match self {
            IdealCore::Core(core) => core,
            IdealCore::UseDefault => IDEAL_CORE_USE_DEFAULT,
            IdealCore::NoUpdate => IDEAL_CORE_NO_UPDATE,
        }
    }
}

impl From<i32> for IdealCore {
    fn from(raw: i32) -> Self {
        IdealCore::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_set_and_test() {
        let mask = CoreMask::EMPTY.with(0).with(5);
        assert!(mask.contains(0));
        assert!(mask.contains(5));
        assert!(!mask.contains(1));
        assert!(!mask.contains(64));
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn test_mask_out_of_range_core_ignored() {
        assert!(CoreMask::single(64).is_empty());
        assert_eq!(CoreMask::EMPTY.with(100), CoreMask::EMPTY);
    }

    #[test]
    fn test_lowest_core() {
        assert_eq!(CoreMask::from_bits(0b0111).lowest_core(), Some(0));
        assert_eq!(CoreMask::from_bits(0b1100).lowest_core(), Some(2));
        assert_eq!(CoreMask::EMPTY.lowest_core(), None);
    }

    #[test]
    fn test_first_n() {
        assert_eq!(CoreMask::first_n(0), CoreMask::EMPTY);
        assert_eq!(CoreMask::first_n(3).bits(), 0b0111);
        assert_eq!(CoreMask::first_n(64).bits(), u64::MAX);
        assert_eq!(CoreMask::first_n(200).bits(), u64::MAX);
    }

    #[test]
    fn test_iter_in_order() {
        let cores: Vec<usize> = CoreMask::from_bits(0b1010_0101).iter().collect();
        assert_eq!(cores, vec![0, 2, 5, 7]);

        let high: Vec<usize> = CoreMask::from_bits(1u64 << 63).iter().collect();
        assert_eq!(high, vec![63]);
    }

    #[test]
    fn test_ideal_core_raw_encoding() {
        assert_eq!(IdealCore::from_raw(-2), IdealCore::UseDefault);
        assert_eq!(IdealCore::from_raw(-3), IdealCore::NoUpdate);
        assert_eq!(IdealCore::from_raw(3), IdealCore::Core(3));
        assert_eq!(IdealCore::UseDefault.as_raw(), IDEAL_CORE_USE_DEFAULT);
        assert_eq!(IdealCore::NoUpdate.as_raw(), IDEAL_CORE_NO_UPDATE);
    }
}
