//! Single-core affinity shim
//!
//! Hosts without per-thread bitmask affinity still usually offer a way to
//! hint that a thread belongs on one particular core. [`EmulatedAffinity`]
//! presents such a host through the bitmask contract:
//!
//! - available cores are the low `core_count` bits of a 32-core set
//! - a set with exactly one core pins the thread to it
//! - empty and multi-core sets are accepted and change nothing
//! - the current core is always reported as 0

use osthread_core::{kdebug, NativeHandle};

use super::{CoreSet, HostAffinity};

/// 32-core bitmask
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmulatedCpuSet {
    bits: u32,
}

impl EmulatedCpuSet {
    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// The only selected core, if exactly one is selected
    #[inline]
    pub fn single_core(&self) -> Option<usize> {
        (self.bits.count_ones() == 1).then(|| self.bits.trailing_zeros() as usize)
    }
}

impl CoreSet for EmulatedCpuSet {
    const CAPACITY: usize = u32::BITS as usize;

    fn empty() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        self.bits = 0;
    }

    fn set(&mut self, core: usize) {
        if core < Self::CAPACITY {
            self.bits |= 1 << core;
        }
    }

    fn is_set(&self, core: usize) -> bool {
        core < Self::CAPACITY && self.bits & (1 << core) != 0
    }
}

/// Host primitive behind the shim
pub trait SingleCorePin: Send + Sync {
    /// Number of logical cores on the host
    fn core_count(&self) -> usize;

    /// Hint that the thread behind `handle` should run on `core`; 0 on success
    fn pin_to_core(&self, handle: NativeHandle, core: usize) -> i32;
}

/// Bitmask affinity emulated on top of a [`SingleCorePin`] host
#[derive(Debug, Default)]
pub struct EmulatedAffinity<P> {
    pin: P,
}

impl<P> EmulatedAffinity<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P: SingleCorePin> HostAffinity for EmulatedAffinity<P> {
    type Set = EmulatedCpuSet;

    fn process_cores(&self) -> EmulatedCpuSet {
        let mut set = EmulatedCpuSet::empty();
        for core in 0..self.pin.core_count().min(EmulatedCpuSet::CAPACITY) {
            set.set(core);
        }
        set
    }

    fn set_thread_affinity(&self, handle: NativeHandle, set: &EmulatedCpuSet) -> i32 {
        match set.single_core() {
            Some(core) => self.pin.pin_to_core(handle, core),
            None => {
                kdebug!(
                    "affinity: ignoring {}-core request {:#x} for {:?}",
                    set.bits().count_ones(),
                    set.bits(),
                    handle
                );
                0
            }
        }
    }

    fn current_core(&self) -> i32 {
        0
    }
}
