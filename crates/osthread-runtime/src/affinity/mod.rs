//! Core affinity backends
//!
//! Two build-time paths satisfy the same [`HostAffinity`] contract:
//!
//! - **native** (Linux, Android): the host takes a full CPU bitmask
//!   (`cpu_set_t`) and applies it per thread.
//! - **emulated** (Apple): the host only offers a single-core affinity
//!   hint, so [`EmulatedAffinity`] wraps it in a 32-core bitmask shim that
//!   pins when exactly one core is requested.
//!
//! The manager never looks inside a native set; it goes through
//! [`to_core_set`] / [`from_core_set`], which drop cores beyond
//! `min(MAX_CORES, CAPACITY)`.

mod emulated;

pub use emulated::{EmulatedAffinity, EmulatedCpuSet, SingleCorePin};

#[cfg(test)]
pub(crate) use emulated::tests::RecordingPin;

use osthread_core::constants::MAX_CORES;
use osthread_core::{kassert, CoreMask, NativeHandle};

/// Fixed-capacity native core set
pub trait CoreSet: Sized {
    /// Number of cores the set can describe
    const CAPACITY: usize;

    /// A set with no core selected
    fn empty() -> Self;

    fn clear(&mut self);

    /// Select `core`; cores at or beyond `CAPACITY` are ignored
    fn set(&mut self, core: usize);

    fn is_set(&self, core: usize) -> bool;
}

/// Host facility for reading and applying thread affinity
pub trait HostAffinity: Send + Sync {
    type Set: CoreSet;

    /// Cores the process is allowed to run on
    fn process_cores(&self) -> Self::Set;

    /// Apply `set` to the thread behind `handle`; 0 on success
    fn set_thread_affinity(&self, handle: NativeHandle, set: &Self::Set) -> i32;

    /// Core the calling thread is running on
    fn current_core(&self) -> i32;

    /// Process cores as a [`CoreMask`]; never empty
    fn available_mask(&self) -> CoreMask {
        let mask = from_core_set(&self.process_cores());
        kassert!(!mask.is_empty(), "process has no available cores");
        mask
    }
}

/// Translate `mask` into a native set, bit by bit
///
/// Returns the set and the mask that was actually representable.
pub fn to_core_set<S: CoreSet>(mask: CoreMask) -> (S, CoreMask) {
    let limit = MAX_CORES.min(S::CAPACITY);
    let mut set = S::empty();
    let mut applied = CoreMask::EMPTY;
    for core in mask.iter().take_while(|&core| core < limit) {
        set.set(core);
        applied = applied.with(core);
    }
    (set, applied)
}

/// Read a native set back as a [`CoreMask`]
pub fn from_core_set<S: CoreSet>(set: &S) -> CoreMask {
    (0..MAX_CORES.min(S::CAPACITY))
        .filter(|&core| set.is_set(core))
        .fold(CoreMask::EMPTY, CoreMask::with)
}

cfg_if::cfg_if! {
    if #[cfg(any(target_os = "linux", target_os = "android"))] {
        mod native_linux;
        pub use native_linux::{NativeAffinity, NativeCpuSet};

        /// Affinity backend for this host
        pub type PlatformAffinity = NativeAffinity;
    } else if #[cfg(target_vendor = "apple")] {
        mod mach;
        pub use mach::MachPin;

        /// Affinity backend for this host
        pub type PlatformAffinity = EmulatedAffinity<MachPin>;
    } else {
        compile_error!("Unsupported platform for thread affinity");
    }
}
