//! Native bitmask affinity (Linux, Android)

use core::mem;
use osthread_core::{kassert, NativeHandle};

use super::{CoreSet, HostAffinity};

/// `cpu_set_t` wrapper
#[derive(Clone, Copy)]
pub struct NativeCpuSet(libc::cpu_set_t);

impl NativeCpuSet {
    #[inline]
    pub fn as_raw(&self) -> &libc::cpu_set_t {
        &self.0
    }
}

impl CoreSet for NativeCpuSet {
    const CAPACITY: usize = libc::CPU_SETSIZE as usize;

    fn empty() -> Self {
        // SAFETY: cpu_set_t is a plain bit array
        let mut set = Self(unsafe { mem::zeroed() });
        set.clear();
        set
    }

    fn clear(&mut self) {
        unsafe { libc::CPU_ZERO(&mut self.0) }
    }

    fn set(&mut self, core: usize) {
        if core < Self::CAPACITY {
            unsafe { libc::CPU_SET(core, &mut self.0) }
        }
    }

    fn is_set(&self, core: usize) -> bool {
        core < Self::CAPACITY && unsafe { libc::CPU_ISSET(core, &self.0) }
    }
}

/// Affinity through `sched_getaffinity` / `pthread_setaffinity_np`
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeAffinity;

impl HostAffinity for NativeAffinity {
    type Set = NativeCpuSet;

    fn process_cores(&self) -> NativeCpuSet {
        let mut set = NativeCpuSet::empty();
        // pid 0 reads the calling thread's mask, which every thread
        // inherits from the process unless changed
        let rc = unsafe {
            libc::sched_getaffinity(0, mem::size_of::<libc::cpu_set_t>(), &mut set.0)
        };
        kassert!(
            rc == 0,
            "sched_getaffinity failed: {}",
            std::io::Error::last_os_error()
        );
        set
    }

    fn set_thread_affinity(&self, handle: NativeHandle, set: &NativeCpuSet) -> i32 {
        cfg_if::cfg_if! {
            if #[cfg(target_os = "android")] {
                // bionic has no pthread_setaffinity_np
                let rc = unsafe {
                    let tid = libc::pthread_gettid_np(handle.as_raw() as libc::pthread_t);
                    libc::sched_setaffinity(tid, mem::size_of::<libc::cpu_set_t>(), set.as_raw())
                };
                if rc == 0 { 0 } else { std::io::Error::last_os_error().raw_os_error().unwrap_or(-1) }
            } else {
                unsafe {
                    libc::pthread_setaffinity_np(
                        handle.as_raw() as libc::pthread_t,
                        mem::size_of::<libc::cpu_set_t>(),
                        set.as_raw(),
                    )
                }
            }
        }
    }

    fn current_core(&self) -> i32 {
        let core = unsafe { libc::sched_getcpu() };
        kassert!(
            core >= 0,
            "sched_getcpu failed: {}",
            std::io::Error::last_os_error()
        );
        core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::{from_core_set, to_core_set};
    use crate::CurrentPlatform;
    use std::thread;

    #[test]
    fn test_cpu_set_ops() {
        let mut set = NativeCpuSet::empty();
        assert!(!set.is_set(3));
        set.set(3);
        set.set(NativeCpuSet::CAPACITY + 1);
        assert!(set.is_set(3));
        assert!(!set.is_set(NativeCpuSet::CAPACITY + 1));
        set.clear();
        assert!(!set.is_set(3));
    }

    #[test]
    fn test_process_cores_non_empty() {
        let mask = from_core_set(&NativeAffinity.process_cores());
        assert!(mask.count() >= 1);
    }

    #[test]
    fn test_pin_to_available_core() {
        let available = NativeAffinity.available_mask();
        let core = available.lowest_core().unwrap();

        thread::spawn(move || {
            let (set, _) = to_core_set::<NativeCpuSet>(osthread_core::CoreMask::single(core));
            let rc = NativeAffinity.set_thread_affinity(CurrentPlatform::current_handle(), &set);
            assert_eq!(rc, 0);
            assert_eq!(NativeAffinity.current_core(), core as i32);
            assert_eq!(
                from_core_set(&NativeAffinity.process_cores()),
                osthread_core::CoreMask::single(core)
            );
        })
        .join()
        .unwrap();
    }
}
