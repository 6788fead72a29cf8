//! Mach thread affinity hint (macOS, iOS)

use core::{mem, ptr};
use osthread_core::{kassert, kdebug, NativeHandle};

use super::SingleCorePin;

/// `kern_return_t` for hosts that ignore affinity tags (Apple silicon)
const KERN_NOT_SUPPORTED: libc::kern_return_t = 46;

/// Pins through `THREAD_AFFINITY_POLICY`
///
/// Threads sharing an affinity tag are scheduled on the same L2 domain;
/// core `n` is mapped to tag `n + 1` since tag 0 means "no affinity".
#[derive(Debug, Default, Clone, Copy)]
pub struct MachPin;

impl SingleCorePin for MachPin {
    fn core_count(&self) -> usize {
        let mut count: libc::c_int = 0;
        let mut len = mem::size_of::<libc::c_int>();
        let rc = unsafe {
            libc::sysctlbyname(
                c"hw.logicalcpu".as_ptr(),
                (&mut count as *mut libc::c_int).cast(),
                &mut len,
                ptr::null_mut(),
                0,
            )
        };
        kassert!(rc == 0 && count > 0, "sysctl hw.logicalcpu failed: {}", rc);
        count as usize
    }

    fn pin_to_core(&self, handle: NativeHandle, core: usize) -> i32 {
        let mut policy = libc::thread_affinity_policy_data_t {
            affinity_tag: core as libc::integer_t + 1,
        };
        let rc = unsafe {
            let port = libc::pthread_mach_thread_np(handle.as_raw() as libc::pthread_t);
            libc::thread_policy_set(
                port,
                libc::THREAD_AFFINITY_POLICY as libc::thread_policy_flavor_t,
                (&mut policy as *mut libc::thread_affinity_policy_data_t).cast(),
                libc::THREAD_AFFINITY_POLICY_COUNT,
            )
        };
        if rc == KERN_NOT_SUPPORTED {
            kdebug!("affinity: host ignores affinity tags, core {} not pinned", core);
            return 0;
        }
        rc
    }
}
