//! macOS / iOS platform implementation
//!
//! Apple hosts expose a dedicated 64-bit thread id through
//! `pthread_threadid_np`, distinct from the `pthread_t` handle.

use nix::sys::pthread::{pthread_self, Pthread};
use osthread_core::{kassert, NativeHandle, NativeThreadId};

/// macOS platform handler
pub struct MacOSPlatform;

impl MacOSPlatform {
    /// Native handle of the calling thread
    #[inline]
    pub fn current_handle() -> NativeHandle {
        NativeHandle::from_raw(pthread_self() as usize)
    }

    /// Native id of the thread behind `handle`
    pub fn thread_id(handle: NativeHandle) -> NativeThreadId {
        let mut tid: u64 = 0;
        // SAFETY: handle came from pthread_self or a live JoinHandle
        let rc = unsafe { libc::pthread_threadid_np(handle.as_raw() as Pthread, &mut tid) };
        kassert!(rc == 0, "pthread_threadid_np failed: {}", rc);
        NativeThreadId::new(tid)
    }

    /// Give up the current timeslice
    #[inline]
    pub fn yield_now() {
        let _ = nix::sched::sched_yield();
    }
}
