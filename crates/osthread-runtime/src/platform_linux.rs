//! Linux platform implementation
//!
//! Linux and Android have no separate thread-identity query: the
//! `pthread_t` of a thread doubles as its native id.

use nix::sys::pthread::pthread_self;
use osthread_core::{NativeHandle, NativeThreadId};

/// Linux platform handler
pub struct LinuxPlatform;

impl LinuxPlatform {
    /// Native handle of the calling thread
    #[inline]
    pub fn current_handle() -> NativeHandle {
        NativeHandle::from_raw(pthread_self() as usize)
    }

    /// Native id of the thread behind `handle`
    #[inline]
    pub fn thread_id(handle: NativeHandle) -> NativeThreadId {
        NativeThreadId::from(handle)
    }

    /// Give up the current timeslice
    #[inline]
    pub fn yield_now() {
        // sched_yield cannot fail on Linux
        let _ = nix::sched::sched_yield();
    }
}
