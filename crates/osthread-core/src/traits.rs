//! Backend contract
//!
//! Every host backend implements [`ThreadBackend`]. The higher-level
//! thread manager only talks to descriptors through this trait, so a
//! backend with native bitmask affinity and one with emulated affinity
//! are interchangeable.

use std::sync::Arc;

use crate::descriptor::ThreadDescriptor;
use crate::id::NativeThreadId;
use crate::mask::{CoreMask, IdealCore};
use crate::state::Priority;

/// Thread-management operations a host backend must provide
///
/// Native failures inside these operations are fatal assertions; only
/// [`change_priority`](ThreadBackend::change_priority) reports a
/// non-fatal "not applied".
pub trait ThreadBackend: Send + Sync {
    /// Once at process start: install TLS and adopt the calling thread as `main`
    fn initialize(&self, main: &Arc<ThreadDescriptor>);

    /// Spawn the native thread for `thread`
    fn create_thread(&self, thread: &Arc<ThreadDescriptor>, ideal_core: IdealCore);

    /// Join the native thread of an exited descriptor
    fn destroy_thread(&self, thread: &ThreadDescriptor);

    /// Begin execution (a no-op where threads start on spawn)
    fn start_thread(&self, thread: &ThreadDescriptor);

    /// Block until `thread` has left its entry function
    fn wait_for_exit(&self, thread: &ThreadDescriptor);

    /// Non-blocking exit poll
    fn try_wait_for_exit(&self, thread: &ThreadDescriptor) -> bool;

    /// Scheduler hint to give up the current timeslice
    fn yield_thread(&self);

    /// Returns `true` if the new priority was applied
    fn change_priority(&self, thread: &ThreadDescriptor, priority: Priority) -> bool;

    fn get_current_priority(&self, thread: &ThreadDescriptor) -> Priority;

    /// Opaque, equality-only native identity of `thread`
    fn get_thread_id(&self, thread: &ThreadDescriptor) -> NativeThreadId;

    fn suspend_thread_unsafe(&self, thread: &ThreadDescriptor);

    fn resume_thread_unsafe(&self, thread: &ThreadDescriptor);

    /// Cache `thread` as the calling native thread's descriptor
    fn set_current_thread(&self, thread: &Arc<ThreadDescriptor>);

    /// Descriptor of the calling native thread, bootstrapping one if needed
    fn get_current_thread(&self) -> Arc<ThreadDescriptor>;

    fn get_current_core_number(&self) -> i32;

    fn set_thread_core_mask(&self, thread: &ThreadDescriptor, ideal_core: IdealCore, mask: CoreMask);

    /// `(ideal_core, affinity_mask)` read as one snapshot
    fn get_thread_core_mask(&self, thread: &ThreadDescriptor) -> (i32, CoreMask);

    /// Cores the process may run on; never empty
    fn get_thread_available_core_mask(&self) -> CoreMask;
}
