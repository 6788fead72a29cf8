//! Thread-local storage for the current descriptor
//!
//! One slot per native thread holding the descriptor that manages it.
//! Reads are lock-free; the slot is only ever touched by its own thread.

use osthread_core::{kassert, ThreadDescriptor, ThreadState};
use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    /// Descriptor of the calling native thread, once known
    static CURRENT_THREAD: RefCell<Option<Arc<ThreadDescriptor>>> = const { RefCell::new(None) };

    /// Exit guard for a descriptor bootstrapped on this thread
    static EXIT_GUARD: RefCell<Option<ExitOnDrop>> = const { RefCell::new(None) };
}

/// Signals exit for an auto-registered descriptor when its thread's TLS
/// is torn down, so a later thread reusing the native id is not handed it
struct ExitOnDrop(Arc<ThreadDescriptor>);

impl Drop for ExitOnDrop {
    fn drop(&mut self) {
        let exit = self.0.exit_signal();
        if !exit.is_exited() {
            exit.mark_exited();
        }
        self.0.set_state(ThreadState::Terminated);
    }
}

/// Make sure the slot is usable on the calling thread
///
/// Fails only while the thread's TLS is being torn down, which is fatal.
pub fn install() {
    kassert!(
        CURRENT_THREAD.try_with(|_| ()).is_ok(),
        "thread-local descriptor slot unavailable"
    );
}

/// Cache `thread` as the calling thread's descriptor
#[inline]
pub fn set_current_thread(thread: &Arc<ThreadDescriptor>) {
    let stored = CURRENT_THREAD.try_with(|slot| {
        *slot.borrow_mut() = Some(Arc::clone(thread));
    });
    kassert!(stored.is_ok(), "thread-local descriptor slot unavailable");
}

/// Cache a descriptor bootstrapped for a foreign thread
///
/// Like [`set_current_thread`], and additionally marks the descriptor
/// exited and terminated when the calling thread exits.
pub fn adopt_current_thread(thread: &Arc<ThreadDescriptor>) {
    set_current_thread(thread);
    let armed = EXIT_GUARD.try_with(|guard| {
        *guard.borrow_mut() = Some(ExitOnDrop(Arc::clone(thread)));
    });
    kassert!(armed.is_ok(), "thread-local exit guard unavailable");
}

/// Cached descriptor of the calling thread, if any
#[inline]
pub fn current_thread() -> Option<Arc<ThreadDescriptor>> {
    CURRENT_THREAD
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten()
}

/// Drop the calling thread's cached descriptor
#[inline]
pub fn clear_current_thread() {
    let _ = CURRENT_THREAD.try_with(|slot| slot.borrow_mut().take());
}

/// Check if the calling thread has a cached descriptor
#[inline]
pub fn has_current_thread() -> bool {
    CURRENT_THREAD
        .try_with(|slot| slot.borrow().is_some())
        .unwrap_or(false)
}
