//! Native thread spawning and the generic trampoline
//!
//! Every created thread runs [`run`]: bind the descriptor to the native
//! thread, cache it in TLS, run the entry function, then signal exit. An
//! entry function that panics still signals exit; the panic is re-raised
//! afterwards so the native join reports it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use osthread_core::{kdebug, kerror, kfatal, ThreadDescriptor};

use crate::tls;
use crate::CurrentPlatform;

/// Spawn the native thread for `thread`
///
/// Spawn failure is fatal.
pub(crate) fn spawn(thread: &Arc<ThreadDescriptor>, name: Option<String>) -> JoinHandle<()> {
    let mut builder = thread::Builder::new().stack_size(thread.stack_size());
    if let Some(name) = name {
        builder = builder.name(name);
    }

    let descriptor = Arc::clone(thread);
    match builder.spawn(move || run(descriptor)) {
        Ok(handle) => handle,
        Err(e) => kfatal!("failed to spawn native thread: {}", e),
    }
}

fn run(thread: Arc<ThreadDescriptor>) {
    thread.bind_native_handle(CurrentPlatform::current_handle());
    tls::set_current_thread(&thread);
    kdebug!("thread {:?} running", thread.name());

    let result = match thread.take_entry() {
        Some(entry) => panic::catch_unwind(AssertUnwindSafe(entry)),
        None => Ok(()),
    };

    thread.exit_signal().mark_exited();

    if let Err(payload) = result {
        kerror!("thread {:?} entry function panicked", thread.name());
        panic::resume_unwind(payload);
    }
    kdebug!("thread {:?} exited", thread.name());
}
