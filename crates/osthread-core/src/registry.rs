//! Descriptor registry
//!
//! The higher-level thread manager indexes descriptors by native identity.
//! The backend only needs two operations from it: look up the descriptor
//! for a native thread, and place a freshly bootstrapped descriptor under
//! management. [`ThreadTable`] is the in-process implementation used by
//! the facade crate; any other implementation must do its own locking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::descriptor::{lock, ThreadDescriptor};
use crate::id::NativeThreadId;

/// Lookup/insert facility for descriptors, keyed by native thread id
pub trait ThreadRegistry: Send + Sync {
    /// Descriptor managing the native thread `id`, if any
    fn find(&self, id: NativeThreadId) -> Option<Arc<ThreadDescriptor>>;

    /// Place a descriptor under management
    fn place(&self, id: NativeThreadId, thread: Arc<ThreadDescriptor>);

    /// Stop managing `id`, returning the descriptor that was indexed
    fn remove(&self, id: NativeThreadId) -> Option<Arc<ThreadDescriptor>>;

    /// Number of managed descriptors
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutex-protected hash map registry
#[derive(Default)]
pub struct ThreadTable {
    threads: Mutex<HashMap<NativeThreadId, Arc<ThreadDescriptor>>>,
}

impl ThreadTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visit every managed descriptor while the table lock is held
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(NativeThreadId, &Arc<ThreadDescriptor>),
    {
        for (id, thread) in lock(&self.threads).iter() {
            f(*id, thread);
        }
    }
}

impl ThreadRegistry for ThreadTable {
    fn find(&self, id: NativeThreadId) -> Option<Arc<ThreadDescriptor>> {
        lock(&self.threads).get(&id).cloned()
    }

    fn place(&self, id: NativeThreadId, thread: Arc<ThreadDescriptor>) {
        // Native ids are only reused after the previous owner was joined,
        // so a replaced entry is a stale descriptor.
        lock(&self.threads).insert(id, thread);
    }

    fn remove(&self, id: NativeThreadId) -> Option<Arc<ThreadDescriptor>> {
        lock(&self.threads).remove(&id)
    }

    fn len(&self) -> usize {
        lock(&self.threads).len()
    }
}
