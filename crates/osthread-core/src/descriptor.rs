//! Thread descriptor
//!
//! A [`ThreadDescriptor`] is the runtime record for one logical thread. The
//! higher-level layer allocates it (as an `Arc`) through the generic setup
//! routine [`ThreadDescriptor::setup`]; the backend then attaches a native
//! thread and mutates only the fields below, each under its own lock:
//!
//! ```text
//! native_handle  OnceLock       set once at create/stamp time
//! exit           Mutex+Condvar  exited flag, false -> true exactly once
//! affinity       Mutex          ideal_core + affinity_mask as one unit
//! join_handle    Mutex          native join token, taken by destroy
//! state          AtomicU8       Initialized -> Started -> Terminated
//! ```

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::JoinHandle;

use crate::constants::{DEFAULT_STACK_SIZE, MIN_STACK_SIZE};
use crate::error::{ThreadError, ThreadResult};
use crate::id::NativeHandle;
use crate::mask::CoreMask;
use crate::state::{Priority, ThreadState};
use crate::kassert;

/// Entry function run by the native thread
pub type EntryFn = Box<dyn FnOnce() + Send + 'static>;

/// Lock a mutex, ignoring poisoning
///
/// Fatal assertions panic while holding descriptor locks; the protected
/// data is plain flags and masks, which remain consistent.
#[inline]
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Static parameters for the generic setup routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadParams {
    name: Option<String>,
    stack_size: usize,
    priority: i32,
}

impl Default for ThreadParams {
    fn default() -> Self {
        Self {
            name: None,
            stack_size: DEFAULT_STACK_SIZE,
            priority: Priority::DEFAULT.get(),
        }
    }
}

impl ThreadParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the native thread name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the native stack size in bytes
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = bytes;
        self
    }

    /// Set the base priority
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Check the parameters without building a descriptor
    pub fn validate(&self) -> ThreadResult<Priority> {
        if let Some(name) = &self.name {
            if name.contains('\0') {
                return Err(ThreadError::InvalidName);
            }
        }
        if self.stack_size < MIN_STACK_SIZE {
            return Err(ThreadError::InvalidStackSize(self.stack_size));
        }
        Priority::new(self.priority).ok_or(ThreadError::InvalidPriority(self.priority))
    }
}

/// Exit flag guarded by a lock/condition-variable pair
///
/// Waiters always take the lock before reading the flag, so a waiter that
/// arrives after the broadcast still sees `true`.
pub struct ExitSignal {
    exited: Mutex<bool>,
    cond: Condvar,
}

impl ExitSignal {
    pub const fn new() -> Self {
        Self {
            exited: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Set the flag and wake every waiter
    ///
    /// Called once, by the thread's own trampoline. A second call is a
    /// fatal assertion.
    pub fn mark_exited(&self) {
        let mut exited = lock(&self.exited);
        kassert!(!*exited, "thread signalled exit twice");
        *exited = true;
        self.cond.notify_all();
    }

    /// Block until the flag is set
    pub fn wait(&self) {
        let mut exited = lock(&self.exited);
        while !*exited {
            exited = self.cond.wait(exited).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Read the flag without blocking (still takes the lock)
    pub fn is_exited(&self) -> bool {
        *lock(&self.exited)
    }
}

impl Default for ExitSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Ideal core and affinity mask, always read and written together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffinityState {
    pub ideal_core: i32,
    pub affinity_mask: CoreMask,
}

/// Runtime record for one logical thread
pub struct ThreadDescriptor {
    name: Option<String>,
    stack_size: usize,
    base_priority: Priority,
    entry: Mutex<Option<EntryFn>>,
    state: AtomicU8,
    auto_registered: AtomicBool,
    native_handle: OnceLock<NativeHandle>,
    exit: ExitSignal,
    affinity: Mutex<AffinityState>,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadDescriptor {
    /// Generic setup routine: populate the static fields
    ///
    /// Backend-independent; the returned descriptor has no native thread
    /// attached yet and is in [`ThreadState::Initialized`].
    pub fn setup(params: ThreadParams, entry: Option<EntryFn>) -> ThreadResult<Arc<Self>> {
        let base_priority = params.validate()?;
        Ok(Arc::new(Self {
            name: params.name,
            stack_size: params.stack_size,
            base_priority,
            entry: Mutex::new(entry),
            state: AtomicU8::new(ThreadState::Initialized as u8),
            auto_registered: AtomicBool::new(false),
            native_handle: OnceLock::new(),
            exit: ExitSignal::new(),
            affinity: Mutex::new(AffinityState {
                ideal_core: 0,
                affinity_mask: CoreMask::EMPTY,
            }),
            join_handle: Mutex::new(None),
        }))
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    #[inline]
    pub fn base_priority(&self) -> Priority {
        self.base_priority
    }

    #[inline]
    pub fn state(&self) -> ThreadState {
        ThreadState::from(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_state(&self, state: ThreadState) {
        self.state.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub fn is_auto_registered(&self) -> bool {
        self.auto_registered.load(Ordering::Acquire)
    }

    #[inline]
    pub fn mark_auto_registered(&self) {
        self.auto_registered.store(true, Ordering::Release);
    }

    /// Take the entry function; `None` after the first call
    pub fn take_entry(&self) -> Option<EntryFn> {
        lock(&self.entry).take()
    }

    /// Bind the descriptor to its native thread
    ///
    /// Both the creating thread and the new thread's trampoline bind the
    /// same handle, whichever runs first; binding a different handle is a
    /// fatal assertion.
    pub fn bind_native_handle(&self, handle: NativeHandle) {
        let bound = *self.native_handle.get_or_init(|| handle);
        kassert!(
            bound == handle,
            "descriptor already bound to native thread {:?}",
            bound
        );
    }

    /// Native handle, `None` until a native thread is attached
    #[inline]
    pub fn try_native_handle(&self) -> Option<NativeHandle> {
        self.native_handle.get().copied()
    }

    /// Native handle of an attached descriptor
    pub fn native_handle(&self) -> NativeHandle {
        match self.native_handle.get() {
            Some(handle) => *handle,
            None => crate::kfatal!("descriptor has no native thread"),
        }
    }

    #[inline]
    pub fn exit_signal(&self) -> &ExitSignal {
        &self.exit
    }

    /// Lock the affinity fields for a read-modify-write
    #[inline]
    pub fn affinity_lock(&self) -> MutexGuard<'_, AffinityState> {
        lock(&self.affinity)
    }

    /// Consistent snapshot of ideal core and affinity mask
    pub fn affinity(&self) -> AffinityState {
        *lock(&self.affinity)
    }

    pub fn set_join_handle(&self, handle: JoinHandle<()>) {
        *lock(&self.join_handle) = Some(handle);
    }

    pub fn take_join_handle(&self) -> Option<JoinHandle<()>> {
        lock(&self.join_handle).take()
    }
}

impl fmt::Debug for ThreadDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadDescriptor")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("native_handle", &self.try_native_handle())
            .field("auto_registered", &self.is_auto_registered())
            .field("base_priority", &self.base_priority)
            .finish_non_exhaustive()
    }
}
