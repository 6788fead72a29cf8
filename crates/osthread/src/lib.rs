//! # osthread - native thread manager
//!
//! Process-wide management of native OS threads: descriptors for every
//! thread (including ones the library did not create), a blocking exit
//! protocol, and per-thread core affinity that works the same on hosts
//! with bitmask affinity and hosts with only a single-core hint.
//!
//! ## Quick Start
//!
//! ```ignore
//! use osthread::{Builder, CoreMask, IdealCore, ThreadConfig};
//!
//! fn main() -> osthread::ThreadResult<()> {
//!     osthread::init(ThreadConfig::from_env())?;
//!
//!     let worker = Builder::new()
//!         .name("worker")
//!         .ideal_core(IdealCore::UseDefault)
//!         .spawn(|| {
//!             let me = osthread::current().unwrap();
//!             println!("hello from {:?}", me.name());
//!         })?;
//!
//!     worker.set_core_mask(IdealCore::NoUpdate, CoreMask::single(0));
//!     worker.join();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  osthread: init, spawn, Builder, Thread      │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  osthread-runtime: ThreadManagerImpl         │
//! │  TLS slot, trampoline, affinity backends     │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  osthread-core: descriptor, registry, masks  │
//! └──────────────────────────────────────────────┘
//! ```

// Re-export core types
pub use osthread_core::{
    CoreMask,
    IdealCore,
    NativeThreadId,
    Priority,
    ThreadBackend,
    ThreadDescriptor,
    ThreadError,
    ThreadResult,
    ThreadState,
};

// Re-export kprint macros for debug logging
pub use osthread_core::{kprint, kprintln, kerror, kwarn, kinfo, kdebug, ktrace, kfatal, kassert};
pub use osthread_core::kprint::{LogLevel, init as init_logging, set_log_level, set_flush_enabled};

// Re-export env utilities
pub use osthread_core::{env_get, env_get_bool, env_get_opt, env_get_str, env_is_set};

// Re-export runtime types
pub use osthread_runtime::{ThreadConfig, ThreadManagerImpl};

use std::sync::{Arc, OnceLock};

use osthread_core::{ThreadParams, ThreadRegistry, ThreadTable};

/// Global thread manager
static MANAGER: OnceLock<ThreadManagerImpl> = OnceLock::new();

/// Initialize the global thread manager and adopt the calling thread as main
///
/// Returns the main thread's descriptor. A second call fails with
/// [`ThreadError::AlreadyInitialized`].
pub fn init(config: ThreadConfig) -> ThreadResult<Arc<ThreadDescriptor>> {
    config.validate()?;
    let main = ThreadDescriptor::setup(
        ThreadParams::new()
            .name("main")
            .stack_size(config.default_stack_size)
            .priority(config.default_priority),
        None,
    )?;

    let mut installed = false;
    let manager = MANAGER.get_or_init(|| {
        installed = true;
        ThreadManagerImpl::new(config, Arc::new(ThreadTable::new()))
    });
    if !installed {
        return Err(ThreadError::AlreadyInitialized);
    }

    manager.initialize(&main);
    kdebug!("osthread initialized");
    Ok(main)
}

/// Check if [`init`] has completed
pub fn is_initialized() -> bool {
    MANAGER.get().is_some_and(ThreadManagerImpl::is_initialized)
}

/// The global manager, once initialized
pub fn manager() -> ThreadResult<&'static ThreadManagerImpl> {
    match MANAGER.get() {
        Some(manager) if manager.is_initialized() => Ok(manager),
        _ => Err(ThreadError::NotInitialized),
    }
}

/// Manager for an existing [`Thread`], which implies initialization
fn manager_of_live_thread() -> &'static ThreadManagerImpl {
    match MANAGER.get() {
        Some(manager) => manager,
        None => kfatal!("thread handle exists without a thread manager"),
    }
}

/// Thread factory, to configure the properties of a new thread
#[derive(Debug, Clone)]
pub struct Builder {
    name: Option<String>,
    stack_size: Option<usize>,
    priority: Option<i32>,
    ideal_core: IdealCore,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            name: None,
            stack_size: None,
            priority: None,
            ideal_core: IdealCore::UseDefault,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the thread (also used as the native thread name)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the stack size in bytes
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Set the base priority
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the preferred core
    pub fn ideal_core(mut self, ideal_core: IdealCore) -> Self {
        self.ideal_core = ideal_core;
        self
    }

    /// Spawn a native thread running `f`
    pub fn spawn<F>(self, f: F) -> ThreadResult<Thread>
    where
        F: FnOnce() + Send + 'static,
    {
        let manager = manager()?;
        if self.ideal_core == IdealCore::NoUpdate {
            return Err(ThreadError::InvalidConfig("NoUpdate is not an ideal core"));
        }

        let config = manager.config();
        let mut params = ThreadParams::new()
            .stack_size(self.stack_size.unwrap_or(config.default_stack_size))
            .priority(self.priority.unwrap_or(config.default_priority));
        if let Some(name) = self.name {
            params = params.name(name);
        }

        let descriptor = ThreadDescriptor::setup(params, Some(Box::new(f)))?;
        manager.create_thread(&descriptor, self.ideal_core);
        manager.start_thread(&descriptor);

        let id = manager.get_thread_id(&descriptor);
        manager.registry().place(id, Arc::clone(&descriptor));
        Ok(Thread { descriptor, id })
    }
}

/// Spawn a thread with default settings
pub fn spawn<F>(f: F) -> ThreadResult<Thread>
where
    F: FnOnce() + Send + 'static,
{
    Builder::new().spawn(f)
}

/// Handle to a thread created by [`spawn`] or [`Builder::spawn`]
///
/// Dropping the handle without [`join`](Thread::join) detaches the thread.
/// Either way the thread stops being indexed under its native id.
pub struct Thread {
    descriptor: Arc<ThreadDescriptor>,
    id: NativeThreadId,
}

impl Thread {
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.descriptor.name()
    }

    #[inline]
    pub fn native_id(&self) -> NativeThreadId {
        self.id
    }

    #[inline]
    pub fn descriptor(&self) -> &Arc<ThreadDescriptor> {
        &self.descriptor
    }

    /// Block until the thread has left its entry function
    pub fn wait(&self) {
        manager_of_live_thread().wait_for_exit(&self.descriptor);
    }

    /// Check whether the thread has left its entry function
    pub fn try_wait(&self) -> bool {
        manager_of_live_thread().try_wait_for_exit(&self.descriptor)
    }

    /// Wait for exit, then release the native thread
    ///
    /// An entry function that panicked makes this a fatal error.
    pub fn join(self) {
        let manager = manager_of_live_thread();
        manager.wait_for_exit(&self.descriptor);
        manager.destroy_thread(&self.descriptor);
    }

    /// `(ideal_core, affinity_mask)`
    pub fn core_mask(&self) -> (i32, CoreMask) {
        manager_of_live_thread().get_thread_core_mask(&self.descriptor)
    }

    pub fn set_core_mask(&self, ideal_core: IdealCore, mask: CoreMask) {
        manager_of_live_thread().set_thread_core_mask(&self.descriptor, ideal_core, mask);
    }

    pub fn priority(&self) -> Priority {
        manager_of_live_thread().get_current_priority(&self.descriptor)
    }

    /// Returns `true` if the new priority was applied
    pub fn set_priority(&self, priority: Priority) -> bool {
        manager_of_live_thread().change_priority(&self.descriptor, priority)
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        let registry = manager_of_live_thread().registry();
        // the id may already belong to a newer thread
        if registry
            .find(self.id)
            .is_some_and(|d| Arc::ptr_eq(&d, &self.descriptor))
        {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Thread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thread")
            .field("id", &self.id)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// Descriptor of the calling thread, registering it if it is foreign
pub fn current() -> ThreadResult<Arc<ThreadDescriptor>> {
    Ok(manager()?.get_current_thread())
}

/// Managed descriptor for a native thread id
pub fn lookup(id: NativeThreadId) -> ThreadResult<Option<Arc<ThreadDescriptor>>> {
    Ok(manager()?.registry().find(id))
}

/// Give up the current timeslice
///
/// Works before [`init`] too; it is only a scheduler hint.
#[inline]
pub fn yield_now() {
    match manager() {
        Ok(manager) => manager.yield_thread(),
        Err(_) => std::thread::yield_now(),
    }
}

/// Core the calling thread is running on (always 0 with emulated affinity)
pub fn current_core() -> ThreadResult<i32> {
    Ok(manager()?.get_current_core_number())
}

/// Cores the process may run on
pub fn available_core_mask() -> ThreadResult<CoreMask> {
    Ok(manager()?.get_thread_available_core_mask())
}
