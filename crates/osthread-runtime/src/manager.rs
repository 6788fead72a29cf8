//! Thread manager backend
//!
//! [`ThreadManagerImpl`] implements [`ThreadBackend`] on top of native
//! pthreads. It owns no descriptors itself: the higher-level layer
//! allocates them, and the registry indexes them by native id so that
//! threads the manager never created can still resolve a descriptor.
//!
//! Current-thread resolution is a double lookup:
//!
//! ```text
//! TLS slot hit            -> return, no locking
//! registry hit (by id)    -> cache in TLS, return
//! miss                    -> bootstrap descriptor, place, cache, return
//! ```

use std::os::unix::thread::JoinHandleExt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use osthread_core::descriptor::AffinityState;
use osthread_core::{
    kassert, kdebug, kfatal, ktrace, CoreMask, IdealCore, NativeHandle, NativeThreadId, Priority,
    ThreadBackend, ThreadDescriptor, ThreadParams, ThreadRegistry, ThreadState,
};

use crate::affinity::{to_core_set, HostAffinity, PlatformAffinity};
use crate::config::ThreadConfig;
use crate::tls;
use crate::trampoline;
use crate::CurrentPlatform;

/// POSIX thread manager, generic over the host affinity path
pub struct ThreadManagerImpl<A: HostAffinity = PlatformAffinity> {
    config: ThreadConfig,
    registry: Arc<dyn ThreadRegistry>,
    affinity: A,
    initialized: AtomicBool,
    /// Counter for generated thread names
    spawned: AtomicUsize,
}

impl ThreadManagerImpl<PlatformAffinity> {
    /// Create a manager using this host's affinity backend
    pub fn new(config: ThreadConfig, registry: Arc<dyn ThreadRegistry>) -> Self {
        Self::with_affinity(config, registry, PlatformAffinity::default())
    }
}

impl<A: HostAffinity> ThreadManagerImpl<A> {
    pub fn with_affinity(config: ThreadConfig, registry: Arc<dyn ThreadRegistry>, affinity: A) -> Self {
        Self {
            config,
            registry,
            affinity,
            initialized: AtomicBool::new(false),
            spawned: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &Arc<dyn ThreadRegistry> {
        &self.registry
    }

    #[inline]
    pub fn affinity(&self) -> &A {
        &self.affinity
    }

    /// Check if `initialize` has run
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// First available core, the target of `IdealCore::UseDefault`
    fn default_core(available: CoreMask) -> i32 {
        match available.lowest_core() {
            Some(core) => core as i32,
            None => kfatal!("process has no available cores"),
        }
    }

    /// Bind `thread` to the calling native thread and record where it runs
    fn stamp_current(&self, thread: &ThreadDescriptor) {
        thread.bind_native_handle(CurrentPlatform::current_handle());
        *thread.affinity_lock() = AffinityState {
            ideal_core: self.affinity.current_core(),
            affinity_mask: self.affinity.available_mask(),
        };
    }

    /// Slow path of current-thread resolution
    fn resolve_current(&self) -> Arc<ThreadDescriptor> {
        let id = CurrentPlatform::thread_id(CurrentPlatform::current_handle());
        match self.registry.find(id) {
            // an exited thread, created or adopted, left `id` free for reuse
            Some(thread) if !thread.exit_signal().is_exited() => {
                tls::set_current_thread(&thread);
                return thread;
            }
            Some(_) => kdebug!("native id {} reused, replacing stale descriptor", id),
            None => {}
        }

        let params = ThreadParams::new()
            .stack_size(self.config.default_stack_size)
            .priority(self.config.default_priority);
        let thread = match ThreadDescriptor::setup(params, None) {
            Ok(thread) => thread,
            Err(e) => kfatal!("cannot bootstrap descriptor for foreign thread: {}", e),
        };
        thread.set_state(ThreadState::Started);
        thread.mark_auto_registered();
        self.stamp_current(&thread);
        self.registry.place(id, Arc::clone(&thread));
        tls::adopt_current_thread(&thread);

        kdebug!("auto-registered foreign thread {}", id);
        thread
    }
}

impl<A: HostAffinity> ThreadBackend for ThreadManagerImpl<A> {
    fn initialize(&self, main: &Arc<ThreadDescriptor>) {
        kassert!(
            !self.initialized.swap(true, Ordering::AcqRel),
            "thread manager already initialized"
        );
        tls::install();

        main.set_state(ThreadState::Started);
        self.stamp_current(main);
        tls::set_current_thread(main);
        self.registry.place(self.get_thread_id(main), Arc::clone(main));

        kdebug!("thread manager initialized, main {:?}", main);
    }

    fn create_thread(&self, thread: &Arc<ThreadDescriptor>, ideal_core: IdealCore) {
        kassert!(
            ideal_core != IdealCore::NoUpdate,
            "NoUpdate is not an ideal core for a new thread"
        );
        kassert!(
            thread.state() == ThreadState::Initialized,
            "descriptor {:?} already has a native thread",
            thread.name()
        );

        let available = self.affinity.available_mask();
        let ideal_core = match ideal_core {
            IdealCore::Core(core) => core,
            _ => Self::default_core(available),
        };
        // Written before spawn: the entry function may query its own mask
        *thread.affinity_lock() = AffinityState {
            ideal_core,
            affinity_mask: available,
        };
        thread.set_state(ThreadState::Started);

        let n = self.spawned.fetch_add(1, Ordering::Relaxed);
        let name = thread
            .name()
            .map(str::to_owned)
            .or_else(|| self.config.generated_name(n));

        let handle = trampoline::spawn(thread, name);
        thread.bind_native_handle(NativeHandle::from_raw(handle.as_pthread_t() as usize));
        thread.set_join_handle(handle);

        kdebug!(
            "created thread {:?} ideal_core={} mask={}",
            thread.name(),
            ideal_core,
            available
        );
    }

    fn destroy_thread(&self, thread: &ThreadDescriptor) {
        kassert!(
            thread.exit_signal().is_exited(),
            "destroying thread {:?} before it exited",
            thread.name()
        );
        let Some(handle) = thread.take_join_handle() else {
            kfatal!("thread {:?} has no native thread to join", thread.name());
        };
        if handle.join().is_err() {
            kfatal!("joining thread {:?} failed: entry function panicked", thread.name());
        }
        thread.set_state(ThreadState::Terminated);
        kdebug!("destroyed thread {:?}", thread.name());
    }

    fn start_thread(&self, _thread: &ThreadDescriptor) {
        // native threads run as soon as they are spawned
    }

    fn wait_for_exit(&self, thread: &ThreadDescriptor) {
        thread.exit_signal().wait();
    }

    fn try_wait_for_exit(&self, thread: &ThreadDescriptor) -> bool {
        thread.exit_signal().is_exited()
    }

    fn yield_thread(&self) {
        CurrentPlatform::yield_now();
    }

    fn change_priority(&self, thread: &ThreadDescriptor, priority: Priority) -> bool {
        ktrace!(
            "priority change for {:?} to {} not applied",
            thread.name(),
            priority
        );
        false
    }

    fn get_current_priority(&self, thread: &ThreadDescriptor) -> Priority {
        thread.base_priority()
    }

    fn get_thread_id(&self, thread: &ThreadDescriptor) -> NativeThreadId {
        CurrentPlatform::thread_id(thread.native_handle())
    }

    fn suspend_thread_unsafe(&self, thread: &ThreadDescriptor) {
        kfatal!("suspend not supported on this host (thread {:?})", thread.name());
    }

    fn resume_thread_unsafe(&self, thread: &ThreadDescriptor) {
        kfatal!("resume not supported on this host (thread {:?})", thread.name());
    }

    fn set_current_thread(&self, thread: &Arc<ThreadDescriptor>) {
        tls::set_current_thread(thread);
    }

    fn get_current_thread(&self) -> Arc<ThreadDescriptor> {
        match tls::current_thread() {
            Some(thread) => thread,
            None => self.resolve_current(),
        }
    }

    fn get_current_core_number(&self) -> i32 {
        self.affinity.current_core()
    }

    fn set_thread_core_mask(&self, thread: &ThreadDescriptor, ideal_core: IdealCore, mask: CoreMask) {
        kassert!(
            !thread.state().is_terminated(),
            "setting core mask of terminated thread {:?}",
            thread.name()
        );

        let (ideal_core, mask) = match ideal_core {
            IdealCore::UseDefault => {
                let available = self.affinity.available_mask();
                (IdealCore::Core(Self::default_core(available)), available)
            }
            other => (other, mask),
        };

        let mut state = thread.affinity_lock();
        let (set, applied) = to_core_set::<A::Set>(mask);
        kassert!(!applied.is_empty(), "core mask {} selects no usable core", mask);

        let rc = self.affinity.set_thread_affinity(thread.native_handle(), &set);
        kassert!(rc == 0, "applying core mask {} failed: {}", applied, rc);

        if let IdealCore::Core(core) = ideal_core {
            state.ideal_core = core;
        }
        state.affinity_mask = applied;

        ktrace!(
            "core mask for {:?}: ideal_core={} mask={}",
            thread.name(),
            state.ideal_core,
            applied
        );
    }

    fn get_thread_core_mask(&self, thread: &ThreadDescriptor) -> (i32, CoreMask) {
        let state = thread.affinity();
        (state.ideal_core, state.affinity_mask)
    }

    fn get_thread_available_core_mask(&self) -> CoreMask {
        self.affinity.available_mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::{EmulatedAffinity, RecordingPin};
    use osthread_core::ThreadTable;
    use std::sync::mpsc;
    use std::sync::Barrier;
    use std::thread;

    fn manager() -> ThreadManagerImpl {
        ThreadManagerImpl::new(ThreadConfig::default(), Arc::new(ThreadTable::new()))
    }

    fn emulated(cores: usize) -> ThreadManagerImpl<EmulatedAffinity<RecordingPin>> {
        ThreadManagerImpl::with_affinity(
            ThreadConfig::default(),
            Arc::new(ThreadTable::new()),
            EmulatedAffinity::new(RecordingPin::with_cores(cores)),
        )
    }

    fn descriptor<F>(entry: F) -> Arc<ThreadDescriptor>
    where
        F: FnOnce() + Send + 'static,
    {
        ThreadDescriptor::setup(ThreadParams::new(), Some(Box::new(entry))).unwrap()
    }

    /// Descriptor whose entry blocks until the returned sender is used or dropped
    fn parked() -> (Arc<ThreadDescriptor>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel::<()>();
        let thread = descriptor(move || {
            let _ = rx.recv();
        });
        (thread, tx)
    }

    #[test]
    fn test_create_wait_destroy() {
        let mgr = manager();
        let (tx, rx) = mpsc::channel();
        let thread = descriptor(move || tx.send(42).unwrap());

        mgr.create_thread(&thread, IdealCore::UseDefault);
        mgr.start_thread(&thread);
        assert_eq!(thread.state(), ThreadState::Started);

        mgr.wait_for_exit(&thread);
        assert!(mgr.try_wait_for_exit(&thread));
        mgr.destroy_thread(&thread);

        assert_eq!(thread.state(), ThreadState::Terminated);
        assert_eq!(rx.recv().unwrap(), 42);
    }

    #[test]
    fn test_try_wait_before_exit() {
        let mgr = manager();
        let (thread, release) = parked();
        mgr.create_thread(&thread, IdealCore::UseDefault);

        assert!(!mgr.try_wait_for_exit(&thread));
        release.send(()).unwrap();
        mgr.wait_for_exit(&thread);
        assert!(mgr.try_wait_for_exit(&thread));
        mgr.destroy_thread(&thread);
    }

    #[test]
    fn test_concurrent_waiters() {
        let mgr = Arc::new(manager());
        let (thread, release) = parked();
        mgr.create_thread(&thread, IdealCore::UseDefault);

        let barrier = Arc::new(Barrier::new(5));
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let mgr = Arc::clone(&mgr);
                let thread = Arc::clone(&thread);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    mgr.wait_for_exit(&thread);
                    assert!(mgr.try_wait_for_exit(&thread));
                })
            })
            .collect();

        barrier.wait();
        release.send(()).unwrap();
        for w in waiters {
            w.join().unwrap();
        }

        // late waiter returns immediately
        mgr.wait_for_exit(&thread);
        mgr.destroy_thread(&thread);
    }

    #[test]
    #[should_panic(expected = "before it exited")]
    fn test_destroy_before_exit_is_fatal() {
        let mgr = manager();
        let (thread, _release) = parked();
        mgr.create_thread(&thread, IdealCore::UseDefault);
        mgr.destroy_thread(&thread);
    }

    #[test]
    #[should_panic(expected = "entry function panicked")]
    fn test_destroy_after_panicking_entry_is_fatal() {
        let mgr = manager();
        let thread = descriptor(|| panic!("boom"));
        mgr.create_thread(&thread, IdealCore::UseDefault);
        mgr.wait_for_exit(&thread);
        mgr.destroy_thread(&thread);
    }

    #[test]
    fn test_create_resolves_default_core() {
        let mgr = manager();
        let available = mgr.get_thread_available_core_mask();
        assert!(!available.is_empty());

        let (thread, release) = parked();
        mgr.create_thread(&thread, IdealCore::UseDefault);

        let (ideal, mask) = mgr.get_thread_core_mask(&thread);
        assert_eq!(ideal, available.lowest_core().unwrap() as i32);
        assert_eq!(mask, available);

        release.send(()).unwrap();
        mgr.wait_for_exit(&thread);
        mgr.destroy_thread(&thread);
    }

    #[test]
    fn test_create_with_explicit_core() {
        let mgr = manager();
        let (thread, release) = parked();
        mgr.create_thread(&thread, IdealCore::Core(3));
        assert_eq!(mgr.get_thread_core_mask(&thread).0, 3);
        drop(release);
        mgr.wait_for_exit(&thread);
        mgr.destroy_thread(&thread);
    }

    #[test]
    #[should_panic(expected = "NoUpdate")]
    fn test_create_with_no_update_is_fatal() {
        let mgr = manager();
        let (thread, _release) = parked();
        mgr.create_thread(&thread, IdealCore::NoUpdate);
    }

    #[test]
    fn test_set_core_mask_round_trip() {
        let mgr = manager();
        let available = mgr.get_thread_available_core_mask();
        let core = available.lowest_core().unwrap();

        let (thread, release) = parked();
        mgr.create_thread(&thread, IdealCore::UseDefault);

        mgr.set_thread_core_mask(&thread, IdealCore::Core(core as i32), CoreMask::single(core));
        assert_eq!(
            mgr.get_thread_core_mask(&thread),
            (core as i32, CoreMask::single(core))
        );

        // NoUpdate keeps the ideal core
        mgr.set_thread_core_mask(&thread, IdealCore::NoUpdate, available);
        assert_eq!(mgr.get_thread_core_mask(&thread), (core as i32, available));

        mgr.set_thread_core_mask(&thread, IdealCore::UseDefault, CoreMask::EMPTY);
        assert_eq!(mgr.get_thread_core_mask(&thread), (core as i32, available));

        release.send(()).unwrap();
        mgr.wait_for_exit(&thread);
        mgr.destroy_thread(&thread);
    }

    #[test]
    fn test_created_thread_sees_itself() {
        let mgr = Arc::new(manager());
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&mgr);
        let thread = ThreadDescriptor::setup(
            ThreadParams::new().name("self-check"),
            Some(Box::new(move || {
                let me = inner.get_current_thread();
                let id = CurrentPlatform::thread_id(CurrentPlatform::current_handle());
                let name = thread::current().name().map(str::to_owned);
                tx.send((me, id, name)).unwrap();
            })),
        )
        .unwrap();

        mgr.create_thread(&thread, IdealCore::UseDefault);
        let (me, id, name) = rx.recv().unwrap();
        mgr.wait_for_exit(&thread);

        assert!(Arc::ptr_eq(&me, &thread));
        assert!(!me.is_auto_registered());
        assert_eq!(mgr.get_thread_id(&thread), id);
        assert_eq!(name.as_deref(), Some("self-check"));
        mgr.destroy_thread(&thread);
    }

    #[test]
    fn test_unnamed_thread_gets_generated_name() {
        let mgr = manager();
        let (tx, rx) = mpsc::channel();
        let thread = descriptor(move || {
            tx.send(thread::current().name().map(str::to_owned)).unwrap();
        });
        mgr.create_thread(&thread, IdealCore::UseDefault);

        let name = rx.recv().unwrap().unwrap();
        assert!(name.starts_with("osthread-"), "{}", name);
        mgr.wait_for_exit(&thread);
        mgr.destroy_thread(&thread);
    }

    /// Run `f` on a fresh native thread, re-raising its panic here
    fn on_fresh_thread<F: FnOnce() + Send + 'static>(f: F) {
        if let Err(payload) = thread::spawn(f).join() {
            std::panic::resume_unwind(payload);
        }
    }

    #[test]
    fn test_initialize_adopts_main() {
        on_fresh_thread(|| {
            let mgr = manager();
            let main = ThreadDescriptor::setup(ThreadParams::new().name("main"), None).unwrap();
            mgr.initialize(&main);

            assert!(mgr.is_initialized());
            assert_eq!(main.state(), ThreadState::Started);
            assert!(!main.is_auto_registered());
            assert_eq!(main.affinity().affinity_mask, mgr.get_thread_available_core_mask());
            assert!(Arc::ptr_eq(&mgr.get_current_thread(), &main));
            assert_eq!(mgr.registry().len(), 1);

            // registry path also returns main, without allocating
            tls::clear_current_thread();
            assert!(Arc::ptr_eq(&mgr.get_current_thread(), &main));
            assert_eq!(mgr.registry().len(), 1);
        });
    }

    #[test]
    #[should_panic(expected = "already initialized")]
    fn test_initialize_twice_is_fatal() {
        on_fresh_thread(|| {
            let mgr = manager();
            let main = ThreadDescriptor::setup(ThreadParams::new(), None).unwrap();
            mgr.initialize(&main);
            mgr.initialize(&main);
        });
    }

    #[test]
    fn test_foreign_thread_bootstrap() {
        let mgr = Arc::new(manager());
        let inner = Arc::clone(&mgr);
        let (first, second, id, state) = thread::spawn(move || {
            let first = inner.get_current_thread();
            let second = inner.get_current_thread();
            let id = CurrentPlatform::thread_id(CurrentPlatform::current_handle());
            let state = first.state();
            (first, second, id, state)
        })
        .join()
        .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.is_auto_registered());
        assert_eq!(state, ThreadState::Started);
        assert_eq!(first.state(), ThreadState::Terminated);
        assert_eq!(first.base_priority(), Priority::DEFAULT);
        assert!(first.take_entry().is_none());
        assert!(!first.affinity().affinity_mask.is_empty());
        assert!(Arc::ptr_eq(&mgr.registry().find(id).unwrap(), &first));
    }

    #[test]
    fn test_foreign_thread_after_exit_gets_fresh_descriptor() {
        let mgr = Arc::new(manager());
        let resolve = |mgr: &Arc<ThreadManagerImpl>| {
            let inner = Arc::clone(mgr);
            thread::spawn(move || {
                let me = inner.get_current_thread();
                let id = CurrentPlatform::thread_id(CurrentPlatform::current_handle());
                (me, id)
            })
            .join()
            .unwrap()
        };

        for _ in 0..20 {
            let (first, first_id) = resolve(&mgr);
            assert!(first.exit_signal().is_exited());
            assert_eq!(first.state(), ThreadState::Terminated);

            let (second, second_id) = resolve(&mgr);
            assert!(second.is_auto_registered());
            assert!(!Arc::ptr_eq(&first, &second));
            if first_id == second_id {
                // reused id now maps to the new descriptor
                assert!(Arc::ptr_eq(&mgr.registry().find(second_id).unwrap(), &second));
            }
        }
    }

    #[test]
    fn test_foreign_thread_reusing_created_thread_id() {
        let mgr = Arc::new(manager());
        let created = descriptor(|| {});
        mgr.create_thread(&created, IdealCore::UseDefault);
        mgr.wait_for_exit(&created);
        let created_id = mgr.get_thread_id(&created);
        mgr.registry().place(created_id, Arc::clone(&created));
        mgr.destroy_thread(&created);

        let inner = Arc::clone(&mgr);
        let foreign = thread::spawn(move || inner.get_current_thread())
            .join()
            .unwrap();
        assert!(foreign.is_auto_registered());
        assert!(!Arc::ptr_eq(&foreign, &created));
    }

    #[test]
    fn test_concurrent_foreign_resolution() {
        let mgr = Arc::new(manager());
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mgr = Arc::clone(&mgr);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let a = mgr.get_current_thread();
                    let b = mgr.get_current_thread();
                    assert!(Arc::ptr_eq(&a, &b));
                    a
                })
            })
            .collect();
        let resolved: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(mgr.registry().len(), 8);
        for (i, a) in resolved.iter().enumerate() {
            for b in &resolved[i + 1..] {
                assert!(!Arc::ptr_eq(a, b));
            }
        }
    }

    #[test]
    fn test_bootstrap_uses_configured_priority() {
        let mgr = ThreadManagerImpl::new(
            ThreadConfig::new().default_priority(4),
            Arc::new(ThreadTable::new()),
        );
        let mgr = Arc::new(mgr);
        let inner = Arc::clone(&mgr);
        let priority = thread::spawn(move || {
            let me = inner.get_current_thread();
            inner.get_current_priority(&me)
        })
        .join()
        .unwrap();
        assert_eq!(priority.get(), 4);
    }

    #[test]
    fn test_change_priority_not_applied() {
        let mgr = manager();
        let thread = ThreadDescriptor::setup(ThreadParams::new().priority(10), None).unwrap();
        assert!(!mgr.change_priority(&thread, Priority::HIGHEST));
        assert_eq!(mgr.get_current_priority(&thread).get(), 10);
    }

    #[test]
    #[should_panic(expected = "suspend not supported")]
    fn test_suspend_is_fatal() {
        let mgr = manager();
        let thread = ThreadDescriptor::setup(ThreadParams::new(), None).unwrap();
        mgr.suspend_thread_unsafe(&thread);
    }

    #[test]
    #[should_panic(expected = "resume not supported")]
    fn test_resume_is_fatal() {
        let mgr = manager();
        let thread = ThreadDescriptor::setup(ThreadParams::new(), None).unwrap();
        mgr.resume_thread_unsafe(&thread);
    }

    #[test]
    fn test_yield_and_core_number() {
        let mgr = manager();
        mgr.yield_thread();
        assert!(mgr.get_current_core_number() >= 0);
    }

    // ------------------------------------------------------------------
    // Emulated affinity path
    // ------------------------------------------------------------------

    #[test]
    fn test_emulated_default_creation() {
        let mgr = emulated(3);
        assert_eq!(mgr.get_thread_available_core_mask(), CoreMask::from_bits(0b0111));

        let (a, release_a) = parked();
        let (b, release_b) = parked();
        mgr.create_thread(&a, IdealCore::UseDefault);
        mgr.create_thread(&b, IdealCore::UseDefault);

        assert_eq!(mgr.get_thread_core_mask(&a), (0, CoreMask::from_bits(0b0111)));
        assert_eq!(mgr.get_thread_core_mask(&b), (0, CoreMask::from_bits(0b0111)));
        assert!(mgr.affinity().pin().pins().is_empty());

        drop((release_a, release_b));
        for t in [&a, &b] {
            mgr.wait_for_exit(t);
            mgr.destroy_thread(t);
        }
    }

    #[test]
    fn test_emulated_multi_core_mask_not_pinned() {
        let mgr = emulated(4);
        let (thread, release) = parked();
        mgr.create_thread(&thread, IdealCore::UseDefault);

        mgr.set_thread_core_mask(&thread, IdealCore::Core(1), CoreMask::from_bits(0b0110));
        assert!(mgr.affinity().pin().pins().is_empty());
        assert_eq!(mgr.get_thread_core_mask(&thread), (1, CoreMask::from_bits(0b0110)));

        drop(release);
        mgr.wait_for_exit(&thread);
        mgr.destroy_thread(&thread);
    }

    #[test]
    fn test_emulated_single_core_pins() {
        let mgr = emulated(4);
        let (thread, release) = parked();
        mgr.create_thread(&thread, IdealCore::UseDefault);

        mgr.set_thread_core_mask(&thread, IdealCore::NoUpdate, CoreMask::single(2));
        assert_eq!(mgr.affinity().pin().pins(), vec![(thread.native_handle(), 2)]);
        assert_eq!(mgr.get_thread_core_mask(&thread), (0, CoreMask::single(2)));

        drop(release);
        mgr.wait_for_exit(&thread);
        mgr.destroy_thread(&thread);
    }

    #[test]
    fn test_emulated_mask_truncated_to_capacity() {
        let mgr = emulated(4);
        let (thread, release) = parked();
        mgr.create_thread(&thread, IdealCore::UseDefault);

        let requested = CoreMask::from_bits((1 << 40) | (1 << 1));
        mgr.set_thread_core_mask(&thread, IdealCore::Core(1), requested);
        assert_eq!(mgr.get_thread_core_mask(&thread), (1, CoreMask::single(1)));
        assert_eq!(mgr.affinity().pin().pins(), vec![(thread.native_handle(), 1)]);

        drop(release);
        mgr.wait_for_exit(&thread);
        mgr.destroy_thread(&thread);
    }

    #[test]
    #[should_panic(expected = "selects no usable core")]
    fn test_empty_core_mask_is_fatal() {
        let mgr = emulated(4);
        let (thread, _release) = parked();
        mgr.create_thread(&thread, IdealCore::UseDefault);
        mgr.set_thread_core_mask(&thread, IdealCore::NoUpdate, CoreMask::EMPTY);
    }

    #[test]
    fn test_emulated_current_core_is_zero() {
        assert_eq!(emulated(8).get_current_core_number(), 0);
    }
}
