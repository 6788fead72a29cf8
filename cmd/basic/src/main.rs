//! Basic osthread example
//!
//! Spawns a few native threads, pins one of them, and resolves the
//! descriptor of a thread the library did not create.
//!
//! # Environment Variables
//!
//! - `OST_FLUSH_EPRINT=1` - Flush debug output immediately (useful for crash debugging)
//! - `OST_LOG_LEVEL=debug` - Set log level (off, error, warn, info, debug, trace)
//! - `OST_NAME_PREFIX=demo` - Prefix for generated thread names

use osthread::{Builder, CoreMask, IdealCore, ThreadConfig};
use osthread::{kinfo, kdebug};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
// OST_LOG_LEVEL=debug OST_FLUSH_EPRINT=1 cargo run -p osthread-basic
fn main() -> osthread::ThreadResult<()> {
    println!("=== osthread Basic Example ===\n");

    let main = osthread::init(ThreadConfig::from_env())?;
    let available = osthread::available_core_mask()?;
    println!("main: {:?}", main);
    println!("available cores: {} ({} cores)", available, available.count());

    let completed = Arc::new(AtomicUsize::new(0));
    let mut threads = Vec::new();

    kinfo!("Spawning threads...");
    for i in 1..=3 {
        let c = completed.clone();
        let t = Builder::new().priority(8 + i).spawn(move || {
            let me = osthread::current().unwrap();
            kdebug!("[thread {}] started as {:?}", i, me.name());
            for _ in 0..3 {
                osthread::yield_now();
            }
            c.fetch_add(1, Ordering::SeqCst);
        })?;
        println!("Spawned thread {} (id={}, mask={:?})", i, t.native_id(), t.core_mask());
        threads.push(t);
    }

    // Pin a named thread to the last available core
    let last = available.iter().last().unwrap_or(0);
    let (release, rx) = std::sync::mpsc::channel::<()>();
    let pinned = Builder::new()
        .name("pinned")
        .ideal_core(IdealCore::Core(last as i32))
        .spawn(move || {
            let _ = rx.recv();
            kdebug!("[pinned] running on core {:?}", osthread::current_core());
        })?;
    pinned.set_core_mask(IdealCore::NoUpdate, CoreMask::single(last));
    let (ideal, mask) = pinned.core_mask();
    println!("Pinned thread: ideal_core={} mask={}", ideal, mask);
    drop(release);
    threads.push(pinned);

    // A thread spawned behind the library's back still gets a descriptor
    let foreign = std::thread::spawn(|| {
        let me = osthread::current().unwrap();
        (me.is_auto_registered(), me.base_priority())
    })
    .join()
    .unwrap();
    println!("Foreign thread: auto_registered={} priority={}", foreign.0, foreign.1);

    println!("\nWaiting for {} threads to finish...\n", threads.len());
    for t in threads {
        t.join();
    }

    kinfo!("{} counting thread(s) completed", completed.load(Ordering::SeqCst));
    println!("\n=== Example Complete ===");
    Ok(())
}
