//! Current-thread resolution: TLS fast path vs registry lookup

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use osthread_core::{ThreadBackend, ThreadDescriptor, ThreadParams, ThreadTable};
use osthread_runtime::{tls, ThreadConfig, ThreadManagerImpl};

fn bench_current_thread(c: &mut Criterion) {
    let manager = ThreadManagerImpl::new(ThreadConfig::default(), Arc::new(ThreadTable::new()));
    let main = ThreadDescriptor::setup(ThreadParams::new().name("bench-main"), None)
        .expect("valid params");
    manager.initialize(&main);

    c.bench_function("current_thread/tls_hit", |b| {
        b.iter(|| black_box(manager.get_current_thread()))
    });

    c.bench_function("current_thread/registry_hit", |b| {
        b.iter(|| {
            tls::clear_current_thread();
            black_box(manager.get_current_thread())
        })
    });

    c.bench_function("available_core_mask", |b| {
        b.iter(|| black_box(manager.get_thread_available_core_mask()))
    });
}

criterion_group!(benches, bench_current_thread);
criterion_main!(benches);
