//! # osthread-runtime
//!
//! POSIX host backend for the osthread thread manager.
//!
//! This crate provides:
//! - [`ThreadManagerImpl`], the [`ThreadBackend`](osthread_core::ThreadBackend)
//!   implementation on native pthreads
//! - Thread-local current-descriptor slot
//! - The generic trampoline run by every created thread
//! - Core affinity, native bitmask or emulated single-core pinning
//! - Environment-driven configuration

pub mod config;
pub mod tls;
pub mod affinity;
pub mod manager;
mod trampoline;

// Re-exports
pub use config::ThreadConfig;
pub use manager::ThreadManagerImpl;
pub use affinity::{EmulatedAffinity, HostAffinity, PlatformAffinity, SingleCorePin};

// Platform detection
cfg_if::cfg_if! {
    if #[cfg(any(target_os = "linux", target_os = "android"))] {
        mod platform_linux;
        pub use platform_linux::LinuxPlatform as CurrentPlatform;
    } else if #[cfg(target_vendor = "apple")] {
        mod platform_macos;
        pub use platform_macos::MacOSPlatform as CurrentPlatform;
    } else {
        compile_error!("Unsupported platform");
    }
}
