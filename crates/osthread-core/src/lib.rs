//! # osthread-core
//!
//! Core types and traits for the osthread host thread backend.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! All platform-specific implementations are in `osthread-runtime`.
//!
//! ## Modules
//!
//! - `id` - Native handle and native thread identifier types
//! - `state` - Thread lifecycle state and priority
//! - `mask` - Core affinity bitmask and ideal-core request types
//! - `descriptor` - Thread descriptor, exit signal and affinity state
//! - `registry` - Descriptor registry (lookup by native identity)
//! - `error` - Error types
//! - `traits` - Backend contract implemented per platform
//! - `kprint` - Kernel-style debug printing and fatal assertion macros
//! - `env` - Environment variable utilities

pub mod id;
pub mod state;
pub mod mask;
pub mod descriptor;
pub mod registry;
pub mod error;
pub mod traits;
pub mod kprint;
pub mod env;

// Re-exports for convenience
pub use id::{NativeHandle, NativeThreadId};
pub use state::{ThreadState, Priority};
pub use mask::{CoreMask, IdealCore};
pub use descriptor::{ThreadDescriptor, ThreadParams, EntryFn};
pub use registry::{ThreadRegistry, ThreadTable};
pub use error::{ThreadError, ThreadResult};
pub use traits::ThreadBackend;
pub use env::{env_get, env_get_bool, env_get_opt, env_get_str, env_is_set};

/// Constants shared by the backend and the facade
pub mod constants {
    /// Number of cores a [`CoreMask`](crate::mask::CoreMask) can describe
    pub const MAX_CORES: usize = 64;

    /// Highest (most urgent) thread priority
    pub const HIGHEST_PRIORITY: i32 = 0;

    /// Lowest thread priority
    pub const LOWEST_PRIORITY: i32 = 31;

    /// Priority given to threads that do not ask for one
    pub const DEFAULT_PRIORITY: i32 = 16;

    /// Smallest stack a created thread may request
    pub const MIN_STACK_SIZE: usize = 16 * 1024;

    cfg_if::cfg_if! {
        if #[cfg(target_pointer_width = "64")] {
            /// Default native stack size (2 MiB)
            pub const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;
        } else {
            /// Default native stack size (256 KiB)
            pub const DEFAULT_STACK_SIZE: usize = 256 * 1024;
        }
    }
}
