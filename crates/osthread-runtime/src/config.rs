//! Thread manager configuration
//!
//! Defaults are compile-time constants from `osthread_core::constants`;
//! every field can be overridden through the environment.
//!
//! # Usage
//!
//! ```ignore
//! use osthread_runtime::ThreadConfig;
//!
//! // Defaults plus OST_* overrides
//! let config = ThreadConfig::from_env();
//!
//! // Or customize programmatically
//! let config = ThreadConfig::from_env()
//!     .default_stack_size(512 * 1024)
//!     .name_prefix("io");
//! ```

use osthread_core::constants::{DEFAULT_PRIORITY, DEFAULT_STACK_SIZE, MIN_STACK_SIZE};
use osthread_core::env::{env_get, env_get_bool, env_get_size, env_get_str};
use osthread_core::{Priority, ThreadError, ThreadResult};

/// Prefix for generated native thread names
pub const DEFAULT_NAME_PREFIX: &str = "osthread";

/// Backend configuration with builder pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadConfig {
    /// Stack size for threads that do not request one
    pub default_stack_size: usize,
    /// Priority for threads that do not request one, including
    /// auto-registered foreign threads
    pub default_priority: i32,
    /// Prefix for generated native thread names
    pub name_prefix: String,
    /// Give unnamed created threads a `"{prefix}-{n}"` native name
    pub name_threads: bool,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            default_stack_size: DEFAULT_STACK_SIZE,
            default_priority: DEFAULT_PRIORITY,
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            name_threads: true,
        }
    }
}

impl ThreadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `OST_STACK_SIZE` - Default stack size, bytes or `K`/`M`/`G` suffixed
    /// - `OST_DEFAULT_PRIORITY` - Priority for threads that do not request one
    /// - `OST_NAME_PREFIX` - Prefix for generated thread names
    /// - `OST_NAME_THREADS` - Name unnamed threads (0/1)
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            default_stack_size: env_get_size("OST_STACK_SIZE", d.default_stack_size),
            default_priority: env_get("OST_DEFAULT_PRIORITY", d.default_priority),
            name_prefix: env_get_str("OST_NAME_PREFIX", &d.name_prefix),
            name_threads: env_get_bool("OST_NAME_THREADS", d.name_threads),
        }
    }

    /// Set the default stack size
    pub fn default_stack_size(mut self, bytes: usize) -> Self {
        self.default_stack_size = bytes;
        self
    }

    /// Set the default thread priority
    pub fn default_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }

    /// Set the generated thread name prefix
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Enable or disable generated thread names
    pub fn name_threads(mut self, enable: bool) -> Self {
        self.name_threads = enable;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> ThreadResult<()> {
        if self.default_stack_size < MIN_STACK_SIZE {
            return Err(ThreadError::InvalidStackSize(self.default_stack_size));
        }
        if Priority::new(self.default_priority).is_none() {
            return Err(ThreadError::InvalidPriority(self.default_priority));
        }
        if self.name_threads && self.name_prefix.is_empty() {
            return Err(ThreadError::InvalidConfig("name_prefix is empty"));
        }
        if self.name_prefix.contains('\0') {
            return Err(ThreadError::InvalidName);
        }
        Ok(())
    }

    /// Native name for the `n`th unnamed created thread
    pub(crate) fn generated_name(&self, n: usize) -> Option<String> {
        self.name_threads.then(|| format!("{}-{}", self.name_prefix, n))
    }
}
