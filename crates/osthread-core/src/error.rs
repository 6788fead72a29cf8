//! Error types for osthread
//!
//! Native-call failures inside the backend are fatal assertions (see
//! [`kassert!`](crate::kassert)), so only caller-facing validation and
//! initialization ordering show up here.

use core::fmt;

/// Result type for recoverable osthread operations
pub type ThreadResult<T> = Result<T, ThreadError>;

/// Errors reported to callers of the setup and facade layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadError {
    /// Priority outside `HIGHEST_PRIORITY..=LOWEST_PRIORITY`
    InvalidPriority(i32),

    /// Stack size below `MIN_STACK_SIZE`
    InvalidStackSize(usize),

    /// Thread name contains an interior NUL byte
    InvalidName,

    /// Configuration value rejected by validation
    InvalidConfig(&'static str),

    /// Thread manager used before initialization
    NotInitialized,

    /// Thread manager initialized twice
    AlreadyInitialized,
}

impl fmt::Display for ThreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadError::InvalidPriority(p) => write!(f, "invalid thread priority: {}", p),
            ThreadError::InvalidStackSize(s) => write!(f, "invalid stack size: {} bytes", s),
            ThreadError::InvalidName => write!(f, "thread name contains a NUL byte"),
            ThreadError::InvalidConfig(what) => write!(f, "invalid configuration: {}", what),
            ThreadError::NotInitialized => write!(f, "thread manager not initialized"),
            ThreadError::AlreadyInitialized => write!(f, "thread manager already initialized"),
        }
    }
}

impl std::error::Error for ThreadError {}
