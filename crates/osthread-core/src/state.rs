//! Thread lifecycle state and priority types

use core::fmt;
use crate::constants::{DEFAULT_PRIORITY, HIGHEST_PRIORITY, LOWEST_PRIORITY};

/// Lifecycle state of a thread descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ThreadState {
    /// Static fields populated, no native thread running yet
    Initialized = 0,

    /// Backed by a running (or finished but not joined) native thread
    Started = 1,

    /// Native thread joined, descriptor may be released
    Terminated = 2,
}

impl ThreadState {
    /// Check if a native thread has been attached to the descriptor
    #[inline]
    pub const fn is_started(&self) -> bool {
        matches!(self, ThreadState::Started)
    }

    /// Check if the native thread has been joined
    #[inline]
    pub const fn is_terminated(&self) -> bool {
        matches!(self, ThreadState::Terminated)
    }
}

impl From<u8> for ThreadState {
    fn from(v: u8) -> Self {
        match v {
            1 => ThreadState::Started,
            2 => ThreadState::Terminated,
            _ => ThreadState::Initialized,
        }
    }
}

impl From<ThreadState> for u8 {
    fn from(state: ThreadState) -> u8 {
        state as u8
    }
}

/// Thread priority
///
/// Lower values are more urgent. The host backend stores the value but
/// never applies it to the native thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Priority(i32);

impl Priority {
    /// Most urgent priority
    pub const HIGHEST: Priority = Priority(HIGHEST_PRIORITY);

    /// Least urgent priority
    pub const LOWEST: Priority = Priority(LOWEST_PRIORITY);

    /// Default priority for new threads
    pub const DEFAULT: Priority = Priority(DEFAULT_PRIORITY);

    /// Create a priority, returning `None` if out of range
    #[inline]
    pub const fn new(value: i32) -> Option<Priority> {
        if value >= HIGHEST_PRIORITY && value <= LOWEST_PRIORITY {
            Some(Priority(value))
        } else {
            None
        }
    }

    /// Get the raw priority value
    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DEFAULT
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
