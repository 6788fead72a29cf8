//! Native thread identity types

use core::fmt;

/// Opaque handle to the native thread backing a descriptor
///
/// Holds a `pthread_t` widened to `usize`. The runtime converts it back
/// with an `as` cast; nothing outside the runtime should interpret the value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NativeHandle(usize);

impl NativeHandle {
    /// Wrap a raw native handle value
    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        NativeHandle(raw)
    }

    /// Get the raw handle value
    #[inline]
    pub const fn as_raw(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({:#x})", self.0)
    }
}

/// Platform-unique identifier of a native thread
///
/// Only meaningful for equality. It deliberately does not implement `Ord`:
/// depending on the host it is either a kernel thread id or the native
/// handle itself, and neither has a useful ordering.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NativeThreadId(u64);

impl NativeThreadId {
    /// Create a new id from a raw value
    #[inline]
    pub const fn new(id: u64) -> Self {
        NativeThreadId(id)
    }

    /// Get the raw u64 value
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<NativeHandle> for NativeThreadId {
    #[inline]
    fn from(handle: NativeHandle) -> Self {
        NativeThreadId(handle.as_raw() as u64)
    }
}

impl fmt::Debug for NativeThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeThreadId({})", self.0)
    }
}

impl fmt::Display for NativeThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
