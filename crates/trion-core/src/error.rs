//! Error taxonomy and the thread-local last-error slot.
//!
//! Errors are never thrown across the runtime's API surface: every entry
//! point returns a `Result`, and callers that want diagnostic detail read
//! [`last_error`] immediately afterward. The slot is per-thread so
//! concurrent callers never see each other's messages; only the act of
//! replacing the stored message takes the shared lock, serializing frees of
//! the prior value as spec'd — the slot itself needs no cross-thread
//! synchronization.

use std::cell::RefCell;

use parking_lot::Mutex;
use thiserror::Error;

use trion_membrane::MembraneError;

/// Full error taxonomy for the Trion runtime core.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TrionError {
    /// A contract was violated by the caller.
    #[error("invalid arguments")]
    InvalidArgs,
    /// An allocation failed; callee state is left unchanged.
    #[error("out of memory")]
    OutOfMemory,
    /// Allocation was attempted on a sealed quarantine.
    #[error("quarantine is sealed")]
    Sealed,
    /// A lookup (quarantine free, syscall invoke) found no matching entry.
    #[error("not found")]
    NotFound,
    /// Send was attempted on a closed channel.
    #[error("channel is closed")]
    Closed,
    /// Recv was attempted on a channel that is closed and empty.
    #[error("channel is closed and drained")]
    Drained,
    /// A non-blocking operation could not proceed immediately.
    #[error("operation would block")]
    WouldBlock,
    /// A bounded wait elapsed before the operation could proceed.
    #[error("operation timed out")]
    Timeout,
    /// A syscall's auth token did not match the registered one.
    #[error("authentication failed")]
    AuthFailed,
    /// A syscall handler returned a non-zero status.
    #[error("handler failed")]
    HandlerFailed,
    /// The capsule is already running; `start` may only be called once.
    #[error("capsule already running")]
    AlreadyRunning,
    /// The worker thread failed to spawn.
    #[error("failed to spawn worker thread")]
    SpawnFailed,
    /// A `u64` base-12 decode exceeded the 64-bit range.
    #[error("value overflows u64")]
    Overflow,
    /// The JIT collaborator's build step (clang/nasm) failed.
    #[error("build failed: {0}")]
    BuildFailed(String),
    /// The JIT collaborator could not resolve the requested symbol.
    #[error("symbol not found")]
    SymbolNotFound,
}

/// Result alias used throughout `trion-core`.
pub type TrionResult<T> = Result<T, TrionError>;

impl From<MembraneError> for TrionError {
    fn from(e: MembraneError) -> Self {
        match e {
            MembraneError::InvalidArgs => TrionError::InvalidArgs,
            MembraneError::OutOfMemory => TrionError::OutOfMemory,
            MembraneError::Sealed => TrionError::Sealed,
            MembraneError::NotFound => TrionError::NotFound,
            MembraneError::Closed => TrionError::Closed,
            MembraneError::Drained => TrionError::Drained,
            MembraneError::WouldBlock => TrionError::WouldBlock,
            MembraneError::Timeout => TrionError::Timeout,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Leaf lock serializing replacement of the *previous* thread's message is
/// unnecessary since the slot is thread-local; this lock exists only to
/// match the spec's "shared lock for safe replacement" contract for callers
/// that format messages involving shared state (e.g. the audit log path
/// below formatting alongside a write). Kept as a leaf lock — never nests
/// another.
static ERROR_FORMAT_LOCK: Mutex<()> = Mutex::new(());

/// Replace the calling thread's last-error message.
pub fn set_last_error(message: impl Into<String>) {
    let _guard = ERROR_FORMAT_LOCK.lock();
    let message = message.into();
    LAST_ERROR.with(|slot| {
        *slot.borrow_mut() = message;
    });
}

/// Replace the calling thread's last-error message from a [`TrionError`].
pub fn set_last_error_from(err: TrionError) {
    set_last_error(err.to_string());
}

/// Read the calling thread's last-error message, or an empty string if none
/// has been set.
#[must_use]
pub fn last_error() -> String {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Clear the calling thread's last-error message.
pub fn clear_last_error() {
    LAST_ERROR.with(|slot| slot.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_error_roundtrip() {
        clear_last_error();
        assert_eq!(last_error(), "");
        set_last_error("boom");
        assert_eq!(last_error(), "boom");
        clear_last_error();
        assert_eq!(last_error(), "");
    }

    #[test]
    fn last_error_is_thread_local() {
        clear_last_error();
        set_last_error("main-thread-error");
        let handle = std::thread::spawn(|| {
            assert_eq!(last_error(), "");
            set_last_error("other-thread-error");
            last_error()
        });
        assert_eq!(handle.join().unwrap(), "other-thread-error");
        assert_eq!(last_error(), "main-thread-error");
    }

    #[test]
    fn membrane_error_conversion() {
        assert_eq!(TrionError::from(MembraneError::Sealed), TrionError::Sealed);
        assert_eq!(
            TrionError::from(MembraneError::Drained),
            TrionError::Drained
        );
    }
}
