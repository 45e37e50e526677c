//! Shared error taxonomy for the tracked-allocation and channel primitives.
//!
//! Mirrors the status-code table the C-linkage facade maps to integers;
//! see `trion-abi` for the return-code conversion.

use thiserror::Error;

/// Errors produced by quarantine and channel operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MembraneError {
    /// A contract was violated by the caller (null handle, zero size, capacity 0, ...).
    #[error("invalid arguments")]
    InvalidArgs,
    /// The system allocator failed; callee state is left unchanged.
    #[error("out of memory")]
    OutOfMemory,
    /// Allocation was attempted on a sealed quarantine.
    #[error("quarantine is sealed")]
    Sealed,
    /// A quarantine free targeted a pointer not owned by the bag.
    #[error("pointer not found")]
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
}

/// Result alias used throughout `trion-membrane`.
pub type MembraneResult<T> = Result<T, MembraneError>;
