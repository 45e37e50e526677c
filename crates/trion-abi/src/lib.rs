// All extern "C" ABI exports accept raw pointers/handles from embedders; the
// caller contract is documented on each function, so per-function safety
// docs would be redundant boilerplate.
#![allow(clippy::missing_safety_doc)]
//! # trion-abi
//!
//! C-linkage façade for the Trion runtime core.
//!
//! This crate produces a `cdylib` (`libtrion.so`) exposing the `tr_`-prefixed
//! flat function table spec.md §6 describes: quarantine, channel, capsule,
//! timer, base-12, syscall, audit, sandbox, and JIT. Opaque handles are
//! pointers to the component structs in `trion-core`/`trion-membrane`/
//! `trion-sandbox`/`trion-jit`; error reporting is a mix of integer return
//! codes (see each module's return-code table) and the thread-local
//! last-error string fetched by [`error_abi::tr_get_last_error`].
//!
//! ```text
//! Embedder (C/FFI) -> tr_* entry point (this crate) -> trion-core/-membrane -> Result
//! ```

pub mod audit_abi;
pub mod base12_abi;
pub mod callbacks_abi;
pub mod capsule_abi;
pub mod channel_abi;
pub mod error_abi;
pub mod jit_abi;
pub mod packet_abi;
pub mod quarantine_abi;
pub mod sandbox_abi;
pub mod syscall_abi;
pub mod timer_abi;
