//! ABI layer for one-shot timers.

use std::ffi::c_void;

use trion_core::{timer_start, TimerCallback};

/// Spawn a detached worker that sleeps `ms` milliseconds, then calls
/// `cb(ctx)` once. There is no handle to join or cancel — matching
/// spec.md §4.6's "no cancellation, no repetition" contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_timer_start(ms: u64, cb: TimerCallback, ctx: *mut c_void) {
    timer_start(ms, cb, ctx);
}
