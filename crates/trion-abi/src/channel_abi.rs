//! ABI layer for bounded MPMC channels.
//!
//! Items are opaque `void*` — the facade never interprets them. Return
//! codes follow spec's channel column: send `0`=ok/`-1`=closed/
//! `-2`=would-block/`-3`=timeout; recv `0`=closed+drained/`1`=ok/
//! `-2`=would-block/`-3`=timeout.

use std::ffi::{c_int, c_void};
use std::time::Duration;

use trion_core::{set_last_error, Channel, Wait};

pub type ChannelHandle = *mut Channel<*mut c_void>;

const MODE_NONBLOCKING: c_int = 0;
const MODE_INDEFINITE: c_int = 1;
const MODE_TIMEOUT: c_int = 2;

fn to_wait(mode: c_int, timeout_ms: u64) -> Wait {
    match mode {
        MODE_NONBLOCKING => Wait::NonBlocking,
        MODE_TIMEOUT => Wait::Timeout(Duration::from_millis(timeout_ms)),
        MODE_INDEFINITE | _ => Wait::Indefinite,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_channel_create(capacity: usize) -> ChannelHandle {
    match Channel::create(capacity) {
        Ok(channel) => Box::into_raw(Box::new(channel)),
        Err(e) => {
            set_last_error(e.to_string());
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_channel_send(
    handle: ChannelHandle,
    item: *mut c_void,
    mode: c_int,
    timeout_ms: u64,
) -> c_int {
    if handle.is_null() {
        set_last_error("tr_channel_send: null handle");
        return -1;
    }
    // SAFETY: caller guarantees handle is valid.
    let channel = unsafe { &*handle };
    match channel.send(item, to_wait(mode, timeout_ms)) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(e.to_string());
            use trion_membrane::MembraneError::*;
            match e {
                Closed => -1,
                WouldBlock => -2,
                Timeout => -3,
                _ => -1,
            }
        }
    }
}

/// Convenience: send without blocking. Shorthand for `tr_channel_send` with
/// `mode = 0`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_channel_try_send(handle: ChannelHandle, item: *mut c_void) -> c_int {
    // SAFETY: delegates to the fully-parameterized send entry point.
    unsafe { tr_channel_send(handle, item, MODE_NONBLOCKING, 0) }
}

/// Convenience: send with a bounded wait. Shorthand for `tr_channel_send`
/// with `mode = 2`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_channel_send_timed(
    handle: ChannelHandle,
    item: *mut c_void,
    timeout_ms: u64,
) -> c_int {
    // SAFETY: delegates to the fully-parameterized send entry point.
    unsafe { tr_channel_send(handle, item, MODE_TIMEOUT, timeout_ms) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_channel_recv(
    handle: ChannelHandle,
    mode: c_int,
    timeout_ms: u64,
    out_item: *mut *mut c_void,
) -> c_int {
    if handle.is_null() {
        set_last_error("tr_channel_recv: null handle");
        return -1;
    }
    // SAFETY: caller guarantees handle is valid.
    let channel = unsafe { &*handle };
    match channel.recv(to_wait(mode, timeout_ms)) {
        Ok(item) => {
            if !out_item.is_null() {
                // SAFETY: caller guarantees out_item points to writable
                // storage for one pointer.
                unsafe { *out_item = item };
            }
            1
        }
        Err(e) => {
            set_last_error(e.to_string());
            use trion_membrane::MembraneError::*;
            match e {
                Drained => 0,
                WouldBlock => -2,
                Timeout => -3,
                _ => -1,
            }
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_channel_close(handle: ChannelHandle) {
    if handle.is_null() {
        return;
    }
    // SAFETY: caller guarantees handle is valid.
    unsafe { &*handle }.close();
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_channel_destroy(handle: ChannelHandle) {
    if handle.is_null() {
        return;
    }
    // SAFETY: handle was produced by Box::into_raw in tr_channel_create and
    // must not be used again after this call. Caller is responsible for
    // ensuring no thread is still waiting on it (spec.md §3's channel
    // lifecycle obligation).
    drop(unsafe { Box::from_raw(handle) });
}
