//! ABI layer for the capsule lifecycle event-callback registry.

use std::ffi::c_void;

use trion_core::{register_event_callback, EventCallback};

/// Register a callback invoked on every future `capsule_start`/`capsule_stop`
/// event across every capsule. There is no unregister counterpart — matching
/// spec.md §4.3's fire-and-forget registry. Returns the registration's
/// insertion index, which callers may ignore.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_register_event_callback(
    callback: EventCallback,
    ctx: *mut c_void,
) -> usize {
    register_event_callback(callback, ctx)
}
