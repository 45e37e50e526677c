//! ABI layer for capsules.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::time::Duration;

use trion_core::{set_last_error, Capsule, CapsuleEntry, Wait};

pub type CapsuleHandle = *mut Capsule;

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_capsule_create(
    name: *const c_char,
    entry: CapsuleEntry,
    user_ctx: *mut c_void,
) -> CapsuleHandle {
    if name.is_null() {
        set_last_error("tr_capsule_create: null name");
        return std::ptr::null_mut();
    }
    // SAFETY: caller guarantees name is a valid, null-terminated C string.
    let name = match unsafe { CStr::from_ptr(name) }.to_str() {
        Ok(s) => s,
        Err(_) => {
            set_last_error("tr_capsule_create: name is not valid UTF-8");
            return std::ptr::null_mut();
        }
    };
    match Capsule::create(name, entry, user_ctx) {
        Ok(capsule) => Box::into_raw(Box::new(capsule)),
        Err(e) => {
            set_last_error(e.to_string());
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_capsule_start(handle: CapsuleHandle) -> c_int {
    if handle.is_null() {
        set_last_error("tr_capsule_start: null handle");
        return -1;
    }
    // SAFETY: caller guarantees handle is valid.
    match unsafe { &*handle }.start() {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(e.to_string());
            -1
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_capsule_join(handle: CapsuleHandle) {
    if handle.is_null() {
        return;
    }
    // SAFETY: caller guarantees handle is valid.
    unsafe { &*handle }.join();
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_capsule_send(
    handle: CapsuleHandle,
    msg: *mut c_void,
    mode: c_int,
    timeout_ms: u64,
) -> c_int {
    if handle.is_null() {
        set_last_error("tr_capsule_send: null handle");
        return -1;
    }
    let wait = match mode {
        0 => Wait::NonBlocking,
        2 => Wait::Timeout(Duration::from_millis(timeout_ms)),
        _ => Wait::Indefinite,
    };
    // SAFETY: caller guarantees handle is valid.
    match unsafe { &*handle }.send(msg, wait) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(e.to_string());
            -1
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_capsule_is_running(handle: CapsuleHandle) -> c_int {
    if handle.is_null() {
        return 0;
    }
    // SAFETY: caller guarantees handle is valid.
    i32::from(unsafe { &*handle }.is_running())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_capsule_destroy(handle: CapsuleHandle) {
    if handle.is_null() {
        return;
    }
    // SAFETY: handle was produced by Box::into_raw in tr_capsule_create and
    // must not be used again after this call.
    let capsule = unsafe { Box::from_raw(handle) };
    capsule.destroy();
}
