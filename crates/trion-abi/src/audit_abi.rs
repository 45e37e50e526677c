//! ABI layer for the append-only audit log.

use std::ffi::{c_char, c_int, CStr};

use trion_core::set_last_error;

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_audit_open(path: *const c_char) -> c_int {
    if path.is_null() {
        set_last_error("tr_audit_open: null path");
        return -1;
    }
    // SAFETY: caller guarantees path is a valid, null-terminated C string.
    let path = match unsafe { CStr::from_ptr(path) }.to_str() {
        Ok(s) => s,
        Err(_) => {
            set_last_error("tr_audit_open: path is not valid UTF-8");
            return -1;
        }
    };
    match trion_core::audit_open(path) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(e.to_string());
            -1
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_audit_close() {
    trion_core::audit_close();
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_audit_log(message: *const c_char) {
    if message.is_null() {
        return;
    }
    // SAFETY: caller guarantees message is a valid, null-terminated C string.
    if let Ok(message) = unsafe { CStr::from_ptr(message) }.to_str() {
        trion_core::audit_log(message);
    }
}
