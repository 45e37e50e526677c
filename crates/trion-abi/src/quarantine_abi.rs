//! ABI layer for quarantine allocation arenas.

use std::ffi::{c_int, c_void};

use trion_core::{set_last_error, Quarantine};

/// Opaque quarantine handle: a boxed `Quarantine` leaked to the caller.
pub type QuarantineHandle = *mut Quarantine;

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_quarantine_create(initial_capacity: usize) -> QuarantineHandle {
    Box::into_raw(Box::new(Quarantine::create(initial_capacity)))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_quarantine_alloc(handle: QuarantineHandle, size: usize) -> *mut c_void {
    if handle.is_null() {
        set_last_error("tr_quarantine_alloc: null handle");
        return std::ptr::null_mut();
    }
    // SAFETY: caller guarantees handle came from tr_quarantine_create and
    // has not been destroyed.
    let quarantine = unsafe { &*handle };
    match quarantine.alloc(size) {
        Ok(ptr) => ptr as *mut c_void,
        Err(e) => {
            set_last_error(e.to_string());
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_quarantine_free(handle: QuarantineHandle, ptr: *mut c_void) -> c_int {
    if handle.is_null() {
        set_last_error("tr_quarantine_free: null handle");
        return -1;
    }
    // SAFETY: caller guarantees handle is valid.
    let quarantine = unsafe { &*handle };
    match quarantine.free(ptr as *mut u8) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(e.to_string());
            -2
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_quarantine_seal(handle: QuarantineHandle) {
    if handle.is_null() {
        return;
    }
    // SAFETY: caller guarantees handle is valid.
    unsafe { &*handle }.seal();
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_quarantine_is_sealed(handle: QuarantineHandle) -> c_int {
    if handle.is_null() {
        return 0;
    }
    // SAFETY: caller guarantees handle is valid.
    i32::from(unsafe { &*handle }.is_sealed())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_quarantine_destroy(handle: QuarantineHandle) {
    if handle.is_null() {
        return;
    }
    // SAFETY: handle was produced by Box::into_raw in tr_quarantine_create
    // and must not be used again after this call.
    drop(unsafe { Box::from_raw(handle) });
}
