//! ABI layer for the NASM/clang JIT assembly loader.

use std::ffi::{c_char, c_void, CStr};

use trion_core::set_last_error;
use trion_jit::{build, JitError, JitModule};

/// Opaque handle to a loaded JIT module, keeping its `dlopen` handle alive.
pub type JitHandle = *mut JitModule;

fn cstr_to_str<'a>(ptr: *const c_char, what: &str) -> Option<&'a str> {
    if ptr.is_null() {
        set_last_error(format!("{what}: null argument"));
        return None;
    }
    // SAFETY: caller guarantees ptr is a valid, null-terminated C string for
    // the duration of this call.
    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => Some(s),
        Err(_) => {
            set_last_error(format!("{what}: argument is not valid UTF-8"));
            None
        }
    }
}

/// Build assembly `source` into a shared object and load it. Returns null
/// and sets the last-error string (a build-log-derived diagnostic) on
/// failure — spec.md §6's JIT loader contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_jit_build(source: *const c_char) -> JitHandle {
    let Some(source) = cstr_to_str(source, "tr_jit_build") else {
        return std::ptr::null_mut();
    };
    match build(source) {
        Ok(module) => Box::into_raw(Box::new(module)),
        Err(e) => {
            set_last_error(e.to_string());
            std::ptr::null_mut()
        }
    }
}

/// Resolve `symbol` in an already-built module. Returns null (with
/// `SymbolNotFound` recorded) on a missing symbol.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_jit_symbol(handle: JitHandle, symbol: *const c_char) -> *mut c_void {
    if handle.is_null() {
        set_last_error("tr_jit_symbol: null handle");
        return std::ptr::null_mut();
    }
    let Some(symbol) = cstr_to_str(symbol, "tr_jit_symbol") else {
        return std::ptr::null_mut();
    };
    // SAFETY: caller guarantees handle is valid.
    match unsafe { &*handle }.symbol(symbol) {
        Ok(ptr) => ptr,
        Err(JitError::SymbolNotFound) => {
            set_last_error("symbol not found");
            std::ptr::null_mut()
        }
        Err(e) => {
            set_last_error(e.to_string());
            std::ptr::null_mut()
        }
    }
}

/// Unload a JIT module, invalidating every pointer previously resolved from
/// it via [`tr_jit_symbol`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_jit_destroy(handle: JitHandle) {
    if handle.is_null() {
        return;
    }
    // SAFETY: handle was produced by Box::into_raw in tr_jit_build and must
    // not be used again after this call.
    drop(unsafe { Box::from_raw(handle) });
}
