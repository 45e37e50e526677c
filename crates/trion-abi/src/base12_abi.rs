//! ABI layer for the base-12 ("dodecagram") codec.

use std::ffi::{c_char, c_int, CStr, CString};

use trion_core::{
    base12_to_bytes_with_scale, bytes_to_base12_scaled, from_base12_u64, set_last_error,
    to_base12_u64,
};

/// Encode `bytes` (big-endian magnitude) as base-12 text at fixed-point
/// `scale`. Returns a heap-allocated, caller-owned C string, or null on
/// error (negative scale).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_bytes_to_base12_scaled(
    bytes: *const u8,
    len: usize,
    scale: i64,
) -> *mut c_char {
    if bytes.is_null() && len > 0 {
        set_last_error("tr_bytes_to_base12_scaled: null bytes with nonzero len");
        return std::ptr::null_mut();
    }
    // SAFETY: caller guarantees bytes/len describe a valid byte slice.
    let slice = if len == 0 {
        &[][..]
    } else {
        unsafe { std::slice::from_raw_parts(bytes, len) }
    };
    match bytes_to_base12_scaled(slice, scale) {
        Ok(text) => CString::new(text).unwrap_or_default().into_raw(),
        Err(e) => {
            set_last_error(e.to_string());
            std::ptr::null_mut()
        }
    }
}

/// Decode base-12 `text` into a newly allocated byte buffer, writing its
/// length to `out_len` and its scale to `out_scale`. Returns null on error
/// (invalid digit, empty input).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_base12_to_bytes_with_scale(
    text: *const c_char,
    out_len: *mut usize,
    out_scale: *mut usize,
) -> *mut u8 {
    if text.is_null() {
        set_last_error("tr_base12_to_bytes_with_scale: null text");
        return std::ptr::null_mut();
    }
    // SAFETY: caller guarantees text is a valid, null-terminated C string.
    let text = match unsafe { CStr::from_ptr(text) }.to_str() {
        Ok(s) => s,
        Err(_) => {
            set_last_error("tr_base12_to_bytes_with_scale: text is not valid UTF-8");
            return std::ptr::null_mut();
        }
    };
    match base12_to_bytes_with_scale(text) {
        Ok((bytes, scale, _sign)) => {
            let mut boxed = bytes.into_boxed_slice();
            let ptr = boxed.as_mut_ptr();
            let len = boxed.len();
            // SAFETY: out_len/out_scale are caller-provided writable storage
            // for one usize each, per this function's contract.
            unsafe {
                if !out_len.is_null() {
                    *out_len = len;
                }
                if !out_scale.is_null() {
                    *out_scale = scale;
                }
            }
            std::mem::forget(boxed);
            ptr
        }
        Err(e) => {
            set_last_error(e.to_string());
            std::ptr::null_mut()
        }
    }
}

/// 64-bit fast-path encode. Alias of the u64 encoder — see spec.md §3.11.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_dodecagram_to_base12(value: u64) -> *mut c_char {
    CString::new(to_base12_u64(value)).unwrap_or_default().into_raw()
}

/// 64-bit fast-path decode. Returns `-2` on overflow, `-1` on invalid
/// syntax, `0` on success with `*out_value` set.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_dodecagram_from_base12(
    text: *const c_char,
    out_value: *mut u64,
) -> c_int {
    if text.is_null() {
        set_last_error("tr_dodecagram_from_base12: null text");
        return -1;
    }
    // SAFETY: caller guarantees text is a valid, null-terminated C string.
    let text = match unsafe { CStr::from_ptr(text) }.to_str() {
        Ok(s) => s,
        Err(_) => return -1,
    };
    match from_base12_u64(text) {
        Ok(value) => {
            if !out_value.is_null() {
                // SAFETY: out_value is caller-provided writable storage for
                // one u64, per this function's contract.
                unsafe { *out_value = value };
            }
            0
        }
        Err(e) => {
            set_last_error(e.to_string());
            if e == trion_core::TrionError::Overflow {
                -2
            } else {
                -1
            }
        }
    }
}

/// Free a C string returned by `tr_dodecagram_to_base12` or
/// `tr_bytes_to_base12_scaled`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_free_cstring(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    // SAFETY: s must have been produced by CString::into_raw in this crate.
    drop(unsafe { CString::from_raw(s) });
}

/// Free a byte buffer returned by `tr_base12_to_bytes_with_scale`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_free_bytes(ptr: *mut u8, len: usize) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: ptr/len must have been produced by tr_base12_to_bytes_with_scale.
    drop(unsafe { Box::from_raw(std::slice::from_raw_parts_mut(ptr, len)) });
}
