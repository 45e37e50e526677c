//! ABI layer for the syscall registry.

use std::ffi::{c_char, c_int, c_void, CStr};

use trion_core::{set_last_error, SyscallHandler, TrionError, FLAG_AUDIT};

fn cstr_to_str<'a>(ptr: *const c_char, what: &str) -> Option<&'a str> {
    if ptr.is_null() {
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

/// Full registration: explicit flags, optional auth token, optional
/// description.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_register_syscall_ex(
    name: *const c_char,
    handler: SyscallHandler,
    ctx: *mut c_void,
    flags: u32,
    auth_token: *const u8,
    auth_token_len: usize,
    description: *const c_char,
) -> c_int {
    let Some(name) = cstr_to_str(name, "tr_register_syscall_ex") else {
        return -1;
    };
    let token = if auth_token.is_null() || auth_token_len == 0 {
        None
    } else {
        // SAFETY: caller guarantees auth_token/auth_token_len describe a
        // valid byte slice.
        Some(unsafe { std::slice::from_raw_parts(auth_token, auth_token_len) })
    };
    let description = if description.is_null() {
        None
    } else {
        cstr_to_str(description, "tr_register_syscall_ex")
    };
    trion_core::syscall_register(name, handler, ctx, flags, token, description);
    0
}

/// Convenience wrapper: registers with the audit bit set, no auth token, no
/// description — spec.md §3.11's 3-argument `tr_register_syscall`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_register_syscall(
    name: *const c_char,
    handler: SyscallHandler,
    ctx: *mut c_void,
) -> c_int {
    // SAFETY: delegates to the fully-parameterized registration entry
    // point, which re-validates `name`.
    unsafe { tr_register_syscall_ex(name, handler, ctx, FLAG_AUDIT, std::ptr::null(), 0, std::ptr::null()) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_unregister_syscall(name: *const c_char) -> c_int {
    let Some(name) = cstr_to_str(name, "tr_unregister_syscall") else {
        return -1;
    };
    match trion_core::syscall_unregister(name) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(e.to_string());
            -2
        }
    }
}

/// Invoke a registered syscall. On success, the handler's output blob is
/// written to `*out_json` — the caller owns it and must release it via
/// [`crate::base12_abi::tr_free_cstring`]. `out_json` may be null if the
/// caller doesn't need the output.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_invoke_syscall_ex(
    name: *const c_char,
    args: *const c_char,
    auth_token: *const u8,
    auth_token_len: usize,
    out_json: *mut *mut c_char,
) -> c_int {
    let Some(name) = cstr_to_str(name, "tr_invoke_syscall_ex") else {
        return -1;
    };
    let args = cstr_to_str(args, "tr_invoke_syscall_ex").unwrap_or("");
    let token = if auth_token.is_null() || auth_token_len == 0 {
        None
    } else {
        // SAFETY: caller guarantees auth_token/auth_token_len describe a
        // valid byte slice.
        Some(unsafe { std::slice::from_raw_parts(auth_token, auth_token_len) })
    };
    match trion_core::syscall_invoke(name, args, token) {
        Ok(output) => {
            if !out_json.is_null() {
                // SAFETY: caller guarantees out_json points to writable
                // storage for one pointer, per this function's contract.
                unsafe { *out_json = output };
            }
            0
        }
        Err(e) => {
            set_last_error(e.to_string());
            match e {
                TrionError::NotFound => -2,
                TrionError::AuthFailed => -4,
                _ => -1,
            }
        }
    }
}
