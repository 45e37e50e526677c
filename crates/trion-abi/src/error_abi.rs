//! ABI layer for the thread-local last-error slot.
//!
//! Returns a pointer into thread-local storage, valid until the next call
//! to any `tr_*` function on the same thread — the same convention glibc
//! uses for `strerror`.

use std::cell::RefCell;
use std::ffi::{c_char, CString};

thread_local! {
    static LAST_ERROR_CSTRING: RefCell<CString> = RefCell::new(CString::new("").unwrap());
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_get_last_error() -> *const c_char {
    let message = trion_core::last_error();
    LAST_ERROR_CSTRING.with(|slot| {
        let c_message = CString::new(message.replace('\0', "")).unwrap_or_default();
        *slot.borrow_mut() = c_message;
        slot.borrow().as_ptr()
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_clear_last_error() {
    trion_core::clear_last_error();
}
