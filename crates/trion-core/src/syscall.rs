//! Named, authenticated, audited syscall registry.
//!
//! A global, lazily-initialized ordered collection of entries protected by
//! its own lock. Names are unique only by convention — lookup returns the
//! first match. Unregistration swaps the last entry into the freed slot,
//! the same O(1)-removal tradeoff the quarantine bag makes.

use std::ffi::{c_char, c_void, CString};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::audit::audit_log;
use crate::error::{last_error, set_last_error, TrionError, TrionResult};

/// Audit bit: emit `syscall_invoke`/`syscall_invoke_result` around a call.
pub const FLAG_AUDIT: u32 = 0x1;
/// Trusted-only bit: reserved for embedder-side policy, not interpreted by
/// `invoke` itself.
pub const FLAG_TRUSTED_ONLY: u32 = 0x2;

/// A syscall handler: receives a null-terminated argument blob (conventionally
/// JSON) and an opaque context pointer, returns a status code and an
/// allocated, null-terminated output blob. Releasing the output blob is the
/// caller's responsibility.
pub type SyscallHandler = extern "C" fn(args: *const c_char, ctx: *mut c_void) -> SyscallOutcome;

/// The result of calling a syscall handler.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SyscallOutcome {
    pub code: i32,
    pub output: *mut c_char,
}

struct Entry {
    name: String,
    handler: SyscallHandler,
    ctx: usize,
    flags: u32,
    auth_token: Option<Vec<u8>>,
    #[allow(dead_code)]
    description: Option<String>,
}

// Entries are only ever read under the registry lock or snapshotted by
// value before the handler is invoked outside the lock.
unsafe impl Send for Entry {}

fn registry() -> &'static Mutex<Vec<Entry>> {
    static REGISTRY: OnceLock<Mutex<Vec<Entry>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

/// Register a syscall entry. Always succeeds; appends to the registry and
/// emits a `syscall_registered` audit record.
pub fn register(
    name: &str,
    handler: SyscallHandler,
    ctx: *mut c_void,
    flags: u32,
    auth_token: Option<&[u8]>,
    description: Option<&str>,
) {
    registry().lock().push(Entry {
        name: name.to_string(),
        handler,
        ctx: ctx as usize,
        flags,
        auth_token: auth_token.map(|t| t.to_vec()),
        description: description.map(|d| d.to_string()),
    });
    audit_log(format!("syscall_registered: {name} flags={flags}"));
}

/// Unregister by name: linear scan, swap-with-last on hit. Returns
/// [`TrionError::NotFound`] if no entry with that name exists.
pub fn unregister(name: &str) -> TrionResult<()> {
    let mut guard = registry().lock();
    match guard.iter().position(|e| e.name == name) {
        Some(pos) => {
            guard.swap_remove(pos);
            drop(guard);
            audit_log(format!("syscall_unregistered: {name}"));
            Ok(())
        }
        None => Err(TrionError::NotFound),
    }
}

/// Invoke a registered syscall by name.
///
/// On a zero return code, returns the handler's output blob. On a non-zero
/// return code, returns [`TrionError::HandlerFailed`] (the output blob, if
/// any, is still reachable by the embedder only through its own handler
/// bookkeeping — the registry does not surface it on the error path).
pub fn invoke(name: &str, args: &str, auth_token: Option<&[u8]>) -> TrionResult<*mut c_char> {
    let (handler, ctx, flags) = {
        let guard = registry().lock();
        let entry = guard
            .iter()
            .find(|e| e.name == name)
            .ok_or(TrionError::NotFound)?;

        if let Some(expected) = &entry.auth_token {
            let presented = auth_token.unwrap_or(&[]);
            if presented != expected.as_slice() {
                drop(guard);
                audit_log(format!("syscall_invoke_failed_auth: {name}"));
                return Err(TrionError::AuthFailed);
            }
        }

        (entry.handler, entry.ctx, entry.flags)
    };

    if flags & FLAG_AUDIT != 0 {
        audit_log(format!("syscall_invoke: {name} args={args}"));
    }

    let args_c = CString::new(args).map_err(|_| TrionError::InvalidArgs)?;
    let outcome = handler(args_c.as_ptr(), ctx as *mut c_void);

    if flags & FLAG_AUDIT != 0 {
        audit_log(format!("syscall_invoke_result: {name} code={}", outcome.code));
    }

    if outcome.code != 0 {
        if last_error().is_empty() {
            set_last_error(format!("syscall '{name}' failed with code {}", outcome.code));
        }
        return Err(TrionError::HandlerFailed);
    }

    Ok(outcome.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::clear_last_error;
    use std::ptr;

    extern "C" fn echo_handler(args: *const c_char, _ctx: *mut c_void) -> SyscallOutcome {
        // SAFETY: args came from a CString built in invoke().
        let dup = unsafe { libc_strdup_stub(args) };
        SyscallOutcome { code: 0, output: dup }
    }

    // A tiny stand-in for libc's strdup so this test module has no extra
    // dependency: copies the incoming C string into a new CString and
    // leaks it, mirroring what an FFI handler would do with its own
    // allocator.
    unsafe fn libc_strdup_stub(s: *const c_char) -> *mut c_char {
        let borrowed = std::ffi::CStr::from_ptr(s);
        CString::new(borrowed.to_bytes()).unwrap().into_raw()
    }

    extern "C" fn failing_handler(_args: *const c_char, _ctx: *mut c_void) -> SyscallOutcome {
        SyscallOutcome {
            code: 7,
            output: ptr::null_mut(),
        }
    }

    #[test]
    fn syscall_auth_round_trip_scenario() {
        // End-to-end scenario 6 from the spec.
        clear_last_error();
        register(
            "echo-auth-scenario",
            echo_handler,
            ptr::null_mut(),
            FLAG_AUDIT,
            Some(b"t"),
            None,
        );

        let denied = invoke("echo-auth-scenario", "{\"x\":1}", None);
        assert_eq!(denied, Err(TrionError::AuthFailed));

        let allowed = invoke("echo-auth-scenario", "{\"x\":1}", Some(b"t"));
        assert!(allowed.is_ok());

        unregister("echo-auth-scenario").unwrap();
    }

    #[test]
    fn invoke_missing_name_is_not_found() {
        assert_eq!(invoke("does-not-exist", "{}", None), Err(TrionError::NotFound));
    }

    #[test]
    fn invoke_synthesizes_last_error_on_handler_failure() {
        clear_last_error();
        register("fails", failing_handler, ptr::null_mut(), 0, None, None);
        let result = invoke("fails", "{}", None);
        assert_eq!(result, Err(TrionError::HandlerFailed));
        assert!(last_error().contains("code 7"));
        unregister("fails").unwrap();
    }

    #[test]
    fn unregister_unknown_name_is_not_found() {
        assert_eq!(unregister("never-registered"), Err(TrionError::NotFound));
    }
}
