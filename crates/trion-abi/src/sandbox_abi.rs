//! ABI layer for the process sandbox runner.

use std::ffi::{c_char, c_int, CStr};

use trion_core::set_last_error;
use trion_sandbox::{run, SandboxError, SandboxRequest};

unsafe fn cstr_vec(argv: *const *const c_char, argc: usize) -> Vec<String> {
    if argv.is_null() || argc == 0 {
        return Vec::new();
    }
    // SAFETY: caller guarantees argv points to argc valid, null-terminated
    // C strings.
    (0..argc)
        .map(|i| unsafe {
            CStr::from_ptr(*argv.add(i))
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

/// Run an executable in the sandbox. Returns `0` (ok), `-2` (timeout),
/// `-3` (signaled), `-1` (spawn failure), matching spec.md §6.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_sandbox_run(
    path: *const c_char,
    argv: *const *const c_char,
    argc: usize,
    working_dir: *const c_char,
    wall_clock_ms: u64,
    address_space_limit_bytes: u64,
) -> c_int {
    if path.is_null() {
        set_last_error("tr_sandbox_run: null path");
        return -1;
    }
    // SAFETY: caller guarantees path is a valid, null-terminated C string.
    let path = unsafe { CStr::from_ptr(path) }.to_string_lossy().into_owned();
    // SAFETY: caller guarantees argv/argc describe argc valid C strings.
    let argv = unsafe { cstr_vec(argv, argc) };
    let working_dir = if working_dir.is_null() {
        None
    } else {
        // SAFETY: caller guarantees working_dir is a valid C string.
        Some(unsafe { CStr::from_ptr(working_dir) }.to_string_lossy().into_owned())
    };

    let request = SandboxRequest {
        path,
        argv,
        envp: Vec::new(),
        working_dir,
        wall_clock_ms,
        address_space_limit_bytes: if address_space_limit_bytes == 0 {
            None
        } else {
            Some(address_space_limit_bytes)
        },
        uid: None,
        gid: None,
    };

    match run(&request) {
        Ok(outcome) => outcome.exit_code,
        Err(SandboxError::Timeout) => -2,
        Err(SandboxError::Signaled) => -3,
        Err(SandboxError::SpawnFailed) => {
            set_last_error("tr_sandbox_run: spawn failed");
            -1
        }
    }
}
