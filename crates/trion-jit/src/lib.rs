//! NASM/clang JIT assembly loader.
//!
//! External collaborator: given assembly source and an entry symbol name,
//! writes the source to a temp directory, builds a shared object with
//! `clang` (falling back to `nasm` + `clang`/`gcc`), then `dlopen`s it and
//! resolves the symbol.

use std::ffi::{c_void, CString};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JitError {
    #[error("build failed: {0}")]
    BuildFailed(String),
    #[error("symbol not found")]
    SymbolNotFound,
}

/// A loaded JIT module: keeps the `dlopen` handle alive for as long as
/// resolved symbols may still be called.
pub struct JitModule {
    handle: *mut c_void,
    #[allow(dead_code)]
    workdir: PathBuf,
}

// The handle is an opaque dlopen token; nothing else touches `workdir`
// across threads.
unsafe impl Send for JitModule {}

impl JitModule {
    /// Resolve `symbol` in this module as a raw function pointer.
    pub fn symbol(&self, symbol: &str) -> Result<*mut c_void, JitError> {
        let name = CString::new(symbol).map_err(|_| JitError::SymbolNotFound)?;
        // SAFETY: `handle` is a valid dlopen handle for the lifetime of
        // `self`, and `name` is a valid null-terminated string.
        let ptr = unsafe { libc::dlsym(self.handle, name.as_ptr()) };
        if ptr.is_null() {
            Err(JitError::SymbolNotFound)
        } else {
            Ok(ptr)
        }
    }
}

impl Drop for JitModule {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            // SAFETY: handle was obtained from a successful dlopen in build()
            // and has not been closed since.
            unsafe {
                libc::dlclose(self.handle);
            }
        }
    }
}

fn run_logged(cmd: &mut Command) -> Result<(), String> {
    let output = cmd
        .output()
        .map_err(|e| format!("{:?}: {e}", cmd.get_program()))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(format!(
            "{:?} exited with {}: {}",
            cmd.get_program(),
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ))
    }
}

fn try_clang_direct(src_path: &std::path::Path, so_path: &std::path::Path) -> Result<(), String> {
    run_logged(
        Command::new("clang")
            .args(["-x", "assembler", "-shared", "-fPIC", "-o"])
            .arg(so_path)
            .arg(src_path),
    )
}

fn try_nasm_then_link(
    dir: &std::path::Path,
    src_path: &std::path::Path,
    so_path: &std::path::Path,
) -> Result<(), String> {
    let obj_path = dir.join("jit.o");
    run_logged(
        Command::new("nasm")
            .args(["-f", "elf64", "-o"])
            .arg(&obj_path)
            .arg(src_path),
    )?;
    let linked_with_clang = run_logged(
        Command::new("clang")
            .args(["-shared", "-fPIC", "-o"])
            .arg(so_path)
            .arg(&obj_path),
    );
    if linked_with_clang.is_ok() {
        return Ok(());
    }
    run_logged(
        Command::new("gcc")
            .args(["-shared", "-fPIC", "-o"])
            .arg(so_path)
            .arg(&obj_path),
    )
}

/// Build assembly source into a shared object and load it.
pub fn build(source: &str) -> Result<JitModule, JitError> {
    let workdir = std::env::temp_dir().join(format!("trion-jit-{}", std::process::id()));
    fs::create_dir_all(&workdir).map_err(|e| JitError::BuildFailed(e.to_string()))?;

    let src_path = workdir.join("src.s");
    fs::write(&src_path, source).map_err(|e| JitError::BuildFailed(e.to_string()))?;
    let so_path = workdir.join("lib.so");

    let mut log = String::new();
    match try_clang_direct(&src_path, &so_path) {
        Ok(()) => {}
        Err(clang_err) => {
            log.push_str(&clang_err);
            log.push('\n');
            if let Err(nasm_err) = try_nasm_then_link(&workdir, &src_path, &so_path) {
                log.push_str(&nasm_err);
                return Err(JitError::BuildFailed(log));
            }
        }
    }

    let so_path_c = CString::new(so_path.to_string_lossy().as_bytes())
        .map_err(|_| JitError::BuildFailed("non-UTF8 shared object path".to_string()))?;
    // SAFETY: so_path_c names a file just built by this function; RTLD_NOW
    // resolves all symbols eagerly so load-time errors surface here.
    let handle = unsafe { libc::dlopen(so_path_c.as_ptr(), libc::RTLD_NOW) };
    if handle.is_null() {
        return Err(JitError::BuildFailed(
            "dlopen failed after successful build".to_string(),
        ));
    }

    Ok(JitModule { handle, workdir })
}

/// Build and resolve `entry_symbol` in one call.
pub fn build_and_resolve(source: &str, entry_symbol: &str) -> Result<*mut c_void, JitError> {
    let module = build(source)?;
    let symbol = module.symbol(entry_symbol)?;
    // The module is intentionally leaked: the resolved function pointer must
    // remain valid after this call returns, and there is no cancellation API
    // for an in-flight JIT module per spec.md's external-collaborator
    // contract. Callers that need to unload do so via `build` + `JitModule`
    // directly instead of this convenience wrapper.
    std::mem::forget(module);
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_failure_reports_diagnostic() {
        let result = build("this is not valid assembly at all !!!");
        match result {
            Err(JitError::BuildFailed(log)) => assert!(!log.is_empty()),
            other => panic!("expected BuildFailed, got {other:?}"),
        }
    }

    #[test]
    fn symbol_lookup_on_missing_symbol_is_symbol_not_found() {
        // A minimal valid x86_64 asm source exporting one label.
        let source = ".global present\npresent:\n  ret\n";
        let built = build(source);
        if let Ok(module) = built {
            assert_eq!(module.symbol("absent"), Err(JitError::SymbolNotFound));
        }
        // If the toolchain isn't available in this environment, skip rather
        // than fail — the assembler/linker are host-provided externals.
    }
}
