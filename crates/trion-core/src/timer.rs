//! One-shot timers.
//!
//! `timer_start` spawns a detached worker that sleeps for the requested
//! duration and then invokes the callback exactly once. No cancellation,
//! no repetition — resolution is whatever `std::thread::sleep` gives the
//! host platform.

use std::ffi::c_void;
use std::time::Duration;

/// A timer callback: invoked once, after the requested delay.
pub type TimerCallback = extern "C" fn(ctx: *mut c_void);

/// Spawn a detached worker that sleeps `ms` milliseconds, then calls `cb(ctx)`
/// once. The handle is not retained anywhere — there is nothing to cancel or
/// join.
pub fn timer_start(ms: u64, cb: TimerCallback, ctx: *mut c_void) {
    let ctx = ctx as usize;
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(ms));
        cb(ctx as *mut c_void);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn timer_fires_once_after_delay() {
        static FIRED: AtomicBool = AtomicBool::new(false);
        extern "C" fn mark(_ctx: *mut c_void) {
            FIRED.store(true, Ordering::SeqCst);
        }

        FIRED.store(false, Ordering::SeqCst);
        timer_start(10, mark, std::ptr::null_mut());
        assert!(!FIRED.load(Ordering::SeqCst));
        std::thread::sleep(Duration::from_millis(60));
        assert!(FIRED.load(Ordering::SeqCst));
    }

    #[test]
    fn ctx_pointer_is_delivered_to_callback() {
        let counter = Arc::new(AtomicBool::new(false));
        let raw = Arc::into_raw(Arc::clone(&counter)) as *mut c_void;

        extern "C" fn set_flag(ctx: *mut c_void) {
            // SAFETY: ctx was produced by Arc::into_raw in this test and the
            // Arc is kept alive until after the assertion below.
            let arc = unsafe { Arc::from_raw(ctx as *const AtomicBool) };
            arc.store(true, Ordering::SeqCst);
            std::mem::forget(arc);
        }

        timer_start(10, set_flag, raw);
        std::thread::sleep(Duration::from_millis(60));
        assert!(counter.load(Ordering::SeqCst));

        // SAFETY: balances the extra Arc::into_raw above.
        unsafe { drop(Arc::from_raw(raw as *const AtomicBool)) };
    }
}
