//! Capsule lifecycle event callbacks.
//!
//! A global, lazily-initialized, insertion-ordered registry of
//! `(callback, context)` pairs. Emitting an event copies the current list
//! under the lock, then invokes every callback *outside* the lock — so a
//! callback that itself registers another callback, or that blocks, never
//! deadlocks against the registry.

use std::sync::OnceLock;

use parking_lot::Mutex;

/// A capsule lifecycle event.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapsuleEvent {
    Start,
    Stop,
}

/// Callback signature: event, capsule id, and the opaque context pointer
/// supplied at registration. `extern "C"` so the same callback type is
/// usable directly from the C-linkage facade.
pub type EventCallback = extern "C" fn(CapsuleEvent, u64, *mut std::ffi::c_void);

struct Entry {
    callback: EventCallback,
    ctx: usize,
}

// The registry only ever hands the stored pointer back to the callback that
// registered it; Trion never dereferences it itself.
unsafe impl Send for Entry {}

fn registry() -> &'static Mutex<Vec<Entry>> {
    static REGISTRY: OnceLock<Mutex<Vec<Entry>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

/// Register a callback to be invoked on every future capsule start/stop
/// event, in every capsule. Returns the registration's insertion index,
/// which callers may ignore — there is no `unregister` counterpart, mirroring
/// the original implementation's fire-and-forget registry.
pub fn register_event_callback(callback: EventCallback, ctx: *mut std::ffi::c_void) -> usize {
    let mut guard = registry().lock();
    guard.push(Entry {
        callback,
        ctx: ctx as usize,
    });
    guard.len() - 1
}

/// Emit an event to every registered callback, in registration order.
///
/// Callbacks run with the registry lock released, so a callback that
/// registers another callback or triggers re-entrant emission is safe.
pub fn emit(event: CapsuleEvent, capsule_id: u64) {
    let snapshot: Vec<Entry> = {
        let guard = registry().lock();
        guard
            .iter()
            .map(|e| Entry {
                callback: e.callback,
                ctx: e.ctx,
            })
            .collect()
    };
    for entry in snapshot {
        (entry.callback)(event, capsule_id, entry.ctx as *mut std::ffi::c_void);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SEEN: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn bump(_event: CapsuleEvent, _capsule_id: u64, _ctx: *mut std::ffi::c_void) {
        SEEN.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn emit_invokes_registered_callbacks_in_order() {
        SEEN.store(0, Ordering::SeqCst);
        register_event_callback(bump, std::ptr::null_mut());
        register_event_callback(bump, std::ptr::null_mut());
        let before = SEEN.load(Ordering::SeqCst);
        emit(CapsuleEvent::Start, 1);
        assert_eq!(SEEN.load(Ordering::SeqCst), before + 2);
    }

    #[test]
    fn ctx_pointer_round_trips_through_emit() {
        static CAPTURED: AtomicUsize = AtomicUsize::new(0);
        extern "C" fn capture(_event: CapsuleEvent, _capsule_id: u64, ctx: *mut std::ffi::c_void) {
            CAPTURED.store(ctx as usize, Ordering::SeqCst);
        }
        let marker: usize = 0xabc0;
        register_event_callback(capture, marker as *mut std::ffi::c_void);
        emit(CapsuleEvent::Stop, 2);
        assert_eq!(CAPTURED.load(Ordering::SeqCst), marker);
    }
}
