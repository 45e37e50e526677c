//! Black-box runner for the six end-to-end scenarios in spec.md §8.
//!
//! Each scenario drives the public `trion-core`/`trion-membrane` API the way
//! an embedder would — no access to private fields — and reports a
//! pass/fail outcome plus a short detail string, in the shape
//! `frankenlibc-harness/src/runner.rs` reports conformance results.

use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use trion_core::{
    base12_to_bytes_with_scale, bytes_to_base12, bytes_to_base12_scaled, register_event_callback,
    syscall_invoke, syscall_register, syscall_unregister, Capsule, CapsuleEvent, Channel, Quarantine,
    SyscallOutcome, Wait, FLAG_AUDIT,
};

use crate::structured_log::Outcome;

/// Result of running a single named scenario.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub name: String,
    pub outcome: Outcome,
    pub detail: String,
    pub duration_ms: u64,
}

fn report(name: &str, start: Instant, result: Result<(), String>) -> ScenarioReport {
    let duration_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(()) => ScenarioReport {
            name: name.to_string(),
            outcome: Outcome::Pass,
            detail: "ok".to_string(),
            duration_ms,
        },
        Err(detail) => ScenarioReport {
            name: name.to_string(),
            outcome: Outcome::Fail,
            detail,
            duration_ms,
        },
    }
}

/// Scenario 1: quarantine seal/destroy (spec.md §8 scenario 1).
pub fn scenario_quarantine_seal_destroy() -> ScenarioReport {
    let start = Instant::now();
    let result = (|| {
        let q = Quarantine::create(4);
        q.alloc(8).map_err(|e| e.to_string())?;
        q.alloc(16).map_err(|e| e.to_string())?;
        q.alloc(24).map_err(|e| e.to_string())?;
        q.seal();
        match q.alloc(8) {
            Err(trion_membrane::MembraneError::Sealed) => {}
            other => return Err(format!("expected Sealed, got {other:?}")),
        }
        if q.live_count() != 3 {
            return Err(format!("expected 3 live allocations, got {}", q.live_count()));
        }
        Ok(())
    })();
    report("quarantine_seal_destroy", start, result)
}

/// Scenario 2: channel ring semantics (spec.md §8 scenario 2).
pub fn scenario_channel_ring_semantics() -> ScenarioReport {
    let start = Instant::now();
    let result = (|| {
        let c: Channel<i32> = Channel::create(2).map_err(|e| e.to_string())?;
        c.send(1, Wait::Indefinite).map_err(|e| e.to_string())?;
        c.send(2, Wait::Indefinite).map_err(|e| e.to_string())?;
        if c.try_send(3).is_ok() {
            return Err("expected WouldBlock on a full channel".to_string());
        }
        if c.recv(Wait::Indefinite).map_err(|e| e.to_string())? != 1 {
            return Err("expected first recv to yield 1".to_string());
        }
        c.send(3, Wait::Indefinite).map_err(|e| e.to_string())?;
        c.close();
        if c.recv(Wait::Indefinite).map_err(|e| e.to_string())? != 2 {
            return Err("expected second recv to yield 2".to_string());
        }
        if c.recv(Wait::Indefinite).map_err(|e| e.to_string())? != 3 {
            return Err("expected third recv to yield 3".to_string());
        }
        match c.recv(Wait::Indefinite) {
            Err(trion_membrane::MembraneError::Drained) => Ok(()),
            other => Err(format!("expected Drained, got {other:?}")),
        }
    })();
    report("channel_ring_semantics", start, result)
}

/// Scenario 3: base-12 fixed-point round trip (spec.md §8 scenario 3).
pub fn scenario_base12_fixed_point() -> ScenarioReport {
    let start = Instant::now();
    let result = (|| {
        let encoded = bytes_to_base12_scaled(&[0x01, 0x00], 2).map_err(|e| e.to_string())?;
        if encoded != "1.94" {
            return Err(format!("expected \"1.94\", got {encoded:?}"));
        }
        let (bytes, scale, _) = base12_to_bytes_with_scale(&encoded).map_err(|e| e.to_string())?;
        if bytes != [0x01, 0x00] || scale != 2 {
            return Err(format!("round trip mismatch: {bytes:?} scale {scale}"));
        }
        Ok(())
    })();
    report("base12_fixed_point", start, result)
}

/// Scenario 4: base-12 big-integer round trip (spec.md §8 scenario 4).
pub fn scenario_base12_big_integer() -> ScenarioReport {
    let start = Instant::now();
    let result = (|| {
        let encoded = bytes_to_base12(&[0xFF, 0xFF, 0xFF, 0xFF]);
        if encoded != "9ba461593" {
            return Err(format!("expected \"9ba461593\", got {encoded:?}"));
        }
        let (bytes, _, _) = base12_to_bytes_with_scale(&encoded).map_err(|e| e.to_string())?;
        if bytes != [0xFF, 0xFF, 0xFF, 0xFF] {
            return Err(format!("expected 0xFFFFFFFF, got {bytes:?}"));
        }
        Ok(())
    })();
    report("base12_big_integer", start, result)
}

static SCENARIO5_EVENTS: Mutex<Vec<&str>> = Mutex::new(Vec::new());

extern "C" fn scenario5_record(event: CapsuleEvent, _capsule_id: u64, _ctx: *mut c_void) {
    SCENARIO5_EVENTS.lock().push(match event {
        CapsuleEvent::Start => "capsule_start",
        CapsuleEvent::Stop => "capsule_stop",
    });
}

extern "C" fn scenario5_entry(_capsule: &Capsule, _ctx: *mut c_void) {
    std::thread::sleep(Duration::from_millis(10));
}

/// Scenario 5: capsule lifecycle observation (spec.md §8 scenario 5).
pub fn scenario_capsule_lifecycle_observation() -> ScenarioReport {
    let start = Instant::now();
    let result = (|| {
        SCENARIO5_EVENTS.lock().clear();
        register_event_callback(scenario5_record, std::ptr::null_mut());

        let capsule =
            Capsule::create("w", scenario5_entry, std::ptr::null_mut()).map_err(|e| e.to_string())?;
        capsule.start().map_err(|e| e.to_string())?;
        capsule.join();

        let events = SCENARIO5_EVENTS.lock();
        if events.as_slice() != ["capsule_start", "capsule_stop"] {
            return Err(format!("unexpected event sequence: {events:?}"));
        }
        Ok(())
    })();
    report("capsule_lifecycle_observation", start, result)
}

#[allow(unsafe_code)]
extern "C" fn scenario6_echo(args: *const std::ffi::c_char, _ctx: *mut c_void) -> SyscallOutcome {
    // SAFETY: args came from a CString built by syscall::invoke.
    let borrowed = unsafe { std::ffi::CStr::from_ptr(args) };
    let dup = std::ffi::CString::new(borrowed.to_bytes()).unwrap().into_raw();
    SyscallOutcome { code: 0, output: dup }
}

static SCENARIO6_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Scenario 6: syscall auth round trip (spec.md §8 scenario 6). Uses a
/// unique syscall name per run so concurrent harness invocations don't
/// collide on the process-wide registry.
pub fn scenario_syscall_auth_round_trip() -> ScenarioReport {
    let start = Instant::now();
    let result = (|| {
        let name = format!(
            "harness-echo-{}",
            SCENARIO6_COUNTER.fetch_add(1, Ordering::SeqCst)
        );
        syscall_register(
            &name,
            scenario6_echo,
            std::ptr::null_mut(),
            FLAG_AUDIT,
            Some(b"t"),
            None,
        );

        let denied = syscall_invoke(&name, "{\"x\":1}", None);
        if denied != Err(trion_core::TrionError::AuthFailed) {
            let _ = syscall_unregister(&name);
            return Err(format!("expected AuthFailed without a token, got {denied:?}"));
        }

        let allowed = syscall_invoke(&name, "{\"x\":1}", Some(b"t"));
        let _ = syscall_unregister(&name);
        if allowed.is_err() {
            return Err(format!("expected success with the correct token, got {allowed:?}"));
        }
        Ok(())
    })();
    report("syscall_auth_round_trip", start, result)
}

/// Run every scenario in order.
#[must_use]
pub fn run_all() -> Vec<ScenarioReport> {
    vec![
        scenario_quarantine_seal_destroy(),
        scenario_channel_ring_semantics(),
        scenario_base12_fixed_point(),
        scenario_base12_big_integer(),
        scenario_capsule_lifecycle_observation(),
        scenario_syscall_auth_round_trip(),
    ]
}

/// Run a single scenario by name. Returns `None` if the name is unknown.
#[must_use]
pub fn run_named(name: &str) -> Option<ScenarioReport> {
    match name {
        "quarantine_seal_destroy" => Some(scenario_quarantine_seal_destroy()),
        "channel_ring_semantics" => Some(scenario_channel_ring_semantics()),
        "base12_fixed_point" => Some(scenario_base12_fixed_point()),
        "base12_big_integer" => Some(scenario_base12_big_integer()),
        "capsule_lifecycle_observation" => Some(scenario_capsule_lifecycle_observation()),
        "syscall_auth_round_trip" => Some(scenario_syscall_auth_round_trip()),
        _ => None,
    }
}
