//! Capsules: named units of execution owning a quarantine, an inbox, and a
//! worker thread.
//!
//! Destruction is sequenced close-inbox → join-worker → drop-channel →
//! drop-quarantine, so the worker's borrow of the capsule always ends
//! before the memory it borrowed is reclaimed.

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;

use parking_lot::Mutex;

use trion_membrane::{Channel, Quarantine, Wait};

use crate::callbacks::{emit, CapsuleEvent};
use crate::config::CapsuleConfig;
use crate::error::{TrionError, TrionResult};

/// An opaque inbox message: a raw pointer the capsule never interprets.
/// Message memory management is the embedder's concern.
pub struct Message(pub *mut c_void);

// The inbox only ever hands a message back to the entry procedure that
// receives it; Trion itself never dereferences the pointer.
unsafe impl Send for Message {}

/// A capsule's user-supplied entry procedure: receives the capsule (so it
/// can read its inbox) and the opaque context pointer given at creation.
pub type CapsuleEntry = extern "C" fn(&Capsule, *mut c_void);

fn next_capsule_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A named actor-like unit owning a quarantine, an inbox, and a worker
/// thread running an embedder-supplied entry procedure.
pub struct Capsule {
    id: u64,
    quarantine: Quarantine,
    name_ptr: *mut u8,
    name_len: usize,
    inbox: Channel<Message>,
    entry: CapsuleEntry,
    user_ctx: usize,
    started: AtomicBool,
    running: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

// `user_ctx` is carried as a bare `usize` and only ever handed back to the
// entry procedure that the embedder supplied; `name_ptr` is read-only after
// `create` and lives inside `quarantine`, which is itself thread-safe.
unsafe impl Send for Capsule {}
unsafe impl Sync for Capsule {}

impl Capsule {
    /// Create a capsule with default capacities (quarantine 16, inbox 32).
    /// No thread is started.
    pub fn create(name: &str, entry: CapsuleEntry, user_ctx: *mut c_void) -> TrionResult<Self> {
        Self::create_with_config(name, entry, user_ctx, CapsuleConfig::default())
    }

    /// Create a capsule with caller-chosen quarantine/inbox capacities. No
    /// thread is started.
    pub fn create_with_config(
        name: &str,
        entry: CapsuleEntry,
        user_ctx: *mut c_void,
        config: CapsuleConfig,
    ) -> TrionResult<Self> {
        let quarantine = Quarantine::create(config.quarantine_capacity);
        let name_ptr = quarantine.strdup(name)?;
        let inbox = Channel::create(config.inbox_capacity)?;
        Ok(Self {
            id: next_capsule_id(),
            quarantine,
            name_ptr,
            name_len: name.len(),
            inbox,
            entry,
            user_ctx: user_ctx as usize,
            started: AtomicBool::new(false),
            running: AtomicBool::new(false),
            worker: Mutex::new(None),
        })
    }

    /// This capsule's process-wide unique id, used in lifecycle events.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The capsule's name, read back out of its own quarantine.
    #[must_use]
    pub fn name(&self) -> &str {
        // SAFETY: name_ptr/name_len were written by strdup in create() and
        // remain valid for as long as `quarantine` (and thus `self`) lives.
        let bytes = unsafe { std::slice::from_raw_parts(self.name_ptr, self.name_len) };
        std::str::from_utf8(bytes).unwrap_or("")
    }

    /// Whether the worker is currently executing the user entry.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Spawn the worker thread running the wrapper procedure.
    ///
    /// Fails with [`TrionError::AlreadyRunning`] if `start` has already been
    /// called on this capsule, with [`TrionError::SpawnFailed`] if the
    /// thread fails to spawn.
    pub fn start(&self) -> TrionResult<()> {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TrionError::AlreadyRunning);
        }

        let capsule_ptr = self as *const Capsule as usize;
        let handle = std::thread::Builder::new()
            .spawn(move || {
                // SAFETY: the capsule that spawned this worker does not drop
                // itself without first calling join() (destroy() enforces
                // this ordering), so capsule_ptr stays valid for the
                // worker's entire lifetime.
                let capsule = unsafe { &*(capsule_ptr as *const Capsule) };
                worker_wrapper(capsule);
            })
            .map_err(|_| TrionError::SpawnFailed)?;

        *self.worker.lock() = Some(handle);
        Ok(())
    }

    /// Wait for the worker to exit. Returns immediately if `start` was never
    /// called or the worker has already been joined.
    pub fn join(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Forward to the inbox channel, blocking per `mode`.
    pub fn send(&self, msg: *mut c_void, mode: Wait) -> TrionResult<()> {
        self.inbox.send(Message(msg), mode).map_err(Into::into)
    }

    /// Forward to the inbox channel without blocking.
    pub fn try_send(&self, msg: *mut c_void) -> TrionResult<()> {
        self.inbox.try_send(Message(msg)).map_err(Into::into)
    }

    /// If running: close the inbox and join the worker. Then destroy the
    /// inbox and the quarantine (which frees the name along with everything
    /// else). Consumes the capsule.
    pub fn destroy(self) {
        self.inbox.close();
        self.join();
        // `inbox` and `quarantine` are dropped here, in that order, as
        // `self` goes out of scope.
    }
}

fn worker_wrapper(capsule: &Capsule) {
    capsule.running.store(true, Ordering::Release);
    emit(CapsuleEvent::Start, capsule.id);

    (capsule.entry)(capsule, capsule.user_ctx as *mut c_void);

    capsule.inbox.drain_discard();
    capsule.running.store(false, Ordering::Release);
    emit(CapsuleEvent::Stop, capsule.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    static EVENTS: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

    extern "C" fn record_events(event: CapsuleEvent, _capsule_id: u64, _ctx: *mut c_void) {
        let label = match event {
            CapsuleEvent::Start => "capsule_start",
            CapsuleEvent::Stop => "capsule_stop",
        };
        EVENTS.lock().push(label);
    }

    extern "C" fn sleepy_entry(_capsule: &Capsule, _ctx: *mut c_void) {
        std::thread::sleep(Duration::from_millis(10));
    }

    #[test]
    fn capsule_lifecycle_observation_scenario() {
        // End-to-end scenario 5 from the spec.
        EVENTS.lock().clear();
        crate::callbacks::register_event_callback(record_events, std::ptr::null_mut());

        let capsule = Capsule::create("w", sleepy_entry, std::ptr::null_mut()).unwrap();
        capsule.start().unwrap();
        capsule.join();

        let events = EVENTS.lock();
        let tail = &events[events.len() - 2..];
        assert_eq!(tail, ["capsule_start", "capsule_stop"]);
    }

    #[test]
    fn name_round_trips_through_quarantine() {
        extern "C" fn noop(_capsule: &Capsule, _ctx: *mut c_void) {}
        let capsule = Capsule::create("accountant", noop, std::ptr::null_mut()).unwrap();
        assert_eq!(capsule.name(), "accountant");
        capsule.destroy();
    }

    #[test]
    fn double_start_is_already_running() {
        extern "C" fn noop(_capsule: &Capsule, _ctx: *mut c_void) {
            std::thread::sleep(Duration::from_millis(20));
        }
        let capsule = Capsule::create("dup", noop, std::ptr::null_mut()).unwrap();
        capsule.start().unwrap();
        assert_eq!(capsule.start(), Err(TrionError::AlreadyRunning));
        capsule.destroy();
    }

    #[test]
    fn send_and_receive_through_inbox() {
        static RECEIVED: AtomicUsize = AtomicUsize::new(0);
        extern "C" fn reader(capsule: &Capsule, _ctx: *mut c_void) {
            if capsule.inbox.recv(Wait::Timeout(Duration::from_millis(200))).is_ok() {
                RECEIVED.store(1, Ordering::SeqCst);
            }
        }
        let capsule = Capsule::create("reader", reader, std::ptr::null_mut()).unwrap();
        capsule.start().unwrap();
        capsule
            .send(std::ptr::null_mut(), Wait::Indefinite)
            .unwrap();
        capsule.join();
        assert_eq!(RECEIVED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn destroy_without_start_does_not_block() {
        extern "C" fn noop(_capsule: &Capsule, _ctx: *mut c_void) {}
        let capsule = Capsule::create("idle", noop, std::ptr::null_mut()).unwrap();
        capsule.destroy();
    }
}
