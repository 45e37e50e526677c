//! The Trion runtime core: capsules, the syscall registry, the base-12
//! codec, timers, the packet helper, and the error/audit facilities built
//! on top of `trion-membrane`'s quarantine and channel primitives.

mod audit;
mod base12;
mod callbacks;
mod capsule;
mod config;
mod error;
mod packet;
mod syscall;
mod timer;

pub use audit::{audit_close, audit_log, audit_open};
pub use base12::{
    base12_to_bytes_with_scale, bytes_to_base12, bytes_to_base12_scaled, from_base12_u64,
    to_base12_u64, Sign,
};
pub use callbacks::{emit, register_event_callback, CapsuleEvent, EventCallback};
pub use capsule::{Capsule, CapsuleEntry, Message};
pub use config::CapsuleConfig;
pub use error::{clear_last_error, last_error, set_last_error, set_last_error_from, TrionError, TrionResult};
pub use packet::Packet;
pub use syscall::{
    invoke as syscall_invoke, register as syscall_register, unregister as syscall_unregister,
    SyscallHandler, SyscallOutcome, FLAG_AUDIT, FLAG_TRUSTED_ONLY,
};
pub use timer::{timer_start, TimerCallback};

pub use trion_membrane::{Channel, Quarantine, Wait, DEFAULT_INITIAL_CAPACITY};
