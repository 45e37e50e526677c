//! Capsule configuration.
//!
//! The spec fixes default quarantine and inbox capacities as constants
//! (16 and 32). This struct exists so an embedder can override those
//! defaults per capsule without touching `Capsule::create`'s signature —
//! construction still goes through `Capsule::create`, which uses
//! `CapsuleConfig::default()` internally.

/// Tunable capacities for a capsule's owned quarantine and inbox.
#[derive(Debug, Clone, Copy)]
pub struct CapsuleConfig {
    pub quarantine_capacity: usize,
    pub inbox_capacity: usize,
}

impl Default for CapsuleConfig {
    fn default() -> Self {
        Self {
            quarantine_capacity: 16,
            inbox_capacity: 32,
        }
    }
}
