//! Tracked allocation quarantines and bounded MPMC channels.
//!
//! These are the two leaf primitives the rest of the Trion runtime is built
//! from: [`Quarantine`] provides a sealable, trackable heap arena and
//! [`Channel`] provides the bounded FIFO queue capsules use for their inbox.

mod channel;
mod error;
mod quarantine;

pub use channel::{Channel, Wait};
pub use error::{MembraneError, MembraneResult};
pub use quarantine::{Quarantine, DEFAULT_INITIAL_CAPACITY};
