//! Packet helper.
//!
//! A thin convenience wrapper for a payload-bearing struct whose buffer
//! lives inside a caller-owned quarantine, plus a policy predicate over the
//! source address. Address fields default to zero; nothing here interprets
//! packet contents beyond that.

use trion_membrane::Quarantine;

use crate::error::{TrionError, TrionResult};

/// A packet whose payload buffer is tracked by a caller-supplied quarantine.
pub struct Packet {
    pub src_ip: u32,
    pub dst_ip: u32,
    pub src_port: u16,
    pub dst_port: u16,
    payload: Option<*mut u8>,
    length: usize,
}

// `payload`, when present, points into the quarantine that allocated it and
// is only ever read back through `Packet::payload()`.
unsafe impl Send for Packet {}

impl Packet {
    /// Allocate a payload buffer inside `q` and copy `payload` into it.
    /// Address fields default to zero. An empty payload is represented with
    /// no backing allocation.
    pub fn create(q: &Quarantine, payload: &[u8]) -> TrionResult<Self> {
        let (ptr, length) = if payload.is_empty() {
            (None, 0)
        } else {
            let buf = q.alloc(payload.len())?;
            // SAFETY: buf was just allocated with payload.len() capacity by
            // this same quarantine and is not aliased elsewhere yet.
            unsafe {
                std::ptr::copy_nonoverlapping(payload.as_ptr(), buf, payload.len());
            }
            (Some(buf), payload.len())
        };
        Ok(Self {
            src_ip: 0,
            dst_ip: 0,
            src_port: 0,
            dst_port: 0,
            payload: ptr,
            length,
        })
    }

    /// The packet's payload bytes, borrowed from its owning quarantine.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        match self.payload {
            // SAFETY: ptr/length were set together in create() and the
            // backing quarantine outlives this borrow by caller contract.
            Some(ptr) => unsafe { std::slice::from_raw_parts(ptr, self.length) },
            None => &[],
        }
    }

    /// A policy predicate, not a mutation: whether this packet's source IP
    /// equals `ip`.
    #[must_use]
    pub fn drop_if_src_ip(&self, ip: u32) -> bool {
        self.src_ip == ip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_copies_payload_into_quarantine() {
        let q = Quarantine::create(4);
        let packet = Packet::create(&q, b"hello").unwrap();
        assert_eq!(packet.payload(), b"hello");
        assert_eq!(q.live_count(), 1);
    }

    #[test]
    fn empty_payload_allocates_nothing() {
        let q = Quarantine::create(4);
        let packet = Packet::create(&q, &[]).unwrap();
        assert_eq!(packet.payload(), b"");
        assert_eq!(q.live_count(), 0);
    }

    #[test]
    fn address_fields_default_to_zero() {
        let q = Quarantine::create(4);
        let packet = Packet::create(&q, b"x").unwrap();
        assert_eq!(packet.src_ip, 0);
        assert_eq!(packet.dst_ip, 0);
        assert_eq!(packet.src_port, 0);
        assert_eq!(packet.dst_port, 0);
    }

    #[test]
    fn drop_if_src_ip_is_a_pure_predicate() {
        let q = Quarantine::create(4);
        let mut packet = Packet::create(&q, b"x").unwrap();
        assert!(!packet.drop_if_src_ip(0xC0A8_0001));
        packet.src_ip = 0xC0A8_0001;
        assert!(packet.drop_if_src_ip(0xC0A8_0001));
        assert!(!packet.drop_if_src_ip(0));
    }

    #[test]
    fn failed_allocation_does_not_double_free() {
        // Regression guard for the double-free the original implementation
        // had on the quarantine_alloc failure path: seal first so alloc
        // fails, and verify create() reports the error once, cleanly.
        let q = Quarantine::create(4);
        q.seal();
        let result = Packet::create(&q, b"blocked");
        assert_eq!(result.err(), Some(TrionError::Sealed));
    }
}
