//! ABI layer for the Trion packet helper.

use std::ffi::c_int;

use trion_core::{set_last_error, Packet, Quarantine};

use crate::quarantine_abi::QuarantineHandle;

/// Opaque packet handle: a boxed `Packet` leaked to the caller.
pub type PacketHandle = *mut Packet;

/// Allocate a payload buffer inside `quarantine` and copy `payload` into it.
/// Address fields default to zero. Returns null on allocation failure (e.g.
/// a sealed quarantine).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_packet_create(
    quarantine: QuarantineHandle,
    payload: *const u8,
    len: usize,
) -> PacketHandle {
    if quarantine.is_null() {
        set_last_error("tr_packet_create: null quarantine handle");
        return std::ptr::null_mut();
    }
    if payload.is_null() && len > 0 {
        set_last_error("tr_packet_create: null payload with nonzero len");
        return std::ptr::null_mut();
    }
    // SAFETY: caller guarantees quarantine is a valid, live handle.
    let quarantine: &Quarantine = unsafe { &*quarantine };
    // SAFETY: caller guarantees payload/len describe a valid byte slice.
    let slice = if len == 0 {
        &[][..]
    } else {
        unsafe { std::slice::from_raw_parts(payload, len) }
    };
    match Packet::create(quarantine, slice) {
        Ok(packet) => Box::into_raw(Box::new(packet)),
        Err(e) => {
            set_last_error(e.to_string());
            std::ptr::null_mut()
        }
    }
}

/// Borrow the packet's payload bytes. Writes the length to `out_len`.
/// Returns null (with `*out_len = 0`) for an empty payload.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_packet_payload(handle: PacketHandle, out_len: *mut usize) -> *const u8 {
    if handle.is_null() {
        return std::ptr::null();
    }
    // SAFETY: caller guarantees handle is valid.
    let payload = unsafe { &*handle }.payload();
    // SAFETY: caller guarantees out_len points to writable storage for one
    // usize, per this function's contract.
    unsafe {
        if !out_len.is_null() {
            *out_len = payload.len();
        }
    }
    if payload.is_empty() {
        std::ptr::null()
    } else {
        payload.as_ptr()
    }
}

/// Policy predicate, not a mutation: whether `handle`'s source IP equals `ip`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_packet_drop_if_src_ip(handle: PacketHandle, ip: u32) -> c_int {
    if handle.is_null() {
        return 0;
    }
    // SAFETY: caller guarantees handle is valid.
    i32::from(unsafe { &*handle }.drop_if_src_ip(ip))
}

/// Set the packet's address fields (all default to zero at creation).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_packet_set_addrs(
    handle: PacketHandle,
    src_ip: u32,
    dst_ip: u32,
    src_port: u16,
    dst_port: u16,
) {
    if handle.is_null() {
        return;
    }
    // SAFETY: caller guarantees handle is valid and exclusively held for the
    // duration of this call.
    let packet = unsafe { &mut *handle };
    packet.src_ip = src_ip;
    packet.dst_ip = dst_ip;
    packet.src_port = src_port;
    packet.dst_port = dst_port;
}

/// Free a packet header. The payload itself lives in the owning quarantine
/// and is reclaimed along with every other allocation when that quarantine
/// is destroyed — this only frees the header struct.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tr_packet_destroy(handle: PacketHandle) {
    if handle.is_null() {
        return;
    }
    // SAFETY: handle was produced by Box::into_raw in tr_packet_create and
    // must not be used again after this call.
    drop(unsafe { Box::from_raw(handle) });
}
