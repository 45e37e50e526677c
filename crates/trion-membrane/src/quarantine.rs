//! Tracked allocation arena ("quarantine").
//!
//! A quarantine is an unordered bag of heap allocations it owns, plus a
//! monotone seal flag. Allocations are tracked by raw pointer so the
//! C-linkage facade in `trion-abi` can hand them straight to an embedder;
//! `free` does a linear scan to locate the pointer and removes it by
//! swapping the last bag entry into the vacated slot — order of retention
//! has no semantic meaning here, so O(n) search + O(1) removal is the
//! right tradeoff over a sorted structure.

use std::alloc::{self, Layout};

use parking_lot::Mutex;

use crate::error::{MembraneError, MembraneResult};

/// Default bag capacity used when a caller requests zero.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// A single tracked allocation: its pointer, the `Layout` used to make it,
/// and the caller-requested size (`Layout::size()` may be larger due to
/// rounding, but free() only ever needs the layout to deallocate).
struct Slot {
    ptr: *mut u8,
    layout: Layout,
}

// SAFETY: `Slot` is only ever touched while holding the quarantine's mutex,
// and the raw pointers it carries are not otherwise aliased.
unsafe impl Send for Slot {}

struct Inner {
    bag: Vec<Slot>,
    sealed: bool,
}

/// A tracked heap arena that owns its allocations and can be sealed (no
/// further allocations) and later destroyed wholesale.
pub struct Quarantine {
    inner: Mutex<Inner>,
}

impl Quarantine {
    /// Create a quarantine with the given initial bag capacity (0 defaults
    /// to [`DEFAULT_INITIAL_CAPACITY`]).
    #[must_use]
    pub fn create(initial_capacity: usize) -> Self {
        let capacity = if initial_capacity == 0 {
            DEFAULT_INITIAL_CAPACITY
        } else {
            initial_capacity
        };
        Self {
            inner: Mutex::new(Inner {
                bag: Vec::with_capacity(capacity),
                sealed: false,
            }),
        }
    }

    /// Allocate `size` untyped bytes inside this quarantine.
    ///
    /// Fails with [`MembraneError::InvalidArgs`] if `size` is zero, with
    /// [`MembraneError::Sealed`] if the quarantine has been sealed, and with
    /// [`MembraneError::OutOfMemory`] if the system allocator fails. On
    /// failure the bag is left unchanged.
    pub fn alloc(&self, size: usize) -> MembraneResult<*mut u8> {
        if size == 0 {
            return Err(MembraneError::InvalidArgs);
        }
        let mut inner = self.inner.lock();
        if inner.sealed {
            return Err(MembraneError::Sealed);
        }
        // Byte granularity, word-aligned — matches the malloc-style default
        // alignment the ABI layer's callers expect.
        let layout = Layout::from_size_align(size, align_of::<usize>())
            .map_err(|_| MembraneError::InvalidArgs)?;
        // SAFETY: layout has nonzero size.
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            return Err(MembraneError::OutOfMemory);
        }
        inner.bag.push(Slot { ptr, layout });
        Ok(ptr)
    }

    /// Release a previously-returned allocation.
    ///
    /// Linear scan to locate `ptr`; on hit, deallocates and swaps the last
    /// bag entry into the vacated slot. Returns
    /// [`MembraneError::NotFound`] if `ptr` is not currently tracked.
    pub fn free(&self, ptr: *mut u8) -> MembraneResult<()> {
        let mut inner = self.inner.lock();
        if let Some(pos) = inner.bag.iter().position(|slot| slot.ptr == ptr) {
            let slot = inner.bag.swap_remove(pos);
            // SAFETY: slot.ptr/slot.layout came from a matching alloc() call
            // and have not been freed since.
            unsafe { alloc::dealloc(slot.ptr, slot.layout) };
            Ok(())
        } else {
            Err(MembraneError::NotFound)
        }
    }

    /// Idempotently seal the quarantine: further `alloc` calls return
    /// [`MembraneError::Sealed`]. Sealing never clears once set.
    pub fn seal(&self) {
        self.inner.lock().sealed = true;
    }

    /// Whether this quarantine has been sealed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.inner.lock().sealed
    }

    /// Number of allocations currently tracked by this quarantine.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.inner.lock().bag.len()
    }

    /// Copy a null-terminated C string into this quarantine.
    ///
    /// Convenience built on top of [`Quarantine::alloc`].
    pub fn strdup(&self, s: &str) -> MembraneResult<*mut u8> {
        let bytes = s.as_bytes();
        let ptr = self.alloc(bytes.len() + 1)?;
        // SAFETY: ptr was just allocated with bytes.len() + 1 capacity by
        // this same quarantine and is not aliased elsewhere yet.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len());
            *ptr.add(bytes.len()) = 0;
        }
        Ok(ptr)
    }

    /// Destroy the quarantine, releasing every still-registered allocation.
    ///
    /// Equivalent to dropping the quarantine; provided as an explicit,
    /// self-documenting call site for callers that create/destroy in pairs.
    pub fn destroy(self) {
        drop(self);
    }
}

impl Drop for Quarantine {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        for slot in inner.bag.drain(..) {
            // SAFETY: every slot was produced by a prior alloc() on this
            // quarantine and has not been freed (freed slots are removed
            // from the bag immediately).
            unsafe { alloc::dealloc(slot.ptr, slot.layout) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_free_roundtrip() {
        let q = Quarantine::create(4);
        let p = q.alloc(8).unwrap();
        assert_eq!(q.live_count(), 1);
        q.free(p).unwrap();
        assert_eq!(q.live_count(), 0);
    }

    #[test]
    fn zero_size_is_invalid_args() {
        let q = Quarantine::create(0);
        assert_eq!(q.alloc(0), Err(MembraneError::InvalidArgs));
    }

    #[test]
    fn seal_is_monotone_and_blocks_alloc() {
        let q = Quarantine::create(4);
        q.alloc(8).unwrap();
        q.seal();
        assert!(q.is_sealed());
        assert_eq!(q.alloc(8), Err(MembraneError::Sealed));
        // Sealing twice is a no-op, not an error.
        q.seal();
        assert!(q.is_sealed());
    }

    #[test]
    fn free_unknown_pointer_is_not_found() {
        let q = Quarantine::create(4);
        let p = q.alloc(8).unwrap();
        q.free(p).unwrap();
        assert_eq!(q.free(p), Err(MembraneError::NotFound));
    }

    #[test]
    fn destroy_reclaims_remaining_allocations() {
        let q = Quarantine::create(4);
        let _a = q.alloc(8).unwrap();
        let _b = q.alloc(16).unwrap();
        let _c = q.alloc(24).unwrap();
        assert_eq!(q.live_count(), 3);
        q.destroy();
        // No direct way to observe post-destroy state; the absence of a
        // leak is checked by miri/asan in CI, not by this unit test.
    }

    #[test]
    fn seal_then_destroy_scenario() {
        // End-to-end scenario 1 from the spec: create(4), alloc 8/16/24,
        // seal, a fourth alloc fails, destroy reclaims the three.
        let q = Quarantine::create(4);
        q.alloc(8).unwrap();
        q.alloc(16).unwrap();
        q.alloc(24).unwrap();
        q.seal();
        assert_eq!(q.alloc(8), Err(MembraneError::Sealed));
        assert_eq!(q.live_count(), 3);
    }

    #[test]
    fn strdup_copies_bytes_and_nul_terminates() {
        let q = Quarantine::create(0);
        let ptr = q.strdup("hi").unwrap();
        // SAFETY: ptr was just written by strdup with "hi\0".
        let slice = unsafe { std::slice::from_raw_parts(ptr, 3) };
        assert_eq!(slice, b"hi\0");
    }
}
