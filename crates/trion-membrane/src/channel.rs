//! Bounded multi-producer/multi-consumer channel.
//!
//! A fixed-capacity FIFO queue with blocking, non-blocking, and timed send
//! and recv, plus a monotone close. Internally backed by a `VecDeque` (which
//! is itself ring-buffer-shaped) guarded by a `parking_lot::Mutex` with two
//! condition variables — one signalled on insert ("not empty"), one on
//! removal ("not full") — mirroring the classic bounded-buffer design.
//!
//! No fairness guarantee is made across competing waiters: a lost wake-up
//! race is permitted to let one waiter re-sleep while another proceeds.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{MembraneError, MembraneResult};

/// How a send/recv call should behave when it cannot proceed immediately.
#[derive(Debug, Clone, Copy)]
pub enum Wait {
    /// Return `WouldBlock` immediately instead of waiting.
    NonBlocking,
    /// Wait with no deadline.
    Indefinite,
    /// Wait up to `Duration`, then return `Timeout`.
    Timeout(Duration),
}

struct State<T> {
    buf: VecDeque<T>,
    capacity: usize,
    closed: bool,
}

/// A bounded MPMC FIFO channel of `T`.
pub struct Channel<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> Channel<T> {
    /// Create a channel with the given fixed capacity.
    ///
    /// Fails with [`MembraneError::InvalidArgs`] if `capacity` is zero.
    pub fn create(capacity: usize) -> MembraneResult<Self> {
        if capacity == 0 {
            return Err(MembraneError::InvalidArgs);
        }
        Ok(Self {
            state: Mutex::new(State {
                buf: VecDeque::with_capacity(capacity),
                capacity,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        })
    }

    /// Current number of buffered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().buf.len()
    }

    /// Whether the channel currently holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed capacity this channel was created with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    /// Whether `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Send `item`, per `mode`'s blocking discipline.
    ///
    /// Returns [`MembraneError::Closed`] if the channel is closed (checked
    /// up front, and rechecked after every wakeup while waiting for room).
    pub fn send(&self, item: T, mode: Wait) -> MembraneResult<()> {
        let deadline = match mode {
            Wait::Timeout(d) => Some(Instant::now() + d),
            _ => None,
        };
        let mut guard = self.state.lock();
        loop {
            if guard.closed {
                return Err(MembraneError::Closed);
            }
            if guard.buf.len() < guard.capacity {
                guard.buf.push_back(item);
                self.not_empty.notify_one();
                return Ok(());
            }
            match mode {
                Wait::NonBlocking => return Err(MembraneError::WouldBlock),
                Wait::Indefinite => {
                    self.not_full.wait(&mut guard);
                }
                Wait::Timeout(_) => {
                    let deadline = deadline.expect("Timeout mode always carries a deadline");
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(MembraneError::Timeout);
                    }
                    let timed_out = self
                        .not_full
                        .wait_for(&mut guard, deadline - now)
                        .timed_out();
                    if timed_out && guard.buf.len() >= guard.capacity && !guard.closed {
                        return Err(MembraneError::Timeout);
                    }
                }
            }
        }
    }

    /// Send without blocking; shorthand for `send(item, Wait::NonBlocking)`.
    pub fn try_send(&self, item: T) -> MembraneResult<()> {
        self.send(item, Wait::NonBlocking)
    }

    /// Send, blocking indefinitely; shorthand for `send(item, Wait::Indefinite)`.
    pub fn send_blocking(&self, item: T) -> MembraneResult<()> {
        self.send(item, Wait::Indefinite)
    }

    /// Send, bounded by `timeout`; shorthand for `send(item, Wait::Timeout(timeout))`.
    pub fn send_timed(&self, item: T, timeout: Duration) -> MembraneResult<()> {
        self.send(item, Wait::Timeout(timeout))
    }

    /// Receive an item, per `mode`'s blocking discipline.
    ///
    /// Returns [`MembraneError::Drained`] — distinct from `Closed` — when
    /// the channel is closed *and* the buffer is empty: the terminal state
    /// for receivers. A closed-but-non-empty channel still yields its
    /// remaining items via `Ok`.
    pub fn recv(&self, mode: Wait) -> MembraneResult<T> {
        let deadline = match mode {
            Wait::Timeout(d) => Some(Instant::now() + d),
            _ => None,
        };
        let mut guard = self.state.lock();
        loop {
            if let Some(item) = guard.buf.pop_front() {
                self.not_full.notify_one();
                return Ok(item);
            }
            if guard.closed {
                return Err(MembraneError::Drained);
            }
            match mode {
                Wait::NonBlocking => return Err(MembraneError::WouldBlock),
                Wait::Indefinite => {
                    self.not_empty.wait(&mut guard);
                }
                Wait::Timeout(_) => {
                    let deadline = deadline.expect("Timeout mode always carries a deadline");
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(MembraneError::Timeout);
                    }
                    let timed_out = self
                        .not_empty
                        .wait_for(&mut guard, deadline - now)
                        .timed_out();
                    if timed_out && guard.buf.is_empty() && !guard.closed {
                        return Err(MembraneError::Timeout);
                    }
                }
            }
        }
    }

    /// Receive without blocking; shorthand for `recv(Wait::NonBlocking)`.
    pub fn try_recv(&self) -> MembraneResult<T> {
        self.recv(Wait::NonBlocking)
    }

    /// Receive, blocking indefinitely; shorthand for `recv(Wait::Indefinite)`.
    pub fn recv_blocking(&self) -> MembraneResult<T> {
        self.recv(Wait::Indefinite)
    }

    /// Receive, bounded by `timeout`; shorthand for `recv(Wait::Timeout(timeout))`.
    pub fn recv_timed(&self, timeout: Duration) -> MembraneResult<T> {
        self.recv(Wait::Timeout(timeout))
    }

    /// Close the channel: sets the closed flag and wakes every waiter on
    /// both condition variables so each re-checks and returns `Closed` (for
    /// senders) or drains then `Drained` (for receivers). Monotone — calling
    /// `close` more than once is a no-op.
    pub fn close(&self) {
        let mut guard = self.state.lock();
        guard.closed = true;
        drop(guard);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Drain and discard every buffered item without blocking. Used by the
    /// capsule worker wrapper to empty its inbox on exit; message contents
    /// are not interpreted here.
    pub fn drain_discard(&self) {
        let mut guard = self.state.lock();
        guard.buf.clear();
        drop(guard);
        self.not_full.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn ring_semantics_scenario() {
        // End-to-end scenario 2 from the spec.
        let c: Channel<i32> = Channel::create(2).unwrap();
        c.send(1, Wait::Indefinite).unwrap();
        c.send(2, Wait::Indefinite).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.try_send(3), Err(MembraneError::WouldBlock));
        assert_eq!(c.recv(Wait::Indefinite).unwrap(), 1);
        assert_eq!(c.len(), 1);
        c.send(3, Wait::Indefinite).unwrap();
        c.close();
        assert_eq!(c.recv(Wait::Indefinite).unwrap(), 2);
        assert_eq!(c.recv(Wait::Indefinite).unwrap(), 3);
        assert_eq!(c.recv(Wait::Indefinite), Err(MembraneError::Drained));
    }

    #[test]
    fn send_timed_and_recv_timed_conveniences() {
        let c: Channel<i32> = Channel::create(1).unwrap();
        c.send_timed(1, Duration::from_millis(20)).unwrap();
        assert_eq!(
            c.send_timed(2, Duration::from_millis(20)),
            Err(MembraneError::Timeout)
        );
        assert_eq!(c.recv_timed(Duration::from_millis(20)).unwrap(), 1);
        assert_eq!(
            c.recv_timed(Duration::from_millis(20)),
            Err(MembraneError::Timeout)
        );
    }

    #[test]
    fn zero_capacity_is_invalid_args() {
        assert!(matches!(
            Channel::<i32>::create(0),
            Err(MembraneError::InvalidArgs)
        ));
    }

    #[test]
    fn send_after_close_is_closed_not_would_block() {
        let c: Channel<i32> = Channel::create(1).unwrap();
        c.close();
        assert_eq!(c.send(1, Wait::Indefinite), Err(MembraneError::Closed));
        assert_eq!(c.send(1, Wait::NonBlocking), Err(MembraneError::Closed));
    }

    #[test]
    fn recv_on_empty_open_channel_would_block() {
        let c: Channel<i32> = Channel::create(1).unwrap();
        assert_eq!(c.try_recv(), Err(MembraneError::WouldBlock));
    }

    #[test]
    fn close_wakes_blocked_receiver_within_bounded_time() {
        let c = Arc::new(Channel::<i32>::create(1).unwrap());
        let c2 = Arc::clone(&c);
        let handle = thread::spawn(move || c2.recv(Wait::Indefinite));
        thread::sleep(Duration::from_millis(20));
        c.close();
        let result = handle.join().unwrap();
        assert_eq!(result, Err(MembraneError::Drained));
    }

    #[test]
    fn timed_recv_on_empty_channel_times_out() {
        let c: Channel<i32> = Channel::create(1).unwrap();
        let result = c.recv(Wait::Timeout(Duration::from_millis(20)));
        assert_eq!(result, Err(MembraneError::Timeout));
    }

    #[test]
    fn fifo_order_is_preserved_under_concurrency() {
        let c = Arc::new(Channel::<i32>::create(4).unwrap());
        for i in 0..10 {
            c.send(i, Wait::Indefinite).unwrap();
        }
        c.close();
        let mut received = Vec::new();
        while let Ok(item) = c.recv(Wait::Indefinite) {
            received.push(item);
        }
        assert_eq!(received, (0..10).collect::<Vec<_>>());
    }
}
