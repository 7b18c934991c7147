#![forbid(unsafe_code)]

//! Single-shot timers on a virtual clock.
//!
//! The [`Scheduler`] owns every pending timer of a sequencer. Time only
//! moves when the owner calls [`Scheduler::pop_due`] / [`Scheduler::settle`],
//! so tests drive it with exact deltas and a real-time host drives it with
//! measured elapsed time.
//!
//! # Invariants
//!
//! 1. `now` never moves backwards.
//! 2. Timers fire in deadline order; equal deadlines fire in scheduling order.
//! 3. A cancelled handle never fires, and cancelling twice is harmless.

use std::time::Duration;

/// Cancellation handle returned by [`Scheduler::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// A timer that reached its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<K> {
    pub handle: TimerHandle,
    pub payload: K,
    pub due: Duration,
}

#[derive(Debug, Clone)]
struct Pending<K> {
    handle: TimerHandle,
    payload: K,
    due: Duration,
}

#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending<K>>,
}

impl<K: Copy> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, payload: K, after: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push(Pending {
            handle,
            payload,
            due: self.now.saturating_add(after),
        });
        handle
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    /// Cancel every pending timer, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Time left before `handle` fires.
    pub fn remaining(&self, handle: TimerHandle) -> Option<Duration> {
        self.pending
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| p.due.saturating_sub(self.now))
    }

    /// Time left before the earliest pending timer fires.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.earliest()
            .map(|idx| self.pending[idx].due.saturating_sub(self.now))
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<K>> {
        let idx = self.earliest()?;
        if self.pending[idx].due > until {
            return None;
        }
        let timer = self.pending.remove(idx);
        self.now = self.now.max(timer.due);
        Some(Fired {
            handle: timer.handle,
            payload: timer.payload,
            due: timer.due,
        })
    }

    /// Move the clock forward to `until` without firing anything.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn earliest(&self) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| (p.due, p.handle))
            .map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut sched = Scheduler::new();
        sched.schedule('b', ms(200));
        sched.schedule('a', ms(100));
        sched.schedule('c', ms(200));

        let order: Vec<char> = std::iter::from_fn(|| sched.pop_due(ms(500)))
            .map(|f| f.payload)
            .collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
        assert_eq!(sched.now(), ms(200));
    }

    #[test]
    fn not_due_stays_pending() {
        let mut sched = Scheduler::new();
        let handle = sched.schedule((), ms(100));
        assert!(sched.pop_due(ms(99)).is_none());
        sched.settle(ms(99));
        assert_eq!(sched.remaining(handle), Some(ms(1)));
        assert_eq!(sched.pop_due(ms(100)).map(|f| f.handle), Some(handle));
        assert!(sched.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut sched = Scheduler::new();
        let handle = sched.schedule(1, ms(10));
        let other = sched.schedule(2, ms(20));
        assert_eq!(sched.len(), 2);
        assert!(sched.cancel(handle));
        assert!(!sched.is_pending(handle));
        assert!(sched.is_pending(other));
        assert_eq!(sched.len(), 1);
        assert!(!sched.cancel(handle));
        let fired: Vec<i32> = std::iter::from_fn(|| sched.pop_due(ms(1000)))
            .map(|f| f.payload)
            .collect();
        assert_eq!(fired, vec![2]);
    }

    #[test]
    fn clock_is_monotonic() {
        let mut sched: Scheduler<()> = Scheduler::new();
        sched.settle(ms(50));
        sched.settle(ms(10));
        assert_eq!(sched.now(), ms(50));
        let handle = sched.schedule((), ms(5));
        assert_eq!(sched.remaining(handle), Some(ms(5)));
        assert_eq!(sched.next_deadline(), Some(ms(5)));
        assert_eq!(sched.cancel_all(), 1);
        assert_eq!(sched.next_deadline(), None);
    }
}
