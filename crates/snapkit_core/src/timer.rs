//! Host-driven timer queue
//!
//! Time only moves when the host says so: [`TimerQueue::pop_due`] hands out
//! expired timers in deadline order and moves the clock to each deadline as
//! it goes, so a callback that schedules a follow-up timer schedules it
//! relative to its own firing time.

use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

struct Timer<T> {
    deadline: Duration,
    /// Insertion order, breaks deadline ties
    seq: u64,
    payload: T,
}

/// One-shot timers keyed by [`TimerId`]
pub struct TimerQueue<T> {
    timers: SlotMap<TimerId, Timer<T>>,
    now: Duration,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            now: Duration::ZERO,
            next_seq: 0,
        }
    }

    /// Current clock value
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `payload` to fire `delay` from now
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let deadline = self.now + delay;
        let seq = self.next_seq;
        self.next_seq += 1;
        tracing::trace!("timer scheduled for {:?}", deadline);
        self.timers.insert(Timer {
            deadline,
            seq,
            payload,
        })
    }

    /// Cancel a timer; returns its payload if it was still pending
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.timers.remove(id).map(|t| t.payload)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.timers.get(id).map(|t| t.deadline)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Remove and return the earliest timer due at or before `until`
    ///
    /// The clock moves to that timer's deadline. Returns `None` once nothing
    /// else is due; call [`advance_to`](Self::advance_to) afterwards.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        let id = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline <= until)
            .min_by_key(|(_, t)| (t.deadline, t.seq))
            .map(|(id, _)| id)?;
        let timer = self.timers.remove(id)?;
        self.now = self.now.max(timer.deadline);
        Some((id, timer.payload))
    }

    /// Move the clock forward; never moves it backwards
    pub fn advance_to(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}
