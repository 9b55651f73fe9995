//! Deferred task queue
//!
//! A single-threaded, manually clocked timer queue. Discrete transitions
//! schedule their completion step here; the host advances the clock from
//! its event loop. Timers that expire together fire in scheduling order.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a scheduled timer, usable for cancellation
    pub struct TimerId;
}

struct Timer<F> {
    deadline: u64,
    seq: u64,
    task: F,
}

/// Pending tasks keyed by deadline in milliseconds
pub struct TimerQueue<F> {
    timers: SlotMap<TimerId, Timer<F>>,
    now: u64,
    next_seq: u64,
}

impl<F> Default for TimerQueue<F> {
    fn default() -> Self {
        Self {
            timers: SlotMap::with_key(),
            now: 0,
            next_seq: 0,
        }
    }
}

impl<F> TimerQueue<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in milliseconds
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Run `task` once `delay_ms` have elapsed
    pub fn schedule(&mut self, delay_ms: u64, task: F) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.insert(Timer {
            deadline: self.now.saturating_add(delay_ms),
            seq,
            task,
        })
    }

    /// Cancel a pending timer, handing its task back
    pub fn cancel(&mut self, id: TimerId) -> Option<F> {
        self.timers.remove(id).map(|timer| timer.task)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.timers.get(id).map(|timer| timer.deadline)
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.values().map(|timer| timer.deadline).min()
    }

    /// Remove the earliest timer due at or before `until`
    ///
    /// The clock moves to that timer's deadline, so tasks scheduled while it
    /// runs are measured from the moment it expired.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, F)> {
        let id = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.deadline <= until)
            .min_by_key(|(_, timer)| (timer.deadline, timer.seq))
            .map(|(id, _)| id)?;
        let timer = self.timers.remove(id)?;
        self.now = self.now.max(timer.deadline);
        Some((id, timer.task))
    }

    /// Move the clock forward; never moves it back
    pub fn advance_to(&mut self, time: u64) {
        self.now = self.now.max(time);
    }
}
