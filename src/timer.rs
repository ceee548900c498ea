//! One-shot deadline timers
//!
//! The queue keeps its own notion of "now" which only moves forward when the
//! host calls [`DeadlineQueue::advance_to`]. The console drives it from the
//! tokio clock; tests drive it with synthetic instants.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::time::{Duration, Instant};

/// Handle to a scheduled one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Timer side of the host
pub trait Scheduler {
    /// Arm a timer that fires once, `after` from now
    ///
    /// Returns `None`, arming nothing, when the deadline cannot be
    /// represented on the host clock.
    fn schedule_once(&mut self, after: Duration) -> Option<TimerHandle>;

    /// Cancel a timer
    ///
    /// Safe to call on a timer that already fired or was already cancelled.
    /// Returns `true` only if the timer was still pending.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

/// Min-heap of pending deadlines
#[derive(Debug)]
pub struct DeadlineQueue {
    now: Instant,
    heap: BinaryHeap<Reverse<(Instant, TimerHandle)>>,
    pending: HashSet<TimerHandle>,
    next_id: u64,
}

impl DeadlineQueue {
    /// Create a queue whose clock starts at `start`
    pub fn new(start: Instant) -> Self {
        Self {
            now: start,
            heap: BinaryHeap::new(),
            pending: HashSet::new(),
            next_id: 0,
        }
    }

    /// Current clock of the queue
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Earliest deadline still pending
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_cancelled();
        self.heap.peek().map(|Reverse((at, _))| *at)
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// Move the clock to `now` and return every timer that came due
    ///
    /// Timers fire in deadline order; equal deadlines fire in the order they
    /// were scheduled. A clock that would move backwards stays put.
    pub fn advance_to(&mut self, now: Instant) -> Vec<TimerHandle> {
        if now > self.now {
            self.now = now;
        }

        let mut fired = Vec::new();
        while let Some(Reverse((at, handle))) = self.heap.peek().copied() {
            if at > self.now {
                break;
            }
            self.heap.pop();
            if self.pending.remove(&handle) {
                fired.push(handle);
            }
        }
        fired
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, handle))) = self.heap.peek() {
            if self.pending.contains(handle) {
                break;
            }
            self.heap.pop();
        }
    }
}

impl Scheduler for DeadlineQueue {
    fn schedule_once(&mut self, after: Duration) -> Option<TimerHandle> {
        let at = self.now.checked_add(after)?;
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse((at, handle)));
        self.pending.insert(handle);
        Some(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle)
    }
}
