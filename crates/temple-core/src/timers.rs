//! Virtual-time timer queue.
//!
//! Stands in for a host's one-shot timer facility. Timers fire in order of
//! due time, and timers due at the same instant fire in the order they were
//! armed. Cancellation is lazy: the heap entry stays behind and is skipped
//! when it surfaces.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Session time in milliseconds.
pub type Millis = u64;

/// Handle to an armed timer. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct TimerQueue<E> {
    heap: BinaryHeap<Reverse<(Millis, u64)>>,
    pending: HashMap<u64, (Millis, E)>,
    next_seq: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Arms a one-shot timer firing at `due`.
    pub fn arm(&mut self, due: Millis, event: E) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((due, seq)));
        self.pending.insert(seq, (due, event));
        TimerId(seq)
    }

    /// Disarms a timer. Returns its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        self.pending.remove(&id.0).map(|(_, event)| event)
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id.0)
    }

    /// Due time of an armed timer.
    pub fn due_at(&self, id: TimerId) -> Option<Millis> {
        self.pending.get(&id.0).map(|(due, _)| *due)
    }

    /// Number of armed timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the earliest armed timer.
    pub fn next_due(&mut self) -> Option<Millis> {
        self.discard_cancelled();
        self.heap.peek().map(|Reverse((due, _))| *due)
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, TimerId, E)> {
        self.discard_cancelled();
        let Reverse((due, seq)) = *self.heap.peek()?;
        if due > now {
            return None;
        }
        self.heap.pop();
        let (due, event) = self.pending.remove(&seq)?;
        Some((due, TimerId(seq), event))
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, seq))) = self.heap.peek() {
            if self.pending.contains_key(seq) {
                break;
            }
            self.heap.pop();
        }
    }
}
