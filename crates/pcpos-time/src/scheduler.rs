//! Deferred events keyed by absolute tick time
//!
//! Timed gestures (shake impulses, nod auto-return, surprise playback) are
//! queued here instead of being dispatched from timers. The owner drains due
//! events at the top of each tick, so everything stays on one timeline.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use pcpos_core::TickTime;

#[derive(Debug)]
struct Scheduled<E> {
    due: TickTime,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-heap of events ordered by due time, FIFO among equal times
#[derive(Debug)]
pub struct Scheduler<E> {
    queue: BinaryHeap<Reverse<Scheduled<E>>>,
    next_seq: u64,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Scheduler {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule an event at an absolute time
    pub fn schedule_at(&mut self, due: TickTime, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled { due, seq, event }));
    }

    /// Schedule an event `delay` after `now`
    pub fn schedule_after(&mut self, now: TickTime, delay: Duration, event: E) {
        self.schedule_at(now + delay, event);
    }

    /// Remove and return every event due at or before `now`, in order
    pub fn drain_due(&mut self, now: TickTime) -> Vec<E> {
        let mut due = Vec::new();
        while let Some(Reverse(head)) = self.queue.peek() {
            if head.due > now {
                break;
            }
            if let Some(Reverse(item)) = self.queue.pop() {
                due.push(item.event);
            }
        }
        due
    }

    /// Drop every pending event matching `pred`, returning how many were dropped
    pub fn cancel_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&E) -> bool,
    {
        let before = self.queue.len();
        let kept: Vec<_> = std::mem::take(&mut self.queue)
            .into_vec()
            .into_iter()
            .filter(|Reverse(item)| !pred(&item.event))
            .collect();
        self.queue = BinaryHeap::from(kept);
        before - self.queue.len()
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Due time of the earliest pending event
    pub fn next_due(&self) -> Option<TickTime> {
        self.queue.peek().map(|Reverse(item)| item.due)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
