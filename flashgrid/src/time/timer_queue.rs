//! Deadline-ordered one-shot timers.
//!
//! Callers own the notion of "now": nothing here reads a clock, so the same
//! queue runs against wall time in the binary and against a [`ManualClock`]
//! in tests.
//!
//! [`ManualClock`]: crate::time::clock::ManualClock

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::clock::Millis;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimerId(u64);

#[derive(Debug, Eq, PartialEq)]
struct Entry {
    deadline: Millis,
    id: u64,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earliest deadline first (max-heap, so reversed); ids are handed out
        // in scheduling order and break ties.
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Entry>,
    pending: HashMap<u64, T>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        now: Millis,
        delay: Millis,
        payload: T,
    ) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.heap.push(Entry {
            deadline: now.saturating_add(delay),
            id,
        });
        self.pending.insert(id, payload);
        TimerId(id)
    }

    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let removed = self.pending.remove(&id.0).is_some();
        self.discard_cancelled();
        removed
    }

    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, T)> {
        self.discard_cancelled();
        let entry = self.heap.peek()?;
        if entry.deadline > now {
            return None;
        }
        let entry = self.heap.pop()?;
        let payload = self.pending.remove(&entry.id)?;
        self.discard_cancelled();
        Some((entry.deadline, payload))
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.heap
            .iter()
            .filter(|entry| self.pending.contains_key(&entry.id))
            .map(|entry| entry.deadline)
            .min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.pending.clear();
    }

    fn discard_cancelled(&mut self) {
        while let Some(entry) = self.heap.peek() {
            if self.pending.contains_key(&entry.id) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(0, 300, "c");
        queue.schedule(0, 100, "a");
        queue.schedule(0, 200, "b");

        assert_eq!(queue.pop_due(50), None);
        assert_eq!(queue.pop_due(1_000), Some((100, "a")));
        assert_eq!(queue.pop_due(1_000), Some((200, "b")));
        assert_eq!(queue.pop_due(1_000), Some((300, "c")));
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_deadlines_fire_in_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(10, 90, 1);
        queue.schedule(0, 100, 2);
        queue.schedule(50, 50, 3);

        let order: Vec<_> =
            std::iter::from_fn(|| queue.pop_due(100).map(|(_, v)| v)).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut queue = TimerQueue::new();
        let first = queue.schedule(0, 100, "first");
        queue.schedule(0, 200, "second");

        assert!(queue.cancel(first));
        assert!(!queue.cancel(first));
        assert_eq!(queue.next_deadline(), Some(200));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(150), None);
        assert_eq!(queue.pop_due(200), Some((200, "second")));
    }

    #[test]
    fn cancelling_a_fired_timer_is_a_noop() {
        let mut queue = TimerQueue::new();
        let id = queue.schedule(0, 0, ());
        assert_eq!(queue.pop_due(0), Some((0, ())));
        assert!(!queue.cancel(id));
    }

    #[test]
    fn clear_drops_everything() {
        let mut queue = TimerQueue::new();
        queue.schedule(0, 1, 'x');
        queue.schedule(0, 2, 'y');
        queue.clear();
        assert_eq!(queue.next_deadline(), None);
        assert_eq!(queue.pop_due(u64::MAX), None);
    }
}
