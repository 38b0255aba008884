use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Handle returned by the scheduler; used to cancel a timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct TimerEntry<T> {
    due: Duration,
    interval: Option<Duration>,
    task: T,
}

/// Virtual-time timer queue.
///
/// Entries are `(due, sequence, id)` in a min-heap; timers sharing a due time fire in scheduling
/// order. Cancellation removes the entry from the table and leaves a stale heap node that is
/// skipped on pop. Recurring timers re-arm at `due + interval`.
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Reverse<(Duration, u64, TimerId)>>,
    timers: HashMap<TimerId, TimerEntry<T>>,
    next_id: u64,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Empty scheduler.
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            timers: HashMap::new(),
            next_id: 0,
            next_seq: 0,
        }
    }

    /// Fire `task` once at `now + delay`.
    pub fn schedule_once(&mut self, now: Duration, delay: Duration, task: T) -> TimerId {
        self.insert(now + delay, None, task)
    }

    /// Fire `task` every `interval`, first at `now + interval`.
    ///
    /// A zero interval is bumped to one millisecond so the queue always makes progress.
    pub fn schedule_every(&mut self, now: Duration, interval: Duration, task: T) -> TimerId {
        let interval = interval.max(Duration::from_millis(1));
        self.insert(now + interval, Some(interval), task)
    }

    /// Remove a timer. Returns its task when it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.timers.remove(&id).map(|e| e.task)
    }

    /// `true` when `id` is still scheduled.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// `true` when no timer is live.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest due time among live timers.
    pub fn next_due(&mut self) -> Option<Duration> {
        self.discard_stale();
        self.queue.peek().map(|Reverse((due, _, _))| *due)
    }

    /// Drop every timer.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.timers.clear();
    }

    fn insert(&mut self, due: Duration, interval: Option<Duration>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.push(due, id);
        self.timers.insert(id, TimerEntry { due, interval, task });
        id
    }

    fn push(&mut self, due: Duration, id: TimerId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse((due, seq, id)));
    }

    fn discard_stale(&mut self) {
        while let Some(&Reverse((due, _, id))) = self.queue.peek() {
            match self.timers.get(&id) {
                Some(entry) if entry.due == due => break,
                _ => {
                    self.queue.pop();
                }
            }
        }
    }
}

impl<T: Clone> Scheduler<T> {
    /// Pop the earliest timer due at or before `now`.
    ///
    /// Returns the due time, the timer id and a copy of its task. One-shot timers are removed;
    /// recurring timers are re-armed before returning, so the handler may cancel them.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, TimerId, T)> {
        self.discard_stale();
        let Reverse((due, _, id)) = *self.queue.peek()?;
        if due > now {
            return None;
        }
        self.queue.pop();

        let entry = self.timers.get_mut(&id)?;
        match entry.interval {
            Some(interval) => {
                let next = due + interval;
                entry.due = next;
                let task = entry.task.clone();
                self.push(next, id);
                Some((due, id, task))
            }
            None => {
                let entry = self.timers.remove(&id)?;
                Some((due, id, entry.task))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/scheduler.rs"]
mod tests;
