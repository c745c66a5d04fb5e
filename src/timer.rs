//! Virtual timer queue.
//!
//! Time only moves when the owner calls `pop_due` / `settle`; nothing sleeps.
//! Due timers come out in deadline order, ties in scheduling order.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    deadline: Duration,
    task: T,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self { now: Duration::ZERO, next_id: 1, entries: Vec::new() }
    }

    /// Time elapsed since the queue was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, deadline: self.now + delay, task });
        id
    }

    /// Returns true if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time until the earliest deadline, zero if one is already due.
    pub fn next_in(&self) -> Option<Duration> {
        self.entries
            .iter()
            .map(|e| e.deadline)
            .min()
            .map(|d| d.saturating_sub(self.now))
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= until)
            .min_by_key(|(_, e)| (e.deadline, e.id))
            .map(|(i, _)| i)?;
        let entry = self.entries.remove(idx);
        if entry.deadline > self.now {
            self.now = entry.deadline;
        }
        Some(entry.task)
    }

    /// Move the clock to `until` once every due timer has been popped.
    pub fn settle(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn pops_in_deadline_then_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(ms(20), "b");
        q.schedule(ms(10), "a");
        q.schedule(ms(20), "c");
        let until = ms(25);
        let mut out = Vec::new();
        while let Some(t) = q.pop_due(until) {
            out.push(t);
        }
        q.settle(until);
        assert_eq!(out, vec!["a", "b", "c"]);
        assert_eq!(q.now(), ms(25));
        assert!(q.is_idle());
    }

    #[test]
    fn timers_scheduled_while_draining_use_the_fired_deadline() {
        let mut q = TimerQueue::new();
        q.schedule(ms(100), 1);
        let until = ms(1000);
        assert_eq!(q.pop_due(until), Some(1));
        assert_eq!(q.now(), ms(100));
        q.schedule(ms(300), 2);
        assert_eq!(q.next_in(), Some(ms(300)));
        assert_eq!(q.pop_due(until), Some(2));
        assert_eq!(q.now(), ms(400));
    }

    #[test]
    fn cancel_and_not_yet_due() {
        let mut q = TimerQueue::new();
        let id = q.schedule(ms(5), 'x');
        q.schedule(ms(50), 'y');
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert_eq!(q.pop_due(ms(10)), None);
        assert!(!q.is_idle());
        assert_eq!(q.pop_due(ms(50)), Some('y'));
        assert!(q.is_idle());
    }
}
