//! Cancelable delayed tasks on a virtual timeline.
//!
//! The scheduler never sleeps and owns no threads. Time only moves when the
//! owner pops due timers up to some instant, so a front end can feed it real
//! elapsed time while tests feed it whatever durations they like.
//!
//! ```text
//! after(2000, A)   every(1000, T)
//!      |                |
//!      v                v
//! [ (1000,T) (2000,A) (2000,T) (3000,T) ... ]   ordered by (deadline, seq)
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Handle returned when a timer is armed. Recurring timers keep their id
/// across repetitions, so one `cancel` stops them for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub task: T,
    /// Virtual time at which it fired.
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    task: T,
    period_ms: Option<u64>,
}

type Key = (u64, u64);

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_seq: u64,
    queue: BTreeMap<Key, Entry<T>>,
    index: HashMap<TimerId, Key>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Fire `task` once, `delay_ms` from now.
    pub fn after(&mut self, delay_ms: u64, task: T) -> TimerId {
        let id = TimerId(self.bump());
        self.insert(self.now_ms.saturating_add(delay_ms), id, task, None);
        id
    }

    /// Fire `task` every `period_ms`, first one period from now.
    /// A zero period is treated as 1 ms.
    pub fn every(&mut self, period_ms: u64, task: T) -> TimerId {
        let period_ms = period_ms.max(1);
        let id = TimerId(self.bump());
        self.insert(self.now_ms.saturating_add(period_ms), id, task, Some(period_ms));
        id
    }

    /// Returns `false` if the timer already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancel every armed timer; returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        self.index.clear();
        n
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock
    /// to its deadline. Recurring timers are re-armed before being returned,
    /// so the caller may cancel them while handling the task.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired<T>> {
        let (&key, _) = self.queue.iter().next()?;
        let (deadline, _) = key;
        if deadline > until_ms {
            return None;
        }
        let entry = self.queue.remove(&key)?;
        self.index.remove(&entry.id);
        self.now_ms = self.now_ms.max(deadline);

        if let Some(period) = entry.period_ms {
            self.insert(
                deadline.saturating_add(period),
                entry.id,
                entry.task.clone(),
                Some(period),
            );
        }

        Some(Fired {
            id: entry.id,
            task: entry.task,
            at_ms: deadline,
        })
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn advance_clock_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn bump(&mut self) -> u64 {
        let n = self.next_seq;
        self.next_seq += 1;
        n
    }

    fn insert(&mut self, deadline: u64, id: TimerId, task: T, period_ms: Option<u64>) {
        let key = (deadline, self.bump());
        self.queue.insert(
            key,
            Entry {
                id,
                task,
                period_ms,
            },
        );
        self.index.insert(id, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler<&'static str>, until: u64) -> Vec<(u64, &'static str)> {
        let mut out = Vec::new();
        while let Some(f) = s.pop_due(until) {
            out.push((f.at_ms, f.task));
        }
        s.advance_clock_to(until);
        out
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut s = Scheduler::new();
        s.after(300, "c");
        s.after(100, "a");
        s.after(200, "b");
        assert_eq!(drain(&mut s, 1_000), vec![(100, "a"), (200, "b"), (300, "c")]);
        assert_eq!(s.pending(), 0);
        assert_eq!(s.now_ms(), 1_000);
    }

    #[test]
    fn ties_fire_in_creation_order() {
        let mut s = Scheduler::new();
        s.after(100, "first");
        s.after(100, "second");
        assert_eq!(drain(&mut s, 100), vec![(100, "first"), (100, "second")]);
    }

    #[test]
    fn recurring_timer_repeats_until_cancelled() {
        let mut s = Scheduler::new();
        let id = s.every(1_000, "tick");
        assert_eq!(drain(&mut s, 3_500).len(), 3);
        assert!(s.is_pending(id));
        assert!(s.cancel(id));
        assert!(drain(&mut s, 10_000).is_empty());
    }

    #[test]
    fn cancelled_one_shot_never_fires() {
        let mut s = Scheduler::new();
        let id = s.after(500, "x");
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert!(drain(&mut s, 1_000).is_empty());
    }

    #[test]
    fn not_due_stays_armed() {
        let mut s = Scheduler::new();
        s.after(2_000, "later");
        assert!(drain(&mut s, 1_999).is_empty());
        assert_eq!(s.next_deadline_ms(), Some(2_000));
        assert_eq!(drain(&mut s, 2_000), vec![(2_000, "later")]);
    }

    #[test]
    fn delays_are_relative_to_current_time() {
        let mut s = Scheduler::new();
        s.advance_clock_to(5_000);
        s.after(100, "x");
        assert_eq!(s.next_deadline_ms(), Some(5_100));
    }

    #[test]
    fn cancel_all_reports_count() {
        let mut s = Scheduler::new();
        s.after(1, "a");
        s.every(1, "b");
        assert_eq!(s.cancel_all(), 2);
        assert_eq!(s.pending(), 0);
    }
}
