//! Clock and virtual-time timer queue
//!
//! Widgets never sleep on their own. Every timer lives in a `TimerQueue`
//! keyed by virtual milliseconds, and whoever owns the queue decides how time
//! advances: the tokio driver follows the wall clock, tests move a
//! `ManualClock` by hand.

use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of the current time in Unix milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    /// Move time forward and return the new reading
    pub fn advance(&self, by: Duration) -> i64 {
        let delta = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.now.fetch_add(delta, Ordering::SeqCst) + delta
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Single-threaded timer queue over virtual time
///
/// Timers fire in `(deadline, scheduling order)` order, one at a time, so two
/// callbacks never overlap.
#[derive(Debug)]
pub struct TimerQueue<K> {
    timers: BTreeMap<(i64, TimerId), K>,
    deadlines: HashMap<TimerId, i64>,
    next_id: u64,
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }

    /// Schedule `kind` to fire at `deadline_ms`
    pub fn schedule_at(&mut self, deadline_ms: i64, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.timers.insert((deadline_ms, id), kind);
        self.deadlines.insert(id, deadline_ms);
        id
    }

    /// Schedule `kind` to fire `delay` after `now_ms`
    pub fn schedule_after(&mut self, now_ms: i64, delay: Duration, kind: K) -> TimerId {
        let delay_ms = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
        self.schedule_at(now_ms.saturating_add(delay_ms), kind)
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.timers.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    /// Cancel every pending timer, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        self.deadlines.clear();
        count
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<i64> {
        self.timers.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest timer whose deadline is `<= now_ms`
    pub fn pop_due(&mut self, now_ms: i64) -> Option<(TimerId, i64, K)> {
        let (&(deadline, id), _) = self.timers.iter().next()?;
        if deadline > now_ms {
            return None;
        }

        self.deadlines.remove(&id);
        self.timers
            .remove(&(deadline, id))
            .map(|kind| (id, deadline, kind))
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(1_000);
        let other = clock.clone();

        assert_eq!(clock.advance(Duration::from_millis(500)), 1_500);
        assert_eq!(other.now_ms(), 1_500);

        other.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule_at(300, "c");
        queue.schedule_at(100, "a");
        queue.schedule_at(200, "b");

        assert_eq!(queue.next_deadline(), Some(100));

        let fired: Vec<_> = std::iter::from_fn(|| queue.pop_due(1_000))
            .map(|(_, _, kind)| kind)
            .collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_same_deadline_keeps_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.schedule_at(100, 1);
        queue.schedule_at(100, 2);
        queue.schedule_at(100, 3);

        let fired: Vec<_> = std::iter::from_fn(|| queue.pop_due(100))
            .map(|(_, _, kind)| kind)
            .collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_not_due_yet() {
        let mut queue = TimerQueue::new();
        queue.schedule_after(0, Duration::from_millis(1_000), ());

        assert!(queue.pop_due(999).is_none());
        assert!(queue.pop_due(1_000).is_some());
    }

    #[test]
    fn test_cancel() {
        let mut queue = TimerQueue::new();
        let keep = queue.schedule_at(100, "keep");
        let drop = queue.schedule_at(50, "drop");

        assert!(queue.cancel(drop));
        assert!(!queue.cancel(drop));
        assert!(queue.is_scheduled(keep));
        assert!(!queue.is_scheduled(drop));

        let (id, deadline, kind) = queue.pop_due(1_000).unwrap();
        assert_eq!((id, deadline, kind), (keep, 100, "keep"));
        assert!(!queue.cancel(keep));
    }

    #[test]
    fn test_cancel_all() {
        let mut queue = TimerQueue::new();
        queue.schedule_at(10, ());
        queue.schedule_at(20, ());

        assert_eq!(queue.cancel_all(), 2);
        assert_eq!(queue.pending(), 0);
        assert!(queue.next_deadline().is_none());
        assert!(queue.pop_due(i64::MAX).is_none());
    }
}
