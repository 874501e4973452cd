#![forbid(unsafe_code)]

//! Deterministic clock and fire-and-forget timers.
//!
//! The host advances time explicitly; nothing here reads a wall clock. A
//! timer fires once when the clock reaches its due time. Timers are never
//! cancelled: owners that may outlive their target guard on element
//! existence instead.

use core::time::Duration;

/// Identifier returned by [`TimerQueue::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward to `now`. Earlier values are ignored.
    pub fn advance_to(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

#[derive(Debug, Clone)]
struct Pending<O> {
    id: TimerId,
    due: Duration,
    owner: O,
}

/// Pending timers ordered by (due time, scheduling order).
#[derive(Debug, Clone)]
pub struct TimerQueue<O> {
    clock: DeterministicClock,
    next_id: u64,
    pending: Vec<Pending<O>>,
}

impl<O> Default for TimerQueue<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> TimerQueue<O> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clock: DeterministicClock::new(),
            next_id: 0,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Schedule a one-shot timer `delay` from now.
    pub fn schedule(&mut self, delay: Duration, owner: O) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.clock.now().saturating_add(delay);
        tracing::trace!(timer = id.0, due_ms = due.as_millis() as u64, "timer scheduled");
        self.pending.push(Pending { id, due, owner });
        id
    }

    /// Earliest due time among pending timers.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.due).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pop the next timer due at or before `limit`, moving the clock to its
    /// due time so timers scheduled by its owner are relative to it.
    pub fn pop_due(&mut self, limit: Duration) -> Option<(TimerId, O)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= limit)
            .min_by_key(|(_, p)| (p.due, p.id))
            .map(|(idx, _)| idx)?;
        let timer = self.pending.remove(idx);
        self.clock.advance_to(timer.due);
        Some((timer.id, timer.owner))
    }

    /// Drop every pending timer. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    /// Finish an advance: move the clock to `now` once nothing else is due.
    pub fn settle(&mut self, now: Duration) {
        self.clock.advance_to(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn clock_is_monotonic() {
        let mut clock = DeterministicClock::new();
        clock.advance(ms(10));
        clock.advance_to(ms(5));
        assert_eq!(clock.now(), ms(10));
        clock.advance_to(ms(20));
        assert_eq!(clock.now(), ms(20));
    }

    #[test]
    fn pops_in_due_then_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(ms(200), "late");
        q.schedule(ms(100), "first");
        q.schedule(ms(100), "second");
        assert_eq!(q.next_deadline(), Some(ms(100)));

        let order: Vec<_> = core::iter::from_fn(|| q.pop_due(ms(1000)))
            .map(|(_, owner)| owner)
            .collect();
        assert_eq!(order, vec!["first", "second", "late"]);
        assert!(q.is_empty());
    }

    #[test]
    fn nested_schedule_is_relative_to_firing_time() {
        let mut q = TimerQueue::new();
        q.schedule(ms(600), 1);
        let (_, owner) = q.pop_due(ms(5000)).unwrap();
        assert_eq!(owner, 1);
        assert_eq!(q.now(), ms(600));
        q.schedule(ms(500), 2);
        assert_eq!(q.next_deadline(), Some(ms(1100)));
        assert!(q.pop_due(ms(1099)).is_none());
        q.settle(ms(1099));
        assert_eq!(q.now(), ms(1099));
    }
}
