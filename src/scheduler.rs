use std::time::{Duration, Instant};

/// Identifies one scheduled switch tick. Handles are never reused, so a
/// stale handle can always be cancelled safely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle(u64);

#[derive(Debug)]
struct Pending {
    handle: TickHandle,
    due: Instant,
}

/// Single-slot deadline scheduler for the orientation switch.
///
/// `schedule` arms at most one tick; the owner polls `fire_due` from its
/// event loop and re-arms after handling the tick, so a changed period takes
/// effect on the very next reschedule and ticks can never overlap.
#[derive(Debug, Default)]
pub struct SwitchScheduler {
    next_id: u64,
    pending: Option<Pending>,
}

impl SwitchScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a tick `delay` after `now`, replacing any pending one.
    pub fn schedule(&mut self, now: Instant, delay: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending = Some(Pending {
            handle,
            due: now + delay,
        });
        handle
    }

    /// Disarms `handle` if it is still pending. Cancelling a fired,
    /// cancelled or otherwise stale handle is a no-op.
    pub fn cancel(&mut self, handle: TickHandle) {
        if self.pending.as_ref().is_some_and(|p| p.handle == handle) {
            self.pending = None;
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending tick, used by the event loop to size its
    /// wait.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Takes the pending tick once its deadline has passed. Returns None
    /// while nothing is armed or the deadline is still ahead.
    pub fn fire_due(&mut self, now: Instant) -> Option<TickHandle> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            self.pending.take().map(|p| p.handle)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_deadline() {
        let mut sched = SwitchScheduler::new();
        let t0 = Instant::now();
        let handle = sched.schedule(t0, Duration::from_millis(500));

        assert_eq!(sched.next_due(), Some(t0 + Duration::from_millis(500)));
        assert_eq!(sched.fire_due(t0), None);
        assert_eq!(sched.fire_due(t0 + Duration::from_millis(499)), None);
        assert_eq!(
            sched.fire_due(t0 + Duration::from_millis(500)),
            Some(handle)
        );
        // fired ticks are gone
        assert_eq!(sched.next_due(), None);
        assert_eq!(sched.fire_due(t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn cancel_disarms_pending_tick() {
        let mut sched = SwitchScheduler::new();
        let t0 = Instant::now();
        let handle = sched.schedule(t0, Duration::from_millis(100));
        sched.cancel(handle);
        assert!(!sched.has_pending());
        assert_eq!(sched.fire_due(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut sched = SwitchScheduler::new();
        let t0 = Instant::now();
        let handle = sched.schedule(t0, Duration::from_millis(100));
        sched.cancel(handle);
        sched.cancel(handle);
        sched.cancel(handle);
        assert!(!sched.has_pending());
    }

    #[test]
    fn cancelling_fired_handle_is_a_noop() {
        let mut sched = SwitchScheduler::new();
        let t0 = Instant::now();
        let fired = sched.schedule(t0, Duration::from_millis(10));
        assert_eq!(sched.fire_due(t0 + Duration::from_millis(10)), Some(fired));

        // a new tick armed afterwards must survive the stale cancel
        let fresh = sched.schedule(t0, Duration::from_millis(10));
        sched.cancel(fired);
        assert!(sched.has_pending());
        assert_eq!(sched.fire_due(t0 + Duration::from_millis(10)), Some(fresh));
    }

    #[test]
    fn at_most_one_tick_is_pending() {
        let mut sched = SwitchScheduler::new();
        let t0 = Instant::now();
        let first = sched.schedule(t0, Duration::from_millis(10));
        let second = sched.schedule(t0, Duration::from_millis(10));
        assert_ne!(first, second);

        // only the latest handle is live
        let fired = sched.fire_due(t0 + Duration::from_millis(10));
        assert_eq!(fired, Some(second));
        assert_eq!(sched.fire_due(t0 + Duration::from_secs(1)), None);
    }
}
