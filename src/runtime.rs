use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// What one turn of the event loop produced: operator input, a terminal
/// resize, or the expiry of a wait.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where the event loop gets its input. The production source reads the
/// terminal; tests feed a channel.
pub trait EventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Forwards crossterm key and resize events from a reader thread into a
/// channel, so the event loop can wait with a timeout.
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-backed source for driving the loop headless in tests.
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Drives the event loop one wait at a time.
///
/// Each `step` blocks until input arrives or the wait expires, whichever
/// comes first. The wait is sized from the switch scheduler's next
/// deadline, so the orientation toggle fires on time instead of on a
/// fixed polling grid; `idle_wait` caps the block while no tick is armed
/// (session idle, paused or finished).
pub struct Runner<E: EventSource> {
    event_source: E,
    idle_wait: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, idle_wait: Duration) -> Self {
        Self {
            event_source,
            idle_wait,
        }
    }

    /// Blocks until the next event, the given deadline, or the idle wait.
    /// Expiry is reported as `Tick`; the caller then polls its scheduler.
    /// A deadline at or before `now` ticks without blocking on input.
    pub fn step(&self, now: Instant, deadline: Option<Instant>) -> AppEvent {
        let mut timeout = self.idle_wait;
        if let Some(due) = deadline {
            timeout = timeout.min(due.saturating_duration_since(now));
        }
        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn past_deadline_ticks_without_waiting() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_secs(60));
        let now = Instant::now();

        let before = Instant::now();
        let ev = runner.step(now, Some(now - Duration::from_millis(1)));
        assert!(matches!(ev, AppEvent::Tick));
        // must not have slept anywhere near the idle wait
        assert!(before.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn idle_wait_bounds_the_block_when_nothing_is_armed() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));
        let ev = runner.step(Instant::now(), None);
        assert!(matches!(ev, AppEvent::Tick));
    }

    #[test]
    fn input_preempts_a_pending_deadline() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_secs(60));

        let now = Instant::now();
        let ev = runner.step(now, Some(now + Duration::from_secs(30)));
        assert!(matches!(ev, AppEvent::Resize));
    }

    #[test]
    fn disconnected_source_degrades_to_ticks() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_secs(60));
        let ev = runner.step(Instant::now(), None);
        assert!(matches!(ev, AppEvent::Tick));
    }
}
