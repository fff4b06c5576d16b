//! Coalescing of rapid updates, driven by host-supplied timestamps.
//!
//! Nothing here reads a clock: hosts pass `now` (time since any fixed
//! origin) so the same code runs natively, in WASM, and under test.

use std::time::Duration;

/// Generation counter. Bumped whenever the loaded data is replaced; work
/// tagged with an older epoch is stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Trailing-edge debouncer: fires once, `window` after the last touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record an update at `now`, pushing the deadline out.
    pub fn touch(&mut self, now: Duration) {
        self.deadline = Some(now.saturating_add(self.window));
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before firing, if armed.
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_sub(now))
    }

    /// `true` exactly once when the window has elapsed since the last touch.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn coalesces_bursts() {
        let mut d = Debouncer::new(ms(300));
        d.touch(ms(0));
        d.touch(ms(100));
        d.touch(ms(250));
        assert!(!d.poll(ms(400)));
        assert_eq!(d.remaining(ms(400)), Some(ms(150)));
        assert!(d.poll(ms(550)));
        assert!(!d.poll(ms(600)));
        assert!(!d.is_pending());
    }

    #[test]
    fn cancel_drops_pending_work() {
        let mut d = Debouncer::new(ms(300));
        d.touch(ms(0));
        d.cancel();
        assert!(!d.poll(ms(1_000)));
    }

    #[test]
    fn epochs_advance() {
        let e = Epoch::default();
        assert!(e.next() > e);
        assert_eq!(e.next().get(), 1);
    }
}
