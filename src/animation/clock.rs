use std::cell::Cell as TimeCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time since the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// copy and give another to a session.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<TimeCell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let shared = clock.clone();
        clock.advance(Duration::from_millis(40));
        assert_eq!(shared.now(), Duration::from_millis(40));
        shared.set(Duration::from_secs(2));
        assert_eq!(clock.now(), Duration::from_secs(2));
    }
}
