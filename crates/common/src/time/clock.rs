//! Time abstraction for testability
//!
//! Code that stamps or ages data goes through the [`Clock`] trait so tests
//! can advance time deterministically instead of sleeping.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Trait for time operations.
pub trait Clock: Send + Sync {
    /// Current monotonic instant, for measuring durations.
    fn now(&self) -> Instant;

    /// Current wall-clock time.
    fn system_time(&self) -> SystemTime;

    /// Milliseconds since the UNIX epoch.
    fn epoch_millis(&self) -> u64 {
        self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }
}

/// Real system clock. Use in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Mock clock for deterministic tests.
///
/// Starts at the current real time; advancing it moves both the monotonic
/// and wall-clock views without any actual waiting. Clones share the same
/// elapsed counter.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    base_system_time: SystemTime,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            base_system_time: SystemTime::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Simulate `duration` passing.
    pub fn advance(&self, duration: Duration) {
        // Test utility: panic on poisoned mutex to fail tests early
        let mut elapsed = self.elapsed.lock().expect("mutex poisoned");
        *elapsed += duration;
    }

    /// Total simulated time since creation.
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().expect("mutex poisoned")
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().expect("mutex poisoned")
    }

    fn system_time(&self) -> SystemTime {
        self.base_system_time + *self.elapsed.lock().expect("mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(clock.epoch_millis() > 0);
    }

    #[test]
    fn mock_clock_advances_without_waiting() {
        let clock = MockClock::new();
        let start = clock.now();
        let epoch_before = clock.epoch_millis();

        clock.advance(Duration::from_secs(301));

        assert_eq!(clock.now().duration_since(start), Duration::from_secs(301));
        assert_eq!(clock.epoch_millis() - epoch_before, 301_000);
    }

    #[test]
    fn clones_share_elapsed_time() {
        let a = MockClock::new();
        let b = a.clone();
        a.advance(Duration::from_millis(250));
        assert_eq!(b.elapsed(), Duration::from_millis(250));
    }
}
