//! Time sources and unscaled frame timing.
//!
//! Production code uses `SystemClock`; tests drive `TestClock` by hand.
//! `FrameTimer` turns successive clock readings into the unscaled `dt`
//! every per-frame component consumes.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

/// Trait abstracting time sources for testability.
pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Current wall-clock time in milliseconds since UNIX epoch.
    fn unix_millis(&self) -> i64;
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_millis(&self) -> i64 {
        system_unix_millis()
    }
}

fn system_unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Test clock with manually controlled time.
pub struct TestClock {
    state: Mutex<(Instant, i64)>,
}

impl TestClock {
    /// Create a test clock starting at the current real time.
    pub fn new() -> Self {
        Self {
            state: Mutex::new((Instant::now(), system_unix_millis())),
        }
    }

    /// Advance both monotonic and wall time.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.0 += duration;
        state.1 += duration.as_millis() as i64;
    }

    /// Advance by a fractional number of seconds.
    pub fn advance_secs(&self, secs: f32) {
        self.advance(Duration::from_secs_f32(secs.max(0.0)));
    }

    /// Set the UNIX millisecond timestamp explicitly.
    pub fn set_unix_millis(&self, ms: i64) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).1 = ms;
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).0
    }

    fn unix_millis(&self) -> i64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).1
    }
}

// ── Frame timing ────────────────────────────────────────────

/// Unscaled frame-time source.
pub struct FrameTimer {
    clock: Arc<dyn Clock>,
    last: Option<Instant>,
    /// Upper bound on a single `dt`, in seconds.
    pub max_dt: f32,
}

impl FrameTimer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: None,
            max_dt: 0.25,
        }
    }

    /// Seconds since the previous tick; 0 on the first tick.
    pub fn tick(&mut self) -> f32 {
        let now = self.clock.now();
        let dt = match self.last {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        dt.min(self.max_dt)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_time() {
        let clock = SystemClock;
        let now = clock.now();
        assert!(clock.unix_millis() > 0);
        assert!(clock.now() >= now);
    }

    #[test]
    fn test_test_clock_advance() {
        let clock = TestClock::new();
        let t0 = clock.now();
        let ms0 = clock.unix_millis();

        clock.advance(Duration::from_secs(5));

        assert_eq!(clock.now() - t0, Duration::from_secs(5));
        assert_eq!(clock.unix_millis() - ms0, 5000);
    }

    #[test]
    fn test_test_clock_set_unix_millis() {
        let clock = TestClock::new();
        clock.set_unix_millis(1_234_567_890_000);
        assert_eq!(clock.unix_millis(), 1_234_567_890_000);
    }

    #[test]
    fn test_frame_timer_dt() {
        let clock = Arc::new(TestClock::new());
        let mut timer = FrameTimer::new(clock.clone());
        assert_eq!(timer.tick(), 0.0);

        clock.advance(Duration::from_millis(100));
        assert!((timer.tick() - 0.1).abs() < 1e-6);

        assert_eq!(timer.tick(), 0.0);
    }

    #[test]
    fn test_frame_timer_clamps_stalls() {
        let clock = Arc::new(TestClock::new());
        let mut timer = FrameTimer::new(clock.clone());
        timer.tick();
        clock.advance(Duration::from_secs(10));
        assert!((timer.tick() - 0.25).abs() < 1e-6);
    }
}
