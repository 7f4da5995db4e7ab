//! Headless backend: fixed-rate frame driver for CI and scripted runs.
//!
//! Drives a session without any display: one pipeline pass per tick,
//! paced by sleeping to the target frame rate, with periodic status
//! logging. Stops after a frame count or a wall-time limit, whichever
//! comes first.

use std::time::{Duration, Instant};

use tracing::info;

use crate::hit_test::HitTestProvider;
use crate::input_source::InputSource;
use crate::session::Session;
use crate::ui::geometry::Vec2;
use crate::ui::registry::ElementRegistry;

/// Headless run configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Target frames per second. 0 runs unpaced.
    pub fps: u32,
    /// Stop after this many frames.
    pub frames: Option<u64>,
    /// Stop after this many seconds of session clock time.
    pub exit_after: Option<u64>,
    /// Seconds between status lines.
    pub status_interval_secs: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            frames: None,
            exit_after: None,
            status_interval_secs: 60,
        }
    }
}

impl HeadlessConfig {
    /// Wall time budget for one frame, if paced.
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.fps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(self.fps)))
    }

    /// Whether the run has no stop condition at all.
    pub fn is_unbounded(&self) -> bool {
        self.frames.is_none() && self.exit_after.is_none()
    }
}

/// Counters from a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub updated_frames: u64,
    pub no_signal_frames: u64,
}

/// Waypoints for a scripted tour: start at the screen center, then for
/// every patch visit its icon and its target, holding at each for one
/// leg, and end back at the center.
pub fn tour_waypoints(registry: &ElementRegistry, screen: Vec2) -> Vec<Vec2> {
    let center = Vec2::new(screen.x * 0.5, screen.y * 0.5);
    let mut points = vec![center];
    for patch in registry.patches() {
        for id in patch.icon.iter().chain(patch.target.iter()) {
            if let Some(el) = registry.element(*id) {
                points.push(el.center);
                points.push(el.center);
            }
        }
    }
    points.push(center);
    points
}

/// Drive `session` until a stop condition is met.
pub fn run<S, H>(session: &mut Session<S, H>, config: &HeadlessConfig) -> anyhow::Result<RunStats>
where
    S: InputSource,
    H: HitTestProvider,
{
    if config.is_unbounded() && config.fps == 0 {
        anyhow::bail!("an unpaced headless run needs --frames or --exit-after");
    }

    let start = session.clock().now();
    let exit_after = config.exit_after.map(Duration::from_secs);
    let status_interval = Duration::from_secs(config.status_interval_secs.max(1));
    let mut last_status = start;
    let mut stats = RunStats::default();

    if let Some(seconds) = config.exit_after {
        info!("Will exit after {} seconds", seconds);
    }
    info!(
        "Headless run: fps={}, frames={}",
        config.fps,
        config
            .frames
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );

    loop {
        if config.frames.is_some_and(|n| stats.frames >= n) {
            info!("Frame limit reached");
            break;
        }
        let now = session.clock().now();
        if exit_after.is_some_and(|limit| now.saturating_duration_since(start) >= limit) {
            info!("Headless exit timer fired");
            break;
        }

        let tick_started = Instant::now();
        if session.frame().is_updated() {
            stats.updated_frames += 1;
        } else {
            stats.no_signal_frames += 1;
        }
        stats.frames += 1;

        if now.saturating_duration_since(last_status) >= status_interval {
            last_status = now;
            info!(
                "Headless status: {} frame(s), {} without signal, {:.1}s tracked",
                stats.frames,
                stats.no_signal_frames,
                session.recorder().total_seconds
            );
        }

        if let Some(interval) = config.frame_interval() {
            if let Some(rest) = interval.checked_sub(tick_started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    info!(
        "Headless backend shutting down ({} frame(s), {} with signal)",
        stats.frames, stats.updated_frames
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::clock::TestClock;
    use crate::hit_test::BoundsHitTester;
    use crate::input_source::{
        Calibration, FixedDisplay, GazeSource, PointerSource, ScriptedPointer, ScriptedTracker,
    };
    use crate::ui::registry::{ElementSpec, UiPatch};
    use crate::ui::Mode;

    #[test]
    fn test_tour_visits_icon_then_target() {
        let mut reg = ElementRegistry::new();
        let t = reg
            .add_element(ElementSpec::new("map", Vec2::new(80.0, 20.0), Vec2::new(10.0, 10.0)))
            .unwrap();
        let i = reg
            .add_element(ElementSpec::new("map-icon", Vec2::new(95.0, 5.0), Vec2::new(4.0, 4.0)))
            .unwrap();
        reg.add_patch(UiPatch::new(Some(t), Some(i))).unwrap();
        let points = tour_waypoints(&reg, Vec2::new(100.0, 100.0));
        assert_eq!(
            points,
            vec![
                Vec2::new(50.0, 50.0),
                Vec2::new(95.0, 5.0),
                Vec2::new(95.0, 5.0),
                Vec2::new(80.0, 20.0),
                Vec2::new(80.0, 20.0),
                Vec2::new(50.0, 50.0),
            ]
        );
    }

    #[test]
    fn test_frame_interval() {
        let config = HeadlessConfig {
            fps: 50,
            ..HeadlessConfig::default()
        };
        let interval = config.frame_interval().unwrap();
        assert!((interval.as_secs_f64() - 0.02).abs() < 1e-6);
        let unpaced = HeadlessConfig {
            fps: 0,
            ..HeadlessConfig::default()
        };
        assert!(unpaced.frame_interval().is_none());
    }

    #[test]
    fn test_run_stops_at_frame_limit() {
        let mut session = Session::new(
            PointerSource::new(ScriptedPointer::new(vec![Vec2::new(1.0, 1.0)])),
            BoundsHitTester::new(),
            ElementRegistry::new(),
            Mode::Mixed,
            Vec2::new(100.0, 100.0),
            Arc::new(TestClock::new()),
            "unused",
        );
        let config = HeadlessConfig {
            fps: 0,
            frames: Some(12),
            ..HeadlessConfig::default()
        };
        let stats = run(&mut session, &config).unwrap();
        assert_eq!(stats.frames, 12);
        assert_eq!(stats.updated_frames, 12);
        assert_eq!(session.recorder().frames(), 12);
    }

    #[test]
    fn test_run_counts_no_signal_frames() {
        let source = GazeSource::new(
            ScriptedTracker::empty(),
            FixedDisplay(None),
            Calibration::new(Vec2::new(100.0, 100.0)),
            "test",
        );
        let mut session = Session::new(
            source,
            BoundsHitTester::new(),
            ElementRegistry::new(),
            Mode::Mixed,
            Vec2::new(100.0, 100.0),
            Arc::new(TestClock::new()),
            "unused",
        );
        let config = HeadlessConfig {
            fps: 0,
            frames: Some(3),
            ..HeadlessConfig::default()
        };
        let stats = run(&mut session, &config).unwrap();
        assert_eq!(stats.no_signal_frames, 3);
        assert_eq!(session.source().acquisition_attempts(), 3);
    }

    #[test]
    fn test_unbounded_unpaced_run_rejected() {
        let mut session = Session::new(
            PointerSource::new(ScriptedPointer::new(Vec::new())),
            BoundsHitTester::new(),
            ElementRegistry::new(),
            Mode::None,
            Vec2::new(100.0, 100.0),
            Arc::new(TestClock::new()),
            "unused",
        );
        let config = HeadlessConfig {
            fps: 0,
            ..HeadlessConfig::default()
        };
        assert!(run(&mut session, &config).is_err());
    }
}
