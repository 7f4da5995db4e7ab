//! Input source adapter: one screen position per frame, or "no signal".
//!
//! Two variants feed the pipeline:
//! - `PointerSource`: a directly sampled pointer, always available.
//! - `GazeSource`: a tracked gaze that needs a live subscription to a
//!   tracker. Acquisition binds to the active display first, falls back
//!   to the first enumerated tracker by id, and retries on later frames
//!   when nothing is enumerated. Device absence, disconnects and user
//!   absence are ordinary per-frame outcomes, never errors.
//!
//! Scripted devices at the bottom of the module drive tests and the
//! headless runner without hardware.

use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::ui::geometry::Vec2;

// ── Sample ──────────────────────────────────────────────────

/// Which kind of device produces positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Mouse or other directly sampled pointer.
    Pointer,
    /// Eye tracker.
    Gaze,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pointer => "pointer",
            Self::Gaze => "gaze",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pointer" | "mouse" => Some(Self::Pointer),
            "gaze" => Some(Self::Gaze),
            _ => None,
        }
    }
}

/// Why a frame produced no position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoSignal {
    /// No tracker enumerated, or every subscription attempt failed.
    Unavailable,
    /// Subscribed tracker reports it is not connected.
    Disconnected,
    /// Tracker is connected but nobody is in front of it.
    UserAbsent,
    /// Tracker had no fresh sample this frame.
    NoSample,
}

impl NoSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Disconnected => "disconnected",
            Self::UserAbsent => "user-absent",
            Self::NoSample => "no-sample",
        }
    }
}

/// Result of sampling a source for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceSample {
    Position(Vec2),
    NoSignal(NoSignal),
}

impl SourceSample {
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Self::Position(p) => Some(*p),
            Self::NoSignal(_) => None,
        }
    }
}

/// Anything that yields one sample per frame.
pub trait InputSource {
    /// Sample for this frame; `dt` is unscaled frame time in seconds.
    fn sample(&mut self, dt: f32) -> SourceSample;

    fn kind(&self) -> SourceKind;

    /// Release the device at session end.
    fn shutdown(&mut self) {}
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn sample(&mut self, dt: f32) -> SourceSample {
        (**self).sample(dt)
    }

    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}

// ── Pointer ─────────────────────────────────────────────────

/// Directly sampled pointer (mouse) in screen pixels.
pub trait PointerDevice {
    fn current_pointer_position(&mut self) -> Vec2;
}

/// Pointer-backed source; always yields a position.
pub struct PointerSource<P> {
    device: P,
}

impl<P: PointerDevice> PointerSource<P> {
    pub fn new(device: P) -> Self {
        Self { device }
    }

    pub fn device_mut(&mut self) -> &mut P {
        &mut self.device
    }
}

impl<P: PointerDevice> InputSource for PointerSource<P> {
    fn sample(&mut self, _dt: f32) -> SourceSample {
        SourceSample::Position(self.device.current_pointer_position())
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Pointer
    }
}

// ── Tracker boundary ────────────────────────────────────────

/// One enumerated tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerInfo {
    /// Address used to subscribe by identity.
    pub id: String,
    pub friendly_name: String,
}

impl TrackerInfo {
    pub fn new(id: impl Into<String>, friendly_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            friendly_name: friendly_name.into(),
        }
    }
}

/// Opaque handle of the display surface a tracker can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(pub u64);

/// Eye-tracking channel. Every call must return immediately.
pub trait TrackerDevice {
    /// Register the host application with the tracking runtime.
    fn set_application_name(&mut self, _name: &str) {}

    /// Pump the runtime once per frame before querying state.
    fn update(&mut self) {}

    /// Re-enumerate attached trackers.
    fn refresh_available_sources(&mut self) -> Vec<TrackerInfo>;

    /// Bind tracking to a display surface (primary strategy).
    fn subscribe_to_display(&mut self, handle: DisplayHandle) -> bool;

    /// Bind tracking to a tracker by id (fallback strategy).
    fn subscribe_to_source(&mut self, id: &str) -> bool;

    fn is_connected(&mut self) -> bool;

    fn is_user_present(&mut self) -> bool;

    /// Latest normalized gaze sample, each axis in [-1, 1].
    fn try_get_latest_sample(&mut self) -> Option<[f32; 2]>;

    /// Drop any subscription and shut the runtime down.
    fn stop_tracking(&mut self) {}
}

/// Provider of the currently active display surface.
pub trait DisplaySurface {
    fn active_handle(&mut self) -> Option<DisplayHandle>;
}

/// Display surface with a fixed (possibly missing) handle.
#[derive(Debug, Clone, Copy)]
pub struct FixedDisplay(pub Option<DisplayHandle>);

impl DisplaySurface for FixedDisplay {
    fn active_handle(&mut self) -> Option<DisplayHandle> {
        self.0
    }
}

// ── Calibration ─────────────────────────────────────────────

/// Mapping from normalized tracker samples to screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Screen resolution in pixels.
    pub resolution: Vec2,
    /// Per-axis sensitivity applied to the raw sample.
    pub sensitivity: Vec2,
    /// Per-axis pixel offset added after clamping.
    pub offset_px: (i32, i32),
    /// Cursor smoothing rate (1/s); 0 disables smoothing.
    pub movement_lerp: f32,
}

impl Calibration {
    pub fn new(resolution: Vec2) -> Self {
        Self {
            resolution,
            sensitivity: Vec2::new(1.0, 1.0),
            offset_px: (0, 0),
            movement_lerp: 0.0,
        }
    }

    /// Scale by sensitivity, map into the half-extent around the screen
    /// center, clamp to the screen, then add the pixel offset.
    pub fn map(&self, raw: [f32; 2]) -> Vec2 {
        let half = Vec2::new(self.resolution.x * 0.5, self.resolution.y * 0.5);
        let x = (raw[0] * self.sensitivity.x * half.x + half.x).clamp(0.0, self.resolution.x.max(0.0));
        let y = (raw[1] * self.sensitivity.y * half.y + half.y).clamp(0.0, self.resolution.y.max(0.0));
        Vec2::new(x + self.offset_px.0 as f32, y + self.offset_px.1 as f32)
    }
}

// ── Gaze source ─────────────────────────────────────────────

/// How the current tracker subscription was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    Display(DisplayHandle),
    Source(String),
}

/// Acquisition lifecycle of a gaze source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionState {
    Unavailable,
    Subscribed(Subscription),
}

/// Tracker-backed source with fallback acquisition and reacquisition.
pub struct GazeSource<T, D> {
    device: T,
    display: D,
    calibration: Calibration,
    state: AcquisitionState,
    /// Smoothed cursor position; reset on every (re)subscription.
    smoothed: Option<Vec2>,
    /// Last no-signal reason, for edge-triggered logging.
    last_condition: Option<NoSignal>,
    acquisition_attempts: u64,
    log_timer: f32,
}

impl<T: TrackerDevice, D: DisplaySurface> GazeSource<T, D> {
    /// Register with the tracking runtime. Acquisition happens lazily on
    /// the first sampled frame.
    pub fn new(mut device: T, display: D, calibration: Calibration, app_name: &str) -> Self {
        device.set_application_name(app_name);
        Self {
            device,
            display,
            calibration,
            state: AcquisitionState::Unavailable,
            smoothed: None,
            last_condition: None,
            acquisition_attempts: 0,
            log_timer: 0.0,
        }
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, AcquisitionState::Subscribed(_))
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn acquisition_attempts(&self) -> u64 {
        self.acquisition_attempts
    }

    pub fn device(&self) -> &T {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut T {
        &mut self.device
    }

    /// Run the acquisition protocol once. Returns true when subscribed.
    ///
    /// Enumeration and subscription failures are logged on the first
    /// failed attempt of an outage; repeats drop to debug.
    pub fn acquire(&mut self) -> bool {
        self.acquisition_attempts += 1;
        let repeat = self.last_condition == Some(NoSignal::Unavailable);
        self.device.update();
        let infos = self.device.refresh_available_sources();

        if infos.is_empty() {
            if repeat {
                debug!("Tracker list still empty (attempt {})", self.acquisition_attempts);
            } else {
                warn!("Tracker list is empty; will retry acquisition every frame");
            }
            self.state = AcquisitionState::Unavailable;
            return false;
        }

        if repeat {
            debug!(
                "{} tracker(s) enumerated (attempt {})",
                infos.len(),
                self.acquisition_attempts
            );
        } else {
            info!("Found {} tracker(s)", infos.len());
            for ti in &infos {
                info!("    {} (id={})", ti.friendly_name, ti.id);
            }
        }

        match self.display.active_handle() {
            None if repeat => debug!("No active display handle"),
            None => warn!("No active display handle; skipping display subscription"),
            Some(handle) => {
                if self.device.subscribe_to_display(handle) {
                    info!("Subscribed to tracking on display {:?}", handle);
                    self.subscribed(Subscription::Display(handle));
                    return true;
                }
                if repeat {
                    debug!("Display subscription failed for {:?}", handle);
                } else {
                    warn!("Display subscription failed for {:?}", handle);
                }
            }
        }

        let first = &infos[0];
        if self.device.subscribe_to_source(&first.id) {
            info!("Subscribed to tracker by id: {}", first.friendly_name);
            let id = first.id.clone();
            self.subscribed(Subscription::Source(id));
            true
        } else {
            if repeat {
                debug!("Tracker subscription by id failed: {}", first.friendly_name);
            } else {
                warn!("Tracker subscription by id failed: {}", first.friendly_name);
            }
            self.state = AcquisitionState::Unavailable;
            false
        }
    }

    fn subscribed(&mut self, subscription: Subscription) {
        self.state = AcquisitionState::Subscribed(subscription);
        self.smoothed = None;
    }

    fn no_signal(&mut self, reason: NoSignal) -> SourceSample {
        if self.last_condition != Some(reason) {
            match reason {
                NoSignal::Disconnected => warn!("Tracker disconnected; reacquiring"),
                NoSignal::UserAbsent => info!("User not present"),
                NoSignal::NoSample => debug!("No gaze sample this frame"),
                NoSignal::Unavailable => debug!("Gaze source unavailable"),
            }
        }
        self.last_condition = Some(reason);
        SourceSample::NoSignal(reason)
    }
}

impl<T: TrackerDevice, D: DisplaySurface> InputSource for GazeSource<T, D> {
    fn sample(&mut self, dt: f32) -> SourceSample {
        if !self.is_available() && !self.acquire() {
            return self.no_signal(NoSignal::Unavailable);
        }

        self.device.update();
        if !self.device.is_connected() {
            self.state = AcquisitionState::Unavailable;
            return self.no_signal(NoSignal::Disconnected);
        }
        if !self.device.is_user_present() {
            return self.no_signal(NoSignal::UserAbsent);
        }
        let Some(raw) = self.device.try_get_latest_sample() else {
            return self.no_signal(NoSignal::NoSample);
        };

        let mapped = self.calibration.map(raw);
        let pos = match self.smoothed {
            Some(prev) if self.calibration.movement_lerp > 0.0 => {
                prev.lerp(mapped, self.calibration.movement_lerp * dt)
            }
            _ => mapped,
        };
        self.smoothed = Some(pos);

        self.log_timer += dt;
        if self.log_timer >= 1.0 {
            self.log_timer = 0.0;
            debug!(
                "Gaze norm=({:.3},{:.3}) px=({:.0},{:.0})",
                raw[0], raw[1], pos.x, pos.y
            );
        }

        if let Some(prev) = self.last_condition.take() {
            info!("Gaze signal restored (was {})", prev.as_str());
        }
        SourceSample::Position(pos)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Gaze
    }

    fn shutdown(&mut self) {
        self.device.stop_tracking();
        self.state = AcquisitionState::Unavailable;
        info!(
            "Gaze source shut down after {} acquisition attempt(s)",
            self.acquisition_attempts
        );
    }
}

// ── Scripted devices ────────────────────────────────────────

/// Pointer that replays a fixed path, then holds its last position.
#[derive(Debug, Clone)]
pub struct ScriptedPointer {
    positions: VecDeque<Vec2>,
    last: Vec2,
}

impl ScriptedPointer {
    pub fn new(positions: Vec<Vec2>) -> Self {
        Self {
            positions: VecDeque::from(positions),
            last: Vec2::ZERO,
        }
    }

    /// Straight-line path through `waypoints`, `steps` samples per leg.
    pub fn sweep(waypoints: &[Vec2], steps: usize) -> Self {
        let steps = steps.max(1);
        let mut positions = Vec::new();
        for pair in waypoints.windows(2) {
            for i in 0..steps {
                positions.push(pair[0].lerp(pair[1], i as f32 / steps as f32));
            }
        }
        if let Some(last) = waypoints.last() {
            positions.push(*last);
        }
        Self::new(positions)
    }

    pub fn remaining(&self) -> usize {
        self.positions.len()
    }

    /// Positions not yet handed out, in order.
    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.positions.iter().copied()
    }
}

impl PointerDevice for ScriptedPointer {
    fn current_pointer_position(&mut self) -> Vec2 {
        if let Some(p) = self.positions.pop_front() {
            self.last = p;
        }
        self.last
    }
}

/// Tracker whose enumeration, subscription and presence are set by hand.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTracker {
    pub trackers: Vec<TrackerInfo>,
    pub display_subscription_ok: bool,
    pub source_subscription_ok: bool,
    pub connected: bool,
    pub user_present: bool,
    /// Normalized samples handed out one per frame; the last one repeats.
    pub samples: VecDeque<[f32; 2]>,
    pub application_name: Option<String>,
    pub refresh_calls: u32,
    pub subscriptions: Vec<String>,
    pub stopped: bool,
    last_sample: Option<[f32; 2]>,
}

impl ScriptedTracker {
    /// No trackers enumerated.
    pub fn empty() -> Self {
        Self::default()
    }

    /// One connected tracker with a present user.
    pub fn single(id: &str) -> Self {
        Self {
            trackers: vec![TrackerInfo::new(id, format!("Scripted tracker {}", id))],
            display_subscription_ok: true,
            source_subscription_ok: true,
            connected: true,
            user_present: true,
            ..Self::default()
        }
    }

    pub fn with_samples(mut self, samples: Vec<[f32; 2]>) -> Self {
        self.samples = VecDeque::from(samples);
        self
    }
}

impl TrackerDevice for ScriptedTracker {
    fn set_application_name(&mut self, name: &str) {
        self.application_name = Some(name.to_string());
    }

    fn refresh_available_sources(&mut self) -> Vec<TrackerInfo> {
        self.refresh_calls += 1;
        self.trackers.clone()
    }

    fn subscribe_to_display(&mut self, handle: DisplayHandle) -> bool {
        if self.display_subscription_ok {
            self.subscriptions.push(format!("display:{}", handle.0));
            self.stopped = false;
        }
        self.display_subscription_ok
    }

    fn subscribe_to_source(&mut self, id: &str) -> bool {
        if self.source_subscription_ok {
            self.subscriptions.push(format!("source:{}", id));
            self.stopped = false;
        }
        self.source_subscription_ok
    }

    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn is_user_present(&mut self) -> bool {
        self.user_present
    }

    fn try_get_latest_sample(&mut self) -> Option<[f32; 2]> {
        if let Some(s) = self.samples.pop_front() {
            self.last_sample = Some(s);
        }
        self.last_sample
    }

    fn stop_tracking(&mut self) {
        self.stopped = true;
    }
}

// ── Tests ───────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn calibration() -> Calibration {
        Calibration::new(Vec2::new(1920.0, 1080.0))
    }

    fn gaze(tracker: ScriptedTracker, display: Option<DisplayHandle>) -> GazeSource<ScriptedTracker, FixedDisplay> {
        GazeSource::new(tracker, FixedDisplay(display), calibration(), "test-app")
    }

    #[test]
    fn test_calibration_center_and_clamp() {
        let cal = calibration();
        assert_eq!(cal.map([0.0, 0.0]), Vec2::new(960.0, 540.0));
        assert_eq!(cal.map([1.0, -1.0]), Vec2::new(1920.0, 0.0));
        assert_eq!(cal.map([3.0, -3.0]), Vec2::new(1920.0, 0.0));
    }

    #[test]
    fn test_calibration_sensitivity_and_offset() {
        let mut cal = calibration();
        cal.sensitivity = Vec2::new(2.0, 0.5);
        cal.offset_px = (10, -20);
        let p = cal.map([0.25, 0.5]);
        assert!((p.x - (960.0 + 0.5 * 960.0 + 10.0)).abs() < 1e-3);
        assert!((p.y - (540.0 + 0.25 * 540.0 - 20.0)).abs() < 1e-3);
    }

    #[test]
    fn test_pointer_always_available() {
        let mut src = PointerSource::new(ScriptedPointer::new(vec![Vec2::new(5.0, 6.0)]));
        assert_eq!(src.sample(0.016), SourceSample::Position(Vec2::new(5.0, 6.0)));
        assert_eq!(src.sample(0.016), SourceSample::Position(Vec2::new(5.0, 6.0)));
        assert_eq!(src.kind(), SourceKind::Pointer);
    }

    #[test]
    fn test_scripted_pointer_sweep() {
        let mut p = ScriptedPointer::sweep(&[Vec2::ZERO, Vec2::new(10.0, 0.0)], 5);
        assert_eq!(p.remaining(), 6);
        assert_eq!(p.positions().nth(1), Some(Vec2::new(2.0, 0.0)));
        assert_eq!(p.current_pointer_position(), Vec2::ZERO);
        for _ in 0..10 {
            p.current_pointer_position();
        }
        assert_eq!(p.current_pointer_position(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_application_name_registered() {
        let src = gaze(ScriptedTracker::empty(), None);
        assert_eq!(src.device().application_name.as_deref(), Some("test-app"));
    }

    #[test]
    fn test_display_subscription_preferred() {
        let tracker = ScriptedTracker::single("tobii://1").with_samples(vec![[0.0, 0.0]]);
        let mut src = gaze(tracker, Some(DisplayHandle(7)));
        assert_eq!(src.sample(0.016), SourceSample::Position(Vec2::new(960.0, 540.0)));
        assert_eq!(
            src.state(),
            &AcquisitionState::Subscribed(Subscription::Display(DisplayHandle(7)))
        );
    }

    #[test]
    fn test_fallback_to_first_tracker() {
        let mut tracker = ScriptedTracker::single("tobii://a").with_samples(vec![[0.0, 0.0]]);
        tracker.trackers.push(TrackerInfo::new("tobii://b", "second"));
        tracker.display_subscription_ok = false;

        let mut src = gaze(tracker, Some(DisplayHandle(1)));
        assert!(src.sample(0.016).position().is_some());
        assert_eq!(
            src.state(),
            &AcquisitionState::Subscribed(Subscription::Source("tobii://a".to_string()))
        );
    }

    #[test]
    fn test_fallback_without_display_handle() {
        let tracker = ScriptedTracker::single("tobii://a").with_samples(vec![[0.0, 0.0]]);
        let mut src = gaze(tracker, None);
        assert!(src.sample(0.016).position().is_some());
        assert_eq!(src.device().subscriptions, vec!["source:tobii://a".to_string()]);
    }

    #[test]
    fn test_empty_enumeration_retries_every_frame() {
        let mut src = gaze(ScriptedTracker::empty(), Some(DisplayHandle(1)));
        for _ in 0..3 {
            assert_eq!(src.sample(0.016), SourceSample::NoSignal(NoSignal::Unavailable));
        }
        assert_eq!(src.acquisition_attempts(), 3);
        assert_eq!(src.device().refresh_calls, 3);
        assert!(!src.is_available());

        src.device_mut().trackers.push(TrackerInfo::new("late", "late tracker"));
        src.device_mut().display_subscription_ok = true;
        src.device_mut().connected = true;
        src.device_mut().user_present = true;
        src.device_mut().samples.push_back([0.0, 0.0]);
        assert!(src.sample(0.016).position().is_some());
    }

    #[test]
    fn test_both_subscriptions_fail() {
        let mut tracker = ScriptedTracker::single("x");
        tracker.display_subscription_ok = false;
        tracker.source_subscription_ok = false;
        let mut src = gaze(tracker, Some(DisplayHandle(1)));
        assert_eq!(src.sample(0.016), SourceSample::NoSignal(NoSignal::Unavailable));
        assert_eq!(src.state(), &AcquisitionState::Unavailable);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn count(&self, needle: &str) -> usize {
            String::from_utf8_lossy(&self.0.lock().unwrap()).matches(needle).count()
        }
    }

    #[test]
    fn test_failing_subscriptions_logged_once_per_outage() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let mut tracker = ScriptedTracker::single("x");
        tracker.display_subscription_ok = false;
        tracker.source_subscription_ok = false;
        let mut src = gaze(tracker, Some(DisplayHandle(1)));

        tracing::subscriber::with_default(subscriber, || {
            for _ in 0..5 {
                assert_eq!(src.sample(0.016), SourceSample::NoSignal(NoSignal::Unavailable));
            }
            assert_eq!(src.acquisition_attempts(), 5);
            assert_eq!(log.count("Found 1 tracker(s)"), 1);
            assert_eq!(log.count("Display subscription failed"), 1);
            assert_eq!(log.count("Tracker subscription by id failed"), 1);

            src.device_mut().source_subscription_ok = true;
            src.device_mut().samples.push_back([0.0, 0.0]);
            assert!(src.sample(0.016).position().is_some());

            src.device_mut().connected = false;
            src.device_mut().source_subscription_ok = false;
            assert_eq!(src.sample(0.016), SourceSample::NoSignal(NoSignal::Disconnected));
            src.device_mut().connected = true;
            assert_eq!(src.sample(0.016), SourceSample::NoSignal(NoSignal::Unavailable));
            assert_eq!(src.sample(0.016), SourceSample::NoSignal(NoSignal::Unavailable));
        });
        assert_eq!(log.count("Found 1 tracker(s)"), 2);
        assert_eq!(log.count("Display subscription failed"), 2);
        assert_eq!(log.count("Tracker subscription by id failed"), 2);
    }

    #[test]
    fn test_disconnect_triggers_reacquisition() {
        let tracker = ScriptedTracker::single("x").with_samples(vec![[0.0, 0.0]]);
        let mut src = gaze(tracker, Some(DisplayHandle(1)));
        assert!(src.sample(0.016).position().is_some());

        src.device_mut().connected = false;
        assert_eq!(src.sample(0.016), SourceSample::NoSignal(NoSignal::Disconnected));
        assert!(!src.is_available());

        src.device_mut().connected = true;
        assert!(src.sample(0.016).position().is_some());
        assert_eq!(src.acquisition_attempts(), 2);
    }

    #[test]
    fn test_user_absent_keeps_subscription() {
        let mut tracker = ScriptedTracker::single("x").with_samples(vec![[0.0, 0.0]]);
        tracker.user_present = false;
        let mut src = gaze(tracker, Some(DisplayHandle(1)));
        assert_eq!(src.sample(0.016), SourceSample::NoSignal(NoSignal::UserAbsent));
        assert!(src.is_available());
        assert_eq!(src.acquisition_attempts(), 1);
    }

    #[test]
    fn test_no_sample_yet() {
        let mut src = gaze(ScriptedTracker::single("x"), Some(DisplayHandle(1)));
        assert_eq!(src.sample(0.016), SourceSample::NoSignal(NoSignal::NoSample));
    }

    #[test]
    fn test_movement_smoothing() {
        let tracker = ScriptedTracker::single("x").with_samples(vec![[0.0, 0.0], [1.0, 0.0]]);
        let mut cal = calibration();
        cal.movement_lerp = 5.0;
        let mut src = GazeSource::new(tracker, FixedDisplay(Some(DisplayHandle(1))), cal, "t");

        let first = src.sample(0.1).position().unwrap();
        assert_eq!(first, Vec2::new(960.0, 540.0));
        let second = src.sample(0.1).position().unwrap();
        assert!((second.x - (960.0 + 0.5 * 960.0)).abs() < 1e-3);
    }

    #[test]
    fn test_shutdown_stops_tracking() {
        let tracker = ScriptedTracker::single("x").with_samples(vec![[0.0, 0.0]]);
        let mut src = gaze(tracker, Some(DisplayHandle(1)));
        src.sample(0.016);
        src.shutdown();
        assert!(src.device().stopped);
        assert!(!src.is_available());
    }
}
