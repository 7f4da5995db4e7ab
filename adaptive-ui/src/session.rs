//! One attention-reactive UI session.
//!
//! Each frame runs a strict pipeline: sample the input source, ask the
//! hit tester what lies under the position, let the visibility engine
//! update every patch, then feed the same hit set to the dwell recorder.
//! A no-signal frame only advances total session time; every element
//! keeps its last computed state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use crate::clock::{Clock, FrameTimer};
use crate::error::Result;
use crate::hit_test::{HitSet, HitTestProvider};
use crate::input_source::{InputSource, NoSignal, SourceSample};
use crate::telemetry::{DwellRecorder, SessionRecord};
use crate::ui::geometry::Vec2;
use crate::ui::registry::ElementRegistry;
use crate::ui::visibility::VisibilityEngine;
use crate::ui::Mode;

/// What a single frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The pipeline ran at `position` with `hits` elements under it.
    Updated { position: Vec2, hits: usize },
    /// No position this frame; visuals untouched.
    NoSignal(NoSignal),
}

impl FrameOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Everything left once a session has ended.
pub struct Teardown<S> {
    /// The released input source.
    pub source: S,
    pub record: SessionRecord,
    /// Where the record was written, or why it was not.
    pub log_path: Result<PathBuf>,
}

pub struct Session<S, H> {
    source: S,
    hit_tester: H,
    registry: ElementRegistry,
    engine: VisibilityEngine,
    recorder: DwellRecorder,
    timer: FrameTimer,
    cursor: Option<Vec2>,
    last_hits: HitSet,
    log_dir: PathBuf,
}

impl<S: InputSource, H: HitTestProvider> Session<S, H> {
    /// Capture baselines and put every patch into its starting state for
    /// `mode`.
    pub fn new(
        source: S,
        hit_tester: H,
        mut registry: ElementRegistry,
        mode: Mode,
        screen: Vec2,
        clock: Arc<dyn Clock>,
        log_dir: impl Into<PathBuf>,
    ) -> Self {
        registry.initialize(mode);
        info!(
            "Session started: mode={}, input={}, {} element(s), {} patch(es)",
            mode,
            source.kind().as_str(),
            registry.len(),
            registry.patches().len()
        );
        Self {
            source,
            hit_tester,
            registry,
            engine: VisibilityEngine::new(mode, screen),
            recorder: DwellRecorder::new(),
            timer: FrameTimer::new(clock),
            cursor: None,
            last_hits: HitSet::new(),
            log_dir: log_dir.into(),
        }
    }

    /// Run one frame using the clock's elapsed time.
    pub fn frame(&mut self) -> FrameOutcome {
        let dt = self.timer.tick();
        self.step(dt)
    }

    /// Run one frame with an explicit `dt` in seconds.
    pub fn step(&mut self, dt: f32) -> FrameOutcome {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.recorder.tick(dt);

        let position = match self.source.sample(dt) {
            SourceSample::Position(p) => p,
            SourceSample::NoSignal(reason) => return FrameOutcome::NoSignal(reason),
        };
        self.cursor = Some(position);

        let hits = self.hit_tester.hit_test(position, &self.registry);
        self.engine.update(&mut self.registry, &hits, position, dt);
        self.recorder.record_hits(dt, &hits, &self.registry);

        let count = hits.len();
        self.last_hits = hits;
        FrameOutcome::Updated {
            position,
            hits: count,
        }
    }

    /// Switch display mode. Stay timers and baselines carry over.
    pub fn set_mode(&mut self, mode: Mode) {
        self.engine.set_mode(mode);
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    /// Last position the pipeline ran at, for drawing a cursor.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn last_hits(&self) -> &HitSet {
        &self.last_hits
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &VisibilityEngine {
        &self.engine
    }

    pub fn recorder(&self) -> &DwellRecorder {
        &self.recorder
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.timer.clock()
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Snapshot of the record that `end` would write now.
    pub fn record(&self) -> SessionRecord {
        self.recorder
            .to_record(self.mode().as_str(), self.clock().unix_millis())
    }

    /// Release the input source, then write the session record. A write
    /// failure is logged and returned; the session is torn down either
    /// way.
    pub fn end(mut self) -> Teardown<S> {
        self.source.shutdown();
        let record = self.record();
        let log_path = record.persist(&self.log_dir);
        match &log_path {
            Ok(_) => info!(
                "Session ended after {} frame(s)",
                self.recorder.frames()
            ),
            Err(e) => error!(
                "Failed to write session log to {}: {}",
                self.log_dir.display(),
                e
            ),
        }
        Teardown {
            source: self.source,
            record,
            log_path,
        }
    }
}
