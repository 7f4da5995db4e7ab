//! Dwell accumulation.

use std::collections::BTreeMap;

use crate::hit_test::HitSet;
use crate::ui::registry::ElementRegistry;

use super::record::{DwellEntry, SessionRecord};

/// Accumulated pointer-over seconds per element name, plus total time.
#[derive(Debug, Clone, Default)]
pub struct DwellRecorder {
    /// Seconds since the session started, counting no-signal frames.
    pub total_seconds: f64,
    dwell: BTreeMap<String, f64>,
    frames: u64,
}

impl DwellRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame toward total session time.
    pub fn tick(&mut self, dt: f32) {
        self.total_seconds += f64::from(dt.max(0.0));
        self.frames += 1;
    }

    /// Add `dt` to every patch target or icon present in `hits`.
    ///
    /// Elements no patch refers to are never recorded, even when hit;
    /// the persisted log lists exactly the managed elements that received
    /// focus at least once.
    pub fn record_hits(&mut self, dt: f32, hits: &HitSet, registry: &ElementRegistry) {
        if hits.is_empty() {
            return;
        }
        let dt = f64::from(dt.max(0.0));
        let managed = registry.managed();
        for id in hits.iter().filter(|id| managed.contains(id)) {
            *self.dwell.entry(registry.name(*id).to_string()).or_insert(0.0) += dt;
        }
    }

    /// Accumulated dwell for `name`, if it was ever focused.
    pub fn dwell(&self, name: &str) -> Option<f64> {
        self.dwell.get(name).copied()
    }

    /// Sum of all per-element dwell.
    pub fn total_dwell(&self) -> f64 {
        self.dwell.values().sum()
    }

    pub fn element_count(&self) -> usize {
        self.dwell.len()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Snapshot for persistence.
    pub fn to_record(&self, mode: &str, timestamp_ms: i64) -> SessionRecord {
        SessionRecord::new(
            timestamp_ms,
            mode,
            self.total_seconds,
            self.dwell
                .iter()
                .map(|(element, seconds)| DwellEntry {
                    element: element.clone(),
                    seconds: *seconds,
                })
                .collect(),
        )
    }
}
