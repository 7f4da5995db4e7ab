//! Session telemetry: per-element gaze dwell and total session time.
//!
//! `DwellRecorder` accumulates every frame; `SessionRecord` is the
//! durable snapshot written exactly once, at session end.

pub mod record;
pub mod recorder;

pub use record::{DwellEntry, SessionRecord};
pub use recorder::DwellRecorder;
