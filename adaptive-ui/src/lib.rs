//! Gaze-adaptive UI engine.
//!
//! Samples a gaze tracker or pointer every frame and decides, per
//! registered UI element, whether it is shown, shrunk, faded, scaled
//! down or replaced by an icon. The binary entry point lives in
//! `main.rs`; everything it drives is exposed here for integration
//! testing.

pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod hit_test;
pub mod input_source;
pub mod session;
pub mod telemetry;
pub mod ui;

pub use error::{AdaptiveUiError, Result};
pub use session::{FrameOutcome, Session, Teardown};
pub use ui::Mode;
