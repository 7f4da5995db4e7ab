//! gaze-adaptive-ui: headless driver for the attention-reactive UI engine.
//!
//! Loads a layout, runs a scripted pointer or tracker tour over it at a
//! fixed frame rate, and writes the session's dwell log on exit.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use gaze_adaptive_ui::backend::{self, HeadlessConfig};
use gaze_adaptive_ui::clock::{Clock, SystemClock};
use gaze_adaptive_ui::config::{ScreenConfig, SessionConfig};
use gaze_adaptive_ui::hit_test::BoundsHitTester;
use gaze_adaptive_ui::input_source::{
    Calibration, DisplayHandle, FixedDisplay, GazeSource, InputSource, PointerSource,
    ScriptedPointer, ScriptedTracker, SourceKind,
};
use gaze_adaptive_ui::ui::geometry::Vec2;
use gaze_adaptive_ui::{AdaptiveUiError, Mode, Session};

const DEMO_LAYOUT: &str = include_str!("../demo.toml");

#[derive(Parser, Debug)]
#[command(name = "gaze-adaptive-ui", about = "Gaze-adaptive UI engine (headless)")]
struct Cli {
    /// Layout file (TOML). Uses the built-in demo layout when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Display mode: none, mixed, transparent, icon, or scale
    #[arg(long)]
    mode: Option<String>,

    /// Input source: pointer or gaze
    #[arg(long)]
    input: Option<String>,

    /// Directory for session logs
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Screen resolution (WxH)
    #[arg(long)]
    resolution: Option<String>,

    /// Stop after N frames (default: one full tour plus one second)
    #[arg(long)]
    frames: Option<u64>,

    /// Target frame rate; 0 runs unpaced
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Exit after N seconds
    #[arg(long)]
    exit_after: Option<u64>,

    /// Samples per tour leg
    #[arg(long, default_value = "30")]
    steps: usize,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading layout {}", path.display()))?,
        None => SessionConfig::from_toml(DEMO_LAYOUT)?,
    };

    if let Some(mode) = &cli.mode {
        config.mode = mode.clone();
    }
    if let Some(kind) = &cli.input {
        config.input.kind = kind.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.telemetry.log_dir = dir.clone();
    }
    if let Some(res) = &cli.resolution {
        config.screen = ScreenConfig::parse_resolution(res).unwrap_or_else(|| {
            warn!(
                "Invalid resolution '{}', keeping {}x{}",
                res, config.screen.width, config.screen.height
            );
            config.screen
        });
    }
    config.validate()?;
    Ok(config)
}

/// Normalized tracker sample that calibrates back to `p`.
fn to_raw(p: Vec2, cal: &Calibration) -> [f32; 2] {
    let axis = |v: f32, res: f32, sens: f32| {
        let half = res * 0.5;
        if half <= 0.0 || sens == 0.0 {
            0.0
        } else {
            (v - half) / (half * sens)
        }
    };
    [
        axis(p.x, cal.resolution.x, cal.sensitivity.x),
        axis(p.y, cal.resolution.y, cal.sensitivity.y),
    ]
}

fn build_source(
    config: &SessionConfig,
    tour: ScriptedPointer,
) -> Result<Box<dyn InputSource>, AdaptiveUiError> {
    Ok(match config.source_kind()? {
        SourceKind::Pointer => Box::new(PointerSource::new(tour)),
        SourceKind::Gaze => {
            let calibration = config.calibration();
            let samples = tour.positions().map(|p| to_raw(p, &calibration)).collect();
            let tracker = ScriptedTracker::single("scripted-0").with_samples(samples);
            Box::new(GazeSource::new(
                tracker,
                FixedDisplay(Some(DisplayHandle(1))),
                calibration,
                &config.input.application_name,
            ))
        }
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gaze-adaptive-ui {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gaze_adaptive_ui=info".into()),
        )
        .init();

    info!("gaze-adaptive-ui v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let mode: Mode = config.mode()?;
    let screen = config.screen.as_vec2();
    let registry = config.build_registry()?;

    let tour = ScriptedPointer::sweep(
        &backend::headless::tour_waypoints(&registry, screen),
        cli.steps,
    );
    let tour_frames = tour.remaining() as u64;
    let source = build_source(&config, tour)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut session = Session::new(
        source,
        BoundsHitTester::new(),
        registry,
        mode,
        screen,
        clock,
        config.telemetry.log_dir.clone(),
    );

    let headless = HeadlessConfig {
        fps: cli.fps,
        frames: cli
            .frames
            .or_else(|| cli.exit_after.is_none().then(|| tour_frames + u64::from(cli.fps))),
        exit_after: cli.exit_after,
        ..HeadlessConfig::default()
    };
    let run = backend::run(&mut session, &headless);

    let teardown = session.end();
    let stats = run?;
    info!(
        "Run complete: {} frame(s), {} without signal, total dwell {:.2}s",
        stats.frames,
        stats.no_signal_frames,
        teardown.record.dwell.iter().map(|d| d.seconds).sum::<f64>()
    );
    match teardown.log_path {
        Ok(path) => {
            println!("{}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("Session log was not written");
            Err(e.into())
        }
    }
}
