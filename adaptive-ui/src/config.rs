//! Session configuration: elements, patches, calibration, mode.
//!
//! Loaded from TOML. Calibration values are plain data handed to the
//! input source at construction; nothing here is global or mutable at
//! runtime.
//!
//! ```toml
//! mode = "mixed"
//!
//! [screen]
//! width = 1920
//! height = 1080
//!
//! [calibration]
//! sensitivity_x = 1.0
//! offset_y = -12
//!
//! [[elements]]
//! name = "minimap"
//! center = [1700.0, 200.0]
//! size = [320.0, 320.0]
//!
//! [[patches]]
//! target = "minimap"
//! size_out = [0.0, 0.0]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AdaptiveUiError, Result};
use crate::input_source::{Calibration, SourceKind};
use crate::ui::geometry::Vec2;
use crate::ui::registry::{ElementRegistry, ElementSpec, UiPatch};
use crate::ui::Mode;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: String,
    pub screen: ScreenConfig,
    pub calibration: CalibrationConfig,
    pub input: InputConfig,
    pub telemetry: TelemetryConfig,
    pub elements: Vec<ElementConfig>,
    pub patches: Vec<PatchConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Mixed.as_str().to_string(),
            screen: ScreenConfig::default(),
            calibration: CalibrationConfig::default(),
            input: InputConfig::default(),
            telemetry: TelemetryConfig::default(),
            elements: Vec::new(),
            patches: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl ScreenConfig {
    /// Parse a "WxH" resolution string. Returns None unless both sides
    /// are positive integers.
    pub fn parse_resolution(s: &str) -> Option<Self> {
        let (w, h) = s.split_once('x')?;
        let width = w.trim().parse::<u32>().ok()?;
        let height = h.trim().parse::<u32>().ok()?;
        if width > 0 && height > 0 {
            Some(Self { width, height })
        } else {
            None
        }
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Gaze calibration, read-only to the engine.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub sensitivity_x: f32,
    pub sensitivity_y: f32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub movement_lerp: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            sensitivity_x: 1.0,
            sensitivity_y: 1.0,
            offset_x: 0,
            offset_y: 0,
            movement_lerp: 30.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// "pointer" or "gaze".
    pub kind: String,
    /// Name the tracker runtime registers the session under.
    pub application_name: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Pointer.as_str().to_string(),
            application_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_dir: PathBuf,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementConfig {
    pub name: String,
    pub center: [f32; 2],
    pub size: [f32; 2],
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub nested: usize,
}

fn default_opacity() -> f32 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatchConfig {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub size_out: [f32; 2],
    #[serde(default = "default_stay_time")]
    pub stay_time: f32,
    #[serde(default = "default_lerp_speed")]
    pub lerp_speed: f32,
    #[serde(default = "default_emphasis_radius")]
    pub emphasis_radius: f32,
}

fn default_stay_time() -> f32 {
    0.5
}

fn default_lerp_speed() -> f32 {
    20.0
}

fn default_emphasis_radius() -> f32 {
    0.2
}

impl SessionConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn mode(&self) -> Result<Mode> {
        Mode::from_str(&self.mode).ok_or_else(|| AdaptiveUiError::UnknownMode(self.mode.clone()))
    }

    pub fn source_kind(&self) -> Result<SourceKind> {
        SourceKind::from_str(&self.input.kind).ok_or_else(|| {
            AdaptiveUiError::InvalidConfig(format!(
                "input.kind must be pointer or gaze, got {}",
                self.input.kind
            ))
        })
    }

    pub fn calibration(&self) -> Calibration {
        Calibration {
            resolution: self.screen.as_vec2(),
            sensitivity: Vec2::new(self.calibration.sensitivity_x, self.calibration.sensitivity_y),
            offset_px: (self.calibration.offset_x, self.calibration.offset_y),
            movement_lerp: self.calibration.movement_lerp.max(0.0),
        }
    }

    /// Structural checks that do not need a registry.
    pub fn validate(&self) -> Result<()> {
        self.mode()?;
        self.source_kind()?;
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(AdaptiveUiError::InvalidConfig(
                "screen resolution must be positive".to_string(),
            ));
        }
        let cal = &self.calibration;
        if !(cal.sensitivity_x.is_finite() && cal.sensitivity_y.is_finite() && cal.movement_lerp.is_finite()) {
            return Err(AdaptiveUiError::InvalidConfig(
                "calibration values must be finite".to_string(),
            ));
        }

        let mut sizes: HashMap<&str, [f32; 2]> = HashMap::new();
        for el in &self.elements {
            if sizes.insert(el.name.as_str(), el.size).is_some() {
                return Err(AdaptiveUiError::DuplicateElement(el.name.clone()));
            }
            let finite = el.center.iter().chain(el.size.iter()).all(|v| v.is_finite());
            if !finite || el.size[0] < 0.0 || el.size[1] < 0.0 {
                return Err(AdaptiveUiError::InvalidConfig(format!(
                    "element {} has a non-finite or negative geometry",
                    el.name
                )));
            }
        }

        let mut targets = HashSet::new();
        for patch in &self.patches {
            for name in patch.target.iter().chain(patch.icon.iter()) {
                if !sizes.contains_key(name.as_str()) {
                    return Err(AdaptiveUiError::UnknownElement(name.clone()));
                }
            }
            if let Some(target) = &patch.target {
                if !targets.insert(target.as_str()) {
                    return Err(AdaptiveUiError::SharedTarget(target.clone()));
                }
            }
            let numbers = [
                patch.size_out[0],
                patch.size_out[1],
                patch.stay_time,
                patch.lerp_speed,
                patch.emphasis_radius,
            ];
            if numbers.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(AdaptiveUiError::InvalidConfig(
                    "patch values must be finite and non-negative".to_string(),
                ));
            }
            if let Some(size) = patch.target.as_deref().and_then(|t| sizes.get(t)) {
                if patch.size_out[0] > size[0] || patch.size_out[1] > size[1] {
                    return Err(AdaptiveUiError::InvalidConfig(format!(
                        "size_out of {} exceeds its size",
                        patch.target.as_deref().unwrap_or_default()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build the element registry (not yet initialized for a mode).
    pub fn build_registry(&self) -> Result<ElementRegistry> {
        let mut registry = ElementRegistry::new();
        for el in &self.elements {
            registry.add_element(
                ElementSpec::new(el.name.clone(), el.center.into(), el.size.into())
                    .with_opacity(el.opacity)
                    .with_nested(el.nested),
            )?;
        }
        for patch in &self.patches {
            let lookup = |name: &Option<String>| -> Result<_> {
                name.as_ref()
                    .map(|n| {
                        registry
                            .id_by_name(n)
                            .ok_or_else(|| AdaptiveUiError::UnknownElement(n.clone()))
                    })
                    .transpose()
            };
            let target = lookup(&patch.target)?;
            let icon = lookup(&patch.icon)?;
            registry.add_patch(UiPatch {
                target,
                icon,
                size_out: patch.size_out.into(),
                stay_time: patch.stay_time,
                lerp_speed: patch.lerp_speed,
                emphasis_radius: patch.emphasis_radius,
            })?;
        }
        Ok(registry)
    }
}
