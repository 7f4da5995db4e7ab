//! Visibility state machine: per-patch, per-frame show/hide decisions.
//!
//! Every patch runs the same priority ladder each frame (top rule wins):
//!
//! 1. `IconFocused`   icon is in the hit set: swap icon for target, grow.
//! 2. `TargetFocused` target is in the hit set: keep growing.
//! 3. `Retracting`    stay timer still running: hold, finish growth linearly.
//! 4. `Shrinking`     target still shown: shrink linearly toward `size_out`.
//! 5. `Idle`          target hidden: keep the icon up.
//!
//! The active `Mode` decides which channel (footprint, opacity, scale)
//! the resulting phase is written to, and whether the icon takes part.
//! Switching mode keeps stay timers and current visuals as they are.

use std::collections::HashMap;
use tracing::{debug, info};

use super::geometry::{Vec2, Vec3};
use super::registry::{ElementId, ElementRegistry, UiPatch, DIMMED_ICON_OPACITY};
use super::Mode;
use crate::hit_test::HitSet;

/// Retract-phase growth speed, in px/s per unit of `lerp_speed`.
pub const RETRACT_STEP_FACTOR: f32 = 10.0;
/// Shrink speed, in px/s per unit of `lerp_speed`.
pub const SHRINK_STEP_FACTOR: f32 = 150.0;
/// Distance to `size_out` below which a shrinking target snaps shut.
pub const SNAP_EPSILON: f32 = 0.01;
/// Stay timers at or below this many seconds count as expired.
pub const STAY_EPSILON: f32 = 1e-5;

/// Transparent mode: hidden opacity of a target with nested visuals.
pub const HIDDEN_OPACITY: f32 = 0.0;
/// Transparent mode: hidden opacity of nested visuals, and of a target
/// that has none.
pub const FAINT_OPACITY: f32 = 0.1;

/// Scale mode: reduced scale while unfocused.
pub const SCALE_REDUCED: Vec3 = Vec3 {
    x: 0.5,
    y: 0.5,
    z: 1.0,
};
/// Scale mode: per-frame blend toward natural size while focused.
pub const SCALE_FOCUS_BLEND: f32 = 1.0;
/// Scale mode: per-frame blend toward the reduced scale.
pub const SCALE_REDUCE_BLEND: f32 = 0.16;

// ── Phase ───────────────────────────────────────────────────

/// Outcome of the priority ladder for one patch in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    IconFocused,
    TargetFocused,
    Retracting,
    Shrinking,
    Idle,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IconFocused => "icon-focused",
            Self::TargetFocused => "target-focused",
            Self::Retracting => "retracting",
            Self::Shrinking => "shrinking",
            Self::Idle => "idle",
        }
    }

    /// Phases during which the target is presented as focused.
    pub fn is_engaged(&self) -> bool {
        matches!(self, Self::IconFocused | Self::TargetFocused | Self::Retracting)
    }
}

// ── Mode profile ────────────────────────────────────────────

/// Visual channel a mode writes the ladder's phase to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    None,
    Footprint,
    Opacity,
    Scale,
}

/// Per-mode channel selection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeProfile {
    pub channel: Channel,
    pub uses_icon: bool,
    /// Whether icon opacity follows pointer distance and focus emphasis.
    pub modulate_icon_opacity: bool,
}

impl ModeProfile {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::None => Self {
                channel: Channel::None,
                uses_icon: false,
                modulate_icon_opacity: false,
            },
            Mode::Mixed => Self {
                channel: Channel::Footprint,
                uses_icon: true,
                modulate_icon_opacity: true,
            },
            Mode::Transparent => Self {
                channel: Channel::Opacity,
                uses_icon: false,
                modulate_icon_opacity: false,
            },
            Mode::Icon => Self {
                channel: Channel::Footprint,
                uses_icon: true,
                modulate_icon_opacity: false,
            },
            Mode::Scale => Self {
                channel: Channel::Scale,
                uses_icon: false,
                modulate_icon_opacity: false,
            },
        }
    }
}

/// Fraction of the remaining distance covered by one proportional step.
///
/// Equals `rate * dt` to first order and stays within [0, 1) for any
/// frame time, so growth never overshoots the restore goal.
pub fn approach_fraction(rate: f32, dt: f32) -> f32 {
    if rate <= 0.0 || dt <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

// ── Engine ──────────────────────────────────────────────────

/// Per-frame visibility driver for every patch in a registry.
#[derive(Debug)]
pub struct VisibilityEngine {
    mode: Mode,
    /// Screen resolution in pixels, for normalized icon distance.
    screen: Vec2,
    /// Remaining grace seconds, keyed by target element.
    stay_timers: HashMap<ElementId, f32>,
    /// Last ladder outcome per patch index.
    phases: Vec<Phase>,
}

impl VisibilityEngine {
    pub fn new(mode: Mode, screen: Vec2) -> Self {
        Self {
            mode,
            screen,
            stay_timers: HashMap::new(),
            phases: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode. Stay timers and element visuals carry over unchanged.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            info!("Display mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn set_screen(&mut self, screen: Vec2) {
        self.screen = screen;
    }

    /// Remaining stay time for `target`, if its grace period is running.
    pub fn stay_remaining(&self, target: ElementId) -> Option<f32> {
        self.stay_timers.get(&target).copied()
    }

    /// Number of targets currently in their grace period.
    pub fn active_timers(&self) -> usize {
        self.stay_timers.len()
    }

    /// Ladder outcome of the last update for patch `index`.
    pub fn phase(&self, index: usize) -> Option<Phase> {
        self.phases.get(index).copied()
    }

    /// Run one frame for every patch.
    ///
    /// `pointer` is the mapped screen position the hit set was computed
    /// for; `dt` is unscaled frame time in seconds.
    pub fn update(
        &mut self,
        registry: &mut ElementRegistry,
        hits: &HitSet,
        pointer: Vec2,
        dt: f32,
    ) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let profile = ModeProfile::for_mode(self.mode);
        let count = registry.patches().len();
        self.phases.resize(count, Phase::Idle);

        for index in 0..count {
            let patch = registry.patches()[index];
            if patch.target.is_none() && patch.icon.is_none() {
                continue;
            }
            if profile.modulate_icon_opacity {
                self.emphasize_icon(registry, &patch, pointer);
            }

            let phase = self.evaluate(registry, &patch, hits, dt, &profile);
            match profile.channel {
                Channel::Footprint => self.apply_footprint(registry, &patch, phase, dt, &profile),
                Channel::Opacity => self.apply_opacity(registry, &patch, phase),
                Channel::Scale => self.apply_scale(registry, &patch, phase),
                Channel::None => self.apply_shown(registry, &patch),
            }

            if self.phases[index] != phase {
                debug!(
                    "Patch {} ({}): {} -> {}",
                    index,
                    patch.target.map(|t| registry.name(t)).unwrap_or("-"),
                    self.phases[index].as_str(),
                    phase.as_str()
                );
            }
            self.phases[index] = phase;
        }
    }

    /// Priority ladder. Owns stay-timer refresh, decrement and expiry.
    fn evaluate(
        &mut self,
        registry: &ElementRegistry,
        patch: &UiPatch,
        hits: &HitSet,
        dt: f32,
        profile: &ModeProfile,
    ) -> Phase {
        let icon_hit = profile.uses_icon && patch.icon.is_some_and(|icon| hits.contains(&icon));
        if icon_hit {
            if let Some(target) = patch.target {
                self.stay_timers.insert(target, patch.stay_time);
            }
            return Phase::IconFocused;
        }

        let Some(target) = patch.target else {
            return Phase::Idle;
        };

        if hits.contains(&target) {
            self.stay_timers.insert(target, patch.stay_time);
            return Phase::TargetFocused;
        }

        if let Some(remaining) = self.stay_timers.get_mut(&target) {
            *remaining -= dt;
            if *remaining > STAY_EPSILON {
                return Phase::Retracting;
            }
            self.stay_timers.remove(&target);
        }

        if registry.is_active(target) {
            Phase::Shrinking
        } else {
            Phase::Idle
        }
    }

    /// Continuous icon emphasis: full opacity inside the emphasis radius,
    /// dimmed outside. Only while the icon is shown.
    fn emphasize_icon(&self, registry: &mut ElementRegistry, patch: &UiPatch, pointer: Vec2) {
        let Some(icon) = patch.icon else { return };
        let Some(el) = registry.element(icon) else { return };
        if !el.active {
            return;
        }
        let dist = pointer.div(self.screen).distance(el.center.div(self.screen));
        let opacity = if dist <= patch.emphasis_radius {
            1.0
        } else {
            DIMMED_ICON_OPACITY
        };
        registry.apply_opacity(icon, opacity);
    }

    fn apply_footprint(
        &mut self,
        registry: &mut ElementRegistry,
        patch: &UiPatch,
        phase: Phase,
        dt: f32,
        profile: &ModeProfile,
    ) {
        match phase {
            Phase::IconFocused => {
                if let Some(icon) = patch.icon {
                    if profile.modulate_icon_opacity {
                        registry.apply_opacity(icon, 1.0);
                    }
                    registry.apply_visibility(icon, false);
                }
                if let Some(target) = patch.target {
                    grow_toward_goal(registry, patch, target, dt);
                }
            }
            Phase::TargetFocused => {
                if let Some(target) = patch.target {
                    grow_toward_goal(registry, patch, target, dt);
                }
            }
            Phase::Retracting => {
                let Some(target) = patch.target else { return };
                let Some(el) = registry.element(target) else { return };
                if !el.active {
                    return;
                }
                let goal = registry.restore_goal(target).unwrap_or(el.footprint);
                let step = RETRACT_STEP_FACTOR * patch.lerp_speed * dt;
                let next = el.footprint.move_towards(goal, step);
                registry.apply_footprint(target, next);
            }
            Phase::Shrinking => {
                let Some(target) = patch.target else { return };
                let Some(el) = registry.element(target) else { return };
                let step = SHRINK_STEP_FACTOR * patch.lerp_speed * dt;
                let next = el.footprint.move_towards(patch.size_out, step);
                if next.distance(patch.size_out) < SNAP_EPSILON {
                    registry.apply_footprint(target, patch.size_out);
                    registry.apply_visibility(target, false);
                    if let Some(icon) = patch.icon {
                        registry.apply_visibility(icon, true);
                        if profile.modulate_icon_opacity {
                            registry.apply_opacity(icon, DIMMED_ICON_OPACITY);
                        }
                    }
                    debug!("Target {} hidden", registry.name(target));
                } else {
                    registry.apply_footprint(target, next);
                }
            }
            Phase::Idle => {
                if let Some(icon) = patch.icon {
                    if !registry.is_active(icon) {
                        registry.apply_visibility(icon, true);
                        if profile.modulate_icon_opacity {
                            registry.apply_opacity(icon, DIMMED_ICON_OPACITY);
                        }
                    }
                }
                if let Some(target) = patch.target {
                    registry.apply_visibility(target, false);
                    registry.apply_footprint(target, patch.size_out);
                }
            }
        }
    }

    fn apply_opacity(&mut self, registry: &mut ElementRegistry, patch: &UiPatch, phase: Phase) {
        self.apply_shown(registry, patch);
        let Some(target) = patch.target else { return };
        let Some(el) = registry.element(target) else { return };

        if phase.is_engaged() {
            let opacity = registry.baseline(target).map(|b| b.opacity).unwrap_or(1.0);
            registry.apply_opacity(target, opacity);
            registry.apply_nested_opacity(target, 1.0);
        } else {
            let own = if el.nested_opacity.is_empty() {
                FAINT_OPACITY
            } else {
                HIDDEN_OPACITY
            };
            registry.apply_opacity(target, own);
            registry.apply_nested_opacity(target, FAINT_OPACITY);
        }
    }

    fn apply_scale(&mut self, registry: &mut ElementRegistry, patch: &UiPatch, phase: Phase) {
        self.apply_shown(registry, patch);
        let Some(target) = patch.target else { return };
        let Some(el) = registry.element(target) else { return };

        let next = if phase.is_engaged() {
            el.scale.lerp(Vec3::ONE, SCALE_FOCUS_BLEND)
        } else {
            el.scale.lerp(SCALE_REDUCED, SCALE_REDUCE_BLEND)
        };
        registry.apply_scale(target, next);
    }

    /// Non-footprint modes: target shown at its restore goal, icon hidden.
    fn apply_shown(&mut self, registry: &mut ElementRegistry, patch: &UiPatch) {
        if let Some(icon) = patch.icon {
            registry.apply_visibility(icon, false);
        }
        if let Some(target) = patch.target {
            if let Some(goal) = registry.restore_goal(target) {
                registry.apply_footprint(target, goal);
            }
            registry.apply_visibility(target, true);
        }
    }
}

/// Show `target` (starting from `size_out` if it was hidden) and move it a
/// proportional step toward its restore goal. Opacity and scale left over
/// from another mode are reset to the baseline.
fn grow_toward_goal(registry: &mut ElementRegistry, patch: &UiPatch, target: ElementId, dt: f32) {
    if !registry.is_active(target) {
        registry.apply_footprint(target, patch.size_out);
        registry.apply_visibility(target, true);
        debug!("Target {} shown", registry.name(target));
    }
    let opacity = registry.baseline(target).map(|b| b.opacity).unwrap_or(1.0);
    registry.apply_opacity(target, opacity);
    registry.apply_nested_opacity(target, 1.0);
    registry.apply_scale(target, Vec3::ONE);
    let Some(el) = registry.element(target) else { return };
    let goal = registry.restore_goal(target).unwrap_or(el.footprint);
    let next = el
        .footprint
        .lerp(goal, approach_fraction(patch.lerp_speed, dt));
    registry.apply_footprint(target, next);
}

// ── Tests ───────────────────────────────────────────────────
