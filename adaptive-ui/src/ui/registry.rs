//! Element registry: managed UI patches and their restoration baselines.
//!
//! The registry is the single owner of element visual parameters. It
//! exposes plain setters; every show/hide decision lives in
//! `visibility`. Baselines are captured once, before the first hide, and
//! are never overwritten afterwards.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::geometry::{Vec2, Vec3};
use super::Mode;
use crate::error::{AdaptiveUiError, Result};

/// Icon opacity when shown but not emphasized.
pub const DIMMED_ICON_OPACITY: f32 = 0.3;

// ── Identity ────────────────────────────────────────────────

/// Stable arena index of an element inside one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

// ── Element ─────────────────────────────────────────────────

/// Author-supplied description of an element before registration.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub name: String,
    /// Screen-space center in pixels.
    pub center: Vec2,
    /// Natural footprint (width, height) in pixels.
    pub size: Vec2,
    pub opacity: f32,
    /// Number of nested visuals (child images/text) faded in Transparent mode.
    pub nested: usize,
}

impl ElementSpec {
    pub fn new(name: impl Into<String>, center: Vec2, size: Vec2) -> Self {
        Self {
            name: name.into(),
            center,
            size,
            opacity: 1.0,
            nested: 0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_nested(mut self, nested: usize) -> Self {
        self.nested = nested;
        self
    }
}

/// Current visual parameters of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub center: Vec2,
    pub footprint: Vec2,
    pub opacity: f32,
    pub nested_opacity: Vec<f32>,
    pub scale: Vec3,
    pub active: bool,
}

impl Element {
    /// Whether `point` lies inside the element's scaled footprint.
    pub fn contains(&self, point: Vec2) -> bool {
        let half_w = self.footprint.x * self.scale.x * 0.5;
        let half_h = self.footprint.y * self.scale.y * 0.5;
        (point.x - self.center.x).abs() <= half_w && (point.y - self.center.y).abs() <= half_h
    }
}

/// Footprint and opacity captured at initialization; the restore goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBaseline {
    pub footprint: Vec2,
    pub opacity: f32,
}

// ── UiPatch ─────────────────────────────────────────────────

/// One managed (target, optional icon) pair plus its configuration.
#[derive(Debug, Clone, Copy)]
pub struct UiPatch {
    pub target: Option<ElementId>,
    pub icon: Option<ElementId>,
    /// Footprint of the target while hidden.
    pub size_out: Vec2,
    /// Grace period (seconds) after focus loss before shrinking starts.
    pub stay_time: f32,
    /// Growth rate of the proportional approach.
    pub lerp_speed: f32,
    /// Normalized screen distance within which the icon is emphasized.
    pub emphasis_radius: f32,
}

impl UiPatch {
    pub fn new(target: Option<ElementId>, icon: Option<ElementId>) -> Self {
        Self {
            target,
            icon,
            size_out: Vec2::ZERO,
            stay_time: 0.5,
            lerp_speed: 20.0,
            emphasis_radius: 0.2,
        }
    }
}

// ── Registry ────────────────────────────────────────────────

/// Owner of all elements, patches and captured baselines.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    elements: Vec<Element>,
    names: HashMap<String, ElementId>,
    baselines: HashMap<ElementId, ElementBaseline>,
    patches: Vec<UiPatch>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element. Names must be unique.
    pub fn add_element(&mut self, spec: ElementSpec) -> Result<ElementId> {
        if self.names.contains_key(&spec.name) {
            return Err(AdaptiveUiError::DuplicateElement(spec.name));
        }
        let id = ElementId(self.elements.len() as u32);
        self.names.insert(spec.name.clone(), id);
        self.elements.push(Element {
            name: spec.name,
            center: spec.center,
            footprint: spec.size,
            opacity: spec.opacity,
            nested_opacity: vec![1.0; spec.nested],
            scale: Vec3::ONE,
            active: true,
        });
        Ok(id)
    }

    /// Register a patch. A target may belong to at most one patch, and the
    /// hidden footprint must lie between zero and the target's size.
    pub fn add_patch(&mut self, patch: UiPatch) -> Result<usize> {
        for id in patch.target.iter().chain(patch.icon.iter()) {
            if self.element(*id).is_none() {
                return Err(AdaptiveUiError::UnknownElement(format!("#{}", id.0)));
            }
        }
        if let Some(target) = patch.target {
            if self.patches.iter().any(|p| p.target == Some(target)) {
                return Err(AdaptiveUiError::SharedTarget(self.name(target).to_string()));
            }
        }
        if !patch.size_out.is_finite() || patch.size_out.x < 0.0 || patch.size_out.y < 0.0 {
            return Err(AdaptiveUiError::InvalidConfig(format!(
                "size_out must be non-negative, got ({}, {})",
                patch.size_out.x, patch.size_out.y
            )));
        }
        if let Some(goal) = patch.target.and_then(|t| self.restore_goal(t)) {
            if patch.size_out.x > goal.x || patch.size_out.y > goal.y {
                return Err(AdaptiveUiError::InvalidConfig(format!(
                    "size_out ({}, {}) exceeds the size of {}",
                    patch.size_out.x,
                    patch.size_out.y,
                    patch.target.map(|t| self.name(t)).unwrap_or_default()
                )));
            }
        }
        if !(patch.stay_time >= 0.0 && patch.lerp_speed >= 0.0 && patch.emphasis_radius >= 0.0) {
            return Err(AdaptiveUiError::InvalidConfig(
                "stay_time, lerp_speed and emphasis_radius must be non-negative".to_string(),
            ));
        }
        self.patches.push(patch);
        Ok(self.patches.len() - 1)
    }

    /// Capture baselines for every patch element, then apply the initial
    /// state for `mode`. Baselines already captured are left untouched.
    pub fn initialize(&mut self, mode: Mode) {
        let ids: Vec<ElementId> = self
            .patches
            .iter()
            .flat_map(|p| p.target.into_iter().chain(p.icon))
            .collect();
        for id in ids {
            if self.baselines.contains_key(&id) {
                continue;
            }
            let el = &self.elements[id.0 as usize];
            self.baselines.insert(
                id,
                ElementBaseline {
                    footprint: el.footprint,
                    opacity: el.opacity,
                },
            );
        }

        for i in 0..self.patches.len() {
            let patch = self.patches[i];
            if let Some(target) = patch.target {
                if mode.drives_footprint() {
                    self.apply_footprint(target, patch.size_out);
                    self.apply_visibility(target, false);
                } else {
                    self.apply_visibility(target, true);
                }
            }
            if let Some(icon) = patch.icon {
                if mode.uses_icon() {
                    self.apply_visibility(icon, true);
                    self.apply_opacity(icon, DIMMED_ICON_OPACITY);
                } else {
                    self.apply_visibility(icon, false);
                }
            }
        }
        debug!(
            "Registry initialized for mode {}: {} element(s), {} patch(es)",
            mode,
            self.elements.len(),
            self.patches.len()
        );
    }

    // ── Lookups ─────────────────────────────────────────────

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0 as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    pub fn name(&self, id: ElementId) -> &str {
        self.element(id).map(|e| e.name.as_str()).unwrap_or("")
    }

    pub fn is_active(&self, id: ElementId) -> bool {
        self.element(id).is_some_and(|e| e.active)
    }

    pub fn baseline(&self, id: ElementId) -> Option<ElementBaseline> {
        self.baselines.get(&id).copied()
    }

    /// Footprint an expanded element interpolates toward. Falls back to the
    /// current footprint for elements that were never captured.
    pub fn restore_goal(&self, id: ElementId) -> Option<Vec2> {
        self.baseline(id)
            .map(|b| b.footprint)
            .or_else(|| self.element(id).map(|e| e.footprint))
    }

    pub fn patches(&self) -> &[UiPatch] {
        &self.patches
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, e)| (ElementId(i as u32), e))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Every element referenced by some patch.
    pub fn managed(&self) -> HashSet<ElementId> {
        self.patches
            .iter()
            .flat_map(|p| p.target.into_iter().chain(p.icon))
            .collect()
    }

    // ── Setters ─────────────────────────────────────────────

    pub fn apply_footprint(&mut self, id: ElementId, footprint: Vec2) {
        if let Some(el) = self.elements.get_mut(id.0 as usize) {
            el.footprint = Vec2::new(footprint.x.max(0.0), footprint.y.max(0.0));
        }
    }

    pub fn apply_opacity(&mut self, id: ElementId, opacity: f32) {
        if let Some(el) = self.elements.get_mut(id.0 as usize) {
            el.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Set the opacity of every nested visual of `id`.
    pub fn apply_nested_opacity(&mut self, id: ElementId, opacity: f32) {
        if let Some(el) = self.elements.get_mut(id.0 as usize) {
            for o in &mut el.nested_opacity {
                *o = opacity.clamp(0.0, 1.0);
            }
        }
    }

    pub fn apply_visibility(&mut self, id: ElementId, active: bool) {
        if let Some(el) = self.elements.get_mut(id.0 as usize) {
            el.active = active;
        }
    }

    pub fn apply_scale(&mut self, id: ElementId, scale: Vec3) {
        if let Some(el) = self.elements.get_mut(id.0 as usize) {
            el.scale = scale;
        }
    }
}

// ── Tests ───────────────────────────────────────────────────
