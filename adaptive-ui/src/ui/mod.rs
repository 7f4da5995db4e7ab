//! Attention-reactive UI: element model, per-frame visibility state machine.
//!
//! Engine-agnostic. Elements are addressed by `ElementId` (arena index)
//! and only hold the visual parameters the state machine drives; the host
//! renderer reads them back after every frame.

pub mod geometry;
pub mod registry;
pub mod visibility;

// ── Mode ────────────────────────────────────────────────────

/// Process-wide display mode: which visual channel encodes focus state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// No hiding; every target stays fully shown.
    None,
    /// Footprint on the target plus distance-modulated icon opacity.
    #[default]
    Mixed,
    /// Target and nested visuals fade instead of resizing.
    Transparent,
    /// Footprint on the target, icon shown/hidden without opacity changes.
    Icon,
    /// Uniform scale on the target.
    Scale,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Self::None,
        Self::Mixed,
        Self::Transparent,
        Self::Icon,
        Self::Scale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mixed => "mixed",
            Self::Transparent => "transparent",
            Self::Icon => "icon",
            Self::Scale => "scale",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "mixed" => Some(Self::Mixed),
            "transparent" => Some(Self::Transparent),
            "icon" => Some(Self::Icon),
            "scale" => Some(Self::Scale),
            _ => Option::None,
        }
    }

    /// Whether the icon substitute participates in this mode.
    pub fn uses_icon(&self) -> bool {
        matches!(self, Self::Mixed | Self::Icon)
    }

    /// Whether this mode hides targets by shrinking their footprint.
    pub fn drives_footprint(&self) -> bool {
        matches!(self, Self::Mixed | Self::Icon)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_roundtrip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(Mode::from_str("Mixed"), Some(Mode::Mixed));
        assert_eq!(Mode::from_str("invalid"), None);
    }

    #[test]
    fn test_icon_modes() {
        assert!(Mode::Mixed.uses_icon());
        assert!(Mode::Icon.uses_icon());
        assert!(!Mode::Transparent.uses_icon());
        assert!(!Mode::Scale.uses_icon());
        assert!(!Mode::None.uses_icon());
    }
}
