//! Hit testing: which elements lie under a screen position.
//!
//! The engine treats hit testing as an external collaborator: any
//! `HitTestProvider` may be plugged into a session. `BoundsHitTester`
//! tests against the registry's current (scaled) footprints and is what
//! the headless runner uses. Closures `FnMut(Vec2) -> HitSet` also
//! implement the trait, which keeps tests terse.

use std::collections::HashSet;

use crate::ui::geometry::Vec2;
use crate::ui::registry::{ElementId, ElementRegistry};

/// Unordered set of elements under the pointer this frame.
pub type HitSet = HashSet<ElementId>;

/// Source of hit sets for a screen position.
pub trait HitTestProvider {
    fn hit_test(&mut self, position: Vec2, registry: &ElementRegistry) -> HitSet;
}

impl<F> HitTestProvider for F
where
    F: FnMut(Vec2) -> HitSet,
{
    fn hit_test(&mut self, position: Vec2, _registry: &ElementRegistry) -> HitSet {
        self(position)
    }
}

/// Rectangle test against every active element's visible bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsHitTester {
    /// Skip elements whose opacity is at or below this value.
    pub min_opacity: f32,
}

impl BoundsHitTester {
    pub fn new() -> Self {
        Self { min_opacity: 0.0 }
    }
}

impl HitTestProvider for BoundsHitTester {
    fn hit_test(&mut self, position: Vec2, registry: &ElementRegistry) -> HitSet {
        registry
            .elements()
            .filter(|(_, el)| el.active && el.contains(position))
            .filter(|(_, el)| self.min_opacity <= 0.0 || el.opacity > self.min_opacity)
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::registry::ElementSpec;

    #[test]
    fn test_bounds_hit_skips_inactive() {
        let mut reg = ElementRegistry::new();
        let a = reg
            .add_element(ElementSpec::new("a", Vec2::new(50.0, 50.0), Vec2::new(100.0, 100.0)))
            .unwrap();
        let b = reg
            .add_element(ElementSpec::new("b", Vec2::new(60.0, 60.0), Vec2::new(40.0, 40.0)))
            .unwrap();

        let mut tester = BoundsHitTester::new();
        let hits = tester.hit_test(Vec2::new(60.0, 60.0), &reg);
        assert!(hits.contains(&a) && hits.contains(&b));

        reg.apply_visibility(b, false);
        let hits = tester.hit_test(Vec2::new(60.0, 60.0), &reg);
        assert_eq!(hits.len(), 1);
        assert!(hits.contains(&a));
    }

    #[test]
    fn test_empty_result_outside_everything() {
        let mut reg = ElementRegistry::new();
        reg.add_element(ElementSpec::new("a", Vec2::new(50.0, 50.0), Vec2::new(10.0, 10.0)))
            .unwrap();
        let hits = BoundsHitTester::new().hit_test(Vec2::new(500.0, 500.0), &reg);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_closure_provider() {
        let reg = ElementRegistry::new();
        let mut provider = |_pos: Vec2| -> HitSet { [ElementId(3)].into_iter().collect() };
        let hits = provider.hit_test(Vec2::ZERO, &reg);
        assert!(hits.contains(&ElementId(3)));
    }
}
