//! Finale message laid out word by word on a slowly turning, flattened ring

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::Viewport;
use crate::consts::ORBIT_STEP_DEG;
use crate::polar_to_cartesian;

/// Ring radius is this fraction of the (capped) viewport width
const RADIUS_FRACTION: f32 = 0.32;
const RADIUS_WIDTH_CAP: f32 = 480.0;
/// Vertical squash that turns the circle into a tilted-looking ellipse
const FLATTEN: f32 = 0.18;

/// One word's placement relative to the ring center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitWord {
    pub text: String,
    pub offset: Vec2,
    /// Word rotation in radians (tangent to the ring)
    pub rotation: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitText {
    words: Vec<OrbitWord>,
    /// Whole-ring rotation in radians, wraps at 2π
    ring_angle: f32,
    /// Bumped whenever word offsets change
    revision: u32,
}

impl OrbitText {
    /// Split `message` on whitespace and spread the words evenly around the
    /// ring, starting at the top.
    pub fn layout(message: &str, viewport: Viewport) -> Self {
        let mut orbit = Self {
            words: Vec::new(),
            ring_angle: 0.0,
            revision: 0,
        };
        orbit.words = Self::place(message.split_whitespace(), viewport);
        orbit
    }

    fn place<'a>(parts: impl Iterator<Item = &'a str>, viewport: Viewport) -> Vec<OrbitWord> {
        let parts: Vec<&str> = parts.collect();
        let radius = viewport.width.min(RADIUS_WIDTH_CAP) * RADIUS_FRACTION;
        let total = parts.len() as f32;

        parts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let angle = (i as f32 / total) * TAU - FRAC_PI_2;
                let p = polar_to_cartesian(radius, angle);
                OrbitWord {
                    text: text.to_string(),
                    offset: Vec2::new(p.x, p.y * FLATTEN),
                    rotation: angle + FRAC_PI_2,
                }
            })
            .collect()
    }

    /// Recompute offsets for a new viewport, keeping the ring's rotation
    pub fn relayout(&mut self, viewport: Viewport) {
        let texts: Vec<String> = self.words.iter().map(|w| w.text.clone()).collect();
        self.words = Self::place(texts.iter().map(String::as_str), viewport);
        self.revision = self.revision.wrapping_add(1);
    }

    /// Turn the ring by one tick's worth
    pub fn advance(&mut self) {
        self.ring_angle = (self.ring_angle + ORBIT_STEP_DEG.to_radians()) % TAU;
    }

    pub fn words(&self) -> &[OrbitWord] {
        &self.words
    }

    pub fn ring_angle(&self) -> f32 {
        self.ring_angle
    }

    /// Changes when the words move; hosts that cache word elements rebuild on change
    pub fn revision(&self) -> u32 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_word_sits_on_top() {
        let orbit = OrbitText::layout("con yêu mẹ", Viewport::new(1000.0, 800.0));
        assert_eq!(orbit.words().len(), 3);

        let first = &orbit.words()[0];
        assert_eq!(first.text, "con");
        // radius = 480 * 0.32, flattened vertically
        assert!(first.offset.x.abs() < 1e-3);
        assert!((first.offset.y - (-153.6 * FLATTEN)).abs() < 1e-3);
        assert!(first.rotation.abs() < 1e-6);
    }

    #[test]
    fn test_small_viewport_shrinks_ring() {
        let orbit = OrbitText::layout("a b", Viewport::new(300.0, 600.0));
        // Second of two words sits at the bottom of the ring
        let second = &orbit.words()[1];
        assert!((second.offset.y - 96.0 * FLATTEN).abs() < 1e-3);
    }

    #[test]
    fn test_ring_wraps_after_full_turn() {
        let mut orbit = OrbitText::layout("x", Viewport::default());
        // 360 / 0.35 ≈ 1028.6 ticks per turn
        for _ in 0..1029 {
            orbit.advance();
        }
        assert!(orbit.ring_angle() < 0.01);
    }

    #[test]
    fn test_relayout_keeps_words() {
        let mut orbit = OrbitText::layout("one two three four", Viewport::new(1000.0, 800.0));
        orbit.advance();
        let angle = orbit.ring_angle();
        orbit.relayout(Viewport::new(400.0, 800.0));
        assert_eq!(orbit.words().len(), 4);
        assert_eq!(orbit.words()[3].text, "four");
        assert_eq!(orbit.ring_angle(), angle);
        assert!((orbit.words()[1].offset.x - 128.0).abs() < 1e-3);
    }

    #[test]
    fn test_relayout_bumps_revision_turning_does_not() {
        let mut orbit = OrbitText::layout("one two", Viewport::new(1000.0, 800.0));
        assert_eq!(orbit.revision(), 0);
        orbit.advance();
        assert_eq!(orbit.revision(), 0);
        orbit.relayout(Viewport::new(400.0, 800.0));
        assert_eq!(orbit.revision(), 1);
    }

    #[test]
    fn test_blank_message_has_no_words() {
        let orbit = OrbitText::layout("   ", Viewport::default());
        assert!(orbit.words().is_empty());
    }
}
