//! The collectible heart: spawn placement and DVD-style bounce physics
//!
//! Positions are viewport pixels (origin top-left, y down). Velocities are
//! pixels per tick.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{SimRng, sample};
use crate::consts::*;
use crate::normalize_angle;

/// Current viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Point lies on the page (edges inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Axis-aligned screen rectangle (e.g. the portrait's on-screen bounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }
}

/// The single on-screen collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Sprite width/height
    pub size: Vec2,
    /// Drawn rotation (radians), lags behind the heading
    pub orientation: f32,
    /// Small signed rotation nudge, flipped on every bounce
    pub spin: f32,
    pub alive: bool,
}

impl Default for Actor {
    /// A parked, already-collected actor. Used before the first spawn.
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: Vec2::new(ACTOR_MIN_WIDTH, ACTOR_MIN_WIDTH * ACTOR_ASPECT),
            orientation: 0.0,
            spin: 0.0,
            alive: false,
        }
    }
}

impl Actor {
    /// Sprite size for a viewport; recomputed on every spawn
    pub fn size_for(viewport: Viewport) -> Vec2 {
        let w = (viewport.width * ACTOR_WIDTH_FRACTION).clamp(ACTOR_MIN_WIDTH, ACTOR_MAX_WIDTH);
        Vec2::new(w, w * ACTOR_ASPECT)
    }

    pub fn half_size(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Range the actor's center may occupy: `[w/2, W-w/2] x [h/2, H-h/2]`
    pub fn center_bounds(&self, viewport: Viewport) -> (Vec2, Vec2) {
        center_bounds(self.size, viewport)
    }

    /// Whether the center is inside the allowed range (with float slack)
    pub fn is_in_bounds(&self, viewport: Viewport) -> bool {
        let (min, max) = self.center_bounds(viewport);
        let eps = 1e-3;
        self.pos.x >= min.x - eps
            && self.pos.x <= max.x + eps
            && self.pos.y >= min.y - eps
            && self.pos.y <= max.y + eps
    }

    /// Pull the actor back inside after a viewport change
    pub fn clamp_to(&mut self, viewport: Viewport) {
        let (min, max) = self.center_bounds(viewport);
        self.pos = self.pos.clamp(min, max);
    }
}

fn center_bounds(size: Vec2, viewport: Viewport) -> (Vec2, Vec2) {
    let min = size * 0.5;
    // Viewport narrower than the sprite: pin to the half-extent
    let max = (viewport.size() - size * 0.5).max(min);
    (min, max)
}

/// Initial speed for a difficulty level (collected count so far)
pub fn speed_for_level(level: u32) -> f32 {
    (ACTOR_BASE_SPEED + level as f32 * ACTOR_SPEED_PER_LEVEL).min(ACTOR_MAX_SPEED)
}

/// Create a fresh actor pose.
///
/// Placement favours the screen edges (60% of spawns land in an edge band),
/// then gets a single horizontal nudge away from the protected zone if it
/// landed within the protection radius. The nudge is not re-checked, so the
/// actor can still end up near the zone after clamping.
pub fn spawn(
    viewport: Viewport,
    protected: Option<Rect>,
    level: u32,
    rng: &mut SimRng,
) -> Actor {
    let size = Actor::size_for(viewport);
    let (min, max) = center_bounds(size, viewport);
    let span = max - min;

    let mut pos = if rng.random_bool(EDGE_SPAWN_CHANCE) {
        let band = span * EDGE_BAND_FRACTION;
        let along_x = sample(rng, (min.x, max.x));
        let along_y = sample(rng, (min.y, max.y));
        match rng.random_range(0..4u32) {
            0 => Vec2::new(sample(rng, (min.x, min.x + band.x)), along_y),
            1 => Vec2::new(sample(rng, (max.x - band.x, max.x)), along_y),
            2 => Vec2::new(along_x, sample(rng, (min.y, min.y + band.y))),
            _ => Vec2::new(along_x, sample(rng, (max.y - band.y, max.y))),
        }
    } else {
        Vec2::new(sample(rng, (min.x, max.x)), sample(rng, (min.y, max.y)))
    };

    if let Some(zone) = protected {
        let center = zone.center();
        let radius = zone.half_extents().max_element() + size.x;
        if pos.distance(center) < radius {
            let side = if pos.x < center.x { -1.0 } else { 1.0 };
            pos.x = (center.x + side * radius).clamp(min.x, max.x);
            log::debug!("Spawn nudged off protected zone to x={:.1}", pos.x);
        }
    }

    // Keep both components meaningful: heading between 22.5° and 67.5° off-axis
    let speed = speed_for_level(level);
    let angle = sample(rng, (0.125 * std::f32::consts::PI, 0.375 * std::f32::consts::PI));
    let sign_x = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let sign_y = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let vel = Vec2::new(angle.cos() * sign_x, angle.sin() * sign_y) * speed;

    let spin_sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let spin = sample(rng, (SPIN_MIN, SPIN_MAX)) * spin_sign;

    Actor {
        pos,
        vel,
        size,
        orientation: vel.y.atan2(vel.x),
        spin,
        alive: true,
    }
}

/// Advance the actor by one tick.
///
/// Each axis bounces independently: clamp to the boundary, flip that velocity
/// component and the spin. Damping applies to both components afterwards.
pub fn step(actor: &mut Actor, viewport: Viewport) {
    if !actor.alive {
        return;
    }

    actor.pos += actor.vel;
    let (min, max) = actor.center_bounds(viewport);

    if actor.pos.x < min.x {
        actor.pos.x = min.x;
        actor.vel.x = actor.vel.x.abs();
        actor.spin = -actor.spin;
    } else if actor.pos.x > max.x {
        actor.pos.x = max.x;
        actor.vel.x = -actor.vel.x.abs();
        actor.spin = -actor.spin;
    }

    if actor.pos.y < min.y {
        actor.pos.y = min.y;
        actor.vel.y = actor.vel.y.abs();
        actor.spin = -actor.spin;
    } else if actor.pos.y > max.y {
        actor.pos.y = max.y;
        actor.vel.y = -actor.vel.y.abs();
        actor.spin = -actor.spin;
    }

    actor.vel *= ACTOR_DAMPING;
    let speed = actor.vel.length();
    if speed > 0.0 && speed < ACTOR_MIN_SPEED {
        actor.vel *= ACTOR_MIN_SPEED / speed;
    }

    // Lazy banking toward the heading instead of snapping
    let heading = actor.vel.y.atan2(actor.vel.x);
    let delta = normalize_angle(heading - actor.orientation);
    actor.orientation = normalize_angle(actor.orientation + delta * ORIENTATION_BLEND + actor.spin);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> SimRng {
        SimRng::seed_from_u64(seed)
    }

    fn moving(pos: Vec2, vel: Vec2) -> Actor {
        Actor {
            pos,
            vel,
            size: Vec2::new(60.0, 54.0),
            orientation: vel.y.atan2(vel.x),
            spin: 0.005,
            alive: true,
        }
    }

    #[test]
    fn test_size_scales_with_viewport() {
        let small = Actor::size_for(Viewport::new(320.0, 640.0));
        let large = Actor::size_for(Viewport::new(1920.0, 1080.0));
        assert_eq!(small.x, ACTOR_MIN_WIDTH);
        assert_eq!(large.x, ACTOR_MAX_WIDTH);
        assert!((large.y - ACTOR_MAX_WIDTH * ACTOR_ASPECT).abs() < 1e-4);
    }

    #[test]
    fn test_bounce_on_x_only() {
        let vp = Viewport::new(800.0, 600.0);
        // Right edge limit is 800 - 30 = 770
        let mut actor = moving(Vec2::new(767.0, 300.0), Vec2::new(5.0, 2.0));
        let spin_before = actor.spin;
        step(&mut actor, vp);

        assert_eq!(actor.pos.x, 770.0);
        assert!((actor.pos.y - 302.0).abs() < 1e-4);
        assert!((actor.vel.x - (-5.0 * ACTOR_DAMPING)).abs() < 1e-5);
        assert!((actor.vel.y - 2.0 * ACTOR_DAMPING).abs() < 1e-5);
        assert_eq!(actor.spin, -spin_before);
    }

    #[test]
    fn test_bounce_in_corner_flips_both() {
        let vp = Viewport::new(800.0, 600.0);
        let mut actor = moving(Vec2::new(32.0, 28.0), Vec2::new(-4.0, -4.0));
        step(&mut actor, vp);

        assert_eq!(actor.pos, Vec2::new(30.0, 27.0));
        assert!(actor.vel.x > 0.0 && actor.vel.y > 0.0);
    }

    #[test]
    fn test_no_bounce_inside() {
        let vp = Viewport::new(800.0, 600.0);
        let mut actor = moving(Vec2::new(400.0, 300.0), Vec2::new(3.0, -2.0));
        let spin_before = actor.spin;
        step(&mut actor, vp);

        assert_eq!(actor.pos, Vec2::new(403.0, 298.0));
        assert!(actor.vel.x > 0.0 && actor.vel.y < 0.0);
        assert_eq!(actor.spin, spin_before);
    }

    #[test]
    fn test_orientation_banks_gradually() {
        let vp = Viewport::new(800.0, 600.0);
        let mut actor = moving(Vec2::new(400.0, 300.0), Vec2::new(0.0, 4.0));
        actor.orientation = 0.0;
        actor.spin = 0.0;
        step(&mut actor, vp);

        let heading = std::f32::consts::FRAC_PI_2;
        // One blend step covers ~12% of the gap, not all of it
        assert!((actor.orientation - heading * ORIENTATION_BLEND).abs() < 1e-3);
    }

    #[test]
    fn test_dead_actor_does_not_move() {
        let vp = Viewport::new(800.0, 600.0);
        let mut actor = moving(Vec2::new(400.0, 300.0), Vec2::new(3.0, 3.0));
        actor.alive = false;
        step(&mut actor, vp);
        assert_eq!(actor.pos, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_spawn_in_bounds_and_speed_scales() {
        let vp = Viewport::new(1024.0, 768.0);
        let mut r = rng(7);
        for level in 0..10 {
            let actor = spawn(vp, None, level, &mut r);
            assert!(actor.alive);
            assert!(actor.is_in_bounds(vp));
            assert!((actor.vel.length() - speed_for_level(level)).abs() < 1e-3);
            assert!(actor.vel.x != 0.0 && actor.vel.y != 0.0);
        }
        assert!(speed_for_level(9) > speed_for_level(0));
        assert_eq!(speed_for_level(1000), ACTOR_MAX_SPEED);
    }

    #[test]
    fn test_spawn_prefers_edges() {
        let vp = Viewport::new(1000.0, 1000.0);
        let mut r = rng(99);
        let n = 2000;
        let near_edge = (0..n)
            .map(|_| spawn(vp, None, 0, &mut r))
            .filter(|a| {
                let (min, max) = a.center_bounds(vp);
                let band = (max - min) * EDGE_BAND_FRACTION;
                a.pos.x <= min.x + band.x
                    || a.pos.x >= max.x - band.x
                    || a.pos.y <= min.y + band.y
                    || a.pos.y >= max.y - band.y
            })
            .count();
        // 60% edge spawns plus interior points that happen to fall in a band
        assert!(near_edge as f32 / n as f32 > 0.6);
    }

    #[test]
    fn test_spawn_nudges_off_protected_zone() {
        let vp = Viewport::new(1200.0, 800.0);
        // A small zone in the middle; the nudge lands outside its radius
        let zone = Rect::from_xywh(560.0, 360.0, 80.0, 80.0);
        let mut r = rng(3);
        for _ in 0..500 {
            let actor = spawn(vp, Some(zone), 0, &mut r);
            let radius = zone.half_extents().max_element() + actor.size.x;
            assert!(actor.pos.distance(zone.center()) >= radius - 1e-3);
            assert!(actor.is_in_bounds(vp));
        }
    }

    #[test]
    fn test_clamp_after_resize() {
        let mut actor = moving(Vec2::new(700.0, 500.0), Vec2::new(3.0, 3.0));
        let vp = Viewport::new(400.0, 300.0);
        actor.clamp_to(vp);
        assert!(actor.is_in_bounds(vp));
        assert_eq!(actor.pos, Vec2::new(370.0, 273.0));
    }

    #[test]
    fn test_tiny_viewport_pins_center() {
        let vp = Viewport::new(20.0, 20.0);
        let mut actor = moving(Vec2::new(30.0, 27.0), Vec2::new(4.0, 4.0));
        for _ in 0..50 {
            step(&mut actor, vp);
            assert!(actor.is_in_bounds(vp));
        }
    }
}
