//! Heart Catch - a collect-the-heart greeting mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (actor physics, hit testing, particles,
//!   game phases, letter reveal)
//! - `driver`: Fixed-timestep frame driver between a host and the simulation
//! - `platform`: Narrow host interfaces (drawing surface, HUD sink)
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Page-embedded game configuration

pub mod driver;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::Driver;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Ticks per simulated second
    pub const TICKS_PER_SEC: f32 = 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Actor size as a fraction of viewport width, clamped to [min, max] px
    pub const ACTOR_WIDTH_FRACTION: f32 = 0.14;
    pub const ACTOR_MIN_WIDTH: f32 = 56.0;
    pub const ACTOR_MAX_WIDTH: f32 = 110.0;
    /// Height relative to width (heart sprite is slightly squat)
    pub const ACTOR_ASPECT: f32 = 0.9;

    /// Chance that a spawn starts in the edge band instead of the interior
    pub const EDGE_SPAWN_CHANCE: f64 = 0.6;
    /// Edge band depth as a fraction of the free span on that axis
    pub const EDGE_BAND_FRACTION: f32 = 0.15;

    /// Actor speed in px/tick at difficulty 0, plus per-level increment
    pub const ACTOR_BASE_SPEED: f32 = 2.4;
    pub const ACTOR_SPEED_PER_LEVEL: f32 = 0.35;
    pub const ACTOR_MAX_SPEED: f32 = 7.5;
    /// Speed floor so damping never parks the actor
    pub const ACTOR_MIN_SPEED: f32 = 1.2;
    /// Uniform per-tick velocity damping
    pub const ACTOR_DAMPING: f32 = 0.9995;
    /// Orientation blend toward heading, per tick
    pub const ORIENTATION_BLEND: f32 = 0.12;
    /// Spin bias magnitude range (rad/tick)
    pub const SPIN_MIN: f32 = 0.002;
    pub const SPIN_MAX: f32 = 0.012;

    /// Orbit ring rotation per tick (0.35 degrees)
    pub const ORBIT_STEP_DEG: f32 = 0.35;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert a duration in seconds to a whole number of ticks (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    ((secs * consts::TICKS_PER_SEC).ceil() as u64).max(1)
}
