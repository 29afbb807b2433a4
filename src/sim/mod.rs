//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Deferred work goes through the scheduler, never wall-clock timers
//! - No rendering or platform dependencies

pub mod actor;
pub mod collision;
pub mod letter;
pub mod orbit;
pub mod particles;
pub mod schedule;
pub mod state;
pub mod tick;

pub use actor::{Actor, Rect, Viewport, spawn, step};
pub use collision::{hits, to_local};
pub use letter::{LetterSequencer, RevealMode, RevealTiming};
pub use orbit::{OrbitText, OrbitWord};
pub use particles::{CullBound, Particle, ParticleKind, ParticleProfile, ParticleSystem};
pub use schedule::{DeferredEvent, Scheduled, Scheduler};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};

use rand::Rng;

/// Simulation RNG (seeded per session)
pub type SimRng = rand_pcg::Pcg32;

/// Uniform sample in `[lo, hi)`; collapses to `lo` for an empty range
pub(crate) fn sample(rng: &mut SimRng, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}
