//! Short-lived 2D particles
//!
//! One particle type serves three effects (collection burst, ambient
//! confetti, finale hearts); they differ only by spawn profile.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::Viewport;
use super::{SimRng, sample};

/// Extra distance past the screen edge before a particle is culled
pub const CULL_MARGIN: f32 = 20.0;

/// Which visual effect a particle belongs to (drives its look)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Falling paper rectangle
    Confetti,
    /// Small heart thrown out of a collected actor
    Burst,
    /// Small finale heart
    Finale,
    /// Large glowing finale heart
    FinaleGlow,
}

/// Screen edge past which a particle is gone for good
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullBound {
    /// Fell below the bottom edge
    Bottom,
    /// Rose above the top edge
    Top,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Added to `vel.y` every tick
    pub gravity: f32,
    pub size: Vec2,
    /// Hue in degrees
    pub hue: f32,
    /// Ticks left; the particle is removed once this reaches zero
    pub life: f32,
    pub max_life: f32,
    pub alpha: f32,
    /// Alpha gained per tick (0 = opaque from the start)
    pub fade_in: f32,
    pub cull: CullBound,
}

impl Particle {
    /// Remaining life in [0, 1]
    pub fn life_fraction(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn out_of_bounds(&self, viewport: Viewport) -> bool {
        let half_h = self.size.y * 0.5;
        match self.cull {
            CullBound::Bottom => self.pos.y - half_h > viewport.height + CULL_MARGIN,
            CullBound::Top => self.pos.y + half_h < -CULL_MARGIN,
        }
    }
}

/// Spawn parameters for one batch. Ranges are `(lo, hi)`, sampled uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleProfile {
    pub kind: ParticleKind,
    /// Max offset from the origin on each axis (uniform in ±jitter)
    pub jitter: Vec2,
    pub vel_x: (f32, f32),
    pub vel_y: (f32, f32),
    pub gravity: f32,
    pub life: (f32, f32),
    pub width: (f32, f32),
    /// `None` keeps particles square
    pub height: Option<(f32, f32)>,
    pub hue: (f32, f32),
    /// Alpha ramp per tick for effects that fade in
    pub fade_in: Option<f32>,
    pub cull: CullBound,
}

impl ParticleProfile {
    /// Confetti shower over the whole width, starting up to 60% of a screen
    /// height above the top edge. Spawn with [`ParticleProfile::confetti_origin`].
    ///
    /// Life always outlasts the slowest fall from the highest start, so pieces
    /// only ever leave through the bottom cull.
    pub fn confetti_shower(viewport: Viewport) -> Self {
        let fall = viewport.height * 1.6 + CULL_MARGIN * 3.0;
        Self {
            kind: ParticleKind::Confetti,
            jitter: Vec2::new(viewport.width * 0.5, viewport.height * 0.3),
            vel_x: (-0.9, 0.9),
            vel_y: (1.0, 3.0),
            gravity: 0.0,
            life: (fall, fall + 600.0),
            width: (6.0, 16.0),
            height: Some((4.0, 10.0)),
            hue: (320.0, 360.0),
            fade_in: None,
            cull: CullBound::Bottom,
        }
    }

    /// Origin for [`ParticleProfile::confetti_shower`]
    pub fn confetti_origin(viewport: Viewport) -> Vec2 {
        Vec2::new(viewport.width * 0.5, -viewport.height * 0.3)
    }

    /// Single confetti piece entering just above the top edge
    pub fn confetti_trickle(viewport: Viewport) -> Self {
        Self {
            jitter: Vec2::new(viewport.width * 0.5, 0.0),
            ..Self::confetti_shower(viewport)
        }
    }

    /// Origin for [`ParticleProfile::confetti_trickle`]
    pub fn trickle_origin(viewport: Viewport) -> Vec2 {
        Vec2::new(viewport.width * 0.5, -10.0)
    }

    /// Quick outward pop where the actor was collected
    pub fn collect_burst() -> Self {
        Self {
            kind: ParticleKind::Burst,
            jitter: Vec2::splat(4.0),
            vel_x: (-5.0, 5.0),
            vel_y: (-6.0, 2.5),
            gravity: 0.15,
            life: (28.0, 48.0),
            width: (6.0, 12.0),
            height: None,
            hue: (330.0, 360.0),
            fade_in: None,
            cull: CullBound::Bottom,
        }
    }

    /// Majority of the finale: small hearts, short range
    pub fn finale_small() -> Self {
        Self {
            kind: ParticleKind::Finale,
            jitter: Vec2::new(30.0, 6.0),
            vel_x: (-1.5, 1.5),
            vel_y: (-4.5, -2.0),
            gravity: 0.02,
            life: (90.0, 150.0),
            width: (6.0, 12.0),
            height: None,
            hue: (335.0, 360.0),
            fade_in: Some(0.06),
            cull: CullBound::Top,
        }
    }

    /// Minority of the finale: large glowing hearts that travel far
    pub fn finale_glow() -> Self {
        Self {
            kind: ParticleKind::FinaleGlow,
            jitter: Vec2::new(20.0, 4.0),
            vel_x: (-2.5, 2.5),
            vel_y: (-7.0, -4.5),
            gravity: 0.025,
            life: (200.0, 320.0),
            width: (18.0, 30.0),
            height: None,
            hue: (340.0, 360.0),
            fade_in: Some(0.03),
            cull: CullBound::Top,
        }
    }

    fn roll(&self, origin: Vec2, rng: &mut SimRng) -> Particle {
        let offset = Vec2::new(
            sample(rng, (-self.jitter.x, self.jitter.x)),
            sample(rng, (-self.jitter.y, self.jitter.y)),
        );
        let width = sample(rng, self.width);
        let height = match self.height {
            Some(range) => sample(rng, range),
            None => width,
        };
        let life = sample(rng, self.life);
        let fade_in = self.fade_in.unwrap_or(0.0);
        Particle {
            kind: self.kind,
            pos: origin + offset,
            vel: Vec2::new(sample(rng, self.vel_x), sample(rng, self.vel_y)),
            gravity: self.gravity,
            size: Vec2::new(width, height),
            hue: sample(rng, self.hue),
            life,
            max_life: life,
            alpha: if fade_in > 0.0 { 0.0 } else { 1.0 },
            fade_in,
            cull: self.cull,
        }
    }
}

/// An owned particle collection, mutated by `spawn_burst`, `tick` and `clear`
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    /// Cap on live particles; oldest are evicted first. Zero disables spawning.
    max_particles: usize,
    /// Non-empty at the end of the previous tick (or since a spawn)
    populated: bool,
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            max_particles,
            populated: false,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    /// Spawn `count` particles around `origin` using `profile`
    pub fn spawn_burst(&mut self, origin: Vec2, count: usize, profile: &ParticleProfile, rng: &mut SimRng) {
        if self.max_particles == 0 {
            return;
        }
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                // Remove oldest particles to make room
                self.particles.remove(0);
            }
            self.particles.push(profile.roll(origin, rng));
        }
        self.populated |= !self.particles.is_empty();
    }

    /// Insert a prepared particle (bypasses profiles; respects the cap)
    #[cfg(test)]
    pub(crate) fn push(&mut self, particle: Particle) {
        if self.max_particles == 0 {
            return;
        }
        if self.particles.len() >= self.max_particles {
            self.particles.remove(0);
        }
        self.particles.push(particle);
        self.populated = true;
    }

    /// Advance every particle one tick and cull the dead.
    ///
    /// Returns `true` exactly once when the collection goes from non-empty
    /// to empty.
    pub fn tick(&mut self, viewport: Viewport) -> bool {
        for p in self.particles.iter_mut() {
            p.vel.y += p.gravity;
            p.pos += p.vel;
            p.life -= 1.0;
            if p.fade_in > 0.0 {
                p.alpha = (p.alpha + p.fade_in).min(1.0);
            }
        }
        self.particles.retain(|p| p.life > 0.0 && !p.out_of_bounds(viewport));

        let drained = self.populated && self.particles.is_empty();
        self.populated = !self.particles.is_empty();
        drained
    }

    /// Drop everything without reporting a drain
    pub fn clear(&mut self) {
        self.particles.clear();
        self.populated = false;
    }
}
