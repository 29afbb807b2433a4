//! CPU-side tessellation of one frame into a triangle list

use glam::Vec2;

use super::shapes::{circle, heart, hsl_to_rgba, oriented_quad};
use super::vertex::{Vertex, colors};
use crate::platform::Surface;
use crate::sim::{Actor, Particle, ParticleKind};

/// Particle hearts are small; they don't need the actor's resolution
const PARTICLE_HEART_SEGMENTS: u32 = 10;
/// Confetti pieces lean with their horizontal drift
const CONFETTI_TILT: f32 = 0.35;

/// A [`Surface`] that collects vertices for [`super::RenderState::render`]
#[derive(Debug, Default)]
pub struct VertexBatch {
    vertices: Vec<Vertex>,
    heart_segments: u32,
}

impl VertexBatch {
    pub fn new(heart_segments: u32) -> Self {
        Self {
            vertices: Vec::with_capacity(4096),
            heart_segments,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }
}

impl Surface for VertexBatch {
    fn begin_frame(&mut self) {
        self.vertices.clear();
    }

    fn draw_actor(&mut self, actor: &Actor) {
        self.vertices.extend(heart(
            actor.pos,
            actor.size,
            actor.orientation,
            colors::HEART,
            self.heart_segments,
        ));
        // Highlight on the upper-left lobe, turning with the sprite
        let shine = actor.pos + Vec2::from_angle(actor.orientation).rotate(actor.size * Vec2::new(-0.2, -0.18));
        self.vertices
            .extend(circle(shine, actor.size.x * 0.07, colors::HEART_SHINE, 8));
    }

    fn draw_particle(&mut self, particle: &Particle) {
        match particle.kind {
            ParticleKind::Confetti => {
                let color = hsl_to_rgba(particle.hue, 0.8, 0.62, particle.alpha);
                self.vertices.extend(oriented_quad(
                    particle.pos,
                    particle.size,
                    particle.vel.x * CONFETTI_TILT,
                    color,
                ));
            }
            ParticleKind::Burst => {
                let color = hsl_to_rgba(particle.hue, 0.85, 0.6, particle.alpha * particle.life_fraction());
                self.vertices
                    .extend(heart(particle.pos, particle.size, 0.0, color, PARTICLE_HEART_SEGMENTS));
            }
            ParticleKind::Finale | ParticleKind::FinaleGlow => {
                // Fade out over the last third of life
                let fade = (particle.life_fraction() * 3.0).min(1.0);
                let alpha = particle.alpha * fade;
                if particle.kind == ParticleKind::FinaleGlow {
                    let mut glow = colors::GLOW;
                    glow[3] *= alpha;
                    self.vertices
                        .extend(circle(particle.pos, particle.size.x * 0.9, glow, 16));
                }
                let color = hsl_to_rgba(particle.hue, 0.9, 0.62, alpha);
                self.vertices
                    .extend(heart(particle.pos, particle.size, 0.0, color, PARTICLE_HEART_SEGMENTS));
            }
        }
    }
}
