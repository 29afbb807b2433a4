//! Platform abstraction layer
//!
//! The game core never touches the DOM or the GPU directly. The driver talks
//! to the page through two narrow seams:
//! - [`Surface`]: somewhere to draw the actor and particles each frame
//! - [`HudSink`]: progress text, celebration pulse, phase cards, letter text

use crate::sim::{Actor, GamePhase, LetterSequencer, OrbitText, Particle};

/// Per-frame drawing target. Coordinates are viewport pixels.
pub trait Surface {
    /// Start a new frame (drop whatever was drawn last frame)
    fn begin_frame(&mut self);

    /// Draw the actor sprite centred on `actor.pos`, rotated by
    /// `actor.orientation`
    fn draw_actor(&mut self, actor: &Actor);

    /// Draw one particle with its own alpha and hue
    fn draw_particle(&mut self, particle: &Particle);
}

/// Overlay/HUD updates. All methods are fire-and-forget.
pub trait HudSink {
    fn progress(&mut self, collected: u32, target: u32);

    /// Short feedback pulse after a collection
    fn celebrate(&mut self);

    fn phase_changed(&mut self, from: GamePhase, to: GamePhase);

    /// Letter text changed. `None` once the letter is closed.
    fn letter(&mut self, letter: Option<&LetterSequencer>);

    /// Finale hearts are gone; hide their layer
    fn finale_hidden(&mut self);

    /// Orbiting message, called every frame while the finale runs
    fn orbit(&mut self, _orbit: &OrbitText) {}
}
