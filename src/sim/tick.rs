//! Fixed timestep simulation tick
//!
//! One call advances the session by exactly one tick. Order within a tick:
//! due deferred work, then inputs, then motion, letter, particles and orbit.

use glam::Vec2;

use super::actor;
use super::particles::ParticleProfile;
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer presses since the last tick, viewport pixels
    pub taps: Vec<Vec2>,
    /// Start button on the rules card
    pub start: bool,
    /// "Next" on the letter
    pub advance: bool,
    /// Close letter / replay after the finale
    pub replay: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    for entry in state.scheduler.take_due(state.time_ticks) {
        state.run_deferred(entry);
    }

    if input.start {
        state.start();
    }
    if input.replay {
        state.replay();
    }
    for &tap in &input.taps {
        // The actor is dead after the first hit, later taps would be no-ops
        if state.try_collect(tap) {
            break;
        }
    }
    if input.advance {
        state.advance_letter();
    }

    actor::step(&mut state.actor, state.viewport);

    tick_letter(state);
    tick_particles(state);

    if let Some(orbit) = state.orbit.as_mut() {
        orbit.advance();
    }
}

fn tick_letter(state: &mut GameState) {
    if state.phase != GamePhase::LetterOpen {
        return;
    }
    let Some(letter) = state.letter.as_mut() else {
        return;
    };

    let before = (letter.chunk_index(), letter.char_index(), letter.awaiting_advance());
    let finished = letter.tick(&mut state.rng);
    let after = (letter.chunk_index(), letter.char_index(), letter.awaiting_advance());

    if before != after {
        state.events.push(GameEvent::LetterChanged);
    }
    if finished {
        log::debug!("Letter finished typing, finale queued");
        state.schedule_finale();
    }
}

fn tick_particles(state: &mut GameState) {
    // Ambient trickle runs once the game is underway
    if state.phase != GamePhase::Rules && state.settings.effective_ambient_confetti() {
        state.confetti_carry += state.settings.confetti_rate.max(0.0);
        let whole = state.confetti_carry.floor();
        if whole >= 1.0 {
            state.confetti_carry -= whole;
            state.effects.spawn_burst(
                ParticleProfile::trickle_origin(state.viewport),
                whole as usize,
                &ParticleProfile::confetti_trickle(state.viewport),
                &mut state.rng,
            );
        }
    }

    state.effects.tick(state.viewport);

    if state.finale.tick(state.viewport) {
        log::info!("Finale particles drained");
        state.events.push(GameEvent::FinaleHidden);
    }
}
