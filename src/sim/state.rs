//! Game state and phase transitions
//!
//! One `GameState` is one independent session. Everything the game mutates
//! lives here and is passed explicitly into the tick; nothing is global.

use glam::Vec2;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::actor::{self, Actor, Rect, Viewport};
use super::collision;
use super::letter::{LetterSequencer, RevealMode};
use super::orbit::OrbitText;
use super::particles::{ParticleProfile, ParticleSystem};
use super::schedule::{DeferredEvent, Scheduled, Scheduler};
use super::SimRng;
use crate::secs_to_ticks;
use crate::settings::Settings;

/// Particles thrown out by one collection
pub const COLLECT_BURST_COUNT: usize = 16;
/// Confetti pieces in the shower that greets the letter
pub const LETTER_CONFETTI_COUNT: usize = 80;
/// Finale launch point as a fraction of the viewport
pub const FINALE_ANCHOR: Vec2 = Vec2::new(0.5, 0.85);

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Instructions on screen, waiting for the start action
    Rules,
    /// Heart bouncing, taps collect it
    Playing,
    /// Target reached, letter about to open
    Won,
    /// Letter is being typed out
    LetterOpen,
    /// Floating hearts and orbiting message
    Finale,
}

/// Notifications for the HUD, drained by the driver after each frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Collected count changed
    Progress { collected: u32, target: u32 },
    /// Brief feedback pulse after a collection
    Celebrate,
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// Letter text or "Next" availability changed
    LetterChanged,
    /// The finale particles have all gone; hide their surface
    FinaleHidden,
}

/// Complete session state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub(crate) rng: SimRng,
    pub settings: Settings,
    /// Current phase
    pub phase: GamePhase,
    /// Hearts collected this round, never above `target`
    pub collected: u32,
    pub target: u32,
    pub actor: Actor,
    /// Collection bursts and confetti
    pub effects: ParticleSystem,
    /// Finale hearts (their own surface, hidden once drained)
    pub finale: ParticleSystem,
    pub letter: Option<LetterSequencer>,
    pub orbit: Option<OrbitText>,
    pub viewport: Viewport,
    pub protected_zone: Option<Rect>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Bumped on every reset; deferred work from older generations is dropped
    pub(crate) generation: u32,
    pub(crate) scheduler: Scheduler,
    /// Fractional confetti owed to the trickle
    pub(crate) confetti_carry: f32,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session in the `Rules` phase
    pub fn new(seed: u64, settings: Settings, viewport: Viewport) -> Self {
        let max_particles = settings.max_particles();
        Self {
            seed,
            rng: SimRng::seed_from_u64(seed),
            target: settings.target.max(1),
            settings,
            phase: GamePhase::Rules,
            collected: 0,
            actor: Actor::default(),
            effects: ParticleSystem::new(max_particles),
            finale: ParticleSystem::new(max_particles),
            letter: None,
            orbit: None,
            viewport,
            protected_zone: None,
            time_ticks: 0,
            generation: 0,
            scheduler: Scheduler::new(),
            confetti_carry: 0.0,
            events: Vec::new(),
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Pending HUD notifications
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take pending HUD notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deferred entries not yet fired (stale ones included)
    pub fn pending_deferred(&self) -> usize {
        self.scheduler.len()
    }

    /// Viewport resize notification
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.actor.alive {
            self.actor.clamp_to(viewport);
        }
        if let Some(orbit) = self.orbit.as_mut() {
            orbit.relayout(viewport);
        }
    }

    /// Protected zone moved (e.g. portrait re-laid out)
    pub fn set_protected_zone(&mut self, zone: Option<Rect>) {
        self.protected_zone = zone;
    }

    /// `Rules` -> `Playing`. One-shot: ignored in any other phase.
    pub fn start(&mut self) {
        if self.phase != GamePhase::Rules {
            log::debug!("Start ignored in {:?}", self.phase);
            return;
        }
        self.begin_round();
    }

    /// Close the letter or replay after the finale: back to `Playing` with a
    /// fresh count. Deferred work queued before this point becomes stale.
    pub fn replay(&mut self) {
        if !matches!(self.phase, GamePhase::LetterOpen | GamePhase::Finale) {
            log::debug!("Replay ignored in {:?}", self.phase);
            return;
        }
        self.generation = self.generation.wrapping_add(1);
        self.letter = None;
        self.orbit = None;
        if !self.finale.is_empty() {
            self.finale.clear();
            self.events.push(GameEvent::FinaleHidden);
        }
        log::info!("Replay (generation {})", self.generation);
        self.begin_round();
    }

    fn begin_round(&mut self) {
        self.collected = 0;
        self.actor = actor::spawn(self.viewport, self.protected_zone, 0, &mut self.rng);
        self.emit_progress();
        self.transition(GamePhase::Playing);
    }

    /// Route a pointer tap through the hit test. Returns whether it collected.
    ///
    /// Taps outside `Playing`, on a collected actor, off the page or off the
    /// sprite are dropped without any state change.
    pub fn try_collect(&mut self, point: Vec2) -> bool {
        if self.phase != GamePhase::Playing || !self.actor.alive {
            return false;
        }
        // A rotated box pinned to a wall pokes past the page edge
        if !self.viewport.contains(point) {
            return false;
        }
        if !collision::hits(&self.actor, point) {
            return false;
        }
        self.collect()
    }

    /// Collection handler. Idempotent: a second call for the same actor, or a
    /// call outside `Playing`, is a no-op.
    pub fn collect(&mut self) -> bool {
        if self.phase != GamePhase::Playing || !self.actor.alive {
            return false;
        }

        let pos = self.actor.pos;
        self.actor.alive = false;
        // Clamp first, then compare, so the target is never overshot
        self.collected = (self.collected + 1).min(self.target);
        log::debug!("Collected {}/{} at ({:.0}, {:.0})", self.collected, self.target, pos.x, pos.y);

        self.effects
            .spawn_burst(pos, COLLECT_BURST_COUNT, &ParticleProfile::collect_burst(), &mut self.rng);
        self.emit_progress();
        self.events.push(GameEvent::Celebrate);

        if self.collected == self.target {
            self.transition(GamePhase::Won);
            self.schedule(secs_to_ticks(self.settings.won_delay_ms / 1000.0), DeferredEvent::OpenLetter);
        } else {
            self.schedule(
                secs_to_ticks(self.settings.respawn_delay_ms / 1000.0),
                DeferredEvent::RespawnActor,
            );
        }
        true
    }

    /// "Next" on the letter: finish the typing chunk, move to the next one, or
    /// (on the terminal step) start the finale.
    pub fn advance_letter(&mut self) {
        if self.phase != GamePhase::LetterOpen {
            return;
        }
        let Some(letter) = self.letter.as_mut() else {
            return;
        };

        if !letter.chunk_complete() {
            letter.skip_chunk();
            self.events.push(GameEvent::LetterChanged);
            return;
        }

        letter.advance_chunk();
        self.events.push(GameEvent::LetterChanged);
        if letter.is_done() {
            self.enter_finale();
        }
    }

    /// Run one fired scheduler entry
    pub(crate) fn run_deferred(&mut self, entry: Scheduled) {
        if entry.generation != self.generation {
            log::warn!(
                "Dropping stale {:?} (generation {} != {})",
                entry.event,
                entry.generation,
                self.generation
            );
            return;
        }

        match entry.event {
            DeferredEvent::RespawnActor => {
                if self.phase == GamePhase::Playing && !self.actor.alive {
                    self.actor =
                        actor::spawn(self.viewport, self.protected_zone, self.collected, &mut self.rng);
                    log::debug!("Respawned actor at level {}", self.collected);
                }
            }
            DeferredEvent::OpenLetter => {
                if self.phase == GamePhase::Won {
                    self.open_letter();
                }
            }
            DeferredEvent::StartFinale => {
                if self.phase == GamePhase::LetterOpen {
                    self.enter_finale();
                }
            }
        }
    }

    fn open_letter(&mut self) {
        let letter = LetterSequencer::start(
            self.settings.chunks.clone(),
            self.settings.reveal_mode,
            self.settings.reveal_timing(),
        );
        let empty_continuous = letter.is_done() && letter.mode() == RevealMode::Continuous;
        self.letter = Some(letter);
        self.transition(GamePhase::LetterOpen);
        self.events.push(GameEvent::LetterChanged);

        self.effects.spawn_burst(
            ParticleProfile::confetti_origin(self.viewport),
            LETTER_CONFETTI_COUNT,
            &ParticleProfile::confetti_shower(self.viewport),
            &mut self.rng,
        );

        if empty_continuous {
            self.schedule_finale();
        }
    }

    /// Queue the automatic finale used by continuous reveal
    pub(crate) fn schedule_finale(&mut self) {
        self.schedule(secs_to_ticks(self.settings.finale_delay_ms / 1000.0), DeferredEvent::StartFinale);
    }

    fn enter_finale(&mut self) {
        self.letter = None;
        self.orbit = Some(OrbitText::layout(&self.settings.orbit_message, self.viewport));

        let anchor = self.viewport.size() * FINALE_ANCHOR;
        let (small, glow) = self.settings.finale_counts();
        self.finale
            .spawn_burst(anchor, small, &ParticleProfile::finale_small(), &mut self.rng);
        self.finale
            .spawn_burst(anchor, glow, &ParticleProfile::finale_glow(), &mut self.rng);

        self.transition(GamePhase::Finale);
    }

    fn schedule(&mut self, delay_ticks: u64, event: DeferredEvent) {
        self.scheduler
            .schedule(self.time_ticks, delay_ticks, self.generation, event);
    }

    fn transition(&mut self, to: GamePhase) {
        let from = self.phase;
        self.phase = to;
        log::info!("Phase {:?} -> {:?}", from, to);
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    fn emit_progress(&mut self) {
        self.events.push(GameEvent::Progress {
            collected: self.collected,
            target: self.target,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_target(target: u32) -> GameState {
        let settings = Settings {
            target,
            ..Settings::default()
        };
        GameState::new(1234, settings, Viewport::new(800.0, 600.0))
    }

    fn phase_changes(events: &[GameEvent]) -> Vec<GamePhase> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_session_waits_in_rules() {
        let state = state_with_target(10);
        assert_eq!(state.phase, GamePhase::Rules);
        assert!(!state.actor.alive);
        assert_eq!(state.collected, 0);
    }

    #[test]
    fn test_start_is_one_shot() {
        let mut state = state_with_target(10);
        state.start();
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.actor.alive);
        let pos = state.actor.pos;

        state.start();
        assert_eq!(state.actor.pos, pos);
        assert_eq!(phase_changes(state.events()), vec![GamePhase::Playing]);
    }

    #[test]
    fn test_collect_on_dead_actor_is_noop() {
        let mut state = state_with_target(10);
        state.start();
        assert!(state.collect());
        let collected = state.collected;
        let particles = state.effects.len();
        let pending = state.pending_deferred();
        let events = state.events().len();

        assert!(!state.collect());
        assert!(!state.try_collect(state.actor.pos));
        assert_eq!(state.collected, collected);
        assert_eq!(state.effects.len(), particles);
        assert_eq!(state.pending_deferred(), pending);
        assert_eq!(state.events().len(), events);
    }

    #[test]
    fn test_collect_outside_playing_is_noop() {
        let mut state = state_with_target(10);
        assert!(!state.collect());
        assert_eq!(state.collected, 0);
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_tap_must_hit_sprite() {
        let mut state = state_with_target(10);
        state.start();
        let far = state.actor.pos + Vec2::new(state.actor.size.x * 2.0, 0.0);
        assert!(!state.try_collect(far));
        assert!(state.actor.alive);
        assert!(state.try_collect(state.actor.pos));
        assert!(!state.actor.alive);
    }

    #[test]
    fn test_tap_off_page_is_ignored_at_wall() {
        let mut state = state_with_target(10);
        state.start();
        let (min, _) = state.actor.center_bounds(state.viewport);
        state.actor.pos = Vec2::new(min.x, 300.0);
        state.actor.orientation = std::f32::consts::FRAC_PI_4;

        let off_page = Vec2::new(-1.0, 300.0);
        // The rotated box itself reaches past x = 0
        assert!(collision::hits(&state.actor, off_page));
        assert!(!state.try_collect(off_page));
        assert!(state.actor.alive);
        assert_eq!(state.collected, 0);

        assert!(state.try_collect(Vec2::new(0.0, 300.0)));
        assert_eq!(state.collected, 1);
    }

    #[test]
    fn test_collect_reports_progress_and_burst() {
        let mut state = state_with_target(10);
        state.start();
        state.drain_events();
        let pos = state.actor.pos;
        state.collect();

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Progress { collected: 1, target: 10 }));
        assert!(events.contains(&GameEvent::Celebrate));
        assert_eq!(state.effects.len(), COLLECT_BURST_COUNT);
        let jitter = ParticleProfile::collect_burst().jitter;
        assert!(state.effects.particles().iter().all(|p| (p.pos - pos).abs().cmple(jitter).all()));
    }

    #[test]
    fn test_final_collection_wins_once() {
        let mut state = state_with_target(1);
        state.start();
        assert!(state.collect());
        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(state.collected, 1);

        // Spurious extra events after the win
        state.actor.alive = true;
        assert!(!state.collect());
        assert_eq!(state.collected, 1);
        let wins = phase_changes(state.events())
            .into_iter()
            .filter(|p| *p == GamePhase::Won)
            .count();
        assert_eq!(wins, 1);
    }

    #[test]
    fn test_stale_respawn_is_dropped() {
        let mut state = state_with_target(10);
        state.start();
        state.collect();
        let stale = Scheduled {
            due_tick: 0,
            generation: state.generation().wrapping_sub(1),
            event: DeferredEvent::RespawnActor,
        };
        state.run_deferred(stale);
        assert!(!state.actor.alive);

        let current = Scheduled {
            generation: state.generation(),
            ..stale
        };
        state.run_deferred(current);
        assert!(state.actor.alive);
    }

    #[test]
    fn test_respawn_does_not_resurrect_live_actor() {
        let mut state = state_with_target(10);
        state.start();
        let pos = state.actor.pos;
        state.run_deferred(Scheduled {
            due_tick: 0,
            generation: state.generation(),
            event: DeferredEvent::RespawnActor,
        });
        assert_eq!(state.actor.pos, pos);
    }

    #[test]
    fn test_open_letter_only_from_won() {
        let mut state = state_with_target(1);
        state.start();
        let open = Scheduled {
            due_tick: 0,
            generation: state.generation(),
            event: DeferredEvent::OpenLetter,
        };
        state.run_deferred(open);
        assert_eq!(state.phase, GamePhase::Playing);

        state.collect();
        state.run_deferred(open);
        assert_eq!(state.phase, GamePhase::LetterOpen);
        assert!(state.letter.is_some());
        assert_eq!(state.effects.len(), COLLECT_BURST_COUNT + LETTER_CONFETTI_COUNT);
    }

    #[test]
    fn test_letter_next_through_to_finale() {
        let mut state = state_with_target(1);
        state.settings.chunks = vec!["Hi".into(), "Bye".into()];
        state.start();
        state.collect();
        state.run_deferred(Scheduled {
            due_tick: 0,
            generation: state.generation(),
            event: DeferredEvent::OpenLetter,
        });

        // First press finishes typing, second moves on
        state.advance_letter();
        assert_eq!(state.letter.as_ref().unwrap().current_text(), "Hi");
        state.advance_letter();
        assert_eq!(state.letter.as_ref().unwrap().chunk_index(), 1);
        assert_eq!(state.letter.as_ref().unwrap().current_text(), "");

        state.advance_letter();
        state.advance_letter();
        assert_eq!(state.phase, GamePhase::Finale);
        assert!(state.letter.is_none());
        assert!(state.orbit.is_some());
        assert!(!state.finale.is_empty());
    }

    #[test]
    fn test_replay_resets_and_bumps_generation() {
        let mut state = state_with_target(1);
        state.start();
        state.collect();
        state.run_deferred(Scheduled {
            due_tick: 0,
            generation: state.generation(),
            event: DeferredEvent::OpenLetter,
        });
        let generation = state.generation();
        state.drain_events();

        state.replay();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.collected, 0);
        assert!(state.actor.alive);
        assert!(state.letter.is_none());
        assert_eq!(state.generation(), generation + 1);
        assert!(state.events().contains(&GameEvent::Progress { collected: 0, target: 1 }));
    }

    #[test]
    fn test_replay_ignored_while_playing() {
        let mut state = state_with_target(3);
        state.start();
        state.collect();
        state.replay();
        assert_eq!(state.collected, 1);
        assert_eq!(state.generation(), 0);
    }

    #[test]
    fn test_resize_keeps_actor_inside() {
        let mut state = state_with_target(3);
        state.start();
        state.actor.pos = Vec2::new(790.0, 590.0);
        state.set_viewport(Viewport::new(320.0, 480.0));
        assert!(state.actor.is_in_bounds(state.viewport));
    }

    #[test]
    fn test_resize_relays_out_orbit() {
        let mut state = state_with_target(1);
        state.orbit = Some(OrbitText::layout("one two three", state.viewport));
        let before = state.orbit.as_ref().map(|o| (o.revision(), o.words()[1].offset));

        state.set_viewport(Viewport::new(320.0, 480.0));
        let after = state.orbit.as_ref().map(|o| (o.revision(), o.words()[1].offset));
        let ((rev_before, offset_before), (rev_after, offset_after)) = before.zip(after).unwrap();
        assert_ne!(rev_before, rev_after);
        assert_ne!(offset_before, offset_after);
    }
}
