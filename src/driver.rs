//! Frame driver
//!
//! Turns variable wall-clock frames into fixed simulation ticks, feeds queued
//! input into the tick, forwards state notifications to the HUD and draws the
//! result. Holds no platform handles, so native tests can drive it directly.

use glam::Vec2;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::platform::{HudSink, Surface};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, Rect, TickInput, Viewport, tick};

/// Largest frame delta accepted, in seconds (tab switches, debugger pauses)
const MAX_FRAME_DT: f32 = 0.1;

pub struct Driver {
    state: GameState,
    accumulator: f32,
    /// Input gathered since the last tick
    input: TickInput,
}

impl Driver {
    pub fn new(seed: u64, settings: Settings, viewport: Viewport) -> Self {
        log::info!("Session started (seed {seed}, target {})", settings.target);
        Self {
            state: GameState::new(seed, settings, viewport),
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Pointer press in viewport pixels
    pub fn queue_tap(&mut self, pos: Vec2) {
        self.input.taps.push(pos);
    }

    pub fn press_start(&mut self) {
        self.input.start = true;
    }

    pub fn press_advance(&mut self) {
        self.input.advance = true;
    }

    pub fn press_replay(&mut self) {
        self.input.replay = true;
    }

    pub fn resize(&mut self, viewport: Viewport) {
        log::debug!("Viewport {}x{}", viewport.width, viewport.height);
        self.state.set_viewport(viewport);
    }

    pub fn set_protected_zone(&mut self, zone: Option<Rect>) {
        self.state.set_protected_zone(zone);
    }

    /// Run as many fixed ticks as `dt` seconds allow and forward what
    /// happened to `hud`. Returns the number of ticks run.
    pub fn update(&mut self, dt: f32, hud: &mut impl HudSink) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot inputs are consumed by the first tick that sees them
            self.input = TickInput::default();
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than trying to catch up
            self.accumulator = 0.0;
        }

        self.forward_events(hud);
        substeps
    }

    fn forward_events(&mut self, hud: &mut impl HudSink) {
        let mut letter_dirty = false;
        for event in self.state.drain_events() {
            match event {
                GameEvent::Progress { collected, target } => hud.progress(collected, target),
                GameEvent::Celebrate => hud.celebrate(),
                GameEvent::PhaseChanged { from, to } => {
                    hud.phase_changed(from, to);
                    if from == GamePhase::LetterOpen || to == GamePhase::LetterOpen {
                        letter_dirty = true;
                    }
                }
                GameEvent::LetterChanged => letter_dirty = true,
                GameEvent::FinaleHidden => hud.finale_hidden(),
            }
        }

        if letter_dirty {
            hud.letter(self.state.letter.as_ref());
        }
        if let Some(orbit) = self.state.orbit.as_ref() {
            hud.orbit(orbit);
        }
    }

    /// Draw the current state: effects behind the actor, finale on top
    pub fn draw(&self, surface: &mut impl Surface) {
        surface.begin_frame();
        for particle in self.state.effects.particles() {
            surface.draw_particle(particle);
        }
        if self.state.actor.alive {
            surface.draw_actor(&self.state.actor);
        }
        for particle in self.state.finale.particles() {
            surface.draw_particle(particle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Actor, LetterSequencer, OrbitText, Particle};

    #[derive(Default)]
    struct RecordingSurface {
        frames: u32,
        actors: Vec<Vec2>,
        particles: usize,
    }

    impl Surface for RecordingSurface {
        fn begin_frame(&mut self) {
            self.frames += 1;
            self.actors.clear();
            self.particles = 0;
        }

        fn draw_actor(&mut self, actor: &Actor) {
            self.actors.push(actor.pos);
        }

        fn draw_particle(&mut self, _particle: &Particle) {
            self.particles += 1;
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum HudCall {
        Progress(u32, u32),
        Celebrate,
        Phase(GamePhase, GamePhase),
        Letter(Option<String>),
        FinaleHidden,
    }

    #[derive(Default)]
    struct RecordingHud {
        calls: Vec<HudCall>,
        orbit_frames: u32,
    }

    impl HudSink for RecordingHud {
        fn progress(&mut self, collected: u32, target: u32) {
            self.calls.push(HudCall::Progress(collected, target));
        }

        fn celebrate(&mut self) {
            self.calls.push(HudCall::Celebrate);
        }

        fn phase_changed(&mut self, from: GamePhase, to: GamePhase) {
            self.calls.push(HudCall::Phase(from, to));
        }

        fn letter(&mut self, letter: Option<&LetterSequencer>) {
            self.calls
                .push(HudCall::Letter(letter.map(|l| l.current_text().to_string())));
        }

        fn finale_hidden(&mut self) {
            self.calls.push(HudCall::FinaleHidden);
        }

        fn orbit(&mut self, _orbit: &OrbitText) {
            self.orbit_frames += 1;
        }
    }

    fn driver(target: u32) -> Driver {
        let settings = Settings {
            target,
            ambient_confetti: false,
            ..Settings::default()
        };
        Driver::new(42, settings, Viewport::new(800.0, 600.0))
    }

    #[test]
    fn test_substeps_are_capped() {
        let mut d = driver(3);
        let mut hud = RecordingHud::default();
        assert_eq!(d.update(1.0, &mut hud), MAX_SUBSTEPS);
        assert_eq!(d.state().time_ticks, MAX_SUBSTEPS as u64);
        // Backlog dropped: a normal frame runs one tick
        assert_eq!(d.update(SIM_DT, &mut hud), 1);
    }

    #[test]
    fn test_short_frame_keeps_input_pending() {
        let mut d = driver(3);
        let mut hud = RecordingHud::default();
        d.press_start();
        assert_eq!(d.update(SIM_DT * 0.25, &mut hud), 0);
        assert_eq!(d.state().phase, GamePhase::Rules);

        d.update(SIM_DT, &mut hud);
        assert_eq!(d.state().phase, GamePhase::Playing);
        assert_eq!(
            hud.calls,
            vec![
                HudCall::Progress(0, 3),
                HudCall::Phase(GamePhase::Rules, GamePhase::Playing),
            ]
        );
    }

    #[test]
    fn test_one_shot_input_consumed_once() {
        let mut d = driver(3);
        let mut hud = RecordingHud::default();
        d.press_start();
        d.update(SIM_DT * 3.0, &mut hud);
        let starts = hud
            .calls
            .iter()
            .filter(|c| matches!(c, HudCall::Phase(_, GamePhase::Playing)))
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_collection_reaches_hud() {
        let mut d = driver(3);
        let mut hud = RecordingHud::default();
        d.press_start();
        d.update(SIM_DT, &mut hud);
        hud.calls.clear();

        d.queue_tap(d.state().actor.pos);
        d.update(SIM_DT, &mut hud);
        assert_eq!(hud.calls, vec![HudCall::Progress(1, 3), HudCall::Celebrate]);
    }

    #[test]
    fn test_draw_order_and_visibility() {
        let mut d = driver(3);
        let mut hud = RecordingHud::default();
        let mut surface = RecordingSurface::default();

        d.draw(&mut surface);
        assert!(surface.actors.is_empty(), "no actor on the rules card");

        d.press_start();
        d.update(SIM_DT, &mut hud);
        d.draw(&mut surface);
        assert_eq!(surface.actors, vec![d.state().actor.pos]);

        d.queue_tap(d.state().actor.pos);
        d.update(SIM_DT, &mut hud);
        d.draw(&mut surface);
        assert!(surface.actors.is_empty());
        assert!(surface.particles > 0);
        assert_eq!(surface.frames, 3);
    }

    #[test]
    fn test_letter_and_finale_forwarding() {
        let settings = Settings {
            target: 1,
            chunks: vec!["Hi".into()],
            ambient_confetti: false,
            ..Settings::default()
        };
        let mut d = Driver::new(9, settings, Viewport::new(800.0, 600.0));
        let mut hud = RecordingHud::default();
        d.press_start();
        d.update(SIM_DT, &mut hud);
        d.queue_tap(d.state().actor.pos);

        for _ in 0..200 {
            d.update(SIM_DT, &mut hud);
            if d.state().phase == GamePhase::LetterOpen {
                break;
            }
        }
        assert!(hud.calls.iter().any(|c| matches!(c, HudCall::Letter(Some(_)))));

        // Next skips the typing, Next again closes the letter into the finale
        d.press_advance();
        d.update(SIM_DT, &mut hud);
        assert!(hud.calls.contains(&HudCall::Letter(Some("Hi".into()))));
        d.press_advance();
        d.update(SIM_DT, &mut hud);
        assert_eq!(d.state().phase, GamePhase::Finale);
        assert_eq!(hud.calls.last(), Some(&HudCall::Letter(None)));
        assert_eq!(hud.orbit_frames, 1);

        for _ in 0..1000 {
            d.update(SIM_DT, &mut hud);
        }
        let hidden = hud.calls.iter().filter(|c| **c == HudCall::FinaleHidden).count();
        assert_eq!(hidden, 1);
    }

    #[test]
    fn test_resize_reclamps_actor() {
        let mut d = driver(3);
        let mut hud = RecordingHud::default();
        d.press_start();
        d.update(SIM_DT, &mut hud);
        d.resize(Viewport::new(200.0, 200.0));
        assert!(d.state().actor.is_in_bounds(Viewport::new(200.0, 200.0)));
    }
}
