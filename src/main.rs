//! Heart Catch entry point
//!
//! On wasm32 this wires the page to the frame driver. The page provides:
//! - `#canvas`: full-viewport canvas the actor and particles are drawn on
//! - `#portrait`: image the actor avoids spawning on top of
//! - `#progress`: "collected/target" text, `#hud` pulses on each collection
//! - `#rules`, `#start-btn`: instructions card and its start button
//! - `#letter`, `#letter-text`, `#next-btn`: letter card
//! - `#replay-btn`, `#orbit`, `#finale`: replay action, orbit ring, finale backdrop
//! - `#game-config` (optional): JSON settings
//!
//! Native builds run a short headless session with logging instead.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, KeyboardEvent, PointerEvent};

    use heart_catch::consts::SIM_DT;
    use heart_catch::platform::HudSink;
    use heart_catch::renderer::{RenderInitError, RenderState, VertexBatch};
    use heart_catch::sim::{GamePhase, LetterSequencer, OrbitText, Rect, RevealMode, Viewport};
    use heart_catch::{Driver, Settings};

    /// DOM side of the HUD. Missing elements are skipped.
    struct DomHud {
        document: Document,
        hud: Option<Element>,
        progress: Option<Element>,
        rules: Option<Element>,
        letter: Option<Element>,
        letter_text: Option<Element>,
        next_btn: Option<Element>,
        replay_btn: Option<Element>,
        orbit: Option<Element>,
        finale: Option<Element>,
        /// Revision of the orbit layout the word spans were built from
        orbit_revision: Option<u32>,
    }

    impl DomHud {
        fn new(document: Document) -> Self {
            let find = |id: &str| {
                let el = document.get_element_by_id(id);
                if el.is_none() {
                    log::error!("Missing #{id}, that part of the HUD is skipped");
                }
                el
            };
            Self {
                hud: find("hud"),
                progress: find("progress"),
                rules: find("rules"),
                letter: find("letter"),
                letter_text: find("letter-text"),
                next_btn: find("next-btn"),
                replay_btn: find("replay-btn"),
                orbit: find("orbit"),
                finale: find("finale"),
                orbit_revision: None,
                document,
            }
        }

        fn set_visible(el: &Option<Element>, visible: bool) {
            if let Some(el) = el {
                let _ = if visible {
                    el.class_list().remove_1("hidden")
                } else {
                    el.class_list().add_1("hidden")
                };
            }
        }

        fn populate_orbit(&mut self, orbit: &OrbitText) {
            let Some(container) = self.orbit.as_ref() else {
                return;
            };
            container.set_inner_html("");
            for word in orbit.words() {
                let Ok(span) = self.document.create_element("span") else {
                    continue;
                };
                span.set_text_content(Some(&word.text));
                if let Some(span) = span.dyn_ref::<HtmlElement>() {
                    let _ = span.style().set_property(
                        "transform",
                        &format!(
                            "translate({:.1}px, {:.1}px) rotate({:.2}deg)",
                            word.offset.x,
                            word.offset.y,
                            word.rotation.to_degrees()
                        ),
                    );
                }
                let _ = container.append_child(&span);
            }
            self.orbit_revision = Some(orbit.revision());
        }
    }

    impl HudSink for DomHud {
        fn progress(&mut self, collected: u32, target: u32) {
            if let Some(el) = &self.progress {
                el.set_text_content(Some(&format!("{collected}/{target}")));
            }
        }

        fn celebrate(&mut self) {
            if let Some(el) = &self.hud {
                let _ = el.class_list().remove_1("pop");
                // Force a reflow so the animation restarts
                let _ = el.client_width();
                let _ = el.class_list().add_1("pop");
            }
        }

        fn phase_changed(&mut self, _from: GamePhase, to: GamePhase) {
            Self::set_visible(&self.rules, to == GamePhase::Rules);
            Self::set_visible(&self.letter, to == GamePhase::LetterOpen);
            Self::set_visible(
                &self.replay_btn,
                matches!(to, GamePhase::LetterOpen | GamePhase::Finale),
            );
            Self::set_visible(&self.orbit, to == GamePhase::Finale);
            Self::set_visible(&self.finale, to == GamePhase::Finale);
            if to != GamePhase::Finale {
                self.orbit_revision = None;
            }
        }

        fn letter(&mut self, letter: Option<&LetterSequencer>) {
            let Some(letter) = letter else {
                if let Some(el) = &self.letter_text {
                    el.set_text_content(None);
                }
                return;
            };

            if let Some(el) = &self.letter_text {
                let mut text = letter.finished_chunks().join("\n");
                if !letter.is_done() {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(letter.current_text());
                }
                el.set_text_content(Some(&text));
            }
            Self::set_visible(&self.next_btn, letter.mode() == RevealMode::Step);
            if let Some(btn) = &self.next_btn {
                let label = if letter.on_last_chunk() { "Finish" } else { "Next" };
                btn.set_text_content(Some(label));
            }
        }

        fn finale_hidden(&mut self) {
            Self::set_visible(&self.finale, false);
        }

        fn orbit(&mut self, orbit: &OrbitText) {
            if self.orbit_revision != Some(orbit.revision()) {
                self.populate_orbit(orbit);
            }
            if let Some(el) = self.orbit.as_ref().and_then(|e| e.dyn_ref::<HtmlElement>()) {
                let _ = el.style().set_property(
                    "transform",
                    &format!("translate(-50%, -50%) rotate({:.2}deg)", orbit.ring_angle().to_degrees()),
                );
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        driver: Driver,
        render_state: Option<RenderState>,
        batch: VertexBatch,
        hud: DomHud,
        last_time: f64,
    }

    impl Game {
        fn update(&mut self, dt: f32) {
            self.driver.update(dt, &mut self.hud);
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            self.driver.draw(&mut self.batch);
            match render_state.render(self.batch.vertices()) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => render_state.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
    }

    fn viewport_of(window: &web_sys::Window) -> Viewport {
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
        Viewport::new(w as f32, h as f32)
    }

    fn portrait_rect(document: &Document) -> Option<Rect> {
        let r = document.get_element_by_id("portrait")?.get_bounding_client_rect();
        Some(Rect::from_xywh(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32))
    }

    /// Backing-store size for the canvas at the current device pixel ratio
    fn physical_size(window: &web_sys::Window, viewport: Viewport) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        (
            (viewport.width as f64 * dpr).max(1.0) as u32,
            (viewport.height as f64 * dpr).max(1.0) as u32,
        )
    }

    async fn init_renderer(
        canvas: &HtmlCanvasElement,
        size: (u32, u32),
        viewport: Viewport,
    ) -> Result<RenderState, RenderInitError> {
        // Prefer WebGPU, fall back to WebGL2 where navigator.gpu is missing
        let has_webgpu = web_sys::window()
            .map(|w| js_sys::Reflect::has(&w.navigator(), &JsValue::from_str("gpu")).unwrap_or(false))
            .unwrap_or(false);
        let backends = if has_webgpu {
            wgpu::Backends::BROWSER_WEBGPU
        } else {
            wgpu::Backends::GL
        };

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, size.0, size.1, (viewport.width, viewport.height)).await
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }

        log::info!("Heart Catch starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document, nothing to run");
            return;
        };

        let settings = Settings::load();
        let heart_segments = settings.quality.heart_segments();
        let viewport = viewport_of(&window);
        let seed = js_sys::Date::now() as u64;

        let mut driver = Driver::new(seed, settings, viewport);
        driver.set_protected_zone(portrait_rect(&document));

        let canvas = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());

        let render_state = match canvas.as_ref() {
            Some(canvas) => {
                let size = physical_size(&window, viewport);
                canvas.set_width(size.0);
                canvas.set_height(size.1);
                match init_renderer(canvas, size, viewport).await {
                    Ok(state) => Some(state),
                    Err(e) => {
                        log::error!("Renderer unavailable: {e}");
                        None
                    }
                }
            }
            None => {
                log::error!("Missing #canvas, drawing is skipped");
                None
            }
        };

        let game = Rc::new(RefCell::new(Game {
            driver,
            render_state,
            batch: VertexBatch::new(heart_segments),
            hud: DomHud::new(document.clone()),
            last_time: 0.0,
        }));

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        setup_input_handlers(&window, game.clone());
        setup_buttons(&document, game.clone());
        setup_resize(&window, canvas, game.clone());

        request_animation_frame(game);

        log::info!("Heart Catch running (seed {seed})");
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Single pointer registration covers mouse, touch and pen
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let pos = glam::Vec2::new(event.client_x() as f32, event.client_y() as f32);
                game.borrow_mut().driver.queue_tap(pos);
            });
            let _ = window
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard: Enter/Space acts on whatever card is showing
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if !matches!(event.key().as_str(), " " | "Enter") {
                    return;
                }
                let mut g = game.borrow_mut();
                match g.driver.state().phase {
                    GamePhase::Rules => g.driver.press_start(),
                    GamePhase::LetterOpen => g.driver.press_advance(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let bind = |id: &str, action: fn(&mut Driver)| {
            let Some(btn) = document.get_element_by_id(id) else {
                log::error!("Missing #{id}, its action is unavailable");
                return;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                action(&mut game.borrow_mut().driver);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        };

        bind("start-btn", Driver::press_start);
        bind("next-btn", Driver::press_advance);
        bind("replay-btn", Driver::press_replay);
    }

    fn setup_resize(window: &web_sys::Window, canvas: Option<HtmlCanvasElement>, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let viewport = viewport_of(&window);
            let size = physical_size(&window, viewport);
            if let Some(canvas) = &canvas {
                canvas.set_width(size.0);
                canvas.set_height(size.1);
            }

            let mut g = game.borrow_mut();
            g.driver.resize(viewport);
            if let Some(document) = window.document() {
                g.driver.set_protected_zone(portrait_rect(&document));
            }
            if let Some(rs) = g.render_state.as_mut() {
                rs.resize(size.0, size.1, (viewport.width, viewport.height));
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Heart Catch (native) starting...");
    log::info!("Native mode runs a headless session - serve the wasm build for the real page");

    headless::run(0xC0FFEE);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted session: a player who taps the heart every so often and reads
/// the letter straight through.
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use heart_catch::consts::SIM_DT;
    use heart_catch::platform::HudSink;
    use heart_catch::renderer::VertexBatch;
    use heart_catch::sim::{GamePhase, LetterSequencer, Viewport};
    use heart_catch::{Driver, Settings};

    /// Frames between taps once the heart is visible
    const REACTION_FRAMES: u32 = 20;
    const MAX_FRAMES: u32 = 60 * 120;

    #[derive(Default)]
    struct LogHud {
        finale_done: bool,
    }

    impl HudSink for LogHud {
        fn progress(&mut self, collected: u32, target: u32) {
            log::info!("Progress {collected}/{target}");
        }

        fn celebrate(&mut self) {}

        fn phase_changed(&mut self, from: GamePhase, to: GamePhase) {
            log::info!("HUD: {:?} -> {:?}", from, to);
        }

        fn letter(&mut self, letter: Option<&LetterSequencer>) {
            if let Some(letter) = letter.filter(|l| l.chunk_complete() && !l.is_done()) {
                log::info!("Letter: {}", letter.current_text());
            }
        }

        fn finale_hidden(&mut self) {
            log::info!("Finale faded out");
            self.finale_done = true;
        }
    }

    pub fn run(seed: u64) {
        let mut driver = Driver::new(seed, Settings::load(), Viewport::new(800.0, 600.0));
        let mut hud = LogHud::default();
        let mut batch = VertexBatch::new(Settings::default().quality.heart_segments());
        let mut visible_for = 0;
        let mut peak_vertices = 0;

        driver.press_start();
        for _ in 0..MAX_FRAMES {
            let state = driver.state();
            match state.phase {
                GamePhase::Playing if state.actor.alive => {
                    visible_for += 1;
                    if visible_for >= REACTION_FRAMES {
                        let pos = state.actor.pos;
                        driver.queue_tap(pos);
                        visible_for = 0;
                    }
                }
                GamePhase::LetterOpen => {
                    if state.letter.as_ref().is_some_and(|l| l.awaiting_advance()) {
                        driver.press_advance();
                    }
                }
                _ => {}
            }

            driver.update(SIM_DT, &mut hud);
            driver.draw(&mut batch);
            peak_vertices = peak_vertices.max(batch.vertices().len());

            if hud.finale_done {
                break;
            }
        }

        let state = driver.state();
        log::info!(
            "Session over after {} ticks in {:?} ({} collected, peak {} vertices)",
            state.time_ticks,
            state.phase,
            state.collected,
            peak_vertices
        );
    }
}
