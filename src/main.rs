//! Fish Frenzy entry point
//!
//! Browser build: owns the game in an `Rc<RefCell<_>>`, wires DOM input and
//! drives the fixed-step loop from `requestAnimationFrame`.
//! Native build: a headless autopilot session against an in-memory backend.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, KeyboardEvent};

    use fish_frenzy::backend::{Backend, Offline};
    use fish_frenzy::consts::*;
    use fish_frenzy::controls::{KeyAction, key_action, set_direction};
    use fish_frenzy::settings::Settings;
    use fish_frenzy::sim::{
        GameEvent, GamePhase, GameState, TickInput, streak_message, tick,
    };

    /// Game instance holding all state
    struct Game {
        state: GameState,
        backend: Backend<Offline>,
        settings: Settings,
        input: TickInput,
        accumulator: f64,
        last_time: f64,
        /// Last popup text and the frame it expires
        popup: Option<(String, u64)>,
    }

    impl Game {
        /// Run simulation ticks for `dt_ms` of wall time
        fn update(&mut self, dt_ms: f64) {
            self.accumulator += dt_ms.min(100.0);

            let mut substeps = 0;
            while self.accumulator >= FRAME_MS && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input);
                self.accumulator -= FRAME_MS;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.toggle_pause = false;
                self.input.focus_lost = false;
            }
            if !self.state.is_playing() {
                self.accumulator = 0.0;
            }

            for event in self.state.drain_events() {
                self.on_event(event);
            }
        }

        fn on_event(&mut self, event: GameEvent) {
            let popup = match &event {
                GameEvent::Streak { multiplier, .. } => streak_message(*multiplier).map(str::to_string),
                GameEvent::NewHighScore { .. } => Some("NEW HIGH SCORE!".to_string()),
                GameEvent::PowerUpCollected { kind, .. } => Some(format!("{}!", kind.label())),
                GameEvent::PowerUpFizzled { .. } => Some("FIZZLE".to_string()),
                GameEvent::ShieldSaved { .. } => Some("SHIELD SAVED YOU!".to_string()),
                GameEvent::StarBounce { .. } => Some("BOUNCE!".to_string()),
                GameEvent::DecoyEaten { .. } => Some("CHOMP!".to_string()),
                _ => None,
            };
            if let Some(text) = popup {
                self.popup = Some((text, self.state.frame + 60));
            }
            log::debug!("{event:?}");
        }

        /// Advance after a win, or record the run and restart after a loss
        fn confirm(&mut self, document: &Document) {
            match self.state.phase {
                GamePhase::Won => {
                    self.state.next_level();
                }
                GamePhase::Lost(_) => {
                    let name = document
                        .get_element_by_id("name-input")
                        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                        .map(|input| input.value())
                        .unwrap_or_default();
                    match self.backend.submit_score(&name, self.state.score, self.state.level) {
                        Ok(Some(rank)) => log::info!("Ranked #{rank}"),
                        Ok(None) => log::info!("Not on the leaderboard"),
                        Err(e) => {
                            set_text(document, "hud-status", &e.to_string());
                            return;
                        }
                    }
                    let high = self.backend.global_high_score();
                    self.state.new_game(high);
                }
                GamePhase::Playing => {}
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let state = &self.state;
            set_text(document, "hud-score", &state.score.to_string());
            set_text(document, "hud-time", &state.time_left.max(0).to_string());
            set_text(document, "hud-level", &state.level.to_string());
            set_text(document, "hud-treats", &state.treats_left().to_string());
            set_text(
                document,
                "hud-combo",
                &format!("x{}", state.combo.multiplier().max(1)),
            );

            let effects: Vec<String> = state
                .effect_timers()
                .iter()
                .map(|t| format!("{} {:.1}s", t.kind.label(), t.remaining_ms / 1000.0))
                .collect();
            set_text(document, "hud-effects", &effects.join("  "));

            let items: Vec<&str> = state
                .field_items()
                .map(|item| self.settings.item_label(item.kind))
                .collect();
            set_text(document, "hud-items", &items.join(" "));

            let status = match state.phase {
                GamePhase::Playing if state.user_paused => "PAUSED".to_string(),
                GamePhase::Playing => match &self.popup {
                    Some((text, until)) if *until > state.frame => text.clone(),
                    _ => String::new(),
                },
                GamePhase::Won => "LEVEL COMPLETE - PRESS ENTER".to_string(),
                GamePhase::Lost(reason) => format!("{} - ENTER INITIALS", reason.message()),
            };
            set_text(document, "hud-status", &status);

            let offline = if self.backend.is_online() { "" } else { "OFFLINE" };
            set_text(document, "hud-offline", offline);
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }

        log::info!("Fish Frenzy starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let mut backend = Backend::new(Offline);
        let boot = backend.boot();
        if boot.maintenance {
            set_text(&document, "hud-status", "Down for maintenance. Check back soon!");
            return;
        }

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let mut state = GameState::with_catalog(seed, boot.catalog);
        state.particles_enabled = settings.particles;
        let high = backend.global_high_score();
        state.new_game(high);
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            state,
            backend,
            settings,
            input: TickInput::default(),
            accumulator: 0.0,
            last_time: 0.0,
            popup: None,
        }));

        setup_input_handlers(&document, game.clone());
        setup_auto_pause(&document, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Fish Frenzy running!");
    }

    fn setup_input_handlers(document: &Document, game: Rc<RefCell<Game>>) {
        // Keyboard: commands and held directions
        {
            let game = game.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let Some(action) = key_action(&key, typing_in_field(&doc)) else {
                    return;
                };
                let mut g = game.borrow_mut();
                match action {
                    KeyAction::Steer => {
                        set_direction(&mut g.input.intent, &key, true);
                        event.prevent_default();
                    }
                    KeyAction::TogglePause => g.input.toggle_pause = true,
                    KeyAction::Confirm => g.confirm(&doc),
                    KeyAction::ToggleAutopilot => {
                        g.input.autopilot = !g.input.autopilot;
                        log::info!("Autopilot: {}", g.input.autopilot);
                    }
                    KeyAction::ToggleMysteryBlocks => {
                        let on = g.settings.toggle_mystery_blocks();
                        log::info!("Mystery blocks: {on}");
                    }
                    KeyAction::ToggleParticles => {
                        let on = g.settings.toggle_particles();
                        g.state.particles_enabled = on;
                    }
                }
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                set_direction(&mut g.input.intent, &event.key(), false);
            });
            let _ =
                document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Focus is in the initials box (or any other text field)
    fn typing_in_field(document: &Document) -> bool {
        document
            .active_element()
            .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA"))
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
                time - g.last_time
            } else {
                FRAME_MS
            };
            g.last_time = time;

            g.update(dt);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(document: &Document, game: Rc<RefCell<Game>>) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.settings.pause_on_blur && g.state.is_playing() {
                        g.input.focus_lost = true;
                        g.input.intent = Default::default();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.pause_on_blur && g.state.is_playing() {
                    g.input.focus_lost = true;
                    g.input.intent = Default::default();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fish Frenzy (native) starting headless demo...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use fish_frenzy::backend::{AdminCredentials, Backend, InMemoryService, Leaderboard};
    use fish_frenzy::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    /// Give up on a level after this many frames (two minutes of play)
    const FRAME_LIMIT: u32 = 60 * 120;
    const MAX_LEVELS: u32 = 10;

    pub fn run(seed: u64) {
        let service = InMemoryService::new(AdminCredentials {
            email: "admin@localhost".to_string(),
            password: "demo".to_string(),
        });
        let mut backend = Backend::with_cache(service, Leaderboard::new());
        let boot = backend.boot();
        if boot.maintenance {
            log::warn!("Service is in maintenance, not starting");
            return;
        }

        let mut state = GameState::with_catalog(seed, boot.catalog);
        state.particles_enabled = false;
        let high = backend.global_high_score();
        state.new_game(high);

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        loop {
            let mut frames = 0;
            while state.is_playing() && frames < FRAME_LIMIT {
                tick(&mut state, &input);
                frames += 1;
                for event in state.drain_events() {
                    match event {
                        GameEvent::PowerUpCollected { kind, .. } => {
                            log::info!("Level {}: picked up {}", state.level, kind.label())
                        }
                        GameEvent::PowerUpFizzled { kind, .. } => {
                            log::info!("Level {}: {} fizzled", state.level, kind.label())
                        }
                        GameEvent::NewHighScore { score } => log::info!("New high score {score}"),
                        _ => {}
                    }
                }
            }

            match state.phase {
                GamePhase::Won if state.level < MAX_LEVELS => {
                    state.next_level();
                }
                GamePhase::Won => break,
                GamePhase::Lost(reason) => {
                    log::info!("Run over on level {}: {}", state.level, reason.message());
                    break;
                }
                GamePhase::Playing => {
                    log::warn!("Level {} did not finish in time, stopping", state.level);
                    break;
                }
            }
        }

        log::info!("Final score {} at level {}", state.score, state.level);
        match backend.submit_score("CPU", state.score, state.level) {
            Ok(rank) => log::info!("Leaderboard rank: {rank:?}"),
            Err(e) => log::warn!("Score not submitted: {e}"),
        }
        for (i, entry) in backend.high_scores().iter().enumerate() {
            log::info!("{}. {} {} (level {})", i + 1, entry.name, entry.score, entry.level);
        }
    }
}
