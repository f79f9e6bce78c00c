//! Universo AL entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent};

    use universo_al::audio::AudioManager;
    use universo_al::highscores::LocalStorageStore;
    use universo_al::sim::{Control, GameEvent};
    use universo_al::{Session, Settings};

    type WebSession = Session<LocalStorageStore, AudioManager>;

    struct Game {
        session: WebSession,
        last_time: f64,
        last_hud: Option<universo_al::Hud>,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                session: Session::new(seed, Settings::load(), LocalStorageStore, AudioManager::new()),
                last_time: 0.0,
                last_hud: None,
            }
        }

        fn update(&mut self, dt: f32) {
            self.session.advance(dt);
            for event in self.session.drain_notifications() {
                if let GameEvent::GameOver { score } = event {
                    log::info!("Game over with {} points", score);
                    set_overlay_visible("game-over", true);
                }
            }
        }

        fn update_hud(&mut self) {
            let hud = self.session.hud();
            if self.last_hud.as_ref() == Some(&hud) {
                return;
            }
            let Some(document) = document() else { return };

            set_text(&document, "score-value", &hud.score_text());
            set_text(&document, "best-score-value", &hud.best_score_text());
            set_text(&document, "lives-value", &hud.hearts.to_string());
            set_text(&document, "character-name", hud.character_name);
            if let Some(el) = document.get_element_by_id("auto-fire") {
                let _ = el.class_list().toggle_with_force("active", hud.auto_fire);
            }

            self.last_hud = Some(hud);
        }

        fn restart(&mut self, seed: u64) {
            self.session.restart(seed);
            self.last_time = 0.0;
        }
    }

    fn document() -> Option<Document> {
        web_sys::window().and_then(|w| w.document())
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_overlay_visible(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    fn new_seed() -> u64 {
        js_sys::Date::now() as u64
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Universo AL starting...");

        let Some(document) = document() else {
            log::error!("No document - cannot start");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let game = Rc::new(RefCell::new(Game::new(new_seed())));
        game.borrow_mut().update_hud();
        set_overlay_visible("start-overlay", true);
        set_overlay_visible("game-over", false);

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_focus_handlers(game.clone());

        request_animation_frame(game);
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if matches!(code.as_str(), "ArrowUp" | "ArrowLeft" | "ArrowRight" | "Space") {
                    event.prevent_default();
                }
                if let Some(control) = Control::from_key_code(&code) {
                    game.borrow_mut().session.handle_input_event(control, true);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(control) = Control::from_key_code(&event.code()) {
                    game.borrow_mut().session.handle_input_event(control, false);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // First frame after a (re)start integrates nothing
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            // Outside a run the step is a no-op but the input clock still ticks
            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else { return };

        if let Some(btn) = document.get_element_by_id("start-button") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.session.start();
                g.last_time = 0.0;
                set_overlay_visible("start-overlay", false);
                set_overlay_visible("game-over", false);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("restart-button") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = new_seed();
                game.borrow_mut().restart(seed);
                set_overlay_visible("game-over", false);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let visible = document_clone.visibility_state() == web_sys::VisibilityState::Visible;
                let mut g = game.borrow_mut();
                g.session.set_visible(visible);
                // Don't integrate the time spent hidden as one step
                g.last_time = 0.0;
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside): held keys would otherwise stick
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().session.release_all_inputs();
                log::debug!("Inputs released (window blur)");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window focus: undo the blur mute
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().session.restore_focus();
                log::debug!("Audio restored (window focus)");
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
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
    log::info!("Universo AL (native) starting...");
    log::info!("Native mode runs a headless demo - serve the wasm build to play");

    let score = headless_demo(0x5eed, 120.0);
    println!("Demo finished with score {}", universo_al::format_score(score));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run at 60 Hz: companions on auto-fire, the player strafing and
/// shooting, until game over or `seconds` elapse. Returns the final score.
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo(seed: u64, seconds: f32) -> u64 {
    use universo_al::audio::NullAudio;
    use universo_al::sim::{Control, GameEvent};
    use universo_al::{MemoryStore, Session, Settings};

    const DT: f32 = 1.0 / 60.0;
    // Frames between direction changes
    const STRAFE_FRAMES: u32 = 120;

    let mut session = Session::new(seed, Settings::load(), MemoryStore::new(), NullAudio);
    session.start();
    session.handle_modifier_double_tap();
    session.handle_input_event(Control::Fire, true);

    let frames = (seconds / DT) as u32;
    let mut direction = Control::Right;
    session.handle_input_event(direction, true);

    for frame in 0..frames {
        if frame > 0 && frame % STRAFE_FRAMES == 0 {
            session.handle_input_event(direction, false);
            direction = match direction {
                Control::Right => Control::Left,
                _ => Control::Right,
            };
            session.handle_input_event(direction, true);
        }
        session.advance(DT);
        let mut game_over = false;
        for event in session.drain_notifications() {
            match event {
                GameEvent::GameOver { .. } => game_over = true,
                other => log::debug!("Demo event: {:?}", other),
            }
        }
        if game_over {
            log::info!("Demo ended by game over after {:.1}s", frame as f32 * DT);
            break;
        }
    }

    let hud = session.hud();
    log::info!(
        "Demo score {} (best {}), health {:.2}, {} enemies on field",
        hud.score,
        hud.best_score,
        hud.health,
        session.state().enemies.len()
    );
    hud.score
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_headless_demo_is_reproducible() {
        assert_eq!(headless_demo(7, 10.0), headless_demo(7, 10.0));
    }
}
