//! Game session
//!
//! `Session` is the surface a frame driver talks to. It owns the simulation
//! state, the held-input record and the player's settings, and forwards the
//! events each step produces to the audio sink and the best-score store.

use crate::audio::{AudioSink, SoundEffect};
use crate::consts::MAX_LIVES;
use crate::highscores::BestScoreStore;
use crate::sanitize_delta;
use crate::settings::Settings;
use crate::sim::input::{Control, InputAction, InputState, TapState};
use crate::sim::state::{GameEvent, GamePhase, GameState};
use crate::sim::tick;

/// HUD snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u64,
    pub best_score: u64,
    pub health: f32,
    /// Hearts to draw: health rounded up
    pub hearts: u32,
    pub character_name: &'static str,
    pub auto_fire: bool,
    pub phase: GamePhase,
}

impl Hud {
    pub fn score_text(&self) -> String {
        crate::format_score(self.score)
    }

    pub fn best_score_text(&self) -> String {
        crate::format_score(self.best_score)
    }
}

/// A running game wired to its collaborators
pub struct Session<S: BestScoreStore, A: AudioSink> {
    state: GameState,
    input: InputState,
    settings: Settings,
    store: S,
    audio: A,
    /// Music stays silent until the first user gesture
    audio_unlocked: bool,
    /// Events not consumed internally, for the driver (overlays, toasts).
    /// Unbounded: drivers drain it every frame.
    notifications: Vec<GameEvent>,
}

impl<S: BestScoreStore, A: AudioSink> Session<S, A> {
    /// Create a session on the start screen, loading the best score.
    ///
    /// A store failure is logged and the best score starts at 0.
    pub fn new(seed: u64, settings: Settings, store: S, mut audio: A) -> Self {
        let settings = settings.sanitized();
        audio.apply_settings(&settings);

        let best = match store.load() {
            Ok(best) => best,
            Err(e) => {
                log::warn!("Best score unavailable, starting from 0: {}", e);
                0
            }
        };

        let mut state = GameState::new(seed);
        state.set_best_score(best);

        Self {
            state,
            input: InputState::with_double_tap_window(settings.double_tap_window),
            settings,
            store,
            audio,
            audio_unlocked: false,
            notifications: Vec::new(),
        }
    }

    /// Advance one frame of `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        let dt = self.settings.cap_delta(sanitize_delta(dt));
        self.input.tick(dt);
        tick::advance(&mut self.state, &self.input, dt);
        self.flush_events();
    }

    /// Reinitialize the run with the current seed
    pub fn reset(&mut self, start_immediately: bool) {
        self.input.tap = TapState::Idle;
        self.state.reset(start_immediately);
        self.flush_events();
    }

    /// Start button: unlock audio, chime, begin a run
    pub fn start(&mut self) {
        self.unlock_audio();
        self.audio.play(SoundEffect::Switch);
        self.reset(true);
    }

    /// Restart button: begin a fresh run with a new seed
    pub fn restart(&mut self, seed: u64) {
        self.audio.play(SoundEffect::Switch);
        self.input.tap = TapState::Idle;
        self.state.reset_with_seed(seed, true);
        self.flush_events();
        log::info!("Run restarted with seed {}", seed);
    }

    /// Route a key press or release. Returns the gesture it triggered, if any.
    pub fn handle_input_event(&mut self, control: Control, pressed: bool) -> Option<InputAction> {
        if !pressed {
            self.input.release(control);
            return None;
        }
        self.unlock_audio();
        let action = self.input.press(control)?;
        match action {
            InputAction::CompanionVolley => {
                self.handle_combined_fire_modifier();
            }
            InputAction::ToggleAutoFire => {
                self.handle_modifier_double_tap();
            }
            InputAction::SwitchCharacter => {
                self.switch_character();
            }
        }
        Some(action)
    }

    /// Toggle companion auto-fire; returns the new setting
    pub fn handle_modifier_double_tap(&mut self) -> bool {
        let enabled = self.state.toggle_auto_fire();
        self.flush_events();
        enabled
    }

    /// One manual companion volley; returns how many companions fired
    pub fn handle_combined_fire_modifier(&mut self) -> usize {
        let fired = self.state.fire_companion_volley();
        self.flush_events();
        fired
    }

    pub fn switch_character(&mut self) -> bool {
        let switched = self.state.switch_character();
        self.flush_events();
        switched
    }

    /// Window lost focus: drop held keys, optionally mute
    pub fn release_all_inputs(&mut self) {
        self.input.release_all();
        if self.settings.mute_on_blur {
            self.audio.set_muted(true);
        }
    }

    /// Window regained focus: undo the blur mute
    pub fn restore_focus(&mut self) {
        self.audio.set_muted(false);
    }

    /// Tab visibility changed. Music restarts when the tab comes back mid-run.
    pub fn set_visible(&mut self, visible: bool) {
        if !visible {
            if self.settings.mute_on_blur {
                self.audio.set_muted(true);
            }
            return;
        }
        self.audio.set_muted(false);
        if self.audio_unlocked && self.state.is_running() {
            self.audio.play(SoundEffect::Music);
        }
    }

    /// First user gesture. Returns true the first time only.
    pub fn unlock_audio(&mut self) -> bool {
        if self.audio_unlocked {
            return false;
        }
        self.audio_unlocked = true;
        self.audio.set_muted(false);
        if self.state.is_running() {
            self.audio.play(SoundEffect::Music);
        }
        true
    }

    /// Forward queued simulation events to the collaborators
    fn flush_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(SoundEffect::Music) => {
                    if self.audio_unlocked {
                        self.audio.play(SoundEffect::Music);
                    }
                }
                GameEvent::Sound(effect) => self.audio.play(effect),
                GameEvent::BestScore(score) => {
                    if let Err(e) = self.store.save(score) {
                        log::warn!("Keeping best score {} in memory only: {}", score, e);
                    }
                }
                other => self.notifications.push(other),
            }
        }
    }

    /// Take events the driver may want to react to (game over, switches)
    pub fn drain_notifications(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.notifications)
    }

    pub fn hud(&self) -> Hud {
        let run = &self.state.run;
        Hud {
            score: run.score,
            best_score: run.best_score,
            health: run.health,
            hearts: run.health.clamp(0.0, MAX_LIVES).ceil() as u32,
            character_name: self.state.player.character.profile().display_name,
            auto_fire: run.auto_fire,
            phase: run.phase,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for drivers and tests
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::highscores::MemoryStore;
    use crate::sim::profiles::CharacterId;
    use crate::sim::state::{Enemy, EnemyBehavior};

    type TestSession = Session<MemoryStore, Vec<SoundEffect>>;

    fn session_with(store: MemoryStore) -> TestSession {
        Session::new(3, Settings::default(), store, Vec::new())
    }

    fn running_session() -> TestSession {
        let mut session = session_with(MemoryStore::new());
        session.start();
        session.audio_mut().clear();
        for companion in &mut session.state_mut().companions {
            companion.fire_cooldown = 0.0;
        }
        session
    }

    #[test]
    fn test_loads_best_score() {
        let session = session_with(MemoryStore::with_raw("1500"));
        assert_eq!(session.hud().best_score, 1500);
        assert_eq!(session.hud().phase, GamePhase::Ready);
    }

    #[test]
    fn test_corrupt_or_missing_store_falls_back_to_zero() {
        assert_eq!(session_with(MemoryStore::with_raw("oops")).hud().best_score, 0);
        assert_eq!(session_with(MemoryStore::unavailable()).hud().best_score, 0);
    }

    #[test]
    fn test_start_plays_switch_then_music() {
        let mut session = session_with(MemoryStore::new());
        session.start();
        assert!(session.state().is_running());
        assert_eq!(
            session.audio().as_slice(),
            &[SoundEffect::Switch, SoundEffect::Music]
        );
    }

    #[test]
    fn test_music_waits_for_unlock() {
        let mut session = session_with(MemoryStore::new());
        session.reset(true);
        assert!(session.audio().is_empty());

        assert!(session.unlock_audio());
        assert_eq!(session.audio().as_slice(), &[SoundEffect::Music]);
        assert!(!session.unlock_audio());
    }

    #[test]
    fn test_kill_saves_best_score() {
        let mut session = running_session();
        let state = session.state_mut();
        let id = state.next_entity_id();
        let mut enemy = Enemy::new(id, 400.0, EnemyBehavior::Straight, 0.0, 0.0);
        enemy.pos = Vec2::new(400.0, 100.0);
        state.enemies.push(enemy);
        state.player.pos.x = 435.0 - state.player.size.x / 2.0;
        state.player.pos.y = 150.0 - crate::consts::PLAYER_MUZZLE_OFFSET;
        state.player.on_ground = false;
        assert!(state.fire_player_projectile());
        crate::sim::collision::resolve_collisions(state);
        session.flush_events();

        assert_eq!(session.hud().score, 100);
        assert_eq!(session.store().raw(), Some("100"));
        assert!(session.audio().contains(&SoundEffect::Explosion));
    }

    #[test]
    fn test_store_failure_is_not_fatal() {
        let mut session = session_with(MemoryStore::unavailable());
        session.start();
        session.state_mut().award_kill();
        session.flush_events();
        assert_eq!(session.hud().best_score, 100);
    }

    #[test]
    fn test_modifier_tap_fires_volley() {
        let mut session = running_session();
        assert_eq!(
            session.handle_input_event(Control::Modifier, true),
            Some(InputAction::CompanionVolley)
        );
        assert_eq!(session.state().projectiles.len(), 2);
        assert_eq!(
            session.audio().as_slice(),
            &[SoundEffect::Shoot, SoundEffect::Shoot]
        );
    }

    #[test]
    fn test_double_tap_enables_auto_fire() {
        let mut session = running_session();
        session.handle_input_event(Control::Modifier, true);
        session.handle_input_event(Control::Modifier, false);
        session.advance(0.1);
        assert_eq!(
            session.handle_input_event(Control::Modifier, true),
            Some(InputAction::ToggleAutoFire)
        );
        assert!(session.hud().auto_fire);
        assert!(session
            .drain_notifications()
            .contains(&GameEvent::AutoFireToggled(true)));
    }

    #[test]
    fn test_auto_fire_fires_once_per_cooldown() {
        let mut session = running_session();
        let state = session.state_mut();
        state.run.difficulty.spawn_timer = 100.0;
        let id = state.next_entity_id();
        let mut enemy = Enemy::new(id, 100.0, EnemyBehavior::Straight, 0.0, 0.0);
        enemy.pos.y = 50.0;
        state.enemies.push(enemy);

        let companion_shots = |s: &TestSession| {
            s.state()
                .projectiles
                .iter()
                .filter(|p| p.owner != crate::sim::ProjectileOwner::Player)
                .count()
        };

        for _ in 0..10 {
            session.advance(1.0 / 60.0);
        }
        assert_eq!(companion_shots(&session), 0);

        // First tap is a manual volley
        session.handle_input_event(Control::Modifier, true);
        session.handle_input_event(Control::Modifier, false);
        assert_eq!(companion_shots(&session), 2);

        // Second tap enables auto-fire; both companions are still cooling down
        session.handle_input_event(Control::Modifier, true);
        assert!(session.hud().auto_fire);
        assert_eq!(companion_shots(&session), 2);

        for companion in &mut session.state_mut().companions {
            companion.fire_cooldown = 0.0;
        }
        session.advance(1.0 / 60.0);
        assert_eq!(companion_shots(&session), 4);

        session.advance(1.0 / 60.0);
        assert_eq!(companion_shots(&session), 4);
    }

    #[test]
    fn test_switch_only_while_running() {
        let mut session = session_with(MemoryStore::new());
        session.handle_input_event(Control::Switch, true);
        assert_eq!(session.state().player.character, CharacterId::Adrielle);

        session.start();
        session.handle_input_event(Control::Switch, true);
        assert_eq!(session.state().player.character, CharacterId::Luca);
        assert_eq!(session.hud().character_name, "Luca");
    }

    #[test]
    fn test_release_all_on_blur() {
        let mut session = running_session();
        session.handle_input_event(Control::Left, true);
        session.handle_input_event(Control::Fire, true);
        session.release_all_inputs();
        assert!(!session.input().left);
        assert!(!session.input().fire);
    }

    /// Drops cues while muted, like a silenced audio graph
    #[derive(Default)]
    struct MuteSink {
        muted: bool,
        heard: Vec<SoundEffect>,
    }

    impl AudioSink for MuteSink {
        fn play(&mut self, effect: SoundEffect) {
            if !self.muted {
                self.heard.push(effect);
            }
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }

    #[test]
    fn test_focus_return_unmutes() {
        let mut session = Session::new(3, Settings::default(), MemoryStore::new(), MuteSink::default());
        session.start();
        session.release_all_inputs();
        assert!(session.audio().muted);

        session.audio_mut().heard.clear();
        session.handle_input_event(Control::Fire, true);
        session.advance(0.016);
        assert!(session.audio().heard.is_empty());

        session.restore_focus();
        assert!(!session.audio().muted);
        session.handle_input_event(Control::Fire, false);
        session.state_mut().player.fire_cooldown = 0.0;
        session.handle_input_event(Control::Fire, true);
        session.advance(0.016);
        assert!(session.audio().heard.contains(&SoundEffect::Shoot));
    }

    #[test]
    fn test_blur_mute_respects_setting() {
        let settings = Settings {
            mute_on_blur: false,
            ..Settings::default()
        };
        let mut session = Session::new(3, settings, MemoryStore::new(), MuteSink::default());
        session.start();
        session.release_all_inputs();
        assert!(!session.audio().muted);
    }

    #[test]
    fn test_start_screen_tap_does_not_carry_into_run() {
        let mut session = session_with(MemoryStore::new());
        session.handle_input_event(Control::Modifier, true);
        session.handle_input_event(Control::Modifier, false);

        session.start();
        assert_eq!(
            session.handle_input_event(Control::Modifier, true),
            Some(InputAction::CompanionVolley)
        );
        assert!(!session.hud().auto_fire);
    }

    #[test]
    fn test_restart_clears_pending_tap() {
        let mut session = running_session();
        session.state_mut().apply_damage(MAX_LIVES);
        session.advance(0.016);
        session.handle_input_event(Control::Modifier, true);
        session.handle_input_event(Control::Modifier, false);

        session.restart(9);
        assert_eq!(
            session.handle_input_event(Control::Modifier, true),
            Some(InputAction::CompanionVolley)
        );
    }

    #[test]
    fn test_frame_delta_cap() {
        let settings = Settings {
            max_frame_delta: Some(0.05),
            ..Settings::default()
        };
        let mut session = Session::new(3, settings, MemoryStore::new(), Vec::new());
        session.start();
        session.advance(10.0);
        let level = session.state().run.difficulty.level;
        assert!((level - 0.05 * 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_hud_hearts_round_up() {
        let mut session = running_session();
        session.state_mut().apply_damage(0.75);
        let hud = session.hud();
        assert_eq!(hud.health, 2.25);
        assert_eq!(hud.hearts, 3);
        assert_eq!(hud.score_text(), "00000");
    }

    #[test]
    fn test_game_over_notification() {
        let mut session = running_session();
        session.state_mut().apply_damage(MAX_LIVES);
        session.advance(0.016);
        let notes = session.drain_notifications();
        assert_eq!(notes, vec![GameEvent::GameOver { score: 0 }]);
        assert_eq!(session.hud().phase, GamePhase::GameOver);
        assert!(session.drain_notifications().is_empty());
    }
}
