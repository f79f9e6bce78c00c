//! Game state and core simulation types
//!
//! `GameState` is the simulation context: it owns the run ledger, the fixed
//! player/companion entities and the dynamic projectile, enemy and effect
//! stores. Nothing here is global; the caller owns the state and passes it to
//! [`super::tick::advance`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::difficulty::DifficultyDirector;
use super::profiles::{CharacterId, CompanionId, CompanionProfile};
use crate::audio::SoundEffect;
use crate::consts::*;

/// Packed 0xRRGGBBAA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const EXPLOSION: Color = Color::rgb(0xff, 0xdd, 0x66);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xff)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Reset but waiting on the start screen
    #[default]
    Ready,
    /// Active gameplay
    Running,
    /// Health reached zero
    GameOver,
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    Companion(CompanionId),
}

/// Enemy movement pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyBehavior {
    Straight,
    Zigzag,
}

/// What created an effect (drives renderer styling only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Explosion,
    Spark,
    SwitchFlash,
}

/// Notifications produced during a step, drained by the session
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Fire-and-forget sound cue
    Sound(SoundEffect),
    /// Best score improved to the given value
    BestScore(u64),
    /// Health reached zero; run stopped
    GameOver { score: u64 },
    CharacterSwitched(CharacterId),
    AutoFireToggled(bool),
}

/// The player-controlled character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
    pub fire_cooldown: f32,
    pub character: CharacterId,
}

impl Default for Player {
    fn default() -> Self {
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
        Self {
            pos: Vec2::new(FIELD_WIDTH / 2.0 - size.x / 2.0, GROUND_Y - size.y),
            vel: Vec2::ZERO,
            size,
            on_ground: true,
            fire_cooldown: 0.0,
            character: CharacterId::default(),
        }
    }
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// One of the two companions flanking the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Companion {
    pub id: CompanionId,
    /// Top-left corner
    pub pos: Vec2,
    pub fire_cooldown: f32,
}

impl Companion {
    /// Companion standing at its slot next to `player`
    pub fn beside(id: CompanionId, player: &Player) -> Self {
        let profile = id.profile();
        Self {
            id,
            pos: Vec2::new(
                Self::target_x(profile, player),
                GROUND_Y - profile.size.y,
            ),
            fire_cooldown: 0.0,
        }
    }

    pub fn profile(&self) -> &'static CompanionProfile {
        self.id.profile()
    }

    /// Left edge the companion eases toward
    pub fn target_x(profile: &CompanionProfile, player: &Player) -> f32 {
        player.center().x + profile.offset_x - profile.size.x / 2.0
    }

    pub fn size(&self) -> Vec2 {
        self.profile().size
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size())
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size() / 2.0
    }
}

/// A projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Circle center
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Color,
    /// Streak drawn behind companion shots
    pub trail: Option<Color>,
    pub owner: ProjectileOwner,
    pub damage: f32,
}

/// An enemy ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub behavior: EnemyBehavior,
    pub zigzag_phase: f32,
    pub health: f32,
    /// Seconds of white flash left (visual only)
    pub hit_flash: f32,
}

impl Enemy {
    pub fn new(id: u32, x: f32, behavior: EnemyBehavior, speed: f32, drift: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(x, ENEMY_SPAWN_Y),
            vel: Vec2::new(drift, speed),
            size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            behavior,
            zigzag_phase: 0.0,
            health: ENEMY_HEALTH,
            hit_flash: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// An expanding explosion / spark ring (visual only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: u32,
    pub kind: EffectKind,
    pub pos: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub alpha: f32,
    pub color: Color,
    /// Seconds since creation
    pub life: f32,
    pub duration: f32,
}

impl Effect {
    pub fn explosion(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            kind: EffectKind::Explosion,
            pos,
            radius: 0.0,
            max_radius: 120.0,
            alpha: 0.8,
            color: Color::EXPLOSION,
            life: 0.0,
            duration: 0.45,
        }
    }

    pub fn spark(id: u32, pos: Vec2, color: Color) -> Self {
        Self {
            id,
            kind: EffectKind::Spark,
            pos,
            radius: 0.0,
            max_radius: 60.0,
            alpha: 0.6,
            color,
            life: 0.0,
            duration: 0.25,
        }
    }

    pub fn switch_flash(id: u32, pos: Vec2, color: Color) -> Self {
        Self {
            id,
            kind: EffectKind::SwitchFlash,
            pos,
            radius: 10.0,
            max_radius: 100.0,
            alpha: 0.6,
            color,
            life: 0.0,
            duration: 0.25,
        }
    }

    /// 0 at creation, 1 at expiry
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            self.life / self.duration
        } else {
            1.0
        }
    }

    pub fn is_expired(&self) -> bool {
        self.life >= self.duration
    }
}

/// Per-run ledger: score, health, difficulty ramp and mode flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    /// Remaining lives, fractional (see `CharacterProfile::damage_taken`)
    pub health: f32,
    /// Carried across runs
    pub best_score: u64,
    pub difficulty: DifficultyDirector,
    pub phase: GamePhase,
    /// Companions fire on their own when enabled
    pub auto_fire: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            score: 0,
            health: MAX_LIVES,
            best_score: 0,
            difficulty: DifficultyDirector::default(),
            phase: GamePhase::Ready,
            auto_fire: false,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed; every reset reseeds from it
    pub seed: u64,
    pub run: RunState,
    pub player: Player,
    pub companions: [Companion; 2],
    /// Live projectiles, in creation order
    pub projectiles: Vec<Projectile>,
    /// Live enemies, in spawn order
    pub enemies: Vec<Enemy>,
    /// Live effects (not gameplay-affecting)
    pub effects: Vec<Effect>,
    /// Pending notifications for the session
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a fresh state waiting on the start screen
    pub fn new(seed: u64) -> Self {
        let player = Player::default();
        let companions = CompanionId::ALL.map(|id| Companion::beside(id, &player));
        let mut state = Self {
            seed,
            run: RunState::default(),
            player,
            companions,
            projectiles: Vec::new(),
            enemies: Vec::new(),
            effects: Vec::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        state.reset(false);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reinitialize the run, keeping the best score.
    ///
    /// With `start_immediately` the run enters `Running`; otherwise it waits
    /// in `Ready` for the start screen.
    pub fn reset(&mut self, start_immediately: bool) {
        let best_score = self.run.best_score;
        self.run = RunState {
            best_score,
            ..RunState::default()
        };
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.next_id = 1;
        self.projectiles.clear();
        self.enemies.clear();
        self.effects.clear();
        self.events.clear();

        self.player = Player::default();
        self.position_companions();

        if start_immediately {
            self.run.phase = GamePhase::Running;
            self.events.push(GameEvent::Sound(SoundEffect::Music));
        }
        log::debug!(
            "Run reset (seed {}, running: {})",
            self.seed,
            start_immediately
        );
    }

    /// Reset with a new seed
    pub fn reset_with_seed(&mut self, seed: u64, start_immediately: bool) {
        self.seed = seed;
        self.reset(start_immediately);
    }

    /// Snap companions to their slots with staggered cooldowns
    fn position_companions(&mut self) {
        for i in 0..self.companions.len() {
            let id = CompanionId::ALL[i];
            let mut companion = Companion::beside(id, &self.player);
            let stagger: f32 = self.rng.random_range(0.4..1.2);
            companion.fire_cooldown = id.profile().fire_cooldown * stagger;
            self.companions[i] = companion;
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.phase == GamePhase::Running
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Seed the best score from persistent storage
    pub fn set_best_score(&mut self, best: u64) {
        self.run.best_score = best;
    }

    /// Credit a destroyed enemy
    pub fn award_kill(&mut self) {
        self.run.score += KILL_REWARD;
        self.register_best_score();
    }

    /// Raise the best score if the current score beats it
    pub fn register_best_score(&mut self) -> bool {
        if self.run.score > self.run.best_score {
            self.run.best_score = self.run.score;
            self.events.push(GameEvent::BestScore(self.run.best_score));
            true
        } else {
            false
        }
    }

    /// Subtract `amount` from health, clamping at zero.
    ///
    /// Returns true if this call ended the run.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        self.run.health = (self.run.health - amount.max(0.0)).clamp(0.0, MAX_LIVES);
        if self.run.health <= 0.0 && self.run.phase == GamePhase::Running {
            self.run.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver {
                score: self.run.score,
            });
            log::info!(
                "Game over: score {} (best {})",
                self.run.score,
                self.run.best_score
            );
            return true;
        }
        false
    }

    /// Alternate the active character. Only allowed mid-run.
    pub fn switch_character(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let next = self.player.character.other();
        self.player.character = next;
        self.spawn_switch_flash();
        self.events.push(GameEvent::Sound(SoundEffect::Switch));
        self.events.push(GameEvent::CharacterSwitched(next));
        log::debug!("Switched character to {}", next.as_str());
        true
    }

    /// Flip companion auto-fire. Turning it on fires a volley right away.
    pub fn toggle_auto_fire(&mut self) -> bool {
        self.run.auto_fire = !self.run.auto_fire;
        self.events
            .push(GameEvent::AutoFireToggled(self.run.auto_fire));
        log::info!("Companion auto-fire: {}", self.run.auto_fire);
        if self.run.auto_fire {
            self.fire_companion_volley();
        }
        self.run.auto_fire
    }
}
