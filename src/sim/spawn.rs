//! Entity creation: enemy spawns, shots and effects
//!
//! Every constructor allocates an id from the state and appends to the
//! matching store, so stores stay in ascending-id order.

use glam::Vec2;
use rand::Rng;

use super::difficulty::DifficultyDirector;
use super::state::{
    Color, Effect, Enemy, EnemyBehavior, GameEvent, GameState, Projectile, ProjectileOwner,
};
use crate::audio::SoundEffect;
use crate::consts::*;

impl GameState {
    /// Launch one ship at the top of the field at the current difficulty
    pub fn spawn_enemy(&mut self) -> u32 {
        self.spawn_enemy_at(self.run.difficulty.level)
    }

    /// Launch one ship whose descent speed is taken from `level`
    pub fn spawn_enemy_at(&mut self, level: f32) -> u32 {
        let behavior = if self.rng.random_bool(0.5) {
            EnemyBehavior::Straight
        } else {
            EnemyBehavior::Zigzag
        };
        let drift = match behavior {
            EnemyBehavior::Straight => 0.0,
            EnemyBehavior::Zigzag => {
                if self.rng.random_bool(0.5) {
                    -ENEMY_ZIGZAG_DRIFT
                } else {
                    ENEMY_ZIGZAG_DRIFT
                }
            }
        };
        let span = FIELD_WIDTH - 2.0 * ENEMY_SPAWN_MARGIN;
        let x = ENEMY_SPAWN_MARGIN + self.rng.random::<f32>() * span;
        let speed = DifficultyDirector::enemy_speed_at(level);

        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, x, behavior, speed, drift));
        id
    }

    /// Fire the active character's shot if the cooldown allows
    pub fn fire_player_projectile(&mut self) -> bool {
        if self.player.fire_cooldown > 0.0 {
            return false;
        }
        let profile = self.player.character.profile();
        let pos = Vec2::new(
            self.player.center().x,
            self.player.pos.y + PLAYER_MUZZLE_OFFSET,
        );
        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            pos,
            vel: Vec2::new(0.0, -profile.projectile_speed),
            radius: profile.projectile_radius,
            color: profile.projectile_color,
            trail: None,
            owner: ProjectileOwner::Player,
            damage: PLAYER_PROJECTILE_DAMAGE,
        });
        self.player.fire_cooldown = profile.fire_cooldown;
        self.events.push(GameEvent::Sound(SoundEffect::Shoot));
        true
    }

    /// Index of the enemy a companion aims at: the one highest on screen.
    /// Ties go to the earliest in the store.
    pub fn companion_target(&self) -> Option<usize> {
        self.enemies
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.pos
                    .y
                    .partial_cmp(&b.pos.y)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }

    /// Fire one shot from companion `index` if its cooldown has elapsed.
    ///
    /// Aims at the companion target's center, or straight up with no enemies.
    pub fn fire_companion(&mut self, index: usize) -> bool {
        let Some(companion) = self.companions.get(index) else {
            return false;
        };
        if companion.fire_cooldown > 0.0 {
            return false;
        }
        let profile = companion.profile();
        let owner = ProjectileOwner::Companion(companion.id);
        let start = companion.center() - Vec2::new(0.0, COMPANION_MUZZLE_OFFSET);

        let straight_up = Vec2::new(0.0, -1.0);
        let dir = match self.companion_target() {
            Some(i) => (self.enemies[i].center() - start).normalize_or(straight_up),
            None => straight_up,
        };

        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            pos: start,
            vel: dir * profile.projectile_speed,
            radius: profile.projectile_radius,
            color: profile.projectile_color,
            trail: Some(profile.projectile_trail),
            owner,
            damage: COMPANION_PROJECTILE_DAMAGE,
        });
        let jitter: f32 = self.rng.random_range(0.8..1.2);
        self.companions[index].fire_cooldown = profile.fire_cooldown * jitter;
        self.events.push(GameEvent::Sound(SoundEffect::Shoot));
        true
    }

    /// Manual volley: each companion fires if its own cooldown allows.
    ///
    /// Returns how many companions fired. Ignored outside a running run.
    pub fn fire_companion_volley(&mut self) -> usize {
        if !self.is_running() {
            return 0;
        }
        (0..self.companions.len())
            .filter(|&i| self.fire_companion(i))
            .count()
    }

    pub fn spawn_explosion(&mut self, pos: Vec2) {
        let id = self.next_entity_id();
        self.effects.push(Effect::explosion(id, pos));
    }

    pub fn spawn_spark(&mut self, pos: Vec2, color: Color) {
        let id = self.next_entity_id();
        self.effects.push(Effect::spark(id, pos, color));
    }

    /// Burst around the player tinted with the new character's shot color
    pub fn spawn_switch_flash(&mut self) {
        let id = self.next_entity_id();
        let color = self.player.character.profile().projectile_color;
        self.effects
            .push(Effect::switch_flash(id, self.player.center(), color));
    }
}
