//! Simulation step
//!
//! Advances the game by one variable-length frame. Sub-steps run in a fixed
//! order: difficulty, player, companions, projectiles, enemies, effects,
//! collisions.

use glam::Vec2;

use super::collision::resolve_collisions;
use super::input::InputState;
use super::state::{EnemyBehavior, GameState};
use crate::consts::*;
use crate::{sanitize_delta, smoothing_factor};

/// Advance the game state by `dt` seconds.
///
/// Negative or non-finite deltas are treated as zero. Large deltas are
/// integrated as a single step. Does nothing unless the run is active.
pub fn advance(state: &mut GameState, input: &InputState, dt: f32) {
    let dt = sanitize_delta(dt);
    if !state.is_running() {
        return;
    }

    update_difficulty(state, dt);
    update_player(state, input, dt);
    update_companions(state, dt);
    update_projectiles(state, dt);
    update_enemies(state, dt);
    update_effects(state, dt);
    resolve_collisions(state);
}

/// Tick the spawn timer and launch a ship when it fires
pub fn update_difficulty(state: &mut GameState, dt: f32) {
    // Ships use the level in effect before this step's ramp
    let level = state.run.difficulty.level;
    if state.run.difficulty.tick(dt) {
        state.spawn_enemy_at(level);
    }
}

/// Movement, jumping, gravity and firing for the player
pub fn update_player(state: &mut GameState, input: &InputState, dt: f32) {
    let profile = state.player.character.profile();
    let player = &mut state.player;
    let accel = profile.speed * PLAYER_ACCEL_FACTOR;
    let max_speed = profile.speed;

    match (input.left, input.right) {
        (true, false) => player.vel.x = (player.vel.x - accel * dt).max(-max_speed),
        (false, true) => player.vel.x = (player.vel.x + accel * dt).min(max_speed),
        _ => {
            player.vel.x *= PLAYER_FRICTION;
            if player.vel.x.abs() < PLAYER_STOP_SPEED {
                player.vel.x = 0.0;
            }
        }
    }

    player.pos.x += player.vel.x * dt;
    player.pos.x = player.pos.x.clamp(
        PLAYER_WALL_MARGIN,
        FIELD_WIDTH - player.size.x - PLAYER_WALL_MARGIN,
    );

    if input.jump && player.on_ground {
        player.vel.y = profile.jump_impulse;
        player.on_ground = false;
    }

    player.vel.y += GRAVITY * dt;
    player.pos.y += player.vel.y * dt;

    let floor = GROUND_Y - player.size.y;
    if player.pos.y >= floor {
        player.pos.y = floor;
        player.vel.y = 0.0;
        player.on_ground = true;
    }

    player.fire_cooldown = (player.fire_cooldown - dt).max(0.0);

    if input.fire {
        state.fire_player_projectile();
    }
}

/// Companions trail the player and, with auto-fire on, shoot when ready
pub fn update_companions(state: &mut GameState, dt: f32) {
    let follow = smoothing_factor(COMPANION_FOLLOW_RATE, dt);
    for i in 0..state.companions.len() {
        let companion = &mut state.companions[i];
        let profile = companion.profile();
        let target_x = super::state::Companion::target_x(profile, &state.player);
        companion.pos.x += (target_x - companion.pos.x) * follow;
        companion.pos.y = GROUND_Y - profile.size.y;
        companion.fire_cooldown = (companion.fire_cooldown - dt).max(0.0);

        if state.run.auto_fire && !state.enemies.is_empty() && companion.fire_cooldown <= 0.0 {
            state.fire_companion(i);
        }
    }
}

/// True if the projectile has left the field by more than the margin
fn projectile_out_of_bounds(pos: Vec2, radius: f32) -> bool {
    let m = PROJECTILE_BOUNDS_MARGIN;
    pos.y + radius < -m
        || pos.y - radius > FIELD_HEIGHT + m
        || pos.x + radius < -m
        || pos.x - radius > FIELD_WIDTH + m
}

pub fn update_projectiles(state: &mut GameState, dt: f32) {
    for shot in &mut state.projectiles {
        shot.pos += shot.vel * dt;
    }
    state
        .projectiles
        .retain(|p| !projectile_out_of_bounds(p.pos, p.radius));
}

pub fn update_enemies(state: &mut GameState, dt: f32) {
    for enemy in &mut state.enemies {
        if enemy.behavior == EnemyBehavior::Zigzag {
            enemy.zigzag_phase += dt * ENEMY_ZIGZAG_RATE;
            enemy.vel.x = enemy.zigzag_phase.sin() * ENEMY_ZIGZAG_AMPLITUDE;
        }
        enemy.pos += enemy.vel * dt;
        enemy.hit_flash = (enemy.hit_flash - dt).max(0.0);

        if enemy.pos.x < ENEMY_WALL_INSET
            || enemy.pos.x + enemy.size.x > FIELD_WIDTH - ENEMY_WALL_INSET
        {
            enemy.vel.x = -enemy.vel.x;
        }
    }
    state
        .enemies
        .retain(|e| e.pos.y <= FIELD_HEIGHT + ENEMY_EXIT_MARGIN);
}

pub fn update_effects(state: &mut GameState, dt: f32) {
    for effect in &mut state.effects {
        effect.life += dt;
        let progress = effect.progress();
        effect.radius = effect.max_radius * progress.min(1.0);
        effect.alpha = (0.8 - progress).max(0.0);
    }
    state.effects.retain(|e| !e.is_expired());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::Control;
    use crate::sim::state::{Effect, Enemy, GamePhase, Projectile, ProjectileOwner};
    use crate::sim::profiles::CharacterId;
    use crate::sim::state::Color;

    fn running_state() -> GameState {
        let mut state = GameState::new(12345);
        state.reset(true);
        state.drain_events();
        state
    }

    fn shot_at(state: &mut GameState, pos: Vec2) {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos,
            vel: Vec2::ZERO,
            radius: 10.0,
            color: Color::rgb(0, 0, 0),
            trail: None,
            owner: ProjectileOwner::Player,
            damage: 1.0,
        });
    }

    #[test]
    fn test_advance_noop_when_not_running() {
        let mut state = GameState::new(1);
        let before = state.run.clone();
        advance(&mut state, &InputState::default(), 0.5);
        assert_eq!(state.run, before);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_first_step_spawns_enemy() {
        let mut state = running_state();
        advance(&mut state, &InputState::default(), 0.016);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_zero_delta_is_stable() {
        let mut state = running_state();
        advance(&mut state, &InputState::default(), 0.016);
        let player = state.player.clone();
        let enemies = state.enemies.clone();
        // Timer was reset to the interval, so no spawn on a zero step
        advance(&mut state, &InputState::default(), 0.0);
        advance(&mut state, &InputState::default(), -3.0);
        assert_eq!(state.player, player);
        assert_eq!(state.enemies, enemies);
    }

    #[test]
    fn test_player_accelerates_and_clamps() {
        let mut state = running_state();
        let mut input = InputState::default();
        input.press(Control::Right);
        for _ in 0..600 {
            update_player(&mut state, &input, 1.0 / 60.0);
        }
        let max_x = FIELD_WIDTH - PLAYER_WIDTH - PLAYER_WALL_MARGIN;
        assert_eq!(state.player.pos.x, max_x);
        assert_eq!(state.player.vel.x, 240.0);
    }

    #[test]
    fn test_player_friction_stops() {
        let mut state = running_state();
        state.player.vel.x = 200.0;
        let input = InputState::default();
        for _ in 0..30 {
            update_player(&mut state, &input, 1.0 / 60.0);
        }
        assert_eq!(state.player.vel.x, 0.0);
    }

    #[test]
    fn test_jump_and_land() {
        let mut state = running_state();
        let mut input = InputState::default();
        input.press(Control::Jump);
        update_player(&mut state, &input, 1.0 / 60.0);
        assert!(!state.player.on_ground);
        assert!(state.player.vel.y < 0.0);

        input.release(Control::Jump);
        for _ in 0..120 {
            update_player(&mut state, &input, 1.0 / 60.0);
        }
        assert!(state.player.on_ground);
        assert_eq!(state.player.pos.y, GROUND_Y - PLAYER_HEIGHT);
        assert_eq!(state.player.vel.y, 0.0);
    }

    #[test]
    fn test_no_jump_midair() {
        let mut state = running_state();
        state.player.on_ground = false;
        state.player.pos.y -= 200.0;
        state.player.vel.y = 0.0;
        let mut input = InputState::default();
        input.press(Control::Jump);
        update_player(&mut state, &input, 0.01);
        assert!(state.player.vel.y > 0.0);
    }

    #[test]
    fn test_held_fire_respects_cooldown() {
        let mut state = running_state();
        let mut input = InputState::default();
        input.press(Control::Fire);
        // 0.35s cooldown at 10 steps of 0.1s: shots at t=0, 0.4, 0.8
        for _ in 0..10 {
            update_player(&mut state, &input, 0.1);
        }
        assert_eq!(state.projectiles.len(), 3);
    }

    #[test]
    fn test_switch_changes_fire_rate() {
        let mut state = running_state();
        state.switch_character();
        assert_eq!(state.player.character, CharacterId::Luca);
        let mut input = InputState::default();
        input.press(Control::Fire);
        update_player(&mut state, &input, 0.01);
        assert_eq!(state.player.fire_cooldown, 0.28);
        assert_eq!(state.projectiles[0].radius, 12.0);
    }

    #[test]
    fn test_companions_follow_player() {
        let mut state = running_state();
        state.player.pos.x = 100.0;
        for _ in 0..300 {
            update_companions(&mut state, 1.0 / 60.0);
        }
        for companion in &state.companions {
            let target = crate::sim::state::Companion::target_x(companion.profile(), &state.player);
            assert!((companion.pos.x - target).abs() < 0.01);
            assert_eq!(companion.pos.y, GROUND_Y - companion.size().y);
        }
    }

    #[test]
    fn test_companions_hold_fire_without_auto_fire() {
        let mut state = running_state();
        state.spawn_enemy();
        for companion in &mut state.companions {
            companion.fire_cooldown = 0.0;
        }
        update_companions(&mut state, 0.016);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_auto_fire_needs_enemy() {
        let mut state = running_state();
        state.run.auto_fire = true;
        for companion in &mut state.companions {
            companion.fire_cooldown = 0.0;
        }
        update_companions(&mut state, 0.016);
        assert!(state.projectiles.is_empty());

        state.spawn_enemy();
        update_companions(&mut state, 0.016);
        assert_eq!(state.projectiles.len(), 2);
        // Cooldowns reset, so nothing more next step
        update_companions(&mut state, 0.016);
        assert_eq!(state.projectiles.len(), 2);
    }

    #[test]
    fn test_projectile_margin_boundary() {
        let mut state = running_state();
        // Bottom edge exactly at -40: retained
        shot_at(&mut state, Vec2::new(100.0, -PROJECTILE_BOUNDS_MARGIN - 10.0));
        // One unit beyond: removed
        shot_at(&mut state, Vec2::new(200.0, -PROJECTILE_BOUNDS_MARGIN - 11.0));
        // Right side exactly at the margin
        shot_at(&mut state, Vec2::new(FIELD_WIDTH + PROJECTILE_BOUNDS_MARGIN + 10.0, 100.0));
        update_projectiles(&mut state, 0.0);
        assert_eq!(state.projectiles.len(), 2);
        assert_eq!(state.projectiles[0].pos.x, 100.0);
    }

    #[test]
    fn test_projectile_moves_out_next_step() {
        let mut state = running_state();
        shot_at(&mut state, Vec2::new(100.0, -PROJECTILE_BOUNDS_MARGIN - 10.0));
        state.projectiles[0].vel = Vec2::new(0.0, -60.0);
        update_projectiles(&mut state, 1.0 / 60.0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_zigzag_phase_and_wall_bounce() {
        let mut state = running_state();
        let id = state.next_entity_id();
        state
            .enemies
            .push(Enemy::new(id, 400.0, EnemyBehavior::Zigzag, 70.0, 80.0));
        update_enemies(&mut state, 0.1);
        let enemy = &state.enemies[0];
        assert!((enemy.zigzag_phase - 0.3).abs() < 1e-6);
        assert!((enemy.vel.x - 0.3f32.sin() * ENEMY_ZIGZAG_AMPLITUDE).abs() < 1e-3);

        let id = state.next_entity_id();
        let mut straight = Enemy::new(id, 5.0, EnemyBehavior::Straight, 70.0, 0.0);
        straight.vel.x = -50.0;
        state.enemies.push(straight);
        update_enemies(&mut state, 0.01);
        assert_eq!(state.enemies[1].vel.x, 50.0);
    }

    #[test]
    fn test_enemy_leaves_bottom() {
        let mut state = running_state();
        let id = state.next_entity_id();
        let mut enemy = Enemy::new(id, 400.0, EnemyBehavior::Straight, 100.0, 0.0);
        enemy.pos.y = FIELD_HEIGHT + ENEMY_EXIT_MARGIN - 0.5;
        enemy.hit_flash = 0.05;
        state.enemies.push(enemy);
        update_enemies(&mut state, 0.01);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_effect_lifecycle() {
        let mut state = running_state();
        let id = state.next_entity_id();
        state.effects.push(Effect::explosion(id, Vec2::ZERO));
        update_effects(&mut state, 0.225);
        let effect = &state.effects[0];
        assert!((effect.radius - 60.0).abs() < 1e-3);
        assert!((effect.alpha - 0.3).abs() < 1e-5);
        update_effects(&mut state, 0.225);
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_game_over_stops_simulation() {
        let mut state = running_state();
        state.apply_damage(MAX_LIVES);
        assert_eq!(state.run.phase, GamePhase::GameOver);
        let enemies = state.enemies.len();
        advance(&mut state, &InputState::default(), 5.0);
        assert_eq!(state.enemies.len(), enemies);
    }
}
