//! Collision detection and resolution
//!
//! Shapes are axis-aligned rectangles (ships, player, companions) and circles
//! (projectiles). Resolution runs two passes per step: projectiles against
//! ships, then ships against the player and companions.
//!
//! Both passes work in ascending entity-id order and defer removals until the
//! scan is done, so the outcome does not depend on how the stores are ordered.

use glam::Vec2;

use super::state::{Color, GameEvent, GameState};
use crate::audio::SoundEffect;
use crate::consts::*;

/// Axis-aligned rectangle (top-left + size)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap; rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }

    /// Closest point inside the rectangle to `p`
    #[inline]
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max())
    }
}

/// Circle vs rectangle overlap using the closest-point method
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.clamp_point(center);
    center.distance_squared(closest) < radius * radius
}

/// What a single projectile hit did to its enemy
enum HitOutcome {
    Killed { center: Vec2 },
    Damaged { center: Vec2, color: Color },
}

/// Run both collision passes
pub fn resolve_collisions(state: &mut GameState) {
    resolve_projectile_hits(state);
    resolve_enemy_contacts(state);
}

/// Indices of `ids` sorted by id
fn id_order(ids: impl Iterator<Item = u32>) -> Vec<usize> {
    let mut order: Vec<(u32, usize)> = ids.enumerate().map(|(i, id)| (id, i)).collect();
    order.sort_unstable();
    order.into_iter().map(|(_, i)| i).collect()
}

/// Remove entries whose flag is set, preserving order
fn remove_flagged<T>(items: &mut Vec<T>, flags: &[bool]) {
    let mut idx = 0;
    items.retain(|_| {
        let keep = !flags[idx];
        idx += 1;
        keep
    });
}

/// Projectiles against ships. Each projectile hits at most one ship.
pub fn resolve_projectile_hits(state: &mut GameState) {
    if state.projectiles.is_empty() || state.enemies.is_empty() {
        return;
    }

    let mut consumed = vec![false; state.projectiles.len()];
    let mut destroyed = vec![false; state.enemies.len()];
    let mut outcomes = Vec::new();

    for pi in id_order(state.projectiles.iter().map(|p| p.id)) {
        let shot = &state.projectiles[pi];
        let (pos, radius, damage, color) = (shot.pos, shot.radius, shot.damage, shot.color);

        // Lowest-id live ship under the projectile
        let target = state
            .enemies
            .iter()
            .enumerate()
            .filter(|(ei, enemy)| !destroyed[*ei] && circle_rect_overlap(pos, radius, &enemy.rect()))
            .min_by_key(|(_, enemy)| enemy.id)
            .map(|(ei, _)| ei);
        let Some(ei) = target else {
            continue;
        };

        consumed[pi] = true;
        let enemy = &mut state.enemies[ei];
        enemy.health -= damage;
        enemy.hit_flash = HIT_FLASH_DURATION;
        let center = enemy.center();
        if enemy.health <= 0.0 {
            destroyed[ei] = true;
            outcomes.push(HitOutcome::Killed { center });
        } else {
            outcomes.push(HitOutcome::Damaged { center, color });
        }
    }

    remove_flagged(&mut state.projectiles, &consumed);
    remove_flagged(&mut state.enemies, &destroyed);

    for outcome in outcomes {
        match outcome {
            HitOutcome::Killed { center } => {
                state.award_kill();
                state.spawn_explosion(center);
                state.events.push(GameEvent::Sound(SoundEffect::Explosion));
            }
            HitOutcome::Damaged { center, color } => state.spawn_spark(center, color),
        }
    }
}

/// Ships ramming the player or a companion. Each ship deals damage once,
/// checked against the player first. Companion contact costs the player.
pub fn resolve_enemy_contacts(state: &mut GameState) {
    if state.enemies.is_empty() {
        return;
    }

    let player_box = state.player.rect();
    let companion_boxes = state.companions.clone().map(|c| c.rect());
    let damage = CONTACT_DAMAGE * state.player.character.profile().damage_taken;

    let mut rammed = vec![false; state.enemies.len()];
    let mut impacts = Vec::new();
    for ei in id_order(state.enemies.iter().map(|e| e.id)) {
        let enemy_box = state.enemies[ei].rect();
        let hit = player_box.intersects(&enemy_box)
            || companion_boxes.iter().any(|b| b.intersects(&enemy_box));
        if hit {
            rammed[ei] = true;
            impacts.push(state.enemies[ei].center());
        }
    }

    remove_flagged(&mut state.enemies, &rammed);

    for center in impacts {
        state.apply_damage(damage);
        state.spawn_explosion(center);
        state.events.push(GameEvent::Sound(SoundEffect::Explosion));
    }
}
