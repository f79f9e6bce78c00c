//! Difficulty ramp and enemy spawn timing
//!
//! Two scalars advance monotonically while a run is active: the difficulty
//! level creeps up toward a cap, and the spawn interval shrinks toward a
//! floor each time a ship is launched.

use serde::{Deserialize, Serialize};

/// Difficulty gained per second of play
pub const DIFFICULTY_RATE: f32 = 0.02;
/// Difficulty never exceeds this
pub const MAX_DIFFICULTY: f32 = 8.0;
/// Seconds between spawns at the start of a run
pub const INITIAL_SPAWN_INTERVAL: f32 = 2.8;
/// Spawns never come faster than this
pub const MIN_SPAWN_INTERVAL: f32 = 1.2;
/// Fixed interval reduction per spawn
pub const SPAWN_INTERVAL_STEP: f32 = 0.05;
/// Extra interval reduction per spawn, per difficulty level
pub const SPAWN_INTERVAL_DIFFICULTY_STEP: f32 = 0.005;
/// Enemy descent speed at difficulty 0
pub const ENEMY_BASE_SPEED: f32 = 70.0;
/// Added descent speed per difficulty level
pub const ENEMY_SPEED_PER_LEVEL: f32 = 15.0;

/// Spawn timer plus difficulty ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyDirector {
    pub level: f32,
    /// Counts down to the next spawn
    pub spawn_timer: f32,
    pub spawn_interval: f32,
}

impl Default for DifficultyDirector {
    fn default() -> Self {
        Self {
            level: 0.0,
            // First ship arrives on the first step
            spawn_timer: 0.0,
            spawn_interval: INITIAL_SPAWN_INTERVAL,
        }
    }
}

impl DifficultyDirector {
    /// Advance the timers by `dt`. Returns true when one enemy should spawn.
    ///
    /// `level` is ramped after the spawn check, so a caller that wants the
    /// spawning ship at the pre-ramp difficulty must read it beforehand.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.spawn_timer -= dt;
        let spawn = self.spawn_timer <= 0.0;
        if spawn {
            self.spawn_interval = (self.spawn_interval
                - SPAWN_INTERVAL_STEP
                - self.level * SPAWN_INTERVAL_DIFFICULTY_STEP)
                .max(MIN_SPAWN_INTERVAL);
            self.spawn_timer = self.spawn_interval;
        }
        self.level = (self.level + dt * DIFFICULTY_RATE).min(MAX_DIFFICULTY);
        spawn
    }

    /// Descent speed for a ship spawned at `level`
    pub fn enemy_speed_at(level: f32) -> f32 {
        ENEMY_BASE_SPEED + level * ENEMY_SPEED_PER_LEVEL
    }
}
