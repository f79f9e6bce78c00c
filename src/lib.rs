//! Universo AL - A night-sky arcade shooter with companion support fire
//!
//! Core modules:
//! - `sim`: Simulation core (entities, step pipeline, collisions, difficulty)
//! - `session`: Wires the simulation to audio, best-score storage and input
//! - `audio`: Sound cues and the Web Audio synth
//! - `highscores`: Best score persistence
//! - `settings`: Player preferences

pub mod audio;
pub mod highscores;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::{BestScoreStore, MemoryStore, StoreError};
pub use session::{Hud, Session};
pub use settings::Settings;

/// Game configuration constants
///
/// Coordinates are screen-space: origin top-left, y grows downward.
pub mod consts {
    /// Play field dimensions
    pub const FIELD_WIDTH: f32 = 960.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Ground line the player and companions stand on
    pub const GROUND_Y: f32 = FIELD_HEIGHT - 80.0;

    /// Global gravity (units/s², pulls toward +y)
    pub const GRAVITY: f32 = 1400.0;

    /// Player hitbox
    pub const PLAYER_WIDTH: f32 = 72.0;
    pub const PLAYER_HEIGHT: f32 = 120.0;
    /// Player may not get closer than this to either side wall
    pub const PLAYER_WALL_MARGIN: f32 = 20.0;
    /// Horizontal velocity multiplier applied per step when no direction is held
    pub const PLAYER_FRICTION: f32 = 0.82;
    /// Below this horizontal speed the player snaps to a stop
    pub const PLAYER_STOP_SPEED: f32 = 10.0;
    /// Acceleration = character speed × this factor
    pub const PLAYER_ACCEL_FACTOR: f32 = 3.0;
    /// Player shots leave from this far below the top of the hitbox
    pub const PLAYER_MUZZLE_OFFSET: f32 = 30.0;

    /// Companion shots leave from this far above the companion center
    pub const COMPANION_MUZZLE_OFFSET: f32 = 6.0;
    /// Exponential smoothing rate for companions following the player (1/s)
    pub const COMPANION_FOLLOW_RATE: f32 = 6.0;

    /// Projectiles survive this far outside the field before being culled
    pub const PROJECTILE_BOUNDS_MARGIN: f32 = 40.0;
    pub const PLAYER_PROJECTILE_DAMAGE: f32 = 2.0;
    pub const COMPANION_PROJECTILE_DAMAGE: f32 = 1.0;

    /// Enemy ship defaults
    pub const ENEMY_WIDTH: f32 = 70.0;
    pub const ENEMY_HEIGHT: f32 = 90.0;
    pub const ENEMY_HEALTH: f32 = 2.0;
    pub const ENEMY_SPAWN_Y: f32 = -100.0;
    /// Spawn x is uniform in [margin, FIELD_WIDTH - margin)
    pub const ENEMY_SPAWN_MARGIN: f32 = 40.0;
    /// Initial sideways speed of zigzag ships
    pub const ENEMY_ZIGZAG_DRIFT: f32 = 80.0;
    /// Peak horizontal speed of the zigzag sinusoid
    pub const ENEMY_ZIGZAG_AMPLITUDE: f32 = 140.0;
    /// Zigzag phase advances at this multiple of elapsed time
    pub const ENEMY_ZIGZAG_RATE: f32 = 3.0;
    /// Side walls bounce ships this far inside the field edge
    pub const ENEMY_WALL_INSET: f32 = 10.0;
    /// Ships are culled once this far below the field
    pub const ENEMY_EXIT_MARGIN: f32 = 120.0;
    /// Duration of the white flash after a ship takes a hit
    pub const HIT_FLASH_DURATION: f32 = 0.35;

    /// Lives and scoring
    pub const MAX_LIVES: f32 = 3.0;
    /// Base damage of a ship ramming the player or a companion
    pub const CONTACT_DAMAGE: f32 = 1.0;
    pub const KILL_REWARD: u64 = 100;
}

/// Clamp an elapsed-time sample to something the simulation can integrate.
///
/// Negative, NaN and infinite samples become zero.
#[inline]
pub fn sanitize_delta(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
}

/// Frame-rate independent lerp factor for exponential smoothing at `rate` per second
#[inline]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// Zero-padded five digit score, as shown on the HUD
pub fn format_score(score: u64) -> String {
    format!("{:05}", score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_delta() {
        assert_eq!(sanitize_delta(0.016), 0.016);
        assert_eq!(sanitize_delta(-1.0), 0.0);
        assert_eq!(sanitize_delta(f32::NAN), 0.0);
        assert_eq!(sanitize_delta(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_smoothing_factor_is_rate_corrected() {
        // Two half steps must land where one full step does
        let full = smoothing_factor(6.0, 0.1);
        let half = smoothing_factor(6.0, 0.05);
        let two_halves = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((full - two_halves).abs() < 1e-6);
        assert_eq!(smoothing_factor(6.0, 0.0), 0.0);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0), "00000");
        assert_eq!(format_score(1200), "01200");
        assert_eq!(format_score(123456), "123456");
    }
}
