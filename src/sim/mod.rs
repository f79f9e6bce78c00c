//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies; side effects leave as
//!   [`GameEvent`]s

pub mod collision;
pub mod difficulty;
pub mod input;
pub mod profiles;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Rect, circle_rect_overlap, resolve_collisions};
pub use difficulty::DifficultyDirector;
pub use input::{Control, InputAction, InputState, TapState};
pub use profiles::{CharacterId, CharacterProfile, CompanionId, CompanionProfile};
pub use state::{
    Color, Companion, Effect, EffectKind, Enemy, EnemyBehavior, GameEvent, GamePhase, GameState,
    Player, Projectile, ProjectileOwner, RunState,
};
pub use tick::advance;
