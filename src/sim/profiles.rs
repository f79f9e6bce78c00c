//! Character and companion stat tables
//!
//! Immutable data selected by id. The player switches between the two
//! characters at runtime; the companions never change.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Color;

/// Playable character ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CharacterId {
    #[default]
    Adrielle,
    Luca,
}

/// Stats for one playable character
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterProfile {
    pub display_name: &'static str,
    /// Max horizontal speed (units/s)
    pub speed: f32,
    /// Vertical velocity applied on jump (negative = up)
    pub jump_impulse: f32,
    pub projectile_speed: f32,
    /// Seconds between shots
    pub fire_cooldown: f32,
    pub projectile_color: Color,
    pub projectile_radius: f32,
    /// Multiplier on contact damage taken
    pub damage_taken: f32,
}

pub static ADRIELLE: CharacterProfile = CharacterProfile {
    display_name: "Adrielle",
    speed: 240.0,
    jump_impulse: -560.0,
    projectile_speed: 560.0,
    fire_cooldown: 0.35,
    projectile_color: Color::rgb(0x8c, 0xe0, 0xff),
    projectile_radius: 10.0,
    damage_taken: 0.75,
};

pub static LUCA: CharacterProfile = CharacterProfile {
    display_name: "Luca",
    speed: 320.0,
    jump_impulse: -600.0,
    projectile_speed: 660.0,
    fire_cooldown: 0.28,
    projectile_color: Color::rgb(0xff, 0xd1, 0x66),
    projectile_radius: 12.0,
    damage_taken: 1.0,
};

impl CharacterId {
    pub fn profile(self) -> &'static CharacterProfile {
        match self {
            CharacterId::Adrielle => &ADRIELLE,
            CharacterId::Luca => &LUCA,
        }
    }

    /// The character a switch alternates to
    pub fn other(self) -> Self {
        match self {
            CharacterId::Adrielle => CharacterId::Luca,
            CharacterId::Luca => CharacterId::Adrielle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.profile().display_name
    }
}

/// Companion ids. Exactly one companion of each kind exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanionId {
    Cat,
    Dog,
}

/// Stats for one companion
#[derive(Debug, Clone, PartialEq)]
pub struct CompanionProfile {
    pub name: &'static str,
    pub size: Vec2,
    /// Horizontal offset of the companion center from the player center
    pub offset_x: f32,
    pub projectile_color: Color,
    pub projectile_trail: Color,
    pub projectile_radius: f32,
    pub projectile_speed: f32,
    pub fire_cooldown: f32,
}

pub static CAT: CompanionProfile = CompanionProfile {
    name: "Nuvem",
    size: Vec2::new(72.0, 78.0),
    offset_x: -120.0,
    projectile_color: Color::rgb(0xff, 0x8d, 0xe0),
    projectile_trail: Color::rgba(255, 141, 224, 115),
    projectile_radius: 9.0,
    projectile_speed: 540.0,
    fire_cooldown: 1.45,
};

pub static DOG: CompanionProfile = CompanionProfile {
    name: "Sol",
    size: Vec2::new(76.0, 80.0),
    offset_x: 120.0,
    projectile_color: Color::rgb(0xff, 0xd4, 0x80),
    projectile_trail: Color::rgba(255, 212, 128, 115),
    projectile_radius: 11.0,
    projectile_speed: 520.0,
    fire_cooldown: 1.65,
};

impl CompanionId {
    /// Fixed companion roster, in update order
    pub const ALL: [CompanionId; 2] = [CompanionId::Cat, CompanionId::Dog];

    pub fn profile(self) -> &'static CompanionProfile {
        match self {
            CompanionId::Cat => &CAT,
            CompanionId::Dog => &DOG,
        }
    }
}
