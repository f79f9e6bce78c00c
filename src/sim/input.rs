//! Held controls and edge-triggered input gestures
//!
//! The platform layer translates key events into [`Control`] presses and
//! releases. `InputState` keeps the held flags the step reads and turns a few
//! edges into one-shot [`InputAction`]s:
//! - modifier tap: companion volley
//! - second modifier tap inside the double-tap window: toggle auto-fire
//! - fire pressed while the modifier is held: companion volley
//!
//! The double-tap window is measured on the simulation clock (the same deltas
//! passed to `advance`), never on wall-clock time.

use serde::{Deserialize, Serialize};

/// Default double-tap window (seconds)
pub const DOUBLE_TAP_WINDOW: f32 = 0.35;

/// Logical controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    Left,
    Right,
    Jump,
    Fire,
    /// Companion command key
    Modifier,
    /// Swap the active character
    Switch,
}

impl Control {
    /// Map a `KeyboardEvent.code` to a control (arrows, WASD, Shift, Space, S)
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Control::Left),
            "ArrowRight" | "KeyD" => Some(Control::Right),
            "ArrowUp" | "KeyW" => Some(Control::Jump),
            "Space" => Some(Control::Fire),
            "ShiftLeft" | "ShiftRight" => Some(Control::Modifier),
            "KeyS" => Some(Control::Switch),
            _ => None,
        }
    }
}

/// One-shot actions produced by input edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Both companions fire once, each gated by its own cooldown
    CompanionVolley,
    /// Modifier double-tap
    ToggleAutoFire,
    SwitchCharacter,
}

/// Modifier double-tap detector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TapState {
    #[default]
    Idle,
    /// First tap seen `elapsed` seconds ago
    AwaitingSecondTap { elapsed: f32 },
}

/// Currently held controls plus gesture state
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
    pub modifier: bool,
    pub tap: TapState,
    pub double_tap_window: f32,
}

impl Default for InputState {
    fn default() -> Self {
        Self::with_double_tap_window(DOUBLE_TAP_WINDOW)
    }
}

impl InputState {
    pub fn with_double_tap_window(window: f32) -> Self {
        Self {
            left: false,
            right: false,
            jump: false,
            fire: false,
            modifier: false,
            tap: TapState::Idle,
            double_tap_window: window.max(0.0),
        }
    }

    /// Register a press. Key repeats of an already-held control are ignored.
    pub fn press(&mut self, control: Control) -> Option<InputAction> {
        match control {
            Control::Left => self.left = true,
            Control::Right => self.right = true,
            Control::Jump => self.jump = true,
            Control::Fire => {
                let edge = !self.fire;
                self.fire = true;
                if edge && self.modifier {
                    return Some(InputAction::CompanionVolley);
                }
            }
            Control::Modifier => {
                if self.modifier {
                    return None;
                }
                self.modifier = true;
                return Some(self.modifier_tap());
            }
            Control::Switch => return Some(InputAction::SwitchCharacter),
        }
        None
    }

    pub fn release(&mut self, control: Control) {
        match control {
            Control::Left => self.left = false,
            Control::Right => self.right = false,
            Control::Jump => self.jump = false,
            Control::Fire => self.fire = false,
            Control::Modifier => self.modifier = false,
            Control::Switch => {}
        }
    }

    /// Drop every held control (focus loss)
    pub fn release_all(&mut self) {
        self.left = false;
        self.right = false;
        self.jump = false;
        self.fire = false;
        self.modifier = false;
    }

    /// Advance the double-tap clock
    pub fn tick(&mut self, dt: f32) {
        if let TapState::AwaitingSecondTap { elapsed } = self.tap {
            let elapsed = elapsed + dt;
            self.tap = if elapsed >= self.double_tap_window {
                TapState::Idle
            } else {
                TapState::AwaitingSecondTap { elapsed }
            };
        }
    }

    fn modifier_tap(&mut self) -> InputAction {
        match self.tap {
            TapState::AwaitingSecondTap { elapsed } if elapsed < self.double_tap_window => {
                self.tap = TapState::Idle;
                InputAction::ToggleAutoFire
            }
            _ => {
                self.tap = TapState::AwaitingSecondTap { elapsed: 0.0 };
                InputAction::CompanionVolley
            }
        }
    }
}
