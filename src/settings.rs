//! Player preferences
//!
//! Persisted separately from the best score in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::input::DOUBLE_TAP_WINDOW;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Controls ===
    /// Seconds allowed between modifier taps to toggle auto-fire
    pub double_tap_window: f32,

    // === Timing ===
    /// Longest frame delta the driver feeds to the simulation (seconds).
    /// `None` integrates whatever elapsed.
    pub max_frame_delta: Option<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            mute_on_blur: true,

            double_tap_window: DOUBLE_TAP_WINDOW,

            max_frame_delta: None,
        }
    }
}

impl Settings {
    /// Clamp every field into its valid range
    pub fn sanitized(mut self) -> Self {
        let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 };
        self.master_volume = unit(self.master_volume);
        self.sfx_volume = unit(self.sfx_volume);
        self.music_volume = unit(self.music_volume);
        if !self.double_tap_window.is_finite() || self.double_tap_window < 0.0 {
            self.double_tap_window = DOUBLE_TAP_WINDOW;
        }
        self.max_frame_delta = self
            .max_frame_delta
            .filter(|cap| cap.is_finite() && *cap > 0.0);
        self
    }

    /// Apply the frame-delta cap
    pub fn cap_delta(&self, dt: f32) -> f32 {
        match self.max_frame_delta {
            Some(cap) => dt.min(cap),
            None => dt,
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "universoAL_settings";

    /// Parse persisted settings, falling back to defaults on bad JSON
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("Settings key {} not available natively", Self::STORAGE_KEY);
        Self::default()
    }
}
