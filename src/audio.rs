//! Audio cues
//!
//! The simulation only names cues ([`SoundEffect`]); whoever drives the game
//! supplies an [`AudioSink`] that turns them into sound. On the web that is
//! [`AudioManager`], which synthesizes every cue with Web Audio oscillators so
//! no asset files are needed.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Sound cue names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Any projectile fired (player or companion)
    Shoot,
    /// Enemy destroyed or rammed into the squad
    Explosion,
    /// Character switch, also played on start/restart
    Switch,
    /// Background theme, restarted at the start of each run
    Music,
}

impl SoundEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::Explosion => "explosion",
            SoundEffect::Switch => "switch",
            SoundEffect::Music => "music",
        }
    }

    /// Base loudness of each cue before user volume is applied
    pub fn base_gain(&self) -> f32 {
        match self {
            SoundEffect::Shoot => 0.5,
            SoundEffect::Explosion => 0.6,
            SoundEffect::Switch => 0.45,
            SoundEffect::Music => 0.35,
        }
    }
}

/// Fire-and-forget sound output. Implementations must never block.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Apply volume preferences
    fn apply_settings(&mut self, _settings: &Settings) {}

    fn set_muted(&mut self, _muted: bool) {}
}

/// Discards every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Records cues in order (headless runs and tests)
impl AudioSink for Vec<SoundEffect> {
    fn play(&mut self, effect: SoundEffect) {
        self.push(effect);
    }
}

/// Effective gain for a cue given user volumes
pub fn cue_volume(effect: SoundEffect, settings: &Settings, muted: bool) -> f32 {
    if muted {
        return 0.0;
    }
    let channel = match effect {
        SoundEffect::Music => settings.music_volume,
        _ => settings.sfx_volume,
    };
    (effect.base_gain() * settings.master_volume * channel).clamp(0.0, 1.0)
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect, cue_volume};
    use crate::settings::Settings;

    /// Web Audio synthesizer
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        settings: Settings,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                settings: Settings::default(),
                muted: false,
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Shot - short descending blip
        fn play_shoot(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 880.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency().set_value_at_time(880.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(320.0, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Explosion - low rumble plus crack
        fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.frequency().set_value_at_time(100.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(30.0, t + 0.4)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.5).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.4, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.15).ok();
            }
        }

        /// Switch - rising two-note chirp
        fn play_switch(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [520.0, 780.0].iter().enumerate() {
                let delay = i as f64 * 0.06;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.15).ok();
                }
            }
        }

        /// Theme - one pass of a short arpeggio
        fn play_music(&self, ctx: &AudioContext, vol: f32) {
            const MOTIF: [f32; 8] = [262.0, 330.0, 392.0, 523.0, 392.0, 330.0, 294.0, 392.0];
            for (i, freq) in MOTIF.iter().enumerate() {
                let delay = i as f64 * 0.18;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.16)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.18).ok();
                }
            }
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, effect: SoundEffect) {
            let vol = cue_volume(effect, &self.settings, self.muted);
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers start the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Shoot => self.play_shoot(ctx, vol),
                SoundEffect::Explosion => self.play_explosion(ctx, vol),
                SoundEffect::Switch => self.play_switch(ctx, vol),
                SoundEffect::Music => self.play_music(ctx, vol),
            }
        }

        fn apply_settings(&mut self, settings: &Settings) {
            self.settings = settings.clone();
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }
}
