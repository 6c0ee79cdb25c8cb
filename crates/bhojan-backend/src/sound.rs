//! Alert sound playback with a shared mute preference.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use bhojan_audio::{decode::decode_for_output, mixer::apply_gain, tone::TonePattern};
use bhojan_bridge::{config::SoundConfig, feed::Role, sound::SoundCue};

use crate::api::NotificationApi;

/// Upper bound for a downloaded alert asset.
const MAX_ASSET_BYTES: usize = 2 * 1024 * 1024;

/// Process-wide mute flag, shared by everything that may play a sound.
#[derive(Debug, Clone, Default)]
pub struct MutePreference(Arc<AtomicBool>);

impl MutePreference {
    pub fn new(muted: bool) -> Self {
        Self(Arc::new(AtomicBool::new(muted)))
    }

    pub fn is_muted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::Relaxed)
    }
}

/// Synthetic fallback pattern for `role`, pitched for `cue`.
pub fn tone_pattern(role: Role, cue: SoundCue) -> TonePattern {
    let base = match role {
        Role::Admin => TonePattern::three_tone(),
        Role::Delivery => TonePattern::high_two_tone(),
        Role::Customer => TonePattern::standard_two_tone(),
    };
    base.shifted(cue.pitch_shift())
}

/// Plays alert sounds without ever blocking or failing the caller.
#[derive(Debug, Clone)]
pub struct SoundEngine {
    api: NotificationApi,
    mute: MutePreference,
    assets_path: String,
    volume: f32,
}

impl SoundEngine {
    pub fn new(api: NotificationApi, mute: MutePreference, config: &SoundConfig) -> Self {
        let mut assets_path = config.assets_path.clone();
        if !assets_path.is_empty() && !assets_path.ends_with('/') {
            assets_path.push('/');
        }
        Self {
            api,
            mute,
            assets_path,
            volume: config.volume.clamp(0.0, 1.0),
        }
    }

    pub fn mute(&self) -> &MutePreference {
        &self.mute
    }

    fn asset_path(&self, key: &str) -> String {
        format!("{}{key}.mp3", self.assets_path)
    }

    /// Plays the alert for `cue`. A no-op while muted. Must be called within
    /// a tokio runtime; the download and playback run in the background.
    pub fn play(&self, role: Role, cue: SoundCue) {
        if self.mute.is_muted() {
            log::debug!("Muted, not playing {cue:?}");
            return;
        }

        let engine = self.clone();
        tokio::spawn(async move {
            let asset = engine.fetch_asset(role, cue).await;
            engine.play_resolved(role, cue, asset);
        });
    }

    /// Downloads the cue's recording, falling back to the role's default
    /// recording.
    async fn fetch_asset(&self, role: Role, cue: SoundCue) -> Option<Vec<u8>> {
        let mut keys = vec![cue.asset_key(role)];
        let default_key = SoundCue::default_asset_key(role);
        if !keys.contains(&default_key) {
            keys.push(default_key);
        }

        for key in keys {
            let path = self.asset_path(key);
            match self.api.fetch_asset(&path, MAX_ASSET_BYTES).await {
                Ok(bytes) => return Some(bytes),
                Err(error) => log::debug!("Alert asset {path} unavailable: {error}"),
            }
        }
        None
    }

    fn play_resolved(&self, role: Role, cue: SoundCue, asset: Option<Vec<u8>>) {
        let pattern = tone_pattern(role, cue);
        let volume = self.volume;

        bhojan_audio::device::spawn_default_output_playback(move |sample_rate| {
            let Some(bytes) = asset else {
                log::debug!("Using synthetic tones for {cue:?}");
                return pattern.render(sample_rate);
            };
            match decode_for_output(bytes, sample_rate) {
                Ok(mut samples) => {
                    apply_gain(&mut samples, volume);
                    samples
                }
                Err(error) => {
                    log::debug!("Could not decode alert for {cue:?} ({error}), using tones");
                    pattern.render(sample_rate)
                }
            }
        });
    }
}
