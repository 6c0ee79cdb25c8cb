//! Synthetic alert tones.
//!
//! A pattern is a short sequence of sine tones. Each tone starts
//! [`STAGGER_FACTOR`] tone-lengths after the previous one, so neighbours
//! overlap, and carries a single envelope: a 10 ms linear attack to
//! [`PEAK_GAIN`], an exponential decay to [`FLOOR_GAIN`] and a 10 ms linear
//! release to silence.

use std::f32::consts::TAU;

pub const PEAK_GAIN: f32 = 0.1;
pub const FLOOR_GAIN: f32 = 0.01;
pub const STAGGER_FACTOR: f32 = 0.3;

const ATTACK_SECONDS: f32 = 0.01;
const RELEASE_SECONDS: f32 = 0.01;

/// Sequence of sine tones of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct TonePattern {
    /// Tone frequencies in Hz, in playing order.
    pub frequencies: Vec<f32>,
    /// Length of every tone in seconds.
    pub tone_seconds: f32,
}

impl TonePattern {
    /// Ascending three-tone alert.
    pub fn three_tone() -> Self {
        Self {
            frequencies: vec![600.0, 800.0, 1000.0],
            tone_seconds: 0.15,
        }
    }

    /// High-pitched two-tone alert.
    pub fn high_two_tone() -> Self {
        Self {
            frequencies: vec![1000.0, 1200.0],
            tone_seconds: 0.25,
        }
    }

    /// Standard two-tone alert.
    pub fn standard_two_tone() -> Self {
        Self {
            frequencies: vec![800.0, 1000.0],
            tone_seconds: 0.2,
        }
    }

    /// Multiplies every frequency by `factor`.
    pub fn shifted(mut self, factor: f32) -> Self {
        for frequency in &mut self.frequencies {
            *frequency *= factor;
        }
        self
    }

    /// Total duration from the first onset to the end of the last tone.
    pub fn total_seconds(&self) -> f32 {
        match self.frequencies.len() {
            0 => 0.0,
            count => (count - 1) as f32 * self.tone_seconds * STAGGER_FACTOR + self.tone_seconds,
        }
    }

    /// Renders the pattern into a mono buffer at `sample_rate`.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate as f32;
        let total_len = (self.total_seconds() * rate).round() as usize;
        let tone_len = (self.tone_seconds * rate).round() as usize;
        let mut buffer = vec![0.0f32; total_len];

        for (index, frequency) in self.frequencies.iter().enumerate() {
            let onset = (index as f32 * self.tone_seconds * STAGGER_FACTOR * rate).round() as usize;
            let end = (onset + tone_len).min(total_len);
            for (offset, sample) in buffer[onset.min(end)..end].iter_mut().enumerate() {
                let time = offset as f32 / rate;
                *sample += envelope(time, self.tone_seconds) * (TAU * frequency * time).sin();
            }
        }

        buffer
    }
}

/// Gain of a tone of length `duration` at `time` seconds after its onset.
pub fn envelope(time: f32, duration: f32) -> f32 {
    let decay_end = (duration - RELEASE_SECONDS).max(ATTACK_SECONDS);
    if time < 0.0 || time >= duration {
        0.0
    } else if time < ATTACK_SECONDS {
        PEAK_GAIN * time / ATTACK_SECONDS
    } else if time < decay_end {
        let progress = (time - ATTACK_SECONDS) / (decay_end - ATTACK_SECONDS);
        PEAK_GAIN * (FLOOR_GAIN / PEAK_GAIN).powf(progress)
    } else {
        let remaining = (duration - time) / (duration - decay_end).max(f32::EPSILON);
        FLOOR_GAIN * remaining.clamp(0.0, 1.0)
    }
}
