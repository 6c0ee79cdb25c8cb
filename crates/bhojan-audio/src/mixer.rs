/// Mixes interleaved multi-channel audio samples down to mono.
///
/// Each output frame is the average of its channels. The input slice must
/// contain interleaved samples in the form `[C0, C1, ..., C0, C1, ...]`; a
/// trailing partial frame is ignored. With a single channel the input is
/// copied as is.
///
/// # Returns
/// The mono samples, one per input frame.
pub fn mix_to_mono<T>(samples_frame_data: &[T], channels: usize) -> Vec<T>
where
    T: Copy
        + num_traits::identities::Zero
        + num_traits::FromPrimitive
        + std::ops::Add<Output = T>
        + std::ops::Mul<Output = T>,
{
    if channels <= 1 {
        return samples_frame_data.to_vec();
    }

    let scale = T::from_f32(1.0 / channels as f32).expect("failed to obtain a channel scale");
    samples_frame_data
        .chunks_exact(channels)
        .map(|frame| {
            let sum = frame.iter().fold(T::zero(), |acc, sample| acc + *sample);
            sum * scale
        })
        .collect()
}

/// Scales every sample in place by `gain`.
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    let gain = gain.clamp(0.0, 1.0);
    for sample in samples {
        *sample *= gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_frames_are_averaged() {
        let mono = mix_to_mono(&[1.0f32, 0.0, 0.5, 0.5, -1.0, 1.0], 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn partial_frame_is_dropped() {
        let mono = mix_to_mono(&[0.3f32, 0.3, 0.3, 0.9], 3);
        assert_eq!(mono.len(), 1);
        assert!((mono[0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn mono_passes_through_and_gain_clamps() {
        let mut mono = mix_to_mono(&[0.2f32, -0.4], 1);
        apply_gain(&mut mono, 2.0);
        assert_eq!(mono, vec![0.2, -0.4]);
        apply_gain(&mut mono, 0.5);
        assert_eq!(mono, vec![0.1, -0.2]);
    }
}
