use std::io::Cursor;

use rodio::{Decoder, Source};

use crate::resampler::ResamplerError;

/// Errors that can occur while turning an encoded asset into playable samples.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The bytes are not a supported audio format or are corrupted.
    #[error("failed to decode audio asset: {0}")]
    Decoder(#[from] rodio::decoder::DecoderError),
    /// The asset decoded fine but holds no audio.
    #[error("audio asset contains no samples")]
    Empty,
    /// The decoded samples could not be converted to the output rate.
    #[error("failed to convert asset sample rate: {0}")]
    Resample(#[from] ResamplerError),
}

/// Decoded mono audio at its native sample rate.
#[derive(Debug, Clone)]
pub struct DecodedClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Decodes an encoded asset (mp3, wav or ogg) and mixes it down to mono.
pub fn decode_to_mono(bytes: Vec<u8>) -> Result<DecodedClip, DecodeError> {
    let decoder = Decoder::new(Cursor::new(bytes))?;
    let channels = decoder.channels() as usize;
    let sample_rate = decoder.sample_rate() as u32;

    let interleaved: Vec<f32> = decoder.collect();
    let samples = crate::mixer::mix_to_mono(&interleaved, channels);
    if samples.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(DecodedClip {
        samples,
        sample_rate,
    })
}

/// Decodes an asset and resamples it to `target_rate`, ready for
/// [`crate::device::OutputDevice::play_blocking`].
pub fn decode_for_output(bytes: Vec<u8>, target_rate: u32) -> Result<Vec<f32>, DecodeError> {
    let clip = decode_to_mono(bytes)?;
    Ok(crate::resampler::resample_buffer(
        &clip.samples,
        clip.sample_rate,
        target_rate,
    )?)
}
