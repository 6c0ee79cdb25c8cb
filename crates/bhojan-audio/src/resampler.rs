use rubato::{FftFixedInOut, Resampler, ResamplerConstructionError};

/// Errors that can occur during audio resampling.
///
/// This error type represents failures caused by invalid input/output provided
/// to the resampler.
#[derive(Debug, thiserror::Error)]
pub enum ResamplerError {
    /// The resampler could not be built for the requested rates.
    #[error("failed to construct resampler: {0}")]
    Construction(#[from] ResamplerConstructionError),
    /// The input buffer length does not match the resampler’s required block
    /// size.
    #[error("invalid input length for resampler: expected {expected} samples, got {actual}")]
    InvalidInputLength {
        /// Number of input samples expected by the resampler.
        expected: usize,
        /// Number of input samples provided by the caller.
        actual: usize,
    },
    /// Failed to resample the provided audio samples.
    ///
    /// This error is returned when the underlying resampling engine encounters
    /// a failure while processing input samples.
    #[error("failed to resample input samples: {0}")]
    ResampleError(#[from] rubato::ResampleError),
}

/// Audio resampler trait.
///
/// Implementations consume input samples and deliver resampled output
/// through a user-provided callback.
pub trait AudioResampler<T: rubato::Sample>: Send {
    /// Process an input audio buffer and emit resampled output via a callback.
    ///
    /// The input slice contains mono audio samples (single channel,
    /// non-interleaved). The callback is invoked zero or more times with
    /// contiguous slices of resampled output data.
    ///
    /// # Returns
    /// Returns the total number of output samples written during this call.
    fn process_callback(
        &mut self,
        input: &[T],
        callback: &mut dyn FnMut(&[T]),
    ) -> Result<usize, ResamplerError>;
}

/// Fixed-block-size FFT-based resampler for mono audio.
///
/// It operates strictly on fixed-size input blocks and produces a fixed
/// number of output samples per processing call.
pub struct BlockResampler<T: rubato::Sample> {
    input_buffer: Vec<T>,
    output_buffer: Vec<T>,
    resampler: FftFixedInOut<T>,
}

impl<T: rubato::Sample> BlockResampler<T> {
    /// Creates a new fixed-block-size resampler.
    ///
    /// `block_size` is a hint; the engine rounds it to a size compatible with
    /// the rate ratio, see [`BlockResampler::input_frames_next`].
    pub fn new(
        original_rate: u32,
        target_rate: u32,
        block_size: u32,
    ) -> Result<Self, ResamplerError> {
        let resampler = FftFixedInOut::new(
            original_rate as usize,
            target_rate as usize,
            block_size as usize,
            1, // we're using mono
        )?;

        let raw_input_buffer = resampler.input_buffer_allocate(true);
        let raw_output_buffer = resampler.output_buffer_allocate(true);

        Ok(Self {
            input_buffer: raw_input_buffer[0].clone(),
            output_buffer: raw_output_buffer[0].clone(),
            resampler,
        })
    }

    /// Number of input samples every call must provide.
    pub fn input_frames_next(&self) -> usize {
        self.resampler.input_frames_next()
    }

    /// Number of leading output samples that are filter latency.
    pub fn output_delay(&self) -> usize {
        self.resampler.output_delay()
    }
}

impl<T: rubato::Sample> AudioResampler<T> for BlockResampler<T> {
    fn process_callback(
        &mut self,
        input: &[T],
        callback: &mut dyn FnMut(&[T]),
    ) -> Result<usize, ResamplerError> {
        let expected_len = self.resampler.input_frames_next();
        if input.len() != expected_len {
            return Err(ResamplerError::InvalidInputLength {
                expected: expected_len,
                actual: input.len(),
            });
        }

        if self.input_buffer.len() != expected_len {
            self.input_buffer.resize(expected_len, T::zero());
        }
        self.input_buffer.copy_from_slice(input);

        let input_buffer = &[&self.input_buffer];
        let output_buffer = &mut [&mut self.output_buffer];
        let (_, output_written) =
            self.resampler
                .process_into_buffer(input_buffer, output_buffer, None)?;

        // don't call callback if nothing was written
        if output_written > 0 {
            callback(&self.output_buffer[..output_written]);
        }
        Ok(output_written)
    }
}

/// Resamples a complete mono buffer from `original_rate` to `target_rate`.
///
/// The tail is flushed with silence and the filter latency is trimmed, so the
/// result is time-aligned with the input and has `len * target / original`
/// samples (rounded up).
pub fn resample_buffer(
    samples: &[f32],
    original_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, ResamplerError> {
    if original_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let rate_denominator = crate::gcd(original_rate, target_rate);
    let expected_len = (samples.len() as u64 * (target_rate / rate_denominator) as u64)
        .div_ceil((original_rate / rate_denominator) as u64) as usize;

    let mut resampler =
        BlockResampler::<f32>::new(original_rate, target_rate, crate::RESAMPLE_BLOCK_FRAMES)?;
    let delay = resampler.output_delay();
    let block_len = resampler.input_frames_next();

    let mut output = Vec::with_capacity(expected_len + delay + block_len);
    let mut block = vec![0.0f32; block_len];
    let mut position = 0usize;
    while output.len() < expected_len + delay {
        block.fill(0.0);
        if position < samples.len() {
            let end = (position + block_len).min(samples.len());
            block[..end - position].copy_from_slice(&samples[position..end]);
        }
        position += block_len;

        let written = resampler
            .process_callback(&block, &mut |chunk: &[f32]| output.extend_from_slice(chunk))?;
        if written == 0 {
            break;
        }
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected_len);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_identity() {
        let samples = vec![0.1f32, 0.2, 0.3];
        assert_eq!(resample_buffer(&samples, 48_000, 48_000).unwrap(), samples);
    }

    #[test]
    fn upsampling_scales_length() {
        let samples = vec![0.25f32; 22_050];
        let output = resample_buffer(&samples, 22_050, 44_100).unwrap();
        assert_eq!(output.len(), 44_100);

        // away from the edges a constant signal stays constant
        let middle = &output[10_000..30_000];
        assert!(middle.iter().all(|sample| (sample - 0.25).abs() < 0.01));
    }

    #[test]
    fn block_resampler_rejects_wrong_block() {
        let mut resampler = BlockResampler::<f32>::new(44_100, 48_000, 1024).unwrap();
        let wrong = vec![0.0f32; resampler.input_frames_next() + 1];
        let result = resampler.process_callback(&wrong, &mut |_| {});
        assert!(matches!(result, Err(ResamplerError::InvalidInputLength { .. })));
    }
}
