//! Audio utilities for short alert playback.
//!
//! This crate wraps low-level audio building blocks into a small set of
//! helpers oriented toward fire-and-forget notification sounds. It focuses on:
//! - Opening the default output device and playing a mono buffer with `cpal`.
//! - Decoding pre-recorded assets and mixing them down to mono.
//! - Resampling mono buffers to the device rate with FFT-based resamplers.
//! - Synthesizing enveloped sine tone sequences when no asset is available.
//!
//! # Real-time constraints
//! Audio callbacks run on a real-time thread. Avoid allocations, locks, and
//! blocking I/O inside callbacks whenever possible.

pub mod decode;
pub mod device;
pub mod mixer;
pub mod resampler;
pub mod tone;

/// Block size (in frames) handed to the resampler when converting whole
/// buffers.
pub const RESAMPLE_BLOCK_FRAMES: u32 = 1024;

/// Computes the greatest common divisor (GCD) of two unsigned integers.
///
/// This function implements the classic Euclidean algorithm.
pub(crate) fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let temp = a % b;
        a = b;
        b = temp;
    }
    a
}
