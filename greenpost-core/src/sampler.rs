//! Sampler - repeated raw reads reduced to one denoised value
//!
//! Each reading takes `sample_count` raw samples from one channel, sorts
//! them and keeps the element at index `(n + 1) / 2` of the ascending array.
//! For odd `n` that is one past the median, for even `n` the upper of the
//! two middle values. Deployed nodes have always been calibrated against
//! this pick, so it is kept as is rather than replaced by a true median or
//! a mean.
//!
//! ```rust
//! use greenpost_core::sampler::denoise;
//!
//! let mut samples = [5, 1, 3];
//! assert_eq!(denoise(&mut samples), Some(5));
//! ```

use heapless::Vec;

use crate::constants::sampling::{DEFAULT_SAMPLE_COUNT, MAX_SAMPLE_COUNT, MIN_SAMPLE_COUNT};
use crate::errors::{ConfigError, ConfigResult};
use crate::traits::SensorProvider;

/// Index picked from `n` ascending-sorted samples
pub const fn pick_index(n: usize) -> usize {
    (n + 1) / 2
}

/// Sort `samples` in place and return the picked element
///
/// `None` for fewer than [`MIN_SAMPLE_COUNT`] samples, where the pick index
/// would fall outside the slice.
pub fn denoise(samples: &mut [u16]) -> Option<u16> {
    if samples.len() < MIN_SAMPLE_COUNT {
        return None;
    }
    samples.sort_unstable();
    samples.get(pick_index(samples.len())).copied()
}

/// Reads denoised values from a [`SensorProvider`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    sample_count: usize,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

impl Sampler {
    /// Sampler taking `sample_count` samples per reading
    pub fn new(sample_count: usize) -> ConfigResult<Self> {
        if !(MIN_SAMPLE_COUNT..=MAX_SAMPLE_COUNT).contains(&sample_count) {
            return Err(ConfigError::SampleCount {
                count: sample_count,
                min: MIN_SAMPLE_COUNT,
                max: MAX_SAMPLE_COUNT,
            });
        }
        Ok(Self { sample_count })
    }

    /// Samples per reading
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// One raw sample
    pub fn sample<P: SensorProvider>(&self, provider: &mut P, channel: u8) -> u16 {
        provider.read_channel(channel)
    }

    /// Denoised reading of `channel`, as raw converter counts
    pub fn read_denoised<P: SensorProvider>(&self, provider: &mut P, channel: u8) -> f32 {
        let mut samples: Vec<u16, MAX_SAMPLE_COUNT> = Vec::new();
        for _ in 0..self.sample_count {
            // capacity checked in `new`
            let _ = samples.push(provider.read_channel(channel));
        }
        // `new` guarantees at least MIN_SAMPLE_COUNT samples
        denoise(&mut samples).map(f32::from).unwrap_or_default()
    }
}
