//! Common types for mbcomp
//!
//! This module contains the fundamental audio types used throughout the
//! compressor: the planar multichannel buffer, band identifiers, the
//! host processing spec and decibel helpers.

use std::ops::{Index, IndexMut};

/// Number of frequency bands (Low, Mid, High)
pub const NUM_BANDS: usize = 3;

/// Maximum channel count the core accepts (mono or stereo)
pub const MAX_CHANNELS: usize = 2;

/// Floor substituted for the logarithm of silence, in dB
pub const NEG_INFINITY_DB: f32 = -72.0;

/// Top of the displayed level range, in dB
pub const MAX_DB: f32 = 12.0;

/// Lowest threshold a band can be set to, in dB
pub const MIN_THRESHOLD_DB: f32 = -60.0;

/// Lowest frequency shown by the analyzer and accepted by the crossovers
pub const MIN_FREQUENCY: f32 = 20.0;

/// Highest frequency shown by the analyzer and accepted by the crossovers
pub const MAX_FREQUENCY: f32 = 20000.0;

/// Audio sample type
pub type Sample = f32;

/// Band identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Band {
    Low = 0,
    Mid = 1,
    High = 2,
}

impl Band {
    /// All bands in processing order
    pub const ALL: [Band; NUM_BANDS] = [Band::Low, Band::Mid, Band::High];

    /// Convert from index (0-2) to Band
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Band::Low),
            1 => Some(Band::Mid),
            2 => Some(Band::High),
            _ => None,
        }
    }

    /// Index of this band into per-band arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get the name of this band
    pub fn name(&self) -> &'static str {
        match self {
            Band::Low => "Low",
            Band::Mid => "Mid",
            Band::High => "High",
        }
    }
}

/// Host processing setup, fixed between `prepare` calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Largest block the host will pass to `process_block`
    pub maximum_block_size: usize,
    /// Channel count of both input and output
    pub num_channels: usize,
}

impl ProcessSpec {
    /// Create a new spec
    pub fn new(sample_rate: f64, maximum_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            maximum_block_size,
            num_channels,
        }
    }
}

/// Convert linear gain to decibels, substituting `floor` for silence
///
/// Never returns NaN or an infinite value for finite non-negative input.
#[inline]
pub fn gain_to_db(gain: Sample, floor: Sample) -> Sample {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(floor)
    } else {
        floor
    }
}

/// Convert decibels to linear gain (anything at or below -100 dB is silence)
#[inline]
pub fn db_to_gain(db: Sample) -> Sample {
    if db > -100.0 {
        10.0_f32.powf(db / 20.0)
    } else {
        0.0
    }
}

/// A planar multichannel buffer of samples
///
/// Every channel holds the same number of samples. Storage is allocated by
/// [`AudioBuffer::set_size`]; after that, [`AudioBuffer::set_num_samples`],
/// [`AudioBuffer::copy_from`] and the arithmetic helpers stay within the
/// existing capacity and are safe to call from the audio callback.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<Sample>>,
    num_samples: usize,
}

impl AudioBuffer {
    /// Create a buffer filled with silence
    pub fn new(num_channels: usize, num_samples: usize) -> Self {
        let mut buffer = Self::default();
        buffer.set_size(num_channels, num_samples);
        buffer
    }

    /// Create a buffer from separate channel slices
    pub fn from_channels(channels: &[&[Sample]]) -> Self {
        let num_samples = channels.first().map(|c| c.len()).unwrap_or(0);
        assert!(
            channels.iter().all(|c| c.len() == num_samples),
            "Channel lengths must match"
        );
        Self {
            channels: channels.iter().map(|c| c.to_vec()).collect(),
            num_samples,
        }
    }

    /// Create a buffer from interleaved samples [L, R, L, R, ...]
    pub fn from_interleaved(interleaved: &[Sample], num_channels: usize) -> Self {
        assert!(num_channels > 0, "Need at least one channel");
        assert!(
            interleaved.len() % num_channels == 0,
            "Interleaved length must be a multiple of the channel count"
        );
        let num_samples = interleaved.len() / num_channels;
        let mut buffer = Self::new(num_channels, num_samples);
        for (i, frame) in interleaved.chunks_exact(num_channels).enumerate() {
            for (ch, &sample) in frame.iter().enumerate() {
                buffer.channels[ch][i] = sample;
            }
        }
        buffer
    }

    /// Resize the buffer and clear it (allocates; call from `prepare` only)
    ///
    /// Keeps the existing allocation when it is already large enough, so
    /// preparing twice with the same size never reallocates.
    pub fn set_size(&mut self, num_channels: usize, num_samples: usize) {
        self.channels.resize_with(num_channels, Vec::new);
        for channel in &mut self.channels {
            channel.clear();
            channel.resize(num_samples, 0.0);
        }
        self.num_samples = num_samples;
    }

    /// Set the working length of a prepared buffer (real-time safe)
    ///
    /// Newly exposed samples are silent. `num_samples` must not exceed the
    /// prepared capacity.
    #[inline]
    pub fn set_num_samples(&mut self, num_samples: usize) {
        debug_assert!(
            num_samples <= self.capacity(),
            "set_num_samples called with len > capacity"
        );
        for channel in &mut self.channels {
            channel.resize(num_samples, 0.0);
        }
        self.num_samples = num_samples;
    }

    /// Number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Check if the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_samples == 0 || self.channels.is_empty()
    }

    /// Samples each channel can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.channels.iter().map(Vec::capacity).min().unwrap_or(0)
    }

    /// Read access to one channel
    #[inline]
    pub fn channel(&self, channel: usize) -> &[Sample] {
        &self.channels[channel]
    }

    /// Write access to one channel
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [Sample] {
        &mut self.channels[channel]
    }

    /// Iterate over channels
    pub fn channels(&self) -> impl Iterator<Item = &[Sample]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Iterate mutably over channels
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [Sample]> {
        self.channels.iter_mut().map(Vec::as_mut_slice)
    }

    /// Fill every channel with silence
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }

    /// Copy from another buffer of the same channel count (real-time safe if prepared)
    pub fn copy_from(&mut self, other: &AudioBuffer) {
        debug_assert_eq!(
            self.num_channels(),
            other.num_channels(),
            "copy_from: channel count mismatch"
        );
        debug_assert!(
            other.num_samples <= self.capacity(),
            "copy_from: insufficient capacity ({} < {})",
            self.capacity(),
            other.num_samples
        );
        self.set_num_samples(other.num_samples);
        for (dst, src) in self.channels.iter_mut().zip(other.channels.iter()) {
            dst.copy_from_slice(src);
        }
    }

    /// Add another buffer to this one (summing samples)
    pub fn add_from(&mut self, other: &AudioBuffer) {
        debug_assert_eq!(self.num_samples, other.num_samples, "Buffer lengths must match");
        for (dst, src) in self.channels.iter_mut().zip(other.channels.iter()) {
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d += *s;
            }
        }
    }

    /// Scale all samples by a factor
    pub fn apply_gain(&mut self, factor: Sample) {
        for channel in &mut self.channels {
            for sample in channel.iter_mut() {
                *sample *= factor;
            }
        }
    }

    /// RMS level of one channel
    pub fn rms_level(&self, channel: usize) -> Sample {
        let samples = self.channel(channel);
        if samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum / samples.len() as f64).sqrt() as Sample
    }

    /// Get the peak amplitude across all channels
    pub fn peak(&self) -> Sample {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .map(|s| s.abs())
            .fold(0.0, Sample::max)
    }

    /// Copy samples to an interleaved output buffer [L, R, L, R, ...]
    pub fn to_interleaved(&self, output: &mut [Sample]) {
        let num_channels = self.num_channels();
        assert!(output.len() >= self.num_samples * num_channels);
        for (ch, channel) in self.channels.iter().enumerate() {
            for (i, &sample) in channel.iter().enumerate() {
                output[i * num_channels + ch] = sample;
            }
        }
    }
}

impl Index<usize> for AudioBuffer {
    type Output = [Sample];

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.channels[index]
    }
}

impl IndexMut<usize> for AudioBuffer {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.channels[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_indices() {
        for (i, band) in Band::ALL.iter().enumerate() {
            assert_eq!(band.index(), i);
            assert_eq!(Band::from_index(i), Some(*band));
        }
        assert_eq!(Band::from_index(3), None);
        assert_eq!(Band::Mid.name(), "Mid");
    }

    #[test]
    fn test_gain_to_db_floor() {
        assert_eq!(gain_to_db(0.0, NEG_INFINITY_DB), NEG_INFINITY_DB);
        assert_eq!(gain_to_db(1e-12, NEG_INFINITY_DB), NEG_INFINITY_DB);
        assert_eq!(gain_to_db(-1.0, NEG_INFINITY_DB), NEG_INFINITY_DB);
        assert!((gain_to_db(1.0, NEG_INFINITY_DB)).abs() < 1e-6);
        assert!((gain_to_db(0.5, NEG_INFINITY_DB) + 6.0206).abs() < 1e-3);
    }

    #[test]
    fn test_db_to_gain() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-6.0206) - 0.5).abs() < 1e-4);
        assert_eq!(db_to_gain(-120.0), 0.0);
    }

    #[test]
    fn test_set_size_keeps_allocation() {
        let mut buffer = AudioBuffer::new(2, 512);
        let capacity = buffer.capacity();
        let ptr = buffer.channel(0).as_ptr();

        buffer.set_size(2, 512);
        assert_eq!(buffer.capacity(), capacity);
        assert_eq!(buffer.channel(0).as_ptr(), ptr);
        assert_eq!(buffer.num_samples(), 512);
    }

    #[test]
    fn test_set_num_samples_within_capacity() {
        let mut buffer = AudioBuffer::new(2, 256);
        buffer.set_num_samples(64);
        assert_eq!(buffer.num_samples(), 64);
        assert_eq!(buffer.channel(1).len(), 64);

        buffer.set_num_samples(256);
        assert!(buffer.channel(0).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_copy_and_add() {
        let src = AudioBuffer::from_channels(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let mut dst = AudioBuffer::new(2, 8);
        dst.copy_from(&src);
        assert_eq!(dst.num_samples(), 2);
        assert_eq!(dst.channel(1), &[3.0, 4.0]);

        dst.add_from(&src);
        assert_eq!(dst.channel(0), &[2.0, 4.0]);

        dst.apply_gain(0.5);
        assert_eq!(dst.channel(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_interleaved_roundtrip() {
        let interleaved = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buffer = AudioBuffer::from_interleaved(&interleaved, 2);
        assert_eq!(buffer.num_samples(), 3);
        assert_eq!(buffer.channel(0), &[0.1, 0.2, 0.3]);

        let mut out = [0.0; 6];
        buffer.to_interleaved(&mut out);
        assert_eq!(out, interleaved);
    }

    #[test]
    fn test_rms_level() {
        let buffer = AudioBuffer::from_channels(&[&[1.0, -1.0, 1.0, -1.0]]);
        assert!((buffer.rms_level(0) - 1.0).abs() < 1e-6);
        assert_eq!(AudioBuffer::new(1, 0).rms_level(0), 0.0);
    }
}
