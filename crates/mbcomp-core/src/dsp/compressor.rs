//! Feed-forward compressor
//!
//! Standard peak-detecting compressor: a ballistics filter follows the
//! rectified input with separate attack and release times, and a static
//! gain computer reduces anything above the threshold by the ratio.
//!
//! ```text
//!   x ──┬──▶ |x| ─▶ envelope ─▶ gain computer ──┐
//!       └──────────────────────────────────────(×)──▶ y
//! ```
//!
//! The envelope is tracked per channel, so stereo is not linked.

use crate::types::{db_to_gain, AudioBuffer, ProcessSpec, Sample, MAX_CHANNELS};

/// Attack/release times below this snap instantly
const MIN_TIME_MS: f32 = 1e-3;

/// Peak envelope follower with attack/release ballistics
///
/// `y[n] = x + c·(y[n-1] - x)` with `c = exp(-2π·1000 / (sr·t_ms))`, using
/// the attack constant while the level rises and the release constant
/// while it falls.
#[derive(Debug, Clone)]
pub struct BallisticsFilter {
    sample_rate: f64,
    attack_ms: f32,
    release_ms: f32,
    cte_attack: f32,
    cte_release: f32,
    y_old: Vec<f32>,
}

impl BallisticsFilter {
    pub fn new() -> Self {
        let mut filter = Self {
            sample_rate: 44100.0,
            attack_ms: 1.0,
            release_ms: 100.0,
            cte_attack: 0.0,
            cte_release: 0.0,
            y_old: vec![0.0; MAX_CHANNELS],
        };
        filter.update_constants();
        filter
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        self.y_old.resize(spec.num_channels.max(1), 0.0);
        self.update_constants();
        self.reset();
    }

    pub fn set_attack_time(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms;
        self.cte_attack = self.time_constant(attack_ms);
    }

    pub fn set_release_time(&mut self, release_ms: f32) {
        self.release_ms = release_ms;
        self.cte_release = self.time_constant(release_ms);
    }

    fn update_constants(&mut self) {
        self.cte_attack = self.time_constant(self.attack_ms);
        self.cte_release = self.time_constant(self.release_ms);
    }

    fn time_constant(&self, time_ms: f32) -> f32 {
        if time_ms < MIN_TIME_MS {
            0.0
        } else {
            let exp_factor = -2.0 * std::f64::consts::PI * 1000.0 / self.sample_rate;
            (exp_factor / time_ms as f64).exp() as f32
        }
    }

    /// Current envelope of `channel`
    pub fn level(&self, channel: usize) -> f32 {
        self.y_old[channel]
    }

    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: Sample) -> Sample {
        let input = input.abs();
        let y_old = self.y_old[channel];
        let cte = if input > y_old {
            self.cte_attack
        } else {
            self.cte_release
        };
        let result = input + cte * (y_old - input);
        self.y_old[channel] = result;
        result
    }

    pub fn reset(&mut self) {
        self.y_old.fill(0.0);
    }
}

impl Default for BallisticsFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-channel feed-forward compressor
///
/// Settings take effect on the next sample. When bypassed the buffer is
/// left untouched and the envelope does not advance.
#[derive(Debug, Clone)]
pub struct Compressor {
    envelope: BallisticsFilter,
    threshold_db: f32,
    threshold: f32,
    threshold_inverse: f32,
    ratio: f32,
    ratio_inverse: f32,
}

impl Compressor {
    pub fn new() -> Self {
        let mut compressor = Self {
            envelope: BallisticsFilter::new(),
            threshold_db: 0.0,
            threshold: 1.0,
            threshold_inverse: 1.0,
            ratio: 1.0,
            ratio_inverse: 1.0,
        };
        compressor.set_threshold(0.0);
        compressor
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        debug_assert!(spec.sample_rate > 0.0, "sample rate must be positive");
        self.envelope.prepare(spec);
    }

    /// Threshold in dBFS
    pub fn set_threshold(&mut self, threshold_db: f32) {
        self.threshold_db = threshold_db;
        self.threshold = db_to_gain(threshold_db).max(f32::MIN_POSITIVE);
        self.threshold_inverse = 1.0 / self.threshold;
    }

    /// Ratio N:1 (values below 1 are treated as 1)
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.max(1.0);
        self.ratio_inverse = 1.0 / self.ratio;
    }

    pub fn set_attack(&mut self, attack_ms: f32) {
        self.envelope.set_attack_time(attack_ms);
    }

    pub fn set_release(&mut self, release_ms: f32) {
        self.envelope.set_release_time(release_ms);
    }

    pub fn threshold_db(&self) -> f32 {
        self.threshold_db
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Gain the static curve applies for a given envelope level
    #[inline]
    pub fn gain_for_level(&self, envelope: Sample) -> Sample {
        if envelope < self.threshold {
            1.0
        } else {
            (envelope * self.threshold_inverse).powf(self.ratio_inverse - 1.0)
        }
    }

    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: Sample) -> Sample {
        let env = self.envelope.process_sample(channel, input);
        self.gain_for_level(env) * input
    }

    /// Compress a buffer in place
    pub fn process(&mut self, buffer: &mut AudioBuffer, bypassed: bool) {
        if bypassed {
            return;
        }
        for ch in 0..buffer.num_channels() {
            for sample in buffer.channel_mut(ch).iter_mut() {
                *sample = self.process_sample(ch, *sample);
            }
        }
    }

    pub fn reset(&mut self) {
        self.envelope.reset();
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48000.0;

    fn prepared(threshold_db: f32, ratio: f32) -> Compressor {
        let mut c = Compressor::new();
        c.prepare(&ProcessSpec::new(SR, 512, 1));
        c.set_threshold(threshold_db);
        c.set_ratio(ratio);
        c.set_attack(5.0);
        c.set_release(50.0);
        c
    }

    #[test]
    fn test_below_threshold_is_untouched() {
        let mut c = prepared(0.0, 4.0);
        let mut buffer = AudioBuffer::from_channels(&[&[0.5, -0.5, 0.25, -0.25]]);
        c.process(&mut buffer, false);
        assert_eq!(buffer.channel(0), &[0.5, -0.5, 0.25, -0.25]);
    }

    #[test]
    fn test_static_curve() {
        let c = prepared(-20.0, 4.0);
        // 20dB over threshold at 4:1 should come out 5dB over, i.e. -15dB of gain
        let over = db_to_gain(0.0);
        let gain_db = 20.0 * c.gain_for_level(over).log10();
        assert!((gain_db + 15.0).abs() < 0.01, "gain {} dB", gain_db);
        assert_eq!(c.gain_for_level(db_to_gain(-30.0)), 1.0);
    }

    #[test]
    fn test_envelope_attack_and_release() {
        let mut env = BallisticsFilter::new();
        env.prepare(&ProcessSpec::new(SR, 512, 1));
        env.set_attack_time(10.0);
        env.set_release_time(100.0);

        for _ in 0..(SR as usize / 10) {
            env.process_sample(0, 1.0);
        }
        assert!(env.level(0) > 0.99);

        let after_one_ms = {
            for _ in 0..48 {
                env.process_sample(0, 0.0);
            }
            env.level(0)
        };
        // Release is slower than attack: barely moved after 1ms
        assert!(after_one_ms > 0.9);
    }

    #[test]
    fn test_zero_time_is_instant() {
        let mut env = BallisticsFilter::new();
        env.prepare(&ProcessSpec::new(SR, 512, 1));
        env.set_attack_time(0.0);
        assert_eq!(env.process_sample(0, -0.7), 0.7);
    }

    #[test]
    fn test_bypass_passes_audio() {
        let mut c = prepared(-40.0, 100.0);
        let mut buffer = AudioBuffer::from_channels(&[&[1.0; 64]]);
        c.process(&mut buffer, true);
        assert!(buffer.channel(0).iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_loud_signal_is_reduced() {
        let mut c = prepared(-20.0, 8.0);
        let mut buffer = AudioBuffer::from_channels(&[&vec![0.9; 4800]]);
        c.process(&mut buffer, false);
        let last = *buffer.channel(0).last().unwrap();
        assert!(last < 0.2, "settled output {}", last);
    }
}
