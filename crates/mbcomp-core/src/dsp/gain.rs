//! Trim gain with linear ramping
//!
//! A gain change on a live buffer is spread over a fixed ramp (50ms by
//! default) so automation never produces a step discontinuity.

use crate::types::{db_to_gain, AudioBuffer, ProcessSpec, Sample};

/// Default ramp length for trim changes
pub const DEFAULT_RAMP_SECONDS: f64 = 0.05;

/// Value that moves linearly to its target over a fixed number of samples
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    countdown: usize,
    steps_to_target: usize,
}

impl LinearSmoothedValue {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            countdown: 0,
            steps_to_target: 0,
        }
    }

    /// Set the ramp length and jump to the current target
    pub fn reset(&mut self, sample_rate: f64, ramp_seconds: f64) {
        self.steps_to_target = (ramp_seconds * sample_rate).floor().max(0.0) as usize;
        self.set_current_and_target(self.target);
    }

    /// Jump to `value` with no ramp
    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.countdown = 0;
    }

    /// Start ramping from the current value to `value`
    pub fn set_target(&mut self, value: f32) {
        if value == self.target {
            return;
        }
        if self.steps_to_target == 0 {
            self.set_current_and_target(value);
            return;
        }
        self.target = value;
        self.countdown = self.steps_to_target;
        self.step = (self.target - self.current) / self.countdown as f32;
    }

    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.countdown == 0 {
            return self.target;
        }
        self.countdown -= 1;
        if self.countdown > 0 {
            self.current += self.step;
        } else {
            self.current = self.target;
        }
        self.current
    }

    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

/// Gain stage driven in decibels, ramped linearly in amplitude
#[derive(Debug, Clone)]
pub struct SmoothedGain {
    value: LinearSmoothedValue,
    ramp_seconds: f64,
}

impl SmoothedGain {
    pub fn new(ramp_seconds: f64) -> Self {
        Self {
            value: LinearSmoothedValue::new(1.0),
            ramp_seconds,
        }
    }

    /// Apply the host sample rate
    ///
    /// Snaps to the current target, so preparing mid-ramp never fades in.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.value.reset(spec.sample_rate, self.ramp_seconds);
    }

    pub fn set_gain_decibels(&mut self, db: f32) {
        self.value.set_target(db_to_gain(db));
    }

    pub fn set_gain_linear(&mut self, gain: f32) {
        self.value.set_target(gain);
    }

    /// Linear gain the ramp is heading to
    pub fn target_gain(&self) -> f32 {
        self.value.target()
    }

    pub fn is_smoothing(&self) -> bool {
        self.value.is_smoothing()
    }

    pub fn ramp_seconds(&self) -> f64 {
        self.ramp_seconds
    }

    /// Apply the gain in place, advancing the ramp one step per sample frame
    pub fn process(&mut self, buffer: &mut AudioBuffer) {
        if !self.value.is_smoothing() {
            let gain = self.value.target();
            if gain != 1.0 {
                buffer.apply_gain(gain);
            }
            return;
        }

        for i in 0..buffer.num_samples() {
            let gain: Sample = self.value.next_value();
            for channel in buffer.channels_mut() {
                channel[i] *= gain;
            }
        }
    }
}

impl Default for SmoothedGain {
    fn default() -> Self {
        Self::new(DEFAULT_RAMP_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_ramp_reaches_target() {
        let mut v = LinearSmoothedValue::new(0.0);
        v.reset(1000.0, 0.01); // 10 steps
        v.set_target(1.0);
        assert!(v.is_smoothing());

        let values: Vec<f32> = (0..10).map(|_| v.next_value()).collect();
        assert!((values[0] - 0.1).abs() < 1e-6);
        assert_eq!(values[9], 1.0);
        assert!(!v.is_smoothing());
        assert_eq!(v.next_value(), 1.0);
    }

    #[test]
    fn test_zero_ramp_jumps() {
        let mut v = LinearSmoothedValue::new(0.0);
        v.reset(48000.0, 0.0);
        v.set_target(0.5);
        assert!(!v.is_smoothing());
        assert_eq!(v.next_value(), 0.5);
    }

    #[test]
    fn test_gain_change_is_ramped() {
        let spec = ProcessSpec::new(48000.0, 4800, 2);
        let mut gain = SmoothedGain::default();
        gain.prepare(&spec);
        gain.set_gain_decibels(-6.0206);

        let mut buffer = AudioBuffer::from_channels(&[&vec![1.0; 4800], &vec![1.0; 4800]]);
        gain.process(&mut buffer);

        let ch = buffer.channel(0);
        // No step: consecutive samples differ by at most one ramp increment
        let max_jump = ch.windows(2).map(|w| (w[1] - w[0]).abs()).fold(0.0f32, f32::max);
        assert!(max_jump < 1e-3, "jump {}", max_jump);
        assert!(ch[0] > 0.99);
        // 50ms = 2400 samples at 48kHz, so the tail sits on the target
        assert!((ch[4799] - 0.5).abs() < 1e-3);
        assert_eq!(buffer.channel(0), buffer.channel(1));
    }

    #[test]
    fn test_prepare_snaps_to_target() {
        let spec = ProcessSpec::new(48000.0, 64, 1);
        let mut gain = SmoothedGain::default();
        gain.prepare(&spec);
        gain.set_gain_linear(0.25);
        assert!(gain.is_smoothing());

        gain.prepare(&spec);
        assert!(!gain.is_smoothing());
        let mut buffer = AudioBuffer::from_channels(&[&[1.0, 1.0]]);
        gain.process(&mut buffer);
        assert_eq!(buffer.channel(0), &[0.25, 0.25]);
    }
}
