//! Linkwitz-Riley Crossover Network
//!
//! Splits a buffer into three phase-coherent bands using two LR24
//! (24dB/oct) crossover frequencies.
//!
//! ## How it works
//!
//! Each [`LinkwitzRileyFilter`] is a Cytomic state-variable filter with
//! Butterworth damping (k = √2). Lowpass and highpass cascade two 2-pole
//! stages to reach the LR24 slope; allpass uses a single stage
//! (`low - k·band + high`), which is exactly what an LR24 low/high pair sums
//! to.
//!
//! The three-way split runs five filters:
//!
//! ```text
//!  input ─┬─▶ LP1 ─▶ AP2 ──────────────▶ low
//!         └─▶ HP1 ─┬─▶ LP2 ────────────▶ mid
//!                  └─▶ HP2 ────────────▶ high
//! ```
//!
//! AP2 gives the low band the same phase rotation the mid and high bands
//! pick up at the second crossover, so `low + mid + high` equals the input
//! passed through AP(f1)·AP(f2): flat magnitude, no comb filtering.
//! [`AllpassReference`] produces that signal directly for null tests.

use crate::types::{AudioBuffer, ProcessSpec, Sample, MAX_CHANNELS, NUM_BANDS};

/// Butterworth damping for each 2-pole stage (1/Q with Q = 1/√2)
const BUTTERWORTH_K: f32 = std::f32::consts::SQRT_2;

/// Sample rate assumed until `prepare` is called
const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Which response a [`LinkwitzRileyFilter`] produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// 24dB/oct lowpass (two cascaded stages)
    Lowpass,
    /// 24dB/oct highpass (two cascaded stages)
    Highpass,
    /// 2nd-order allpass, unity magnitude with LR24 phase
    Allpass,
}

/// Coefficients of one SVF stage, derived from cutoff and sample rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvfCoefficients {
    pub g: f32,
    pub k: f32,
    pub a1: f32,
    pub a2: f32,
    pub a3: f32,
}

impl SvfCoefficients {
    fn new(cutoff: f32, sample_rate: f64) -> Self {
        let g = (std::f64::consts::PI * cutoff as f64 / sample_rate).tan() as f32;
        let k = BUTTERWORTH_K;
        let a1 = 1.0 / (1.0 + g * (g + k));
        let a2 = g * a1;
        let a3 = g * a2;
        Self { g, k, a1, a2, a3 }
    }

    /// Advance one stage, returning (low, band, high)
    #[inline]
    fn tick(&self, ic1eq: &mut f32, ic2eq: &mut f32, input: Sample) -> (Sample, Sample, Sample) {
        let v3 = input - *ic2eq;
        let v1 = self.a1 * *ic1eq + self.a2 * v3;
        let v2 = *ic2eq + self.a2 * *ic1eq + self.a3 * v3;
        *ic1eq = 2.0 * v1 - *ic1eq;
        *ic2eq = 2.0 * v2 - *ic2eq;

        let low = v2;
        let band = v1;
        let high = input - self.k * band - low;
        (low, band, high)
    }
}

/// Integrator state of both stages for one channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ChannelState {
    s1: f32,
    s2: f32,
    s3: f32,
    s4: f32,
}

/// One Linkwitz-Riley filter with per-channel state
#[derive(Debug, Clone)]
pub struct LinkwitzRileyFilter {
    filter_type: FilterType,
    cutoff: f32,
    sample_rate: f64,
    coefficients: SvfCoefficients,
    state: Vec<ChannelState>,
}

impl LinkwitzRileyFilter {
    /// Create a filter at 2kHz (call `prepare` before processing)
    pub fn new(filter_type: FilterType) -> Self {
        let cutoff = 2000.0;
        Self {
            filter_type,
            cutoff,
            sample_rate: DEFAULT_SAMPLE_RATE,
            coefficients: SvfCoefficients::new(cutoff, DEFAULT_SAMPLE_RATE),
            state: vec![ChannelState::default(); MAX_CHANNELS],
        }
    }

    /// Size channel state and recompute coefficients for the host setup
    ///
    /// Clears the filter state. Calling it again with the same spec leaves
    /// coefficients and allocations unchanged.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        debug_assert!(spec.sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = spec.sample_rate;
        self.state.resize(spec.num_channels.max(1), ChannelState::default());
        self.update_coefficients();
        self.reset();
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Set the crossover frequency (takes effect on the next sample)
    ///
    /// Clamped just below Nyquist so the prewarp stays finite.
    pub fn set_cutoff_frequency(&mut self, cutoff: f32) {
        let nyquist_limit = (self.sample_rate * 0.499) as f32;
        let cutoff = cutoff.clamp(1.0, nyquist_limit);
        if cutoff != self.cutoff {
            self.cutoff = cutoff;
            self.update_coefficients();
        }
    }

    pub fn cutoff_frequency(&self) -> f32 {
        self.cutoff
    }

    pub fn coefficients(&self) -> SvfCoefficients {
        self.coefficients
    }

    fn update_coefficients(&mut self) {
        self.coefficients = SvfCoefficients::new(self.cutoff, self.sample_rate);
    }

    /// Filter one sample of `channel`
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: Sample) -> Sample {
        let c = self.coefficients;
        let st = &mut self.state[channel];

        let (low, band, high) = c.tick(&mut st.s1, &mut st.s2, input);
        match self.filter_type {
            FilterType::Allpass => low - c.k * band + high,
            FilterType::Lowpass => c.tick(&mut st.s3, &mut st.s4, low).0,
            FilterType::Highpass => c.tick(&mut st.s3, &mut st.s4, high).2,
        }
    }

    /// Filter a buffer in place
    pub fn process(&mut self, buffer: &mut AudioBuffer) {
        debug_assert!(
            buffer.num_channels() <= self.state.len(),
            "buffer has more channels than the filter was prepared for"
        );
        for ch in 0..buffer.num_channels() {
            for sample in buffer.channel_mut(ch).iter_mut() {
                *sample = self.process_sample(ch, *sample);
            }
        }
    }

    /// Clear filter memory without touching coefficients
    pub fn reset(&mut self) {
        self.state.fill(ChannelState::default());
    }
}

/// Three-band Linkwitz-Riley splitter
///
/// ## Usage
///
/// ```ignore
/// let mut network = CrossoverNetwork::new();
/// network.prepare(&spec);
///
/// // Once per block, before splitting
/// network.set_crossovers(400.0, 2000.0);
/// network.split(&input, &mut band_buffers);
/// // band_buffers[0] = low, [1] = mid, [2] = high
/// ```
#[derive(Debug, Clone)]
pub struct CrossoverNetwork {
    lp1: LinkwitzRileyFilter,
    hp1: LinkwitzRileyFilter,
    ap2: LinkwitzRileyFilter,
    lp2: LinkwitzRileyFilter,
    hp2: LinkwitzRileyFilter,
}

impl CrossoverNetwork {
    pub fn new() -> Self {
        Self {
            lp1: LinkwitzRileyFilter::new(FilterType::Lowpass),
            hp1: LinkwitzRileyFilter::new(FilterType::Highpass),
            ap2: LinkwitzRileyFilter::new(FilterType::Allpass),
            lp2: LinkwitzRileyFilter::new(FilterType::Lowpass),
            hp2: LinkwitzRileyFilter::new(FilterType::Highpass),
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        for filter in self.filters_mut() {
            filter.prepare(spec);
        }
    }

    /// Update both crossover points
    ///
    /// Coefficients switch at the block boundary with no interpolation, so
    /// fast crossover automation can produce small discontinuities.
    pub fn set_crossovers(&mut self, low_mid: f32, mid_high: f32) {
        debug_assert!(low_mid < mid_high, "crossovers out of order");
        self.lp1.set_cutoff_frequency(low_mid);
        self.hp1.set_cutoff_frequency(low_mid);

        self.ap2.set_cutoff_frequency(mid_high);
        self.lp2.set_cutoff_frequency(mid_high);
        self.hp2.set_cutoff_frequency(mid_high);
    }

    /// Current (low-mid, mid-high) crossover frequencies
    pub fn crossovers(&self) -> (f32, f32) {
        (self.lp1.cutoff_frequency(), self.lp2.cutoff_frequency())
    }

    /// Split `input` into low, mid and high band buffers
    ///
    /// Band buffers must have been sized for at least `input.num_samples()`.
    pub fn split(&mut self, input: &AudioBuffer, bands: &mut [AudioBuffer; NUM_BANDS]) {
        let [low, mid, high] = bands;

        low.copy_from(input);
        mid.copy_from(input);

        self.lp1.process(low);
        self.ap2.process(low);

        self.hp1.process(mid);
        high.copy_from(mid);

        self.lp2.process(mid);
        self.hp2.process(high);
    }

    pub fn reset(&mut self) {
        for filter in self.filters_mut() {
            filter.reset();
        }
    }

    /// Coefficients of every stage, in LP1, HP1, AP2, LP2, HP2 order
    pub fn coefficients(&self) -> [SvfCoefficients; 5] {
        [
            self.lp1.coefficients(),
            self.hp1.coefficients(),
            self.ap2.coefficients(),
            self.lp2.coefficients(),
            self.hp2.coefficients(),
        ]
    }

    fn filters_mut(&mut self) -> [&mut LinkwitzRileyFilter; 5] {
        [
            &mut self.lp1,
            &mut self.hp1,
            &mut self.ap2,
            &mut self.lp2,
            &mut self.hp2,
        ]
    }
}

impl Default for CrossoverNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// Phase reference matching a summed [`CrossoverNetwork`]
///
/// Runs the input through the allpass of each crossover in series. With the
/// same crossover frequencies and sample rate, the output should equal
/// `low + mid + high` of the network to within rounding.
#[derive(Debug, Clone)]
pub struct AllpassReference {
    ap1: LinkwitzRileyFilter,
    ap2: LinkwitzRileyFilter,
}

impl AllpassReference {
    pub fn new() -> Self {
        Self {
            ap1: LinkwitzRileyFilter::new(FilterType::Allpass),
            ap2: LinkwitzRileyFilter::new(FilterType::Allpass),
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.ap1.prepare(spec);
        self.ap2.prepare(spec);
    }

    pub fn set_crossovers(&mut self, low_mid: f32, mid_high: f32) {
        self.ap1.set_cutoff_frequency(low_mid);
        self.ap2.set_cutoff_frequency(mid_high);
    }

    pub fn process(&mut self, buffer: &mut AudioBuffer) {
        self.ap1.process(buffer);
        self.ap2.process(buffer);
    }
}

impl Default for AllpassReference {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48000.0;

    fn noise(len: usize, seed: u32) -> Vec<f32> {
        // Small LCG so the test is deterministic without a rand dependency
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                ((state >> 8) as f32 / (1u32 << 24) as f32) * 2.0 - 1.0
            })
            .map(|s| s * 0.5)
            .collect()
    }

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / SR as f32).sin() * 0.5)
            .collect()
    }

    fn prepared_bands(channels: usize, len: usize) -> [AudioBuffer; NUM_BANDS] {
        std::array::from_fn(|_| AudioBuffer::new(channels, len))
    }

    fn sum_bands(bands: &[AudioBuffer; NUM_BANDS]) -> AudioBuffer {
        let mut sum = bands[0].clone();
        sum.add_from(&bands[1]);
        sum.add_from(&bands[2]);
        sum
    }

    #[test]
    fn test_bands_sum_to_allpass_reference() {
        let len = 4096;
        let left = noise(len, 1);
        let right = noise(len, 7);
        let input = AudioBuffer::from_channels(&[&left, &right]);
        let spec = ProcessSpec::new(SR, len, 2);

        for (f1, f2) in [(400.0, 2000.0), (80.0, 1000.0), (999.0, 12000.0)] {
            let mut network = CrossoverNetwork::new();
            network.prepare(&spec);
            network.set_crossovers(f1, f2);

            let mut bands = prepared_bands(2, len);
            network.split(&input, &mut bands);
            let sum = sum_bands(&bands);

            let mut reference = AllpassReference::new();
            reference.prepare(&spec);
            reference.set_crossovers(f1, f2);
            let mut expected = input.clone();
            reference.process(&mut expected);

            for ch in 0..2 {
                // 1e-4 of the reference peak: rounding only, no phase mismatch
                let tolerance = 1e-4 * expected.channel(ch).iter().fold(0.0f32, |m, s| m.max(s.abs()));
                for (i, (a, b)) in sum.channel(ch).iter().zip(expected.channel(ch)).enumerate() {
                    assert!(
                        (a - b).abs() <= tolerance,
                        "({}, {}) ch {} sample {}: sum {} vs reference {}",
                        f1,
                        f2,
                        ch,
                        i,
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_reconstruction_preserves_magnitude() {
        let len = 48000;
        let spec = ProcessSpec::new(SR, len, 1);

        for freq in [100.0, 400.0, 1000.0, 2000.0, 8000.0] {
            let signal = sine(freq, len);
            let input = AudioBuffer::from_channels(&[&signal]);

            let mut network = CrossoverNetwork::new();
            network.prepare(&spec);
            network.set_crossovers(400.0, 2000.0);
            let mut bands = prepared_bands(1, len);
            network.split(&input, &mut bands);
            let sum = sum_bands(&bands);

            // Skip the settling transient
            let tail = len / 2;
            let rms = |s: &[f32]| (s.iter().map(|x| x * x).sum::<f32>() / s.len() as f32).sqrt();
            let rms_in = rms(&input.channel(0)[tail..]);
            let rms_out = rms(&sum.channel(0)[tail..]);
            assert!(
                (rms_in - rms_out).abs() / rms_in < 1e-2,
                "{} Hz: rms in {} out {}",
                freq,
                rms_in,
                rms_out
            );
        }
    }

    #[test]
    fn test_dc_goes_to_low_band() {
        let len = 20000;
        let spec = ProcessSpec::new(SR, len, 1);
        let input = AudioBuffer::from_channels(&[&vec![1.0; len]]);

        let mut network = CrossoverNetwork::new();
        network.prepare(&spec);
        network.set_crossovers(400.0, 2000.0);
        let mut bands = prepared_bands(1, len);
        network.split(&input, &mut bands);

        let last = len - 1;
        assert!((bands[0].channel(0)[last] - 1.0).abs() < 0.01);
        assert!(bands[1].channel(0)[last].abs() < 0.01);
        assert!(bands[2].channel(0)[last].abs() < 0.01);
    }

    #[test]
    fn test_high_tone_goes_to_high_band() {
        let len = 24000;
        let spec = ProcessSpec::new(SR, len, 1);
        let signal = sine(10000.0, len);
        let input = AudioBuffer::from_channels(&[&signal]);

        let mut network = CrossoverNetwork::new();
        network.prepare(&spec);
        network.set_crossovers(400.0, 2000.0);
        let mut bands = prepared_bands(1, len);
        network.split(&input, &mut bands);

        let tail = len / 2;
        let energy = |b: &AudioBuffer| b.channel(0)[tail..].iter().map(|x| x * x).sum::<f32>();
        let high = energy(&bands[2]);
        assert!(high > energy(&bands[0]) * 100.0);
        assert!(high > energy(&bands[1]) * 10.0);
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let spec = ProcessSpec::new(SR, 512, 2);
        let mut network = CrossoverNetwork::new();
        network.prepare(&spec);
        network.set_crossovers(300.0, 3000.0);
        let before = network.coefficients();

        network.prepare(&spec);
        assert_eq!(network.coefficients(), before);
        assert_eq!(network.crossovers(), (300.0, 3000.0));
    }

    #[test]
    fn test_allpass_has_unity_magnitude() {
        let len = 48000;
        let spec = ProcessSpec::new(SR, len, 1);
        let mut filter = LinkwitzRileyFilter::new(FilterType::Allpass);
        filter.prepare(&spec);
        filter.set_cutoff_frequency(1000.0);

        let signal = sine(1000.0, len);
        let mut buffer = AudioBuffer::from_channels(&[&signal]);
        filter.process(&mut buffer);

        let tail = len / 2;
        let peak_out = buffer.channel(0)[tail..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak_out - 0.5).abs() < 0.01, "allpass peak {}", peak_out);
    }

    #[test]
    fn test_cutoff_is_clamped_below_nyquist() {
        let mut filter = LinkwitzRileyFilter::new(FilterType::Lowpass);
        filter.prepare(&ProcessSpec::new(32000.0, 64, 1));
        filter.set_cutoff_frequency(20000.0);
        assert!(filter.cutoff_frequency() < 16000.0);
        assert!(filter.coefficients().g.is_finite());
    }
}
