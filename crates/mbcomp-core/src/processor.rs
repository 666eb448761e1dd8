//! Three-band compressor processor
//!
//! Ties the signal chain together and owns every piece of realtime state.
//!
//! # Signal flow
//!
//! ```text
//!  host buffer ─┬─▶ analyzer taps (raw input, left/right)
//!               ▼
//!          input trim ─▶ crossover ─▶ low  ─▶ compressor ─┐
//!                                 ─▶ mid  ─▶ compressor ─┼─▶ solo/mute mix ─▶ output trim ─▶ host buffer
//!                                 ─▶ high ─▶ compressor ─┘
//! ```
//!
//! # Threading
//!
//! [`MultibandProcessor::process_block`] runs on the audio thread and never
//! blocks, locks or allocates. Parameters come in through the shared
//! [`ParameterStore`]; levels and sample blocks go out through the
//! [`AnalyzerTaps`] handed back by [`MultibandProcessor::new`].

use std::sync::Arc;

use crate::config::ProcessorConfig;
use crate::dsp::{mix_bands, BandLevels, BandRouting, CompressorBand, CrossoverNetwork, SmoothedGain};
use crate::error::{ProcessorError, ProcessorResult};
use crate::params::{ParamId, ParameterStore};
use crate::sample_fifo::{sample_fifo, Channel, SampleFifoReader, SampleFifoWriter};
use crate::types::{AudioBuffer, Band, ProcessSpec, MAX_CHANNELS, NUM_BANDS};

/// UI-side endpoints of the processor's outgoing data
pub struct AnalyzerTaps {
    /// Raw input, channel 0
    pub left: SampleFifoReader,
    /// Raw input, channel 1 (channel 0 again for mono)
    pub right: SampleFifoReader,
    /// Pre/post RMS per band, indexed by [`Band::index`]
    pub levels: [Arc<BandLevels>; NUM_BANDS],
}

/// The multiband compressor
pub struct MultibandProcessor {
    params: Arc<ParameterStore>,
    compressors: [CompressorBand; NUM_BANDS],
    crossover: CrossoverNetwork,
    filter_buffers: [AudioBuffer; NUM_BANDS],
    input_gain: SmoothedGain,
    output_gain: SmoothedGain,
    left_fifo: SampleFifoWriter,
    right_fifo: SampleFifoWriter,
    spec: Option<ProcessSpec>,
}

impl MultibandProcessor {
    /// Create a processor reading from `params`
    ///
    /// Allocates the analyzer channels; audio buffers are sized later by
    /// [`Self::prepare`].
    pub fn new(params: Arc<ParameterStore>, config: &ProcessorConfig) -> (Self, AnalyzerTaps) {
        let config = config.sanitized();

        let (left_fifo, left) =
            sample_fifo(Channel::Left, config.fifo_capacity, config.max_chunk_samples);
        let (right_fifo, right) =
            sample_fifo(Channel::Right, config.fifo_capacity, config.max_chunk_samples);

        let compressors = Band::ALL.map(|band| CompressorBand::new(band, Arc::clone(&params)));
        let levels = std::array::from_fn(|i| compressors[i].levels());

        let processor = Self {
            params,
            compressors,
            crossover: CrossoverNetwork::new(),
            filter_buffers: Default::default(),
            input_gain: SmoothedGain::new(config.gain_ramp_seconds),
            output_gain: SmoothedGain::new(config.gain_ramp_seconds),
            left_fifo,
            right_fifo,
            spec: None,
        };
        let taps = AnalyzerTaps {
            left,
            right,
            levels,
        };
        (processor, taps)
    }

    /// Channel layouts the processor accepts: mono or stereo, in == out
    pub fn is_layout_supported(input_channels: usize, output_channels: usize) -> bool {
        input_channels == output_channels && (1..=MAX_CHANNELS).contains(&input_channels)
    }

    /// Size every buffer and filter for the host setup
    ///
    /// Must be called before streaming and whenever the host changes sample
    /// rate, block size or channel count. Preparing twice with the same
    /// spec changes nothing.
    pub fn prepare(&mut self, spec: ProcessSpec) -> ProcessorResult<()> {
        if !(spec.sample_rate.is_finite() && spec.sample_rate > 0.0) {
            return Err(ProcessorError::InvalidSampleRate(spec.sample_rate));
        }
        if spec.maximum_block_size == 0 {
            return Err(ProcessorError::InvalidBlockSize(spec.maximum_block_size));
        }
        if !Self::is_layout_supported(spec.num_channels, spec.num_channels) {
            return Err(ProcessorError::UnsupportedLayout {
                input: spec.num_channels,
                output: spec.num_channels,
            });
        }

        for compressor in &mut self.compressors {
            compressor.prepare(&spec);
        }
        self.crossover.prepare(&spec);
        for buffer in &mut self.filter_buffers {
            buffer.set_size(spec.num_channels, spec.maximum_block_size);
        }

        self.input_gain.set_gain_decibels(self.params.get(ParamId::GainIn));
        self.output_gain.set_gain_decibels(self.params.get(ParamId::GainOut));
        self.input_gain.prepare(&spec);
        self.output_gain.prepare(&spec);

        self.update_state();

        log::info!(
            "MultibandProcessor prepared: {} Hz, {} samples, {} ch",
            spec.sample_rate,
            spec.maximum_block_size,
            spec.num_channels
        );
        self.spec = Some(spec);
        Ok(())
    }

    /// Pull the latest parameter values into the DSP
    ///
    /// Runs at the top of every block; changes land on block boundaries.
    pub fn update_state(&mut self) {
        for compressor in &mut self.compressors {
            compressor.update_compressor_settings();
        }

        self.crossover.set_crossovers(
            self.params.get(ParamId::LowMidCrossoverFreq),
            self.params.get(ParamId::MidHighCrossoverFreq),
        );

        self.input_gain.set_gain_decibels(self.params.get(ParamId::GainIn));
        self.output_gain.set_gain_decibels(self.params.get(ParamId::GainOut));
    }

    /// Split `input` into the three filter buffers
    pub fn split_bands(&mut self, input: &AudioBuffer) {
        self.crossover.split(input, &mut self.filter_buffers);
    }

    /// Process one host block in place
    ///
    /// Unprepared processors leave the buffer untouched.
    pub fn process_block(&mut self, buffer: &mut AudioBuffer) {
        let Some(spec) = self.spec else {
            return;
        };
        debug_assert_eq!(
            buffer.num_channels(),
            spec.num_channels,
            "block channel count differs from prepare"
        );
        debug_assert!(
            buffer.num_samples() <= spec.maximum_block_size,
            "block larger than prepared maximum ({} > {})",
            buffer.num_samples(),
            spec.maximum_block_size
        );
        if buffer.is_empty() {
            return;
        }

        self.update_state();

        self.left_fifo.update(buffer);
        self.right_fifo.update(buffer);

        self.input_gain.process(buffer);

        self.split_bands(buffer);

        for (compressor, band_buffer) in self.compressors.iter_mut().zip(self.filter_buffers.iter_mut()) {
            compressor.process(band_buffer);
        }

        let routing: [BandRouting; NUM_BANDS] = std::array::from_fn(|i| self.compressors[i].routing());
        mix_bands(&self.filter_buffers, &routing, buffer);

        self.output_gain.process(buffer);
    }

    /// Processed (post-compressor) content of a band from the last block
    pub fn band_buffer(&self, band: Band) -> &AudioBuffer {
        &self.filter_buffers[band.index()]
    }

    pub fn band_levels(&self, band: Band) -> Arc<BandLevels> {
        self.compressors[band.index()].levels()
    }

    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    /// Current host setup, if prepared
    pub fn spec(&self) -> Option<ProcessSpec> {
        self.spec
    }

    /// Clear filter and envelope memory
    pub fn reset(&mut self) {
        self.crossover.reset();
        for buffer in &mut self.filter_buffers {
            buffer.clear();
        }
        for compressor in &mut self.compressors {
            compressor.reset();
        }
    }
}
