//! Spectrum frames for the analyzer display
//!
//! Windows a block of mono samples (Blackman-Harris), runs a real FFT and
//! converts the first `fft_size / 2` bins to dB. Frames are queued through
//! a slot channel so several can be produced before the path generator
//! catches up.
//!
//! A full-scale sine centred on a bin reads about 0 dB: the window is
//! normalised to unit mean and magnitudes are divided by the bin count.

use std::sync::Arc;

use mbcomp_core::config::FftOrder;
use mbcomp_core::fifo::{fifo, FifoConsumer, FifoProducer};
use mbcomp_core::types::gain_to_db;
use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

/// Blackman-Harris window of `size` points, scaled to a mean of 1
pub fn blackman_harris_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }
    let n = (size - 1) as f64;
    let raw: Vec<f64> = (0..size)
        .map(|i| {
            let x = 2.0 * std::f64::consts::PI * i as f64 / n;
            0.35875 - 0.48829 * x.cos() + 0.14128 * (2.0 * x).cos() - 0.01168 * (3.0 * x).cos()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    let scale = size as f64 / sum;
    raw.into_iter().map(|w| (w * scale) as f32).collect()
}

/// Produces dB magnitude frames from mono sample windows
pub struct FftDataGenerator {
    order: FftOrder,
    capacity: usize,
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    frame: Vec<f32>,
    producer: FifoProducer<Vec<f32>>,
    consumer: FifoConsumer<Vec<f32>>,
}

impl FftDataGenerator {
    /// Create a generator queueing up to `capacity` frames
    pub fn new(order: FftOrder, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let fft_size = order.fft_size();
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let (producer, consumer) = fifo(capacity, || vec![0.0f32; fft_size / 2]);

        Self {
            order,
            capacity,
            input: fft.make_input_vec(),
            spectrum: fft.make_output_vec(),
            scratch: fft.make_scratch_vec(),
            fft,
            window: blackman_harris_window(fft_size),
            frame: vec![0.0; fft_size / 2],
            producer,
            consumer,
        }
    }

    /// Switch FFT size, discarding any queued frames
    pub fn change_order(&mut self, order: FftOrder) {
        if order != self.order {
            log::debug!("FftDataGenerator: {:?} -> {:?}", self.order, order);
            *self = Self::new(order, self.capacity);
        }
    }

    pub fn order(&self) -> FftOrder {
        self.order
    }

    pub fn fft_size(&self) -> usize {
        self.order.fft_size()
    }

    /// Bins per frame (half the FFT size)
    pub fn num_bins(&self) -> usize {
        self.fft_size() / 2
    }

    /// Analyse the first `fft_size` samples of `audio` and queue the frame
    ///
    /// Shorter input is zero-padded. Non-finite magnitudes become 0 before
    /// the dB conversion, so every value in the frame is at least
    /// `negative_infinity`. Returns `false` when the frame queue is full.
    pub fn produce_fft_data_for_rendering(&mut self, audio: &[f32], negative_infinity: f32) -> bool {
        let fft_size = self.fft_size();
        let n = audio.len().min(fft_size);

        self.input[..n].copy_from_slice(&audio[..n]);
        self.input[n..].fill(0.0);
        for (sample, w) in self.input.iter_mut().zip(&self.window) {
            *sample *= w;
        }

        if let Err(e) = self
            .fft
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
        {
            log::warn!("FftDataGenerator: FFT failed: {:?}", e);
            return false;
        }

        let num_bins = self.num_bins() as f32;
        for (out, bin) in self.frame.iter_mut().zip(&self.spectrum) {
            let magnitude = bin.norm();
            let magnitude = if magnitude.is_finite() {
                magnitude / num_bins
            } else {
                0.0
            };
            *out = gain_to_db(magnitude, negative_infinity);
        }

        self.producer.push(&self.frame)
    }

    pub fn num_available_fft_data_blocks(&self) -> usize {
        self.consumer.num_available_for_reading()
    }

    /// Take the oldest queued frame
    pub fn get_fft_data(&mut self, out: &mut Vec<f32>) -> bool {
        self.consumer.exchange(out)
    }
}
