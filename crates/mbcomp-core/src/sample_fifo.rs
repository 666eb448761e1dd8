//! Single-channel sample channel from the audio thread to the analyzer
//!
//! The audio thread hands whole host blocks of one channel to the
//! [`SampleFifoWriter`]; the UI drains them from the [`SampleFifoReader`]
//! and folds them into a fixed-length [`SlidingWindow`] so the analysis
//! window never depends on the host block size.
//!
//! ```text
//!  audio thread                         UI timer
//!  ────────────                         ────────
//!  update(buffer) ─▶ [slot × capacity] ─▶ get_audio_buffer(out)
//!                                            │
//!                                            ▼
//!                                     SlidingWindow::append
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::fifo::{fifo, FifoConsumer, FifoProducer};
use crate::types::{AudioBuffer, Sample};

/// Which channel of the host buffer a sample channel taps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    pub fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }
}

/// Create a connected writer/reader pair
///
/// Every slot is allocated here with room for `max_chunk_samples`, which is
/// also the longest piece the writer ever pushes.
pub fn sample_fifo(
    channel: Channel,
    capacity: usize,
    max_chunk_samples: usize,
) -> (SampleFifoWriter, SampleFifoReader) {
    let max_chunk_samples = max_chunk_samples.max(1);
    let (producer, consumer) = fifo(capacity, || Vec::with_capacity(max_chunk_samples));
    let dropped = Arc::new(AtomicUsize::new(0));

    let writer = SampleFifoWriter {
        channel,
        producer,
        chunk: Vec::with_capacity(max_chunk_samples),
        max_chunk_samples,
        dropped: Arc::clone(&dropped),
    };
    let reader = SampleFifoReader {
        channel,
        consumer,
        dropped,
        max_chunk_samples,
    };
    (writer, reader)
}

/// Audio-thread half: pushes one channel of each host block
pub struct SampleFifoWriter {
    channel: Channel,
    producer: FifoProducer<Vec<Sample>>,
    chunk: Vec<Sample>,
    max_chunk_samples: usize,
    dropped: Arc<AtomicUsize>,
}

impl SampleFifoWriter {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Push this writer's channel of `buffer`
    ///
    /// A mono buffer feeds both the left and right writers from channel 0.
    /// Blocks longer than the slot size go out as consecutive chunks. When
    /// the channel is full the chunk is dropped and counted; this never
    /// blocks or allocates.
    pub fn update(&mut self, buffer: &AudioBuffer) {
        let num_channels = buffer.num_channels();
        if num_channels == 0 || buffer.num_samples() == 0 {
            return;
        }
        let source = buffer.channel(self.channel.index().min(num_channels - 1));

        for piece in source.chunks(self.max_chunk_samples) {
            self.chunk.clear();
            self.chunk.extend_from_slice(piece);
            if !self.producer.push(&self.chunk) {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// UI half: drains pushed blocks in order
pub struct SampleFifoReader {
    channel: Channel,
    consumer: FifoConsumer<Vec<Sample>>,
    dropped: Arc<AtomicUsize>,
    max_chunk_samples: usize,
}

impl SampleFifoReader {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Blocks pushed and not yet read
    pub fn num_complete_buffers_available(&self) -> usize {
        self.consumer.num_available_for_reading()
    }

    /// Longest block the writer pushes, and the capacity of every slot
    pub fn max_chunk_samples(&self) -> usize {
        self.max_chunk_samples
    }

    /// Take the oldest block into `out`
    ///
    /// Give `out` at least the slot capacity and the block is swapped in
    /// rather than copied. Returns `false` when nothing is waiting.
    pub fn get_audio_buffer(&mut self, out: &mut Vec<Sample>) -> bool {
        self.consumer.exchange(out)
    }

    /// Chunks the writer has discarded because the channel was full
    pub fn dropped_blocks(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Fixed-length window over the most recent samples
///
/// Appending shifts the contents left by the incoming length and writes the
/// new samples at the tail. Incoming blocks at least as long as the window
/// replace it with their last `len` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow {
    samples: Vec<Sample>,
}

impl SlidingWindow {
    /// Create a silent window of `len` samples
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
        }
    }

    pub fn append(&mut self, incoming: &[Sample]) {
        let len = self.samples.len();
        if len == 0 {
            return;
        }
        if incoming.len() >= len {
            self.samples.copy_from_slice(&incoming[incoming.len() - len..]);
            return;
        }
        let n = incoming.len();
        self.samples.copy_within(n.., 0);
        self.samples[len - n..].copy_from_slice(incoming);
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Change the window length and clear it to silence
    pub fn resize(&mut self, len: usize) {
        self.samples.clear();
        self.samples.resize(len, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fifo::DEFAULT_FIFO_CAPACITY;

    #[test]
    fn test_writer_taps_selected_channel() {
        let (mut left_tx, mut left_rx) = sample_fifo(Channel::Left, 4, 16);
        let (mut right_tx, mut right_rx) = sample_fifo(Channel::Right, 4, 16);

        let buffer = AudioBuffer::from_channels(&[&[1.0, 2.0], &[-1.0, -2.0]]);
        left_tx.update(&buffer);
        right_tx.update(&buffer);

        let mut out = Vec::with_capacity(16);
        assert!(left_rx.get_audio_buffer(&mut out));
        assert_eq!(out, vec![1.0, 2.0]);
        assert!(right_rx.get_audio_buffer(&mut out));
        assert_eq!(out, vec![-1.0, -2.0]);
    }

    #[test]
    fn test_reader_swaps_into_chunk_sized_buffer() {
        let (mut tx, mut rx) = sample_fifo(Channel::Left, 4, 16);
        assert_eq!(rx.max_chunk_samples(), 16);
        tx.update(&AudioBuffer::from_channels(&[&[0.5; 8]]));

        let mut out = Vec::with_capacity(rx.max_chunk_samples());
        let before = out.as_ptr();
        assert!(rx.get_audio_buffer(&mut out));
        assert_eq!(out, vec![0.5; 8]);
        // Swapped, not copied: `out` now owns the slot's allocation
        assert_ne!(out.as_ptr(), before);
        assert!(out.capacity() >= 16);
    }

    #[test]
    fn test_mono_feeds_right_from_channel_zero() {
        let (mut tx, mut rx) = sample_fifo(Channel::Right, 4, 16);
        tx.update(&AudioBuffer::from_channels(&[&[0.25, 0.5]]));

        let mut out = Vec::new();
        assert!(rx.get_audio_buffer(&mut out));
        assert_eq!(out, vec![0.25, 0.5]);
    }

    #[test]
    fn test_long_blocks_are_chunked() {
        let (mut tx, mut rx) = sample_fifo(Channel::Left, 8, 4);
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        tx.update(&AudioBuffer::from_channels(&[&samples]));

        assert_eq!(rx.num_complete_buffers_available(), 3);
        let mut out = Vec::new();
        let mut all = Vec::new();
        while rx.get_audio_buffer(&mut out) {
            assert!(out.len() <= 4);
            all.extend_from_slice(&out);
        }
        assert_eq!(all, samples);
    }

    #[test]
    fn test_full_channel_counts_drops() {
        let (mut tx, rx) = sample_fifo(Channel::Left, DEFAULT_FIFO_CAPACITY, 64);
        let buffer = AudioBuffer::new(2, 64);
        for _ in 0..DEFAULT_FIFO_CAPACITY + 5 {
            tx.update(&buffer);
        }
        assert_eq!(rx.num_complete_buffers_available(), DEFAULT_FIFO_CAPACITY);
        assert_eq!(rx.dropped_blocks(), 5);
    }

    #[test]
    fn test_empty_buffer_pushes_nothing() {
        let (mut tx, rx) = sample_fifo(Channel::Left, 4, 16);
        tx.update(&AudioBuffer::new(2, 0));
        tx.update(&AudioBuffer::default());
        assert_eq!(rx.num_complete_buffers_available(), 0);
    }

    #[test]
    fn test_sliding_window_shifts_and_appends() {
        let mut window = SlidingWindow::new(5);
        window.append(&[1.0, 2.0]);
        assert_eq!(window.as_slice(), &[0.0, 0.0, 0.0, 1.0, 2.0]);
        window.append(&[3.0, 4.0, 5.0]);
        assert_eq!(window.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        window.append(&[6.0]);
        assert_eq!(window.as_slice(), &[2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_sliding_window_keeps_most_recent_of_long_block() {
        let mut window = SlidingWindow::new(3);
        window.append(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(window.as_slice(), &[5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_sliding_window_resize_clears() {
        let mut window = SlidingWindow::new(2);
        window.append(&[1.0, 1.0]);
        window.resize(4);
        assert_eq!(window.len(), 4);
        assert!(window.as_slice().iter().all(|&s| s == 0.0));
    }
}
