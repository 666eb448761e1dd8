//! Lock-free float cell
//!
//! `f32` stored as its bit pattern in an `AtomicU32`. Loads and stores are
//! single machine words, so a reader never observes a torn value.

use std::sync::atomic::{AtomicU32, Ordering};

/// An `f32` that can be shared between the audio thread and the UI thread
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    /// Create a new cell holding `value`
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    /// Read the current value
    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Replace the current value
    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}
