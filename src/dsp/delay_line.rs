//! # Delay Line (Ring Buffer)
//!
//! A delay line stores audio samples and lets you read them back after a
//! whole number of samples. Think of a tape loop with a write head and a
//! read head trailing it: the gap between the heads is the delay.
//!
//! ## Sample-grid reads
//!
//! Unlike a chorus that interpolates between neighbours, this line only
//! reads whole sample positions. The flanger's delay time is truncated to
//! the sample grid before it gets here, so a 10.007 ms delay at 44100 Hz
//! becomes 441 samples, not 441.3. That quantization is part of the sound.
//!
//! ## Capacity and the guard sample
//!
//! The buffer holds `sample_rate × max_delay_seconds + 1` slots. The extra
//! slot means the full `max_delay_seconds` fits without the read head ever
//! landing on the slot the write head is about to overwrite:
//!
//! ```text
//! read_index = (write_pos + capacity - delay) % capacity
//! ```
//!
//! With `delay = capacity - 1` this lands one slot *ahead* of the write
//! head.

use std::num::NonZeroUsize;

/// A fixed-capacity ring buffer of `f32` samples.
///
/// Allocated once and reused for the lifetime of the plugin instance.
/// Nothing in here allocates after construction.
pub struct DelayLine {
    /// Zero-initialized storage. The length never changes.
    buffer: Vec<f32>,

    /// Slot that the next call to [`write()`](Self::write) fills.
    /// Advances by exactly one per processed sample.
    write_pos: usize,
}

impl DelayLine {
    /// Create a delay line holding `capacity` samples of silence.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            buffer: vec![0.0; capacity.get()],
            write_pos: 0,
        }
    }

    /// Number of slots in the ring.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Longest delay the ring can serve, in samples.
    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Slot the next [`write()`](Self::write) will fill.
    #[cfg(test)]
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Ring index of the sample written `delay_samples` samples ago.
    ///
    /// Delays longer than [`max_delay()`](Self::max_delay) are clamped so
    /// the subtraction can never underflow.
    pub fn read_index(&self, delay_samples: usize) -> usize {
        let capacity = self.buffer.len();
        let delay = delay_samples.min(capacity - 1);
        (self.write_pos + capacity - delay) % capacity
    }

    /// Read the sample written `delay_samples` samples ago.
    ///
    /// Call this *before* [`write()`](Self::write) for the current sample,
    /// otherwise a delay of zero would read back the value just stored.
    pub fn read(&self, delay_samples: usize) -> f32 {
        self.buffer[self.read_index(delay_samples)]
    }

    /// Store a sample at the write head. Does not advance.
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
    }

    /// Move the write head forward one slot, wrapping at capacity.
    pub fn advance(&mut self) {
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Silence the whole ring and rewind the write head.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
