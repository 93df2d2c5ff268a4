//! # Delay/Flanger Engine
//!
//! The whole effect lives in one owned struct, [`FlangerDelay`]. It is mono
//! inside: the plugin sums the input channels before calling
//! [`process_sample()`](FlangerDelay::process_sample) and copies the result
//! to every output channel.
//!
//! ## Per block
//!
//! ```text
//! smoothed  = (1 - α) * smoothed + α * delay_time
//! lfo       = sin(phase += 2π * lfo_speed / sample_rate)
//! effective = if lfo_speed >= 0 { base + lfo * intensity * base }
//!             else              { smoothed }
//! delay     = trunc(sample_rate * effective)      // whole samples
//! ```
//!
//! The sign of `lfo_speed` is the mode switch. Any non-negative speed
//! (including zero) means "flanger"; a negative speed hands the read head
//! back to the smoothed manual delay time.
//!
//! ## Per sample
//!
//! ```text
//! delayed = ring[write - delay]
//! output  = (1 - mix) * input + mix * delayed
//! ring[write] = input - feedback * delayed;  write += 1
//! ```
//!
//! Feedback is *subtracted*, so each repeat flips sign.

use std::num::NonZeroUsize;

use thiserror::Error;

use super::delay_line::DelayLine;
use super::lfo::SineLfo;
use super::smoother::OnePoleSmoother;

/// Longest delay the engine is built for. The "Delay Time" control tops
/// out here, so the ring never has to serve a longer request.
pub const MAX_DELAY_SECONDS: f32 = 2.0;

/// One-pole coefficient applied to the manual delay time once per block.
pub const DELAY_SMOOTHING: f32 = 0.005;

/// Reasons the engine refuses a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("max delay must hold at least one sample, got {0} s")]
    InvalidMaxDelay(f32),

    #[error("smoothing coefficient must be in (0, 1], got {0}")]
    InvalidSmoothing(f32),

    #[error("{seconds} s at {sample_rate} Hz does not fit in memory")]
    CapacityTooLarge { seconds: f32, sample_rate: f32 },
}

/// Fixed parameters of an engine instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub max_delay_seconds: f32,
    pub smoothing: f32,
}

impl EngineConfig {
    /// Default limits at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            max_delay_seconds: MAX_DELAY_SECONDS,
            smoothing: DELAY_SMOOTHING,
        }
    }

    #[cfg(test)]
    pub fn with_max_delay(mut self, seconds: f32) -> Self {
        self.max_delay_seconds = seconds;
        self
    }

    #[cfg(test)]
    pub fn with_smoothing(mut self, coefficient: f32) -> Self {
        self.smoothing = coefficient;
        self
    }

    /// Check the scalar settings that don't depend on the ring size.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.check_sample_rate()?;
        if !self.smoothing.is_finite() || self.smoothing <= 0.0 || self.smoothing > 1.0 {
            return Err(EngineError::InvalidSmoothing(self.smoothing));
        }
        Ok(())
    }

    /// Ring size: `sample_rate × max_delay_seconds + 1`.
    ///
    /// The product is truncated to whole samples. The extra slot is the
    /// guard that lets the full `max_delay_seconds` be read back.
    pub fn capacity(&self) -> Result<NonZeroUsize, EngineError> {
        self.check_sample_rate()?;
        if !self.max_delay_seconds.is_finite() || self.max_delay_seconds < 0.0 {
            return Err(EngineError::InvalidMaxDelay(self.max_delay_seconds));
        }

        let samples = f64::from(self.sample_rate) * f64::from(self.max_delay_seconds);
        if samples < 1.0 {
            return Err(EngineError::InvalidMaxDelay(self.max_delay_seconds));
        }
        // The allocation size in bytes has to fit in a usize.
        if samples >= (usize::MAX / std::mem::size_of::<f32>()) as f64 {
            return Err(EngineError::CapacityTooLarge {
                seconds: self.max_delay_seconds,
                sample_rate: self.sample_rate,
            });
        }

        NonZeroUsize::new(samples as usize + 1)
            .ok_or(EngineError::InvalidMaxDelay(self.max_delay_seconds))
    }

    fn check_sample_rate(&self) -> Result<(), EngineError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(self.sample_rate));
        }
        Ok(())
    }
}

/// The control values for one processing block.
///
/// Times are in seconds, speeds in Hz, everything else is a 0..1 ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSnapshot {
    /// Manual delay time, used when the LFO is switched off.
    pub delay_time: f32,
    /// Dry/wet crossfade. 0 = dry only, 1 = wet only.
    pub mix: f32,
    /// Fraction of the delayed signal subtracted before it is stored.
    pub feedback: f32,
    /// LFO rate. Negative disables flanging.
    pub lfo_speed: f32,
    /// Depth of the sweep relative to `base_delay`.
    pub lfo_intensity: f32,
    /// Centre of the flanger sweep.
    pub base_delay: f32,
}

impl ControlSnapshot {
    pub fn flanging(&self) -> bool {
        self.lfo_speed >= 0.0
    }
}

impl Default for ControlSnapshot {
    fn default() -> Self {
        Self {
            delay_time: 0.5,
            mix: 0.0,
            feedback: 0.0,
            lfo_speed: 0.0,
            lfo_intensity: 0.0,
            base_delay: 0.0,
        }
    }
}

/// Combined delay line and flanger.
///
/// Everything is allocated in [`new()`](Self::new). `begin_block()` and
/// `process_sample()` never allocate, lock or loop over data.
pub struct FlangerDelay {
    sample_rate: f32,
    delay_line: DelayLine,
    delay_smoother: OnePoleSmoother,
    lfo: SineLfo,

    // Latched by begin_block() for the rest of the block.
    effective_delay: f32,
    delay_samples: usize,
    mix: f32,
    feedback: f32,
}

impl FlangerDelay {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let capacity = config.capacity()?;

        Ok(Self {
            sample_rate: config.sample_rate,
            delay_line: DelayLine::new(capacity),
            delay_smoother: OnePoleSmoother::new(config.smoothing, 0.0),
            lfo: SineLfo::new(),
            effective_delay: 0.0,
            delay_samples: 1,
            mix: 0.0,
            feedback: 0.0,
        })
    }

    /// Sample rate the ring was sized for, in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of slots in the delay ring.
    pub fn capacity(&self) -> usize {
        self.delay_line.capacity()
    }

    /// Delay time in seconds chosen by the last `begin_block()`.
    #[cfg(test)]
    pub fn effective_delay(&self) -> f32 {
        self.effective_delay
    }

    /// Delay in whole samples for the current block.
    #[cfg(test)]
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    #[cfg(test)]
    pub fn smoothed_delay(&self) -> f32 {
        self.delay_smoother.current()
    }

    #[cfg(test)]
    pub fn lfo_phase(&self) -> f32 {
        self.lfo.phase()
    }

    /// Ring slot the next `process_sample()` call reads from.
    pub fn read_index(&self) -> usize {
        self.delay_line.read_index(self.delay_samples)
    }

    /// Latch a control snapshot for the coming block.
    pub fn begin_block(&mut self, controls: &ControlSnapshot) {
        let smoothed = self.delay_smoother.next(controls.delay_time);
        let lfo = self.lfo.advance(controls.lfo_speed, self.sample_rate);

        self.effective_delay = if controls.flanging() {
            controls.base_delay + lfo * controls.lfo_intensity * controls.base_delay
        } else {
            smoothed
        };
        self.delay_samples = self.seconds_to_samples(self.effective_delay);
        self.mix = finite_or_zero(controls.mix);
        self.feedback = finite_or_zero(controls.feedback);
    }

    /// Run one mono sample through the delay and return the mixed output.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let delayed = self.delay_line.read(self.delay_samples);
        let output = (1.0 - self.mix) * input + self.mix * delayed;

        // A non-finite sample would recirculate through the ring forever.
        self.delay_line.write(finite_or_zero(input - self.feedback * delayed));
        self.delay_line.advance();

        output
    }

    /// Run a block of planar audio through the engine.
    ///
    /// The first `active_channels` channels are summed into one mono input
    /// per frame, and the mono output is written back to each of them.
    /// Channels past `active_channels` are left untouched.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]], active_channels: usize) {
        let active = active_channels.min(channels.len());
        let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);

        for frame in 0..frames {
            let input: f32 = channels[..active].iter().map(|c| c[frame]).sum();
            let output = self.process_sample(input);
            for channel in channels[..active].iter_mut() {
                channel[frame] = output;
            }
        }
    }

    /// How many samples the echoes need to fall below -60 dB.
    ///
    /// Each pass through the loop scales the repeat by `|feedback|`, so
    /// after N passes the level is `|feedback|^N`. Solving for 0.001 gives
    /// `N = -3 / log10(|feedback|)`.
    pub fn tail_samples(&self) -> u32 {
        let delay = self.delay_samples as f32;
        let feedback = self.feedback.abs();

        if feedback > 0.001 && feedback < 1.0 {
            let repeats = -3.0 / feedback.log10();
            (repeats * delay) as u32
        } else if feedback >= 1.0 {
            // Never decays.
            u32::MAX
        } else {
            delay as u32
        }
    }

    /// Silence the ring and restart the smoother and LFO.
    pub fn reset(&mut self) {
        self.delay_line.clear();
        self.delay_smoother.reset(0.0);
        self.lfo.reset();
        self.effective_delay = 0.0;
        self.delay_samples = 1;
    }

    /// Truncate to the sample grid and keep the request inside the ring.
    ///
    /// Zero is raised to one: the ring is read before the current sample
    /// is written, so one sample is the shortest delay it can produce.
    /// `as usize` saturates, so negative or NaN times end up at one too.
    fn seconds_to_samples(&self, seconds: f32) -> usize {
        let samples = (self.sample_rate * seconds) as usize;
        samples.clamp(1, self.delay_line.max_delay())
    }
}

#[inline]
fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
