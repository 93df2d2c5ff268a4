//! # Sine LFO
//!
//! A low-frequency oscillator that sweeps the flanger's delay time. The
//! phase is kept in radians in `[0, 2π)` and wrapped every time it is
//! advanced, so it stays numerically stable no matter how long the plugin
//! runs.
//!
//! The engine advances the LFO once per processing block by
//! `2π · speed / sample_rate`, so the audible sweep rate scales with the
//! host's block size.

use std::f32::consts::TAU;

/// Sine oscillator for sweeping the delay time, advanced once per block.
pub struct SineLfo {
    /// Current phase in radians, always in `[0, 2π)`.
    phase: f32,
}

impl SineLfo {
    /// Start at phase zero, where `sin` is 0 and rising.
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Current phase in radians.
    #[cfg(test)]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance by `2π · speed_hz / sample_rate` and return `sin(phase)`.
    ///
    /// Negative speeds run the phase backwards; it is wrapped the same way.
    pub fn advance(&mut self, speed_hz: f32, sample_rate: f32) -> f32 {
        self.phase += TAU * speed_hz / sample_rate;

        if self.phase >= TAU {
            self.phase -= TAU;
        }
        // One subtraction covers every sane speed. Huge or negative steps
        // and NaN fall through to the slow path.
        if !(0.0..TAU).contains(&self.phase) {
            self.phase = wrap_phase(self.phase);
        }

        self.phase.sin()
    }

    /// Rewind to phase zero.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

impl Default for SineLfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Map any phase into `[0, 2π)`. Non-finite input restarts at zero.
fn wrap_phase(phase: f32) -> f32 {
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase.rem_euclid(TAU);
    // `rem_euclid` can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
