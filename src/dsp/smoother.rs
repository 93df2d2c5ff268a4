//! # One-Pole Smoother
//!
//! The same one-pole lowpass you would put in a feedback path, applied to a
//! control value instead of audio. It slews the manual delay time so that a
//! sudden jump of the "Delay Time" knob moves the read head gradually
//! instead of teleporting it (which you would hear as a click or a pitch
//! glitch).
//!
//! ```text
//! y[n] = (1 - α) * y[n-1] + α * x[n]
//! ```
//!
//! `α` is the fraction of the remaining distance covered per update. The
//! engine updates once per processing block, so the time it takes to settle
//! depends on the host's block size: with α = 0.005 and 128-sample blocks
//! at 44.1 kHz, about 63% of a jump is covered after 200 blocks (~0.6 s).

/// One-pole exponential smoother with a fixed coefficient.
pub struct OnePoleSmoother {
    /// Weight of the new target per update, in `(0, 1]`.
    coefficient: f32,

    /// The smoother's only state: the last output.
    current: f32,
}

impl OnePoleSmoother {
    /// Create a smoother starting from `initial`.
    pub fn new(coefficient: f32, initial: f32) -> Self {
        debug_assert!(coefficient > 0.0 && coefficient <= 1.0);

        Self {
            coefficient,
            current: initial,
        }
    }

    /// Move one step towards `target` and return the new value.
    pub fn next(&mut self, target: f32) -> f32 {
        let next = (1.0 - self.coefficient) * self.current + self.coefficient * target;

        // A NaN target would otherwise stick forever.
        self.current = if next.is_finite() { next } else { target };
        self.current
    }

    /// Last value returned by [`next()`](Self::next).
    #[cfg(test)]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Jump straight to `value`.
    pub fn reset(&mut self, value: f32) {
        self.current = value;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// First step from zero covers exactly α of the distance.
    #[test]
    fn test_first_step_is_alpha_of_target() {
        let mut s = OnePoleSmoother::new(0.005, 0.0);

        let value = s.next(0.5);
        assert!(
            (value - 0.0025).abs() < 1e-7,
            "Expected 0.0025 after one step, got {value}"
        );
    }

    #[test]
    fn test_converges_to_target() {
        let mut s = OnePoleSmoother::new(0.005, 0.0);

        let mut value = 0.0;
        for _ in 0..10_000 {
            value = s.next(1.0);
        }

        assert!((value - 1.0).abs() < 1e-4, "Expected ~1.0, got {value}");
    }

    /// Each step closes the gap by a factor of (1 - α), so the output
    /// never overshoots and never jumps.
    #[test]
    fn test_monotonic_without_overshoot() {
        let mut s = OnePoleSmoother::new(0.005, 0.2);

        let mut prev = s.current();
        for _ in 0..2_000 {
            let value = s.next(1.5);
            assert!(value >= prev, "Smoother went backwards: {prev} -> {value}");
            assert!(value <= 1.5, "Smoother overshot: {value}");
            assert!(value - prev <= 0.005 * 1.3 + 1e-6, "Step too large");
            prev = value;
        }
    }

    #[test]
    fn test_unit_coefficient_passes_through() {
        let mut s = OnePoleSmoother::new(1.0, 0.0);

        assert_eq!(s.next(0.75), 0.75);
        assert_eq!(s.next(-0.25), -0.25);
    }

    #[test]
    fn test_recovers_from_nan_target() {
        let mut s = OnePoleSmoother::new(0.5, 0.0);

        s.next(f32::NAN);
        let value = s.next(1.0);
        assert!(value.is_finite(), "Smoother stuck on NaN");
        assert!((value - 1.0).abs() < 1e-6, "Expected to snap to 1.0, got {value}");
    }

    #[test]
    fn test_reset() {
        let mut s = OnePoleSmoother::new(0.005, 0.0);

        s.next(2.0);
        s.reset(0.3);
        assert_eq!(s.current(), 0.3);
    }
}
