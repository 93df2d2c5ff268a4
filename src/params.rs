//! # Plugin Parameters
//!
//! The six controls the host shows for the flanger. Each one has a stable
//! string ID (`#[id = "..."]`) used for presets and automation. Don't
//! rename published IDs.
//!
//! None of these use nih-plug's smoothers. The engine reads every control
//! once per block through [`PluginParams::snapshot()`] and applies its own
//! one-pole smoothing to the manual delay time only. Mix, feedback and the
//! LFO controls take effect at the next block boundary.
//!
//! ## The LFO speed doubles as an on/off switch
//!
//! Any speed of 0 Hz or more puts the engine in flanger mode, where the
//! delay sweeps around "Base Delay". Dragging the speed below zero turns
//! the sweep off and hands the delay back to the "Delay Time" knob. The
//! host displays negative speeds as "Off".

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::engine::{ControlSnapshot, MAX_DELAY_SECONDS};

/// All user-facing parameters of the flanger.
#[derive(Params)]
pub struct PluginParams {
    /// **Delay Time**: the manual delay in seconds, used while the LFO is
    /// off. Bounded by the size of the delay ring, so the engine never has
    /// to clamp a request in normal use.
    #[id = "delay"]
    pub delay_time: FloatParam,

    /// **Mix**: 0% is the dry input, 100% is only the delayed signal.
    #[id = "mix"]
    pub mix: FloatParam,

    /// **Feedback**: how much of the delayed signal is subtracted from the
    /// input before it is stored. High values give a resonant, metallic
    /// comb.
    #[id = "fdbk"]
    pub feedback: FloatParam,

    /// **LFO Speed**: sweep rate in Hz. Negative means off.
    #[id = "lfo_speed"]
    pub lfo_speed: FloatParam,

    /// **LFO Intensity**: sweep depth as a fraction of the base delay. At
    /// 100% the delay swings between zero and twice the base delay.
    #[id = "lfo_depth"]
    pub lfo_intensity: FloatParam,

    /// **Base Delay**: centre of the flanger sweep, 0 to 100 ms.
    #[id = "base_delay"]
    pub base_delay: FloatParam,
}

impl PluginParams {
    /// Read every control once for the coming block.
    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            delay_time: self.delay_time.value(),
            mix: self.mix.value(),
            feedback: self.feedback.value(),
            lfo_speed: self.lfo_speed.value(),
            lfo_intensity: self.lfo_intensity.value(),
            base_delay: self.base_delay.value(),
        }
    }
}

impl Default for PluginParams {
    fn default() -> Self {
        Self {
            delay_time: FloatParam::new(
                "Delay Time",
                0.5,
                FloatRange::Linear {
                    min: 0.0,
                    max: MAX_DELAY_SECONDS,
                },
            )
            .with_unit(" s")
            .with_step_size(0.00001),

            mix: FloatParam::new("Mix", 0.0, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_step_size(0.0001)
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            feedback: FloatParam::new("Feedback", 0.0, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_step_size(0.0001)
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            lfo_speed: FloatParam::new(
                "LFO Speed",
                0.0,
                FloatRange::Linear {
                    min: -1.0,
                    max: 5.0,
                },
            )
            .with_step_size(0.0001)
            .with_value_to_string(lfo_speed_to_string())
            .with_string_to_value(string_to_lfo_speed()),

            lfo_intensity: FloatParam::new(
                "LFO Intensity",
                0.0,
                FloatRange::Linear { min: 0.0, max: 1.0 },
            )
            .with_unit("%")
            .with_step_size(0.001)
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            base_delay: FloatParam::new(
                "Base Delay",
                0.0,
                FloatRange::Linear { min: 0.0, max: 0.1 },
            )
            .with_unit(" s")
            .with_step_size(0.0001),
        }
    }
}

/// "Off" below zero, otherwise the rate in Hz.
fn lfo_speed_to_string() -> Arc<dyn Fn(f32) -> String + Send + Sync> {
    Arc::new(|value| {
        if value < 0.0 {
            String::from("Off")
        } else {
            format!("{value:.2} Hz")
        }
    })
}

fn string_to_lfo_speed() -> Arc<dyn Fn(&str) -> Option<f32> + Send + Sync> {
    Arc::new(|string| {
        let string = string.trim();
        if string.eq_ignore_ascii_case("off") {
            return Some(-1.0);
        }
        string
            .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c.is_whitespace())
            .parse()
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_matches_engine_defaults() {
        let params = PluginParams::default();

        assert_eq!(params.snapshot(), ControlSnapshot::default());
    }

    /// The defaults leave the effect transparent: dry mix, flanger mode
    /// with a zero base delay.
    #[test]
    fn test_defaults_are_transparent() {
        let snapshot = PluginParams::default().snapshot();

        assert_eq!(snapshot.mix, 0.0);
        assert!(snapshot.flanging());
        assert_eq!(snapshot.base_delay, 0.0);
    }

    #[test]
    fn test_lfo_speed_display() {
        let to_string = lfo_speed_to_string();

        assert_eq!(to_string(-0.5), "Off");
        assert_eq!(to_string(0.0), "0.00 Hz");
        assert_eq!(to_string(2.5), "2.50 Hz");
    }

    #[test]
    fn test_lfo_speed_parsing() {
        let from_string = string_to_lfo_speed();

        assert_eq!(from_string("Off"), Some(-1.0));
        assert_eq!(from_string(" off "), Some(-1.0));
        assert_eq!(from_string("2.5 Hz"), Some(2.5));
        assert_eq!(from_string("3"), Some(3.0));
        assert_eq!(from_string("fast"), None);
    }
}
