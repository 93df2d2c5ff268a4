//! # Loveless Flanger — An AU/VST3/CLAP Delay/Flanger Plugin
//!
//! A delay line with a sine-swept read head, built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug). With the LFO off it
//! is a plain feedback delay of up to two seconds; with the LFO on it
//! sweeps a short delay around a base offset for flanging and chorus.
//!
//! ## Signal Flow
//!
//! ```text
//! ch 0 ──┐
//! ch 1 ──┴─(Σ)─ input ──┬──────────────────────────── × (1 - mix) ───┐
//!                       │                                            │
//!                       └──►(−)──► [Ring Buffer] ──► delayed ─ × mix ─(+)──► output ──► every channel
//!                            ▲                          │
//!                            └──────── × feedback ──────┘
//!
//! delay = LFO speed >= 0 ? base · (1 + sin(phase) · intensity)
//!                        : smoothed Delay Time
//! ```
//!
//! The engine is mono inside. Input channels are summed, and the single
//! output sample is copied to every active output channel.

mod dsp;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::engine::{EngineConfig, FlangerDelay};
use nih_plug::prelude::*;
use params::PluginParams;

/// The main plugin struct.
///
/// `params` is shared with the host; `engine` and `active_channels` belong
/// to the audio thread and are only touched from `initialize()`, `reset()`
/// and `process()`.
struct LovelessFlanger {
    params: Arc<PluginParams>,

    /// `None` until the host tells us the sample rate.
    engine: Option<FlangerDelay>,

    /// `min(inputs, outputs)` for the negotiated layout. Only these
    /// channels are summed and written.
    active_channels: usize,
}

impl Default for LovelessFlanger {
    fn default() -> Self {
        Self {
            params: Arc::new(PluginParams::default()),
            engine: None,
            active_channels: 0,
        }
    }
}

impl Plugin for LovelessFlanger {
    const NAME: &'static str = "Loveless Flanger";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        // Mono source on a stereo track. Only the first output channel is
        // driven; see `active_channels`.
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Controls are read once per block, so there's nothing to gain from
    // the host splitting blocks at automation points.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Allocate the delay ring for the host's sample rate.
    ///
    /// Returning `false` tells the host this configuration is unusable,
    /// which is what happens if the engine rejects the sample rate.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let inputs = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(0);
        let outputs = audio_io_layout
            .main_output_channels
            .map(|c| c.get() as usize)
            .unwrap_or(0);

        if inputs != outputs {
            nih_warn!(
                "{inputs} input and {outputs} output channels, processing the first {}",
                inputs.min(outputs)
            );
        }
        self.active_channels = inputs.min(outputs);

        let config = EngineConfig::new(buffer_config.sample_rate);
        match FlangerDelay::new(config) {
            Ok(engine) => {
                nih_log!(
                    "Delay ring of {} samples at {} Hz",
                    engine.capacity(),
                    engine.sample_rate()
                );
                self.engine = Some(engine);
                true
            }
            Err(err) => {
                nih_error!("Cannot initialize the flanger: {err}");
                self.engine = None;
                false
            }
        }
    }

    /// Drop any stale echoes when playback stops.
    fn reset(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.reset();
        }
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let Some(engine) = self.engine.as_mut() else {
            return ProcessStatus::Normal;
        };

        // Controls are latched for the whole block.
        engine.begin_block(&self.params.snapshot());
        nih_debug_assert!(engine.read_index() < engine.capacity());

        // Mono downmix of the active channels, output broadcast back.
        engine.process_block(buffer.as_slice(), self.active_channels);

        match engine.tail_samples() {
            u32::MAX => ProcessStatus::KeepAlive,
            tail => ProcessStatus::Tail(tail),
        }
    }
}

impl ClapPlugin for LovelessFlanger {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-flanger-v1";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A feedback delay with an LFO-swept flanger mode");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
        ClapFeature::Flanger,
    ];
}

impl Vst3Plugin for LovelessFlanger {
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssFlanger_v01";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] = &[
        Vst3SubCategory::Fx,
        Vst3SubCategory::Delay,
        Vst3SubCategory::Modulation,
    ];
}

nih_export_clap!(LovelessFlanger);
nih_export_vst3!(LovelessFlanger);

// AUv2 entry point for Logic Pro, generated from the CLAP export.
clap_wrapper::export_auv2!();
