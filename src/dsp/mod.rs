//! # DSP Building Blocks
//!
//! - **`delay_line`**: fixed-capacity ring buffer read on the sample grid.
//! - **`smoother`**: one-pole smoother for the manual delay time.
//! - **`lfo`**: sine LFO with a phase that never leaves `[0, 2π)`.
//! - **`engine`**: the delay/flanger itself, tying the three together.
//!
//! Nothing in here knows about nih-plug; the plugin glue in `lib.rs` feeds
//! it plain `f32`s.

pub mod delay_line;
pub mod engine;
pub mod lfo;
pub mod smoother;
