//! synthcore-effects - Stereo effect implementations for the reorderable
//! effects chain.
//!
//! Every effect here implements [`synthcore_core::EffectModel`]: in-place
//! interleaved stereo processing, named-parameter access, and a `mix` (or,
//! for [`Reverb`], explicit `wet_level`/`dry_level`) contract where the
//! fully-dry setting reproduces the input exactly.
//!
//! - [`Biquad`] - Low-pass/high-pass/band-pass/notch second-order filter
//! - [`Ladder`] - Moog-style cascaded one-pole filter with resonance feedback
//! - [`Comb`] - FIR/IIR comb filter with LFO-modulated delay
//! - [`Formant`] - Vowel formant filter with morphable vowel/gender
//! - [`Delay`] - Stereo feedback delay line
//! - [`Reverb`] - Freeverb-style algorithmic reverb
//! - [`Compressor`] - Peak compressor with soft knee
//! - [`Distortion`] - Four-character waveshaping distortion with tone control
//! - [`Saturation`] - Gentler analog-flavored saturation
//! - [`Bitcrusher`] - Bit-depth and sample-rate reduction
//! - [`Phaser`] - Cascaded allpass phaser, 2-12 stages
//! - [`Modulation`] - Shared chorus/flanger engine ([`ModulationVoicing`])
//! - [`ThreeBandEq`] - Low/mid/high shelving and peaking EQ
//!
//! ## Example
//!
//! ```rust,ignore
//! use synthcore_core::EffectModel;
//! use synthcore_effects::{Distortion, Reverb};
//!
//! let mut dist = Distortion::new(48000.0);
//! dist.set_parameter("drive", 8.0);
//!
//! let mut reverb = Reverb::new(48000.0);
//! reverb.set_parameter("wet_level", 30.0);
//!
//! let mut buffer = vec![0.0f32; 1024 * 2];
//! dist.process(&mut buffer, 1024);
//! reverb.process(&mut buffer, 1024);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod bitcrusher;
pub mod comb;
pub mod compressor;
pub mod delay;
pub mod distortion;
pub mod eq;
pub mod formant;
pub mod ladder;
pub mod modulation;
pub mod phaser;
pub mod reverb;
pub mod saturation;

// Re-export main types at crate root
pub use biquad::{Biquad, BiquadKind};
pub use bitcrusher::Bitcrusher;
pub use comb::{Comb, CombMode};
pub use compressor::Compressor;
pub use delay::Delay;
pub use distortion::{Distortion, DistortionType};
pub use eq::ThreeBandEq;
pub use formant::Formant;
pub use ladder::{Ladder, LadderMode};
pub use modulation::{Modulation, ModulationVoicing};
pub use phaser::Phaser;
pub use reverb::Reverb;
pub use saturation::{Saturation, SaturationType};
