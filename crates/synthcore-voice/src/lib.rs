//! synthcore-voice - Voice synthesis engine: oscillators, envelopes, voice
//! allocation, and modulation routing.
//!
//! This crate provides the per-channel synthesis building blocks used by
//! `synthcore-engine`'s `ChannelSynthesizer`/`MultiTimbralEngine`: oscillators,
//! envelopes, voice management, and a generic modulation matrix.
//!
//! # Core Components
//!
//! ## Oscillators
//!
//! Audio-rate oscillators with PolyBLEP anti-aliasing:
//!
//! - [`Oscillator`] - Main audio oscillator with multiple waveforms
//! - [`OscillatorWaveform`] - Waveform types (Sine, Square, Saw, Triangle, Noise)
//!
//! ```rust
//! use synthcore_voice::{Oscillator, OscillatorWaveform};
//!
//! let mut osc = Oscillator::new(48000.0);
//! osc.set_frequency(440.0);
//! osc.set_waveform(OscillatorWaveform::Saw);
//!
//! let sample = osc.advance();
//! ```
//!
//! ## Envelopes
//!
//! Linear ADSR envelope generators:
//!
//! - [`AdsrEnvelope`] - Attack-Decay-Sustain-Release envelope
//! - [`EnvelopeState`] - Envelope stage tracking
//!
//! ```rust
//! use synthcore_voice::{AdsrEnvelope, EnvelopeState};
//!
//! let mut env = AdsrEnvelope::new(48000.0);
//! env.set_attack(0.01);
//! env.set_decay(0.1);
//! env.set_sustain(0.7);
//! env.set_release(0.2);
//!
//! env.trigger();
//! let level = env.advance();
//! ```
//!
//! ## Voice Management
//!
//! For building polyphonic per-channel voice pools:
//!
//! - [`Voice`] - Single synthesizer voice (oscillator + envelope)
//! - [`VoiceManager`] - Fixed-capacity voice allocation with oldest-wins stealing
//!
//! ## Modulation
//!
//! Flexible modulation routing:
//!
//! - [`ModulationMatrix`] - Route modulation sources to destinations
//! - [`ModSourceId`] / [`ModDestination`] - Source and destination identifiers
//! - [`AudioModSource`] - Use audio input as a modulation source
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! synthcore-voice = { version = "0.1", default-features = false }
//! ```
//!
//! # Example: Simple Voice Pool
//!
//! ```rust
//! use synthcore_voice::{VoiceManager, OscillatorWaveform};
//!
//! // Create an 8-voice pool for one channel
//! let mut voices: VoiceManager<8> = VoiceManager::new(48000.0);
//!
//! for v in voices.voices_mut() {
//!     v.set_waveform(OscillatorWaveform::Saw);
//!     v.set_adsr(0.01, 0.1, 0.7, 0.2);
//! }
//!
//! // Play a chord
//! voices.note_on(60, 0.8); // C4
//! voices.note_on(64, 0.8); // E4
//! voices.note_on(67, 0.8); // G4
//!
//! // Generate audio
//! let mut buffer = vec![0.0; 1024 * 2];
//! voices.render(&mut buffer, 1024);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod audio_mod;
pub mod envelope;
pub mod mod_matrix;
pub mod oscillator;
pub mod voice;

// Re-export main types at crate root
pub use audio_mod::{AudioGate, AudioModSource};
pub use envelope::{AdsrEnvelope, EnvelopeState};
pub use mod_matrix::{
    ModDestination, ModSourceId, ModulationMatrix, ModulationRoute, ModulationValues,
};
pub use oscillator::{Oscillator, OscillatorWaveform};
pub use voice::{Voice, VoiceManager, cents_to_ratio, freq_to_midi, midi_to_freq};

// Re-export commonly used types from synthcore-core
pub use synthcore_core::{Lfo, LfoWaveform, ModulationSource, StateVariableFilter, SvfOutput};
