//! synthcore-engine - Sixteen-channel multi-timbral synthesis engine
//! (C4 `ChannelSynthesizer`, C5 `MultiTimbralEngine`) and the top-level
//! render graph tying the whole signal path together (C13).
//!
//! [`ChannelSynthesizer`] extends `synthcore_voice::VoiceManager` with
//! channel-level behavior: note-range filtering, transposition and
//! fine-tuning, mono/poly allocation with legato retriggering, sustain,
//! pitch bend, and CC/program-change handling, generalized from the
//! teacher's `sonido-synth::synth` setter/broadcast style and
//! `original_source/include/synthesis/multitimbral/ChannelSynthesizer.h`.
//!
//! [`MultiTimbralEngine`] holds sixteen of these, routes note events
//! through split/layer configuration, allocates the shared voice budget
//! across active channels, and renders them down to a stereo mix with
//! equal-power panning.
//!
//! [`RenderGraph`] is the per-callback entry point: it drains the RT
//! error queue, advances the sequencer, renders the engine, runs the
//! effects chain, and applies master gain with a clipping/emergency-mute
//! safety inspection, in the exact order `spec.md` §4.13 describes.
//!
//! ```
//! use synthcore_engine::RenderGraph;
//!
//! let mut graph = RenderGraph::new(48_000.0);
//! graph.engine_mut().note_on(0, 60, 0.8);
//!
//! let mut buffer = vec![0.0f32; 2 * 128];
//! graph.process(&mut buffer, 128);
//! ```

mod channel;
mod engine;
mod graph;

pub use channel::{ChannelSynthesizer, VoiceMode, MAX_VOICES_PER_CHANNEL};
pub use engine::{LayerConfig, MultiTimbralEngine, SplitConfig, VoiceBudgetStrategy, CHANNEL_COUNT};
pub use graph::RenderGraph;
