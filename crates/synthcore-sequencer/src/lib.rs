//! synthcore-sequencer - Sample-accurate pattern transport (C10) and
//! adaptive musical-state machine (C11).
//!
//! [`Sequencer`] is the per-voice-group transport: it owns patterns,
//! advances a beat clock each control-thread tick, and fires note-on /
//! note-off / transport-tick callbacks into the engine. [`AdaptiveSequencer`]
//! sits a layer above it, switching between named [`MusicalState`]s —
//! each its own set of layered patterns and mix snapshots — along
//! [`StateTransition`]s gated by parameter conditions, modeled on
//! `original_source/include/sequencer/AdaptiveSequencer.h`.
//!
//! ```
//! use synthcore_sequencer::{Pattern, NoteEvent, Sequencer};
//!
//! let mut pattern = Pattern::new();
//! pattern.add_event(NoteEvent::new(60, 1.0, 0.0, 1.0, 0));
//!
//! let mut sequencer = Sequencer::new();
//! sequencer.add_pattern(pattern);
//! sequencer.start();
//! sequencer.process(0.1);
//! ```

mod adaptive;
mod events;
mod parameter;
mod pattern;
mod sequencer;
mod state;
mod transition;

pub use adaptive::AdaptiveSequencer;
pub use events::{EventData, EventListener, EventSystem};
pub use parameter::{ParamChangeCallback, Parameter};
pub use pattern::{EnvelopeOverride, NoteEvent, Pattern};
pub use sequencer::Sequencer;
pub use state::{MixSnapshot, MusicalState, TrackLayer};
pub use transition::{StateTransition, TransitionCondition, TransitionType};
