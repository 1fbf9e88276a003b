//! Top-level render graph (C13): wires the sequencer, the multi-timbral
//! engine, the effects chain, and the error handler into the single
//! per-callback sequence `spec.md` §4.13 and §5 describe.
//!
//! The sequencer's note callbacks reach the engine through a lock-free
//! [`ArrayQueue`], not a mutex: `spec.md` §5 requires the RT thread to
//! never block or wait on a mutex, so `RenderGraph` owns
//! [`MultiTimbralEngine`] directly and the sequencer's `Send` closures
//! only push fired note events onto a shared queue, which
//! [`RenderGraph::process`] drains before rendering. Mirrors the
//! `RtErrorQueue` pattern in `synthcore_error::rt_queue`: bounded
//! capacity, push never blocks, a full queue silently drops the event
//! rather than stalling the audio callback.

use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use synthcore_chain::ReorderableChain;
use synthcore_core::SmoothParameter;
use synthcore_error::{ErrorCode, ErrorHandler, ErrorReport, ErrorSeverity};
use synthcore_sequencer::Sequencer;

use crate::engine::MultiTimbralEngine;

/// `|sample| > clip_threshold` past this multiple escalates from
/// `AudioClipping` to `EmergencyMute`.
const EMERGENCY_MUTE_MULTIPLIER: f32 = 2.0;
const DEFAULT_CLIP_THRESHOLD: f32 = 1.02; // 1.0 with a small headroom
const PENDING_NOTE_QUEUE_SIZE: usize = 256;

/// A note event fired by the sequencer, queued until the next `process`
/// call drains it into the engine. Carries no allocation.
#[derive(Debug, Clone, Copy)]
enum PendingNoteEvent {
    NoteOn { channel: u8, pitch: u8, velocity: f32 },
    NoteOff { channel: u8, pitch: u8 },
}

/// Ties together the sequencer, the multi-timbral engine, the effects
/// chain, and the error handler into the per-callback sequence:
/// drain RT errors, advance the transport, drain fired note events into
/// the engine, render the engine, process the chain in place, then
/// apply master gain and the clipping/mute safety inspection.
pub struct RenderGraph {
    sequencer: Sequencer,
    engine: MultiTimbralEngine,
    pending_events: Arc<ArrayQueue<PendingNoteEvent>>,
    chain: ReorderableChain,
    error_handler: ErrorHandler,
    master_gain: SmoothParameter,
    sample_rate: f32,
    clip_threshold: f32,
    soft_clamp_enabled: bool,
    emergency_mute_enabled: bool,
    emergency_muted: bool,
}

impl RenderGraph {
    /// Build a render graph at `sample_rate`, wiring the sequencer's
    /// note callbacks to push onto the pending-event queue.
    pub fn new(sample_rate: f32) -> Self {
        let pending_events = Arc::new(ArrayQueue::new(PENDING_NOTE_QUEUE_SIZE));

        let mut sequencer = Sequencer::new();
        let on_queue = Arc::clone(&pending_events);
        sequencer.set_note_on_callback(Box::new(move |pitch, velocity, channel, _env| {
            let _ = on_queue.push(PendingNoteEvent::NoteOn { channel, pitch, velocity });
        }));
        let off_queue = Arc::clone(&pending_events);
        sequencer.set_note_off_callback(Box::new(move |pitch, channel| {
            let _ = off_queue.push(PendingNoteEvent::NoteOff { channel, pitch });
        }));

        Self {
            sequencer,
            engine: MultiTimbralEngine::new(sample_rate),
            pending_events,
            chain: ReorderableChain::new(sample_rate),
            error_handler: ErrorHandler::new(),
            master_gain: SmoothParameter::new(1.0),
            sample_rate,
            clip_threshold: DEFAULT_CLIP_THRESHOLD,
            soft_clamp_enabled: true,
            emergency_mute_enabled: true,
            emergency_muted: false,
        }
    }

    /// Mutable access to the engine, for control-thread configuration
    /// (channel setup, split/layer routing, voice budget) outside the
    /// render call itself.
    pub fn engine_mut(&mut self) -> &mut MultiTimbralEngine {
        &mut self.engine
    }

    /// Read access to the engine.
    pub fn engine(&self) -> &MultiTimbralEngine {
        &self.engine
    }

    /// Mutable access to the sequencer, for pattern/transport control.
    pub fn sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencer
    }

    /// Mutable access to the effects chain.
    pub fn chain_mut(&mut self) -> &mut ReorderableChain {
        &mut self.chain
    }

    /// Mutable access to the error handler, for registering recovery
    /// actions or callbacks.
    pub fn error_handler_mut(&mut self) -> &mut ErrorHandler {
        &mut self.error_handler
    }

    /// Read access to the error handler's accumulated statistics.
    pub fn error_handler(&self) -> &ErrorHandler {
        &self.error_handler
    }

    /// Set the target master gain, `[0, 1]`, smoothed over subsequent
    /// callbacks rather than applied immediately.
    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain.set_target(gain.clamp(0.0, 1.0));
    }

    /// Set the absolute-value clipping threshold (default `1.02`).
    pub fn set_clip_threshold(&mut self, threshold: f32) {
        self.clip_threshold = threshold.max(0.0);
    }

    /// Enable or disable soft-clamping samples that exceed the clip
    /// threshold (clipping is still reported either way).
    pub fn set_soft_clamp_enabled(&mut self, enabled: bool) {
        self.soft_clamp_enabled = enabled;
    }

    /// Enable or disable escalating extreme clipping into an emergency
    /// mute.
    pub fn set_emergency_mute_enabled(&mut self, enabled: bool) {
        self.emergency_mute_enabled = enabled;
    }

    /// `true` once an emergency mute has latched; stays muted until
    /// [`clear_emergency_mute`](Self::clear_emergency_mute) is called.
    pub fn is_emergency_muted(&self) -> bool {
        self.emergency_muted
    }

    /// Clear a latched emergency mute.
    pub fn clear_emergency_mute(&mut self) {
        self.emergency_muted = false;
    }

    /// Update the sample rate across every stage.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.engine.set_sample_rate(sample_rate);
        self.chain.set_sample_rate(sample_rate);
    }

    /// Run one audio callback: drain queued RT errors, advance the
    /// transport (queueing any note events due this block), drain those
    /// events into the engine, render the engine, process the effects
    /// chain in place, then apply master gain and the clip/mute safety
    /// inspection. `buffer` is interleaved stereo, length `frames * 2`.
    pub fn process(&mut self, buffer: &mut [f32], frames: usize) {
        self.error_handler.drain_rt_errors();

        let delta = frames as f32 / self.sample_rate;
        self.sequencer.process(delta);

        while let Some(event) = self.pending_events.pop() {
            match event {
                PendingNoteEvent::NoteOn { channel, pitch, velocity } => {
                    self.engine.note_on(channel as usize, pitch, velocity);
                }
                PendingNoteEvent::NoteOff { channel, pitch } => {
                    self.engine.note_off(channel as usize, pitch);
                }
            }
        }

        self.engine.render(buffer, frames);

        self.chain.process(buffer, frames);

        self.apply_master_gain_and_safety(buffer, frames);
    }

    fn apply_master_gain_and_safety(&mut self, buffer: &mut [f32], frames: usize) {
        for frame in 0..frames {
            let gain = self.master_gain.process();
            for ch in 0..2 {
                let idx = frame * 2 + ch;
                let mut sample = buffer[idx] * gain;

                if sample.abs() > self.clip_threshold {
                    if self.emergency_mute_enabled
                        && sample.abs() > self.clip_threshold * EMERGENCY_MUTE_MULTIPLIER
                    {
                        self.emergency_muted = true;
                        let _ = self.error_handler.report_critical(ErrorReport::new(
                            ErrorCode::EmergencyMute,
                            ErrorSeverity::Critical,
                            format!("sample magnitude {} triggered emergency mute", sample.abs()),
                        ));
                    } else {
                        self.error_handler.report_rt(ErrorCode::AudioClipping, "clipping");
                    }

                    if self.soft_clamp_enabled {
                        sample = sample.clamp(-self.clip_threshold, self.clip_threshold);
                    }
                }

                buffer[idx] = if self.emergency_muted { 0.0 } else { sample };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_via_sequencer_pattern_reaches_the_engine() {
        use synthcore_sequencer::{NoteEvent, Pattern};

        let mut graph = RenderGraph::new(48_000.0);
        let mut pattern = Pattern::new();
        pattern.add_event(NoteEvent::new(60, 1.0, 0.0, 1.0, 0));
        graph.sequencer_mut().add_pattern(pattern);
        graph.sequencer_mut().start();

        let mut buffer = vec![0.0f32; 256];
        graph.process(&mut buffer, 128);

        assert_eq!(graph.engine().channel(0).unwrap().active_voice_count(), 1);
    }

    #[test]
    fn master_gain_of_zero_silences_output() {
        let mut graph = RenderGraph::new(48_000.0);
        graph.set_master_gain(0.0);
        graph.master_gain.set_immediate(0.0);

        graph.engine_mut().note_on(0, 69, 1.0);

        let mut buffer = vec![0.0f32; 512];
        graph.process(&mut buffer, 256);
        assert!(buffer.iter().all(|&s| s.abs() < 1e-6));
    }

    #[test]
    fn extreme_clipping_latches_emergency_mute() {
        let mut graph = RenderGraph::new(48_000.0);
        graph.master_gain.set_immediate(1.0);
        let mut buffer = vec![5.0f32; 64];
        graph.apply_master_gain_and_safety(&mut buffer, 32);
        assert!(graph.is_emergency_muted());
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn moderate_clipping_soft_clamps_without_muting() {
        let mut graph = RenderGraph::new(48_000.0);
        graph.master_gain.set_immediate(1.0);
        let mut buffer = vec![1.2f32; 64];
        graph.apply_master_gain_and_safety(&mut buffer, 32);
        assert!(!graph.is_emergency_muted());
        assert!(buffer.iter().all(|&s| s <= graph.clip_threshold));
    }
}
