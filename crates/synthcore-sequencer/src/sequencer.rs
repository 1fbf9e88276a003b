//! Sample-accurate pattern transport (C10).
//!
//! Grounded in the teacher's `sonido_core::tempo::TempoManager`: the same
//! bpm/sample-rate/position bookkeeping and play/stop transport state,
//! generalized from a bare beat clock into a transport that walks
//! [`Pattern`] events and fires note-on/note-off through injected
//! callbacks rather than driving an LFO. The sequencer holds no
//! reference to whatever engine the callbacks reach into — only a
//! closure, per the component's weak-reference ownership rule.

use crate::pattern::{EnvelopeOverride, Pattern};

/// `on_note_on(pitch, velocity, channel, envelope_override)`.
pub type NoteOnCallback = Box<dyn FnMut(u8, f32, u8, Option<EnvelopeOverride>) + Send>;
/// `on_note_off(pitch, channel)`.
pub type NoteOffCallback = Box<dyn FnMut(u8, u8) + Send>;
/// `on_transport_tick(position_beats, bar, beat)`. Advisory, low frequency.
pub type TransportTickCallback = Box<dyn FnMut(f32, u32, f32) + Send>;

/// Sample-accurate (at block granularity) pattern sequencer.
///
/// Call [`process`](Self::process) once per audio callback with
/// `frames as f32 / sample_rate`; it advances [`position_beats`](
/// Self::position_beats) and fires any note-on/note-off events whose
/// beat falls in the interval just crossed.
pub struct Sequencer {
    tempo_bpm: f32,
    time_sig_num: u8,
    time_sig_den: u8,
    position_beats: f32,
    is_playing: bool,
    looping: bool,
    loop_length_beats: f32,
    patterns: Vec<Pattern>,
    current_pattern: usize,
    on_note_on: Option<NoteOnCallback>,
    on_note_off: Option<NoteOffCallback>,
    on_transport_tick: Option<TransportTickCallback>,
}

impl Sequencer {
    /// Create a stopped sequencer at `120 BPM`, common time, no patterns.
    pub fn new() -> Self {
        Self {
            tempo_bpm: 120.0,
            time_sig_num: 4,
            time_sig_den: 4,
            position_beats: 0.0,
            is_playing: false,
            looping: false,
            loop_length_beats: 4.0,
            patterns: Vec::new(),
            current_pattern: 0,
            on_note_on: None,
            on_note_off: None,
            on_transport_tick: None,
        }
    }

    /// Register the note-on callback, replacing any previous one.
    pub fn set_note_on_callback(&mut self, callback: NoteOnCallback) {
        self.on_note_on = Some(callback);
    }

    /// Register the note-off callback, replacing any previous one.
    pub fn set_note_off_callback(&mut self, callback: NoteOffCallback) {
        self.on_note_off = Some(callback);
    }

    /// Register the transport-tick callback, replacing any previous one.
    pub fn set_transport_tick_callback(&mut self, callback: TransportTickCallback) {
        self.on_transport_tick = Some(callback);
    }

    /// Start (or resume) playback without resetting position.
    pub fn start(&mut self) {
        self.is_playing = true;
    }

    /// Stop playback and reset position to the top.
    pub fn stop(&mut self) {
        self.is_playing = false;
        self.position_beats = 0.0;
    }

    /// Suspend playback, retaining the current position.
    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Whether the transport is currently advancing.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Set the tempo in BPM. Non-positive values are ignored.
    pub fn set_tempo(&mut self, bpm: f32) {
        if bpm > 0.0 {
            self.tempo_bpm = bpm;
        }
    }

    /// Current tempo in BPM.
    pub fn tempo(&self) -> f32 {
        self.tempo_bpm
    }

    /// Set the time signature.
    pub fn set_time_signature(&mut self, numerator: u8, denominator: u8) {
        if numerator > 0 {
            self.time_sig_num = numerator;
        }
        if denominator > 0 {
            self.time_sig_den = denominator;
        }
    }

    /// Current `(numerator, denominator)` time signature.
    pub fn time_signature(&self) -> (u8, u8) {
        (self.time_sig_num, self.time_sig_den)
    }

    /// Enable or disable looping of the current pattern.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Whether looping is enabled.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Set the loop length in beats. Non-positive values are ignored.
    pub fn set_loop_length_beats(&mut self, beats: f32) {
        if beats > 0.0 {
            self.loop_length_beats = beats;
        }
    }

    /// Current loop length in beats.
    pub fn loop_length_beats(&self) -> f32 {
        self.loop_length_beats
    }

    /// Append a pattern, returning its index.
    pub fn add_pattern(&mut self, pattern: Pattern) -> usize {
        self.patterns.push(pattern);
        self.patterns.len() - 1
    }

    /// Select the active pattern by index. Returns `false` (transport
    /// unchanged) if `index` is out of range.
    pub fn set_current_pattern(&mut self, index: usize) -> bool {
        if index < self.patterns.len() {
            self.current_pattern = index;
            true
        } else {
            false
        }
    }

    /// Index of the currently active pattern.
    pub fn current_pattern(&self) -> usize {
        self.current_pattern
    }

    /// Current transport position in beats.
    pub fn position_beats(&self) -> f32 {
        self.position_beats
    }

    /// Reconcile position with an externally tracked beat clock,
    /// correcting for drift accumulated outside this sequencer.
    pub fn synchronize(&mut self, external_position_beats: f32) {
        self.position_beats = external_position_beats;
    }

    /// Advance the transport by `delta_seconds` (typically
    /// `frames as f32 / sample_rate`), firing any note-on/note-off events
    /// whose beat lies in the interval just crossed, splitting the
    /// interval at the loop boundary if looping is enabled.
    pub fn process(&mut self, delta_seconds: f32) {
        if !self.is_playing || self.tempo_bpm <= 0.0 {
            return;
        }
        let delta_beats = delta_seconds * self.tempo_bpm / 60.0;
        let mut lo = self.position_beats;
        let mut new_position = lo + delta_beats;

        if self.looping && self.loop_length_beats > 0.0 {
            while new_position >= self.loop_length_beats {
                self.fire_interval(lo, self.loop_length_beats);
                new_position -= self.loop_length_beats;
                lo = 0.0;
            }
        }
        self.fire_interval(lo, new_position);

        self.position_beats = new_position;
        self.emit_transport_tick();
    }

    fn fire_interval(&mut self, lo: f32, hi: f32) {
        if lo >= hi {
            return;
        }
        let mut on_cb = self.on_note_on.take();
        let mut off_cb = self.on_note_off.take();
        if let Some(pattern) = self.patterns.get(self.current_pattern) {
            for event in pattern.events() {
                if event.start_beat >= lo && event.start_beat < hi {
                    if let Some(cb) = on_cb.as_mut() {
                        cb(event.pitch, event.velocity, event.channel, event.envelope_override);
                    }
                }
                let end = event.end_beat();
                if end >= lo && end < hi {
                    if let Some(cb) = off_cb.as_mut() {
                        cb(event.pitch, event.channel);
                    }
                }
            }
        }
        self.on_note_on = on_cb;
        self.on_note_off = off_cb;
    }

    fn emit_transport_tick(&mut self) {
        let mut cb = self.on_transport_tick.take();
        if let Some(tick) = cb.as_mut() {
            let beats_per_bar = f32::from(self.time_sig_num).max(1.0);
            let bar = (self.position_beats / beats_per_bar) as u32;
            let beat = self.position_beats % beats_per_bar;
            tick(self.position_beats, bar, beat);
        }
        self.on_transport_tick = cb;
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}
