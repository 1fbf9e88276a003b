//! Per-MIDI-channel synthesis (C4): a voice pool plus the channel-level
//! note-routing, sustain, pitch-bend, and CC behavior `spec.md` §4.4
//! describes, generalized from the teacher's `sonido-synth::synth`
//! setter/broadcast style and from
//! `original_source/include/synthesis/multitimbral/ChannelSynthesizer.h`.

use std::collections::HashMap;

use synthcore_voice::{OscillatorWaveform, VoiceManager};

/// Voices available per channel. Chosen generously; `MultiTimbralEngine`'s
/// voice-budget allocator further restricts how many of these are
/// actually eligible for allocation via [`ChannelSynthesizer::set_voice_count`].
pub const MAX_VOICES_PER_CHANNEL: usize = 16;

/// Default pitch-bend range in semitones.
const DEFAULT_BEND_RANGE_SEMITONES: f32 = 2.0;

/// Frequency ratio contributed by a single cent of fine-tuning, used to
/// linearize the fine-tuning shift around 1.0.
const FINE_TUNE_RATIO_PER_CENT: f32 = 1.000_577_79; // 2^(1/1200)

/// Whether a channel allocates one voice at a time (with legato
/// retriggering) or a full polyphonic pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceMode {
    /// One voice; overlapping notes legato-retarget rather than retrigger.
    Mono,
    /// Standard polyphonic voice allocation/stealing.
    Poly,
}

/// One MIDI channel's worth of synthesis: a voice pool plus note
/// routing, transposition, pitch bend, sustain, and CC handling.
pub struct ChannelSynthesizer {
    voices: VoiceManager<MAX_VOICES_PER_CHANNEL>,
    mode: VoiceMode,
    held_notes: Vec<u8>,
    sustained_notes: Vec<u8>,
    sustain: bool,
    last_velocity: f32,
    note_range_low: u8,
    note_range_high: u8,
    transposition: i8,
    fine_tune_cents: f32,
    bend_range_semitones: f32,
    pitch_bend: f32,
    cc_values: HashMap<u8, f32>,
    program: Option<u8>,
    program_change_enabled: bool,
}

impl ChannelSynthesizer {
    /// Create a channel synthesizer at `sample_rate`, in poly mode, full
    /// note range, no transposition or fine-tuning.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: VoiceManager::new(sample_rate),
            mode: VoiceMode::Poly,
            held_notes: Vec::new(),
            sustained_notes: Vec::new(),
            sustain: false,
            last_velocity: 1.0,
            note_range_low: 0,
            note_range_high: 127,
            transposition: 0,
            fine_tune_cents: 0.0,
            bend_range_semitones: DEFAULT_BEND_RANGE_SEMITONES,
            pitch_bend: 0.0,
            cc_values: HashMap::new(),
            program: None,
            program_change_enabled: true,
        }
    }

    /// Switch between mono and poly allocation. Switching to mono clamps
    /// the usable voice count to 1 (restored to `voice_count` on switch
    /// back to poly).
    pub fn set_mode(&mut self, mode: VoiceMode) {
        self.mode = mode;
        match mode {
            VoiceMode::Mono => self.voices.set_voice_count(1),
            VoiceMode::Poly => {}
        }
    }

    /// Current voice allocation mode.
    pub fn mode(&self) -> VoiceMode {
        self.mode
    }

    /// Set the number of voices available for poly allocation (ignored,
    /// beyond restoring on mode switch, while in mono mode).
    pub fn set_voice_count(&mut self, n: usize) {
        if self.mode == VoiceMode::Poly {
            self.voices.set_voice_count(n);
        }
    }

    /// Number of voices currently available for allocation.
    pub fn voice_count(&self) -> usize {
        self.voices.voice_count()
    }

    /// Broadcast a waveform to every voice in the pool.
    pub fn set_oscillator_waveform(&mut self, waveform: OscillatorWaveform) {
        for voice in self.voices.voices_mut() {
            voice.set_waveform(waveform);
        }
    }

    /// Broadcast an ADSR envelope to every voice in the pool.
    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        for voice in self.voices.voices_mut() {
            voice.set_adsr(attack, decay, sustain, release);
        }
    }

    /// Set the pitch-bend range in semitones (default 2).
    pub fn set_bend_range_semitones(&mut self, semitones: f32) {
        self.bend_range_semitones = semitones;
    }

    /// Set the note range outside of which `note_on` is ignored.
    pub fn set_note_range(&mut self, low: u8, high: u8) {
        self.note_range_low = low.min(high);
        self.note_range_high = low.max(high);
    }

    /// Set transposition in semitones, applied before fine-tuning.
    pub fn set_transposition(&mut self, semitones: i8) {
        self.transposition = semitones;
    }

    /// Set fine-tuning in cents (100 cents = 1 semitone).
    pub fn set_fine_tune_cents(&mut self, cents: f32) {
        self.fine_tune_cents = cents;
    }

    /// Update the engine's sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.voices.set_sample_rate(sample_rate);
    }

    /// Number of voices currently sounding.
    pub fn active_voice_count(&self) -> usize {
        self.voices.active_voice_count()
    }

    /// Pitches currently depressed on this channel, before sustain; in
    /// mono mode the last entry is the pitch currently sounding.
    pub fn held_notes(&self) -> &[u8] {
        &self.held_notes
    }

    fn transposed_frequency(&self, pitch: u8) -> f32 {
        let transposed = (pitch as i32 + self.transposition as i32).clamp(0, 127) as u8;
        let freq = synthcore_voice::midi_to_freq(transposed);
        // Per-cent ratio linearized around 1.0, matching the fine-tuning
        // contract: shift = cents * (2^(1/1200) - 1).
        let fine_tune_shift = self.fine_tune_cents * (FINE_TUNE_RATIO_PER_CENT - 1.0);
        freq * (1.0 + fine_tune_shift)
    }

    fn bend_ratio(&self) -> f32 {
        2f32.powf(self.pitch_bend * self.bend_range_semitones / 12.0)
    }

    fn trigger(&mut self, pitch: u8, velocity: f32) {
        let freq = self.transposed_frequency(pitch);
        if self.mode == VoiceMode::Mono && self.voices.active_voice_count() > 0 {
            if let Some(voice) = self.voices.voices_mut().first_mut() {
                voice.legato_retarget_at(pitch, freq, velocity);
            }
        } else {
            self.voices.note_on_at(pitch, freq, velocity);
        }
        if self.pitch_bend != 0.0 {
            self.voices.set_pitch_bend_ratio(self.bend_ratio());
        }
    }

    /// Trigger a note, subject to the configured note range, applying
    /// transposition and fine-tuning. In mono mode, an already-sounding
    /// note is legato-retargeted rather than retriggered.
    pub fn note_on(&mut self, pitch: u8, velocity: f32) {
        if pitch < self.note_range_low || pitch > self.note_range_high {
            return;
        }
        self.last_velocity = velocity.clamp(0.0, 1.0);
        self.held_notes.retain(|&p| p != pitch);
        self.held_notes.push(pitch);
        self.trigger(pitch, self.last_velocity);
    }

    /// Release a note. In mono mode, if another note remains on the held
    /// stack, it is retriggered (legato); otherwise the channel falls
    /// silent. In poly mode, the corresponding voice(s) release, unless
    /// sustain is engaged, in which case release is deferred.
    pub fn note_off(&mut self, pitch: u8) {
        self.held_notes.retain(|&p| p != pitch);

        match self.mode {
            VoiceMode::Mono => {
                if let Some(&top) = self.held_notes.last() {
                    let freq = self.transposed_frequency(top);
                    if let Some(voice) = self.voices.voices_mut().first_mut() {
                        voice.legato_retarget_at(top, freq, self.last_velocity);
                    }
                } else if self.sustain {
                    if !self.sustained_notes.contains(&pitch) {
                        self.sustained_notes.push(pitch);
                    }
                } else {
                    self.voices.note_off(pitch);
                }
            }
            VoiceMode::Poly => {
                if self.sustain {
                    if !self.sustained_notes.contains(&pitch) {
                        self.sustained_notes.push(pitch);
                    }
                } else {
                    self.voices.note_off(pitch);
                }
            }
        }
    }

    /// Engage the sustain pedal: subsequent `note_off` calls defer
    /// release until [`sustain_off`](Self::sustain_off).
    pub fn sustain_on(&mut self) {
        self.sustain = true;
    }

    /// Release the sustain pedal, releasing every voice that was held by it.
    pub fn sustain_off(&mut self) {
        self.sustain = false;
        for pitch in self.sustained_notes.drain(..) {
            self.voices.note_off(pitch);
        }
    }

    /// Release every voice and clear all note-tracking state.
    pub fn all_notes_off(&mut self) {
        self.voices.all_off();
        self.held_notes.clear();
        self.sustained_notes.clear();
    }

    /// Set the pitch-bend value, `[-1, 1]`, scaling every active and
    /// subsequent voice's frequency by `2^(value * bend_range / 12)`.
    pub fn set_pitch_bend(&mut self, value: f32) {
        self.pitch_bend = value.clamp(-1.0, 1.0);
        self.voices.set_pitch_bend_ratio(self.bend_ratio());
    }

    /// Current pitch-bend value.
    pub fn pitch_bend(&self) -> f32 {
        self.pitch_bend
    }

    /// Handle a MIDI CC. Known controllers map to channel behavior
    /// (7=volume is read via [`cc_value`](Self::cc_value), 10=pan,
    /// 64=sustain, 123=all-notes-off); all others are stored verbatim
    /// and exposed as `cc<n>` through the parameter surface.
    pub fn process_cc(&mut self, controller: u8, value: f32) {
        let value = value.clamp(0.0, 1.0);
        match controller {
            64 => {
                if value >= 0.5 {
                    self.sustain_on();
                } else {
                    self.sustain_off();
                }
            }
            123 => self.all_notes_off(),
            _ => {
                self.cc_values.insert(controller, value);
            }
        }
    }

    /// Value last received for CC `controller`, `[0, 1]`.
    pub fn cc_value(&self, controller: u8) -> f32 {
        self.cc_values.get(&controller).copied().unwrap_or(0.0)
    }

    /// Record a program change, if enabled for this channel. Preset
    /// lookup from the recorded number is the caller's responsibility.
    pub fn program_change(&mut self, program: u8) {
        if self.program_change_enabled {
            self.program = Some(program);
        }
    }

    /// Enable or disable responding to program changes.
    pub fn set_program_change_enabled(&mut self, enabled: bool) {
        self.program_change_enabled = enabled;
    }

    /// Last recorded program number, if any.
    pub fn program(&self) -> Option<u8> {
        self.program
    }

    /// Render this channel's voices into an interleaved stereo `buffer`
    /// (accumulating, not clearing).
    pub fn render(&mut self, buffer: &mut [f32], frames: usize) {
        self.voices.render(buffer, frames);
    }
}
