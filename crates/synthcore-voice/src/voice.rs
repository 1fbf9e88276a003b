//! Single-voice synthesis and voice pool management.
//!
//! A [`Voice`] is one realization of a pitched note: an oscillator gated by
//! a linear ADSR envelope. [`VoiceManager`] owns a fixed-capacity pool of
//! voices for one channel and implements the allocation/stealing policy.

use crate::envelope::AdsrEnvelope;
use crate::oscillator::{Oscillator, OscillatorWaveform};

/// Convert MIDI note number to frequency in Hz (A4 = note 69 = 440 Hz).
#[inline]
pub fn midi_to_freq(pitch: u8) -> f32 {
    440.0 * libm::powf(2.0, (pitch as f32 - 69.0) / 12.0)
}

/// Convert frequency in Hz to MIDI note number.
#[inline]
pub fn freq_to_midi(freq: f32) -> f32 {
    69.0 + 12.0 * libm::log2f(freq / 440.0)
}

/// Convert cents to a frequency ratio (100 cents = 1 semitone).
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    libm::powf(2.0, cents / 1200.0)
}

/// A single realization of a pitched note: one oscillator gated by one
/// linear ADSR envelope.
///
/// # Example
///
/// ```rust
/// use synthcore_voice::Voice;
///
/// let mut voice = Voice::new(48_000.0);
/// voice.note_on(60, 0.8);
/// let sample = voice.render_sample();
/// voice.note_off();
/// ```
#[derive(Debug, Clone)]
pub struct Voice {
    oscillator: Oscillator,
    envelope: AdsrEnvelope,
    pitch: u8,
    amplitude: f32,
    active: bool,
    sample_rate: f32,
    /// Monotonic counter stamped at allocation time, used for stealing.
    attack_start: u64,
    /// Frequency before any pitch-bend ratio is applied, so bend can be
    /// re-applied without compounding on the already-bent frequency.
    base_freq: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new(48_000.0)
    }
}

impl Voice {
    /// Create a new idle voice at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            oscillator: Oscillator::new(sample_rate),
            envelope: AdsrEnvelope::new(sample_rate),
            pitch: 0,
            amplitude: 0.0,
            active: false,
            sample_rate,
            attack_start: 0,
            base_freq: 0.0,
        }
    }

    /// Set the oscillator waveform.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.oscillator.set_waveform(waveform);
    }

    /// Get the oscillator waveform.
    pub fn waveform(&self) -> OscillatorWaveform {
        self.oscillator.waveform()
    }

    /// Configure the ADSR envelope (seconds, seconds, 0..1, seconds).
    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.envelope.set_attack(attack);
        self.envelope.set_decay(decay);
        self.envelope.set_sustain(sustain);
        self.envelope.set_release(release);
    }

    /// Set the sample rate of both the oscillator and the envelope.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.oscillator.set_sample_rate(sample_rate);
        self.envelope.set_sample_rate(sample_rate);
    }

    /// Trigger the voice: sets frequency from `pitch`, amplitude from
    /// `velocity` (clamped to `[0, 1]`), resets the oscillator phase and
    /// starts the envelope at Attack with value 0.
    pub fn note_on(&mut self, pitch: u8, velocity: f32) {
        self.note_on_at(pitch, midi_to_freq(pitch), velocity);
    }

    /// Trigger the voice at an explicit frequency, recording `pitch` only
    /// for bookkeeping (note-off matching, display). Used by
    /// `synthcore-engine`'s `ChannelSynthesizer` to apply transposition and
    /// fine-tuning, which shift the sounding frequency away from the plain
    /// `midi_to_freq(pitch)` value.
    pub fn note_on_at(&mut self, pitch: u8, base_freq: f32, velocity: f32) {
        self.pitch = pitch;
        self.amplitude = velocity.clamp(0.0, 1.0);
        self.base_freq = base_freq;
        self.oscillator.set_frequency(base_freq);
        self.oscillator.reset();
        self.envelope.trigger();
        self.active = true;
    }

    /// Retarget the voice to a new pitch/velocity without resetting the
    /// envelope or oscillator phase — used for mono-mode legato retriggers
    /// where no new attack transient should occur.
    pub fn legato_retarget(&mut self, pitch: u8, velocity: f32) {
        self.legato_retarget_at(pitch, midi_to_freq(pitch), velocity);
    }

    /// As [`legato_retarget`](Self::legato_retarget), but at an explicit
    /// frequency (see [`note_on_at`](Self::note_on_at)).
    pub fn legato_retarget_at(&mut self, pitch: u8, base_freq: f32, velocity: f32) {
        self.pitch = pitch;
        self.amplitude = velocity.clamp(0.0, 1.0);
        self.base_freq = base_freq;
        self.oscillator.set_frequency(base_freq);
    }

    /// Scale the sounding frequency away from `base_freq` by `ratio`
    /// (e.g. `2.0.powf(semitones / 12.0)`), for pitch-bend. Does not
    /// affect `base_freq` itself, so bend can be updated continuously
    /// without compounding.
    pub fn set_pitch_bend_ratio(&mut self, ratio: f32) {
        if self.base_freq > 0.0 {
            self.oscillator.set_frequency(self.base_freq * ratio);
        }
    }

    /// The frequency this voice was triggered at, before any pitch-bend
    /// ratio.
    pub fn base_frequency(&self) -> f32 {
        self.base_freq
    }

    /// Release the voice (note off). No-op if the envelope is already Idle.
    pub fn note_off(&mut self) {
        self.envelope.release();
    }

    /// Force the voice to stop and reset immediately, for voice stealing.
    pub fn kill(&mut self) {
        self.envelope.reset();
        self.oscillator.reset();
        self.active = false;
    }

    /// `true` while the voice is sounding (gated on and envelope non-idle).
    pub fn is_active(&self) -> bool {
        self.active && self.envelope.is_active()
    }

    /// Current MIDI pitch.
    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    /// Current amplitude (post-velocity-clamp).
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Current envelope value, without advancing.
    pub fn envelope_value(&self) -> f32 {
        self.envelope.value()
    }

    /// Stamp recorded at allocation time, used for the stealing metric.
    pub fn attack_start(&self) -> u64 {
        self.attack_start
    }

    /// Set the stamp recorded at allocation time.
    pub fn set_attack_start(&mut self, stamp: u64) {
        self.attack_start = stamp;
    }

    /// Advance the envelope by one sample and generate one waveform sample.
    ///
    /// Output = `waveform(phase) * amplitude * envelope_value`.
    #[inline]
    pub fn render_sample(&mut self) -> f32 {
        if !self.active {
            return 0.0;
        }

        let env_value = self.envelope.advance();
        if !self.envelope.is_active() {
            self.active = false;
        }

        let osc_value = self.oscillator.advance();
        osc_value * self.amplitude * env_value
    }
}


/// Owns a fixed-capacity pool of [`Voice`]s for one channel and implements
/// allocation/stealing.
///
/// Allocation policy on `note_on`: first Idle voice; else the oldest voice
/// (lowest remaining envelope value × time-since-attack), which is stolen.
/// `note_off` releases the first voice matching `pitch`; if multiple voices
/// match (same pitch retriggered before release), the oldest is released.
#[derive(Debug)]
pub struct VoiceManager<const N: usize> {
    voices: [Voice; N],
    sample_rate: f32,
    voice_count: usize,
    attack_counter: u64,
}

impl<const N: usize> VoiceManager<N> {
    /// Create a new voice manager with all `N` voices available.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: core::array::from_fn(|_| Voice::new(sample_rate)),
            sample_rate,
            voice_count: N,
            attack_counter: 0,
        }
    }

    /// Set the sample rate for all voices.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    /// Set the number of voices actually available for allocation, clamped
    /// to `[1, N]`. Voices beyond the new count are killed immediately.
    pub fn set_voice_count(&mut self, n: usize) {
        self.voice_count = n.clamp(1, N);
        for voice in self.voices.iter_mut().skip(self.voice_count) {
            voice.kill();
        }
    }

    /// Currently configured voice count.
    pub fn voice_count(&self) -> usize {
        self.voice_count
    }

    /// Number of voices currently sounding.
    pub fn active_voice_count(&self) -> usize {
        self.voices[..self.voice_count]
            .iter()
            .filter(|v| v.is_active())
            .count()
    }

    /// Read access to the voice pool (up to `voice_count`).
    pub fn voices(&self) -> &[Voice] {
        &self.voices[..self.voice_count]
    }

    /// Mutable access to the voice pool (up to `voice_count`), for broadcast
    /// setters (waveform, ADSR).
    pub fn voices_mut(&mut self) -> &mut [Voice] {
        &mut self.voices[..self.voice_count]
    }

    /// Trigger a note on, allocating or stealing a voice. Returns the index
    /// of the voice used.
    pub fn note_on(&mut self, pitch: u8, velocity: f32) -> usize {
        let idx = self.allocate_voice();
        self.attack_counter += 1;
        self.voices[idx].set_attack_start(self.attack_counter);
        self.voices[idx].note_on(pitch, velocity);
        idx
    }

    /// As [`note_on`](Self::note_on), but at an explicit frequency — used
    /// when the caller has already applied transposition/fine-tuning so
    /// the sounding pitch differs from `midi_to_freq(pitch)`. Returns the
    /// index of the voice used.
    pub fn note_on_at(&mut self, pitch: u8, base_freq: f32, velocity: f32) -> usize {
        let idx = self.allocate_voice();
        self.attack_counter += 1;
        self.voices[idx].set_attack_start(self.attack_counter);
        self.voices[idx].note_on_at(pitch, base_freq, velocity);
        idx
    }

    /// Apply a pitch-bend ratio to every active voice's sounding
    /// frequency, relative to each voice's own `base_frequency`.
    pub fn set_pitch_bend_ratio(&mut self, ratio: f32) {
        for voice in self.voices[..self.voice_count].iter_mut() {
            if voice.is_active() {
                voice.set_pitch_bend_ratio(ratio);
            }
        }
    }

    /// Release the first (oldest, if multiple) voice matching `pitch`.
    pub fn note_off(&mut self, pitch: u8) {
        let mut oldest: Option<usize> = None;
        for (i, voice) in self.voices[..self.voice_count].iter().enumerate() {
            if voice.is_active() && voice.pitch() == pitch {
                oldest = match oldest {
                    None => Some(i),
                    Some(j) if voice.attack_start() < self.voices[j].attack_start() => Some(i),
                    other => other,
                };
            }
        }
        if let Some(i) = oldest {
            self.voices[i].note_off();
        }
    }

    /// Kill every voice immediately.
    pub fn all_off(&mut self) {
        for voice in self.voices[..self.voice_count].iter_mut() {
            voice.kill();
        }
    }

    /// Render `frames` samples of all active voices into an interleaved
    /// stereo `buffer` (length `frames * 2`), accumulating (not clipping).
    pub fn render(&mut self, buffer: &mut [f32], frames: usize) {
        for frame in 0..frames {
            let mut sum = 0.0;
            for voice in self.voices[..self.voice_count].iter_mut() {
                if voice.is_active() {
                    sum += voice.render_sample();
                }
            }
            buffer[frame * 2] += sum;
            buffer[frame * 2 + 1] += sum;
        }
    }

    fn allocate_voice(&mut self) -> usize {
        for (i, voice) in self.voices[..self.voice_count].iter().enumerate() {
            if !voice.is_active() {
                return i;
            }
        }

        // All voices active: steal the one with the lowest
        // (envelope_value * time_since_attack) — i.e. the quietest, oldest.
        self.voices[..self.voice_count]
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let age_a = self.attack_counter.saturating_sub(a.attack_start());
                let age_b = self.attack_counter.saturating_sub(b.attack_start());
                let metric_a = a.envelope_value() * age_a as f32;
                let metric_b = b.envelope_value() * age_b as f32;
                metric_a
                    .partial_cmp(&metric_b)
                    .unwrap_or(core::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}
