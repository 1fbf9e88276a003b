//! Linear ADSR envelope generator for synthesis.
//!
//! Provides attack-decay-sustain-release envelopes with straight-line ramps
//! (not exponential curves) for the voice engine's amplitude modulation.

/// ADSR envelope states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Envelope is inactive — output is zero.
    #[default]
    Idle,
    /// Attack phase — value ramps linearly from 0 toward 1.
    Attack,
    /// Decay phase — value ramps linearly from 1 toward sustain.
    Decay,
    /// Sustain phase — value holds at sustain while gated.
    Sustain,
    /// Release phase — value ramps linearly toward 0.
    Release,
}

/// Linear ADSR envelope generator.
///
/// Times are expressed in seconds. Each phase advances `value` by a fixed
/// per-sample increment derived from the phase duration and the sample rate,
/// rather than an exponential coefficient:
///
/// - Attack: `value += 1 / (attack_seconds * sample_rate)`, clamped at 1.0,
///   then transitions to Decay.
/// - Decay: `value -= (1 - sustain) / (decay_seconds * sample_rate)`, clamped
///   at `sustain`, then transitions to Sustain.
/// - Sustain: `value = sustain` (held).
/// - Release: `value -= sustain / (release_seconds * sample_rate)`, clamped
///   at 0.0, then transitions to Idle.
///
/// # Example
///
/// ```rust
/// use synthcore_voice::{AdsrEnvelope, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48_000.0);
/// env.set_attack(0.01);
/// env.set_decay(0.1);
/// env.set_sustain(0.7);
/// env.set_release(0.2);
///
/// env.trigger();
/// for _ in 0..1000 {
///     let _level = env.advance();
/// }
///
/// env.release();
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    value: f32,
    sample_rate: f32,

    attack_seconds: f32,
    decay_seconds: f32,
    sustain: f32,
    release_seconds: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48_000.0)
    }
}

impl AdsrEnvelope {
    /// Create a new envelope with default times (10ms attack, 100ms decay,
    /// 0.7 sustain, 200ms release).
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: EnvelopeState::Idle,
            value: 0.0,
            sample_rate,
            attack_seconds: 0.01,
            decay_seconds: 0.1,
            sustain: 0.7,
            release_seconds: 0.2,
        }
    }

    /// Set attack time in seconds (minimum one sample).
    pub fn set_attack(&mut self, seconds: f32) {
        self.attack_seconds = seconds.max(1.0 / self.sample_rate);
    }

    /// Get attack time in seconds.
    pub fn attack(&self) -> f32 {
        self.attack_seconds
    }

    /// Set decay time in seconds (minimum one sample).
    pub fn set_decay(&mut self, seconds: f32) {
        self.decay_seconds = seconds.max(1.0 / self.sample_rate);
    }

    /// Get decay time in seconds.
    pub fn decay(&self) -> f32 {
        self.decay_seconds
    }

    /// Set sustain level, clamped to `[0, 1]`.
    pub fn set_sustain(&mut self, level: f32) {
        self.sustain = level.clamp(0.0, 1.0);
    }

    /// Get sustain level.
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Set release time in seconds (minimum one sample).
    pub fn set_release(&mut self, seconds: f32) {
        self.release_seconds = seconds.max(1.0 / self.sample_rate);
    }

    /// Get release time in seconds.
    pub fn release_time(&self) -> f32 {
        self.release_seconds
    }

    /// Set the sample rate. Does not rescale already-configured times;
    /// callers that change sample rate after configuring times should
    /// re-apply them.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Trigger the envelope (note on): stage becomes Attack, value resets to 0.
    pub fn trigger(&mut self) {
        self.state = EnvelopeState::Attack;
        self.value = 0.0;
    }

    /// Release the envelope (note off). No-op if already Idle.
    pub fn release(&mut self) {
        if self.state != EnvelopeState::Idle {
            self.state = EnvelopeState::Release;
        }
    }

    /// Force the envelope to Idle with value 0.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.value = 0.0;
    }

    /// Current stage.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Current value without advancing.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// `true` while the envelope is not Idle.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance the envelope by one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {
                self.value = 0.0;
            }
            EnvelopeState::Attack => {
                self.value += 1.0 / (self.attack_seconds * self.sample_rate);
                if self.value >= 1.0 {
                    self.value = 1.0;
                    self.state = EnvelopeState::Decay;
                }
            }
            EnvelopeState::Decay => {
                self.value -= (1.0 - self.sustain) / (self.decay_seconds * self.sample_rate);
                if self.value <= self.sustain {
                    self.value = self.sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }
            EnvelopeState::Sustain => {
                self.value = self.sustain;
            }
            EnvelopeState::Release => {
                self.value -= self.sustain / (self.release_seconds * self.sample_rate);
                if self.value <= 0.0 {
                    self.value = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
        }

        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_stays_at_zero() {
        let mut env = AdsrEnvelope::new(48_000.0);
        assert_eq!(env.state(), EnvelopeState::Idle);
        for _ in 0..100 {
            assert_eq!(env.advance(), 0.0);
        }
    }

    #[test]
    fn trigger_starts_attack_from_zero() {
        let mut env = AdsrEnvelope::new(48_000.0);
        env.trigger();
        assert_eq!(env.state(), EnvelopeState::Attack);
        assert_eq!(env.value(), 0.0);
    }

    #[test]
    fn attack_reaches_one_then_decays() {
        let mut env = AdsrEnvelope::new(48_000.0);
        env.set_attack(0.001); // 48 samples
        env.trigger();

        for _ in 0..48 {
            env.advance();
        }
        assert!(
            env.state() == EnvelopeState::Decay || env.state() == EnvelopeState::Sustain,
            "expected transition out of Attack, got {:?}",
            env.state()
        );
    }

    #[test]
    fn decay_settles_exactly_at_sustain() {
        let mut env = AdsrEnvelope::new(48_000.0);
        env.set_attack(0.0001);
        env.set_decay(0.001);
        env.set_sustain(0.5);
        env.trigger();

        for _ in 0..10_000 {
            env.advance();
            if env.state() == EnvelopeState::Sustain {
                break;
            }
        }
        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert_eq!(env.value(), 0.5);
    }

    #[test]
    fn release_reaches_idle_at_zero() {
        let mut env = AdsrEnvelope::new(48_000.0);
        env.set_attack(0.0001);
        env.set_decay(0.0001);
        env.set_sustain(0.6);
        env.set_release(0.001);
        env.trigger();

        for _ in 0..1000 {
            env.advance();
        }
        assert_eq!(env.state(), EnvelopeState::Sustain);

        env.release();
        assert_eq!(env.state(), EnvelopeState::Release);

        for _ in 0..10_000 {
            env.advance();
            if env.state() == EnvelopeState::Idle {
                break;
            }
        }
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.value(), 0.0);
    }

    #[test]
    fn release_noop_when_idle() {
        let mut env = AdsrEnvelope::new(48_000.0);
        env.release();
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn value_stays_in_unit_range() {
        let mut env = AdsrEnvelope::new(48_000.0);
        env.set_attack(0.005);
        env.set_decay(0.02);
        env.set_sustain(0.6);
        env.set_release(0.05);
        env.trigger();

        for _ in 0..5000 {
            let v = env.advance();
            assert!((0.0..=1.0).contains(&v), "value out of range: {v}");
        }
        env.release();
        for _ in 0..10_000 {
            let v = env.advance();
            assert!(
                (0.0..=1.0).contains(&v),
                "value out of range during release: {v}"
            );
        }
    }

    #[test]
    fn is_active_tracks_idle_state() {
        let mut env = AdsrEnvelope::new(48_000.0);
        assert!(!env.is_active());
        env.trigger();
        assert!(env.is_active());
        env.reset();
        assert!(!env.is_active());
    }
}
