//! Comb filter effect with FIR/IIR topology switch and LFO-modulated delay.
//!
//! Built directly on [`InterpolatedDelay`] rather than
//! [`CombFilter`](synthcore_core::CombFilter), since the latter clamps
//! feedback to `[0, 0.99]` and always recurses — this effect needs negative
//! feedback and a feedforward (FIR) mode too.

use synthcore_core::{
    EffectModel, InterpolatedDelay, Lfo, LfoWaveform, ParamDescriptor, ParamId, ParamUnit,
    ParameterInfo, flush_denormal,
};

/// Comb topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombMode {
    /// Feedforward only: `y[n] = x[n] + feedback * x[n - delay]`.
    #[default]
    Fir,
    /// Recursive: `y[n] = x[n] + feedback * y[n - delay]`.
    Iir,
}

struct CombChannel {
    delay: InterpolatedDelay,
    last_out: f32,
}

impl CombChannel {
    fn new(capacity: usize) -> Self {
        Self {
            delay: InterpolatedDelay::new(capacity),
            last_out: 0.0,
        }
    }

    fn process(&mut self, input: f32, delay_samples: f32, feedback: f32, mode: CombMode) -> f32 {
        let delayed = self.delay.read(delay_samples);
        let output = match mode {
            CombMode::Fir => input + feedback * delayed,
            CombMode::Iir => input + feedback * self.last_out,
        };
        let write_value = match mode {
            CombMode::Fir => input,
            CombMode::Iir => flush_denormal(output),
        };
        self.delay.write(write_value);
        self.last_out = output;
        output
    }

    fn clear(&mut self) {
        self.delay.clear();
        self.last_out = 0.0;
    }
}

/// `delay_time` [0.1, 100] ms, `feedback` [-0.99, 0.99], `mod_amount` (ms),
/// `mod_rate` (Hz), `direct_mix` [0, 1], `mode` {Fir, Iir}.
pub struct Comb {
    delay_time_ms: f32,
    feedback: f32,
    mod_amount_ms: f32,
    mod_rate: f32,
    direct_mix: f32,
    mode: CombMode,
    sample_rate: f32,
    lfo: Lfo,
    left: CombChannel,
    right: CombChannel,
}

const MAX_DELAY_MS: f32 = 100.0;

impl Comb {
    pub fn new(sample_rate: f32) -> Self {
        let capacity = (MAX_DELAY_MS / 1000.0 * sample_rate) as usize + 8;
        let mut lfo = Lfo::new(sample_rate, 0.5);
        lfo.set_waveform(LfoWaveform::Sine);
        Self {
            delay_time_ms: 5.0,
            feedback: 0.5,
            mod_amount_ms: 0.0,
            mod_rate: 0.5,
            direct_mix: 0.0,
            mode: CombMode::Fir,
            sample_rate,
            lfo,
            left: CombChannel::new(capacity),
            right: CombChannel::new(capacity),
        }
    }

    pub fn set_mode(&mut self, mode: CombMode) {
        self.mode = mode;
    }
}

impl ParameterInfo for Comb {
    fn param_count(&self) -> usize {
        6
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::time_ms("Delay Time", "Time", 0.1, MAX_DELAY_MS, 5.0)
                    .with_id(ParamId(1300), "comb_time"),
            ),
            1 => Some(
                ParamDescriptor {
                    name: "Feedback",
                    short_name: "Fdbk",
                    unit: ParamUnit::Percent,
                    min: -99.0,
                    max: 99.0,
                    default: 50.0,
                    step: 1.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1301), "comb_fdbk"),
            ),
            2 => Some(
                ParamDescriptor::time_ms("Mod Amount", "ModAmt", 0.0, 20.0, 0.0)
                    .with_id(ParamId(1302), "comb_mod_amt"),
            ),
            3 => Some(
                ParamDescriptor::rate_hz(0.01, 20.0, 0.5).with_id(ParamId(1303), "comb_mod_rate"),
            ),
            4 => Some(ParamDescriptor::mix().with_id(ParamId(1304), "comb_direct")),
            5 => Some(
                ParamDescriptor {
                    name: "Mode",
                    short_name: "Mode",
                    unit: ParamUnit::None,
                    min: 0.0,
                    max: 1.0,
                    default: 0.0,
                    step: 1.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1305), "comb_mode"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.delay_time_ms,
            1 => self.feedback * 100.0,
            2 => self.mod_amount_ms,
            3 => self.mod_rate,
            4 => self.direct_mix * 100.0,
            5 => {
                if self.mode == CombMode::Iir {
                    1.0
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.delay_time_ms = value.clamp(0.1, MAX_DELAY_MS),
            1 => self.feedback = (value / 100.0).clamp(-0.99, 0.99),
            2 => self.mod_amount_ms = value.clamp(0.0, 20.0),
            3 => {
                self.mod_rate = value.clamp(0.01, 20.0);
                self.lfo.set_frequency(self.mod_rate);
            }
            4 => self.direct_mix = (value / 100.0).clamp(0.0, 1.0),
            5 => self.mode = if value >= 0.5 { CombMode::Iir } else { CombMode::Fir },
            _ => {}
        }
    }
}

impl EffectModel for Comb {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        let base_delay_samples = self.delay_time_ms / 1000.0 * self.sample_rate;
        let mod_depth_samples = self.mod_amount_ms / 1000.0 * self.sample_rate;

        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];

            let lfo_value = self.lfo.next();
            let delay_samples =
                (base_delay_samples + mod_depth_samples * lfo_value).max(1.0);

            let wet_l = self
                .left
                .process(dry_l, delay_samples, self.feedback, self.mode);
            let wet_r = self
                .right
                .process(dry_r, delay_samples, self.feedback, self.mode);

            buffer[i * 2] = dry_l * self.direct_mix + wet_l * (1.0 - self.direct_mix);
            buffer[i * 2 + 1] = dry_r * self.direct_mix + wet_r * (1.0 - self.direct_mix);
        }
    }

    fn set_parameter(&mut self, name: &str, value: f32) {
        synthcore_core::set_named_parameter(self, name, value);
    }

    fn get_parameter(&self, name: &str) -> Option<f32> {
        synthcore_core::get_named_parameter(self, name)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lfo.set_sample_rate(sample_rate);
    }

    fn name(&self) -> &str {
        "Comb Filter"
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.lfo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_mix_one_is_bypass() {
        let mut c = Comb::new(48_000.0);
        c.set_parameter("direct_mix", 100.0);
        let mut buf = [0.3, -0.2, 0.5, 0.5, -0.7, 0.1];
        let original = buf;
        c.process(&mut buf, 3);
        assert_eq!(buf, original);
    }

    #[test]
    fn fir_mode_produces_comb_notches() {
        let mut c = Comb::new(48_000.0);
        c.set_mode(CombMode::Fir);
        c.set_parameter("feedback", 80.0);
        let mut buf = vec![0.0f32; 2048];
        buf[0] = 1.0;
        buf[1] = 1.0;
        c.process(&mut buf, 1024);
        assert!(buf.iter().any(|x| x.abs() > 1e-6));
    }
}
