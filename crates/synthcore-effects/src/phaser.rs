//! Phaser built from cascaded first-order allpass stages swept by an LFO.
//!
//! Unlike [`AllpassFilter`](synthcore_core::AllpassFilter) (a Schroeder,
//! delay-line-based diffuser for reverb), a phaser needs a frequency-warping
//! first-order allpass whose coefficient tracks a swept corner frequency —
//! so this effect implements that stage directly.

use synthcore_core::{EffectModel, Lfo, LfoWaveform, ParamDescriptor, ParamId, ParamUnit, ParameterInfo};

const MAX_STAGES: usize = 12;

#[derive(Clone, Copy, Default)]
struct AllpassStage {
    x1: f32,
    y1: f32,
}

impl AllpassStage {
    #[inline]
    fn process(&mut self, input: f32, a: f32) -> f32 {
        let output = -a * input + self.x1 + a * self.y1;
        self.x1 = input;
        self.y1 = output;
        output
    }

    fn clear(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

/// `rate` Hz `[0.01, 10]`, `depth` `[0, 1]`, `feedback` `[-0.95, 0.95]`,
/// `mix` `[0, 1]`, `stages` (even) `[2, 12]`.
pub struct Phaser {
    rate: f32,
    depth: f32,
    feedback: f32,
    mix: f32,
    stages: usize,
    sample_rate: f32,
    lfo: Lfo,
    stages_l: [AllpassStage; MAX_STAGES],
    stages_r: [AllpassStage; MAX_STAGES],
    feedback_l: f32,
    feedback_r: f32,
    min_freq: f32,
    max_freq: f32,
}

impl Phaser {
    pub fn new(sample_rate: f32) -> Self {
        let mut lfo = Lfo::new(sample_rate, 0.5);
        lfo.set_waveform(LfoWaveform::Sine);
        Self {
            rate: 0.5,
            depth: 0.8,
            feedback: 0.3,
            mix: 0.5,
            stages: 4,
            sample_rate,
            lfo,
            stages_l: [AllpassStage::default(); MAX_STAGES],
            stages_r: [AllpassStage::default(); MAX_STAGES],
            feedback_l: 0.0,
            feedback_r: 0.0,
            min_freq: 200.0,
            max_freq: 2000.0,
        }
    }

    #[inline]
    fn coefficient_for(&self, freq_hz: f32) -> f32 {
        let omega = core::f32::consts::PI * freq_hz / self.sample_rate;
        let t = libm::tanf(omega);
        (t - 1.0) / (t + 1.0)
    }
}

impl ParameterInfo for Phaser {
    fn param_count(&self) -> usize {
        5
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(ParamDescriptor::rate_hz(0.01, 10.0, 0.5).with_id(ParamId(1600), "phs_rate")),
            1 => Some(ParamDescriptor::depth().with_id(ParamId(1601), "phs_depth")),
            2 => Some(
                ParamDescriptor {
                    name: "Feedback",
                    short_name: "Fdbk",
                    unit: ParamUnit::Percent,
                    min: -95.0,
                    max: 95.0,
                    default: 30.0,
                    step: 1.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1602), "phs_fdbk"),
            ),
            3 => Some(ParamDescriptor::mix().with_id(ParamId(1603), "phs_mix")),
            4 => Some(
                ParamDescriptor {
                    name: "Stages",
                    short_name: "Stages",
                    unit: ParamUnit::None,
                    min: 2.0,
                    max: MAX_STAGES as f32,
                    default: 4.0,
                    step: 2.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1604), "phs_stages"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.rate,
            1 => self.depth * 100.0,
            2 => self.feedback * 100.0,
            3 => self.mix * 100.0,
            4 => self.stages as f32,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => {
                self.rate = value.clamp(0.01, 10.0);
                self.lfo.set_frequency(self.rate);
            }
            1 => self.depth = (value / 100.0).clamp(0.0, 1.0),
            2 => self.feedback = (value / 100.0).clamp(-0.95, 0.95),
            3 => self.mix = (value / 100.0).clamp(0.0, 1.0),
            4 => {
                let even = ((value.round() as usize) / 2) * 2;
                self.stages = even.clamp(2, MAX_STAGES);
            }
            _ => {}
        }
    }
}

impl EffectModel for Phaser {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];

            let lfo_unipolar = (self.lfo.next() + 1.0) * 0.5;
            let sweep = self.min_freq + (self.max_freq - self.min_freq) * self.depth * lfo_unipolar;
            let a = self.coefficient_for(sweep);

            let mut sig_l = dry_l + self.feedback_l * self.feedback;
            let mut sig_r = dry_r + self.feedback_r * self.feedback;
            for k in 0..self.stages {
                sig_l = self.stages_l[k].process(sig_l, a);
                sig_r = self.stages_r[k].process(sig_r, a);
            }
            self.feedback_l = sig_l;
            self.feedback_r = sig_r;

            buffer[i * 2] = dry_l * (1.0 - self.mix) + sig_l * self.mix;
            buffer[i * 2 + 1] = dry_r * (1.0 - self.mix) + sig_r * self.mix;
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
        "Phaser"
    }

    fn reset(&mut self) {
        for s in &mut self.stages_l {
            s.clear();
        }
        for s in &mut self.stages_r {
            s.clear();
        }
        self.feedback_l = 0.0;
        self.feedback_r = 0.0;
        self.lfo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_zero_is_bypass() {
        let mut p = Phaser::new(48_000.0);
        p.set_parameter("mix", 0.0);
        let mut buf = [0.3, -0.2, 0.5, 0.5, -0.7, 0.1];
        let original = buf;
        p.process(&mut buf, 3);
        assert_eq!(buf, original);
    }

    #[test]
    fn stages_clamp_to_even_number() {
        let mut p = Phaser::new(48_000.0);
        p.set_parameter("stages", 7.0);
        assert_eq!(p.get_parameter("Stages").unwrap() as usize % 2, 0);
        p.set_parameter("stages", 99.0);
        assert_eq!(p.get_parameter("Stages").unwrap(), MAX_STAGES as f32);
    }

    #[test]
    fn output_stays_finite_over_sweep() {
        let sr = 48_000.0;
        let mut p = Phaser::new(sr);
        p.set_parameter("mix", 100.0);
        p.set_parameter("feedback", 90.0);
        let mut buf = vec![0.0f32; 2 * 4096];
        for i in 0..4096 {
            let t = i as f32 / sr;
            let s = libm::sinf(2.0 * core::f32::consts::PI * 220.0 * t);
            buf[i * 2] = s;
            buf[i * 2 + 1] = s;
        }
        p.process(&mut buf, 4096);
        assert!(buf.iter().all(|x| x.is_finite()));
    }
}
