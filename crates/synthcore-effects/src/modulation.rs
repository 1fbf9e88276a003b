//! Chorus/flanger modulation effect — a single LFO-modulated delay line whose
//! `spread` and delay-time range decide whether it reads as a chorus (longer
//! delay, gentle detune) or a flanger (short delay, metallic comb).

use synthcore_core::{
    EffectModel, InterpolatedDelay, Lfo, LfoWaveform, ParamDescriptor, ParamId, ParamUnit,
    ParameterInfo, flush_denormal,
};

/// Which of the two classic voicings this instance presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModulationVoicing {
    #[default]
    Chorus,
    Flanger,
}

impl ModulationVoicing {
    fn base_delay_ms(self) -> f32 {
        match self {
            ModulationVoicing::Chorus => 15.0,
            ModulationVoicing::Flanger => 3.0,
        }
    }
}

/// `rate` Hz `[0.01, 10]`, `depth` `[0, 1]`, `feedback` `[-0.95, 0.95]`,
/// `spread` `[0, 1]` (stereo LFO phase offset, 1.0 = 180 degrees),
/// `wave_type` {Sine, Triangle}.
pub struct Modulation {
    voicing: ModulationVoicing,
    rate: f32,
    depth: f32,
    feedback: f32,
    spread: f32,
    mix: f32,
    sample_rate: f32,
    lfo_l: Lfo,
    lfo_r: Lfo,
    line_l: InterpolatedDelay,
    line_r: InterpolatedDelay,
}

const MAX_DELAY_MS: f32 = 40.0;

impl Modulation {
    pub fn new(sample_rate: f32, voicing: ModulationVoicing) -> Self {
        let capacity = (MAX_DELAY_MS / 1000.0 * sample_rate) as usize + 8;
        let mut lfo_l = Lfo::new(sample_rate, 0.5);
        lfo_l.set_waveform(LfoWaveform::Sine);
        let mut lfo_r = Lfo::new(sample_rate, 0.5);
        lfo_r.set_waveform(LfoWaveform::Sine);
        Self {
            voicing,
            rate: 0.5,
            depth: 0.5,
            feedback: 0.0,
            spread: 1.0,
            mix: 0.5,
            sample_rate,
            lfo_l,
            lfo_r,
            line_l: InterpolatedDelay::new(capacity),
            line_r: InterpolatedDelay::new(capacity),
        }
    }

    fn apply_spread(&mut self) {
        let phase_offset = core::f32::consts::PI * self.spread;
        self.lfo_r.set_phase(self.lfo_l.phase() + phase_offset);
    }

    fn set_wave(&mut self, wave: LfoWaveform) {
        self.lfo_l.set_waveform(wave);
        self.lfo_r.set_waveform(wave);
    }
}

impl ParameterInfo for Modulation {
    fn param_count(&self) -> usize {
        6
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(ParamDescriptor::rate_hz(0.01, 10.0, 0.5).with_id(ParamId(2000), "mod_rate")),
            1 => Some(ParamDescriptor::depth().with_id(ParamId(2001), "mod_depth")),
            2 => Some(
                ParamDescriptor {
                    name: "Feedback",
                    short_name: "Fdbk",
                    unit: ParamUnit::Percent,
                    min: -95.0,
                    max: 95.0,
                    default: 0.0,
                    step: 1.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(2002), "mod_fdbk"),
            ),
            3 => Some(
                ParamDescriptor {
                    name: "Spread",
                    short_name: "Spread",
                    unit: ParamUnit::Percent,
                    min: 0.0,
                    max: 100.0,
                    default: 100.0,
                    step: 1.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(2003), "mod_spread"),
            ),
            4 => Some(ParamDescriptor::mix().with_id(ParamId(2004), "mod_mix")),
            5 => Some(
                ParamDescriptor {
                    name: "Wave Type",
                    short_name: "Wave",
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
                .with_id(ParamId(2005), "mod_wave"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.rate,
            1 => self.depth * 100.0,
            2 => self.feedback * 100.0,
            3 => self.spread * 100.0,
            4 => self.mix * 100.0,
            5 => {
                if self.lfo_l.waveform() == LfoWaveform::Triangle {
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
            0 => {
                self.rate = value.clamp(0.01, 10.0);
                self.lfo_l.set_frequency(self.rate);
                self.lfo_r.set_frequency(self.rate);
            }
            1 => self.depth = (value / 100.0).clamp(0.0, 1.0),
            2 => self.feedback = (value / 100.0).clamp(-0.95, 0.95),
            3 => {
                self.spread = (value / 100.0).clamp(0.0, 1.0);
                self.apply_spread();
            }
            4 => self.mix = (value / 100.0).clamp(0.0, 1.0),
            5 => {
                let wave = if value >= 0.5 {
                    LfoWaveform::Triangle
                } else {
                    LfoWaveform::Sine
                };
                self.set_wave(wave);
            }
            _ => {}
        }
    }
}

impl EffectModel for Modulation {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        let base_delay_samples = self.voicing.base_delay_ms() / 1000.0 * self.sample_rate;
        let mod_depth_samples = base_delay_samples * 0.8 * self.depth;

        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];

            let delay_l = (base_delay_samples + mod_depth_samples * self.lfo_l.next()).max(1.0);
            let delay_r = (base_delay_samples + mod_depth_samples * self.lfo_r.next()).max(1.0);

            let wet_l = self.line_l.read(delay_l);
            let wet_r = self.line_r.read(delay_r);

            self.line_l
                .write(flush_denormal(dry_l + wet_l * self.feedback));
            self.line_r
                .write(flush_denormal(dry_r + wet_r * self.feedback));

            buffer[i * 2] = dry_l * (1.0 - self.mix) + wet_l * self.mix;
            buffer[i * 2 + 1] = dry_r * (1.0 - self.mix) + wet_r * self.mix;
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
        self.lfo_l.set_sample_rate(sample_rate);
        self.lfo_r.set_sample_rate(sample_rate);
    }

    fn name(&self) -> &str {
        match self.voicing {
            ModulationVoicing::Chorus => "Chorus",
            ModulationVoicing::Flanger => "Flanger",
        }
    }

    fn reset(&mut self) {
        self.line_l.clear();
        self.line_r.clear();
        self.lfo_l.reset();
        self.lfo_r.reset();
        self.apply_spread();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_zero_is_bypass() {
        let mut m = Modulation::new(48_000.0, ModulationVoicing::Chorus);
        m.set_parameter("mix", 0.0);
        let mut buf = [0.3, -0.2, 0.5, 0.5, -0.7, 0.1];
        let original = buf;
        m.process(&mut buf, 3);
        assert_eq!(buf, original);
    }

    #[test]
    fn flanger_produces_finite_output() {
        let sr = 48_000.0;
        let mut m = Modulation::new(sr, ModulationVoicing::Flanger);
        m.set_parameter("mix", 100.0);
        m.set_parameter("feedback", 60.0);
        let mut buf = vec![0.0f32; 2 * 2048];
        for i in 0..2048 {
            let t = i as f32 / sr;
            let s = libm::sinf(2.0 * core::f32::consts::PI * 440.0 * t);
            buf[i * 2] = s;
            buf[i * 2 + 1] = s;
        }
        m.process(&mut buf, 2048);
        assert!(buf.iter().all(|x| x.is_finite()));
    }
}
