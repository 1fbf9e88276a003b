//! Bitcrusher: quantization + sample-and-hold rate reduction.

use synthcore_core::{EffectModel, ParamDescriptor, ParamId, ParamUnit, ParameterInfo, wet_dry_mix_stereo};

/// `bit_depth` `[1, 16]`, `sample_rate_reduction` `[0.01, 1]` (fraction of
/// the host rate actually sampled at), `mix` `[0, 1]`, `drive` `[1, 10]`
/// (pre-quantization gain boost).
pub struct Bitcrusher {
    bit_depth: f32,
    rate_reduction: f32,
    mix: f32,
    drive: f32,
    phase_accum: f32,
    held_l: f32,
    held_r: f32,
}

impl Bitcrusher {
    pub fn new(_sample_rate: f32) -> Self {
        Self {
            bit_depth: 16.0,
            rate_reduction: 1.0,
            mix: 1.0,
            drive: 1.0,
            phase_accum: 0.0,
            held_l: 0.0,
            held_r: 0.0,
        }
    }

    #[inline]
    fn quantize(&self, x: f32) -> f32 {
        let levels = libm::powf(2.0, self.bit_depth.round());
        let driven = (x * self.drive).clamp(-1.0, 1.0);
        (driven * levels * 0.5).round() / (levels * 0.5)
    }
}

impl ParameterInfo for Bitcrusher {
    fn param_count(&self) -> usize {
        4
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor {
                    name: "Bit Depth",
                    short_name: "Bits",
                    unit: ParamUnit::None,
                    min: 1.0,
                    max: 16.0,
                    default: 16.0,
                    step: 1.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1900), "crush_bits"),
            ),
            1 => Some(
                ParamDescriptor {
                    name: "Sample Rate Reduction",
                    short_name: "SR Red",
                    unit: ParamUnit::Percent,
                    min: 1.0,
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
                .with_id(ParamId(1901), "crush_sr"),
            ),
            2 => Some(ParamDescriptor::mix().with_id(ParamId(1902), "crush_mix")),
            3 => Some(
                ParamDescriptor {
                    name: "Drive",
                    short_name: "Drive",
                    unit: ParamUnit::None,
                    min: 1.0,
                    max: 10.0,
                    default: 1.0,
                    step: 0.1,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1903), "crush_drive"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.bit_depth,
            1 => self.rate_reduction * 100.0,
            2 => self.mix * 100.0,
            3 => self.drive,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.bit_depth = value.round().clamp(1.0, 16.0),
            1 => self.rate_reduction = (value / 100.0).clamp(0.01, 1.0),
            2 => self.mix = (value / 100.0).clamp(0.0, 1.0),
            3 => self.drive = value.clamp(1.0, 10.0),
            _ => {}
        }
    }
}

impl EffectModel for Bitcrusher {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];

            self.phase_accum += self.rate_reduction;
            if self.phase_accum >= 1.0 {
                self.phase_accum -= 1.0;
                self.held_l = self.quantize(dry_l);
                self.held_r = self.quantize(dry_r);
            }

            let (l, r) = wet_dry_mix_stereo(dry_l, dry_r, self.held_l, self.held_r, self.mix);
            buffer[i * 2] = l;
            buffer[i * 2 + 1] = r;
        }
    }

    fn set_parameter(&mut self, name: &str, value: f32) {
        synthcore_core::set_named_parameter(self, name, value);
    }

    fn get_parameter(&self, name: &str) -> Option<f32> {
        synthcore_core::get_named_parameter(self, name)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn name(&self) -> &str {
        "Bitcrusher"
    }

    fn reset(&mut self) {
        self.phase_accum = 0.0;
        self.held_l = 0.0;
        self.held_r = 0.0;
    }
}
