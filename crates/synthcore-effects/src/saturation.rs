//! Saturation - gentler harmonic coloration than [`Distortion`](crate::distortion::Distortion),
//! modeling four analog-flavored nonlinearities.

use synthcore_core::{
    EffectModel, ParamDescriptor, ParamId, ParamUnit, ParameterInfo, asymmetric_clip, fast_tanh,
    soft_clip, wet_dry_mix_stereo,
};

/// Saturation character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaturationType {
    #[default]
    Soft,
    Tube,
    Tape,
    Analog,
}

impl SaturationType {
    fn from_index(v: f32) -> Self {
        match v.round() as i32 {
            1 => SaturationType::Tube,
            2 => SaturationType::Tape,
            3 => SaturationType::Analog,
            _ => SaturationType::Soft,
        }
    }

    fn as_index(self) -> f32 {
        match self {
            SaturationType::Soft => 0.0,
            SaturationType::Tube => 1.0,
            SaturationType::Tape => 2.0,
            SaturationType::Analog => 3.0,
        }
    }

    #[inline]
    fn shape(self, x: f32) -> f32 {
        match self {
            SaturationType::Soft => fast_tanh(x),
            SaturationType::Tube => asymmetric_clip(x),
            SaturationType::Tape => {
                if x >= 0.0 {
                    1.0 - libm::expf(-2.0 * x)
                } else {
                    -1.0 + libm::expf(1.8 * x)
                }
            }
            SaturationType::Analog => 0.5 * (soft_clip(x) + asymmetric_clip(x)),
        }
    }
}

/// `drive` `[1, 10]`, `tone` `[0, 1]`, `mix` `[0, 1]`, `type` {Soft, Tube,
/// Tape, Analog}. Unlike [`Distortion`](crate::distortion::Distortion) this
/// effect has no dedicated tone filter stage — `tone` instead blends the
/// nonlinearity's input level, keeping the character subtler.
pub struct Saturation {
    drive: f32,
    tone: f32,
    mix: f32,
    kind: SaturationType,
}

impl Saturation {
    pub fn new(_sample_rate: f32) -> Self {
        Self {
            drive: 2.0,
            tone: 0.5,
            mix: 1.0,
            kind: SaturationType::Soft,
        }
    }
}

impl ParameterInfo for Saturation {
    fn param_count(&self) -> usize {
        4
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor {
                    name: "Drive",
                    short_name: "Drive",
                    unit: ParamUnit::None,
                    min: 1.0,
                    max: 10.0,
                    default: 2.0,
                    step: 0.1,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1800), "sat_drive"),
            ),
            1 => Some(
                ParamDescriptor {
                    name: "Tone",
                    short_name: "Tone",
                    unit: ParamUnit::Percent,
                    min: 0.0,
                    max: 100.0,
                    default: 50.0,
                    step: 1.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1801), "sat_tone"),
            ),
            2 => Some(ParamDescriptor::mix().with_id(ParamId(1802), "sat_mix")),
            3 => Some(
                ParamDescriptor {
                    name: "Type",
                    short_name: "Type",
                    unit: ParamUnit::None,
                    min: 0.0,
                    max: 3.0,
                    default: 0.0,
                    step: 1.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1803), "sat_type"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.drive,
            1 => self.tone * 100.0,
            2 => self.mix * 100.0,
            3 => self.kind.as_index(),
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.drive = value.clamp(1.0, 10.0),
            1 => self.tone = (value / 100.0).clamp(0.0, 1.0),
            2 => self.mix = (value / 100.0).clamp(0.0, 1.0),
            3 => self.kind = SaturationType::from_index(value),
            _ => {}
        }
    }
}

impl EffectModel for Saturation {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        let input_gain = 1.0 + (self.drive - 1.0) * (0.3 + 0.7 * self.tone);
        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];

            let wet_l = self.kind.shape(dry_l * input_gain) / input_gain.sqrt();
            let wet_r = self.kind.shape(dry_r * input_gain) / input_gain.sqrt();

            let (l, r) = wet_dry_mix_stereo(dry_l, dry_r, wet_l, wet_r, self.mix);
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
        "Saturation"
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_zero_is_bypass() {
        let mut s = Saturation::new(48_000.0);
        s.set_parameter("mix", 0.0);
        let mut buf = [0.3, -0.2, 0.5, 0.5, -0.7, 0.1];
        let original = buf;
        s.process(&mut buf, 3);
        assert_eq!(buf, original);
    }

    #[test]
    fn all_types_stay_bounded() {
        for kind in [0.0, 1.0, 2.0, 3.0] {
            let mut s = Saturation::new(48_000.0);
            s.set_parameter("mix", 100.0);
            s.set_parameter("type", kind);
            s.set_parameter("drive", 10.0);
            let mut buf = vec![0.9f32; 2 * 256];
            s.process(&mut buf, 256);
            assert!(buf.iter().all(|x| x.is_finite() && x.abs() < 3.0));
        }
    }
}
