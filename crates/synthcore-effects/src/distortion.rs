//! Distortion with four waveshaping characters and a post-shaping tone filter.

use synthcore_core::{
    EffectModel, OnePole, ParamDescriptor, ParamId, ParamUnit, ParameterInfo, asymmetric_clip,
    db_to_linear, foldback, hard_clip, soft_clip, wet_dry_mix_stereo,
};

/// Waveshaping character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistortionType {
    #[default]
    Soft,
    Hard,
    Fuzz,
    Tube,
}

impl DistortionType {
    fn from_index(v: f32) -> Self {
        match v.round() as i32 {
            1 => DistortionType::Hard,
            2 => DistortionType::Fuzz,
            3 => DistortionType::Tube,
            _ => DistortionType::Soft,
        }
    }

    fn as_index(self) -> f32 {
        match self {
            DistortionType::Soft => 0.0,
            DistortionType::Hard => 1.0,
            DistortionType::Fuzz => 2.0,
            DistortionType::Tube => 3.0,
        }
    }

    #[inline]
    fn shape(self, x: f32) -> f32 {
        match self {
            DistortionType::Soft => soft_clip(x),
            DistortionType::Hard => hard_clip(x, 1.0),
            DistortionType::Fuzz => foldback(x, 1.0),
            DistortionType::Tube => asymmetric_clip(x),
        }
    }
}

const MIN_TONE_HZ: f32 = 500.0;
const MAX_TONE_HZ: f32 = 12_000.0;

/// `drive` `[1, 20]`, `level` dB `[-24, 24]`, `tone` `[0, 1]`, `mix` `[0, 1]`,
/// `type` {Soft, Hard, Fuzz, Tube}.
pub struct Distortion {
    drive: f32,
    level_db: f32,
    tone: f32,
    mix: f32,
    kind: DistortionType,
    tone_filter_l: OnePole,
    tone_filter_r: OnePole,
}

impl Distortion {
    pub fn new(sample_rate: f32) -> Self {
        let mut s = Self {
            drive: 1.0,
            level_db: 0.0,
            tone: 0.5,
            mix: 1.0,
            kind: DistortionType::Soft,
            tone_filter_l: OnePole::new(sample_rate, MAX_TONE_HZ),
            tone_filter_r: OnePole::new(sample_rate, MAX_TONE_HZ),
        };
        s.update_tone();
        s
    }

    fn update_tone(&mut self) {
        let freq = MIN_TONE_HZ + (MAX_TONE_HZ - MIN_TONE_HZ) * self.tone;
        self.tone_filter_l.set_frequency(freq);
        self.tone_filter_r.set_frequency(freq);
    }
}

impl ParameterInfo for Distortion {
    fn param_count(&self) -> usize {
        5
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor {
                    name: "Drive",
                    short_name: "Drive",
                    unit: ParamUnit::None,
                    min: 1.0,
                    max: 20.0,
                    default: 1.0,
                    step: 0.1,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1700), "dist_drive"),
            ),
            1 => Some(
                ParamDescriptor::gain_db("Level", "Level", -24.0, 24.0, 0.0)
                    .with_id(ParamId(1701), "dist_level"),
            ),
            2 => Some(
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
                .with_id(ParamId(1702), "dist_tone"),
            ),
            3 => Some(ParamDescriptor::mix().with_id(ParamId(1703), "dist_mix")),
            4 => Some(
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
                .with_id(ParamId(1704), "dist_type"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.drive,
            1 => self.level_db,
            2 => self.tone * 100.0,
            3 => self.mix * 100.0,
            4 => self.kind.as_index(),
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.drive = value.clamp(1.0, 20.0),
            1 => self.level_db = value.clamp(-24.0, 24.0),
            2 => {
                self.tone = (value / 100.0).clamp(0.0, 1.0);
                self.update_tone();
            }
            3 => self.mix = (value / 100.0).clamp(0.0, 1.0),
            4 => self.kind = DistortionType::from_index(value),
            _ => {}
        }
    }
}

impl EffectModel for Distortion {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        let level = db_to_linear(self.level_db);
        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];

            let shaped_l = self.kind.shape(dry_l * self.drive);
            let shaped_r = self.kind.shape(dry_r * self.drive);

            let toned_l = self.tone_filter_l.process(shaped_l) * level;
            let toned_r = self.tone_filter_r.process(shaped_r) * level;

            let (l, r) = wet_dry_mix_stereo(dry_l, dry_r, toned_l, toned_r, self.mix);
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

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.tone_filter_l.set_sample_rate(sample_rate);
        self.tone_filter_r.set_sample_rate(sample_rate);
        self.update_tone();
    }

    fn name(&self) -> &str {
        "Distortion"
    }

    fn reset(&mut self) {
        self.tone_filter_l.reset();
        self.tone_filter_r.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_zero_is_bypass() {
        let mut d = Distortion::new(48_000.0);
        d.set_parameter("mix", 0.0);
        let mut buf = [0.3, -0.2, 0.5, 0.5, -0.7, 0.1];
        let original = buf;
        d.process(&mut buf, 3);
        assert_eq!(buf, original);
    }

    #[test]
    fn drive_increases_harmonic_content() {
        let mut d = Distortion::new(48_000.0);
        d.set_parameter("mix", 100.0);
        d.set_parameter("tone", 100.0);
        d.set_parameter("drive", 15.0);
        let mut buf = [0.05, 0.05];
        d.process(&mut buf, 1);
        assert!(buf[0].abs() <= 1.01);
        assert!(buf[0].abs() > 0.05);
    }
}
