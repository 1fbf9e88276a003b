//! Freeverb-style stereo reverb.
//!
//! Eight parallel damped comb filters feed four series allpass diffusers per
//! channel, with the left/right tap lengths offset (`STEREO_SPREAD`) so the
//! two channels decorrelate. Follows Jezar's public-domain Freeverb design,
//! the same topology referenced in [`ModulatedComb`](synthcore_core::comb::ModulatedComb)'s docs.

use synthcore_core::{AllpassFilter, CombFilter, EffectModel, ParamDescriptor, ParamId, ParamUnit, ParameterInfo};

const NUM_COMBS: usize = 8;
const NUM_ALLPASSES: usize = 4;
const STEREO_SPREAD: usize = 23;
const TUNING_BASE_SR: f32 = 44_100.0;

const COMB_TUNINGS: [usize; NUM_COMBS] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNINGS: [usize; NUM_ALLPASSES] = [556, 441, 341, 225];

const SCALE_ROOM: f32 = 0.28;
const OFFSET_ROOM: f32 = 0.7;
const SCALE_DAMP: f32 = 0.4;
const FIXED_ALLPASS_FEEDBACK: f32 = 0.5;

struct Channel {
    combs: [CombFilter; NUM_COMBS],
    allpasses: [AllpassFilter; NUM_ALLPASSES],
}

impl Channel {
    fn new(sample_rate: f32, spread: usize) -> Self {
        let scale = sample_rate / TUNING_BASE_SR;
        let combs = COMB_TUNINGS
            .map(|t| CombFilter::new(((t + spread) as f32 * scale) as usize + 1));
        let allpasses = ALLPASS_TUNINGS
            .map(|t| AllpassFilter::new(((t + spread) as f32 * scale) as usize + 1));
        Self { combs, allpasses }
    }

    fn set_room_params(&mut self, feedback: f32, damp: f32) {
        for c in &mut self.combs {
            c.set_feedback(feedback);
            c.set_damp(damp);
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let mut out = 0.0;
        for c in &mut self.combs {
            out += c.process(input);
        }
        for a in &mut self.allpasses {
            out = a.process(out);
        }
        out
    }

    fn clear(&mut self) {
        for c in &mut self.combs {
            c.clear();
        }
        for a in &mut self.allpasses {
            a.clear();
        }
        for a in &mut self.allpasses {
            a.set_feedback(FIXED_ALLPASS_FEEDBACK);
        }
    }
}

/// Algorithmic stereo reverb. `room_size`, `damping`, `wet_level`, `dry_level`,
/// `width` are all `[0, 1]`.
pub struct Reverb {
    room_size: f32,
    damping: f32,
    wet_level: f32,
    dry_level: f32,
    width: f32,
    left: Channel,
    right: Channel,
}

impl Reverb {
    pub fn new(sample_rate: f32) -> Self {
        let mut left = Channel::new(sample_rate, 0);
        let mut right = Channel::new(sample_rate, STEREO_SPREAD);
        for a in &mut left.allpasses {
            a.set_feedback(FIXED_ALLPASS_FEEDBACK);
        }
        for a in &mut right.allpasses {
            a.set_feedback(FIXED_ALLPASS_FEEDBACK);
        }
        let mut s = Self {
            room_size: 0.5,
            damping: 0.5,
            wet_level: 0.33,
            dry_level: 1.0,
            width: 1.0,
            left,
            right,
        };
        s.update_room();
        s
    }

    fn update_room(&mut self) {
        let feedback = self.room_size * SCALE_ROOM + OFFSET_ROOM;
        let damp = self.damping * SCALE_DAMP;
        self.left.set_room_params(feedback, damp);
        self.right.set_room_params(feedback, damp);
    }
}

impl ParameterInfo for Reverb {
    fn param_count(&self) -> usize {
        5
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        let unit_fraction = |name: &'static str, short: &'static str, default: f32, id: u16| {
            ParamDescriptor {
                name,
                short_name: short,
                unit: ParamUnit::Percent,
                min: 0.0,
                max: 100.0,
                default: default * 100.0,
                step: 1.0,
                id: ParamId(id),
                string_id: "",
                scale: synthcore_core::ParamScale::Linear,
                flags: synthcore_core::ParamFlags::AUTOMATABLE,
                group: "reverb",
                modulation_id: None,
            }
        };
        match index {
            0 => Some(unit_fraction("Room Size", "Size", 0.5, 1200)),
            1 => Some(unit_fraction("Damping", "Damp", 0.5, 1201)),
            2 => Some(unit_fraction("Wet Level", "Wet", 0.33, 1202)),
            3 => Some(unit_fraction("Dry Level", "Dry", 1.0, 1203)),
            4 => Some(unit_fraction("Width", "Width", 1.0, 1204)),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.room_size * 100.0,
            1 => self.damping * 100.0,
            2 => self.wet_level * 100.0,
            3 => self.dry_level * 100.0,
            4 => self.width * 100.0,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        let v = (value / 100.0).clamp(0.0, 1.0);
        match index {
            0 => {
                self.room_size = v;
                self.update_room();
            }
            1 => {
                self.damping = v;
                self.update_room();
            }
            2 => self.wet_level = v,
            3 => self.dry_level = v,
            4 => self.width = v,
            _ => {}
        }
    }
}

impl EffectModel for Reverb {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        let wet1 = self.wet_level * (self.width * 0.5 + 0.5);
        let wet2 = self.wet_level * ((1.0 - self.width) * 0.5);

        for i in 0..frames {
            let in_l = buffer[i * 2];
            let in_r = buffer[i * 2 + 1];
            let mono_in = (in_l + in_r) * 0.5;

            let wet_l = self.left.process(mono_in);
            let wet_r = self.right.process(mono_in);

            buffer[i * 2] = in_l * self.dry_level + wet_l * wet1 + wet_r * wet2;
            buffer[i * 2 + 1] = in_r * self.dry_level + wet_r * wet1 + wet_l * wet2;
        }
    }

    fn set_parameter(&mut self, name: &str, value: f32) {
        synthcore_core::set_named_parameter(self, name, value);
    }

    fn get_parameter(&self, name: &str) -> Option<f32> {
        synthcore_core::get_named_parameter(self, name)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.left = Channel::new(sample_rate, 0);
        self.right = Channel::new(sample_rate, STEREO_SPREAD);
        for a in &mut self.left.allpasses {
            a.set_feedback(FIXED_ALLPASS_FEEDBACK);
        }
        for a in &mut self.right.allpasses {
            a.set_feedback(FIXED_ALLPASS_FEEDBACK);
        }
        self.update_room();
    }

    fn name(&self) -> &str {
        "Reverb"
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}
