//! Vowel formant filter: a bank of three swept bandpass resonators whose
//! center frequencies interpolate between five vowel formant tables.
//!
//! Not grounded in a specific teacher file — no formant filter exists
//! anywhere in the corpus — so this builds directly on the bandpass biquad
//! coefficients in `synthcore_core::biquad`, the closest available primitive.

use synthcore_core::{Biquad, EffectModel, ParamDescriptor, ParamId, ParamUnit, ParameterInfo, bandpass_coefficients, wet_dry_mix_stereo};

const NUM_FORMANTS: usize = 3;
const NUM_VOWELS: usize = 5;

/// (F1, F2, F3) in Hz and relative amplitudes for A, E, I, O, U.
const VOWEL_FREQS: [[f32; NUM_FORMANTS]; NUM_VOWELS] = [
    [800.0, 1150.0, 2900.0],
    [400.0, 1700.0, 2600.0],
    [250.0, 2400.0, 3100.0],
    [400.0, 750.0, 2400.0],
    [350.0, 600.0, 2700.0],
];
const VOWEL_AMPS: [[f32; NUM_FORMANTS]; NUM_VOWELS] = [
    [1.0, 0.55, 0.25],
    [1.0, 0.6, 0.2],
    [1.0, 0.35, 0.15],
    [1.0, 0.5, 0.2],
    [1.0, 0.4, 0.15],
];

struct FormantChannel {
    filters: [Biquad; NUM_FORMANTS],
}

impl FormantChannel {
    fn new() -> Self {
        Self {
            filters: [Biquad::new(), Biquad::new(), Biquad::new()],
        }
    }

    fn set_coefficients(&mut self, freqs: [f32; NUM_FORMANTS], q: f32, sample_rate: f32) {
        for (filter, freq) in self.filters.iter_mut().zip(freqs.iter()) {
            let (b0, b1, b2, a0, a1, a2) = bandpass_coefficients(*freq, q, sample_rate);
            filter.set_coefficients(b0, b1, b2, a0, a1, a2);
        }
    }

    fn process(&mut self, input: f32, amps: [f32; NUM_FORMANTS]) -> f32 {
        let mut out = 0.0;
        for (filter, amp) in self.filters.iter_mut().zip(amps.iter()) {
            out += filter.process(input) * amp;
        }
        out
    }

    fn clear(&mut self) {
        for f in &mut self.filters {
            f.clear();
        }
    }
}

/// `vowel` morph position `[0, 4]` over A-E-I-O-U, `gender` `[0, 1]` (0 =
/// bass/male shift, 1 = soprano/female shift), `resonance` (Q) `[0.5, 20]`,
/// `mix` `[0, 1]`.
pub struct Formant {
    vowel: f32,
    gender: f32,
    resonance: f32,
    mix: f32,
    sample_rate: f32,
    left: FormantChannel,
    right: FormantChannel,
}

impl Formant {
    pub fn new(sample_rate: f32) -> Self {
        let mut s = Self {
            vowel: 0.0,
            gender: 0.5,
            resonance: 8.0,
            mix: 1.0,
            sample_rate,
            left: FormantChannel::new(),
            right: FormantChannel::new(),
        };
        s.update_coefficients();
        s
    }

    fn interpolated_formants(&self) -> ([f32; NUM_FORMANTS], [f32; NUM_FORMANTS]) {
        let clamped = self.vowel.clamp(0.0, (NUM_VOWELS - 1) as f32);
        let lower = clamped.floor() as usize;
        let upper = (lower + 1).min(NUM_VOWELS - 1);
        let t = clamped - lower as f32;

        let gender_scale = 0.85 + self.gender * 0.3;

        let mut freqs = [0.0; NUM_FORMANTS];
        let mut amps = [0.0; NUM_FORMANTS];
        for k in 0..NUM_FORMANTS {
            let f = VOWEL_FREQS[lower][k] + (VOWEL_FREQS[upper][k] - VOWEL_FREQS[lower][k]) * t;
            freqs[k] = f * gender_scale;
            amps[k] = VOWEL_AMPS[lower][k] + (VOWEL_AMPS[upper][k] - VOWEL_AMPS[lower][k]) * t;
        }
        (freqs, amps)
    }

    fn update_coefficients(&mut self) {
        let (freqs, _) = self.interpolated_formants();
        self.left.set_coefficients(freqs, self.resonance, self.sample_rate);
        self.right.set_coefficients(freqs, self.resonance, self.sample_rate);
    }
}

impl ParameterInfo for Formant {
    fn param_count(&self) -> usize {
        4
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor {
                    name: "Vowel",
                    short_name: "Vowel",
                    unit: ParamUnit::None,
                    min: 0.0,
                    max: (NUM_VOWELS - 1) as f32,
                    default: 0.0,
                    step: 0.01,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(2200), "form_vowel"),
            ),
            1 => Some(
                ParamDescriptor {
                    name: "Gender",
                    short_name: "Gender",
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
                .with_id(ParamId(2201), "form_gender"),
            ),
            2 => Some(
                ParamDescriptor {
                    name: "Resonance",
                    short_name: "Res",
                    unit: ParamUnit::None,
                    min: 0.5,
                    max: 20.0,
                    default: 8.0,
                    step: 0.1,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(2202), "form_res"),
            ),
            3 => Some(ParamDescriptor::mix().with_id(ParamId(2203), "form_mix")),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.vowel,
            1 => self.gender * 100.0,
            2 => self.resonance,
            3 => self.mix * 100.0,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => {
                self.vowel = value.clamp(0.0, (NUM_VOWELS - 1) as f32);
                self.update_coefficients();
            }
            1 => {
                self.gender = (value / 100.0).clamp(0.0, 1.0);
                self.update_coefficients();
            }
            2 => {
                self.resonance = value.clamp(0.5, 20.0);
                self.update_coefficients();
            }
            3 => self.mix = (value / 100.0).clamp(0.0, 1.0),
            _ => {}
        }
    }
}

impl EffectModel for Formant {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        let (_, amps) = self.interpolated_formants();
        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];

            let wet_l = self.left.process(dry_l, amps);
            let wet_r = self.right.process(dry_r, amps);

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

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    fn name(&self) -> &str {
        "Formant Filter"
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_zero_is_bypass() {
        let mut f = Formant::new(48_000.0);
        f.set_parameter("mix", 0.0);
        let mut buf = [0.3, -0.2, 0.5, 0.5, -0.7, 0.1];
        let original = buf;
        f.process(&mut buf, 3);
        assert_eq!(buf, original);
    }

    #[test]
    fn vowel_morph_changes_output() {
        let sr = 48_000.0;
        let mut a_vowel = Formant::new(sr);
        a_vowel.set_parameter("vowel", 0.0);
        a_vowel.set_parameter("mix", 100.0);

        let mut i_vowel = Formant::new(sr);
        i_vowel.set_parameter("vowel", 2.0);
        i_vowel.set_parameter("mix", 100.0);

        let mut buf_a = vec![0.0f32; 2 * 1024];
        let mut buf_i = vec![0.0f32; 2 * 1024];
        for k in 0..1024 {
            let t = k as f32 / sr;
            let s = libm::sinf(2.0 * core::f32::consts::PI * 150.0 * t) * 0.5;
            buf_a[k * 2] = s;
            buf_a[k * 2 + 1] = s;
            buf_i[k * 2] = s;
            buf_i[k * 2 + 1] = s;
        }
        a_vowel.process(&mut buf_a, 1024);
        i_vowel.process(&mut buf_i, 1024);

        let differs = buf_a.iter().zip(buf_i.iter()).any(|(a, b)| (a - b).abs() > 1e-4);
        assert!(differs);
    }
}
