//! Three-band equalizer: shelving low, peaking mid, shelving high.

use synthcore_core::{
    Biquad, EffectModel, ParamDescriptor, ParamId, ParameterInfo, SmoothParameter,
    peaking_eq_coefficients, wet_dry_mix_stereo,
};

const LOW_SHELF_Q: f32 = 0.707;
const MID_Q: f32 = 1.0;
const HIGH_SHELF_Q: f32 = 0.707;

/// Low/mid/high gain in dB `[-24, 24]`, `low_freq` Hz `[20, 2000]`,
/// `high_freq` Hz `[2000, 20000]`, `mix` `[0, 1]`. The mid band is fixed at
/// the geometric mean of `low_freq` and `high_freq`.
pub struct ThreeBandEq {
    low_gain_db: f32,
    mid_gain_db: f32,
    high_gain_db: f32,
    low_freq: f32,
    high_freq: f32,
    mix: SmoothParameter,
    sample_rate: f32,
    low_l: Biquad,
    low_r: Biquad,
    mid_l: Biquad,
    mid_r: Biquad,
    high_l: Biquad,
    high_r: Biquad,
}

/// Shelf-filter coefficients using the RBJ low/high shelf cookbook formulas,
/// matched in style to [`synthcore_core::biquad`]'s peaking/notch helpers.
fn low_shelf_coefficients(freq: f32, gain_db: f32, sr: f32) -> (f32, f32, f32, f32, f32, f32) {
    use core::f32::consts::PI;
    use libm::{cosf, powf, sinf, sqrtf};

    let a = powf(10.0, gain_db / 40.0);
    let omega = 2.0 * PI * freq / sr;
    let cos_w = cosf(omega);
    let sin_w = sinf(omega);
    let alpha = sin_w / 2.0 * sqrtf((a + 1.0 / a) * (1.0 / LOW_SHELF_Q - 1.0) + 2.0);
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;

    let b0 = a * ((a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha);
    let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w);
    let b2 = a * ((a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha);
    let a0 = (a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha;
    let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_w);
    let a2 = (a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha;

    (b0, b1, b2, a0, a1, a2)
}

fn high_shelf_coefficients(freq: f32, gain_db: f32, sr: f32) -> (f32, f32, f32, f32, f32, f32) {
    use core::f32::consts::PI;
    use libm::{cosf, powf, sinf, sqrtf};

    let a = powf(10.0, gain_db / 40.0);
    let omega = 2.0 * PI * freq / sr;
    let cos_w = cosf(omega);
    let sin_w = sinf(omega);
    let alpha = sin_w / 2.0 * sqrtf((a + 1.0 / a) * (1.0 / HIGH_SHELF_Q - 1.0) + 2.0);
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;

    let b0 = a * ((a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha);
    let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w);
    let b2 = a * ((a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha);
    let a0 = (a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha;
    let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_w);
    let a2 = (a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha;

    (b0, b1, b2, a0, a1, a2)
}

impl ThreeBandEq {
    pub fn new(sample_rate: f32) -> Self {
        let mut s = Self {
            low_gain_db: 0.0,
            mid_gain_db: 0.0,
            high_gain_db: 0.0,
            low_freq: 200.0,
            high_freq: 4000.0,
            mix: SmoothParameter::new(1.0),
            sample_rate,
            low_l: Biquad::new(),
            low_r: Biquad::new(),
            mid_l: Biquad::new(),
            mid_r: Biquad::new(),
            high_l: Biquad::new(),
            high_r: Biquad::new(),
        };
        s.update_coefficients();
        s
    }

    fn mid_freq(&self) -> f32 {
        libm::sqrtf(self.low_freq * self.high_freq)
    }

    fn update_coefficients(&mut self) {
        let (b0, b1, b2, a0, a1, a2) =
            low_shelf_coefficients(self.low_freq, self.low_gain_db, self.sample_rate);
        self.low_l.set_coefficients(b0, b1, b2, a0, a1, a2);
        self.low_r.set_coefficients(b0, b1, b2, a0, a1, a2);

        let (b0, b1, b2, a0, a1, a2) =
            peaking_eq_coefficients(self.mid_freq(), MID_Q, self.mid_gain_db, self.sample_rate);
        self.mid_l.set_coefficients(b0, b1, b2, a0, a1, a2);
        self.mid_r.set_coefficients(b0, b1, b2, a0, a1, a2);

        let (b0, b1, b2, a0, a1, a2) =
            high_shelf_coefficients(self.high_freq, self.high_gain_db, self.sample_rate);
        self.high_l.set_coefficients(b0, b1, b2, a0, a1, a2);
        self.high_r.set_coefficients(b0, b1, b2, a0, a1, a2);
    }
}

impl ParameterInfo for ThreeBandEq {
    fn param_count(&self) -> usize {
        6
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::gain_db("Low Gain", "Low", -24.0, 24.0, 0.0)
                    .with_id(ParamId(2100), "eq_low_gain"),
            ),
            1 => Some(
                ParamDescriptor::gain_db("Mid Gain", "Mid", -24.0, 24.0, 0.0)
                    .with_id(ParamId(2101), "eq_mid_gain"),
            ),
            2 => Some(
                ParamDescriptor::gain_db("High Gain", "High", -24.0, 24.0, 0.0)
                    .with_id(ParamId(2102), "eq_high_gain"),
            ),
            3 => Some(
                ParamDescriptor::rate_hz(20.0, 2000.0, 200.0).with_id(ParamId(2103), "eq_low_freq"),
            ),
            4 => Some(
                ParamDescriptor::rate_hz(2000.0, 20_000.0, 4000.0)
                    .with_id(ParamId(2104), "eq_high_freq"),
            ),
            5 => Some(ParamDescriptor::mix().with_id(ParamId(2105), "eq_mix")),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.low_gain_db,
            1 => self.mid_gain_db,
            2 => self.high_gain_db,
            3 => self.low_freq,
            4 => self.high_freq,
            5 => self.mix.target() * 100.0,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.low_gain_db = value.clamp(-24.0, 24.0),
            1 => self.mid_gain_db = value.clamp(-24.0, 24.0),
            2 => self.high_gain_db = value.clamp(-24.0, 24.0),
            3 => self.low_freq = value.clamp(20.0, 2000.0),
            4 => self.high_freq = value.clamp(2000.0, 20_000.0),
            5 => {
                self.mix.set_target((value / 100.0).clamp(0.0, 1.0));
                return;
            }
            _ => return,
        }
        self.update_coefficients();
    }
}

impl EffectModel for ThreeBandEq {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];

            let mut l = dry_l;
            let mut r = dry_r;
            l = self.low_l.process(l);
            r = self.low_r.process(r);
            l = self.mid_l.process(l);
            r = self.mid_r.process(r);
            l = self.high_l.process(l);
            r = self.high_r.process(r);

            let m = self.mix.process();
            let (l, r) = wet_dry_mix_stereo(dry_l, dry_r, l, r, m);
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
        "3-Band EQ"
    }

    fn reset(&mut self) {
        self.low_l.clear();
        self.low_r.clear();
        self.mid_l.clear();
        self.mid_r.clear();
        self.high_l.clear();
        self.high_r.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_zero_is_bypass() {
        let mut eq = ThreeBandEq::new(48_000.0);
        eq.set_parameter("low_gain", 12.0);
        eq.set_parameter("high_gain", -12.0);
        eq.mix.set_immediate(0.0);
        let mut buf = [0.3, -0.2, 0.5, 0.5, -0.7, 0.1];
        let original = buf;
        eq.process(&mut buf, 3);
        assert_eq!(buf, original);
    }

    #[test]
    fn flat_gains_are_near_bypass() {
        let mut eq = ThreeBandEq::new(48_000.0);
        let sr = 48_000.0;
        let mut buf = vec![0.0f32; 2 * 1024];
        for i in 0..1024 {
            let t = i as f32 / sr;
            let s = libm::sinf(2.0 * core::f32::consts::PI * 1000.0 * t);
            buf[i * 2] = s;
            buf[i * 2 + 1] = s;
        }
        let original = buf.clone();
        eq.process(&mut buf, 1024);
        for (a, b) in buf.iter().zip(original.iter()).skip(100) {
            assert!((a - b).abs() < 0.05);
        }
    }

    #[test]
    fn low_boost_raises_bass_energy() {
        let sr = 48_000.0;
        let mut flat = ThreeBandEq::new(sr);
        let mut boosted = ThreeBandEq::new(sr);
        boosted.set_parameter("low_gain", 12.0);

        let mut buf_flat = vec![0.0f32; 2 * 2048];
        let mut buf_boost = vec![0.0f32; 2 * 2048];
        for i in 0..2048 {
            let t = i as f32 / sr;
            let s = libm::sinf(2.0 * core::f32::consts::PI * 100.0 * t);
            buf_flat[i * 2] = s;
            buf_flat[i * 2 + 1] = s;
            buf_boost[i * 2] = s;
            buf_boost[i * 2 + 1] = s;
        }
        flat.process(&mut buf_flat, 2048);
        boosted.process(&mut buf_boost, 2048);

        let energy = |b: &[f32]| -> f32 { b.iter().skip(1000).map(|x| x * x).sum() };
        assert!(energy(&buf_boost) > energy(&buf_flat));
    }
}
