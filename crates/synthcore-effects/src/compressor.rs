//! Feed-forward peak compressor with a soft knee.
//!
//! The envelope follower tracks `max(|L|, |R|)` in dB, shared by both
//! channels so stereo image doesn't shift under gain reduction. Attack and
//! release use the standard one-pole exponential time constant
//! `exp(-1/(tau * sample_rate))`.

use synthcore_core::{
    EffectModel, ParamDescriptor, ParamId, ParamUnit, ParameterInfo, SmoothParameter, db_to_linear,
    linear_to_db, wet_dry_mix_stereo,
};

const MIN_DB_FLOOR: f32 = -120.0;

/// `threshold` dB `[-60, 0]`, `ratio` `[1, 20]`, `attack` seconds
/// `[0.0001, 0.5]`, `release` seconds `[0.001, 2.0]`, `makeup` dB `[0, 24]`,
/// `knee` dB `[0, 24]`, `mix` `[0, 1]`.
pub struct Compressor {
    threshold_db: f32,
    ratio: f32,
    attack_s: f32,
    release_s: f32,
    makeup_db: f32,
    knee_db: f32,
    mix: SmoothParameter,
    sample_rate: f32,
    attack_coeff: f32,
    release_coeff: f32,
    envelope_db: f32,
}

impl Compressor {
    pub fn new(sample_rate: f32) -> Self {
        let mut s = Self {
            threshold_db: -18.0,
            ratio: 4.0,
            attack_s: 0.01,
            release_s: 0.1,
            makeup_db: 0.0,
            knee_db: 6.0,
            mix: SmoothParameter::new(1.0),
            sample_rate,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope_db: MIN_DB_FLOOR,
        };
        s.update_coeffs();
        s
    }

    fn update_coeffs(&mut self) {
        self.attack_coeff = libm::expf(-1.0 / (self.attack_s * self.sample_rate));
        self.release_coeff = libm::expf(-1.0 / (self.release_s * self.sample_rate));
    }

    /// Gain reduction in dB (positive = attenuation) for an envelope level,
    /// following a quadratic soft-knee around `threshold_db`.
    fn reduction_db(&self, env_db: f32) -> f32 {
        let half_knee = self.knee_db * 0.5;
        let below = self.threshold_db - half_knee;
        let above = self.threshold_db + half_knee;

        if env_db < below {
            0.0
        } else if env_db > above {
            (env_db - self.threshold_db) * (1.0 - 1.0 / self.ratio)
        } else {
            let delta = env_db - below;
            ((1.0 / self.ratio - 1.0) * delta * delta) / (2.0 * self.knee_db.max(1e-6))
        }
    }
}

impl ParameterInfo for Compressor {
    fn param_count(&self) -> usize {
        7
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::gain_db("Threshold", "Thresh", -60.0, 0.0, -18.0)
                    .with_id(ParamId(1500), "comp_thresh"),
            ),
            1 => Some(
                ParamDescriptor {
                    name: "Ratio",
                    short_name: "Ratio",
                    unit: ParamUnit::Ratio,
                    min: 1.0,
                    max: 20.0,
                    default: 4.0,
                    step: 0.1,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1501), "comp_ratio"),
            ),
            2 => Some(
                ParamDescriptor::time_ms("Attack", "Atk", 0.1, 500.0, 10.0)
                    .with_id(ParamId(1502), "comp_attack"),
            ),
            3 => Some(
                ParamDescriptor::time_ms("Release", "Rel", 1.0, 2000.0, 100.0)
                    .with_id(ParamId(1503), "comp_release"),
            ),
            4 => Some(
                ParamDescriptor::gain_db("Makeup", "Makeup", 0.0, 24.0, 0.0)
                    .with_id(ParamId(1504), "comp_makeup"),
            ),
            5 => Some(
                ParamDescriptor::gain_db("Knee", "Knee", 0.0, 24.0, 6.0)
                    .with_id(ParamId(1505), "comp_knee"),
            ),
            6 => Some(ParamDescriptor::mix().with_id(ParamId(1506), "comp_mix")),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.threshold_db,
            1 => self.ratio,
            2 => self.attack_s * 1000.0,
            3 => self.release_s * 1000.0,
            4 => self.makeup_db,
            5 => self.knee_db,
            6 => self.mix.target() * 100.0,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.threshold_db = value.clamp(-60.0, 0.0),
            1 => self.ratio = value.clamp(1.0, 20.0),
            2 => {
                self.attack_s = (value / 1000.0).clamp(0.0001, 0.5);
                self.update_coeffs();
            }
            3 => {
                self.release_s = (value / 1000.0).clamp(0.001, 2.0);
                self.update_coeffs();
            }
            4 => self.makeup_db = value.clamp(0.0, 24.0),
            5 => self.knee_db = value.clamp(0.0, 24.0),
            6 => self.mix.set_target((value / 100.0).clamp(0.0, 1.0)),
            _ => {}
        }
    }
}

impl EffectModel for Compressor {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];
            let peak = dry_l.abs().max(dry_r.abs());
            let peak_db = linear_to_db(peak.max(1e-8)).max(MIN_DB_FLOOR);

            let coeff = if peak_db > self.envelope_db {
                self.attack_coeff
            } else {
                self.release_coeff
            };
            self.envelope_db = coeff * self.envelope_db + (1.0 - coeff) * peak_db;

            let reduction = self.reduction_db(self.envelope_db);
            let gain = db_to_linear(self.makeup_db - reduction);

            let wet_l = dry_l * gain;
            let wet_r = dry_r * gain;
            let m = self.mix.process();
            let (l, r) = wet_dry_mix_stereo(dry_l, dry_r, wet_l, wet_r, m);
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
        self.update_coeffs();
    }

    fn name(&self) -> &str {
        "Compressor"
    }

    fn reset(&mut self) {
        self.envelope_db = MIN_DB_FLOOR;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_zero_is_bypass() {
        let mut c = Compressor::new(48_000.0);
        c.set_parameter("threshold", -20.0);
        c.set_parameter("ratio", 8.0);
        c.mix.set_immediate(0.0);
        let mut buf = [0.8, 0.8, 0.8, 0.8, 0.8, 0.8];
        let original = buf;
        c.process(&mut buf, 3);
        assert_eq!(buf, original);
    }

    #[test]
    fn below_threshold_is_near_unity_gain() {
        let mut c = Compressor::new(48_000.0);
        c.set_parameter("threshold", -6.0);
        c.set_parameter("knee", 0.0);
        let mut buf = vec![0.01f32; 2 * 4096];
        c.process(&mut buf, 4096);
        assert!((buf[8000] / 0.01 - 1.0).abs() < 0.05);
    }

    #[test]
    fn above_threshold_reduces_gain() {
        let mut c = Compressor::new(48_000.0);
        c.set_parameter("threshold", -20.0);
        c.set_parameter("ratio", 8.0);
        c.set_parameter("attack", 1.0);
        c.set_parameter("knee", 0.0);

        let mut buf = vec![0.0f32; 2 * 4096];
        for i in 0..4096 {
            buf[i * 2] = 0.8;
            buf[i * 2 + 1] = 0.8;
        }
        c.process(&mut buf, 4096);
        assert!(buf[8000].abs() < 0.8);
    }

    #[test]
    fn reset_clears_envelope() {
        let mut c = Compressor::new(48_000.0);
        let mut buf = vec![0.9f32; 2 * 1000];
        c.process(&mut buf, 1000);
        assert!(c.envelope_db > MIN_DB_FLOOR);
        c.reset();
        assert_eq!(c.envelope_db, MIN_DB_FLOOR);
    }
}
