//! Stereo delay with feedback.
//!
//! Each channel runs its own [`InterpolatedDelay`](synthcore_core::InterpolatedDelay)
//! so the two sides can diverge slightly under modulation, though this effect
//! keeps them locked to the same time for a conventional echo.

use synthcore_core::{
    EffectModel, InterpolatedDelay, ParamDescriptor, ParamId, ParameterInfo, SmoothParameter,
    flush_denormal, wet_dry_mix_stereo,
};

/// Feedback delay line. `delay_time` [0.02, 2.0] s, `feedback` [0, 0.95],
/// `mix` [0, 1].
pub struct Delay {
    delay_time: SmoothParameter,
    feedback: f32,
    mix: SmoothParameter,
    sample_rate: f32,
    line_l: InterpolatedDelay,
    line_r: InterpolatedDelay,
}

const MAX_DELAY_SECONDS: f32 = 2.0;

impl Delay {
    pub fn new(sample_rate: f32) -> Self {
        let capacity = (MAX_DELAY_SECONDS * sample_rate) as usize + 8;
        Self {
            delay_time: SmoothParameter::new(0.3),
            feedback: 0.3,
            mix: SmoothParameter::new(0.5),
            sample_rate,
            line_l: InterpolatedDelay::new(capacity),
            line_r: InterpolatedDelay::new(capacity),
        }
    }
}

impl ParameterInfo for Delay {
    fn param_count(&self) -> usize {
        3
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::time_ms("Delay Time", "Time", 20.0, 2000.0, 300.0)
                    .with_id(ParamId(1100), "delay_time"),
            ),
            1 => Some(ParamDescriptor::feedback().with_id(ParamId(1101), "delay_fdbk")),
            2 => Some(ParamDescriptor::mix().with_id(ParamId(1102), "delay_mix")),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.delay_time.target() * 1000.0,
            1 => self.feedback * 100.0,
            2 => self.mix.target() * 100.0,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self
                .delay_time
                .set_target((value / 1000.0).clamp(0.02, MAX_DELAY_SECONDS)),
            1 => self.feedback = (value / 100.0).clamp(0.0, 0.95),
            2 => self.mix.set_target((value / 100.0).clamp(0.0, 1.0)),
            _ => {}
        }
    }
}

impl EffectModel for Delay {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];

            let delay_samples = self.delay_time.process() * self.sample_rate;
            let wet_l = self.line_l.read(delay_samples);
            let wet_r = self.line_r.read(delay_samples);

            self.line_l
                .write(flush_denormal(dry_l + wet_l * self.feedback));
            self.line_r
                .write(flush_denormal(dry_r + wet_r * self.feedback));

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
    }

    fn name(&self) -> &str {
        "Delay"
    }

    fn reset(&mut self) {
        self.line_l.clear();
        self.line_r.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_zero_is_bypass() {
        let mut d = Delay::new(48_000.0);
        d.set_parameter("mix", 0.0);
        let mut buf = [0.3, -0.2, 0.5, 0.5, -0.7, 0.1];
        let original = buf;
        d.process(&mut buf, 3);
        assert_eq!(buf, original);
    }

    #[test]
    fn produces_delayed_echo() {
        let sr = 48_000.0;
        let mut d = Delay::new(sr);
        d.set_parameter("mix", 100.0);
        d.set_parameter("delay_time", 10.0);
        d.set_parameter("feedback", 0.0);

        let n = (sr * 0.02) as usize + 10;
        let mut buf = vec![0.0f32; n * 2];
        buf[0] = 1.0;
        buf[1] = 1.0;
        d.process(&mut buf, n);

        let delay_samples = (sr * 0.01) as usize;
        assert!(buf[delay_samples * 2].abs() > 0.1);
    }
}
