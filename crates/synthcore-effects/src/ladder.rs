//! Moog-style ladder filter (cascaded one-pole stages with global feedback).
//!
//! The per-stage coefficient `g` uses a quartic polynomial fit to the ladder's
//! nonlinear tuning curve rather than a closed-form bilinear transform, which
//! is the standard way this topology is stabilized in software emulations.

use synthcore_core::{EffectModel, ParamDescriptor, ParamId, ParamUnit, ParameterInfo};

const MAX_POLES: usize = 4;

/// Low-pass or high-pass ladder response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LadderMode {
    #[default]
    LowPass,
    HighPass,
}

#[derive(Clone)]
struct LadderChannel {
    state: [f32; MAX_POLES],
    prev_input: f32,
}

impl LadderChannel {
    fn new() -> Self {
        Self {
            state: [0.0; MAX_POLES],
            prev_input: 0.0,
        }
    }

    fn clear(&mut self) {
        self.state = [0.0; MAX_POLES];
        self.prev_input = 0.0;
    }
}

/// Runs one sample through a ladder channel's cascade. A free function
/// (rather than a method) so the caller can hold `&self` for the filter's
/// shared coefficients and `&mut` for the per-channel state simultaneously.
fn run_stage(
    channel: &mut LadderChannel,
    input: f32,
    drive: f32,
    resonance: f32,
    poles: usize,
    g: f32,
    mode: LadderMode,
) -> f32 {
    let driven = libm::tanhf(input * drive) / drive.max(1.0).sqrt();
    let feedback_tap = channel.state[poles - 1];
    let x = driven - resonance * (1.0 - 0.15 * g) * feedback_tap;

    let mut y_prev = x;
    for k in 0..poles {
        let yk = g * y_prev + (1.0 - g) * channel.state[k];
        channel.state[k] = yk;
        y_prev = yk;
    }

    let lowpass = channel.state[poles - 1];
    let delayed_input = channel.prev_input;
    channel.prev_input = driven;

    match mode {
        LadderMode::LowPass => lowpass,
        LadderMode::HighPass => delayed_input - lowpass,
    }
}

/// Cascaded one-pole ladder filter, 1-4 poles, with resonance feedback and
/// input drive. `frequency` [20, 20000] Hz, `resonance` [0, 1], `drive`
/// [0.5, 10], `poles` {1, 2, 3, 4}, `mix` [0, 1].
pub struct Ladder {
    mode: LadderMode,
    frequency: f32,
    resonance: f32,
    drive: f32,
    poles: usize,
    mix: f32,
    sample_rate: f32,
    left: LadderChannel,
    right: LadderChannel,
    g: f32,
}

impl Ladder {
    pub fn new(sample_rate: f32) -> Self {
        let mut s = Self {
            mode: LadderMode::LowPass,
            frequency: 1000.0,
            resonance: 0.3,
            drive: 1.0,
            poles: 4,
            mix: 1.0,
            sample_rate,
            left: LadderChannel::new(),
            right: LadderChannel::new(),
            g: 0.0,
        };
        s.update_g();
        s
    }

    fn update_g(&mut self) {
        let c = 2.0 * self.frequency / self.sample_rate;
        let c2 = c * c;
        let c3 = c2 * c;
        let c4 = c3 * c;
        self.g = 0.9892 * c - 0.4342 * c2 + 0.1381 * c3 - 0.0202 * c4;
    }

    pub fn set_mode(&mut self, mode: LadderMode) {
        self.mode = mode;
    }
}

impl ParameterInfo for Ladder {
    fn param_count(&self) -> usize {
        5
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::rate_hz(20.0, 20_000.0, 1000.0)
                    .with_id(ParamId(1400), "ladder_freq"),
            ),
            1 => Some(
                ParamDescriptor {
                    name: "Resonance",
                    short_name: "Res",
                    unit: ParamUnit::Percent,
                    min: 0.0,
                    max: 100.0,
                    default: 30.0,
                    step: 1.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1401), "ladder_res"),
            ),
            2 => Some(
                ParamDescriptor {
                    name: "Drive",
                    short_name: "Drive",
                    unit: ParamUnit::None,
                    min: 0.5,
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
                .with_id(ParamId(1402), "ladder_drive"),
            ),
            3 => Some(
                ParamDescriptor {
                    name: "Poles",
                    short_name: "Poles",
                    unit: ParamUnit::None,
                    min: 1.0,
                    max: 4.0,
                    default: 4.0,
                    step: 1.0,
                    id: ParamId(0),
                    string_id: "",
                    scale: synthcore_core::ParamScale::Linear,
                    flags: synthcore_core::ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1403), "ladder_poles"),
            ),
            4 => Some(ParamDescriptor::mix().with_id(ParamId(1404), "ladder_mix")),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.frequency,
            1 => self.resonance * 100.0,
            2 => self.drive,
            3 => self.poles as f32,
            4 => self.mix * 100.0,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => {
                self.frequency = value.clamp(20.0, 20_000.0);
                self.update_g();
            }
            1 => self.resonance = (value / 100.0).clamp(0.0, 1.0),
            2 => self.drive = value.clamp(0.5, 10.0),
            3 => self.poles = (value.round() as usize).clamp(1, MAX_POLES),
            4 => self.mix = (value / 100.0).clamp(0.0, 1.0),
            _ => {}
        }
    }
}

impl EffectModel for Ladder {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];

            let wet_l = run_stage(
                &mut self.left,
                dry_l,
                self.drive,
                self.resonance,
                self.poles,
                self.g,
                self.mode,
            );
            let wet_r = run_stage(
                &mut self.right,
                dry_r,
                self.drive,
                self.resonance,
                self.poles,
                self.g,
                self.mode,
            );

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
        self.update_g();
    }

    fn name(&self) -> &str {
        "Ladder Filter"
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
        let mut f = Ladder::new(48_000.0);
        f.set_parameter("mix", 0.0);
        let mut buf = [0.3, -0.2, 0.5, 0.5, -0.7, 0.1];
        let original = buf;
        f.process(&mut buf, 3);
        assert_eq!(buf, original);
    }

    #[test]
    fn lowpass_attenuates_high_frequency() {
        let sr = 48_000.0;
        let mut f = Ladder::new(sr);
        f.set_parameter("frequency", 200.0);
        f.set_parameter("resonance", 0.0);
        f.set_parameter("mix", 100.0);

        let mut buf = vec![0.0f32; 2 * 512];
        for i in 0..512 {
            let t = i as f32 / sr;
            let s = libm::sinf(2.0 * core::f32::consts::PI * 8000.0 * t);
            buf[i * 2] = s;
            buf[i * 2 + 1] = s;
        }
        let input_rms: f32 = (buf.iter().map(|x| x * x).sum::<f32>() / buf.len() as f32).sqrt();
        f.process(&mut buf, 512);
        let output_rms: f32 = (buf.iter().map(|x| x * x).sum::<f32>() / buf.len() as f32).sqrt();
        assert!(output_rms < input_rms * 0.5);
    }

    #[test]
    fn poles_clamped_to_valid_range() {
        let mut f = Ladder::new(48_000.0);
        f.set_parameter("poles", 9.0);
        assert_eq!(f.get_parameter("Poles").unwrap(), 4.0);
        f.set_parameter("poles", 0.0);
        assert_eq!(f.get_parameter("Poles").unwrap(), 1.0);
    }
}
