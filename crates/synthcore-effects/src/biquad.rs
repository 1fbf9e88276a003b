//! Biquad filter effect (low-pass, high-pass, band-pass, notch).
//!
//! Wraps two [`Biquad`](synthcore_core::Biquad) instances (one per channel)
//! sharing coefficients derived from the RBJ cookbook formulas in
//! `synthcore_core::biquad`.

use synthcore_core::{
    Biquad as BiquadCore, EffectModel, ParamDescriptor, ParamFlags, ParamId, ParamScale, ParamUnit,
    ParameterInfo, SmoothParameter, bandpass_coefficients, get_named_parameter,
    highpass_coefficients, lowpass_coefficients, notch_coefficients, set_named_parameter,
    wet_dry_mix_stereo,
};

/// Filter topology selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BiquadKind {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

impl BiquadKind {
    fn from_index(v: f32) -> Self {
        match v.round() as i32 {
            1 => BiquadKind::HighPass,
            2 => BiquadKind::BandPass,
            3 => BiquadKind::Notch,
            _ => BiquadKind::LowPass,
        }
    }

    fn as_index(self) -> f32 {
        match self {
            BiquadKind::LowPass => 0.0,
            BiquadKind::HighPass => 1.0,
            BiquadKind::BandPass => 2.0,
            BiquadKind::Notch => 3.0,
        }
    }
}

/// Second-order IIR filter with selectable topology.
///
/// Parameters: `frequency` [20, 20000] Hz, `resonance` (Q) [0.1, 10], `gain`
/// [-24, 24] dB (reserved for future peaking-mode use; current topologies
/// don't consume it), `type` (0=LP, 1=HP, 2=BP, 3=Notch), `mix` [0, 1].
pub struct Biquad {
    kind: BiquadKind,
    frequency: f32,
    resonance: f32,
    gain_db: f32,
    mix: SmoothParameter,
    sample_rate: f32,
    filter_l: BiquadCore,
    filter_r: BiquadCore,
}

impl Biquad {
    pub fn new(sample_rate: f32) -> Self {
        let mut s = Self {
            kind: BiquadKind::LowPass,
            frequency: 1000.0,
            resonance: 0.707,
            gain_db: 0.0,
            mix: SmoothParameter::new(1.0),
            sample_rate,
            filter_l: BiquadCore::new(),
            filter_r: BiquadCore::new(),
        };
        s.update_coefficients();
        s
    }

    fn update_coefficients(&mut self) {
        let (b0, b1, b2, a0, a1, a2) = match self.kind {
            BiquadKind::LowPass => {
                lowpass_coefficients(self.frequency, self.resonance, self.sample_rate)
            }
            BiquadKind::HighPass => {
                highpass_coefficients(self.frequency, self.resonance, self.sample_rate)
            }
            BiquadKind::BandPass => {
                bandpass_coefficients(self.frequency, self.resonance, self.sample_rate)
            }
            BiquadKind::Notch => {
                notch_coefficients(self.frequency, self.resonance, self.sample_rate)
            }
        };
        self.filter_l.set_coefficients(b0, b1, b2, a0, a1, a2);
        self.filter_r.set_coefficients(b0, b1, b2, a0, a1, a2);
    }

    pub fn set_frequency(&mut self, hz: f32) {
        self.frequency = hz.clamp(20.0, 20_000.0);
        self.update_coefficients();
    }

    pub fn set_resonance(&mut self, q: f32) {
        self.resonance = q.clamp(0.1, 10.0);
        self.update_coefficients();
    }

    pub fn set_kind(&mut self, kind: BiquadKind) {
        self.kind = kind;
        self.update_coefficients();
    }
}

impl ParameterInfo for Biquad {
    fn param_count(&self) -> usize {
        5
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::rate_hz(20.0, 20_000.0, 1000.0)
                    .with_id(ParamId(1000), "biquad_freq"),
            ),
            1 => Some(
                ParamDescriptor {
                    name: "Resonance",
                    short_name: "Q",
                    unit: ParamUnit::None,
                    min: 0.1,
                    max: 10.0,
                    default: 0.707,
                    step: 0.01,
                    id: ParamId(0),
                    string_id: "",
                    scale: ParamScale::Linear,
                    flags: ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1001), "biquad_q"),
            ),
            2 => Some(
                ParamDescriptor::gain_db("Gain", "Gain", -24.0, 24.0, 0.0)
                    .with_id(ParamId(1002), "biquad_gain"),
            ),
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
                    scale: ParamScale::Linear,
                    flags: ParamFlags::AUTOMATABLE,
                    group: "",
                    modulation_id: None,
                }
                .with_id(ParamId(1003), "biquad_type"),
            ),
            4 => Some(ParamDescriptor::mix().with_id(ParamId(1004), "biquad_mix")),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.frequency,
            1 => self.resonance,
            2 => self.gain_db,
            3 => self.kind.as_index(),
            4 => self.mix.target() * 100.0,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.set_frequency(value),
            1 => self.set_resonance(value),
            2 => self.gain_db = value.clamp(-24.0, 24.0),
            3 => self.set_kind(BiquadKind::from_index(value)),
            4 => self.mix.set_target((value / 100.0).clamp(0.0, 1.0)),
            _ => {}
        }
    }
}

impl EffectModel for Biquad {
    fn process(&mut self, buffer: &mut [f32], frames: usize) {
        for i in 0..frames {
            let dry_l = buffer[i * 2];
            let dry_r = buffer[i * 2 + 1];
            let wet_l = self.filter_l.process(dry_l);
            let wet_r = self.filter_r.process(dry_r);
            let m = self.mix.process();
            let (l, r) = wet_dry_mix_stereo(dry_l, dry_r, wet_l, wet_r, m);
            buffer[i * 2] = l;
            buffer[i * 2 + 1] = r;
        }
    }

    fn set_parameter(&mut self, name: &str, value: f32) {
        set_named_parameter(self, name, value);
    }

    fn get_parameter(&self, name: &str) -> Option<f32> {
        get_named_parameter(self, name)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    fn name(&self) -> &str {
        "Biquad Filter"
    }

    fn reset(&mut self) {
        self.filter_l.clear();
        self.filter_r.clear();
    }
}
