//! Stereo effect trait for the reorderable effects chain.
//!
//! [`Effect`](crate::Effect) is mono, sample-at-a-time, index-parameterized —
//! the right shape for a single DSP building block. [`EffectModel`] is the
//! contract the effects chain (C8) actually drives: in-place interleaved
//! stereo blocks, named parameters, and a universal wet/dry `mix`.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::{ParamDescriptor, ParameterInfo};

/// A stereo audio effect driven by name rather than index.
///
/// Every concrete effect carries a `mix` parameter in `[0, 1]` with the
/// contract `output = input * (1 - mix) + wet(input) * mix`; at `mix = 0`
/// the effect must be a true bypass, producing sample-equal output.
///
/// Object-safe: the reorderable chain stores effects as `Box<dyn EffectModel>`.
pub trait EffectModel {
    /// Process `frames` stereo frames in place. `buffer` is interleaved
    /// `[L0, R0, L1, R1, ...]` and must contain at least `frames * 2` samples.
    fn process(&mut self, buffer: &mut [f32], frames: usize);

    /// Set a parameter by name. Unknown names are ignored. Values are
    /// clamped to the parameter's declared range.
    fn set_parameter(&mut self, name: &str, value: f32);

    /// Get a parameter's current value by name. Returns `None` for unknown names.
    fn get_parameter(&self, name: &str) -> Option<f32>;

    /// Re-derive sample-rate-dependent coefficients (filter cutoffs, delay
    /// sample counts, LFO increments).
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Stable display/debug name, e.g. `"Reverb"`.
    fn name(&self) -> &str;

    /// Clear internal state (delay lines, filter history) without changing
    /// parameters. Called when the chain is re-armed after a transport stop.
    fn reset(&mut self);
}

/// Blanket helper: implement [`EffectModel::set_parameter`]/[`EffectModel::get_parameter`]
/// in terms of [`ParameterInfo`]'s index-based access and [`ParameterInfo::find_param_by_name`].
///
/// Concrete effects that already implement `ParameterInfo` (for GUI/automation
/// introspection) call these from their `EffectModel` impl instead of
/// duplicating the name-matching logic.
pub fn set_named_parameter<T: ParameterInfo>(effect: &mut T, name: &str, value: f32) {
    if let Some(index) = effect.find_param_by_name(name) {
        effect.set_param(index, value);
    }
}

/// See [`set_named_parameter`].
pub fn get_named_parameter<T: ParameterInfo>(effect: &T, name: &str) -> Option<f32> {
    effect
        .find_param_by_name(name)
        .map(|index| effect.get_param(index))
}

/// Look up a [`ParamDescriptor`] by name without needing a live instance —
/// used by the registry's `param_index_by_name` before an effect is created.
pub fn find_descriptor<'a>(
    descriptors: &'a [ParamDescriptor],
    name: &str,
) -> Option<&'a ParamDescriptor> {
    descriptors
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name) || d.short_name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gain {
        mix: f32,
        gain: f32,
    }

    impl ParameterInfo for Gain {
        fn param_count(&self) -> usize {
            2
        }
        fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
            match index {
                0 => Some(ParamDescriptor::gain_db("Gain", "Gain", -24.0, 24.0, 0.0)),
                1 => Some(ParamDescriptor::mix()),
                _ => None,
            }
        }
        fn get_param(&self, index: usize) -> f32 {
            match index {
                0 => self.gain,
                1 => self.mix * 100.0,
                _ => 0.0,
            }
        }
        fn set_param(&mut self, index: usize, value: f32) {
            match index {
                0 => self.gain = value.clamp(-24.0, 24.0),
                1 => self.mix = (value / 100.0).clamp(0.0, 1.0),
                _ => {}
            }
        }
    }

    impl EffectModel for Gain {
        fn process(&mut self, buffer: &mut [f32], frames: usize) {
            let g = crate::db_to_linear(self.gain);
            for i in 0..frames {
                let dry_l = buffer[i * 2];
                let dry_r = buffer[i * 2 + 1];
                let (l, r) = crate::wet_dry_mix_stereo(dry_l, dry_r, dry_l * g, dry_r * g, self.mix);
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
        fn set_sample_rate(&mut self, _sample_rate: f32) {}
        fn name(&self) -> &str {
            "Gain"
        }
        fn reset(&mut self) {}
    }

    #[test]
    fn mix_zero_is_bypass() {
        let mut g = Gain { mix: 0.0, gain: 12.0 };
        let mut buf = [0.3, -0.2, 0.5, 0.5];
        let original = buf;
        g.process(&mut buf, 2);
        assert_eq!(buf, original);
    }

    #[test]
    fn named_parameter_roundtrip() {
        let mut g = Gain { mix: 0.0, gain: 0.0 };
        g.set_parameter("mix", 75.0);
        assert!((g.get_parameter("Mix").unwrap() - 75.0).abs() < 1e-4);
        assert!(g.get_parameter("nonexistent").is_none());
    }
}
