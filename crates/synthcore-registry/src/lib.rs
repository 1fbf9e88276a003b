//! Effect registry and factory for the stereo effects chain.
//!
//! This crate provides a centralized registry for discovering and
//! instantiating [`EffectModel`] effects by name. It enables dynamic effect
//! selection for the reorderable effects chain (C8) and provides metadata
//! for building user interfaces.
//!
//! # Features
//!
//! - **Effect Discovery**: List all available effects with metadata
//! - **Factory Pattern**: Create effects by name at runtime
//! - **Category System**: Effects organized by type (dynamics, distortion, etc.)
//! - **Parameter Info**: Access parameter descriptors for UI generation
//!
//! # Example
//!
//! ```rust
//! use synthcore_registry::{EffectRegistry, EffectCategory};
//!
//! let registry = EffectRegistry::new();
//!
//! for effect in registry.all_effects() {
//!     println!("{}: {}", effect.name, effect.description);
//! }
//!
//! if let Some(mut distortion) = registry.create("distortion", 48000.0) {
//!     let mut buf = vec![0.0f32; 128];
//!     distortion.process(&mut buf, 64);
//! }
//!
//! for effect in registry.effects_in_category(EffectCategory::Modulation) {
//!     println!("Modulation effect: {}", effect.name);
//! }
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! synthcore-registry = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use synthcore_core::EffectModel;
use synthcore_effects::{
    Biquad, Bitcrusher, Comb, Compressor, Delay, Distortion, Formant, Ladder, Modulation,
    ModulationVoicing, Phaser, Reverb, Saturation, ThreeBandEq,
};

/// Category of audio effect for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    /// Dynamics processing (compressor, limiter, gate)
    Dynamics,
    /// Distortion and saturation effects
    Distortion,
    /// Modulation effects (chorus, flanger, phaser)
    Modulation,
    /// Time-based effects (delay, reverb)
    TimeBased,
    /// Filter effects (lowpass, ladder, comb, formant, eq)
    Filter,
}

impl EffectCategory {
    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            EffectCategory::Dynamics => "Dynamics",
            EffectCategory::Distortion => "Distortion",
            EffectCategory::Modulation => "Modulation",
            EffectCategory::TimeBased => "Time-Based",
            EffectCategory::Filter => "Filter",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            EffectCategory::Dynamics => "Compressors and other dynamics processors",
            EffectCategory::Distortion => {
                "Distortion, saturation, bitcrushing, and other waveshaping effects"
            }
            EffectCategory::Modulation => "Chorus, flanger, and phaser modulation effects",
            EffectCategory::TimeBased => "Delay, reverb, and other time-based effects",
            EffectCategory::Filter => "Lowpass, ladder, comb, formant, and EQ filter effects",
        }
    }
}

/// Describes an effect in the registry.
#[derive(Debug, Clone)]
pub struct EffectDescriptor {
    /// Unique identifier for the effect (lowercase, no spaces).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Short display name for compact UI (e.g. "DIST", "COMP").
    pub short_name: &'static str,
    /// Brief description of the effect.
    pub description: &'static str,
    /// Category for organization.
    pub category: EffectCategory,
}

/// Factory function type for creating effects.
type EffectFactory = fn(f32) -> Box<dyn EffectModel + Send>;

/// Internal entry in the registry.
struct RegistryEntry {
    descriptor: EffectDescriptor,
    factory: EffectFactory,
}

/// Registry of all available audio effects.
///
/// The registry provides a centralized way to discover and instantiate
/// audio effects by name. All built-in effects are automatically registered.
pub struct EffectRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectRegistry {
    /// Create a new registry with all built-in effects registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(14),
        };
        registry.register_builtin_effects();
        registry
    }

    /// Register all built-in effects.
    fn register_builtin_effects(&mut self) {
        self.register(
            EffectDescriptor {
                id: "biquad",
                name: "Biquad Filter",
                short_name: "FILT",
                description: "Lowpass/highpass/bandpass/notch second-order filter",
                category: EffectCategory::Filter,
            },
            |sr| Box::new(Biquad::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "ladder",
                name: "Ladder Filter",
                short_name: "LDDR",
                description: "Moog-style cascaded one-pole filter with resonance feedback",
                category: EffectCategory::Filter,
            },
            |sr| Box::new(Ladder::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "comb",
                name: "Comb Filter",
                short_name: "COMB",
                description: "FIR/IIR comb filter with LFO-modulated delay",
                category: EffectCategory::Filter,
            },
            |sr| Box::new(Comb::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "formant",
                name: "Formant Filter",
                short_name: "FORM",
                description: "Vowel formant filter with morphable vowel/gender",
                category: EffectCategory::Filter,
            },
            |sr| Box::new(Formant::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "eq",
                name: "3-Band EQ",
                short_name: "EQ",
                description: "Low/mid/high shelving and peaking equalizer",
                category: EffectCategory::Filter,
            },
            |sr| Box::new(ThreeBandEq::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "delay",
                name: "Delay",
                short_name: "DLY",
                description: "Stereo feedback delay line",
                category: EffectCategory::TimeBased,
            },
            |sr| Box::new(Delay::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "reverb",
                name: "Reverb",
                short_name: "VERB",
                description: "Freeverb-style algorithmic reverb",
                category: EffectCategory::TimeBased,
            },
            |sr| Box::new(Reverb::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "compressor",
                name: "Compressor",
                short_name: "COMP",
                description: "Peak compressor with soft knee",
                category: EffectCategory::Dynamics,
            },
            |sr| Box::new(Compressor::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "distortion",
                name: "Distortion",
                short_name: "DIST",
                description: "Four-character waveshaping distortion with tone control",
                category: EffectCategory::Distortion,
            },
            |sr| Box::new(Distortion::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "saturation",
                name: "Saturation",
                short_name: "SAT",
                description: "Gentler analog-flavored saturation",
                category: EffectCategory::Distortion,
            },
            |sr| Box::new(Saturation::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "bitcrusher",
                name: "Bitcrusher",
                short_name: "CRSH",
                description: "Bit-depth and sample-rate reduction",
                category: EffectCategory::Distortion,
            },
            |sr| Box::new(Bitcrusher::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "phaser",
                name: "Phaser",
                short_name: "PHAS",
                description: "Cascaded allpass phaser, 2-12 stages",
                category: EffectCategory::Modulation,
            },
            |sr| Box::new(Phaser::new(sr)),
        );

        self.register(
            EffectDescriptor {
                id: "chorus",
                name: "Chorus",
                short_name: "CHOR",
                description: "LFO-modulated delay line voiced for gentle detune",
                category: EffectCategory::Modulation,
            },
            |sr| Box::new(Modulation::new(sr, ModulationVoicing::Chorus)),
        );

        self.register(
            EffectDescriptor {
                id: "flanger",
                name: "Flanger",
                short_name: "FLNG",
                description: "LFO-modulated delay line voiced for a short metallic comb",
                category: EffectCategory::Modulation,
            },
            |sr| Box::new(Modulation::new(sr, ModulationVoicing::Flanger)),
        );
    }

    /// Register an effect with the registry.
    fn register(&mut self, descriptor: EffectDescriptor, factory: EffectFactory) {
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Returns descriptors for all registered effects.
    pub fn all_effects(&self) -> Vec<&EffectDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Returns descriptors for effects in a specific category.
    pub fn effects_in_category(&self, category: EffectCategory) -> Vec<&EffectDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Get a descriptor by effect ID.
    pub fn get(&self, id: &str) -> Option<&EffectDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| &e.descriptor)
    }

    /// Look up an effect descriptor by ID.
    ///
    /// Alias for [`get()`](Self::get) — provides semantically explicit access
    /// to the full descriptor including `short_name` and other metadata.
    pub fn descriptor(&self, id: &str) -> Option<&EffectDescriptor> {
        self.get(id)
    }

    /// Create an effect instance by ID at the given sample rate.
    ///
    /// Returns `None` if the effect ID is not found.
    pub fn create(&self, id: &str, sample_rate: f32) -> Option<Box<dyn EffectModel + Send>> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| (e.factory)(sample_rate))
    }

    /// Returns the number of registered effects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no effects are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default effect chain in signal-flow order (filter → dynamics → EQ →
    /// modulation → time-based → reverb last).
    ///
    /// Used to initialize a new reorderable effects chain.
    pub fn default_chain_ids(&self) -> &'static [&'static str] {
        &[
            "biquad",
            "distortion",
            "compressor",
            "eq",
            "chorus",
            "phaser",
            "delay",
            "reverb",
        ]
    }
}
