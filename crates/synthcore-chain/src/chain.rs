//! Reorderable stereo effects chain (C8).
//!
//! Grounded in the teacher's `sonido_config::chain::EffectChain`: a control
//! thread owns an ordered `Vec` of boxed effects and mutates it with
//! `add`/`remove`/`set_bypassed`/`clear`, while the chain itself implements
//! the processing trait so it can be driven like any single effect.
//!
//! What the teacher's chain does not do, and what this one adds per the
//! concurrency model, is publish a coherent snapshot of order and
//! enablement for any reader that is not the thread calling [`process`](
//! ReorderableChain::process) — following the `ArcSwap`-backed
//! `slots`/`order` fields in `sonido_plugin::chain::shared::ChainShared`.
//! Mutation methods stay ordinary `&mut self` calls (this chain has a
//! single owner, same as the teacher's), and each structural mutation
//! republishes the snapshot before returning.

use std::collections::HashMap;

use synthcore_core::EffectModel;
use synthcore_registry::EffectRegistry;

use crate::snapshot::{ChainHandle, ChainSnapshot, SlotSnapshot};

struct ChainEntry {
    effect: Box<dyn EffectModel + Send>,
    type_name: String,
    enabled: bool,
}

/// Ordered, reorderable sequence of stereo effects.
///
/// Holds the effects that make up one channel strip or the master bus.
/// [`process`](Self::process) runs every enabled entry in order, in
/// place, on an interleaved stereo buffer; the control-side methods
/// (`add`, `remove`, `move_entry`, `set_enabled`, `clear`) mutate the
/// order and publish a fresh [`ChainSnapshot`] so other readers (a GUI,
/// a preset exporter) can observe the current layout without touching
/// the effect objects.
pub struct ReorderableChain {
    entries: Vec<ChainEntry>,
    sample_rate: f32,
    registry: EffectRegistry,
    handle: ChainHandle,
}

impl ReorderableChain {
    /// Create an empty chain at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let chain = Self {
            entries: Vec::new(),
            sample_rate,
            registry: EffectRegistry::new(),
            handle: ChainHandle::new(),
        };
        chain.publish();
        chain
    }

    /// Build a chain from the registry's default effect list, all enabled.
    ///
    /// Mirrors how `EffectChain::from_effect_types` seeds a pedalboard
    /// from a fixed type list; here the list is
    /// [`EffectRegistry::default_chain_ids`].
    pub fn with_default_chain(sample_rate: f32) -> Self {
        let mut chain = Self::new(sample_rate);
        for id in chain.registry.default_chain_ids() {
            chain.add(id, None);
        }
        chain
    }

    /// Instantiate an effect by registry id without inserting it.
    ///
    /// Exposed so callers can build an effect, stash it (a preset slot
    /// awaiting a parameter load), and [`add`](Self::add) it later.
    pub fn create(&self, type_name: &str) -> Option<Box<dyn EffectModel + Send>> {
        self.registry.create(type_name, self.sample_rate)
    }

    /// Insert an effect created from a registry id at `index`, or append
    /// if `index` is `None` (the `index = -1` case in the component
    /// contract). Returns the index the entry landed at, or `None` if
    /// `type_name` isn't registered.
    pub fn add(&mut self, type_name: &str, index: Option<usize>) -> Option<usize> {
        let effect = self.create(type_name)?;
        Some(self.add_effect(effect, type_name, index))
    }

    /// Insert an already-constructed effect at `index` (append if `None`).
    /// Returns the index it landed at.
    pub fn add_effect(
        &mut self,
        effect: Box<dyn EffectModel + Send>,
        type_name: &str,
        index: Option<usize>,
    ) -> usize {
        let entry = ChainEntry {
            effect,
            type_name: type_name.to_owned(),
            enabled: true,
        };
        let at = index.unwrap_or(self.entries.len()).min(self.entries.len());
        self.entries.insert(at, entry);
        self.publish();
        at
    }

    /// Remove and return the effect at `index`, or `None` if out of range.
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn EffectModel + Send>> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        self.publish();
        Some(entry.effect)
    }

    /// Move the entry at `from` so it occupies position `to`.
    ///
    /// No-op (returns `false`) if either index is out of range.
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        if from >= self.entries.len() || to >= self.entries.len() {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.publish();
        true
    }

    /// Enable or disable the entry at `index`. Returns `false` if out of
    /// range.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        entry.enabled = enabled;
        self.publish();
        true
    }

    /// Toggle the entry at `index`, returning its new state.
    pub fn toggle_enabled(&mut self, index: usize) -> Option<bool> {
        let entry = self.entries.get_mut(index)?;
        entry.enabled = !entry.enabled;
        let now = entry.enabled;
        self.publish();
        Some(now)
    }

    /// Whether the entry at `index` is enabled.
    pub fn is_enabled(&self, index: usize) -> Option<bool> {
        self.entries.get(index).map(|e| e.enabled)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.publish();
    }

    /// Number of entries, enabled or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registry type name of the entry at `index`.
    pub fn type_name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.type_name.as_str())
    }

    /// Borrow the effect at `index` for direct parameter access.
    pub fn get(&self, index: usize) -> Option<&(dyn EffectModel + Send)> {
        self.entries.get(index).map(|e| e.effect.as_ref())
    }

    /// Mutably borrow the effect at `index` for direct parameter access.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn EffectModel + Send)> {
        self.entries.get_mut(index).map(|e| e.effect.as_mut())
    }

    /// Propagate a sample-rate change to every entry and the factory.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for entry in &mut self.entries {
            entry.effect.set_sample_rate(sample_rate);
        }
    }

    /// The sample rate this chain and its entries were configured for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// A cheap, cloneable handle onto this chain's published snapshot.
    ///
    /// Clone this into a GUI or preset-export thread; it never competes
    /// with [`process`](Self::process) for access to the effect objects.
    pub fn handle(&self) -> ChainHandle {
        self.handle.clone()
    }

    /// Apply every enabled entry, in order, in place.
    ///
    /// This is the audio-thread operation: it never allocates (aside from
    /// whatever an individual effect's `process` does internally, which
    /// by contract is nothing) and never touches the snapshot machinery.
    pub fn process(&mut self, buffer: &mut [f32], frames: usize) {
        for entry in &mut self.entries {
            if entry.enabled {
                entry.effect.process(buffer, frames);
            }
        }
    }

    /// Reset every entry's internal state (filter memories, delay lines).
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.effect.reset();
        }
    }

    /// Sum of every enabled entry's reported parameters into a flat map,
    /// keyed `"<index>.<param>"` so entries of the same type don't
    /// collide. Used to implement the engine-level
    /// `export_parameters`/`apply_parameters` surface (component 6).
    pub fn export_parameters(&self) -> HashMap<String, f32> {
        let mut out = HashMap::new();
        for (i, entry) in self.entries.iter().enumerate() {
            for name in KNOWN_PARAM_SCAN_LIMIT {
                if let Some(value) = entry.effect.get_parameter(name) {
                    out.insert(format!("{i}.{name}"), value);
                }
            }
        }
        out
    }

    /// Apply a flat `"<index>.<param>"` map produced by
    /// [`export_parameters`](Self::export_parameters).
    pub fn apply_parameters(&mut self, map: &HashMap<String, f32>) {
        for (key, value) in map {
            let Some((index_str, name)) = key.split_once('.') else {
                continue;
            };
            let Ok(index) = index_str.parse::<usize>() else {
                continue;
            };
            if let Some(entry) = self.entries.get_mut(index) {
                entry.effect.set_parameter(name, *value);
            }
        }
    }

    fn publish(&self) {
        let slots = self
            .entries
            .iter()
            .map(|e| SlotSnapshot {
                type_name: e.type_name.clone(),
                enabled: e.enabled,
            })
            .collect();
        self.handle.publish(ChainSnapshot { slots });
    }
}

/// Parameter names scanned when flattening an effect's state for
/// [`ReorderableChain::export_parameters`]. Every concrete effect in
/// `synthcore-effects` exposes at most this many distinct names; unknown
/// names simply return `None` from `get_parameter` and are skipped.
const KNOWN_PARAM_SCAN_LIMIT: &[&str] = &[
    "mix", "drive", "tone", "rate", "depth", "feedback", "spread", "wave_type", "frequency",
    "resonance", "mode", "time", "delay_time", "decay", "wet_level", "dry_level", "room_size",
    "damping", "width", "threshold", "ratio", "attack", "release", "makeup_gain", "knee",
    "character", "bits", "sample_rate_reduction", "stages", "low_gain", "mid_gain", "high_gain",
    "low_freq", "high_freq", "vowel", "gender", "q",
];
