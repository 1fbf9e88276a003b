//! Musical states: named bundles of layers, mix snapshots, and
//! parameters, matching `AdaptiveSequencer.h`'s `TrackLayer`,
//! `MixSnapshot`, and `MusicalState`.

use std::collections::HashMap;

use crate::parameter::Parameter;
use crate::pattern::Pattern;

/// One musical layer within a state: a pattern plus mix controls.
pub struct TrackLayer {
    /// Layer name, referenced by [`MixSnapshot`] and crossfade blending.
    pub name: String,
    /// Notes this layer plays while its state is active.
    pub pattern: Pattern,
    /// Base volume, `[0, 1]`.
    pub volume: f32,
    /// Whether the layer is silenced regardless of volume.
    pub muted: bool,
    /// Whether the layer is soloed (engine-level mixing concern; the
    /// sequencer only records the flag).
    pub solo: bool,
}

impl TrackLayer {
    /// Create a layer at unity volume, unmuted, unsoloed.
    pub fn new(name: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            name: name.into(),
            pattern,
            volume: 1.0,
            muted: false,
            solo: false,
        }
    }
}

/// A named snapshot of per-layer volume and mute state within one
/// [`MusicalState`].
#[derive(Debug, Clone, Default)]
pub struct MixSnapshot {
    /// Snapshot name.
    pub name: String,
    /// Per-layer volume overrides.
    pub layer_volumes: HashMap<String, f32>,
    /// Per-layer mute overrides.
    pub layer_mutes: HashMap<String, bool>,
}

impl MixSnapshot {
    /// An empty snapshot with no overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer_volumes: HashMap::new(),
            layer_mutes: HashMap::new(),
        }
    }

    /// Record a per-layer volume override.
    pub fn set_layer_volume(&mut self, layer_name: impl Into<String>, volume: f32) {
        self.layer_volumes.insert(layer_name.into(), volume.clamp(0.0, 1.0));
    }

    /// Record a per-layer mute override.
    pub fn set_layer_muted(&mut self, layer_name: impl Into<String>, muted: bool) {
        self.layer_mutes.insert(layer_name.into(), muted);
    }
}

/// A named musical state: a set of layers, the mix snapshots defined
/// over them, and the tempo/time-signature/loop metadata active while
/// this state is playing.
pub struct MusicalState {
    name: String,
    /// Tempo associated with this state, applied on transition to it.
    pub tempo_bpm: f32,
    /// Time signature numerator.
    pub time_sig_num: u8,
    /// Time signature denominator.
    pub time_sig_den: u8,
    /// Loop length in bars.
    pub loop_length_bars: u32,
    layers: Vec<TrackLayer>,
    snapshots: Vec<MixSnapshot>,
    active_snapshot: Option<usize>,
    parameters: HashMap<String, Parameter>,
}

impl MusicalState {
    /// Create a state with no layers, common time, 120 BPM.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tempo_bpm: 120.0,
            time_sig_num: 4,
            time_sig_den: 4,
            loop_length_bars: 4,
            layers: Vec::new(),
            snapshots: Vec::new(),
            active_snapshot: None,
            parameters: HashMap::new(),
        }
    }

    /// The state's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a layer.
    pub fn add_layer(&mut self, layer: TrackLayer) {
        self.layers.push(layer);
    }

    /// Remove a layer by name.
    pub fn remove_layer(&mut self, layer_name: &str) {
        self.layers.retain(|l| l.name != layer_name);
    }

    /// Look up a layer by name.
    pub fn layer(&self, layer_name: &str) -> Option<&TrackLayer> {
        self.layers.iter().find(|l| l.name == layer_name)
    }

    /// Mutably look up a layer by name.
    pub fn layer_mut(&mut self, layer_name: &str) -> Option<&mut TrackLayer> {
        self.layers.iter_mut().find(|l| l.name == layer_name)
    }

    /// All layers in this state.
    pub fn layers(&self) -> &[TrackLayer] {
        &self.layers
    }

    /// Add a mix snapshot.
    pub fn add_snapshot(&mut self, snapshot: MixSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Remove a snapshot by name, clearing it from the active slot too.
    pub fn remove_snapshot(&mut self, snapshot_name: &str) {
        if let Some(active) = self.active_snapshot {
            if self.snapshots.get(active).is_some_and(|s| s.name == snapshot_name) {
                self.active_snapshot = None;
            }
        }
        self.snapshots.retain(|s| s.name != snapshot_name);
    }

    /// Look up a snapshot by name.
    pub fn snapshot(&self, snapshot_name: &str) -> Option<&MixSnapshot> {
        self.snapshots.iter().find(|s| s.name == snapshot_name)
    }

    /// All snapshots defined on this state.
    pub fn snapshots(&self) -> &[MixSnapshot] {
        &self.snapshots
    }

    /// Select the active snapshot by name. Returns `false` if no
    /// snapshot with that name exists.
    pub fn set_active_snapshot(&mut self, snapshot_name: &str) -> bool {
        match self.snapshots.iter().position(|s| s.name == snapshot_name) {
            Some(index) => {
                self.active_snapshot = Some(index);
                true
            }
            None => false,
        }
    }

    /// The currently active snapshot, if any.
    pub fn active_snapshot(&self) -> Option<&MixSnapshot> {
        self.active_snapshot.and_then(|i| self.snapshots.get(i))
    }

    /// Add a per-state parameter (used as a morph target and as the
    /// source for transition conditions).
    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.insert(parameter.name().to_owned(), parameter);
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Mutably look up a parameter by name.
    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.get_mut(name)
    }

    /// All parameters defined on this state, keyed by name.
    pub fn parameters(&self) -> &HashMap<String, Parameter> {
        &self.parameters
    }

    /// The effective volume of a layer: `0.0` if muted, else its raw
    /// volume, further overridden by the active snapshot if one exists
    /// and mentions the layer.
    pub fn effective_layer_volume(&self, layer_name: &str) -> Option<f32> {
        let layer = self.layer(layer_name)?;
        if let Some(snapshot) = self.active_snapshot() {
            if snapshot.layer_mutes.get(layer_name).copied().unwrap_or(layer.muted) {
                return Some(0.0);
            }
            if let Some(volume) = snapshot.layer_volumes.get(layer_name) {
                return Some(*volume);
            }
        }
        Some(if layer.muted { 0.0 } else { layer.volume })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_lookup_by_name() {
        let mut state = MusicalState::new("verse");
        state.add_layer(TrackLayer::new("drums", Pattern::new()));
        assert!(state.layer("drums").is_some());
        assert!(state.layer("bass").is_none());
    }

    #[test]
    fn muted_layer_has_zero_effective_volume() {
        let mut state = MusicalState::new("verse");
        let mut layer = TrackLayer::new("pad", Pattern::new());
        layer.muted = true;
        state.add_layer(layer);
        assert_eq!(state.effective_layer_volume("pad"), Some(0.0));
    }

    #[test]
    fn active_snapshot_overrides_layer_volume() {
        let mut state = MusicalState::new("chorus");
        state.add_layer(TrackLayer::new("lead", Pattern::new()));

        let mut snap = MixSnapshot::new("quiet");
        snap.set_layer_volume("lead", 0.2);
        state.add_snapshot(snap);
        assert!(state.set_active_snapshot("quiet"));

        assert_eq!(state.effective_layer_volume("lead"), Some(0.2));
    }

    #[test]
    fn set_active_snapshot_rejects_unknown_name() {
        let mut state = MusicalState::new("bridge");
        assert!(!state.set_active_snapshot("nope"));
        assert!(state.active_snapshot().is_none());
    }

    #[test]
    fn parameters_are_keyed_by_name() {
        let mut state = MusicalState::new("intro");
        state.add_parameter(Parameter::new("tension", 0.0, 0.0, 1.0));
        assert_eq!(state.parameter("tension").map(Parameter::value), Some(0.0));
        assert!(state.parameter("missing").is_none());
    }
}
