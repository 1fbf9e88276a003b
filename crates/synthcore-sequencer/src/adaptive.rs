//! Adaptive music sequencing: a set of named [`MusicalState`]s linked by
//! [`StateTransition`]s, advanced on every control-thread tick and read
//! by the engine through [`AdaptiveSequencer::effective_layer_volume`]
//! and [`AdaptiveSequencer::global_parameter`].
//!
//! Grounded in `original_source/include/sequencer/AdaptiveSequencer.h`'s
//! `AdaptiveSequencer` class, minus its hardware-controller-mapping
//! surface (`mapControllerToParameter`, `onControlChange`, ...), which
//! is an embedded-MIDI concern outside this crate.

use std::collections::HashMap;

use crate::events::EventSystem;
use crate::parameter::Parameter;
use crate::state::MusicalState;
use crate::transition::{StateTransition, TransitionType};

struct ActiveTransition {
    to_state: String,
    transition_type: TransitionType,
    progress: f32,
    duration_beats: f32,
    started_at_beat: f32,
    sync_target_beat: f32,
}

/// Adaptive music engine: holds states, the transitions between them,
/// and the event system, and owns the musical transport (tempo,
/// play/stop, current beat).
pub struct AdaptiveSequencer {
    states: HashMap<String, MusicalState>,
    active_state: Option<String>,
    transitions: Vec<StateTransition>,
    active_transition: Option<ActiveTransition>,
    events: EventSystem,
    global_parameters: HashMap<String, Parameter>,
    effective_volumes: HashMap<String, f32>,
    is_playing: bool,
    tempo_bpm: f32,
    current_beat: f32,
}

impl Default for AdaptiveSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveSequencer {
    /// An empty adaptive sequencer, stopped, at 120 BPM.
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            active_state: None,
            transitions: Vec::new(),
            active_transition: None,
            events: EventSystem::new(),
            global_parameters: HashMap::new(),
            effective_volumes: HashMap::new(),
            is_playing: false,
            tempo_bpm: 120.0,
            current_beat: 0.0,
        }
    }

    /// Register a musical state under its own name.
    pub fn add_state(&mut self, state: MusicalState) {
        self.states.insert(state.name().to_owned(), state);
    }

    /// Look up a state by name.
    pub fn state(&self, name: &str) -> Option<&MusicalState> {
        self.states.get(name)
    }

    /// Mutably look up a state by name.
    pub fn state_mut(&mut self, name: &str) -> Option<&mut MusicalState> {
        self.states.get_mut(name)
    }

    /// Register a possible transition between two states.
    pub fn add_transition(&mut self, transition: StateTransition) {
        self.transitions.push(transition);
    }

    /// Jump directly to `name`, bypassing any transition machinery.
    /// Used for initial setup; prefer [`start_transition`](Self::start_transition)
    /// once playing.
    pub fn set_active_state(&mut self, name: &str) -> bool {
        if !self.states.contains_key(name) {
            return false;
        }
        self.active_state = Some(name.to_owned());
        self.active_transition = None;
        self.recompute_effective_volumes();
        true
    }

    /// Name of the currently active state, if any.
    pub fn active_state_name(&self) -> Option<&str> {
        self.active_state.as_deref()
    }

    /// Whether a transition is currently in progress.
    pub fn is_transitioning(&self) -> bool {
        self.active_transition.is_some()
    }

    /// Manually begin transitioning to `to_state` along the first
    /// registered transition from the active state to it, ignoring that
    /// transition's conditions. Returns `false` if no active state, no
    /// such state, or no transition is registered between them.
    pub fn start_transition(&mut self, to_state: &str) -> bool {
        let Some(from) = self.active_state.clone() else { return false };
        if !self.states.contains_key(to_state) {
            return false;
        }
        let Some(index) = self
            .transitions
            .iter()
            .position(|t| t.from_state == from && t.to_state == to_state)
        else {
            return false;
        };
        self.begin_transition(index);
        true
    }

    fn begin_transition(&mut self, transition_index: usize) {
        let transition = &self.transitions[transition_index];
        match transition.transition_type {
            TransitionType::Immediate => {
                let to = transition.to_state.clone();
                self.active_state = Some(to);
                self.active_transition = None;
                self.recompute_effective_volumes();
            }
            TransitionType::Crossfade | TransitionType::Morph => {
                self.active_transition = Some(ActiveTransition {
                    to_state: transition.to_state.clone(),
                    transition_type: transition.transition_type,
                    progress: 0.0,
                    duration_beats: transition.duration_beats.max(0.0001),
                    started_at_beat: self.current_beat,
                    sync_target_beat: 0.0,
                });
            }
            TransitionType::MusicalSync => {
                let bpb = self
                    .active_state
                    .as_ref()
                    .and_then(|name| self.states.get(name))
                    .map(|s| s.time_sig_num as f32)
                    .unwrap_or(4.0);
                let current_bar = (self.current_beat / bpb).floor();
                let next_boundary = (current_bar + 1.0) * bpb;
                let target = next_boundary
                    + transition.sync_bar_count as f32 * bpb
                    + transition.sync_beat_count as f32;
                self.active_transition = Some(ActiveTransition {
                    to_state: transition.to_state.clone(),
                    transition_type: transition.transition_type,
                    progress: 0.0,
                    duration_beats: transition.duration_beats.max(0.0001),
                    started_at_beat: self.current_beat,
                    sync_target_beat: target,
                });
            }
        }
    }

    /// Start playback; does not reset the current beat.
    pub fn play(&mut self) {
        self.is_playing = true;
    }

    /// Stop playback and reset the current beat to zero.
    pub fn stop(&mut self) {
        self.is_playing = false;
        self.current_beat = 0.0;
    }

    /// Pause playback, retaining the current beat.
    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Whether the transport is running.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Set the tempo; non-positive values are ignored.
    pub fn set_tempo(&mut self, bpm: f32) {
        if bpm > 0.0 {
            self.tempo_bpm = bpm;
        }
    }

    /// Current tempo in BPM.
    pub fn tempo(&self) -> f32 {
        self.tempo_bpm
    }

    /// Current position in beats since the transport last started.
    pub fn current_beat(&self) -> f32 {
        self.current_beat
    }

    /// Register or replace a global parameter, readable by the engine
    /// and usable in transition conditions.
    pub fn add_global_parameter(&mut self, parameter: Parameter) {
        self.global_parameters
            .insert(parameter.name().to_owned(), parameter);
    }

    /// Look up a global parameter by name.
    pub fn global_parameter(&self, name: &str) -> Option<&Parameter> {
        self.global_parameters.get(name)
    }

    /// Mutably look up a global parameter by name.
    pub fn global_parameter_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.global_parameters.get_mut(name)
    }

    /// The event system, for registering listeners or scheduling events.
    pub fn events(&mut self) -> &mut EventSystem {
        &mut self.events
    }

    /// The blended volume a layer should be rendered at right now,
    /// accounting for an in-progress crossfade or morph.
    pub fn effective_layer_volume(&self, layer_name: &str) -> f32 {
        self.effective_volumes.get(layer_name).copied().unwrap_or(0.0)
    }

    /// Advance the transport and transition machinery by `delta_seconds`
    /// of wall-clock time. No-op while stopped or paused.
    pub fn update(&mut self, delta_seconds: f32) {
        if !self.is_playing {
            return;
        }
        let delta_beats = delta_seconds * self.tempo_bpm / 60.0;
        self.current_beat += delta_beats;
        self.events.process_tick(self.current_beat);

        if self.active_transition.is_some() {
            self.advance_active_transition();
        } else {
            self.maybe_start_transition();
        }
        self.recompute_effective_volumes();
    }

    fn maybe_start_transition(&mut self) {
        let Some(from) = self.active_state.clone() else { return };
        let candidate = self.transitions.iter().position(|t| {
            t.from_state == from && t.check_conditions(&self.global_parameters)
        });
        if let Some(index) = candidate {
            self.begin_transition(index);
        }
    }

    fn advance_active_transition(&mut self) {
        let Some(active) = self.active_transition.as_mut() else { return };
        match active.transition_type {
            TransitionType::MusicalSync => {
                if self.current_beat >= active.sync_target_beat {
                    let to = active.to_state.clone();
                    self.active_state = Some(to);
                    self.active_transition = None;
                }
            }
            TransitionType::Crossfade | TransitionType::Morph => {
                let elapsed = self.current_beat - active.started_at_beat;
                active.progress = (elapsed / active.duration_beats).clamp(0.0, 1.0);
                if active.progress >= 1.0 {
                    let to = active.to_state.clone();
                    if active.transition_type == TransitionType::Morph {
                        self.apply_morph_targets(&to);
                    }
                    self.active_state = Some(to);
                    self.active_transition = None;
                }
            }
            TransitionType::Immediate => {
                self.active_transition = None;
            }
        }
    }

    fn apply_morph_targets(&mut self, to_state: &str) {
        let Some(target) = self.states.get(to_state) else { return };
        let updates: Vec<(String, f32)> = target
            .parameters()
            .iter()
            .map(|(name, param)| (name.clone(), param.value()))
            .collect();
        for (name, value) in updates {
            self.global_parameters
                .entry(name)
                .or_insert_with(|| Parameter::new("morphed", value, f32::MIN, f32::MAX))
                .set_value(value);
        }
    }

    fn recompute_effective_volumes(&mut self) {
        self.effective_volumes.clear();
        let Some(active_name) = self.active_state.clone() else { return };
        let Some(active) = self.states.get(&active_name) else { return };

        match &self.active_transition {
            None => {
                for layer in active.layers() {
                    let volume = active.effective_layer_volume(&layer.name).unwrap_or(0.0);
                    self.effective_volumes.insert(layer.name.clone(), volume);
                }
            }
            Some(transition) if transition.transition_type == TransitionType::MusicalSync => {
                for layer in active.layers() {
                    let volume = active.effective_layer_volume(&layer.name).unwrap_or(0.0);
                    self.effective_volumes.insert(layer.name.clone(), volume);
                }
            }
            Some(transition) => {
                let progress = transition.progress;
                let Some(incoming) = self.states.get(&transition.to_state) else { return };

                let mut names: Vec<&str> = active.layers().iter().map(|l| l.name.as_str()).collect();
                for layer in incoming.layers() {
                    if !names.contains(&layer.name.as_str()) {
                        names.push(layer.name.as_str());
                    }
                }

                for name in names {
                    let from_vol = active.effective_layer_volume(name).unwrap_or(0.0);
                    let to_vol = incoming.effective_layer_volume(name).unwrap_or(0.0);
                    let blended = from_vol * (1.0 - progress) + to_vol * progress;
                    self.effective_volumes.insert(name.to_owned(), blended);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::state::TrackLayer;
    use crate::transition::TransitionCondition;

    fn state_with_layer(name: &str, layer: &str, volume: f32) -> MusicalState {
        let mut s = MusicalState::new(name);
        let mut l = TrackLayer::new(layer, Pattern::new());
        l.volume = volume;
        s.add_layer(l);
        s
    }

    #[test]
    fn immediate_transition_switches_on_the_next_update() {
        let mut seq = AdaptiveSequencer::new();
        seq.add_state(state_with_layer("verse", "drums", 0.5));
        seq.add_state(state_with_layer("chorus", "drums", 1.0));
        seq.add_transition(StateTransition::new("verse", "chorus", TransitionType::Immediate));
        seq.set_active_state("verse");
        seq.play();

        assert!(seq.start_transition("chorus"));
        assert_eq!(seq.active_state_name(), Some("chorus"));
    }

    #[test]
    fn crossfade_blends_volume_over_duration() {
        let mut seq = AdaptiveSequencer::new();
        seq.add_state(state_with_layer("a", "pad", 0.0));
        seq.add_state(state_with_layer("b", "pad", 1.0));
        let mut t = StateTransition::new("a", "b", TransitionType::Crossfade);
        t.duration_beats = 4.0;
        seq.add_transition(t);
        seq.set_active_state("a");
        seq.set_tempo(120.0);
        seq.play();

        seq.start_transition("b");
        assert!(seq.is_transitioning());

        // 2 beats at 120 BPM = 1 second.
        seq.update(1.0);
        let mid = seq.effective_layer_volume("pad");
        assert!(mid > 0.0 && mid < 1.0);
        assert_eq!(seq.active_state_name(), Some("a"));

        seq.update(1.0);
        assert_eq!(seq.active_state_name(), Some("b"));
        assert!((seq.effective_layer_volume("pad") - 1.0).abs() < 1e-4);
    }

    #[test]
    fn condition_gated_transition_autofires_once_threshold_crossed() {
        let mut seq = AdaptiveSequencer::new();
        seq.add_state(MusicalState::new("calm"));
        seq.add_state(MusicalState::new("intense"));
        let mut t = StateTransition::new("calm", "intense", TransitionType::Immediate);
        t.set_condition("energy", TransitionCondition { threshold: 0.5, greater_than: true });
        seq.add_transition(t);
        seq.add_global_parameter(Parameter::new("energy", 0.0, 0.0, 1.0));
        seq.set_active_state("calm");
        seq.play();

        seq.update(0.1);
        assert_eq!(seq.active_state_name(), Some("calm"));

        seq.global_parameter_mut("energy").unwrap().set_value(0.9);
        seq.update(0.1);
        assert_eq!(seq.active_state_name(), Some("intense"));
    }

    #[test]
    fn stopped_sequencer_does_not_auto_transition() {
        let mut seq = AdaptiveSequencer::new();
        seq.add_state(MusicalState::new("a"));
        seq.add_state(MusicalState::new("b"));
        seq.add_transition(StateTransition::new("a", "b", TransitionType::Immediate));
        seq.set_active_state("a");
        seq.update(10.0);
        assert_eq!(seq.active_state_name(), Some("a"));
    }

    #[test]
    fn stop_resets_beat_pause_retains_it() {
        let mut seq = AdaptiveSequencer::new();
        seq.add_state(MusicalState::new("a"));
        seq.set_active_state("a");
        seq.play();
        seq.update(1.0);
        assert!(seq.current_beat() > 0.0);

        seq.pause();
        let paused_at = seq.current_beat();
        assert!((paused_at - seq.current_beat()).abs() < 1e-6);

        seq.stop();
        assert_eq!(seq.current_beat(), 0.0);
    }
}
