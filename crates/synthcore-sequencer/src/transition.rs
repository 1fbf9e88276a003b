//! State transitions: how and when the active [`crate::state::MusicalState`]
//! changes, mirroring `AdaptiveSequencer.h`'s `StateTransition` and
//! `TransitionManager`.

use std::collections::HashMap;

use crate::parameter::Parameter;

/// How a transition moves from one state to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionType {
    /// Switch states on the next tick, no blending.
    Immediate,
    /// Linearly blend layer volumes between the two states over
    /// [`StateTransition::duration_beats`].
    Crossfade,
    /// Hold the outgoing state until the next bar/beat boundary, then
    /// switch immediately.
    MusicalSync,
    /// Blend both layer volumes and shared parameter values over
    /// [`StateTransition::duration_beats`].
    Morph,
}

/// A condition on a named parameter's value that must hold for a
/// transition to auto-fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionCondition {
    /// Value the parameter is compared against.
    pub threshold: f32,
    /// `true` requires `value > threshold`, `false` requires `value < threshold`.
    pub greater_than: bool,
}

impl TransitionCondition {
    fn is_met(&self, value: f32) -> bool {
        if self.greater_than {
            value > self.threshold
        } else {
            value < self.threshold
        }
    }
}

/// A possible move from one named state to another, gated by
/// conditions on global parameters.
pub struct StateTransition {
    /// Source state name.
    pub from_state: String,
    /// Destination state name.
    pub to_state: String,
    /// Blend/sync behavior.
    pub transition_type: TransitionType,
    /// Crossfade/morph duration in beats. Unused for [`TransitionType::Immediate`].
    pub duration_beats: f32,
    /// For [`TransitionType::MusicalSync`], the bar count to wait for;
    /// `0` means "next beat boundary" rather than "next bar".
    pub sync_bar_count: u32,
    /// For [`TransitionType::MusicalSync`], the beat count within the
    /// target bar to wait for.
    pub sync_beat_count: u32,
    conditions: HashMap<String, TransitionCondition>,
}

impl StateTransition {
    /// Create an unconditional transition of the given type.
    pub fn new(from_state: impl Into<String>, to_state: impl Into<String>, transition_type: TransitionType) -> Self {
        Self {
            from_state: from_state.into(),
            to_state: to_state.into(),
            transition_type,
            duration_beats: 0.0,
            sync_bar_count: 0,
            sync_beat_count: 0,
            conditions: HashMap::new(),
        }
    }

    /// Require `parameter_name`'s value to satisfy `condition` for this
    /// transition to auto-fire.
    pub fn set_condition(&mut self, parameter_name: impl Into<String>, condition: TransitionCondition) {
        self.conditions.insert(parameter_name.into(), condition);
    }

    /// Drop a previously set condition.
    pub fn clear_condition(&mut self, parameter_name: &str) {
        self.conditions.remove(parameter_name);
    }

    /// Whether every registered condition currently holds against
    /// `parameters`. A transition with no conditions is always
    /// satisfied; a transition whose condition names a parameter not
    /// present in `parameters` is not satisfied.
    pub fn check_conditions(&self, parameters: &HashMap<String, Parameter>) -> bool {
        self.conditions.iter().all(|(name, condition)| {
            parameters
                .get(name)
                .is_some_and(|p| condition.is_met(p.value()))
        })
    }
}
