//! Patterns: ordered note events played back by the transport.

/// Per-note ADSR override, carried through to the engine's note-on call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeOverride {
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level, `[0, 1]`.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

/// A single scheduled note within a pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// MIDI pitch, `0..=127`.
    pub pitch: u8,
    /// Velocity, `[0, 1]`.
    pub velocity: f32,
    /// Beat position the note-on fires at.
    pub start_beat: f32,
    /// Beats until the corresponding note-off.
    pub duration_beats: f32,
    /// Target channel, `0..=15`.
    pub channel: u8,
    /// Optional per-event ADSR override.
    pub envelope_override: Option<EnvelopeOverride>,
}

impl NoteEvent {
    /// Create a note event with no envelope override.
    pub fn new(pitch: u8, velocity: f32, start_beat: f32, duration_beats: f32, channel: u8) -> Self {
        Self {
            pitch,
            velocity: velocity.clamp(0.0, 1.0),
            start_beat,
            duration_beats,
            channel,
            envelope_override: None,
        }
    }

    /// Beat position the note-off fires at.
    pub fn end_beat(&self) -> f32 {
        self.start_beat + self.duration_beats
    }
}

/// An ordered sequence of note events, looped by the transport.
///
/// Events are kept sorted by [`NoteEvent::start_beat`] so the sequencer
/// can sweep them in a single forward pass per callback.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    events: Vec<NoteEvent>,
}

impl Pattern {
    /// An empty pattern.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Insert an event, keeping the pattern sorted by start beat.
    pub fn add_event(&mut self, event: NoteEvent) {
        let at = self
            .events
            .partition_point(|e| e.start_beat <= event.start_beat);
        self.events.insert(at, event);
    }

    /// The events in start-beat order.
    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    /// Number of events in the pattern.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the pattern has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_event_keeps_sorted_order() {
        let mut pattern = Pattern::new();
        pattern.add_event(NoteEvent::new(64, 1.0, 2.0, 1.0, 0));
        pattern.add_event(NoteEvent::new(60, 1.0, 0.0, 1.0, 0));
        pattern.add_event(NoteEvent::new(67, 1.0, 1.0, 1.0, 0));

        let starts: Vec<f32> = pattern.events().iter().map(|e| e.start_beat).collect();
        assert_eq!(starts, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn end_beat_sums_start_and_duration() {
        let event = NoteEvent::new(60, 1.0, 1.5, 0.5, 0);
        assert!((event.end_beat() - 2.0).abs() < 1e-6);
    }
}
