//! Named-event trigger and scheduling system, lifted from
//! `original_source/include/sequencer/AdaptiveSequencer.h`'s `EventSystem`:
//! listeners registered per event name, plus a beat-scheduled queue
//! drained once per tick in monotonic order.

use std::collections::HashMap;

/// Named float payload carried with a triggered event.
pub type EventData = HashMap<String, f32>;

/// `listener(event_name, data)`.
pub type EventListener = Box<dyn FnMut(&str, &EventData) + Send>;

struct ScheduledEvent {
    name: String,
    trigger_beat: f32,
    data: EventData,
}

/// Registry of event listeners plus a beat-scheduled trigger queue.
#[derive(Default)]
pub struct EventSystem {
    listeners: HashMap<String, Vec<EventListener>>,
    scheduled: Vec<ScheduledEvent>,
}

impl EventSystem {
    /// An empty event system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `event_name`. Multiple listeners per name
    /// are all invoked, in registration order, on trigger.
    pub fn add_listener(&mut self, event_name: &str, callback: EventListener) {
        self.listeners
            .entry(event_name.to_owned())
            .or_default()
            .push(callback);
    }

    /// Remove every listener registered for `event_name`.
    pub fn clear_listeners(&mut self, event_name: &str) {
        self.listeners.remove(event_name);
    }

    /// Fire `event_name` immediately, invoking every registered listener.
    pub fn trigger_event(&mut self, event_name: &str, data: EventData) {
        if let Some(callbacks) = self.listeners.get_mut(event_name) {
            for callback in callbacks.iter_mut() {
                callback(event_name, &data);
            }
        }
    }

    /// Queue `event_name` to fire once `current_beat + delay_beats` is
    /// reached by a subsequent [`process_tick`](Self::process_tick) call.
    pub fn schedule_event(
        &mut self,
        event_name: &str,
        delay_beats: f32,
        current_beat: f32,
        data: EventData,
    ) {
        self.scheduled.push(ScheduledEvent {
            name: event_name.to_owned(),
            trigger_beat: current_beat + delay_beats,
            data,
        });
    }

    /// Drop every pending scheduled occurrence of `event_name` without
    /// firing it.
    pub fn cancel_scheduled_events(&mut self, event_name: &str) {
        self.scheduled.retain(|e| e.name != event_name);
    }

    /// Fire every scheduled event whose trigger beat has been reached,
    /// in ascending trigger-beat order, removing each from the queue.
    pub fn process_tick(&mut self, beat_position: f32) {
        self.scheduled
            .sort_by(|a, b| a.trigger_beat.total_cmp(&b.trigger_beat));
        let mut i = 0;
        while i < self.scheduled.len() {
            if self.scheduled[i].trigger_beat <= beat_position {
                let due = self.scheduled.remove(i);
                self.trigger_event(&due.name, due.data);
            } else {
                i += 1;
            }
        }
    }

    /// Number of events still waiting in the scheduled queue.
    pub fn pending_count(&self) -> usize {
        self.scheduled.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn trigger_invokes_registered_listener() {
        let mut events = EventSystem::new();
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();
        events.add_listener(
            "beat_drop",
            Box::new(move |name, _data| seen_cb.lock().unwrap().push(name.to_owned())),
        );
        events.trigger_event("beat_drop", EventData::new());
        assert_eq!(*seen.lock().unwrap(), vec!["beat_drop".to_owned()]);
    }

    #[test]
    fn unregistered_event_is_a_silent_noop() {
        let mut events = EventSystem::new();
        events.trigger_event("nothing_here", EventData::new());
    }

    #[test]
    fn scheduled_events_fire_in_trigger_order() {
        let mut events = EventSystem::new();
        let order: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let order_a = order.clone();
        events.add_listener("a", Box::new(move |n, _| order_a.lock().unwrap().push(n.to_owned())));
        let order_b = order.clone();
        events.add_listener("b", Box::new(move |n, _| order_b.lock().unwrap().push(n.to_owned())));

        events.schedule_event("b", 2.0, 0.0, EventData::new());
        events.schedule_event("a", 1.0, 0.0, EventData::new());

        events.process_tick(0.5);
        assert!(order.lock().unwrap().is_empty());

        events.process_tick(3.0);
        assert_eq!(*order.lock().unwrap(), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(events.pending_count(), 0);
    }

    #[test]
    fn cancel_scheduled_events_drops_pending_occurrences() {
        let mut events = EventSystem::new();
        events.schedule_event("x", 1.0, 0.0, EventData::new());
        events.schedule_event("x", 2.0, 0.0, EventData::new());
        events.cancel_scheduled_events("x");
        assert_eq!(events.pending_count(), 0);
    }
}
