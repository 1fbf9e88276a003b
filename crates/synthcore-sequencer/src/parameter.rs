//! Named continuous parameter with change notification, mirroring
//! `AdaptiveSequencer.h`'s `Parameter` class: a bounded float with a
//! default, an optional bipolar flag, and a callback fired on every
//! `set_value`.

/// `callback(name, old_value, new_value)`.
pub type ParamChangeCallback = Box<dyn FnMut(&str, f32, f32) + Send>;

/// A bounded, named float driving transition conditions and morph
/// targets.
pub struct Parameter {
    name: String,
    value: f32,
    min: f32,
    max: f32,
    default: f32,
    bipolar: bool,
    on_change: Option<ParamChangeCallback>,
}

impl Parameter {
    /// Create a parameter clamped to `[min, max]`, starting at `default`.
    pub fn new(name: impl Into<String>, default: f32, min: f32, max: f32) -> Self {
        let default = default.clamp(min, max);
        Self {
            name: name.into(),
            value: default,
            min,
            max,
            default,
            bipolar: false,
            on_change: None,
        }
    }

    /// The parameter's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Set the value, clamping to `[min, max]` and invoking the change
    /// callback if one is registered and the value actually changed.
    pub fn set_value(&mut self, value: f32) {
        let clamped = value.clamp(self.min, self.max);
        if clamped == self.value {
            return;
        }
        let old = self.value;
        self.value = clamped;
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.name, old, clamped);
        }
    }

    /// Lower bound.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// The value this parameter was created with.
    pub fn default(&self) -> f32 {
        self.default
    }

    /// Whether this parameter is treated as bipolar (centered at 0)
    /// rather than unipolar, a UI/modulation-routing hint.
    pub fn is_bipolar(&self) -> bool {
        self.bipolar
    }

    /// Mark this parameter as bipolar or unipolar.
    pub fn set_bipolar(&mut self, bipolar: bool) {
        self.bipolar = bipolar;
    }

    /// Register the change callback, replacing any previous one.
    pub fn set_change_callback(&mut self, callback: ParamChangeCallback) {
        self.on_change = Some(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn set_value_clamps_to_bounds() {
        let mut p = Parameter::new("cutoff", 0.5, 0.0, 1.0);
        p.set_value(5.0);
        assert_eq!(p.value(), 1.0);
        p.set_value(-5.0);
        assert_eq!(p.value(), 0.0);
    }

    #[test]
    fn change_callback_fires_with_old_and_new() {
        let mut p = Parameter::new("intensity", 0.0, 0.0, 1.0);
        let seen: Arc<Mutex<Vec<(f32, f32)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();
        p.set_change_callback(Box::new(move |_name, old, new| {
            seen_cb.lock().unwrap().push((old, new));
        }));
        p.set_value(0.8);
        assert_eq!(*seen.lock().unwrap(), vec![(0.0, 0.8)]);
    }

    #[test]
    fn unchanged_value_does_not_invoke_callback() {
        let mut p = Parameter::new("x", 0.5, 0.0, 1.0);
        let calls = Arc::new(Mutex::new(0u32));
        let calls_cb = calls.clone();
        p.set_change_callback(Box::new(move |_n, _old, _new| {
            *calls_cb.lock().unwrap() += 1;
        }));
        p.set_value(0.5);
        assert_eq!(*calls.lock().unwrap(), 0);
    }
}
