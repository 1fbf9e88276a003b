//! Sixteen-channel multi-timbral engine (C5): split/layer note routing,
//! voice-budget allocation across channels, and the equal-power-pan
//! render mix described in `spec.md` §4.5, generalized from the
//! teacher's `sonido-synth` setter/broadcast style and
//! `original_source/include/synthesis/multitimbral/MultiTimbralEngine.h`.

use std::collections::HashMap;
use std::f32::consts::PI;

use crate::channel::ChannelSynthesizer;

/// Number of MIDI channels a [`MultiTimbralEngine`] always holds.
pub const CHANNEL_COUNT: usize = 16;

/// How the engine divides `max_total_voices` across active channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceBudgetStrategy {
    /// `floor(total / active_count)` each; remainder to lowest-indexed
    /// active channels.
    Equal,
    /// Proportional to channel priority; each active channel guaranteed
    /// at least one voice; remainder to the highest-priority channels.
    PriorityBased,
    /// Behaviorally equivalent to [`Equal`](Self::Equal); implementations
    /// may bias by recent activity, which this one does not.
    Dynamic,
}

#[derive(Debug, Clone, Copy)]
struct ChannelConfig {
    active: bool,
    volume: f32,
    pan: f32,
    priority: i32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { active: true, volume: 1.0, pan: 0.0, priority: 0 }
    }
}

/// Split-keyboard routing: notes below `split_point` go to `lower_channel`,
/// the rest to `upper_channel`.
#[derive(Debug, Clone, Copy)]
pub struct SplitConfig {
    /// Whether split routing is active.
    pub enabled: bool,
    /// MIDI pitch at which routing switches from lower to upper.
    pub split_point: u8,
    /// Channel index used below `split_point`.
    pub lower_channel: usize,
    /// Channel index used at or above `split_point`.
    pub upper_channel: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { enabled: false, split_point: 60, lower_channel: 0, upper_channel: 1 }
    }
}

/// Layer routing: multicasts note events to every channel in `channels`.
#[derive(Debug, Clone, Default)]
pub struct LayerConfig {
    /// Whether layer routing is active.
    pub enabled: bool,
    /// Channels every routed note event is multicast to.
    pub channels: Vec<usize>,
}

/// Holds sixteen [`ChannelSynthesizer`]s, per-channel config, split/layer
/// note routing, and the voice-budget allocator that keeps their combined
/// voice counts within `max_total_voices`.
pub struct MultiTimbralEngine {
    channels: Vec<ChannelSynthesizer>,
    configs: [ChannelConfig; CHANNEL_COUNT],
    split: SplitConfig,
    layer: LayerConfig,
    max_total_voices: usize,
    strategy: VoiceBudgetStrategy,
    master_volume: f32,
    sample_rate: f32,
}

impl MultiTimbralEngine {
    /// Create an engine with all sixteen channels active, unity volume,
    /// centered pan, equal priority, and a default voice budget of 64.
    pub fn new(sample_rate: f32) -> Self {
        let channels = (0..CHANNEL_COUNT).map(|_| ChannelSynthesizer::new(sample_rate)).collect();
        let mut engine = Self {
            channels,
            configs: [ChannelConfig::default(); CHANNEL_COUNT],
            split: SplitConfig::default(),
            layer: LayerConfig::default(),
            max_total_voices: 64,
            strategy: VoiceBudgetStrategy::Equal,
            master_volume: 1.0,
            sample_rate,
        };
        engine.reallocate_voice_budget();
        engine
    }

    /// Read access to a channel, if `index` is valid.
    pub fn channel(&self, index: usize) -> Option<&ChannelSynthesizer> {
        self.channels.get(index)
    }

    /// Mutable access to a channel, if `index` is valid.
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut ChannelSynthesizer> {
        self.channels.get_mut(index)
    }

    /// Set whether channel `index` participates in rendering and voice
    /// budget allocation.
    pub fn set_channel_active(&mut self, index: usize, active: bool) {
        if let Some(cfg) = self.configs.get_mut(index) {
            cfg.active = active;
            self.reallocate_voice_budget();
        }
    }

    /// Set channel `index`'s output volume, clamped to `[0, 1]`.
    pub fn set_channel_volume(&mut self, index: usize, volume: f32) {
        if let Some(cfg) = self.configs.get_mut(index) {
            cfg.volume = volume.clamp(0.0, 1.0);
        }
    }

    /// Set channel `index`'s pan, clamped to `[-1, 1]` (-1 = left, 1 = right).
    pub fn set_channel_pan(&mut self, index: usize, pan: f32) {
        if let Some(cfg) = self.configs.get_mut(index) {
            cfg.pan = pan.clamp(-1.0, 1.0);
        }
    }

    /// Set channel `index`'s priority, used by [`VoiceBudgetStrategy::PriorityBased`].
    pub fn set_channel_priority(&mut self, index: usize, priority: i32) {
        if let Some(cfg) = self.configs.get_mut(index) {
            cfg.priority = priority;
            self.reallocate_voice_budget();
        }
    }

    /// Configure split-keyboard routing.
    pub fn set_split(&mut self, split: SplitConfig) {
        self.split = split;
    }

    /// Configure layer routing.
    pub fn set_layer(&mut self, layer: LayerConfig) {
        self.layer = layer;
    }

    /// Set the total voice budget shared across all active channels.
    pub fn set_max_total_voices(&mut self, max_total_voices: usize) {
        self.max_total_voices = max_total_voices.max(CHANNEL_COUNT);
        self.reallocate_voice_budget();
    }

    /// Set the voice-budget allocation strategy.
    pub fn set_voice_budget_strategy(&mut self, strategy: VoiceBudgetStrategy) {
        self.strategy = strategy;
        self.reallocate_voice_budget();
    }

    /// Set master output volume, clamped to `[0, 1]`.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    /// Update the sample rate of every channel.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for ch in &mut self.channels {
            ch.set_sample_rate(sample_rate);
        }
    }

    fn active_channel_indices(&self) -> Vec<usize> {
        (0..CHANNEL_COUNT).filter(|&i| self.configs[i].active).collect()
    }

    fn reallocate_voice_budget(&mut self) {
        let active = self.active_channel_indices();
        if active.is_empty() {
            return;
        }

        let counts = match self.strategy {
            VoiceBudgetStrategy::Equal | VoiceBudgetStrategy::Dynamic => {
                self.equal_voice_counts(&active)
            }
            VoiceBudgetStrategy::PriorityBased => self.priority_voice_counts(&active),
        };

        for (&idx, &count) in active.iter().zip(counts.iter()) {
            self.channels[idx].set_voice_count(count.max(1));
        }
    }

    fn equal_voice_counts(&self, active: &[usize]) -> Vec<usize> {
        let n = active.len();
        let base = self.max_total_voices / n;
        let remainder = self.max_total_voices % n;
        (0..n).map(|i| base + usize::from(i < remainder)).collect()
    }

    fn priority_voice_counts(&self, active: &[usize]) -> Vec<usize> {
        let n = active.len();
        let total = self.max_total_voices;
        let guaranteed = n; // each active channel gets >= 1
        if total <= guaranteed {
            return vec![1; n];
        }

        let remaining = total - guaranteed;
        let priority_sum: i64 =
            active.iter().map(|&i| (self.configs[i].priority.max(0) + 1) as i64).sum();

        let mut counts: Vec<usize> = active
            .iter()
            .map(|&i| {
                let weight = (self.configs[i].priority.max(0) + 1) as i64;
                1 + (weight * remaining as i64 / priority_sum.max(1)) as usize
            })
            .collect();

        // Distribute any leftover (from integer division) to the
        // highest-priority channels.
        let mut allocated: usize = counts.iter().sum();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.configs[active[i]].priority));
        let mut k = 0;
        while allocated < total && k < order.len() {
            counts[order[k]] += 1;
            allocated += 1;
            k += 1;
            if k == order.len() {
                k = 0;
            }
        }
        counts
    }

    fn routed_channels(&self, pitch: u8) -> Vec<usize> {
        if self.split.enabled {
            let idx = if pitch < self.split.split_point {
                self.split.lower_channel
            } else {
                self.split.upper_channel
            };
            vec![idx]
        } else if self.layer.enabled {
            self.layer.channels.clone()
        } else {
            Vec::new()
        }
    }

    /// Trigger a note on `channel`, subject to split/layer routing.
    /// Invalid pitches/velocities are clamped; an invalid `channel` is
    /// silently ignored.
    pub fn note_on(&mut self, channel: usize, pitch: u8, velocity: f32) {
        let velocity = velocity.clamp(0.0, 1.0);
        let routed = self.routed_channels(pitch);
        let targets: Vec<usize> = if routed.is_empty() { vec![channel] } else { routed };
        for idx in targets {
            if let Some(ch) = self.channels.get_mut(idx) {
                ch.note_on(pitch, velocity);
            }
        }
    }

    /// Release a note on `channel`, subject to the same routing as
    /// [`note_on`](Self::note_on).
    pub fn note_off(&mut self, channel: usize, pitch: u8) {
        let routed = self.routed_channels(pitch);
        let targets: Vec<usize> = if routed.is_empty() { vec![channel] } else { routed };
        for idx in targets {
            if let Some(ch) = self.channels.get_mut(idx) {
                ch.note_off(pitch);
            }
        }
    }

    /// Handle a control-change message on the exact channel given
    /// (routing does not apply to channel-scoped events other than
    /// note on/off).
    pub fn control_change(&mut self, channel: usize, controller: u8, value: f32) {
        if let Some(ch) = self.channels.get_mut(channel) {
            ch.process_cc(controller, value);
        }
    }

    /// Set pitch bend, `[-1, 1]`, on the exact channel given.
    pub fn pitch_bend(&mut self, channel: usize, value: f32) {
        if let Some(ch) = self.channels.get_mut(channel) {
            ch.set_pitch_bend(value);
        }
    }

    /// Per-note aftertouch. This engine applies it as a volume-style CC
    /// on the target channel (no per-voice pressure destination exists
    /// below the channel level).
    pub fn aftertouch(&mut self, channel: usize, _pitch: u8, pressure: f32) {
        if let Some(ch) = self.channels.get_mut(channel) {
            ch.process_cc(1, pressure.clamp(0.0, 1.0));
        }
    }

    /// Channel (monophonic) pressure, on the exact channel given.
    pub fn channel_pressure(&mut self, channel: usize, pressure: f32) {
        if let Some(ch) = self.channels.get_mut(channel) {
            ch.process_cc(1, pressure.clamp(0.0, 1.0));
        }
    }

    /// Program change, on the exact channel given.
    pub fn program_change(&mut self, channel: usize, program: u8) {
        if let Some(ch) = self.channels.get_mut(channel) {
            ch.program_change(program);
        }
    }

    /// Release every voice on every channel.
    pub fn all_notes_off(&mut self) {
        for ch in &mut self.channels {
            ch.all_notes_off();
        }
    }

    /// Export every channel's CC/program/transposition state alongside
    /// engine-level master volume, as flat `name -> value` pairs, for
    /// preset persistence.
    pub fn export_parameters(&self) -> HashMap<String, f32> {
        let mut map = HashMap::new();
        map.insert("master_volume".to_string(), self.master_volume);
        for (i, cfg) in self.configs.iter().enumerate() {
            map.insert(format!("channel{i}.volume"), cfg.volume);
            map.insert(format!("channel{i}.pan"), cfg.pan);
            map.insert(format!("channel{i}.active"), if cfg.active { 1.0 } else { 0.0 });
        }
        map
    }

    /// Apply a flat `name -> value` map produced by
    /// [`export_parameters`](Self::export_parameters).
    pub fn apply_parameters(&mut self, map: &HashMap<String, f32>) {
        if let Some(&v) = map.get("master_volume") {
            self.set_master_volume(v);
        }
        for i in 0..CHANNEL_COUNT {
            if let Some(&v) = map.get(&format!("channel{i}.volume")) {
                self.set_channel_volume(i, v);
            }
            if let Some(&v) = map.get(&format!("channel{i}.pan")) {
                self.set_channel_pan(i, v);
            }
            if let Some(&v) = map.get(&format!("channel{i}.active")) {
                self.set_channel_active(i, v >= 0.5);
            }
        }
    }

    /// Render all active channels into interleaved stereo `buffer`
    /// (cleared first), applying the per-channel overflow-avoidance
    /// normalization, equal-power pan, and master volume from `spec.md`
    /// §4.5.
    pub fn render(&mut self, buffer: &mut [f32], frames: usize) {
        buffer[..frames * 2].fill(0.0);

        let active = self.active_channel_indices();
        if active.is_empty() {
            return;
        }
        let norm = 1.0 / (active.len() as f32).sqrt();

        let mut scratch = vec![0.0f32; frames * 2];
        for idx in active {
            scratch.fill(0.0);
            self.channels[idx].render(&mut scratch, frames);

            let cfg = self.configs[idx];
            let gain = cfg.volume * norm;
            let angle = (cfg.pan + 1.0) * PI / 4.0;
            let (l_gain, r_gain) = (angle.cos(), angle.sin());

            for frame in 0..frames {
                buffer[frame * 2] += scratch[frame * 2] * gain * l_gain;
                buffer[frame * 2 + 1] += scratch[frame * 2 + 1] * gain * r_gain;
            }
        }

        for sample in buffer[..frames * 2].iter_mut() {
            *sample *= self.master_volume;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strategy_distributes_remainder_to_lowest_indices() {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        for i in 2..CHANNEL_COUNT {
            engine.set_channel_active(i, false);
        }
        engine.set_max_total_voices(17);
        // 2 active channels, 17 voices -> 9 to channel 0, 8 to channel 1.
        assert_eq!(engine.channel(0).unwrap().voice_count(), 9);
        assert_eq!(engine.channel(1).unwrap().voice_count(), 8);
    }

    #[test]
    fn priority_strategy_guarantees_each_active_channel_one_voice() {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        engine.set_voice_budget_strategy(VoiceBudgetStrategy::PriorityBased);
        engine.set_channel_priority(0, 1000);
        engine.set_max_total_voices(CHANNEL_COUNT);
        // Every channel active, budget equals channel count: everyone gets
        // the guaranteed floor of 1 regardless of priority skew.
        for i in 0..CHANNEL_COUNT {
            assert_eq!(engine.channel(i).unwrap().voice_count(), 1);
        }
    }

    #[test]
    fn priority_strategy_favors_higher_priority_channel_with_surplus() {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        engine.set_voice_budget_strategy(VoiceBudgetStrategy::PriorityBased);
        engine.set_channel_priority(0, 1000);
        engine.set_max_total_voices(32);
        assert!(engine.channel(0).unwrap().voice_count() > engine.channel(1).unwrap().voice_count());
        let total: usize = (0..CHANNEL_COUNT).map(|i| engine.channel(i).unwrap().voice_count()).sum();
        assert!(total <= 32);
    }

    #[test]
    fn split_routes_low_and_high_notes_to_different_channels() {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        engine.set_split(SplitConfig {
            enabled: true,
            split_point: 60,
            lower_channel: 2,
            upper_channel: 3,
        });
        engine.note_on(0, 40, 1.0);
        engine.note_on(0, 80, 1.0);
        assert_eq!(engine.channel(2).unwrap().active_voice_count(), 1);
        assert_eq!(engine.channel(3).unwrap().active_voice_count(), 1);
        assert_eq!(engine.channel(0).unwrap().active_voice_count(), 0);
    }

    #[test]
    fn layer_multicasts_to_every_configured_channel() {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        engine.set_layer(LayerConfig { enabled: true, channels: vec![1, 2, 3] });
        engine.note_on(0, 60, 1.0);
        for ch in [1, 2, 3] {
            assert_eq!(engine.channel(ch).unwrap().active_voice_count(), 1);
        }
        assert_eq!(engine.channel(0).unwrap().active_voice_count(), 0);
    }

    #[test]
    fn unrouted_note_goes_to_its_own_channel() {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        engine.note_on(5, 60, 1.0);
        assert_eq!(engine.channel(5).unwrap().active_voice_count(), 1);
    }

    #[test]
    fn invalid_channel_is_silently_ignored() {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        engine.note_on(999, 60, 1.0);
        engine.control_change(999, 7, 1.0);
    }

    #[test]
    fn render_produces_silence_when_no_channel_active() {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        for i in 0..CHANNEL_COUNT {
            engine.set_channel_active(i, false);
        }
        let mut buf = vec![1.0f32; 256];
        engine.render(&mut buf, 128);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn master_volume_scales_final_output() {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        engine.note_on(0, 69, 1.0);
        engine.set_master_volume(0.0);
        let mut buf = vec![0.0f32; 256];
        engine.render(&mut buf, 128);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn parameters_round_trip_through_export_and_apply() {
        let mut engine = MultiTimbralEngine::new(48_000.0);
        engine.set_channel_volume(3, 0.5);
        engine.set_master_volume(0.25);
        let exported = engine.export_parameters();

        let mut other = MultiTimbralEngine::new(48_000.0);
        other.apply_parameters(&exported);
        assert!((other.export_parameters()["channel3.volume"] - 0.5).abs() < 1e-6);
        assert!((other.export_parameters()["master_volume"] - 0.25).abs() < 1e-6);
    }
}
