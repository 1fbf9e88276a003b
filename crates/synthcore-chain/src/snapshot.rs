//! Lock-free publishing of the chain's processing order and enabled mask.
//!
//! Mirrors the `slots`/`order` `ArcSwap` fields in the teacher's CLAP plugin
//! bridge: the audio thread never locks to learn what the control thread
//! just did, it loads the latest published [`ChainSnapshot`].

use std::sync::Arc;

use arc_swap::ArcSwap;

/// A single entry's public metadata as of the last structural mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSnapshot {
    /// Registry type name the effect was created from (e.g. `"reverb"`).
    pub type_name: String,
    /// Whether the entry currently participates in processing.
    pub enabled: bool,
}

/// Coherent view of chain order and enablement, published as a unit.
///
/// `order[i]` is the entry's position; `slots` is indexed the same way.
/// Readers that only need to know "what's in the chain and is it on"
/// (a GUI thread, a preset exporter) load this instead of touching the
/// effect objects themselves, which stay exclusively owned by whichever
/// thread calls [`crate::ReorderableChain::process`].
#[derive(Debug, Clone, Default)]
pub struct ChainSnapshot {
    /// Entries in current processing order.
    pub slots: Vec<SlotSnapshot>,
}

impl ChainSnapshot {
    fn empty() -> Self {
        Self { slots: Vec::new() }
    }
}

/// Cheap, cloneable, lock-free handle onto a chain's published snapshot.
///
/// Clone this and hand it to any reader thread; it never blocks the
/// control or audio thread that owns the real [`crate::ReorderableChain`].
#[derive(Clone)]
pub struct ChainHandle {
    pub(crate) inner: Arc<ArcSwap<ChainSnapshot>>,
}

impl ChainHandle {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(ChainSnapshot::empty())),
        }
    }

    /// Load the most recently published snapshot (wait-free).
    pub fn load(&self) -> Arc<ChainSnapshot> {
        self.inner.load_full()
    }

    pub(crate) fn publish(&self, snapshot: ChainSnapshot) {
        self.inner.store(Arc::new(snapshot));
    }
}
