//! synthcore-chain - Reorderable stereo effects chain (component C8).
//!
//! Generalizes the teacher's `sonido_config::chain::EffectChain` from a
//! single-type-per-slot mono pedalboard to the stereo
//! [`synthcore_core::EffectModel`] trait used throughout this workspace,
//! and adds the atomic order/enabled-mask snapshot the concurrency model
//! requires: structural mutations (`add`, `remove`, `move_entry`,
//! `set_enabled`) stay ordinary calls on the chain's single owner, but
//! each one republishes a [`ChainSnapshot`] that any other reader can
//! load without locking.
//!
//! ```
//! use synthcore_chain::ReorderableChain;
//!
//! let mut chain = ReorderableChain::new(48_000.0);
//! chain.add("distortion", None);
//! chain.add("reverb", None);
//!
//! let mut buffer = vec![0.0f32; 2 * 128];
//! chain.process(&mut buffer, 128);
//! ```

mod chain;
mod snapshot;

pub use chain::ReorderableChain;
pub use snapshot::{ChainHandle, ChainSnapshot, SlotSnapshot};
