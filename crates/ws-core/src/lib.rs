//! ws-core: spell-casting engine for the warspell simulation
//!
//! This crate holds the spell rule engine (conditions, effect actions,
//! autocast target selection, cast sequencing and the spell registry)
//! together with the small simulation services it runs against: the unit
//! store, the tile map, missiles, sound cues and the command queue.
//!
//! Everything here runs inside a single deterministic simulation step. The
//! only source of randomness is [`SyncRng`], which every participant of a
//! networked session must share and consume identically.

pub mod magic;
pub mod unit;
pub mod world;

mod consts;
mod rng;
mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use consts::*;
pub use rng::SyncRng;
pub use session::{Session, StepReport};
