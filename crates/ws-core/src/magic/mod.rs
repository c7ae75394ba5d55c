//! Spell engine
//!
//! Conditions gate a cast, actions apply its effects, the cast sequencer
//! ties them together and autocast picks targets for idle casters. Spell
//! definitions live in a [`SpellRegistry`], loaded once from a spell book.

pub mod action;
pub mod autocast;
pub mod condition;
pub mod loader;

mod cast;
mod registry;
mod spell;

pub use action::{CastAction, SpellAction};
pub use autocast::{AutoCastInfo, auto_cast_spell, select_target, spell_is_available};
pub use cast::spell_cast;
pub use condition::{ConditionInfo, FlagRequirement, Tristate, VariableCondition, can_cast_spell, pass_condition};
pub use loader::{SpellLoadError, load_spell_book, load_spell_book_file};
pub use registry::SpellRegistry;
pub use spell::{SpellSlot, SpellType, Target, TargetKind};

use crate::rng::SyncRng;
use crate::world::World;

/// Everything a spell action may touch during a cast
pub struct CastContext<'a> {
    pub world: &'a mut World,
    pub rng: &'a mut SyncRng,
}

impl<'a> CastContext<'a> {
    pub fn new(world: &'a mut World, rng: &'a mut SyncRng) -> Self {
        Self { world, rng }
    }
}
