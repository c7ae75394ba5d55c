//! Spell actions
//!
//! Each archetype of effect is its own struct implementing [`CastAction`];
//! [`SpellAction`] is the tagged union stored in a spell definition. The
//! boolean an action returns tells the sequencer whether a repeat-cast
//! spell may go on.

mod area;
mod missile;
mod summon;
mod transform;
mod vitals;

pub use area::{AreaAdjustVitals, AreaBombardment, Demolish};
pub use missile::{LocationBase, MissileLocation, SpawnMissile};
pub use summon::{SpawnPortal, Summon};
pub use transform::{Capture, Polymorph, PolymorphOwner};
pub use vitals::{AdjustVariable, AdjustVitals, VariableAdjustment};

use super::CastContext;
use super::spell::SpellType;
use crate::unit::{UnitId, VarIndex};
use crate::world::{TilePos, World};

/// One effect of a spell
pub trait CastAction {
    /// Apply the effect; returns whether a repeat-cast may continue
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        spell: &SpellType,
        target: Option<UnitId>,
        goal_pos: TilePos,
    ) -> bool;

    /// Whether the action charges the caster's mana itself
    fn modifies_caster_mana(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpellAction {
    Demolish(Demolish),
    SpawnPortal(SpawnPortal),
    AreaAdjustVitals(AreaAdjustVitals),
    AreaBombardment(AreaBombardment),
    SpawnMissile(SpawnMissile),
    AdjustVariable(AdjustVariable),
    AdjustVitals(AdjustVitals),
    Polymorph(Polymorph),
    Capture(Capture),
    Summon(Summon),
}

impl SpellAction {
    /// Name used by spell books
    pub fn name(&self) -> &'static str {
        match self {
            SpellAction::Demolish(_) => "demolish",
            SpellAction::SpawnPortal(_) => "spawn-portal",
            SpellAction::AreaAdjustVitals(_) => "area-adjust-vitals",
            SpellAction::AreaBombardment(_) => "area-bombardment",
            SpellAction::SpawnMissile(_) => "spawn-missile",
            SpellAction::AdjustVariable(_) => "adjust-variable",
            SpellAction::AdjustVitals(_) => "adjust-vitals",
            SpellAction::Polymorph(_) => "polymorph",
            SpellAction::Capture(_) => "capture",
            SpellAction::Summon(_) => "summon",
        }
    }

    fn as_action(&self) -> &dyn CastAction {
        match self {
            SpellAction::Demolish(a) => a,
            SpellAction::SpawnPortal(a) => a,
            SpellAction::AreaAdjustVitals(a) => a,
            SpellAction::AreaBombardment(a) => a,
            SpellAction::SpawnMissile(a) => a,
            SpellAction::AdjustVariable(a) => a,
            SpellAction::AdjustVitals(a) => a,
            SpellAction::Polymorph(a) => a,
            SpellAction::Capture(a) => a,
            SpellAction::Summon(a) => a,
        }
    }
}

impl CastAction for SpellAction {
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        spell: &SpellType,
        target: Option<UnitId>,
        goal_pos: TilePos,
    ) -> bool {
        self.as_action().cast(ctx, caster, spell, target, goal_pos)
    }

    fn modifies_caster_mana(&self) -> bool {
        self.as_action().modifies_caster_mana()
    }
}

macro_rules! impl_from_action {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for SpellAction {
                fn from(action: $variant) -> Self {
                    SpellAction::$variant(action)
                }
            }
        )*
    };
}

impl_from_action!(
    Demolish,
    SpawnPortal,
    AreaAdjustVitals,
    AreaBombardment,
    SpawnMissile,
    AdjustVariable,
    AdjustVitals,
    Polymorph,
    Capture,
    Summon
);

/// Take mana from a unit, stopping at zero
pub(crate) fn debit_mana(world: &mut World, unit: UnitId, amount: i32) {
    if let Some(mana) = world
        .unit_mut(unit)
        .and_then(|u| u.variables.get_mut(VarIndex::MANA))
    {
        mana.debit(amount);
    }
}
