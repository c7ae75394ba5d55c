//! Unit instances

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use strum::Display;

use super::player::PlayerIndex;
use super::unit_type::UnitTypeId;
use super::variable::{VarIndex, VariableStore};
use crate::magic::SpellSlot;
use crate::world::TilePos;

/// Weak handle to a unit
///
/// The generation changes every time a slot is reused, so a handle to a
/// released unit never resolves to whatever took its slot. Resolve through
/// `World::unit` before every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl UnitId {
    pub fn slot(self) -> usize {
        self.index as usize
    }
}

impl core::fmt::Display for UnitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// What a unit is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum UnitAction {
    #[default]
    Still,
    SpellCast,
    /// Dead, lingering as a corpse
    Die,
}

/// A pending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    SpellCast {
        spell: SpellSlot,
        target: Option<UnitId>,
        goal_pos: TilePos,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub type_id: UnitTypeId,
    pub owner: PlayerIndex,
    /// Top-left tile of the footprint
    pub tile_pos: TilePos,
    pub variables: VariableStore,
    pub action: UnitAction,
    /// Not on the map (inside a transporter, being transformed, ...)
    pub removed: bool,
    /// Gone from the game but not yet released
    pub destroyed: bool,
    /// Linked unit, e.g. the exit of a portal
    pub goal: Option<UnitId>,
    /// Game cycle at which a summoned unit expires
    pub ttl: Option<u64>,
    /// Game cycle at which the unit started dying
    pub death_cycle: Option<u64>,
    pub orders: VecDeque<Order>,
    /// Spells this unit casts on its own when idle
    pub autocast: Vec<SpellSlot>,
}

impl Unit {
    pub(crate) fn new(id: UnitId, type_id: UnitTypeId, owner: PlayerIndex, variables: VariableStore) -> Self {
        Self {
            id,
            type_id,
            owner,
            tile_pos: TilePos::default(),
            variables,
            action: UnitAction::Still,
            removed: true,
            destroyed: false,
            goal: None,
            ttl: None,
            death_cycle: None,
            orders: VecDeque::new(),
            autocast: Vec::new(),
        }
    }

    /// On the map, not destroyed and not dying
    pub fn is_alive(&self) -> bool {
        !self.removed && !self.destroyed && self.action != UnitAction::Die
    }

    pub fn is_dying(&self) -> bool {
        self.action == UnitAction::Die
    }

    pub fn var(&self, index: VarIndex) -> i32 {
        self.variables.value(index)
    }

    pub fn hit_points(&self) -> i32 {
        self.var(VarIndex::HIT_POINTS)
    }

    pub fn mana(&self) -> i32 {
        self.var(VarIndex::MANA)
    }

    pub fn is_idle(&self) -> bool {
        self.orders.is_empty() && self.action == UnitAction::Still
    }
}
