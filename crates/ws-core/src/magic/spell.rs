//! Spell definitions
//!
//! A [`SpellType`] is static data: created when a spell book is loaded and
//! never mutated afterwards. Units refer to spells by [`SpellSlot`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::action::{CastAction, SpellAction};
use super::autocast::AutoCastInfo;
use super::condition::ConditionInfo;
use crate::unit::{UnitId, UpgradeId};
use crate::world::TilePos;

/// Dense index of a spell in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpellSlot(pub u16);

impl SpellSlot {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for SpellSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a spell is aimed at
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TargetKind {
    /// The caster itself
    #[serde(rename = "self")]
    #[strum(serialize = "self")]
    SelfCast,
    /// Another unit
    #[default]
    Unit,
    /// A map tile
    Position,
}

/// A chosen target: a unit with its last known tile, or a bare tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Unit { unit: UnitId, pos: TilePos },
    Position(TilePos),
}

impl Target {
    pub fn unit(&self) -> Option<UnitId> {
        match self {
            Target::Unit { unit, .. } => Some(*unit),
            Target::Position(_) => None,
        }
    }

    pub fn pos(&self) -> TilePos {
        match self {
            Target::Unit { pos, .. } | Target::Position(pos) => *pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpellType {
    /// Identifier used by data files (e.g. "spell-healing")
    pub ident: String,
    pub name: String,
    pub slot: SpellSlot,
    pub target: TargetKind,
    pub mana_cost: i32,
    /// Cast range in tiles
    pub range: i32,
    /// Cast again right after a successful cast while the gate still passes
    pub repeat_cast: bool,
    /// Upgrade that must be researched before the spell is available
    pub dependency: Option<UpgradeId>,
    /// Effects, run left to right
    pub actions: Vec<SpellAction>,
    pub condition: Option<ConditionInfo>,
    pub autocast: Option<AutoCastInfo>,
    /// Autocast settings used instead of `autocast` for AI players
    pub ai_cast: Option<AutoCastInfo>,
    pub sound_when_cast: Option<String>,
}

impl SpellType {
    pub fn new(ident: &str, name: &str, target: TargetKind) -> Self {
        Self {
            ident: ident.to_string(),
            name: name.to_string(),
            slot: SpellSlot(0),
            target,
            mana_cost: 0,
            range: 0,
            repeat_cast: false,
            dependency: None,
            actions: Vec::new(),
            condition: None,
            autocast: None,
            ai_cast: None,
            sound_when_cast: None,
        }
    }

    pub fn with_mana_cost(mut self, mana_cost: i32) -> Self {
        self.mana_cost = mana_cost;
        self
    }

    pub fn with_range(mut self, range: i32) -> Self {
        self.range = range;
        self
    }

    pub fn with_repeat_cast(mut self) -> Self {
        self.repeat_cast = true;
        self
    }

    pub fn with_dependency(mut self, upgrade: UpgradeId) -> Self {
        self.dependency = Some(upgrade);
        self
    }

    pub fn with_action(mut self, action: impl Into<SpellAction>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn with_condition(mut self, condition: ConditionInfo) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_autocast(mut self, autocast: AutoCastInfo) -> Self {
        self.autocast = Some(autocast);
        self
    }

    pub fn with_ai_cast(mut self, ai_cast: AutoCastInfo) -> Self {
        self.ai_cast = Some(ai_cast);
        self
    }

    pub fn with_sound(mut self, sound: &str) -> Self {
        self.sound_when_cast = Some(sound.to_string());
        self
    }

    /// Whether some action does its own mana accounting
    pub fn manages_own_mana(&self) -> bool {
        self.actions.iter().any(CastAction::modifies_caster_mana)
    }
}
