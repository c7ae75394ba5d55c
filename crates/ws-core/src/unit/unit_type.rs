//! Unit type templates
//!
//! A unit type is the static description every unit instance is made
//! from: footprint, movement layer, capability flags and base stats.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::variable::{UnitVariable, VarIndex, VariableStore};
use crate::magic::SpellSlot;

/// Index of a unit type in the world's type table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitTypeId(pub u16);

/// Movement layer a unit occupies
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MovementKind {
    #[default]
    Land,
    Fly,
    Naval,
}

bitflags! {
    /// Capability flags of a unit type, tested by spell conditions
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct UnitTypeFlags: u32 {
        const ORGANIC = 0x0001;
        const UNDEAD = 0x0002;
        const MECHANICAL = 0x0004;
        const HERO = 0x0008;
        const VOLATILE = 0x0010;
        const CASTER = 0x0020;
        const SUMMONED = 0x0040;
        const ISOLATED = 0x0080;
    }
}

// Manual serde for UnitTypeFlags
impl Serialize for UnitTypeFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UnitTypeFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(UnitTypeFlags::from_bits_truncate(bits))
    }
}

/// Static description of a kind of unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitType {
    /// Assigned when the type is defined in a world
    pub id: UnitTypeId,
    /// Identifier used by data files (e.g. "unit-mage")
    pub ident: String,
    /// Display name
    pub name: String,
    /// Footprint in tiles
    pub tile_width: i32,
    pub tile_height: i32,
    pub movement: MovementKind,
    pub building: bool,
    /// Cowards never count as a threat for autocast combat detection
    pub coward: bool,
    pub flags: UnitTypeFlags,
    /// Base variables copied into every new unit
    pub stats: VariableStore,
    /// Spells units of this type know
    pub can_cast: Vec<SpellSlot>,
}

impl UnitType {
    pub fn new(ident: &str, name: &str) -> Self {
        Self {
            id: UnitTypeId(0),
            ident: ident.to_string(),
            name: name.to_string(),
            tile_width: 1,
            tile_height: 1,
            movement: MovementKind::Land,
            building: false,
            coward: false,
            flags: UnitTypeFlags::empty(),
            stats: VariableStore::default(),
            can_cast: Vec::new(),
        }
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    pub fn with_movement(mut self, movement: MovementKind) -> Self {
        self.movement = movement;
        self
    }

    pub fn as_building(mut self) -> Self {
        self.building = true;
        self
    }

    pub fn as_coward(mut self) -> Self {
        self.coward = true;
        self
    }

    pub fn with_flags(mut self, flags: UnitTypeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set a base variable (value and max), enabled
    pub fn with_variable(mut self, index: VarIndex, value: i32, max: i32) -> Self {
        self.stats.set(index, UnitVariable::new(value, max));
        self
    }

    /// Check the type's flags against a required/forbidden pair
    pub fn check_flags(&self, required: UnitTypeFlags, forbidden: UnitTypeFlags) -> bool {
        self.flags.contains(required) && !self.flags.intersects(forbidden)
    }

    pub fn knows_spell(&self, slot: SpellSlot) -> bool {
        self.can_cast.contains(&slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_stats() {
        let mage = UnitType::new("unit-mage", "Mage")
            .with_variable(VarIndex::HIT_POINTS, 60, 60)
            .with_variable(VarIndex::MANA, 50, 255)
            .with_flags(UnitTypeFlags::ORGANIC | UnitTypeFlags::CASTER);

        assert_eq!(mage.stats[VarIndex::MANA].max, 255);
        assert!(mage.stats[VarIndex::HIT_POINTS].enable);
        assert_eq!(mage.tile_width, 1);
    }

    #[test]
    fn test_check_flags() {
        let skeleton = UnitType::new("unit-skeleton", "Skeleton").with_flags(UnitTypeFlags::UNDEAD);

        assert!(skeleton.check_flags(UnitTypeFlags::UNDEAD, UnitTypeFlags::empty()));
        assert!(!skeleton.check_flags(UnitTypeFlags::ORGANIC, UnitTypeFlags::empty()));
        assert!(!skeleton.check_flags(UnitTypeFlags::empty(), UnitTypeFlags::UNDEAD));
    }

    #[test]
    fn test_flag_names_resolve() {
        assert_eq!(UnitTypeFlags::from_name("ORGANIC"), Some(UnitTypeFlags::ORGANIC));
        assert_eq!(UnitTypeFlags::from_name("organic"), None);
    }

    #[test]
    fn test_movement_kind_parses() {
        assert_eq!("fly".parse::<MovementKind>().unwrap(), MovementKind::Fly);
        assert_eq!(MovementKind::Naval.to_string(), "naval");
    }
}
