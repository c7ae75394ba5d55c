//! Built-in unit types

use ws_core::unit::{MovementKind, UnitType, UnitTypeFlags, UnitTypeId, VarIndex};
use ws_core::world::World;

/// Static description of a unit type
#[derive(Debug, Clone, Copy)]
pub struct UnitTypeDef {
    pub ident: &'static str,
    pub name: &'static str,
    /// Footprint in tiles
    pub size: (i32, i32),
    pub movement: MovementKind,
    pub building: bool,
    pub coward: bool,
    pub flags: UnitTypeFlags,
    pub hit_points: i32,
    /// Mana capacity, 0 for units without mana
    pub mana: i32,
    /// Score value
    pub points: i32,
}

impl UnitTypeDef {
    const fn new(ident: &'static str, name: &'static str, hit_points: i32, points: i32) -> Self {
        Self {
            ident,
            name,
            size: (1, 1),
            movement: MovementKind::Land,
            building: false,
            coward: false,
            flags: UnitTypeFlags::ORGANIC,
            hit_points,
            mana: 0,
            points,
        }
    }

    const fn caster(mut self, mana: i32) -> Self {
        self.mana = mana;
        self.flags = self.flags.union(UnitTypeFlags::CASTER);
        self
    }

    const fn flags(mut self, flags: UnitTypeFlags) -> Self {
        self.flags = flags;
        self
    }

    const fn flying(mut self) -> Self {
        self.movement = MovementKind::Fly;
        self
    }

    const fn building(mut self, width: i32, height: i32) -> Self {
        self.size = (width, height);
        self.building = true;
        self.flags = UnitTypeFlags::empty();
        self
    }

    const fn coward(mut self) -> Self {
        self.coward = true;
        self
    }

    /// Engine unit type for this definition
    pub fn to_unit_type(&self) -> UnitType {
        let mut unit_type = UnitType::new(self.ident, self.name)
            .with_size(self.size.0, self.size.1)
            .with_movement(self.movement)
            .with_flags(self.flags)
            .with_variable(VarIndex::HIT_POINTS, self.hit_points, self.hit_points)
            .with_variable(VarIndex::MANA, self.mana, self.mana)
            .with_variable(VarIndex::POINTS, self.points, self.points);
        if self.building {
            unit_type = unit_type.as_building();
        }
        if self.coward {
            unit_type = unit_type.as_coward();
        }
        unit_type
    }
}

pub static UNIT_TYPES: &[UnitTypeDef] = &[
    UnitTypeDef::new("unit-peasant", "Peasant", 30, 30),
    UnitTypeDef::new("unit-footman", "Footman", 60, 50),
    UnitTypeDef::new("unit-grunt", "Grunt", 60, 50),
    UnitTypeDef::new("unit-knight", "Knight", 90, 100),
    UnitTypeDef::new("unit-paladin", "Paladin", 90, 110).caster(255),
    UnitTypeDef::new("unit-mage", "Mage", 60, 100).caster(255),
    UnitTypeDef::new("unit-death-knight", "Death knight", 60, 100)
        .caster(255)
        .flags(UnitTypeFlags::UNDEAD.union(UnitTypeFlags::CASTER)),
    UnitTypeDef::new("unit-ogre-mage", "Ogre mage", 90, 110).caster(255),
    UnitTypeDef::new("unit-goblin-sappers", "Goblin sappers", 40, 100)
        .flags(UnitTypeFlags::ORGANIC.union(UnitTypeFlags::VOLATILE)),
    UnitTypeDef::new("unit-critter", "Critter", 5, 1).coward(),
    UnitTypeDef::new("unit-skeleton", "Skeleton", 40, 0)
        .flags(UnitTypeFlags::UNDEAD.union(UnitTypeFlags::SUMMONED)),
    UnitTypeDef::new("unit-daemon", "Daemon", 300, 100)
        .flying()
        .flags(UnitTypeFlags::SUMMONED),
    UnitTypeDef::new("unit-eye-of-vision", "Eye of vision", 100, 0)
        .flying()
        .coward()
        .flags(UnitTypeFlags::SUMMONED.union(UnitTypeFlags::ISOLATED)),
    UnitTypeDef::new("unit-gryphon-rider", "Gryphon rider", 100, 150).flying(),
    UnitTypeDef::new("unit-dragon", "Dragon", 100, 150).flying(),
    UnitTypeDef::new("unit-circle-of-power", "Circle of power", 0, 0)
        .building(2, 2)
        .coward(),
    UnitTypeDef::new("unit-farm", "Farm", 400, 100).building(2, 2),
    UnitTypeDef::new("unit-town-hall", "Town hall", 1200, 200).building(4, 4),
];

/// Define every built-in unit type in the world
pub fn install_unit_types(world: &mut World) -> Vec<UnitTypeId> {
    UNIT_TYPES
        .iter()
        .map(|def| world.define_unit_type(def.to_unit_type()))
        .collect()
}

pub fn get_unit_type_def(ident: &str) -> Option<&'static UnitTypeDef> {
    UNIT_TYPES.iter().find(|def| def.ident == ident)
}
