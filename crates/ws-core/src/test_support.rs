//! Shared fixtures for unit tests

use crate::rng::SyncRng;
use crate::unit::{MovementKind, PlayerIndex, UnitId, UnitType, UnitTypeFlags, UnitTypeId, VarIndex};
use crate::world::{MissileType, TilePos, World};

pub(crate) struct Fixture {
    pub world: World,
    pub rng: SyncRng,
    pub footman: UnitTypeId,
    pub mage: UnitTypeId,
    pub flyer: UnitTypeId,
    pub town_hall: UnitTypeId,
    pub critter: UnitTypeId,
    pub portal: UnitTypeId,
    pub skeleton: UnitTypeId,
}

/// A 32x32 open map with a handful of unit types
///
/// Players 0 and 1 are enemies, player 2 is allied with player 0. Missile
/// type 0 is "missile-blizzard" (speed 16, sleep 1).
pub(crate) fn fixture() -> Fixture {
    let mut world = World::new(32, 32);
    world.set_mutual_enemies(PlayerIndex(0), PlayerIndex(1));
    world.set_mutual_allies(PlayerIndex(0), PlayerIndex(2));

    let footman = world.define_unit_type(
        UnitType::new("unit-footman", "Footman")
            .with_flags(UnitTypeFlags::ORGANIC)
            .with_variable(VarIndex::HIT_POINTS, 60, 60)
            .with_variable(VarIndex::POINTS, 50, 50),
    );
    let mage = world.define_unit_type(
        UnitType::new("unit-mage", "Mage")
            .with_flags(UnitTypeFlags::ORGANIC | UnitTypeFlags::CASTER)
            .with_variable(VarIndex::HIT_POINTS, 60, 60)
            .with_variable(VarIndex::MANA, 50, 255)
            .with_variable(VarIndex::POINTS, 100, 100),
    );
    let flyer = world.define_unit_type(
        UnitType::new("unit-gryphon-rider", "Gryphon rider")
            .with_movement(MovementKind::Fly)
            .with_flags(UnitTypeFlags::ORGANIC)
            .with_variable(VarIndex::HIT_POINTS, 60, 60)
            .with_variable(VarIndex::POINTS, 150, 150),
    );
    let town_hall = world.define_unit_type(
        UnitType::new("unit-town-hall", "Town hall")
            .with_size(2, 2)
            .as_building()
            .with_variable(VarIndex::HIT_POINTS, 1200, 1200)
            .with_variable(VarIndex::POINTS, 200, 200),
    );
    let critter = world.define_unit_type(
        UnitType::new("unit-critter", "Critter")
            .as_coward()
            .with_flags(UnitTypeFlags::ORGANIC)
            .with_variable(VarIndex::HIT_POINTS, 5, 5)
            .with_variable(VarIndex::POINTS, 1, 1),
    );
    let portal = world.define_unit_type(
        UnitType::new("unit-circle-of-power", "Circle of power")
            .as_building()
            .with_variable(VarIndex::HIT_POINTS, 0, 0),
    );
    let skeleton = world.define_unit_type(
        UnitType::new("unit-skeleton", "Skeleton")
            .with_flags(UnitTypeFlags::UNDEAD | UnitTypeFlags::SUMMONED)
            .with_variable(VarIndex::HIT_POINTS, 40, 40)
            .with_variable(VarIndex::POINTS, 0, 0),
    );
    world.define_missile_type(MissileType::new("missile-blizzard", 16, 1, 5));

    Fixture {
        world,
        rng: SyncRng::new(0x5EED),
        footman,
        mage,
        flyer,
        town_hall,
        critter,
        portal,
        skeleton,
    }
}

/// Make a unit and put it on the map
pub(crate) fn spawn(world: &mut World, type_id: UnitTypeId, owner: PlayerIndex, x: i32, y: i32) -> UnitId {
    world
        .make_unit_and_place(TilePos::new(x, y), type_id, owner)
        .expect("unit limit reached in test")
}
