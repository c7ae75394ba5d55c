//! Built-in missile types

use ws_core::world::{MissileType, MissileTypeId, World};

/// (ident, speed, sleep, frames)
pub static MISSILE_TYPES: &[(&str, i32, i32, i32)] = &[
    ("missile-fireball", 16, 1, 5),
    ("missile-flame-shield", 0, 2, 16),
    ("missile-blizzard", 8, 2, 4),
    ("missile-death-and-decay", 0, 2, 8),
    ("missile-whirlwind", 2, 1, 4),
    ("missile-death-coil", 16, 1, 6),
    ("missile-explosion", 0, 1, 16),
];

pub fn install_missile_types(world: &mut World) -> Vec<MissileTypeId> {
    MISSILE_TYPES
        .iter()
        .map(|&(ident, speed, sleep, frames)| world.define_missile_type(MissileType::new(ident, speed, sleep, frames)))
        .collect()
}
