//! ws-data: Built-in game data for warspell
//!
//! Unit types, missile types, upgrades and the embedded spell book, plus
//! helpers that assemble a ready-to-run world and session from them.

pub mod missiles;
pub mod spells;
pub mod unit_types;

pub use missiles::{MISSILE_TYPES, install_missile_types};
pub use spells::{
    DEFAULT_AUTOCAST, SPELL_BOOK, SPELL_VARIABLES, UPGRADES, default_autocast, load_standard_spells,
};
pub use unit_types::{UNIT_TYPES, UnitTypeDef, get_unit_type_def, install_unit_types};

use ws_core::magic::{SpellLoadError, SpellRegistry};
use ws_core::unit::{PlayerIndex, UnitId, UnitTypeId, UpgradeAllow};
use ws_core::world::{TilePos, World};
use ws_core::Session;

/// A world of the given size with every built-in type defined
pub fn standard_world(width: i32, height: i32) -> World {
    let mut world = World::new(width, height);
    for name in SPELL_VARIABLES {
        world.define_variable(name);
    }
    install_unit_types(&mut world);
    install_missile_types(&mut world);
    for upgrade in UPGRADES {
        world.define_upgrade(upgrade);
    }
    world
}

/// Mark every spell upgrade researched for one player
pub fn research_spell_upgrades(world: &mut World, player: PlayerIndex) {
    let ids: Vec<_> = UPGRADES.iter().filter_map(|u| world.upgrade_by_ident(u)).collect();
    if let Some(player) = world.player_mut(player) {
        for id in ids {
            player.set_upgrade(id, UpgradeAllow::Researched);
        }
    }
}

/// A session over a standard world with the embedded spell book loaded
pub fn standard_session(width: i32, height: i32, seed: u64) -> Result<Session, SpellLoadError> {
    let mut world = standard_world(width, height);
    let mut spells = SpellRegistry::new();
    let count = load_standard_spells(&mut world, &mut spells)?;
    tracing::debug!(spells = count, width, height, seed, "standard session ready");
    Ok(Session::new(world, spells, seed))
}

/// Make a unit with its type's default autocast spells switched on
///
/// Returns `None` if the unit type is unknown or the unit limit is reached.
pub fn spawn_unit(session: &mut Session, unit_type: &str, owner: PlayerIndex, pos: TilePos) -> Option<UnitId> {
    let type_id: UnitTypeId = session.world.unit_type_by_ident(unit_type)?;
    let unit = session.world.make_unit_and_place(pos, type_id, owner)?;
    for spell in default_autocast(unit_type) {
        if let Some(slot) = session.spells.slot_of(spell) {
            session.set_autocast(unit, slot, true);
        }
    }
    Some(unit)
}
