//! The embedded spell book and default autocast settings

use ws_core::magic::{SpellLoadError, SpellRegistry, load_spell_book};
use ws_core::world::World;

/// Spell definitions shipped with the game
pub const SPELL_BOOK: &str = include_str!("../data/spells.json");

/// Upgrades the spell book depends on
pub static UPGRADES: &[&str] = &[
    "upgrade-healing",
    "upgrade-exorcism",
    "upgrade-flame-shield",
    "upgrade-slow",
    "upgrade-invisibility",
    "upgrade-polymorph",
    "upgrade-blizzard",
    "upgrade-haste",
    "upgrade-raise-dead",
    "upgrade-whirlwind",
    "upgrade-unholy-armor",
    "upgrade-death-and-decay",
    "upgrade-death-coil",
    "upgrade-bloodlust",
];

/// Variables the spell book tracks besides the built-in ones
pub static SPELL_VARIABLES: &[&str] = &["Haste", "Slow", "Bloodlust", "UnholyArmor"];

/// Spells a freshly made unit casts on its own, by unit type
pub static DEFAULT_AUTOCAST: &[(&str, &str)] = &[
    ("unit-paladin", "spell-healing"),
    ("unit-paladin", "spell-exorcism"),
    ("unit-mage", "spell-slow"),
    ("unit-death-knight", "spell-haste"),
    ("unit-ogre-mage", "spell-bloodlust"),
];

/// Load the embedded spell book
pub fn load_standard_spells(world: &mut World, registry: &mut SpellRegistry) -> Result<usize, SpellLoadError> {
    load_spell_book(SPELL_BOOK, world, registry)
}

/// Spells that autocast by default for a unit type
pub fn default_autocast(unit_type: &str) -> impl Iterator<Item = &'static str> + '_ {
    DEFAULT_AUTOCAST
        .iter()
        .filter(move |(ident, _)| *ident == unit_type)
        .map(|(_, spell)| *spell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_autocast() {
        let paladin: Vec<_> = default_autocast("unit-paladin").collect();
        assert_eq!(paladin, vec!["spell-healing", "spell-exorcism"]);
        assert_eq!(default_autocast("unit-peasant").count(), 0);
    }
}
