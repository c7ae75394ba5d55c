//! Players
//!
//! Ownership, diplomacy and score bookkeeping. The spell engine only reads
//! diplomacy and upgrade allow states, and writes score/kill counters.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::consts::PLAYER_NUM_NEUTRAL;

/// Index of a player slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerIndex(pub u8);

impl PlayerIndex {
    pub const NEUTRAL: PlayerIndex = PlayerIndex(PLAYER_NUM_NEUTRAL);

    fn bit(self) -> u16 {
        1u16 << self.0
    }
}

/// Index of an upgrade in the world's upgrade table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UpgradeId(pub u16);

/// Allow state of an upgrade for one player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum UpgradeAllow {
    /// May be researched
    #[default]
    Allowed,
    /// May not be researched
    Forbidden,
    /// Already researched
    Researched,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub index: PlayerIndex,
    pub name: String,
    /// Controlled by the computer; selects the AI autocast configuration
    pub ai_enabled: bool,
    pub score: i64,
    pub total_kills: u32,
    pub total_razings: u32,
    /// Units currently owned
    pub unit_count: u32,
    /// Units lost over the game
    pub units_lost: u32,
    allies: u16,
    enemies: u16,
    upgrades: Vec<UpgradeAllow>,
}

impl Player {
    pub fn new(index: PlayerIndex, name: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
            ai_enabled: false,
            score: 0,
            total_kills: 0,
            total_razings: 0,
            unit_count: 0,
            units_lost: 0,
            allies: 0,
            enemies: 0,
            upgrades: Vec::new(),
        }
    }

    pub fn is_allied_with(&self, other: PlayerIndex) -> bool {
        self.allies & other.bit() != 0
    }

    pub fn is_enemy_of(&self, other: PlayerIndex) -> bool {
        self.enemies & other.bit() != 0
    }

    pub fn set_allied(&mut self, other: PlayerIndex, allied: bool) {
        if allied {
            self.allies |= other.bit();
        } else {
            self.allies &= !other.bit();
        }
    }

    pub fn set_enemy(&mut self, other: PlayerIndex, enemy: bool) {
        if enemy {
            self.enemies |= other.bit();
        } else {
            self.enemies &= !other.bit();
        }
    }

    pub fn upgrade_allowed(&self, id: UpgradeId) -> UpgradeAllow {
        self.upgrades
            .get(id.0 as usize)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_upgrade(&mut self, id: UpgradeId, allow: UpgradeAllow) {
        let index = id.0 as usize;
        if index >= self.upgrades.len() {
            self.upgrades.resize(index + 1, UpgradeAllow::Allowed);
        }
        self.upgrades[index] = allow;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diplomacy_bits() {
        let mut p = Player::new(PlayerIndex(0), "red");
        p.set_enemy(PlayerIndex(1), true);
        p.set_allied(PlayerIndex(2), true);

        assert!(p.is_enemy_of(PlayerIndex(1)));
        assert!(!p.is_enemy_of(PlayerIndex(2)));
        assert!(p.is_allied_with(PlayerIndex(2)));

        p.set_enemy(PlayerIndex(1), false);
        assert!(!p.is_enemy_of(PlayerIndex(1)));
    }

    #[test]
    fn test_upgrade_default_allowed() {
        let mut p = Player::new(PlayerIndex(0), "red");
        assert_eq!(p.upgrade_allowed(UpgradeId(3)), UpgradeAllow::Allowed);
        p.set_upgrade(UpgradeId(3), UpgradeAllow::Researched);
        assert_eq!(p.upgrade_allowed(UpgradeId(3)), UpgradeAllow::Researched);
        assert_eq!(p.upgrade_allowed(UpgradeId(1)), UpgradeAllow::Allowed);
    }

    #[test]
    fn test_neutral_index() {
        assert_eq!(PlayerIndex::NEUTRAL, PlayerIndex(15));
    }
}
