//! Spell registry
//!
//! The table of loaded spells. Filled once while data loads, read by every
//! simulation step, torn down at shutdown.

use hashbrown::HashMap;

use super::spell::{SpellSlot, SpellType};

#[derive(Debug, Default)]
pub struct SpellRegistry {
    spells: Vec<SpellType>,
    by_ident: HashMap<String, SpellSlot>,
}

impl SpellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spell and assign it the next slot
    ///
    /// Returns `None` if a spell with the same ident is already defined.
    pub fn define(&mut self, mut spell: SpellType) -> Option<SpellSlot> {
        if self.by_ident.contains_key(&spell.ident) {
            return None;
        }
        let slot = SpellSlot(self.spells.len() as u16);
        spell.slot = slot;
        self.by_ident.insert(spell.ident.clone(), slot);
        self.spells.push(spell);
        Some(slot)
    }

    pub fn get(&self, slot: SpellSlot) -> Option<&SpellType> {
        self.spells.get(slot.index())
    }

    pub fn by_ident(&self, ident: &str) -> Option<&SpellType> {
        self.slot_of(ident).and_then(|slot| self.get(slot))
    }

    pub fn slot_of(&self, ident: &str) -> Option<SpellSlot> {
        self.by_ident.get(ident).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellType> {
        self.spells.iter()
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    /// Drop every definition
    pub fn shutdown(&mut self) {
        tracing::debug!(spells = self.spells.len(), "cleaning spells");
        self.spells.clear();
        self.by_ident.clear();
    }
}
