//! Synchronized command queue
//!
//! Player input, AI and autocast never change the simulation directly:
//! they enqueue commands here, and the session applies them at the start
//! of the next step on every participant.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::map::TilePos;
use crate::magic::SpellSlot;
use crate::unit::UnitId;

/// Whether a command replaces or follows the unit's pending orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlushMode {
    /// Drop pending orders first
    #[default]
    Flush,
    /// Queue after pending orders
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    SpellCast {
        unit: UnitId,
        spell: SpellSlot,
        target: Option<UnitId>,
        goal_pos: TilePos,
        flush: FlushMode,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandQueue {
    queue: VecDeque<Command>,
}

impl CommandQueue {
    pub fn enqueue_spell_cast(
        &mut self,
        unit: UnitId,
        spell: SpellSlot,
        target: Option<UnitId>,
        goal_pos: TilePos,
        flush: FlushMode,
    ) {
        self.queue.push_back(Command::SpellCast {
            unit,
            spell,
            target,
            goal_pos,
            flush,
        });
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.queue.iter()
    }

    /// Take every queued command, oldest first
    pub fn drain(&mut self) -> Vec<Command> {
        self.queue.drain(..).collect()
    }
}
