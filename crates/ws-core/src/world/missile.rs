//! Missiles
//!
//! Spells only launch missiles; flight, impact and rendering belong to the
//! host. A launched missile stays in the list until the host takes it.

use serde::{Deserialize, Serialize};

use super::map::PixelPos;
use crate::unit::UnitId;

/// Index of a missile type in the world's type table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissileTypeId(pub u16);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissileType {
    pub id: MissileTypeId,
    pub ident: String,
    /// Pixels per frame, 0 for missiles that do not fly
    pub speed: i32,
    /// Frames between two animation steps
    pub sleep: i32,
    /// Frames in the sprite
    pub num_frames: i32,
}

impl MissileType {
    pub fn new(ident: &str, speed: i32, sleep: i32, num_frames: i32) -> Self {
        Self {
            id: MissileTypeId(0),
            ident: ident.to_string(),
            speed,
            sleep,
            num_frames,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissileId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Missile {
    pub id: MissileId,
    pub type_id: MissileTypeId,
    pub source_pos: PixelPos,
    pub destination: PixelPos,
    /// Frames to live, -1 until it reaches its destination
    pub ttl: i32,
    /// Frames to wait before launch
    pub delay: i32,
    pub damage: i32,
    /// Unit credited with the damage
    pub source_unit: Option<UnitId>,
    pub target_unit: Option<UnitId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Missiles {
    next_id: u32,
    launched: Vec<Missile>,
}

impl Missiles {
    /// Launch a missile; the returned reference is used to configure it
    pub fn spawn(&mut self, type_id: MissileTypeId, start: PixelPos, end: PixelPos) -> &mut Missile {
        let id = MissileId(self.next_id);
        self.next_id += 1;
        self.launched.push(Missile {
            id,
            type_id,
            source_pos: start,
            destination: end,
            ttl: -1,
            delay: 0,
            damage: 0,
            source_unit: None,
            target_unit: None,
        });
        let last = self.launched.len() - 1;
        &mut self.launched[last]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Missile> {
        self.launched.iter()
    }

    pub fn len(&self) -> usize {
        self.launched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.launched.is_empty()
    }

    /// Hand every launched missile over to the host
    pub fn take_launched(&mut self) -> Vec<Missile> {
        core::mem::take(&mut self.launched)
    }
}
