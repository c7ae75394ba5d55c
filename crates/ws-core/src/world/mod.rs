//! Simulation services the spell engine runs against
//!
//! The tile map, the unit arena with its lifecycle operations, spatial
//! queries, missiles, sound cues and the synchronized command queue.

mod command;
mod map;
mod missile;
mod query;
mod sound;
#[allow(clippy::module_inception)]
mod world;

pub use command::{Command, CommandQueue, FlushMode};
pub use map::{GameMap, MapField, MapFieldFlags, PixelPos, TilePos, isqrt, map_distance};
pub use missile::{Missile, MissileId, MissileType, MissileTypeId, Missiles};
pub use sound::{SoundCue, SoundQueue};
pub use world::World;
