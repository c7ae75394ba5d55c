//! Engine-wide constants
//!
//! Tile geometry, player and unit limits shared by every module.

/// Tile size in pixels
pub const PIXEL_TILE_WIDTH: i32 = 32;
pub const PIXEL_TILE_HEIGHT: i32 = 32;

/// Maximum number of players, the neutral player included
pub const PLAYER_MAX: usize = 16;

/// Index of the neutral player (owner of portals and neutral polymorphs)
pub const PLAYER_NUM_NEUTRAL: u8 = 15;

/// Default number of unit slots in a world
pub const UNIT_MAX: usize = 2048;

/// Game cycles a dying unit lingers as a corpse before it is released
pub const CORPSE_CYCLES: u64 = 200;

/// Half-width of the square used to scatter bombardment fields
pub const BOMBARD_JITTER: i32 = 2;

/// Loudest volume for a sound cue
pub const MAX_SAMPLE_VOLUME: u8 = 255;
