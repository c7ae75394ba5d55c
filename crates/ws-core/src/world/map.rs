//! Tile map
//!
//! Only what the spell engine consumes: bounds, terrain flags that spells
//! can clear, and tile/pixel conversion.

use core::ops::{Add, Sub};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::{PIXEL_TILE_HEIGHT, PIXEL_TILE_WIDTH};

/// Tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for TilePos {
    type Output = TilePos;

    fn add(self, rhs: TilePos) -> TilePos {
        TilePos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for TilePos {
    type Output = TilePos;

    fn sub(self, rhs: TilePos) -> TilePos {
        TilePos::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Map coordinates in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for PixelPos {
    type Output = PixelPos;

    fn add(self, rhs: PixelPos) -> PixelPos {
        PixelPos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

bitflags! {
    /// Per-tile terrain flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct MapFieldFlags: u16 {
        const EXPLORED = 0x0001;
        const LAND_ALLOWED = 0x0002;
        const COAST_ALLOWED = 0x0004;
        const WATER_ALLOWED = 0x0008;
        const NO_BUILDING = 0x0010;
        const UNPASSABLE = 0x0020;
        const WALL = 0x0040;
        const ROCKS = 0x0080;
        const FOREST = 0x0100;
    }
}

// Manual serde for MapFieldFlags
impl Serialize for MapFieldFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MapFieldFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u16::deserialize(deserializer)?;
        Ok(MapFieldFlags::from_bits_truncate(bits))
    }
}

/// A single map tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapField {
    pub flags: MapFieldFlags,
    /// Wall hit points, wood or stone left
    pub value: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMap {
    width: i32,
    height: i32,
    fields: Vec<MapField>,
}

impl GameMap {
    /// Open, explored land of the given size
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let field = MapField {
            flags: MapFieldFlags::LAND_ALLOWED | MapFieldFlags::EXPLORED,
            value: 0,
        };
        Self {
            width,
            height,
            fields: vec![field; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_point_on_map(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn offset(&self, pos: TilePos) -> Option<usize> {
        self.is_point_on_map(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn field(&self, pos: TilePos) -> Option<&MapField> {
        self.offset(pos).map(|i| &self.fields[i])
    }

    pub fn field_mut(&mut self, pos: TilePos) -> Option<&mut MapField> {
        self.offset(pos).map(move |i| &mut self.fields[i])
    }

    /// Flags of a tile, empty when off the map
    pub fn flags(&self, pos: TilePos) -> MapFieldFlags {
        self.field(pos).map_or(MapFieldFlags::empty(), |f| f.flags)
    }

    /// Replace the terrain of a tile
    pub fn set_terrain(&mut self, pos: TilePos, flags: MapFieldFlags, value: i32) {
        if let Some(field) = self.field_mut(pos) {
            field.flags = flags | (field.flags & MapFieldFlags::EXPLORED);
            field.value = value;
        }
    }

    /// Clip a selection rectangle to the map
    pub fn fix_selection_area(&self, min: &mut TilePos, max: &mut TilePos) {
        min.x = min.x.max(0);
        min.y = min.y.max(0);
        max.x = max.x.min(self.width - 1);
        max.y = max.y.min(self.height - 1);
    }

    /// Tear down a wall, leaving passable land
    pub fn remove_wall(&mut self, pos: TilePos) {
        if let Some(field) = self.field_mut(pos) {
            field.flags.remove(MapFieldFlags::WALL | MapFieldFlags::UNPASSABLE);
            field.flags.insert(MapFieldFlags::LAND_ALLOWED);
            field.value = 0;
        }
    }

    /// Clear rocks or forest from a tile, leaving passable land
    pub fn clear_tile(&mut self, flag: MapFieldFlags, pos: TilePos) {
        if let Some(field) = self.field_mut(pos) {
            if field.flags.intersects(flag) {
                field.flags.remove(flag | MapFieldFlags::UNPASSABLE);
                field.flags.insert(MapFieldFlags::LAND_ALLOWED);
                field.value = 0;
            }
        }
    }

    /// Pixel position of the top-left corner of a tile
    pub fn tile_to_pixel(pos: TilePos) -> PixelPos {
        PixelPos::new(pos.x * PIXEL_TILE_WIDTH, pos.y * PIXEL_TILE_HEIGHT)
    }

    /// Pixel position of the centre of a tile
    pub fn tile_to_pixel_center(pos: TilePos) -> PixelPos {
        Self::tile_to_pixel(pos) + PixelPos::new(PIXEL_TILE_WIDTH / 2, PIXEL_TILE_HEIGHT / 2)
    }

    pub fn pixel_to_tile(pos: PixelPos) -> TilePos {
        TilePos::new(
            pos.x.div_euclid(PIXEL_TILE_WIDTH),
            pos.y.div_euclid(PIXEL_TILE_HEIGHT),
        )
    }
}

/// Integer square root (floor)
pub fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = x / 2 + (x & 1);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Euclidean tile distance, rounded down
pub fn map_distance(a: TilePos, b: TilePos) -> i32 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    isqrt((dx * dx + dy * dy) as u64) as i32
}
