//! Spatial queries over the unit arena
//!
//! Every query walks the arena in slot order, so two participants holding
//! the same world get the same unit order back.

use super::map::{GameMap, PixelPos, TilePos, map_distance};
use super::world::World;
use crate::consts::{PIXEL_TILE_HEIGHT, PIXEL_TILE_WIDTH};
use crate::unit::{Unit, UnitId, UnitType};

impl World {
    /// Top-left and bottom-right tiles of a unit's footprint
    pub fn footprint(&self, unit: &Unit) -> (TilePos, TilePos) {
        let (w, h) = self
            .unit_type(unit.type_id)
            .map_or((1, 1), |t| (t.tile_width, t.tile_height));
        (unit.tile_pos, unit.tile_pos + TilePos::new(w - 1, h - 1))
    }

    /// Units on the map whose footprint intersects the inclusive rectangle
    ///
    /// Dying units are included; they stay on the map as corpses.
    pub fn select(&self, min: TilePos, max: TilePos) -> Vec<UnitId> {
        self.units()
            .filter(|u| !u.removed && !u.destroyed)
            .filter(|u| {
                let (lo, hi) = self.footprint(u);
                lo.x <= max.x && hi.x >= min.x && lo.y <= max.y && hi.y >= min.y
            })
            .map(|u| u.id)
            .collect()
    }

    /// Units within `range` tiles of a unit's footprint, the unit excluded
    pub fn select_around_unit(&self, id: UnitId, range: i32) -> Vec<UnitId> {
        let Some(unit) = self.unit(id) else {
            return Vec::new();
        };
        let (lo, hi) = self.footprint(unit);
        let margin = TilePos::new(range, range);
        let mut ids = self.select(lo - margin, hi + margin);
        ids.retain(|other| *other != id);
        ids
    }

    /// First unit in the rectangle matching the predicate
    pub fn find_if<F>(&self, min: TilePos, max: TilePos, pred: F) -> Option<UnitId>
    where
        F: Fn(&Unit, &UnitType) -> bool,
    {
        self.select(min, max).into_iter().find(|id| {
            self.unit(*id)
                .and_then(|u| self.unit_type(u.type_id).map(|t| pred(u, t)))
                .unwrap_or(false)
        })
    }

    /// Distance from the nearest tile of a unit's footprint to `pos`
    pub fn map_distance_to(&self, unit: &Unit, pos: TilePos) -> i32 {
        let (lo, hi) = self.footprint(unit);
        let nearest = TilePos::new(pos.x.clamp(lo.x, hi.x), pos.y.clamp(lo.y, hi.y));
        map_distance(nearest, pos)
    }

    /// Pixel centre of a unit's footprint
    pub fn unit_center_pixel(&self, unit: &Unit) -> PixelPos {
        let (w, h) = self
            .unit_type(unit.type_id)
            .map_or((1, 1), |t| (t.tile_width, t.tile_height));
        GameMap::tile_to_pixel(unit.tile_pos)
            + PixelPos::new(w * PIXEL_TILE_WIDTH / 2, h * PIXEL_TILE_HEIGHT / 2)
    }
}
