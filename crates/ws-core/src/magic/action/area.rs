//! Area effects: demolition, area healing/harming and bombardment

use super::{CastAction, debit_mana};
use crate::consts::{BOMBARD_JITTER, PIXEL_TILE_WIDTH};
use crate::magic::CastContext;
use crate::magic::condition::can_cast_spell;
use crate::magic::spell::SpellType;
use crate::unit::{MovementKind, UnitId, VarIndex};
use crate::world::{GameMap, MapFieldFlags, MissileTypeId, PixelPos, TilePos, map_distance};

/// Clear walls, rocks and forest in a circle and hurt ground units in it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Demolish {
    /// Radius in tiles
    pub range: i32,
    /// Damage to every ground unit in range, 0 for terrain only
    pub damage: i32,
}

impl CastAction for Demolish {
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        _spell: &SpellType,
        _target: Option<UnitId>,
        goal_pos: TilePos,
    ) -> bool {
        let world = &mut *ctx.world;
        let margin = TilePos::new(self.range + 2, self.range + 2);
        let mut min = goal_pos - margin;
        let mut max = goal_pos + margin;
        world.map.fix_selection_area(&mut min, &mut max);

        for x in min.x..=max.x {
            for y in min.y..=max.y {
                let pos = TilePos::new(x, y);
                if map_distance(pos, goal_pos) > self.range {
                    continue;
                }
                let flags = world.map.flags(pos);
                if flags.contains(MapFieldFlags::WALL) {
                    world.map.remove_wall(pos);
                } else if flags.contains(MapFieldFlags::ROCKS) {
                    world.map.clear_tile(MapFieldFlags::ROCKS, pos);
                } else if flags.contains(MapFieldFlags::FOREST) {
                    world.map.clear_tile(MapFieldFlags::FOREST, pos);
                }
            }
        }

        if self.damage != 0 {
            for id in world.select(min, max) {
                let Some(unit) = world.unit(id) else {
                    continue;
                };
                let flying = world
                    .unit_type(unit.type_id)
                    .is_some_and(|t| t.movement == MovementKind::Fly);
                if !flying && unit.is_alive() && world.map_distance_to(unit, goal_pos) <= self.range {
                    world.hit_unit(Some(caster), id, self.damage);
                }
            }
        }
        true
    }
}

/// Adjust hit points and mana of every eligible unit around the goal
///
/// Eligibility is the spell's own cast check with each unit as target. The
/// caster pays the spell's mana cost once, before the checks run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaAdjustVitals {
    /// Negative values go through the damage path
    pub hit_points: i32,
    pub mana: i32,
}

impl CastAction for AreaAdjustVitals {
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        spell: &SpellType,
        _target: Option<UnitId>,
        goal_pos: TilePos,
    ) -> bool {
        let world = &mut *ctx.world;
        let Some(size) = world
            .unit_type_of(caster)
            .map(|t| TilePos::new(t.tile_width, t.tile_height))
        else {
            return false;
        };
        let range = TilePos::new(spell.range, spell.range);
        let units = world.select(goal_pos - range, goal_pos + size + range);

        debit_mana(world, caster, spell.mana_cost);
        for id in units {
            if !can_cast_spell(world, caster, spell, Some(id), goal_pos) {
                continue;
            }
            if self.hit_points < 0 {
                world.hit_unit(Some(caster), id, self.hit_points.saturating_neg());
            } else if let Some(hp) = world
                .unit_mut(id)
                .and_then(|u| u.variables.get_mut(VarIndex::HIT_POINTS))
            {
                hp.add_clamped(self.hit_points);
            }
            if let Some(mana) = world
                .unit_mut(id)
                .and_then(|u| u.variables.get_mut(VarIndex::MANA))
            {
                mana.add_clamped(self.mana);
            }
        }
        false
    }

    fn modifies_caster_mana(&self) -> bool {
        true
    }
}

/// Rain missiles on random tiles around the goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaBombardment {
    pub missile: MissileTypeId,
    /// Number of impact tiles
    pub fields: i32,
    /// Missiles per impact tile
    pub shards: i32,
    pub damage: i32,
    /// Launch point relative to the impact point, in pixels
    pub start_offset: PixelPos,
}

impl CastAction for AreaBombardment {
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        _spell: &SpellType,
        _target: Option<UnitId>,
        goal_pos: TilePos,
    ) -> bool {
        let world = &mut *ctx.world;
        let rng = &mut *ctx.rng;
        // The jitter loop only ends once it lands on the map.
        if !world.map.is_point_on_map(goal_pos) {
            return true;
        }
        let Some(missile_type) = world.missile_type(self.missile).cloned() else {
            return true;
        };

        let spread = 2 * BOMBARD_JITTER + 1;
        for _ in 0..self.fields {
            let impact = loop {
                let dx = rng.sync_rand() % spread - BOMBARD_JITTER;
                let dy = rng.sync_rand() % spread - BOMBARD_JITTER;
                let pos = goal_pos + TilePos::new(dx, dy);
                if world.map.is_point_on_map(pos) {
                    break pos;
                }
            };

            let dest = GameMap::tile_to_pixel_center(impact);
            let start = dest + self.start_offset;
            for i in 0..self.shards {
                let missile = world.missiles.spawn(self.missile, start, dest);
                missile.delay = if missile_type.speed != 0 {
                    i * missile_type.sleep * 2 * PIXEL_TILE_WIDTH / missile_type.speed
                } else {
                    i * missile_type.sleep * missile_type.num_frames
                };
                missile.damage = self.damage;
                missile.source_unit = Some(caster);
            }
        }
        true
    }
}
