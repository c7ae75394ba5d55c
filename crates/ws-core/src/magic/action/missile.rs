//! Missile launching

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::CastAction;
use crate::magic::CastContext;
use crate::magic::spell::SpellType;
use crate::rng::SyncRng;
use crate::unit::UnitId;
use crate::world::{GameMap, MissileTypeId, PixelPos, TilePos, World};

/// Anchor of a missile location
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LocationBase {
    #[default]
    Caster,
    /// The target unit, or the goal tile without one
    Target,
}

/// A pixel position relative to the caster or the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissileLocation {
    pub base: LocationBase,
    pub add_x: i32,
    pub add_y: i32,
    /// Upper bound (exclusive) of a random extra x offset, 0 for none
    pub add_rand_x: i32,
    pub add_rand_y: i32,
}

impl MissileLocation {
    pub fn at(base: LocationBase) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    fn evaluate(
        &self,
        world: &World,
        rng: &mut SyncRng,
        caster: UnitId,
        target: Option<UnitId>,
        goal_pos: TilePos,
    ) -> PixelPos {
        let anchor = match self.base {
            LocationBase::Caster => world.unit(caster),
            LocationBase::Target => target.and_then(|id| world.unit(id)),
        };
        let mut pos = anchor.map_or_else(
            || GameMap::tile_to_pixel_center(goal_pos),
            |unit| world.unit_center_pixel(unit),
        );

        pos.x += self.add_x;
        if self.add_rand_x != 0 {
            pos.x += rng.sync_rand() % self.add_rand_x;
        }
        pos.y += self.add_y;
        if self.add_rand_y != 0 {
            pos.y += rng.sync_rand() % self.add_rand_y;
        }
        pos
    }
}

/// Launch a single missile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnMissile {
    pub missile: MissileTypeId,
    pub start: MissileLocation,
    pub end: MissileLocation,
    pub ttl: i32,
    pub delay: i32,
    pub damage: i32,
    /// Let the missile compute damage from the caster's stats
    pub use_unit_var: bool,
}

impl CastAction for SpawnMissile {
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        _spell: &SpellType,
        target: Option<UnitId>,
        goal_pos: TilePos,
    ) -> bool {
        let world = &mut *ctx.world;
        let start = self.start.evaluate(world, ctx.rng, caster, target, goal_pos);
        let end = self.end.evaluate(world, ctx.rng, caster, target, goal_pos);
        let target = target.filter(|id| world.unit(*id).is_some());

        let missile = world.missiles.spawn(self.missile, start, end);
        missile.ttl = self.ttl;
        missile.delay = self.delay;
        missile.damage = self.damage;
        if self.use_unit_var {
            missile.damage = 0;
            missile.source_unit = Some(caster);
        } else if missile.damage != 0 {
            missile.source_unit = Some(caster);
        }
        missile.target_unit = target;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::magic::spell::TargetKind;
    use crate::test_support::{fixture, spawn};
    use crate::unit::PlayerIndex;

    fn fireball(damage: i32, use_unit_var: bool) -> SpawnMissile {
        SpawnMissile {
            missile: MissileTypeId(0),
            start: MissileLocation::at(LocationBase::Caster),
            end: MissileLocation::at(LocationBase::Target),
            ttl: 20,
            delay: 3,
            damage,
            use_unit_var,
        }
    }

    #[test]
    fn test_spawn_missile_from_caster_to_target() {
        let mut fx = fixture();
        let caster = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 2, 2);
        let enemy = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 5, 2);
        let spell = SpellType::new("spell-fireball", "Fireball", TargetKind::Unit);

        let mut ctx = CastContext::new(&mut fx.world, &mut fx.rng);
        assert!(fireball(25, false).cast(&mut ctx, caster, &spell, Some(enemy), TilePos::new(5, 2)));

        let missile = fx.world.missiles.iter().next().unwrap();
        assert_eq!(missile.source_pos, PixelPos::new(80, 80));
        assert_eq!(missile.destination, PixelPos::new(176, 80));
        assert_eq!((missile.ttl, missile.delay, missile.damage), (20, 3, 25));
        assert_eq!(missile.source_unit, Some(caster));
        assert_eq!(missile.target_unit, Some(enemy));
    }

    #[test]
    fn test_damage_attribution() {
        let mut fx = fixture();
        let caster = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 2, 2);
        let spell = SpellType::new("spell-eye", "Eye", TargetKind::Position);

        let mut ctx = CastContext::new(&mut fx.world, &mut fx.rng);
        fireball(0, false).cast(&mut ctx, caster, &spell, None, TilePos::new(9, 9));
        fireball(40, true).cast(&mut ctx, caster, &spell, None, TilePos::new(9, 9));

        let missiles: Vec<_> = fx.world.missiles.iter().collect();
        assert_eq!(missiles[0].source_unit, None);
        assert_eq!(missiles[0].destination, GameMap::tile_to_pixel_center(TilePos::new(9, 9)));
        assert_eq!(missiles[1].damage, 0);
        assert_eq!(missiles[1].source_unit, Some(caster));
    }

    #[test]
    fn test_random_offsets_draw_from_stream() {
        let mut fx = fixture();
        let caster = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 2, 2);
        let spell = SpellType::new("spell-x", "X", TargetKind::Position);
        let mut action = fireball(0, false);
        action.end = MissileLocation {
            base: LocationBase::Target,
            add_x: 4,
            add_y: 0,
            add_rand_x: 8,
            add_rand_y: 8,
        };

        let mut expected = SyncRng::new(fx.rng.seed());
        let dx = expected.sync_rand() % 8;
        let dy = expected.sync_rand() % 8;

        let mut ctx = CastContext::new(&mut fx.world, &mut fx.rng);
        action.cast(&mut ctx, caster, &spell, None, TilePos::new(0, 0));
        let missile = fx.world.missiles.iter().next().unwrap();
        assert_eq!(missile.destination, PixelPos::new(16 + 4 + dx, 16 + dy));
        assert_eq!(fx.rng.draws(), 2);
    }
}
