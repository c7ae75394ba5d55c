//! Actions that take a unit away from its owner: polymorph and capture

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::{CastAction, debit_mana};
use crate::magic::CastContext;
use crate::magic::spell::SpellType;
use crate::unit::{PlayerIndex, UnitId, UnitTypeId};
use crate::world::{TilePos, World};

/// Who owns the unit a polymorph creates
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PolymorphOwner {
    /// Whoever owned the original unit
    #[default]
    Target,
    Neutral,
    Caster,
}

/// Turn the target into a unit of another type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polymorph {
    pub new_form: UnitTypeId,
    pub owner: PolymorphOwner,
}

impl CastAction for Polymorph {
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        spell: &SpellType,
        target: Option<UnitId>,
        goal_pos: TilePos,
    ) -> bool {
        let world = &mut *ctx.world;
        let Some(target) = target else {
            return false;
        };
        let (Some(caster_unit), Some(target_unit)) = (world.unit(caster), world.unit(target)) else {
            return false;
        };
        let Some(form) = world.unit_type(self.new_form) else {
            return false;
        };
        let pos = goal_pos - TilePos::new(form.tile_width / 2, form.tile_height / 2);
        let caster_owner = caster_unit.owner;
        let (origin, former_owner) = (target_unit.tile_pos, target_unit.owner);

        // No corpse: the target leaves the map before the new form is placed.
        world.remove(target);
        if !world.footprint_fits(self.new_form, pos) {
            world.place(target, origin);
            tracing::debug!(unit = %target, x = pos.x, y = pos.y, "no room to polymorph");
            return false;
        }

        let owner = match self.owner {
            PolymorphOwner::Target => former_owner,
            PolymorphOwner::Neutral => PlayerIndex::NEUTRAL,
            PolymorphOwner::Caster => caster_owner,
        };
        let Some(new_unit) = world.make_unit(self.new_form, owner) else {
            world.place(target, origin);
            tracing::warn!(unit_type = self.new_form.0, "unable to allocate polymorphed unit");
            return false;
        };
        world.place(new_unit, pos);

        world.transfer_kill_credit(caster, target);
        debit_mana(world, caster, spell.mana_cost);
        world.unit_lost(target);
        world.clear_orders(target);
        world.release(target);
        true
    }

    fn modifies_caster_mana(&self) -> bool {
        true
    }
}

/// Take control of the target
///
/// With a damage guard, a target still above `damage_percent` of its hit
/// points is hurt instead of captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capture {
    /// The caster is consumed (without a corpse) instead of paying mana
    pub sacrifice: bool,
    pub damage: i32,
    /// Health percentage above which the target resists, 0 to disable
    pub damage_percent: i32,
}

fn sacrifice(world: &mut World, caster: UnitId) {
    world.remove(caster);
    world.unit_lost(caster);
    world.clear_orders(caster);
}

impl CastAction for Capture {
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        spell: &SpellType,
        target: Option<UnitId>,
        _goal_pos: TilePos,
    ) -> bool {
        let world = &mut *ctx.world;
        let Some(target) = target else {
            return false;
        };
        let (Some(caster_unit), Some(target_unit)) = (world.unit(caster), world.unit(target)) else {
            return false;
        };
        let caster_owner = caster_unit.owner;
        if caster_owner == target_unit.owner {
            return false;
        }

        if self.damage_percent != 0 {
            let hp = target_unit.hit_points();
            let max = target_unit
                .variables
                .get(crate::unit::VarIndex::HIT_POINTS)
                .map_or(0, |v| v.max);
            let resists = max > 0
                && 100 * i64::from(hp) / i64::from(max) > i64::from(self.damage_percent)
                && hp > self.damage;
            if resists {
                world.hit_unit(Some(caster), target, self.damage);
                if self.sacrifice {
                    sacrifice(world, caster);
                }
                return true;
            }
        }

        world.transfer_kill_credit(caster, target);
        world.change_owner(target, caster_owner);
        if self.sacrifice {
            sacrifice(world, caster);
        } else {
            debit_mana(world, caster, spell.mana_cost);
        }
        world.clear_orders(target);
        false
    }

    fn modifies_caster_mana(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::magic::spell::TargetKind;
    use crate::test_support::{fixture, spawn};
    use crate::unit::VarIndex;

    fn polymorph_spell() -> SpellType {
        SpellType::new("spell-polymorph", "Polymorph", TargetKind::Unit).with_mana_cost(20)
    }

    #[test]
    fn test_polymorph_replaces_target() {
        let mut fx = fixture();
        let caster = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 2, 2);
        let enemy = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 6, 6);
        let action = Polymorph {
            new_form: fx.critter,
            owner: PolymorphOwner::Neutral,
        };

        let mut ctx = CastContext::new(&mut fx.world, &mut fx.rng);
        assert!(action.cast(&mut ctx, caster, &polymorph_spell(), Some(enemy), TilePos::new(6, 6)));

        assert!(fx.world.unit(enemy).is_none());
        let critter = fx
            .world
            .find_if(TilePos::new(6, 6), TilePos::new(6, 6), |_, t| t.ident == "unit-critter")
            .unwrap();
        assert_eq!(fx.world.unit(critter).unwrap().owner, PlayerIndex::NEUTRAL);
        assert_eq!(fx.world.unit(caster).unwrap().mana(), 30);
        assert_eq!(fx.world.unit(caster).unwrap().var(VarIndex::KILL), 1);
        assert_eq!(fx.world.player(PlayerIndex(1)).unwrap().units_lost, 1);
    }

    #[test]
    fn test_polymorph_blocked_leaves_everything() {
        let mut fx = fixture();
        let caster = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 2, 2);
        let enemy = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 6, 6);
        // The 2x2 form would need (5..6, 5..6); a wall sits at (5, 5).
        fx.world.map.set_terrain(
            TilePos::new(5, 5),
            crate::world::MapFieldFlags::WALL | crate::world::MapFieldFlags::UNPASSABLE,
            40,
        );
        let action = Polymorph {
            new_form: fx.town_hall,
            owner: PolymorphOwner::Caster,
        };

        let mut ctx = CastContext::new(&mut fx.world, &mut fx.rng);
        assert!(!action.cast(&mut ctx, caster, &polymorph_spell(), Some(enemy), TilePos::new(6, 6)));

        let target = fx.world.unit(enemy).unwrap();
        assert!(target.is_alive());
        assert_eq!(target.tile_pos, TilePos::new(6, 6));
        assert_eq!(target.hit_points(), 60);
        assert_eq!(fx.world.unit(caster).unwrap().mana(), 50);
        assert_eq!(fx.world.player(PlayerIndex(0)).unwrap().score, 0);
        assert_eq!(fx.world.unit_count(), 2);
    }

    #[test]
    fn test_polymorph_without_free_slot_leaves_everything() {
        let mut fx = fixture();
        fx.world = fx.world.clone().with_unit_limit(2);
        let caster = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 2, 2);
        let enemy = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 6, 6);
        let action = Polymorph {
            new_form: fx.critter,
            owner: PolymorphOwner::Neutral,
        };

        let mut ctx = CastContext::new(&mut fx.world, &mut fx.rng);
        assert!(!action.cast(&mut ctx, caster, &polymorph_spell(), Some(enemy), TilePos::new(6, 6)));

        let target = fx.world.unit(enemy).unwrap();
        assert!(!target.removed);
        assert_eq!(target.tile_pos, TilePos::new(6, 6));
        assert_eq!(fx.world.unit_count(), 2);
        assert_eq!(fx.world.unit(caster).unwrap().mana(), 50);
        assert_eq!(fx.world.unit(caster).unwrap().var(VarIndex::KILL), 0);
        assert_eq!(fx.world.player(PlayerIndex(0)).unwrap().score, 0);
        assert_eq!(fx.world.player(PlayerIndex(1)).unwrap().units_lost, 0);
    }

    #[test]
    fn test_capture_transfers_ownership() {
        let mut fx = fixture();
        let caster = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 2, 2);
        let enemy = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 3, 2);
        let spell = SpellType::new("spell-charm", "Charm", TargetKind::Unit).with_mana_cost(15);

        let mut ctx = CastContext::new(&mut fx.world, &mut fx.rng);
        assert!(!Capture::default().cast(&mut ctx, caster, &spell, Some(enemy), TilePos::new(3, 2)));

        assert_eq!(fx.world.unit(enemy).unwrap().owner, PlayerIndex(0));
        assert_eq!(fx.world.unit(caster).unwrap().mana(), 35);
        assert_eq!(fx.world.player(PlayerIndex(0)).unwrap().total_kills, 1);

        // Already ours: nothing happens.
        let mut ctx = CastContext::new(&mut fx.world, &mut fx.rng);
        assert!(!Capture::default().cast(&mut ctx, caster, &spell, Some(enemy), TilePos::new(3, 2)));
        assert_eq!(fx.world.unit(caster).unwrap().mana(), 35);
    }

    #[test]
    fn test_capture_damage_guard() {
        let mut fx = fixture();
        let caster = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 2, 2);
        let enemy = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 3, 2);
        let spell = SpellType::new("spell-dominate", "Dominate", TargetKind::Unit).with_mana_cost(15);
        let action = Capture {
            sacrifice: true,
            damage: 20,
            damage_percent: 50,
        };

        let mut ctx = CastContext::new(&mut fx.world, &mut fx.rng);
        assert!(action.cast(&mut ctx, caster, &spell, Some(enemy), TilePos::new(3, 2)));
        assert_eq!(fx.world.unit(enemy).unwrap().owner, PlayerIndex(1));
        assert_eq!(fx.world.unit(enemy).unwrap().hit_points(), 40);
        let sacrificed = fx.world.unit(caster).unwrap();
        assert!(sacrificed.removed);
        assert!(sacrificed.destroyed);
        assert!(!sacrificed.is_dying());
    }

    #[test]
    fn test_capture_below_guard_takes_over() {
        let mut fx = fixture();
        let caster = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 2, 2);
        let enemy = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 3, 2);
        fx.world.unit_mut(enemy).unwrap().variables[VarIndex::HIT_POINTS].value = 30;
        let spell = SpellType::new("spell-dominate", "Dominate", TargetKind::Unit).with_mana_cost(15);
        let action = Capture {
            sacrifice: false,
            damage: 20,
            damage_percent: 50,
        };

        let mut ctx = CastContext::new(&mut fx.world, &mut fx.rng);
        assert!(!action.cast(&mut ctx, caster, &spell, Some(enemy), TilePos::new(3, 2)));
        assert_eq!(fx.world.unit(enemy).unwrap().owner, PlayerIndex(0));
        assert_eq!(fx.world.unit(enemy).unwrap().hit_points(), 30);
    }
}
