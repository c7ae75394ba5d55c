//! Actions that bring new units into play: portals and summons

use super::{CastAction, debit_mana};
use crate::magic::CastContext;
use crate::magic::spell::SpellType;
use crate::unit::{PlayerIndex, Unit, UnitId, UnitTypeId};
use crate::world::TilePos;

/// Put the caster's portal exit at the goal, reusing the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPortal {
    pub portal_type: UnitTypeId,
}

impl CastAction for SpawnPortal {
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        _spell: &SpellType,
        _target: Option<UnitId>,
        goal_pos: TilePos,
    ) -> bool {
        let world = &mut *ctx.world;
        let existing = world
            .unit(caster)
            .and_then(|c| c.goal)
            .filter(|id| world.unit(*id).is_some_and(Unit::is_alive));

        tracing::debug!(unit = %caster, x = goal_pos.x, y = goal_pos.y, "spawning a portal exit");
        let portal = match existing {
            Some(portal) => {
                world.move_to(portal, goal_pos);
                Some(portal)
            }
            None => world.make_unit_and_place(goal_pos, self.portal_type, PlayerIndex::NEUTRAL),
        };
        if let Some(unit) = world.unit_mut(caster) {
            unit.goal = portal;
        }
        false
    }
}

/// Create a unit for the caster's player, optionally raised from a corpse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summon {
    pub unit_type: UnitTypeId,
    /// Lifetime in game cycles, 0 for a permanent unit
    pub ttl: u64,
    pub require_corpse: bool,
}

impl CastAction for Summon {
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        spell: &SpellType,
        _target: Option<UnitId>,
        goal_pos: TilePos,
    ) -> bool {
        let world = &mut *ctx.world;
        let Some(owner) = world.unit(caster).map(|u| u.owner) else {
            return false;
        };
        let mut pos = goal_pos;

        if self.require_corpse {
            let corner = TilePos::new(1, 1);
            let corpse = world.find_if(goal_pos - corner, goal_pos + corner, |unit, unit_type| {
                unit.is_dying() && !unit_type.building
            });
            let Some(corpse) = corpse else {
                return false;
            };
            if let Some(unit) = world.unit(corpse) {
                pos = unit.tile_pos;
            }
            world.remove(corpse);
            world.release(corpse);
        }

        let Some(summoned) = world.make_unit(self.unit_type, owner) else {
            tracing::warn!(unit_type = self.unit_type.0, "unable to allocate summoned unit");
            return true;
        };
        tracing::debug!(unit = %summoned, x = pos.x, y = pos.y, "summoning");
        world.move_to(summoned, pos);
        if !world.drop_out_on_side(summoned) {
            world.discard(summoned);
            return true;
        }
        if self.ttl != 0 {
            let expires = world.game_cycle + self.ttl;
            if let Some(unit) = world.unit_mut(summoned) {
                unit.ttl = Some(expires);
            }
        }
        debit_mana(world, caster, spell.mana_cost);
        true
    }

    fn modifies_caster_mana(&self) -> bool {
        true
    }
}
