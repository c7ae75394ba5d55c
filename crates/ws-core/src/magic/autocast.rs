//! Automatic target selection
//!
//! Idle casters with autocast enabled (and AI casters) look for a target
//! once per step. A pick is random among the valid candidates, drawn from
//! the shared [`SyncRng`] so every participant picks the same unit.

use serde::{Deserialize, Serialize};

use super::condition::{ConditionInfo, Tristate, pass_condition};
use super::spell::{SpellType, Target, TargetKind};
use crate::rng::SyncRng;
use crate::unit::{Player, UnitId, UpgradeAllow};
use crate::world::{FlushMode, World};

/// When and around what range a spell is cast automatically
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoCastInfo {
    /// Search radius around the caster, in tiles
    pub range: i32,
    /// Whether the caster must (or must not) be near a hostile unit
    pub combat: Tristate,
    /// Checked in addition to the spell's own condition
    pub condition: Option<ConditionInfo>,
}

/// Whether the player has researched what the spell depends on
pub fn spell_is_available(player: &Player, spell: &SpellType) -> bool {
    spell
        .dependency
        .is_none_or(|upgrade| player.upgrade_allowed(upgrade) == UpgradeAllow::Researched)
}

/// Choose a target for an automatic cast
pub fn select_target(
    world: &World,
    caster: UnitId,
    spell: &SpellType,
    rng: &mut SyncRng,
) -> Option<Target> {
    let unit = world.unit(caster)?;
    let ai = world.player(unit.owner).is_some_and(|p| p.ai_enabled);
    let info = match (&spell.ai_cast, &spell.autocast) {
        (Some(ai_cast), _) if ai => ai_cast,
        (_, Some(autocast)) => autocast,
        _ => return None,
    };

    let candidates = world.select_around_unit(caster, info.range);
    let combat = candidates.iter().filter_map(|id| world.unit(*id)).any(|other| {
        world.is_enemy(unit, other) && !world.unit_type(other.type_id).is_some_and(|t| t.coward)
    });
    if info.combat.rejects(combat) {
        return None;
    }

    let passes = |target: UnitId, pos| {
        pass_condition(world, caster, spell, Some(target), pos, spell.condition.as_ref())
            && pass_condition(world, caster, spell, Some(target), pos, info.condition.as_ref())
    };

    match spell.target {
        TargetKind::SelfCast => passes(caster, unit.tile_pos).then_some(Target::Unit {
            unit: caster,
            pos: unit.tile_pos,
        }),
        TargetKind::Position => None,
        TargetKind::Unit => {
            // The window is square; the cast range is measured by map distance.
            let in_range = |id: &UnitId| {
                world
                    .unit(*id)
                    .is_some_and(|t| world.map_distance_to(unit, t.tile_pos) <= spell.range)
            };
            let valid: Vec<UnitId> = candidates
                .into_iter()
                .filter(in_range)
                .filter(|id| passes(*id, unit.tile_pos))
                .collect();
            if valid.is_empty() {
                return None;
            }
            let pick = valid[rng.sync_rand() as usize % valid.len()];
            let pos = world.unit(pick)?.tile_pos;
            Some(Target::Unit { unit: pick, pos })
        }
    }
}

/// Try to autocast a spell, queueing the cast command on success
///
/// Returns true if a command was queued.
pub fn auto_cast_spell(world: &mut World, rng: &mut SyncRng, caster: UnitId, spell: &SpellType) -> bool {
    let Some(unit) = world.unit(caster) else {
        return false;
    };
    let available = world
        .player(unit.owner)
        .is_some_and(|p| spell_is_available(p, spell));
    if !available || unit.mana() < spell.mana_cost {
        return false;
    }
    let Some(target) = select_target(world, caster, spell, rng) else {
        return false;
    };

    tracing::debug!(unit = %caster, spell = %spell.ident, "autocast");
    world
        .commands
        .enqueue_spell_cast(caster, spell.slot, target.unit(), target.pos(), FlushMode::Flush);
    true
}
