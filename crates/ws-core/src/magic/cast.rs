//! Cast sequencing
//!
//! One call of [`spell_cast`] is one cast attempt: gate, run every action,
//! charge mana, and tell the caller whether a repeat-cast spell should be
//! cast again.

use super::CastContext;
use super::action::{CastAction, debit_mana};
use super::condition::can_cast_spell;
use super::spell::{SpellType, TargetKind};
use crate::consts::MAX_SAMPLE_VOLUME;
use crate::unit::{UnitId, VarIndex};
use crate::world::TilePos;

/// Cast a spell
///
/// Returns true when the spell repeats and can be cast again right away.
pub fn spell_cast(
    ctx: &mut CastContext<'_>,
    caster: UnitId,
    spell: &SpellType,
    target: Option<UnitId>,
    goal_pos: TilePos,
) -> bool {
    let Some(unit) = ctx.world.unit_mut(caster) else {
        return false;
    };
    // Any cast attempt breaks invisibility, even one that fails below.
    if let Some(invisible) = unit.variables.get_mut(VarIndex::INVISIBLE) {
        invisible.value = 0;
    }
    let caster_pos = unit.tile_pos;

    let (target, goal_pos) = if spell.target == TargetKind::SelfCast {
        (Some(caster), caster_pos)
    } else {
        match target.and_then(|id| ctx.world.unit(id)) {
            Some(t) => (Some(t.id), t.tile_pos),
            None => (None, goal_pos),
        }
    };

    if let Some(sound) = &spell.sound_when_cast {
        ctx.world.sounds.play(sound, MAX_SAMPLE_VOLUME);
    }
    tracing::debug!(
        spell = %spell.ident,
        unit = %caster,
        target = ?target,
        x = goal_pos.x,
        y = goal_pos.y,
        "spell cast"
    );

    if !can_cast_spell(ctx.world, caster, spell, target, goal_pos) {
        return false;
    }

    let mut cont = true;
    let mut must_subtract_mana = true;
    for action in &spell.actions {
        if action.modifies_caster_mana() {
            must_subtract_mana = false;
        }
        cont &= action.cast(ctx, caster, spell, target, goal_pos);
    }
    if must_subtract_mana {
        debit_mana(ctx.world, caster, spell.mana_cost);
    }

    spell.repeat_cast && cont && can_cast_spell(ctx.world, caster, spell, target, goal_pos)
}
