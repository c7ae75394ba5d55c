//! Variable and vitals adjustment

use super::{CastAction, debit_mana};
use crate::magic::CastContext;
use crate::magic::spell::SpellType;
use crate::unit::{UnitId, VarIndex};
use crate::world::TilePos;

/// How one variable is changed by [`AdjustVariable`]
///
/// Fields are applied in the order enable, max, increase, value. Each
/// `modify_*` switch overwrites first, then the `add_*` delta is added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableAdjustment {
    /// Change the caster rather than the target
    pub target_is_caster: bool,
    pub modify_enable: bool,
    pub enable: bool,
    pub invert_enable: bool,
    pub modify_max: bool,
    pub max: i32,
    pub add_max: i32,
    pub modify_increase: bool,
    pub increase: i32,
    pub add_increase: i32,
    pub modify_value: bool,
    pub value: i32,
    pub add_value: i32,
    /// Extra value gained as this many ticks of the variable's increase
    pub increase_time: i32,
}

/// Change arbitrary variables of the caster or the target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjustVariable {
    /// Indexed like the world's variable table
    pub variables: Vec<VariableAdjustment>,
}

impl AdjustVariable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adjustment_mut(&mut self, index: VarIndex) -> &mut VariableAdjustment {
        if self.variables.len() <= index.index() {
            self.variables
                .resize(index.index() + 1, VariableAdjustment::default());
        }
        &mut self.variables[index.index()]
    }

    pub fn with(mut self, index: VarIndex, f: impl FnOnce(&mut VariableAdjustment)) -> Self {
        f(self.adjustment_mut(index));
        self
    }
}

impl CastAction for AdjustVariable {
    fn cast(
        &self,
        ctx: &mut CastContext<'_>,
        caster: UnitId,
        _spell: &SpellType,
        target: Option<UnitId>,
        _goal_pos: TilePos,
    ) -> bool {
        for (i, adjust) in self.variables.iter().enumerate() {
            let subject = if adjust.target_is_caster {
                Some(caster)
            } else {
                target
            };
            let Some(var) = subject
                .and_then(|id| ctx.world.unit_mut(id))
                .and_then(|u| u.variables.get_mut(VarIndex(i as u16)))
            else {
                continue;
            };

            if adjust.modify_enable {
                var.enable = adjust.enable;
            }
            var.enable ^= adjust.invert_enable;

            if adjust.modify_max {
                var.max = adjust.max;
            }
            var.max = var.max.saturating_add(adjust.add_max);

            if adjust.modify_increase {
                var.increase = adjust.increase;
            }
            var.increase = var.increase.saturating_add(adjust.add_increase);

            if adjust.modify_value {
                var.value = adjust.value;
            }
            var.value = var
                .value
                .saturating_add(adjust.add_value)
                .saturating_add(adjust.increase_time.saturating_mul(var.increase));
            var.clamp();
        }
        true
    }
}

/// Heal or harm a single target, batching as many casts as useful
///
/// The number of casts is what it takes to fill (or drain) the target,
/// bounded by the caster's mana and `max_multi_cast`. All of them are paid
/// and applied in one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustVitals {
    /// Hit points per cast, negative to harm
    pub hit_points: i32,
    /// Mana per cast, negative to drain
    pub mana: i32,
    /// Cap on batched casts, 0 for none
    pub max_multi_cast: i32,
}

/// Casts needed to cover `diff` with steps of `delta`
///
/// A harming partial step counts as a whole cast.
fn casts_to_cover(diff: i32, delta: i32) -> i32 {
    if delta == 0 {
        return 1;
    }
    let step = delta.saturating_abs();
    diff / step + i32::from(delta < 0 && diff % step > 0)
}

impl CastAction for AdjustVitals {
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

        let hp = target_unit
            .variables
            .get(VarIndex::HIT_POINTS)
            .copied()
            .unwrap_or_default();
        let mana = target_unit
            .variables
            .get(VarIndex::MANA)
            .copied()
            .unwrap_or_default();
        let mana_capacity = world
            .unit_type(target_unit.type_id)
            .and_then(|t| t.stats.get(VarIndex::MANA))
            .map_or(0, |v| v.max);

        let diff_hp = if self.hit_points > 0 {
            hp.max - hp.value
        } else {
            hp.value
        };
        let diff_mana = if self.mana > 0 {
            mana_capacity - mana.value
        } else {
            mana.value
        };

        let mut cast_count = 1;
        if self.hit_points != 0 {
            cast_count = cast_count.max(casts_to_cover(diff_hp, self.hit_points));
        }
        if self.mana != 0 {
            cast_count = cast_count.max(casts_to_cover(diff_mana, self.mana));
        }
        if spell.mana_cost > 0 {
            cast_count = cast_count.min(caster_unit.mana() / spell.mana_cost);
        }
        if self.max_multi_cast > 0 {
            cast_count = cast_count.min(self.max_multi_cast);
        }

        debit_mana(world, caster, cast_count.saturating_mul(spell.mana_cost));

        let hp_delta = cast_count.saturating_mul(self.hit_points);
        if self.hit_points < 0 && caster != target {
            world.hit_unit(Some(caster), target, hp_delta.saturating_neg());
        } else if let Some(var) = world
            .unit_mut(target)
            .and_then(|u| u.variables.get_mut(VarIndex::HIT_POINTS))
        {
            var.add_clamped(hp_delta);
        }

        if let Some(var) = world
            .unit_mut(target)
            .and_then(|u| u.variables.get_mut(VarIndex::MANA))
        {
            var.add_clamped(cast_count.saturating_mul(self.mana));
        }
        spell.repeat_cast
    }

    fn modifies_caster_mana(&self) -> bool {
        true
    }
}
