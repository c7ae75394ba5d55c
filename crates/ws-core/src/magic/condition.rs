//! Cast conditions
//!
//! A [`ConditionInfo`] is a small rule set evaluated against a caster and
//! an optional target: bounds on tracked variables, capability flags of the
//! target's type and the relation between caster and target.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::spell::{SpellType, TargetKind};
use crate::unit::{UnitId, UnitTypeFlags, UnitVariable, VarIndex};
use crate::world::{TilePos, World};

/// Three-valued requirement on a boolean fact
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Tristate {
    /// Don't care
    #[default]
    True,
    /// The fact must hold
    Only,
    /// The fact must not hold
    False,
}

impl Tristate {
    /// Whether the requirement fails for the given fact
    pub fn rejects(self, fact: bool) -> bool {
        self != Tristate::True && ((self == Tristate::Only) ^ fact)
    }
}

/// Bounds on one tracked variable
///
/// `min_value` and `min_max` are exclusive lower bounds, `max_value` an
/// exclusive upper bound with -1 meaning unbounded. The percentage bounds
/// compare value against max and are skipped when max is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableCondition {
    /// Entries with `check == false` are ignored
    pub check: bool,
    /// Test the caster instead of the target
    pub apply_on_caster: bool,
    pub enable: Tristate,
    pub min_value: i32,
    pub max_value: i32,
    pub min_max: i32,
    pub min_value_percent: i32,
    pub max_value_percent: i32,
}

impl Default for VariableCondition {
    fn default() -> Self {
        Self {
            check: false,
            apply_on_caster: false,
            enable: Tristate::True,
            min_value: -1,
            max_value: -1,
            min_max: -1,
            min_value_percent: -8,
            max_value_percent: 1024,
        }
    }
}

impl VariableCondition {
    /// A checked entry with every bound open
    pub fn checked() -> Self {
        Self {
            check: true,
            ..Self::default()
        }
    }

    fn rejects(&self, var: &UnitVariable) -> bool {
        if self.enable.rejects(var.enable) {
            return true;
        }
        if self.min_value >= var.value {
            return true;
        }
        if self.max_value != -1 && self.max_value <= var.value {
            return true;
        }
        if self.min_max >= var.max {
            return true;
        }
        if var.max == 0 {
            return false;
        }
        let max = i64::from(var.max);
        let value = 100 * i64::from(var.value);
        i64::from(self.min_value_percent) * max >= value
            || i64::from(self.max_value_percent) * max <= value
    }
}

/// Capability flags the target's unit type must have and must lack
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRequirement {
    pub required: UnitTypeFlags,
    pub forbidden: UnitTypeFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionInfo {
    /// Indexed like the world's variable table
    pub variables: Vec<VariableCondition>,
    pub flags: FlagRequirement,
    /// Caster and target are allies or have the same owner
    pub alliance: Tristate,
    /// Caster and target are enemies
    pub opponent: Tristate,
    /// Caster and target are the same unit
    pub target_self: Tristate,
}

impl ConditionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for a variable, created checked with open bounds if missing
    pub fn variable_mut(&mut self, index: VarIndex) -> &mut VariableCondition {
        if self.variables.len() <= index.index() {
            self.variables
                .resize(index.index() + 1, VariableCondition::default());
        }
        let entry = &mut self.variables[index.index()];
        entry.check = true;
        entry
    }

    pub fn with_variable(mut self, index: VarIndex, f: impl FnOnce(&mut VariableCondition)) -> Self {
        f(self.variable_mut(index));
        self
    }

    pub fn with_flags(mut self, required: UnitTypeFlags, forbidden: UnitTypeFlags) -> Self {
        self.flags = FlagRequirement { required, forbidden };
        self
    }

    pub fn with_alliance(mut self, alliance: Tristate) -> Self {
        self.alliance = alliance;
        self
    }

    pub fn with_opponent(mut self, opponent: Tristate) -> Self {
        self.opponent = opponent;
        self
    }

    pub fn with_target_self(mut self, target_self: Tristate) -> Self {
        self.target_self = target_self;
        self
    }
}

/// Evaluate a condition for a cast
///
/// Mana and target liveness are checked before the condition itself, so an
/// absent condition still gates on them. A caster that no longer exists
/// never passes.
pub fn pass_condition(
    world: &World,
    caster: UnitId,
    spell: &SpellType,
    target: Option<UnitId>,
    _goal_pos: TilePos,
    condition: Option<&ConditionInfo>,
) -> bool {
    let Some(caster_unit) = world.unit(caster) else {
        return false;
    };
    if caster_unit.mana() < spell.mana_cost {
        return false;
    }
    let target_unit = target.and_then(|id| world.unit(id));
    if spell.target == TargetKind::Unit
        && !target_unit.is_some_and(|t| !t.destroyed && !t.is_dying())
    {
        return false;
    }
    let Some(condition) = condition else {
        return true;
    };

    for (i, entry) in condition.variables.iter().enumerate() {
        if !entry.check {
            continue;
        }
        let subject = if entry.apply_on_caster {
            Some(caster_unit)
        } else {
            target_unit
        };
        let Some(subject) = subject else {
            continue;
        };
        let var = subject
            .variables
            .get(VarIndex(i as u16))
            .copied()
            .unwrap_or_default();
        if entry.rejects(&var) {
            return false;
        }
    }

    let Some(target_unit) = target_unit else {
        return true;
    };
    let flags_ok = world
        .unit_type(target_unit.type_id)
        .is_some_and(|t| t.check_flags(condition.flags.required, condition.flags.forbidden));
    if !flags_ok {
        return false;
    }

    let allied = world.is_allied(caster_unit, target_unit) || caster_unit.owner == target_unit.owner;
    if condition.alliance.rejects(allied) {
        return false;
    }
    if condition.opponent.rejects(world.is_enemy(caster_unit, target_unit)) {
        return false;
    }
    !condition.target_self.rejects(caster_unit.id == target_unit.id)
}

/// Whether a caster may cast a spell right now with its own condition
pub fn can_cast_spell(
    world: &World,
    caster: UnitId,
    spell: &SpellType,
    target: Option<UnitId>,
    goal_pos: TilePos,
) -> bool {
    if spell.target == TargetKind::Unit && target.is_none() {
        return false;
    }
    pass_condition(world, caster, spell, target, goal_pos, spell.condition.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, spawn};
    use crate::unit::PlayerIndex;

    fn heal_spell(condition: ConditionInfo) -> SpellType {
        SpellType::new("spell-test", "Test", TargetKind::Unit)
            .with_mana_cost(5)
            .with_condition(condition)
    }

    #[test]
    fn test_tristate_rejects() {
        assert!(!Tristate::True.rejects(true));
        assert!(!Tristate::True.rejects(false));
        assert!(Tristate::Only.rejects(false));
        assert!(!Tristate::Only.rejects(true));
        assert!(Tristate::False.rejects(true));
        assert!(!Tristate::False.rejects(false));
    }

    #[test]
    fn test_mana_and_target_gates() {
        let mut fx = fixture();
        let mage = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 5, 5);
        let friend = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 6, 5);
        let spell = heal_spell(ConditionInfo::new());
        let pos = TilePos::new(6, 5);

        assert!(pass_condition(&fx.world, mage, &spell, Some(friend), pos, None));
        assert!(!pass_condition(&fx.world, mage, &spell, None, pos, None));

        fx.world.let_unit_die(friend);
        assert!(!pass_condition(&fx.world, mage, &spell, Some(friend), pos, None));

        fx.world.unit_mut(mage).unwrap().variables[VarIndex::MANA].value = 4;
        let other = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 7, 5);
        assert!(!pass_condition(&fx.world, mage, &spell, Some(other), pos, None));
    }

    #[test]
    fn test_strict_and_inclusive_bounds() {
        let mut fx = fixture();
        let mage = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 5, 5);
        let friend = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 6, 5);
        let pos = TilePos::new(6, 5);
        fx.world.unit_mut(friend).unwrap().variables[VarIndex::HIT_POINTS].value = 30;

        let at_min = heal_spell(ConditionInfo::new().with_variable(VarIndex::HIT_POINTS, |v| v.min_value = 30));
        assert!(!can_cast_spell(&fx.world, mage, &at_min, Some(friend), pos));
        let below_min =
            heal_spell(ConditionInfo::new().with_variable(VarIndex::HIT_POINTS, |v| v.min_value = 29));
        assert!(can_cast_spell(&fx.world, mage, &below_min, Some(friend), pos));

        let at_max = heal_spell(ConditionInfo::new().with_variable(VarIndex::HIT_POINTS, |v| v.max_value = 30));
        assert!(!can_cast_spell(&fx.world, mage, &at_max, Some(friend), pos));
        let above_max =
            heal_spell(ConditionInfo::new().with_variable(VarIndex::HIT_POINTS, |v| v.max_value = 31));
        assert!(can_cast_spell(&fx.world, mage, &above_max, Some(friend), pos));
    }

    #[test]
    fn test_percent_bounds() {
        let mut fx = fixture();
        let mage = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 5, 5);
        let friend = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 6, 5);
        let pos = TilePos::new(6, 5);

        // Footman is at 60/60: a "wounded only" heal must refuse it.
        let wounded_only =
            heal_spell(ConditionInfo::new().with_variable(VarIndex::HIT_POINTS, |v| v.max_value_percent = 100));
        assert!(!can_cast_spell(&fx.world, mage, &wounded_only, Some(friend), pos));

        fx.world.unit_mut(friend).unwrap().variables[VarIndex::HIT_POINTS].value = 59;
        assert!(can_cast_spell(&fx.world, mage, &wounded_only, Some(friend), pos));

        let healthy_only =
            heal_spell(ConditionInfo::new().with_variable(VarIndex::HIT_POINTS, |v| v.min_value_percent = 50));
        fx.world.unit_mut(friend).unwrap().variables[VarIndex::HIT_POINTS].value = 30;
        assert!(!can_cast_spell(&fx.world, mage, &healthy_only, Some(friend), pos));
    }

    #[test]
    fn test_percent_skipped_when_max_zero() {
        let mut fx = fixture();
        let mage = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 5, 5);
        let friend = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 6, 5);
        // Footmen have no mana: max 0.
        let spell = heal_spell(ConditionInfo::new().with_variable(VarIndex::MANA, |v| {
            v.min_value = -1;
            v.min_max = -1;
            v.min_value_percent = 1000;
        }));
        assert!(can_cast_spell(&fx.world, mage, &spell, Some(friend), TilePos::new(6, 5)));
    }

    #[test]
    fn test_enable_requirement() {
        let mut fx = fixture();
        let mage = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 5, 5);
        let friend = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 6, 5);
        let pos = TilePos::new(6, 5);
        let not_invisible = heal_spell(ConditionInfo::new().with_variable(VarIndex::INVISIBLE, |v| {
            v.enable = Tristate::False;
            v.min_value = i32::MIN;
            v.min_max = i32::MIN;
        }));
        assert!(can_cast_spell(&fx.world, mage, &not_invisible, Some(friend), pos));

        fx.world.unit_mut(friend).unwrap().variables[VarIndex::INVISIBLE].enable = true;
        assert!(!can_cast_spell(&fx.world, mage, &not_invisible, Some(friend), pos));
    }

    #[test]
    fn test_apply_on_caster() {
        let mut fx = fixture();
        let mage = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 5, 5);
        let friend = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 6, 5);
        let spell = heal_spell(ConditionInfo::new().with_variable(VarIndex::MANA, |v| {
            v.apply_on_caster = true;
            v.min_value = 40;
        }));
        // Mage starts with 50 mana.
        assert!(can_cast_spell(&fx.world, mage, &spell, Some(friend), TilePos::new(6, 5)));
        fx.world.unit_mut(mage).unwrap().variables[VarIndex::MANA].value = 40;
        assert!(!can_cast_spell(&fx.world, mage, &spell, Some(friend), TilePos::new(6, 5)));
    }

    #[test]
    fn test_unit_conditions_skipped_without_target() {
        let mut fx = fixture();
        let mage = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 5, 5);
        let spell = SpellType::new("spell-area", "Area", TargetKind::Position).with_condition(
            ConditionInfo::new()
                .with_variable(VarIndex::HIT_POINTS, |v| v.min_value = 1000)
                .with_opponent(Tristate::Only),
        );
        assert!(can_cast_spell(&fx.world, mage, &spell, None, TilePos::new(9, 9)));
    }

    #[test]
    fn test_relations() {
        let mut fx = fixture();
        let mage = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 5, 5);
        let own = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 6, 5);
        let ally = spawn(&mut fx.world, fx.footman, PlayerIndex(2), 7, 5);
        let enemy = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 8, 5);
        let pos = TilePos::new(0, 0);

        let friendly = heal_spell(ConditionInfo::new().with_alliance(Tristate::Only));
        assert!(can_cast_spell(&fx.world, mage, &friendly, Some(own), pos));
        assert!(can_cast_spell(&fx.world, mage, &friendly, Some(ally), pos));
        assert!(!can_cast_spell(&fx.world, mage, &friendly, Some(enemy), pos));

        let hostile = heal_spell(ConditionInfo::new().with_opponent(Tristate::Only));
        assert!(can_cast_spell(&fx.world, mage, &hostile, Some(enemy), pos));
        assert!(!can_cast_spell(&fx.world, mage, &hostile, Some(ally), pos));

        let not_self = heal_spell(ConditionInfo::new().with_target_self(Tristate::False));
        assert!(!can_cast_spell(&fx.world, mage, &not_self, Some(mage), pos));
        assert!(can_cast_spell(&fx.world, mage, &not_self, Some(own), pos));
    }

    #[test]
    fn test_flag_requirement() {
        let mut fx = fixture();
        let mage = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 5, 5);
        let footman = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 6, 5);
        let skeleton = spawn(&mut fx.world, fx.skeleton, PlayerIndex(0), 7, 5);
        let organic = heal_spell(
            ConditionInfo::new().with_flags(UnitTypeFlags::ORGANIC, UnitTypeFlags::UNDEAD),
        );
        assert!(can_cast_spell(&fx.world, mage, &organic, Some(footman), TilePos::new(0, 0)));
        assert!(!can_cast_spell(&fx.world, mage, &organic, Some(skeleton), TilePos::new(0, 0)));
    }

    #[test]
    fn test_released_target_is_rejected() {
        let mut fx = fixture();
        let mage = spawn(&mut fx.world, fx.mage, PlayerIndex(0), 5, 5);
        let friend = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 6, 5);
        let spell = heal_spell(ConditionInfo::new());
        fx.world.release(friend);
        assert!(!can_cast_spell(&fx.world, mage, &spell, Some(friend), TilePos::new(6, 5)));
    }
}
