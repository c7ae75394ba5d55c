//! Spell book loading
//!
//! A spell book is a JSON document listing spell definitions and which unit
//! types can cast them. Names of variables, unit types, missile types,
//! upgrades and capability flags are resolved against the world's tables.
//! A book either loads completely or defines nothing.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::action::{
    AdjustVariable, AdjustVitals, AreaAdjustVitals, AreaBombardment, Capture, Demolish, LocationBase,
    MissileLocation, Polymorph, PolymorphOwner, SpawnMissile, SpawnPortal, SpellAction, Summon,
    VariableAdjustment,
};
use super::autocast::AutoCastInfo;
use super::condition::{ConditionInfo, FlagRequirement, Tristate, VariableCondition};
use super::registry::SpellRegistry;
use super::spell::{SpellSlot, SpellType, TargetKind};
use crate::unit::{UnitTypeFlags, UnitTypeId, UpgradeId, VarIndex};
use crate::world::{MissileTypeId, PixelPos, World};

#[derive(Debug, Error)]
pub enum SpellLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Spell book parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Spell '{spell}': unknown variable '{name}'")]
    UnknownVariable { spell: String, name: String },
    #[error("Spell '{spell}': unknown unit type '{name}'")]
    UnknownUnitType { spell: String, name: String },
    #[error("Spell '{spell}': unknown missile type '{name}'")]
    UnknownMissileType { spell: String, name: String },
    #[error("Spell '{spell}': unknown upgrade '{name}'")]
    UnknownUpgrade { spell: String, name: String },
    #[error("Spell '{spell}': unknown unit type flag '{name}'")]
    UnknownFlag { spell: String, name: String },
    #[error("Spell '{spell}': negative mana cost {cost}")]
    NegativeManaCost { spell: String, cost: i32 },
    #[error("Spell '{0}' is defined twice")]
    DuplicateSpell(String),
    #[error("Unknown caster unit type '{0}'")]
    UnknownCaster(String),
    #[error("Caster '{unit_type}': unknown spell '{spell}'")]
    UnknownSpell { unit_type: String, spell: String },
}

// ----------------------------------------------------------------------
// Raw document
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawSpellBook {
    spells: Vec<RawSpell>,
    #[serde(default)]
    casters: Vec<RawCaster>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawCaster {
    unit_type: String,
    spells: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawSpell {
    ident: String,
    #[serde(default)]
    name: Option<String>,
    target: TargetKind,
    #[serde(default)]
    mana_cost: i32,
    #[serde(default)]
    range: i32,
    #[serde(default)]
    repeat_cast: bool,
    #[serde(default)]
    dependency: Option<String>,
    #[serde(default)]
    sound: Option<String>,
    #[serde(default)]
    condition: Option<RawCondition>,
    #[serde(default)]
    autocast: Option<RawAutoCast>,
    #[serde(default)]
    ai_cast: Option<RawAutoCast>,
    actions: Vec<RawAction>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
struct RawCondition {
    variables: BTreeMap<String, RawVariableCondition>,
    required_flags: Vec<String>,
    forbidden_flags: Vec<String>,
    alliance: Tristate,
    opponent: Tristate,
    target_self: Tristate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
struct RawVariableCondition {
    apply_on_caster: bool,
    enable: Tristate,
    min_value: i32,
    max_value: i32,
    min_max: i32,
    min_value_percent: i32,
    max_value_percent: i32,
}

impl Default for RawVariableCondition {
    fn default() -> Self {
        let open = VariableCondition::default();
        Self {
            apply_on_caster: open.apply_on_caster,
            enable: open.enable,
            min_value: open.min_value,
            max_value: open.max_value,
            min_max: open.min_max,
            min_value_percent: open.min_value_percent,
            max_value_percent: open.max_value_percent,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
struct RawAutoCast {
    range: i32,
    combat: Tristate,
    condition: Option<RawCondition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
struct RawLocation {
    base: LocationBase,
    add_x: i32,
    add_y: i32,
    add_rand_x: i32,
    add_rand_y: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
struct RawVariableAdjustment {
    target_is_caster: bool,
    enable: Option<bool>,
    invert_enable: bool,
    max: Option<i32>,
    add_max: i32,
    increase: Option<i32>,
    add_increase: i32,
    value: Option<i32>,
    add_value: i32,
    increase_time: i32,
}

fn default_missile_ttl() -> i32 {
    -1
}

fn default_end_point() -> RawLocation {
    RawLocation {
        base: LocationBase::Target,
        ..RawLocation::default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "kebab-case",
    deny_unknown_fields
)]
enum RawAction {
    Demolish {
        #[serde(default)]
        range: i32,
        #[serde(default)]
        damage: i32,
    },
    SpawnPortal {
        portal_type: String,
    },
    AreaAdjustVitals {
        #[serde(default)]
        hit_points: i32,
        #[serde(default)]
        mana: i32,
    },
    AreaBombardment {
        missile: String,
        #[serde(default)]
        fields: i32,
        #[serde(default)]
        shards: i32,
        #[serde(default)]
        damage: i32,
        #[serde(default)]
        start_offset_x: i32,
        #[serde(default)]
        start_offset_y: i32,
    },
    SpawnMissile {
        missile: String,
        #[serde(default)]
        start_point: RawLocation,
        #[serde(default = "default_end_point")]
        end_point: RawLocation,
        #[serde(default = "default_missile_ttl")]
        ttl: i32,
        #[serde(default)]
        delay: i32,
        #[serde(default)]
        damage: i32,
        #[serde(default)]
        use_unit_var: bool,
    },
    AdjustVariable {
        variables: BTreeMap<String, RawVariableAdjustment>,
    },
    AdjustVitals {
        #[serde(default)]
        hit_points: i32,
        #[serde(default)]
        mana: i32,
        #[serde(default)]
        max_multi_cast: i32,
    },
    Polymorph {
        new_form: String,
        #[serde(default)]
        owner: PolymorphOwner,
    },
    Capture {
        #[serde(default)]
        sacrifice: bool,
        #[serde(default)]
        damage: i32,
        #[serde(default)]
        damage_percent: i32,
    },
    Summon {
        unit_type: String,
        #[serde(default)]
        ttl: u64,
        #[serde(default)]
        require_corpse: bool,
    },
}

// ----------------------------------------------------------------------
// Name resolution
// ----------------------------------------------------------------------

struct Resolver<'a> {
    world: &'a World,
    spell: &'a str,
}

impl Resolver<'_> {
    fn variable(&self, name: &str) -> Result<VarIndex, SpellLoadError> {
        self.world
            .variables
            .lookup(name)
            .ok_or_else(|| SpellLoadError::UnknownVariable {
                spell: self.spell.to_string(),
                name: name.to_string(),
            })
    }

    fn unit_type(&self, name: &str) -> Result<UnitTypeId, SpellLoadError> {
        self.world
            .unit_type_by_ident(name)
            .ok_or_else(|| SpellLoadError::UnknownUnitType {
                spell: self.spell.to_string(),
                name: name.to_string(),
            })
    }

    fn missile(&self, name: &str) -> Result<MissileTypeId, SpellLoadError> {
        self.world
            .missile_type_by_ident(name)
            .ok_or_else(|| SpellLoadError::UnknownMissileType {
                spell: self.spell.to_string(),
                name: name.to_string(),
            })
    }

    fn upgrade(&self, name: &str) -> Result<UpgradeId, SpellLoadError> {
        self.world
            .upgrade_by_ident(name)
            .ok_or_else(|| SpellLoadError::UnknownUpgrade {
                spell: self.spell.to_string(),
                name: name.to_string(),
            })
    }

    fn flags(&self, names: &[String]) -> Result<UnitTypeFlags, SpellLoadError> {
        names.iter().try_fold(UnitTypeFlags::empty(), |acc, name| {
            UnitTypeFlags::from_name(&name.to_ascii_uppercase().replace('-', "_"))
                .map(|flag| acc | flag)
                .ok_or_else(|| SpellLoadError::UnknownFlag {
                    spell: self.spell.to_string(),
                    name: name.clone(),
                })
        })
    }

    fn condition(&self, raw: &RawCondition) -> Result<ConditionInfo, SpellLoadError> {
        let mut condition = ConditionInfo::new()
            .with_alliance(raw.alliance)
            .with_opponent(raw.opponent)
            .with_target_self(raw.target_self);
        condition.flags = FlagRequirement {
            required: self.flags(&raw.required_flags)?,
            forbidden: self.flags(&raw.forbidden_flags)?,
        };
        for (name, var) in &raw.variables {
            let entry = condition.variable_mut(self.variable(name)?);
            entry.apply_on_caster = var.apply_on_caster;
            entry.enable = var.enable;
            entry.min_value = var.min_value;
            entry.max_value = var.max_value;
            entry.min_max = var.min_max;
            entry.min_value_percent = var.min_value_percent;
            entry.max_value_percent = var.max_value_percent;
        }
        Ok(condition)
    }

    fn autocast(&self, raw: &RawAutoCast) -> Result<AutoCastInfo, SpellLoadError> {
        Ok(AutoCastInfo {
            range: raw.range,
            combat: raw.combat,
            condition: raw.condition.as_ref().map(|c| self.condition(c)).transpose()?,
        })
    }

    fn action(&self, raw: &RawAction) -> Result<SpellAction, SpellLoadError> {
        let action = match raw {
            RawAction::Demolish { range, damage } => Demolish {
                range: *range,
                damage: *damage,
            }
            .into(),
            RawAction::SpawnPortal { portal_type } => SpawnPortal {
                portal_type: self.unit_type(portal_type)?,
            }
            .into(),
            RawAction::AreaAdjustVitals { hit_points, mana } => AreaAdjustVitals {
                hit_points: *hit_points,
                mana: *mana,
            }
            .into(),
            RawAction::AreaBombardment {
                missile,
                fields,
                shards,
                damage,
                start_offset_x,
                start_offset_y,
            } => AreaBombardment {
                missile: self.missile(missile)?,
                fields: *fields,
                shards: *shards,
                damage: *damage,
                start_offset: PixelPos::new(*start_offset_x, *start_offset_y),
            }
            .into(),
            RawAction::SpawnMissile {
                missile,
                start_point,
                end_point,
                ttl,
                delay,
                damage,
                use_unit_var,
            } => SpawnMissile {
                missile: self.missile(missile)?,
                start: location(start_point),
                end: location(end_point),
                ttl: *ttl,
                delay: *delay,
                damage: *damage,
                use_unit_var: *use_unit_var,
            }
            .into(),
            RawAction::AdjustVariable { variables } => {
                let mut action = AdjustVariable::new();
                for (name, raw) in variables {
                    *action.adjustment_mut(self.variable(name)?) = adjustment(raw);
                }
                action.into()
            }
            RawAction::AdjustVitals {
                hit_points,
                mana,
                max_multi_cast,
            } => AdjustVitals {
                hit_points: *hit_points,
                mana: *mana,
                max_multi_cast: *max_multi_cast,
            }
            .into(),
            RawAction::Polymorph { new_form, owner } => Polymorph {
                new_form: self.unit_type(new_form)?,
                owner: *owner,
            }
            .into(),
            RawAction::Capture {
                sacrifice,
                damage,
                damage_percent,
            } => Capture {
                sacrifice: *sacrifice,
                damage: *damage,
                damage_percent: *damage_percent,
            }
            .into(),
            RawAction::Summon {
                unit_type,
                ttl,
                require_corpse,
            } => Summon {
                unit_type: self.unit_type(unit_type)?,
                ttl: *ttl,
                require_corpse: *require_corpse,
            }
            .into(),
        };
        Ok(action)
    }

    fn spell(&self, raw: &RawSpell) -> Result<SpellType, SpellLoadError> {
        if raw.mana_cost < 0 {
            return Err(SpellLoadError::NegativeManaCost {
                spell: raw.ident.clone(),
                cost: raw.mana_cost,
            });
        }
        let name = raw.name.as_deref().unwrap_or(&raw.ident);
        let mut spell = SpellType::new(&raw.ident, name, raw.target)
            .with_mana_cost(raw.mana_cost)
            .with_range(raw.range);
        spell.repeat_cast = raw.repeat_cast;
        spell.dependency = raw.dependency.as_deref().map(|d| self.upgrade(d)).transpose()?;
        spell.sound_when_cast = raw.sound.clone();
        spell.condition = raw.condition.as_ref().map(|c| self.condition(c)).transpose()?;
        spell.autocast = raw.autocast.as_ref().map(|a| self.autocast(a)).transpose()?;
        spell.ai_cast = raw.ai_cast.as_ref().map(|a| self.autocast(a)).transpose()?;
        spell.actions = raw
            .actions
            .iter()
            .map(|a| self.action(a))
            .collect::<Result<_, _>>()?;
        Ok(spell)
    }
}

fn location(raw: &RawLocation) -> MissileLocation {
    MissileLocation {
        base: raw.base,
        add_x: raw.add_x,
        add_y: raw.add_y,
        add_rand_x: raw.add_rand_x,
        add_rand_y: raw.add_rand_y,
    }
}

fn adjustment(raw: &RawVariableAdjustment) -> VariableAdjustment {
    VariableAdjustment {
        target_is_caster: raw.target_is_caster,
        modify_enable: raw.enable.is_some(),
        enable: raw.enable.unwrap_or_default(),
        invert_enable: raw.invert_enable,
        modify_max: raw.max.is_some(),
        max: raw.max.unwrap_or_default(),
        add_max: raw.add_max,
        modify_increase: raw.increase.is_some(),
        increase: raw.increase.unwrap_or_default(),
        add_increase: raw.add_increase,
        modify_value: raw.value.is_some(),
        value: raw.value.unwrap_or_default(),
        add_value: raw.add_value,
        increase_time: raw.increase_time,
    }
}

// ----------------------------------------------------------------------
// Loading
// ----------------------------------------------------------------------

/// Load a spell book into the registry
///
/// Caster bindings are added to the unit types' known spells. Returns the
/// number of spells defined.
pub fn load_spell_book(
    json: &str,
    world: &mut World,
    registry: &mut SpellRegistry,
) -> Result<usize, SpellLoadError> {
    let raw: RawSpellBook = serde_json::from_str(json)?;

    let mut spells = Vec::with_capacity(raw.spells.len());
    let mut new_slots: BTreeMap<&str, SpellSlot> = BTreeMap::new();
    for raw_spell in &raw.spells {
        let ident = raw_spell.ident.as_str();
        if registry.slot_of(ident).is_some() || new_slots.contains_key(ident) {
            return Err(SpellLoadError::DuplicateSpell(ident.to_string()));
        }
        let resolver = Resolver {
            world,
            spell: ident,
        };
        spells.push(resolver.spell(raw_spell)?);
        new_slots.insert(ident, SpellSlot((registry.len() + new_slots.len()) as u16));
    }

    let mut bindings = Vec::new();
    for caster in &raw.casters {
        let unit_type = world
            .unit_type_by_ident(&caster.unit_type)
            .ok_or_else(|| SpellLoadError::UnknownCaster(caster.unit_type.clone()))?;
        for spell in &caster.spells {
            let slot = new_slots
                .get(spell.as_str())
                .copied()
                .or_else(|| registry.slot_of(spell))
                .ok_or_else(|| SpellLoadError::UnknownSpell {
                    unit_type: caster.unit_type.clone(),
                    spell: spell.clone(),
                })?;
            bindings.push((unit_type, slot));
        }
    }

    let count = spells.len();
    for spell in spells {
        registry.define(spell);
    }
    for (unit_type, slot) in bindings {
        if let Some(t) = world.unit_type_mut(unit_type) {
            if !t.can_cast.contains(&slot) {
                t.can_cast.push(slot);
            }
        }
    }
    tracing::info!(spells = count, total = registry.len(), "spell book loaded");
    Ok(count)
}

/// Load a spell book from a file
pub fn load_spell_book_file(
    path: &Path,
    world: &mut World,
    registry: &mut SpellRegistry,
) -> Result<usize, SpellLoadError> {
    let json = std::fs::read_to_string(path)?;
    load_spell_book(&json, world, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture;

    const BOOK: &str = r#"{
        "spells": [
            {
                "ident": "spell-healing",
                "name": "Healing",
                "target": "unit",
                "mana-cost": 6,
                "range": 6,
                "repeat-cast": true,
                "sound": "healing",
                "condition": {
                    "alliance": "only",
                    "required-flags": ["organic"],
                    "variables": { "HitPoints": { "max-value-percent": 100 } }
                },
                "autocast": { "range": 6, "combat": "false" },
                "actions": [ { "type": "adjust-vitals", "hit-points": 1, "max-multi-cast": 10 } ]
            },
            {
                "ident": "spell-blizzard",
                "target": "position",
                "mana-cost": 5,
                "range": 12,
                "repeat-cast": true,
                "actions": [
                    {
                        "type": "area-bombardment",
                        "missile": "missile-blizzard",
                        "fields": 5,
                        "shards": 10,
                        "damage": 10,
                        "start-offset-x": -128,
                        "start-offset-y": -128
                    }
                ]
            }
        ],
        "casters": [ { "unit-type": "unit-mage", "spells": ["spell-healing", "spell-blizzard"] } ]
    }"#;

    #[test]
    fn test_load_resolves_names() {
        let mut fx = fixture();
        let mut registry = SpellRegistry::new();
        assert_eq!(load_spell_book(BOOK, &mut fx.world, &mut registry).unwrap(), 2);

        let healing = registry.by_ident("spell-healing").unwrap();
        assert_eq!(healing.slot, SpellSlot(0));
        assert_eq!(healing.mana_cost, 6);
        assert!(healing.repeat_cast);
        let condition = healing.condition.as_ref().unwrap();
        assert_eq!(condition.alliance, Tristate::Only);
        assert_eq!(condition.flags.required, UnitTypeFlags::ORGANIC);
        let hp = condition.variables[VarIndex::HIT_POINTS.index()];
        assert!(hp.check);
        assert_eq!((hp.min_value, hp.max_value_percent), (-1, 100));
        assert_eq!(healing.autocast.as_ref().unwrap().combat, Tristate::False);

        let blizzard = registry.by_ident("spell-blizzard").unwrap();
        assert_eq!(blizzard.name, "spell-blizzard");
        assert!(matches!(
            blizzard.actions[0],
            SpellAction::AreaBombardment(AreaBombardment { fields: 5, shards: 10, .. })
        ));

        let mage = fx.world.unit_type(fx.mage).unwrap();
        assert_eq!(mage.can_cast, vec![SpellSlot(0), SpellSlot(1)]);
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let mut fx = fixture();
        let mut registry = SpellRegistry::new();
        let book = BOOK.replace("HitPoints", "Stamina");
        let err = load_spell_book(&book, &mut fx.world, &mut registry).unwrap_err();
        assert!(matches!(err, SpellLoadError::UnknownVariable { ref name, .. } if name == "Stamina"));
        assert!(registry.is_empty());
        assert!(fx.world.unit_type(fx.mage).unwrap().can_cast.is_empty());
    }

    #[test]
    fn test_unknown_names_rejected() {
        let mut fx = fixture();
        let mut registry = SpellRegistry::new();

        let book = BOOK.replace("missile-blizzard", "missile-nope");
        assert!(matches!(
            load_spell_book(&book, &mut fx.world, &mut registry),
            Err(SpellLoadError::UnknownMissileType { .. })
        ));
        let book = BOOK.replace("\"organic\"", "\"flammable\"");
        assert!(matches!(
            load_spell_book(&book, &mut fx.world, &mut registry),
            Err(SpellLoadError::UnknownFlag { .. })
        ));
        let book = BOOK.replace("unit-mage", "unit-wizard");
        assert!(matches!(
            load_spell_book(&book, &mut fx.world, &mut registry),
            Err(SpellLoadError::UnknownCaster(ref name)) if name == "unit-wizard"
        ));
        let book = BOOK.replace("\"spell-blizzard\"]", "\"spell-meteor\"]");
        assert!(matches!(
            load_spell_book(&book, &mut fx.world, &mut registry),
            Err(SpellLoadError::UnknownSpell { ref spell, .. }) if spell == "spell-meteor"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut fx = fixture();
        let mut registry = SpellRegistry::new();
        let book = BOOK.replace("\"max-multi-cast\"", "\"max-multicast\"");
        assert!(matches!(
            load_spell_book(&book, &mut fx.world, &mut registry),
            Err(SpellLoadError::Json(_))
        ));
    }

    #[test]
    fn test_duplicate_and_negative_cost() {
        let mut fx = fixture();
        let mut registry = SpellRegistry::new();
        load_spell_book(BOOK, &mut fx.world, &mut registry).unwrap();
        assert!(matches!(
            load_spell_book(BOOK, &mut fx.world, &mut registry),
            Err(SpellLoadError::DuplicateSpell(ref ident)) if ident == "spell-healing"
        ));

        let mut registry = SpellRegistry::new();
        let book = BOOK.replace("\"mana-cost\": 6", "\"mana-cost\": -6");
        assert!(matches!(
            load_spell_book(&book, &mut fx.world, &mut registry),
            Err(SpellLoadError::NegativeManaCost { cost: -6, .. })
        ));
    }

    #[test]
    fn test_adjust_variable_and_missile_defaults() {
        let mut fx = fixture();
        let mut registry = SpellRegistry::new();
        let book = r#"{
            "spells": [
                {
                    "ident": "spell-invisibility",
                    "target": "unit",
                    "actions": [
                        { "type": "adjust-variable", "variables": { "Invisible": { "enable": true, "add-value": 500 } } },
                        { "type": "spawn-missile", "missile": "missile-blizzard" }
                    ]
                }
            ]
        }"#;
        load_spell_book(book, &mut fx.world, &mut registry).unwrap();
        let spell = registry.by_ident("spell-invisibility").unwrap();

        let SpellAction::AdjustVariable(adjust) = &spell.actions[0] else {
            panic!("expected adjust-variable");
        };
        let invisible = adjust.variables[VarIndex::INVISIBLE.index()];
        assert!(invisible.modify_enable && invisible.enable);
        assert!(!invisible.modify_value);
        assert_eq!(invisible.add_value, 500);

        let SpellAction::SpawnMissile(missile) = &spell.actions[1] else {
            panic!("expected spawn-missile");
        };
        assert_eq!(missile.ttl, -1);
        assert_eq!(missile.start.base, LocationBase::Caster);
        assert_eq!(missile.end.base, LocationBase::Target);
    }
}
