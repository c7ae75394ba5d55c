//! Simulation session
//!
//! Owns the world, the spell registry and the shared random stream, and
//! advances the simulation one step at a time. Every participant of a
//! networked game runs the same steps on the same commands.

use serde::Serialize;

use crate::consts::CORPSE_CYCLES;
use crate::magic::{CastContext, SpellRegistry, SpellSlot, TargetKind, auto_cast_spell, spell_cast};
use crate::rng::SyncRng;
use crate::unit::{Order, UnitAction, UnitId};
use crate::world::{Command, FlushMode, World};

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Game cycle the step ran at
    pub cycle: u64,
    /// Commands turned into orders
    pub orders: u32,
    /// Commands dropped (stale unit, unknown spell, out of range)
    pub dropped: u32,
    /// Cast attempts
    pub casts: u32,
    /// Cast commands queued by autocast
    pub autocasts: u32,
    /// Timed units that ran out
    pub expired: u32,
    /// Unit slots freed
    pub released: u32,
}

pub struct Session {
    pub world: World,
    pub spells: SpellRegistry,
    pub rng: SyncRng,
}

impl Session {
    pub fn new(world: World, spells: SpellRegistry, seed: u64) -> Self {
        Self {
            world,
            spells,
            rng: SyncRng::new(seed),
        }
    }

    /// Turn automatic casting of a spell on or off for one unit
    ///
    /// Only spells the unit's type knows and that carry an autocast
    /// configuration can be switched on. Returns whether the setting changed.
    pub fn set_autocast(&mut self, unit: UnitId, slot: SpellSlot, on: bool) -> bool {
        let Some(spell) = self.spells.get(slot) else {
            return false;
        };
        let knows = self.world.unit_type_of(unit).is_some_and(|t| t.knows_spell(slot));
        let Some(unit) = self.world.unit_mut(unit) else {
            return false;
        };
        let enabled = unit.autocast.contains(&slot);
        match (on, enabled) {
            (true, false) if knows && (spell.autocast.is_some() || spell.ai_cast.is_some()) => {
                unit.autocast.push(slot);
                true
            }
            (false, true) => {
                unit.autocast.retain(|s| *s != slot);
                true
            }
            _ => false,
        }
    }

    /// Advance the simulation by one game cycle
    pub fn step(&mut self) -> StepReport {
        let mut report = StepReport {
            cycle: self.world.game_cycle,
            ..StepReport::default()
        };

        self.apply_commands(&mut report);
        self.run_orders(&mut report);
        self.run_autocast(&mut report);
        self.expire_units(&mut report);

        self.world.game_cycle += 1;
        report
    }

    /// Drop every spell definition
    pub fn shutdown(&mut self) {
        self.spells.shutdown();
    }

    fn apply_commands(&mut self, report: &mut StepReport) {
        for command in self.world.commands.drain() {
            let Command::SpellCast {
                unit,
                spell,
                target,
                goal_pos,
                flush,
            } = command;

            let Some(spell_type) = self.spells.get(spell) else {
                tracing::warn!(unit = %unit, spell = %spell, "cast command for unknown spell");
                report.dropped += 1;
                continue;
            };
            let Some(caster) = self.world.unit(unit).filter(|u| u.is_alive()) else {
                report.dropped += 1;
                continue;
            };

            if spell_type.target != TargetKind::SelfCast {
                let pos = target
                    .and_then(|t| self.world.unit(t))
                    .map_or(goal_pos, |t| t.tile_pos);
                let distance = self.world.map_distance_to(caster, pos);
                if distance > spell_type.range {
                    tracing::debug!(
                        unit = %unit,
                        spell = %spell_type.ident,
                        distance,
                        range = spell_type.range,
                        "cast out of range"
                    );
                    report.dropped += 1;
                    continue;
                }
            }

            if flush == FlushMode::Flush {
                self.world.clear_orders(unit);
            }
            if let Some(caster) = self.world.unit_mut(unit) {
                caster.orders.push_back(Order::SpellCast {
                    spell,
                    target,
                    goal_pos,
                });
                report.orders += 1;
            }
        }
    }

    fn run_orders(&mut self, report: &mut StepReport) {
        for id in self.world.unit_ids() {
            let Some(unit) = self.world.unit(id).filter(|u| u.is_alive()) else {
                continue;
            };
            let Some(&Order::SpellCast {
                spell,
                target,
                goal_pos,
            }) = unit.orders.front()
            else {
                continue;
            };

            let again = match self.spells.get(spell) {
                Some(spell_type) => {
                    if let Some(unit) = self.world.unit_mut(id) {
                        unit.action = UnitAction::SpellCast;
                    }
                    report.casts += 1;
                    let mut ctx = CastContext::new(&mut self.world, &mut self.rng);
                    spell_cast(&mut ctx, id, spell_type, target, goal_pos)
                }
                None => false,
            };

            // The cast may have removed, replaced or killed the caster.
            if let Some(unit) = self.world.unit_mut(id) {
                if !again {
                    unit.orders.pop_front();
                }
                if unit.orders.is_empty() && unit.action == UnitAction::SpellCast {
                    unit.action = UnitAction::Still;
                }
            }
        }
    }

    fn run_autocast(&mut self, report: &mut StepReport) {
        for id in self.world.unit_ids() {
            let Some(unit) = self.world.unit(id).filter(|u| u.is_alive() && u.is_idle()) else {
                continue;
            };
            let Some(unit_type) = self.world.unit_type(unit.type_id) else {
                continue;
            };
            let slots: Vec<SpellSlot> = unit
                .autocast
                .iter()
                .copied()
                .filter(|slot| unit_type.knows_spell(*slot))
                .collect();

            for slot in slots {
                let Some(spell) = self.spells.get(slot) else {
                    continue;
                };
                if auto_cast_spell(&mut self.world, &mut self.rng, id, spell) {
                    report.autocasts += 1;
                    break;
                }
            }
        }
    }

    fn expire_units(&mut self, report: &mut StepReport) {
        let cycle = self.world.game_cycle;
        for id in self.world.unit_ids() {
            let Some(unit) = self.world.unit(id) else {
                continue;
            };
            if unit.destroyed {
                self.world.release(id);
                report.released += 1;
            } else if unit.is_dying() {
                if unit
                    .death_cycle
                    .is_some_and(|died| cycle >= died.saturating_add(CORPSE_CYCLES))
                {
                    tracing::trace!(unit = %id, "corpse decayed");
                    self.world.release(id);
                    report.released += 1;
                }
            } else if unit.ttl.is_some_and(|ttl| cycle >= ttl) && !unit.removed {
                tracing::debug!(unit = %id, "summoned unit expired");
                self.world.let_unit_die(id);
                report.expired += 1;
            }
        }
    }
}
