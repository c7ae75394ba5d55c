//! Scripted two-player battle
//!
//! Both sides field a mirrored line of soldiers with casters behind it.
//! Autocast does most of the work; a few area spells are ordered by
//! script so that every step of the run goes through the command queue.

use anyhow::{Context, Result};
use serde::Serialize;

use ws_core::unit::{PlayerIndex, UnitId, VarIndex};
use ws_core::world::{FlushMode, TilePos};
use ws_core::{Session, StepReport};
use ws_data::{research_spell_upgrades, spawn_unit, standard_session};

const WIDTH: i32 = 40;
const HEIGHT: i32 = 20;
/// Column of the first player's front line; the second mirrors it
const FRONT: i32 = 18;

/// Unit type per side, column offset behind the front, row
const ROSTER: &[(&str, &str, i32, i32)] = &[
    ("unit-footman", "unit-grunt", 0, 7),
    ("unit-footman", "unit-grunt", 0, 8),
    ("unit-footman", "unit-grunt", 0, 9),
    ("unit-footman", "unit-grunt", 0, 10),
    ("unit-paladin", "unit-death-knight", 2, 8),
    ("unit-mage", "unit-ogre-mage", 2, 9),
];

/// Cycle, caster index in the roster, target row, then spell and target
/// column per side. Negative columns lie past the front, toward the enemy.
const SCRIPT: &[(u64, usize, i32, [(&str, i32); 2])] = &[
    (5, 5, 8, [("spell-blizzard", -3), ("spell-eye-of-vision", -6)]),
    (12, 4, 9, [("spell-healing-wave", 0), ("spell-death-and-decay", -3)]),
    (30, 4, 8, [("spell-holy-vision", -8), ("spell-raise-dead", -1)]),
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct Outcome {
    pub seed: u64,
    pub steps: u64,
    pub orders: u32,
    pub dropped: u32,
    pub casts: u32,
    pub autocasts: u32,
    pub expired: u32,
    pub missiles: usize,
    pub sounds: usize,
    /// Living units per side at the end
    pub survivors: [usize; 2],
    pub rng_draws: u64,
    /// FNV-1a over the serialized world and the random stream position
    pub digest: u64,
}

fn tile(side: usize, column: i32, row: i32) -> TilePos {
    match side {
        0 => TilePos::new(FRONT - column, row),
        _ => TilePos::new(WIDTH - 1 - FRONT + column, row),
    }
}

fn setup(seed: u64) -> Result<(Session, [Vec<UnitId>; 2])> {
    let mut session = standard_session(WIDTH, HEIGHT, seed).context("building session")?;
    let sides = [PlayerIndex(0), PlayerIndex(1)];
    session.world.set_mutual_enemies(sides[0], sides[1]);

    let mut armies: [Vec<UnitId>; 2] = [Vec::new(), Vec::new()];
    for (side, player) in sides.into_iter().enumerate() {
        research_spell_upgrades(&mut session.world, player);
        for (i, &(first, second, column, row)) in ROSTER.iter().enumerate() {
            let ident = if side == 0 { first } else { second };
            let unit = spawn_unit(&mut session, ident, player, tile(side, column, row))
                .with_context(|| format!("placing {ident}"))?;
            if column == 0 {
                if let Some(unit) = session.world.unit_mut(unit) {
                    let hp = &mut unit.variables[VarIndex::HIT_POINTS];
                    hp.value = (hp.max - 10 * i as i32).max(1);
                }
            }
            armies[side].push(unit);
        }
    }
    Ok((session, armies))
}

fn issue_script(session: &mut Session, armies: &[Vec<UnitId>; 2]) {
    let cycle = session.world.game_cycle;
    for &(_, caster, row, orders) in SCRIPT.iter().filter(|s| s.0 == cycle) {
        for (side, (ident, column)) in orders.into_iter().enumerate() {
            let Some(slot) = session.spells.slot_of(ident) else {
                continue;
            };
            tracing::debug!(cycle, side, spell = ident, "scripted cast");
            session.world.commands.enqueue_spell_cast(
                armies[side][caster],
                slot,
                None,
                tile(side, column, row),
                FlushMode::Flush,
            );
        }
    }
}

/// 64-bit FNV-1a
pub fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

pub fn run(seed: u64, steps: u64) -> Result<Outcome> {
    let (mut session, armies) = setup(seed)?;
    let mut outcome = Outcome {
        seed,
        steps,
        ..Outcome::default()
    };

    for _ in 0..steps {
        issue_script(&mut session, &armies);
        let StepReport {
            orders,
            dropped,
            casts,
            autocasts,
            expired,
            ..
        } = session.step();
        outcome.orders += orders;
        outcome.dropped += dropped;
        outcome.casts += casts;
        outcome.autocasts += autocasts;
        outcome.expired += expired;
        outcome.missiles += session.world.missiles.take_launched().len();
        outcome.sounds += session.world.sounds.drain().len();
    }

    for (side, survivors) in outcome.survivors.iter_mut().enumerate() {
        let owner = PlayerIndex(side as u8);
        *survivors = session
            .world
            .units()
            .filter(|u| u.owner == owner && u.is_alive())
            .count();
    }
    outcome.rng_draws = session.rng.draws();

    let mut state = serde_json::to_vec(&session.world).context("serializing world")?;
    state.extend_from_slice(&serde_json::to_vec(&session.rng).context("serializing random stream")?);
    outcome.digest = fnv1a(&state);

    session.shutdown();
    Ok(outcome)
}
