//! The simulated world
//!
//! Owns the map, the type tables, the players and the unit arena, and
//! provides the unit lifecycle operations spells rely on. Units live in
//! generational slots so that [`UnitId`] handles stay weak.

use serde::{Deserialize, Serialize};

use super::command::CommandQueue;
use super::map::{GameMap, MapFieldFlags, TilePos};
use super::missile::{MissileType, MissileTypeId, Missiles};
use super::sound::SoundQueue;
use crate::consts::{PLAYER_MAX, UNIT_MAX};
use crate::unit::{
    MovementKind, Player, PlayerIndex, Unit, UnitAction, UnitId, UnitType, UnitTypeId, UpgradeId,
    VarIndex, VariableTable,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UnitSlot {
    generation: u32,
    unit: Option<Unit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub map: GameMap,
    pub variables: VariableTable,
    unit_types: Vec<UnitType>,
    missile_types: Vec<MissileType>,
    upgrades: Vec<String>,
    players: Vec<Player>,
    slots: Vec<UnitSlot>,
    free_slots: Vec<u32>,
    unit_limit: usize,
    pub missiles: Missiles,
    pub sounds: SoundQueue,
    pub commands: CommandQueue,
    pub game_cycle: u64,
    /// Experience for a kill is the victim's remaining hit points instead
    /// of its point value
    pub use_hp_for_xp: bool,
}

impl World {
    pub fn new(width: i32, height: i32) -> Self {
        let players = (0..PLAYER_MAX)
            .map(|i| {
                let index = PlayerIndex(i as u8);
                if index == PlayerIndex::NEUTRAL {
                    Player::new(index, "Neutral")
                } else {
                    Player::new(index, &format!("Player {}", i + 1))
                }
            })
            .collect();

        Self {
            map: GameMap::new(width, height),
            variables: VariableTable::new(),
            unit_types: Vec::new(),
            missile_types: Vec::new(),
            upgrades: Vec::new(),
            players,
            slots: Vec::new(),
            free_slots: Vec::new(),
            unit_limit: UNIT_MAX,
            missiles: Missiles::default(),
            sounds: SoundQueue::default(),
            commands: CommandQueue::default(),
            game_cycle: 0,
            use_hp_for_xp: false,
        }
    }

    /// Cap the number of live unit slots; `make_unit` fails past it
    pub fn with_unit_limit(mut self, limit: usize) -> Self {
        self.unit_limit = limit;
        self
    }

    // ------------------------------------------------------------------
    // Type tables
    // ------------------------------------------------------------------

    /// Define a tracked variable and grow every store to hold it
    pub fn define_variable(&mut self, name: &str) -> VarIndex {
        let index = self.variables.define(name);
        let count = self.variables.len();
        for unit_type in &mut self.unit_types {
            unit_type.stats.resize(count);
        }
        for unit in self.slots.iter_mut().filter_map(|s| s.unit.as_mut()) {
            unit.variables.resize(count);
        }
        index
    }

    pub fn define_unit_type(&mut self, mut unit_type: UnitType) -> UnitTypeId {
        let id = UnitTypeId(self.unit_types.len() as u16);
        unit_type.id = id;
        unit_type.stats.resize(self.variables.len());
        self.unit_types.push(unit_type);
        id
    }

    pub fn unit_type(&self, id: UnitTypeId) -> Option<&UnitType> {
        self.unit_types.get(id.0 as usize)
    }

    pub fn unit_type_mut(&mut self, id: UnitTypeId) -> Option<&mut UnitType> {
        self.unit_types.get_mut(id.0 as usize)
    }

    pub fn unit_type_by_ident(&self, ident: &str) -> Option<UnitTypeId> {
        self.unit_types.iter().find(|t| t.ident == ident).map(|t| t.id)
    }

    pub fn unit_types(&self) -> &[UnitType] {
        &self.unit_types
    }

    pub fn define_missile_type(&mut self, mut missile_type: MissileType) -> MissileTypeId {
        let id = MissileTypeId(self.missile_types.len() as u16);
        missile_type.id = id;
        self.missile_types.push(missile_type);
        id
    }

    pub fn missile_type(&self, id: MissileTypeId) -> Option<&MissileType> {
        self.missile_types.get(id.0 as usize)
    }

    pub fn missile_type_by_ident(&self, ident: &str) -> Option<MissileTypeId> {
        self.missile_types
            .iter()
            .find(|m| m.ident == ident)
            .map(|m| m.id)
    }

    /// Define an upgrade, returning the existing id if already known
    pub fn define_upgrade(&mut self, ident: &str) -> UpgradeId {
        if let Some(id) = self.upgrade_by_ident(ident) {
            return id;
        }
        self.upgrades.push(ident.to_string());
        UpgradeId((self.upgrades.len() - 1) as u16)
    }

    pub fn upgrade_by_ident(&self, ident: &str) -> Option<UpgradeId> {
        self.upgrades
            .iter()
            .position(|u| u == ident)
            .map(|i| UpgradeId(i as u16))
    }

    // ------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------

    pub fn player(&self, index: PlayerIndex) -> Option<&Player> {
        self.players.get(index.0 as usize)
    }

    pub fn player_mut(&mut self, index: PlayerIndex) -> Option<&mut Player> {
        self.players.get_mut(index.0 as usize)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Declare two players enemies of each other
    pub fn set_mutual_enemies(&mut self, a: PlayerIndex, b: PlayerIndex) {
        if let Some(p) = self.player_mut(a) {
            p.set_enemy(b, true);
        }
        if let Some(p) = self.player_mut(b) {
            p.set_enemy(a, true);
        }
    }

    /// Declare two players allies of each other
    pub fn set_mutual_allies(&mut self, a: PlayerIndex, b: PlayerIndex) {
        if let Some(p) = self.player_mut(a) {
            p.set_allied(b, true);
        }
        if let Some(p) = self.player_mut(b) {
            p.set_allied(a, true);
        }
    }

    /// Whether `a`'s owner counts `b`'s owner as an ally
    pub fn is_allied(&self, a: &Unit, b: &Unit) -> bool {
        self.player(a.owner)
            .is_some_and(|p| p.is_allied_with(b.owner))
    }

    /// Whether `a`'s owner counts `b`'s owner as an enemy
    pub fn is_enemy(&self, a: &Unit, b: &Unit) -> bool {
        self.player(a.owner).is_some_and(|p| p.is_enemy_of(b.owner))
    }

    // ------------------------------------------------------------------
    // Unit arena
    // ------------------------------------------------------------------

    /// Resolve a weak handle; `None` once the unit was released
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.slots
            .get(id.slot())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.unit.as_ref())
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.slots
            .get_mut(id.slot())
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.unit.as_mut())
    }

    /// All units, in slot order
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.slots.iter().filter_map(|s| s.unit.as_ref())
    }

    /// Handles of all units, in slot order
    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.units().map(|u| u.id).collect()
    }

    pub fn unit_count(&self) -> usize {
        self.units().count()
    }

    pub fn unit_type_of(&self, id: UnitId) -> Option<&UnitType> {
        self.unit(id).and_then(|u| self.unit_type(u.type_id))
    }

    // ------------------------------------------------------------------
    // Unit lifecycle
    // ------------------------------------------------------------------

    /// Allocate a unit (not yet placed on the map)
    ///
    /// Returns `None` when the unit limit is reached or the type is unknown.
    pub fn make_unit(&mut self, type_id: UnitTypeId, owner: PlayerIndex) -> Option<UnitId> {
        let mut variables = self.unit_type(type_id)?.stats.clone();
        if self.unit_count() >= self.unit_limit {
            return None;
        }
        variables.resize(self.variables.len());

        let index = match self.free_slots.pop() {
            Some(index) => index,
            None => {
                self.slots.push(UnitSlot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = UnitId {
            index,
            generation: slot.generation,
        };
        slot.unit = Some(Unit::new(id, type_id, owner, variables));

        if let Some(player) = self.player_mut(owner) {
            player.unit_count += 1;
        }
        Some(id)
    }

    pub fn make_unit_and_place(
        &mut self,
        pos: TilePos,
        type_id: UnitTypeId,
        owner: PlayerIndex,
    ) -> Option<UnitId> {
        let id = self.make_unit(type_id, owner)?;
        self.place(id, pos);
        Some(id)
    }

    /// Put a unit on the map with its top-left corner at `pos`
    pub fn place(&mut self, id: UnitId, pos: TilePos) {
        if let Some(unit) = self.unit_mut(id) {
            unit.tile_pos = pos;
            unit.removed = false;
        }
    }

    /// Take a unit off the map, keeping it allocated
    pub fn remove(&mut self, id: UnitId) {
        if let Some(unit) = self.unit_mut(id) {
            unit.removed = true;
        }
    }

    pub fn move_to(&mut self, id: UnitId, pos: TilePos) {
        if let Some(unit) = self.unit_mut(id) {
            unit.tile_pos = pos;
        }
    }

    /// Free a unit's slot; every handle to it goes stale
    pub fn release(&mut self, id: UnitId) {
        let Some(slot) = self.slots.get_mut(id.slot()) else {
            return;
        };
        if slot.generation != id.generation || slot.unit.is_none() {
            return;
        }
        slot.unit = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(id.index);
    }

    /// Undo `make_unit` for a unit that never entered play
    pub fn discard(&mut self, id: UnitId) {
        let Some(owner) = self.unit(id).map(|u| u.owner) else {
            return;
        };
        if let Some(player) = self.player_mut(owner) {
            player.unit_count = player.unit_count.saturating_sub(1);
        }
        self.release(id);
    }

    pub fn change_owner(&mut self, id: UnitId, new_owner: PlayerIndex) {
        let Some(unit) = self.unit_mut(id) else {
            return;
        };
        let old_owner = unit.owner;
        if old_owner == new_owner {
            return;
        }
        unit.owner = new_owner;
        if let Some(player) = self.player_mut(old_owner) {
            player.unit_count = player.unit_count.saturating_sub(1);
        }
        if let Some(player) = self.player_mut(new_owner) {
            player.unit_count += 1;
        }
    }

    /// Drop every pending order
    pub fn clear_orders(&mut self, id: UnitId) {
        if let Some(unit) = self.unit_mut(id) {
            unit.orders.clear();
            if unit.action == UnitAction::SpellCast {
                unit.action = UnitAction::Still;
            }
        }
    }

    /// Owner bookkeeping for a unit leaving play
    ///
    /// A unit that is off the map when lost is also marked destroyed, so the
    /// session releases it; a dying unit stays as a corpse.
    pub fn unit_lost(&mut self, id: UnitId) {
        let Some(unit) = self.unit_mut(id) else {
            return;
        };
        if unit.removed {
            unit.destroyed = true;
        }
        let owner = unit.owner;
        if let Some(player) = self.player_mut(owner) {
            player.unit_count = player.unit_count.saturating_sub(1);
            player.units_lost += 1;
        }
    }

    /// Start the death of a unit, leaving a corpse on the map
    pub fn let_unit_die(&mut self, id: UnitId) {
        let cycle = self.game_cycle;
        let Some(unit) = self.unit_mut(id) else {
            return;
        };
        if let Some(hp) = unit.variables.get_mut(VarIndex::HIT_POINTS) {
            hp.value = 0;
        }
        unit.action = UnitAction::Die;
        unit.death_cycle = Some(cycle);
        unit.orders.clear();
        self.unit_lost(id);
    }

    /// Damage path: apply damage, killing the target at zero hit points
    ///
    /// Returns true if the hit killed the target.
    pub fn hit_unit(&mut self, attacker: Option<UnitId>, target: UnitId, damage: i32) -> bool {
        if damage <= 0 {
            return false;
        }
        let Some(victim) = self.unit(target) else {
            return false;
        };
        if !victim.is_alive() {
            return false;
        }

        if victim.hit_points() > damage {
            if let Some(hp) = self
                .unit_mut(target)
                .and_then(|u| u.variables.get_mut(VarIndex::HIT_POINTS))
            {
                hp.debit(damage);
            }
            return false;
        }

        let attacker = attacker.filter(|a| self.unit(*a).is_some_and(Unit::is_alive));
        if let Some(attacker) = attacker {
            self.transfer_kill_credit(attacker, target);
        }
        self.let_unit_die(target);
        true
    }

    /// Credit `caster` with `target`'s score, and with a kill if hostile
    pub fn transfer_kill_credit(&mut self, caster: UnitId, target: UnitId) {
        let (Some(c), Some(t)) = (self.unit(caster), self.unit(target)) else {
            return;
        };
        let hostile = self.is_enemy(c, t);
        let owner = c.owner;
        let points = t.var(VarIndex::POINTS);
        let hit_points = t.hit_points();
        let building = self.unit_type(t.type_id).is_some_and(|ty| ty.building);
        let xp_gain = if self.use_hp_for_xp { hit_points } else { points };

        if let Some(player) = self.player_mut(owner) {
            player.score += i64::from(points);
            if hostile {
                if building {
                    player.total_razings += 1;
                } else {
                    player.total_kills += 1;
                }
            }
        }
        if !hostile {
            return;
        }
        let Some(c) = self.unit_mut(caster) else {
            return;
        };
        if let Some(xp) = c.variables.get_mut(VarIndex::XP) {
            xp.max = xp.max.saturating_add(xp_gain);
            xp.value = xp.max;
        }
        if let Some(kill) = c.variables.get_mut(VarIndex::KILL) {
            kill.value += 1;
            kill.max += 1;
            kill.enable = true;
        }
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Whether a unit of the given type may occupy the tile `pos`
    pub fn can_be_at(&self, type_id: UnitTypeId, pos: TilePos) -> bool {
        let Some(unit_type) = self.unit_type(type_id) else {
            return false;
        };
        if !self.map.is_point_on_map(pos) {
            return false;
        }
        let flags = self.map.flags(pos);
        let terrain_ok = match unit_type.movement {
            MovementKind::Land => {
                flags.contains(MapFieldFlags::LAND_ALLOWED)
                    && !flags.intersects(
                        MapFieldFlags::UNPASSABLE
                            | MapFieldFlags::WALL
                            | MapFieldFlags::ROCKS
                            | MapFieldFlags::FOREST,
                    )
            }
            MovementKind::Naval => {
                flags.contains(MapFieldFlags::WATER_ALLOWED)
                    && !flags.contains(MapFieldFlags::UNPASSABLE)
            }
            MovementKind::Fly => true,
        };
        if !terrain_ok {
            return false;
        }
        if unit_type.building && flags.contains(MapFieldFlags::NO_BUILDING) {
            return false;
        }

        let flying = unit_type.movement == MovementKind::Fly;
        !self.units().any(|other| {
            other.is_alive()
                && self.unit_type(other.type_id).is_some_and(|ot| {
                    (ot.movement == MovementKind::Fly) == flying
                        && covers(other.tile_pos, ot, pos)
                })
        })
    }

    /// Whether the whole footprint of a type fits with its corner at `pos`
    pub fn footprint_fits(&self, type_id: UnitTypeId, pos: TilePos) -> bool {
        let Some(unit_type) = self.unit_type(type_id) else {
            return false;
        };
        (0..unit_type.tile_width).all(|dx| {
            (0..unit_type.tile_height).all(|dy| self.can_be_at(type_id, pos + TilePos::new(dx, dy)))
        })
    }

    /// Place a removed unit on the nearest free spot around its tile
    ///
    /// Searches its own tile first, then square rings of growing radius.
    /// Returns false (unit stays removed) when nothing is free nearby.
    pub fn drop_out_on_side(&mut self, id: UnitId) -> bool {
        const MAX_RADIUS: i32 = 8;

        let Some(unit) = self.unit(id) else {
            return false;
        };
        let (origin, type_id) = (unit.tile_pos, unit.type_id);

        for radius in 0..=MAX_RADIUS {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let pos = origin + TilePos::new(dx, dy);
                    if self.footprint_fits(type_id, pos) {
                        self.place(id, pos);
                        return true;
                    }
                }
            }
        }
        tracing::warn!(unit = %id, x = origin.x, y = origin.y, "no free place to drop out unit");
        false
    }
}

/// Whether a footprint with its corner at `corner` covers `pos`
fn covers(corner: TilePos, unit_type: &UnitType, pos: TilePos) -> bool {
    pos.x >= corner.x
        && pos.y >= corner.y
        && pos.x < corner.x + unit_type.tile_width
        && pos.y < corner.y + unit_type.tile_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture, spawn};

    #[test]
    fn test_released_handle_goes_stale() {
        let mut fx = fixture();
        let a = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 3, 3);
        fx.world.release(a);
        assert!(fx.world.unit(a).is_none());

        let b = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 4, 4);
        assert_eq!(a.slot(), b.slot());
        assert!(fx.world.unit(a).is_none());
        assert!(fx.world.unit(b).is_some());
    }

    #[test]
    fn test_unit_limit() {
        let mut fx = fixture();
        fx.world = fx.world.with_unit_limit(1);
        assert!(fx.world.make_unit(fx.footman, PlayerIndex(0)).is_some());
        assert!(fx.world.make_unit(fx.footman, PlayerIndex(0)).is_none());
    }

    #[test]
    fn test_define_variable_resizes_units() {
        let mut fx = fixture();
        let a = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 3, 3);
        let before = fx.world.unit(a).unwrap().variables.len();
        let haste = fx.world.define_variable("Haste");

        let unit = fx.world.unit(a).unwrap();
        assert_eq!(unit.variables.len(), before + 1);
        assert_eq!(unit.var(haste), 0);
        assert_eq!(fx.world.unit_type(fx.mage).unwrap().stats.len(), before + 1);
    }

    #[test]
    fn test_hit_unit_kills_and_credits() {
        let mut fx = fixture();
        let attacker = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 3, 3);
        let victim = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 4, 3);

        assert!(!fx.world.hit_unit(Some(attacker), victim, 10));
        assert_eq!(fx.world.unit(victim).unwrap().hit_points(), 50);

        assert!(fx.world.hit_unit(Some(attacker), victim, 100));
        let victim_unit = fx.world.unit(victim).unwrap();
        assert!(victim_unit.is_dying());
        assert_eq!(victim_unit.hit_points(), 0);

        let player = fx.world.player(PlayerIndex(0)).unwrap();
        assert_eq!(player.total_kills, 1);
        assert_eq!(player.score, 50);
        let attacker_unit = fx.world.unit(attacker).unwrap();
        assert_eq!(attacker_unit.var(VarIndex::KILL), 1);
        assert_eq!(attacker_unit.var(VarIndex::XP), 50);
        assert_eq!(fx.world.player(PlayerIndex(1)).unwrap().units_lost, 1);
    }

    #[test]
    fn test_hit_dying_unit_is_ignored() {
        let mut fx = fixture();
        let victim = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 4, 3);
        fx.world.let_unit_die(victim);
        assert!(!fx.world.hit_unit(None, victim, 5));
        assert_eq!(fx.world.player(PlayerIndex(1)).unwrap().units_lost, 1);
    }

    #[test]
    fn test_can_be_at_respects_occupancy_and_layers() {
        let mut fx = fixture();
        spawn(&mut fx.world, fx.footman, PlayerIndex(0), 5, 5);

        assert!(!fx.world.can_be_at(fx.footman, TilePos::new(5, 5)));
        assert!(fx.world.can_be_at(fx.flyer, TilePos::new(5, 5)));
        assert!(fx.world.can_be_at(fx.footman, TilePos::new(6, 5)));

        fx.world
            .map
            .set_terrain(TilePos::new(7, 5), MapFieldFlags::FOREST | MapFieldFlags::UNPASSABLE, 100);
        assert!(!fx.world.can_be_at(fx.footman, TilePos::new(7, 5)));
        assert!(!fx.world.can_be_at(fx.footman, TilePos::new(-1, 5)));
    }

    #[test]
    fn test_building_footprint_blocks() {
        let mut fx = fixture();
        spawn(&mut fx.world, fx.town_hall, PlayerIndex(0), 10, 10);
        assert!(!fx.world.can_be_at(fx.footman, TilePos::new(11, 11)));
        assert!(fx.world.can_be_at(fx.footman, TilePos::new(12, 11)));
        assert!(!fx.world.footprint_fits(fx.town_hall, TilePos::new(11, 9)));
    }

    #[test]
    fn test_drop_out_on_side_finds_neighbour() {
        let mut fx = fixture();
        spawn(&mut fx.world, fx.footman, PlayerIndex(0), 5, 5);
        let newcomer = fx.world.make_unit(fx.footman, PlayerIndex(0)).unwrap();
        fx.world.unit_mut(newcomer).unwrap().tile_pos = TilePos::new(5, 5);

        assert!(fx.world.drop_out_on_side(newcomer));
        let unit = fx.world.unit(newcomer).unwrap();
        assert!(!unit.removed);
        assert_ne!(unit.tile_pos, TilePos::new(5, 5));
        assert!(super::super::map::map_distance(unit.tile_pos, TilePos::new(5, 5)) <= 1);
    }

    #[test]
    fn test_change_owner_moves_unit_count() {
        let mut fx = fixture();
        let unit = spawn(&mut fx.world, fx.footman, PlayerIndex(1), 5, 5);
        fx.world.change_owner(unit, PlayerIndex(0));
        assert_eq!(fx.world.unit(unit).unwrap().owner, PlayerIndex(0));
        assert_eq!(fx.world.player(PlayerIndex(1)).unwrap().unit_count, 0);
        assert_eq!(fx.world.player(PlayerIndex(0)).unwrap().unit_count, 1);
    }

    #[test]
    fn test_unit_lost_marks_removed_unit_destroyed() {
        let mut fx = fixture();
        let unit = spawn(&mut fx.world, fx.footman, PlayerIndex(0), 5, 5);
        fx.world.remove(unit);
        fx.world.unit_lost(unit);
        assert!(fx.world.unit(unit).unwrap().destroyed);
    }
}
