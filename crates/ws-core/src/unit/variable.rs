//! Per-unit numeric variables
//!
//! Every unit carries one [`UnitVariable`] per tracked variable. The set of
//! variables is open: a handful are built in (hit points, mana, ...) and
//! data files may define more, so variables are addressed by [`VarIndex`]
//! into a [`VariableTable`].

use core::ops::{Index, IndexMut};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Index of a tracked variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarIndex(pub u16);

impl VarIndex {
    pub const HIT_POINTS: VarIndex = VarIndex(0);
    pub const MANA: VarIndex = VarIndex(1);
    pub const INVISIBLE: VarIndex = VarIndex(2);
    pub const POINTS: VarIndex = VarIndex(3);
    pub const XP: VarIndex = VarIndex(4);
    pub const KILL: VarIndex = VarIndex(5);

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Names of the built-in variables, in index order
pub const BUILTIN_VARIABLES: [&str; 6] = ["HitPoints", "Mana", "Invisible", "Points", "Xp", "Kill"];

/// One tracked variable of a unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitVariable {
    /// Current value
    pub value: i32,
    /// Upper bound of value
    pub max: i32,
    /// Amount gained per regeneration tick
    pub increase: i32,
    /// Whether the variable is active for this unit
    pub enable: bool,
}

impl UnitVariable {
    pub const fn new(value: i32, max: i32) -> Self {
        Self {
            value,
            max,
            increase: 0,
            enable: true,
        }
    }

    /// Restore `0 <= value <= max` and `max >= 0`
    pub fn clamp(&mut self) {
        if self.max < 0 {
            self.max = 0;
        }
        self.value = self.value.clamp(0, self.max);
    }

    /// Add a signed delta to value, then clamp
    pub fn add_clamped(&mut self, delta: i32) {
        self.value = self.value.saturating_add(delta);
        self.clamp();
    }

    /// Subtract from value, stopping at zero
    pub fn debit(&mut self, amount: i32) {
        self.value = self.value.saturating_sub(amount).max(0);
    }
}

/// All variables of one unit (or one unit type's stats)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableStore {
    vars: Vec<UnitVariable>,
}

impl VariableStore {
    /// Store with `count` zeroed, disabled variables
    pub fn new(count: usize) -> Self {
        Self {
            vars: vec![UnitVariable::default(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Grow (or shrink) to the given number of variables
    pub fn resize(&mut self, count: usize) {
        self.vars.resize(count, UnitVariable::default());
    }

    pub fn get(&self, index: VarIndex) -> Option<&UnitVariable> {
        self.vars.get(index.index())
    }

    pub fn get_mut(&mut self, index: VarIndex) -> Option<&mut UnitVariable> {
        self.vars.get_mut(index.index())
    }

    /// Current value, 0 for an unknown index
    pub fn value(&self, index: VarIndex) -> i32 {
        self.get(index).map_or(0, |v| v.value)
    }

    /// Replace a variable, growing the store if needed
    pub fn set(&mut self, index: VarIndex, var: UnitVariable) {
        if index.index() >= self.vars.len() {
            self.resize(index.index() + 1);
        }
        self.vars[index.index()] = var;
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarIndex, &UnitVariable)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, v)| (VarIndex(i as u16), v))
    }
}

impl Index<VarIndex> for VariableStore {
    type Output = UnitVariable;

    fn index(&self, index: VarIndex) -> &UnitVariable {
        &self.vars[index.index()]
    }
}

impl IndexMut<VarIndex> for VariableStore {
    fn index_mut(&mut self, index: VarIndex) -> &mut UnitVariable {
        &mut self.vars[index.index()]
    }
}

/// Names of all tracked variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableTable {
    names: Vec<String>,
    #[serde(skip)]
    lookup: HashMap<String, VarIndex>,
}

impl Default for VariableTable {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableTable {
    /// Table holding only the built-in variables
    pub fn new() -> Self {
        let mut table = Self {
            names: Vec::new(),
            lookup: HashMap::new(),
        };
        for name in BUILTIN_VARIABLES {
            table.define(name);
        }
        table
    }

    /// Define a variable, returning the existing index if already known
    pub fn define(&mut self, name: &str) -> VarIndex {
        if let Some(index) = self.lookup(name) {
            return index;
        }
        let index = VarIndex(self.names.len() as u16);
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), index);
        index
    }

    pub fn lookup(&self, name: &str) -> Option<VarIndex> {
        if let Some(index) = self.lookup.get(name) {
            return Some(*index);
        }
        // The map is not serialized; fall back to a scan after a restore
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| VarIndex(i as u16))
    }

    pub fn name(&self, index: VarIndex) -> Option<&str> {
        self.names.get(index.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarIndex, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (VarIndex(i as u16), n.as_str()))
    }
}
