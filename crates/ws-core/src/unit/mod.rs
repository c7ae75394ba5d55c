//! Unit system
//!
//! Unit types (static templates), unit instances with their variable
//! stores, and the players owning them.

mod player;
mod instance;
mod unit_type;
pub mod variable;

pub use player::{Player, PlayerIndex, UpgradeAllow, UpgradeId};
pub use instance::{Order, Unit, UnitAction, UnitId};
pub use unit_type::{MovementKind, UnitType, UnitTypeFlags, UnitTypeId};
pub use variable::{UnitVariable, VarIndex, VariableStore, VariableTable};
