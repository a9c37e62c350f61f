//! Ruleset data consumed by the power engine.
//!
//! Contains units and unit types, players, support rules, territory
//! effects, and the JSON loader that validates them.

pub mod game;
pub mod load;
pub mod support;
pub mod territory;
pub mod unit;

pub use game::{GameData, GameProperties, Player};
pub use load::{load_ruleset, load_ruleset_from_str, RulesetError};
pub use support::{BonusType, Side, SupportDice, SupportRule};
pub use territory::{territory_effect_bonus, TerritoryEffect};
pub use unit::{TechBonus, Unit, UnitId, UnitType};
