//! Combat power engine.
//!
//! Derives each unit's strength and number of rolls for a battle step,
//! hands out support bonuses from depletable pools, and reduces the result
//! to a single power number per unit.

pub mod aa;
pub mod builder;
pub mod calculator;
pub mod combat_value;
pub mod ledger;
pub mod support;
pub mod value;

pub use aa::{
    aa_power_and_shots, max_aa_attack_and_dice_sides, sort_aa_high_to_low, total_aa_attacks,
    AaPowerAndRolls,
};
pub use builder::{BuildError, CombatValueBuilder};
pub use calculator::{power_value, PowerCalculator, TotalPowerAndRolls};
pub use combat_value::{BattleConditions, CombatValue, Combatants, SupportPools};
pub use ledger::SupportLedger;
pub use support::{AvailableSupports, SupportCalculator};
pub use value::{RollValue, StrengthValue};
