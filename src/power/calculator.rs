//! Reduction of strength and rolls to a single power number.
//!
//! The power formula is consumed elsewhere to build hit-probability tables,
//! so its integer arithmetic must stay exactly as written in
//! [`power_value`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ruleset::{Unit, UnitId};

use super::combat_value::CombatValue;
use super::ledger::SupportLedger;
use super::value::{RollValue, StrengthValue};

/// Power and rolls of one unit, or summed over several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TotalPowerAndRolls {
    pub power: i32,
    pub rolls: i32,
}

impl TotalPowerAndRolls {
    pub const ZERO: TotalPowerAndRolls = TotalPowerAndRolls { power: 0, rolls: 0 };

    /// Power times rolls.
    pub fn effective_power(self) -> i32 {
        self.power * self.rolls
    }
}

/// Power from a resolved strength and roll count.
///
/// Several rolls with `choose_best_roll` are approximated as a flat bonus
/// per extra die rather than the true best-of-n probability.
pub fn power_value(
    strength: StrengthValue,
    roll: RollValue,
    choose_best_roll: bool,
    dice_sides: i32,
) -> i32 {
    if strength.is_zero() || roll.is_zero() {
        return 0;
    }
    let extra_roll_bonus = (dice_sides / 6).max(1);
    let strength = strength.value();
    let rolls = roll.value();
    if rolls == 1 {
        strength
    } else if choose_best_roll {
        (strength + extra_roll_bonus * (rolls - 1)).min(dice_sides)
    } else {
        rolls * strength
    }
}

/// Everything computed for one unit.
#[derive(Debug, Clone, Copy)]
struct Resolved {
    strength: StrengthValue,
    roll: RollValue,
    dice_sides: i32,
    choose_best_roll: bool,
}

/// Resolves units against a combat value, once per unit.
///
/// Support is drawn the first time a unit is asked about; later queries
/// for the same unit read the cached result.
#[derive(Debug, Clone)]
pub struct PowerCalculator<'a> {
    combat_value: CombatValue<'a>,
    resolved: BTreeMap<UnitId, Resolved>,
    strength_ledger: SupportLedger,
    roll_ledger: SupportLedger,
}

impl<'a> PowerCalculator<'a> {
    pub fn new(combat_value: CombatValue<'a>) -> Self {
        PowerCalculator {
            combat_value,
            resolved: BTreeMap::new(),
            strength_ledger: SupportLedger::new(),
            roll_ledger: SupportLedger::new(),
        }
    }

    /// Resolves `units` strongest first, so support goes to the units that
    /// benefit most.
    pub fn for_units(combat_value: CombatValue<'a>, units: &[Unit]) -> Self {
        let mut ordered = units.to_vec();
        combat_value.sort_units(&mut ordered);
        let mut calculator = PowerCalculator::new(combat_value);
        for unit in &ordered {
            calculator.resolve(unit);
        }
        calculator
    }

    fn resolve(&mut self, unit: &Unit) -> Resolved {
        if let Some(hit) = self.resolved.get(&unit.id) {
            return *hit;
        }
        let strength = self.combat_value.strength(unit, &mut self.strength_ledger);
        let roll = self.combat_value.roll(unit, &mut self.roll_ledger);
        let resolved = Resolved {
            strength,
            roll,
            dice_sides: self.combat_value.dice_sides(unit),
            choose_best_roll: self.combat_value.choose_best_roll(unit),
        };
        tracing::trace!(
            unit = %unit.id,
            strength = strength.value(),
            rolls = roll.value(),
            "unit resolved"
        );
        self.resolved.insert(unit.id, resolved);
        resolved
    }

    /// The unit's power under this combat value.
    pub fn value(&mut self, unit: &Unit) -> i32 {
        let r = self.resolve(unit);
        power_value(r.strength, r.roll, r.choose_best_roll, r.dice_sides)
    }

    pub fn strength(&mut self, unit: &Unit) -> StrengthValue {
        self.resolve(unit).strength
    }

    pub fn roll(&mut self, unit: &Unit) -> RollValue {
        self.resolve(unit).roll
    }

    /// Clamped strength and rolls; both 0 if either is 0.
    pub fn unit_power_and_rolls(&mut self, unit: &Unit) -> TotalPowerAndRolls {
        let r = self.resolve(unit);
        let power = r.strength.value();
        let rolls = r.roll.value();
        if power == 0 || rolls == 0 {
            return TotalPowerAndRolls::ZERO;
        }
        TotalPowerAndRolls { power, rolls }
    }

    /// Per-unit power and rolls, keyed by unit.
    pub fn power_and_rolls_by_unit(
        &mut self,
        units: &[Unit],
    ) -> BTreeMap<UnitId, TotalPowerAndRolls> {
        units
            .iter()
            .map(|u| (u.id, self.unit_power_and_rolls(u)))
            .collect()
    }

    /// Summed power and rolls of the units that can hit at all.
    pub fn total_power_and_rolls(&mut self, units: &[Unit]) -> TotalPowerAndRolls {
        let mut total = TotalPowerAndRolls::ZERO;
        for unit in units {
            let r = self.resolve(unit);
            let strength = r.strength.value();
            let rolls = r.roll.value();
            if strength <= 0 || rolls <= 0 {
                continue;
            }
            total.power += power_value(r.strength, r.roll, r.choose_best_roll, r.dice_sides);
            total.rolls += rolls;
        }
        total
    }

    /// Strength support given so far.
    pub fn strength_ledger(&self) -> &SupportLedger {
        &self.strength_ledger
    }

    /// Roll support given so far.
    pub fn roll_ledger(&self) -> &SupportLedger {
        &self.roll_ledger
    }

    pub fn combat_value(&self) -> &CombatValue<'a> {
        &self.combat_value
    }
}
