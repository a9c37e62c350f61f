//! Anti-aircraft fire.
//!
//! AA guns fire at a limited number of targets. Guns with infinite attacks
//! cover every target; guns that may overstack fire on top of that cap.
//! [`AaPowerAndRolls`] shares the shots out between the guns of one side.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::ruleset::{GameData, Side, Unit, UnitId};

use super::calculator::{PowerCalculator, TotalPowerAndRolls};
use super::combat_value::CombatValue;

/// AA attack of one unit and the dice sides `combat_value` rolls it on,
/// with the attack clamped to those sides.
fn aa_attack_and_dice_sides(
    unit: &Unit,
    combat_value: &CombatValue<'_>,
    resolved: &BTreeMap<UnitId, TotalPowerAndRolls>,
) -> (i32, i32) {
    let dice_sides = combat_value.dice_sides(unit);
    let attack = match resolved.get(&unit.id) {
        Some(r) => r.power,
        None => combat_value
            .data()
            .type_of(unit)
            .map_or(0, |t| match combat_value.side() {
                Side::Offense => t.offensive_attack_aa,
                Side::Defense => t.attack_aa,
            }),
    };
    (attack.min(dice_sides), dice_sides)
}

/// True if `a / a_sides` is strictly greater than `b / b_sides`.
fn higher_ratio(a: i32, a_sides: i32, b: i32, b_sides: i32) -> bool {
    i64::from(a) * i64::from(b_sides) > i64::from(b) * i64::from(a_sides)
}

/// The best AA attack among `units` and the dice sides it rolls against.
///
/// Units are compared by attack relative to dice sides. Resolved powers
/// override the unit types' base AA values. With no units this is
/// `(0, game dice sides)`.
pub fn max_aa_attack_and_dice_sides(
    units: &[Unit],
    combat_value: &CombatValue<'_>,
    resolved: &BTreeMap<UnitId, TotalPowerAndRolls>,
) -> (i32, i32) {
    let mut highest = 0;
    let mut chosen_sides = combat_value.data().dice_sides();
    for unit in units {
        let (attack, sides) = aa_attack_and_dice_sides(unit, combat_value, resolved);
        if higher_ratio(attack, sides, highest, chosen_sides) {
            highest = attack;
            chosen_sides = sides;
        }
    }
    (highest, chosen_sides)
}

/// Sorts AA units so the strongest fires first. Units that cannot hit go
/// last; ties keep their order.
pub fn sort_aa_high_to_low(
    units: &mut [Unit],
    combat_value: &CombatValue<'_>,
    resolved: &BTreeMap<UnitId, TotalPowerAndRolls>,
) {
    units.sort_by_cached_key(|u| {
        let (attack, sides) = aa_attack_and_dice_sides(u, combat_value, resolved);
        AaRank { attack, sides }
    });
}

#[derive(Debug, Clone, Copy)]
struct AaRank {
    attack: i32,
    sides: i32,
}

impl PartialEq for AaRank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AaRank {}

impl Ord for AaRank {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.attack == 0).cmp(&(other.attack == 0)).then_with(|| {
            let mine = i64::from(self.attack) * i64::from(other.sides);
            let theirs = i64::from(other.attack) * i64::from(self.sides);
            theirs.cmp(&mine)
        })
    }
}

impl PartialOrd for AaRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Power of each AA unit and the number of shots it may take.
///
/// A finite gun shoots its `max_aa_attacks` plus any roll support. An
/// infinite gun keeps its resolved rolls; it is only limited by targets.
/// Units that cannot hit get zero.
pub fn aa_power_and_shots(
    calculator: &mut PowerCalculator<'_>,
    aa_units: &[Unit],
) -> BTreeMap<UnitId, TotalPowerAndRolls> {
    let data = calculator.combat_value().data();
    aa_units
        .iter()
        .map(|unit| {
            let resolved = calculator.unit_power_and_rolls(unit);
            let shots = match data.type_of(unit) {
                Some(t) if t.is_infinite_aa() => resolved,
                Some(t) if resolved.rolls > 0 => TotalPowerAndRolls {
                    power: resolved.power,
                    rolls: (resolved.rolls - 1).saturating_add(t.max_aa_attacks).max(0),
                },
                _ => TotalPowerAndRolls::ZERO,
            };
            let shots = if shots.rolls == 0 {
                TotalPowerAndRolls::ZERO
            } else {
                shots
            };
            (unit.id, shots)
        })
        .collect()
}

/// Number of AA shots `aa_units` take at `targets` air units.
///
/// Units with zero power or shots don't fire. A unit with infinite attacks
/// shoots at every target. Ordinary shots are capped to the target count;
/// overstacking units fire on top of the cap.
pub fn total_aa_attacks(
    aa_units: &[Unit],
    shots: &BTreeMap<UnitId, TotalPowerAndRolls>,
    targets: usize,
    data: &GameData,
) -> i32 {
    if targets == 0 {
        return 0;
    }
    let targets = i32::try_from(targets).unwrap_or(i32::MAX);
    let mut normal = 0;
    let mut surplus: i32 = 0;
    for unit in aa_units {
        let Some(r) = shots.get(&unit.id) else {
            continue;
        };
        if r.power == 0 || r.rolls == 0 {
            continue;
        }
        let Some(unit_type) = data.type_of(unit) else {
            continue;
        };
        if unit_type.is_infinite_aa() {
            normal = targets;
        } else if unit_type.may_over_stack_aa {
            surplus = surplus.saturating_add(r.rolls);
        } else {
            normal = normal.saturating_add(r.rolls);
        }
    }
    normal.min(targets) + surplus
}

/// How one side's AA fire is shared out between its guns.
///
/// Finite guns stronger than the best infinite gun fire first, strongest
/// first, until the targets run out. The best infinite gun covers the
/// remaining targets and weaker guns stay silent. Overstacking guns then
/// fire all their shots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AaPowerAndRolls {
    /// Units that fire, in firing order, with their hit value and shots.
    active: Vec<(UnitId, TotalPowerAndRolls)>,
}

impl AaPowerAndRolls {
    /// Resolves `aa_units` with `calculator` and shares `targets` shots
    /// among them.
    pub fn build(
        calculator: &mut PowerCalculator<'_>,
        aa_units: &[Unit],
        targets: usize,
    ) -> Self {
        if targets == 0 {
            return AaPowerAndRolls::default();
        }
        let shots = aa_power_and_shots(calculator, aa_units);
        let combat_value = calculator.combat_value();
        let data = combat_value.data();

        let mut order: Vec<Unit> = aa_units
            .iter()
            .filter(|u| shots.get(&u.id).is_some_and(|s| s.rolls > 0))
            .cloned()
            .collect();
        sort_aa_high_to_low(&mut order, combat_value, &shots);

        let mut normal = Vec::new();
        let mut infinite = Vec::new();
        let mut overstack = Vec::new();
        for unit in order {
            match data.type_of(&unit) {
                Some(t) if t.is_infinite_aa() => infinite.push(unit),
                Some(t) if t.may_over_stack_aa => overstack.push(unit),
                Some(_) => normal.push(unit),
                None => {}
            }
        }

        let best_infinite = infinite.first().map(|u| {
            let (attack, sides) = aa_attack_and_dice_sides(u, combat_value, &shots);
            (u.id, attack, sides)
        });
        let mut remaining = i32::try_from(targets).unwrap_or(i32::MAX);
        let mut active = Vec::new();

        for unit in &normal {
            if remaining == 0 {
                break;
            }
            let (attack, sides) = aa_attack_and_dice_sides(unit, combat_value, &shots);
            if let Some((_, best, best_sides)) = best_infinite {
                if !higher_ratio(attack, sides, best, best_sides) {
                    continue;
                }
            }
            let rolls = shots[&unit.id].rolls.min(remaining);
            remaining -= rolls;
            active.push((unit.id, TotalPowerAndRolls { power: attack, rolls }));
        }
        if let Some((id, attack, _)) = best_infinite {
            if remaining > 0 {
                let rolls = remaining;
                active.push((id, TotalPowerAndRolls { power: attack, rolls }));
            }
        }
        for unit in &overstack {
            let (attack, _) = aa_attack_and_dice_sides(unit, combat_value, &shots);
            let rolls = shots[&unit.id].rolls;
            active.push((unit.id, TotalPowerAndRolls { power: attack, rolls }));
        }

        tracing::debug!(targets, shooters = active.len(), "aa fire shared out");
        AaPowerAndRolls { active }
    }

    /// Shots the unit takes; 0 if it does not fire.
    pub fn rolls(&self, unit: &Unit) -> i32 {
        self.active
            .iter()
            .find(|(id, _)| *id == unit.id)
            .map_or(0, |(_, r)| r.rolls)
    }

    /// Hit value of every shot summed.
    pub fn total_power(&self) -> i32 {
        self.active.iter().map(|(_, r)| r.effective_power()).sum()
    }

    pub fn total_rolls(&self) -> i32 {
        self.active.iter().map(|(_, r)| r.rolls).sum()
    }

    /// Firing units in order, with the value each shot hits at.
    pub fn active_units(&self) -> &[(UnitId, TotalPowerAndRolls)] {
        &self.active
    }
}
