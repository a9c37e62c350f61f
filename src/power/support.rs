//! Support eligibility and allocation.
//!
//! `SupportCalculator` scans the units that could give support against the
//! rule list and records, per rule, how much capacity each eligible giver
//! holds. `AvailableSupports` turns that snapshot into a depletable pool
//! that hands bonuses to receiving units one at a time.
//!
//! A pool is consumed as it is used. Take a `copy()` (or `filter()`) before
//! every independent calculation pass so that no two passes share capacity.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::ruleset::{BonusType, GameData, Side, SupportRule, Unit, UnitId};

use super::ledger::SupportLedger;

/// Remaining capacity of one rule, per giving unit.
#[derive(Debug, Clone)]
struct RuleSupply {
    rule: Arc<SupportRule>,
    /// Givers in the order they were scanned, with remaining capacity.
    givers: Vec<(UnitId, i32)>,
    /// Index of the first giver that may still have capacity.
    cursor: usize,
    left: i32,
    /// Strength of the giving unit type, used to order rules.
    giver_power: i32,
}

impl RuleSupply {
    /// Spends one unit of capacity, returning the giver it came from.
    fn take_one(&mut self) -> Option<UnitId> {
        while let Some((giver, capacity)) = self.givers.get_mut(self.cursor) {
            if *capacity > 0 {
                *capacity -= 1;
                self.left -= 1;
                return Some(*giver);
            }
            self.cursor += 1;
        }
        None
    }
}

/// Rules sharing one bonus type, in the order they will be tried.
#[derive(Debug, Clone)]
struct BonusGroup {
    bonus_type: BonusType,
    rules: Vec<RuleSupply>,
}

/// Eligibility snapshot: which rules can be given, by whom, and how often.
#[derive(Debug, Clone, Default)]
pub struct SupportCalculator {
    groups: Vec<BonusGroup>,
}

impl SupportCalculator {
    /// Scans `givers` against `rules` for support to units on `side`.
    ///
    /// `allied` is true when the givers are on the receivers' side, and
    /// selects rules flagged allied rather than enemy.
    pub fn new(
        givers: &[Unit],
        rules: &[Arc<SupportRule>],
        side: Side,
        allied: bool,
        data: &GameData,
    ) -> Self {
        let mut groups: Vec<BonusGroup> = Vec::new();

        for rule in rules {
            if rule.players.is_empty() || rule.receiver_types.is_empty() {
                tracing::debug!(rule = %rule.name, "skipping rule without players or receivers");
                continue;
            }
            if !rule.applies_to_side(side) {
                continue;
            }
            if !rule.applies_to_faction(allied) {
                continue;
            }

            let mut supply = Vec::new();
            let mut left: i32 = 0;
            for unit in givers {
                if unit.unit_type != rule.giver_type || !rule.players.contains(&unit.owner) {
                    continue;
                }
                let doubled = rule
                    .improved_by_tech
                    .as_deref()
                    .is_some_and(|tech| data.player_has_tech(&unit.owner, tech));
                let capacity = if doubled {
                    rule.number.saturating_mul(2)
                } else {
                    rule.number
                };
                left = left.saturating_add(capacity);
                supply.push((unit.id, capacity));
            }
            if left <= 0 {
                tracing::debug!(rule = %rule.name, "skipping rule with no eligible capacity");
                continue;
            }

            let supply = RuleSupply {
                rule: Arc::clone(rule),
                givers: supply,
                cursor: 0,
                left,
                giver_power: giver_power(rule, data),
            };
            match groups.iter_mut().find(|g| g.bonus_type == rule.bonus_type) {
                Some(group) => group.rules.push(supply),
                None => groups.push(BonusGroup {
                    bonus_type: rule.bonus_type.clone(),
                    rules: vec![supply],
                }),
            }
        }

        SupportCalculator { groups }
    }

    /// Bonus types with their eligible rules, in first-seen order.
    pub fn support_rules(&self) -> Vec<(BonusType, Vec<Arc<SupportRule>>)> {
        self.groups
            .iter()
            .map(|g| {
                let rules = g.rules.iter().map(|s| Arc::clone(&s.rule)).collect();
                (g.bonus_type.clone(), rules)
            })
            .collect()
    }

    /// Total capacity recorded for a rule; 0 if the rule was dropped.
    pub fn support(&self, rule: &SupportRule) -> i32 {
        find_supply(&self.groups, rule).map_or(0, |s| s.left)
    }
}

/// Attack or defense power of the unit type that gives a rule.
fn giver_power(rule: &SupportRule, data: &GameData) -> i32 {
    let Some(unit_type) = data.unit_type(&rule.giver_type) else {
        return 0;
    };
    if rule.defence {
        unit_type.defense_rolls(None) * unit_type.defense(None)
    } else {
        unit_type.attack_rolls(None) * unit_type.attack(None)
    }
}

fn find_supply<'g>(groups: &'g [BonusGroup], rule: &SupportRule) -> Option<&'g RuleSupply> {
    groups
        .iter()
        .flat_map(|g| g.rules.iter())
        .find(|s| *s.rule == *rule)
}

/// Orders rules so the most impactful is tried first within a bonus type.
///
/// Positive bonuses come before negative ones. Larger positive bonuses go
/// first; among penalties the harshest goes first. Then rules with fewer
/// receiver types, then rules given by stronger unit types. Remaining ties
/// keep declaration order.
fn compare_rules(a: &RuleSupply, b: &RuleSupply) -> Ordering {
    let a_positive = a.rule.bonus >= 0;
    let b_positive = b.rule.bonus >= 0;
    if a_positive != b_positive {
        return if a_positive {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    let by_bonus = if a_positive {
        b.rule.bonus.cmp(&a.rule.bonus)
    } else {
        a.rule.bonus.cmp(&b.rule.bonus)
    };
    by_bonus
        .then_with(|| a.rule.receiver_types.len().cmp(&b.rule.receiver_types.len()))
        .then_with(|| b.giver_power.cmp(&a.giver_power))
}

/// A depletable pool of support, grouped by bonus type.
#[derive(Debug, Clone, Default)]
pub struct AvailableSupports {
    groups: Vec<BonusGroup>,
}

impl AvailableSupports {
    /// A pool with nothing to give.
    pub fn empty() -> Self {
        AvailableSupports::default()
    }

    /// Builds a pool keeping the calculator's declaration order.
    pub fn get_support(calculator: &SupportCalculator) -> Self {
        AvailableSupports {
            groups: calculator.groups.clone(),
        }
    }

    /// Builds a pool with each bonus type's rules ordered by impact.
    pub fn get_sorted_support(calculator: &SupportCalculator) -> Self {
        let mut groups = calculator.groups.clone();
        for group in &mut groups {
            group.rules.sort_by(compare_rules);
        }
        AvailableSupports { groups }
    }

    /// An independent copy; depleting one never affects the other.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// An independent pool holding only the rules that match `predicate`.
    pub fn filter(&self, predicate: impl Fn(&SupportRule) -> bool) -> Self {
        let groups = self
            .groups
            .iter()
            .filter_map(|g| {
                let rules: Vec<RuleSupply> = g
                    .rules
                    .iter()
                    .filter(|s| predicate(s.rule.as_ref()))
                    .cloned()
                    .collect();
                if rules.is_empty() {
                    None
                } else {
                    Some(BonusGroup {
                        bonus_type: g.bonus_type.clone(),
                        rules,
                    })
                }
            })
            .collect();
        AvailableSupports { groups }
    }

    /// Capacity a rule has left; 0 if the rule is not in this pool.
    pub fn support_left(&self, rule: &SupportRule) -> i32 {
        find_supply(&self.groups, rule).map_or(0, |s| s.left)
    }

    /// Total capacity left across every rule.
    pub fn total_left(&self) -> i32 {
        self.groups
            .iter()
            .flat_map(|g| g.rules.iter())
            .map(|s| s.left)
            .sum()
    }

    /// Bonus types present in this pool.
    pub fn bonus_types(&self) -> impl Iterator<Item = &BonusType> {
        self.groups.iter().map(|g| &g.bonus_type)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Draws support for `unit` from the pool and returns the total bonus.
    ///
    /// For each bonus type, rules are tried in order; each applicable rule
    /// gives up to its bonus type's count from its remaining capacity, and
    /// the bonus type stops once its quota is used. Every allocation is
    /// recorded in `ledger`.
    pub fn give_support_to_unit(&mut self, unit: &Unit, ledger: &mut SupportLedger) -> i32 {
        let mut given = 0;
        for group in &mut self.groups {
            let mut quota = group.bonus_type.count;
            for supply in &mut group.rules {
                if !supply.rule.supports(&unit.unit_type) {
                    continue;
                }
                let available = supply.rule.bonus_type.count.min(supply.left).max(0);
                for _ in 0..available {
                    let Some(giver) = supply.take_one() else {
                        break;
                    };
                    given += supply.rule.bonus;
                    ledger.record(giver, unit.id, supply.rule.bonus);
                    tracing::trace!(
                        giver = %giver,
                        receiver = %unit.id,
                        rule = %supply.rule.name,
                        bonus = supply.rule.bonus,
                        "support given"
                    );
                }
                quota -= available;
                if quota <= 0 {
                    break;
                }
            }
        }
        given
    }
}
