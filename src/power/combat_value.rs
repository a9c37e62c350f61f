//! Per-battle-context strength and roll formulas.
//!
//! A `CombatValue` bundles the units on both sides, four support pools
//! (strength and rolls, from friends and from enemies), and the context
//! constants a battle step needs. Each variant computes strength and rolls
//! its own way; everything else is shared.
//!
//! Computing a strength or roll draws from the support pools, so each
//! combat value is meant for a single battle-resolution pass.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::ruleset::{
    territory_effect_bonus, GameData, Player, Side, TerritoryEffect, Unit, UnitId, UnitType,
};

use super::ledger::SupportLedger;
use super::support::AvailableSupports;
use super::value::{RollValue, StrengthValue};

/// The four support pools a combat value draws from.
#[derive(Debug, Clone, Default)]
pub struct SupportPools {
    pub strength_from_friends: AvailableSupports,
    pub strength_from_enemies: AvailableSupports,
    pub roll_from_friends: AvailableSupports,
    pub roll_from_enemies: AvailableSupports,
}

impl SupportPools {
    /// Pools with nothing to give.
    pub fn empty() -> Self {
        SupportPools::default()
    }

    /// Independent copies with friend and enemy pools exchanged.
    pub fn swapped(&self) -> Self {
        SupportPools {
            strength_from_friends: self.strength_from_enemies.copy(),
            strength_from_enemies: self.strength_from_friends.copy(),
            roll_from_friends: self.roll_from_enemies.copy(),
            roll_from_enemies: self.roll_from_friends.copy(),
        }
    }

    fn strength_support(&mut self, unit: &Unit, ledger: &mut SupportLedger) -> (i32, i32) {
        let friends = self.strength_from_friends.give_support_to_unit(unit, ledger);
        let enemies = self.strength_from_enemies.give_support_to_unit(unit, ledger);
        (friends, enemies)
    }

    fn roll_support(&mut self, unit: &Unit, ledger: &mut SupportLedger) -> i32 {
        self.roll_from_friends.give_support_to_unit(unit, ledger)
            + self.roll_from_enemies.give_support_to_unit(unit, ledger)
    }
}

/// The units and support shared by every combat value variant.
#[derive(Debug, Clone)]
pub struct Combatants<'a> {
    pub data: &'a GameData,
    pub supports: SupportPools,
    pub friend_units: Vec<Unit>,
    pub enemy_units: Vec<Unit>,
}

impl<'a> Combatants<'a> {
    pub fn new(data: &'a GameData, supports: SupportPools) -> Self {
        Combatants {
            data,
            supports,
            friend_units: Vec::new(),
            enemy_units: Vec::new(),
        }
    }

    fn without_supports(&self) -> Self {
        Combatants::new(self.data, SupportPools::empty())
    }

    fn opposite(&self) -> Self {
        Combatants {
            data: self.data,
            supports: self.supports.swapped(),
            friend_units: self.enemy_units.clone(),
            enemy_units: self.friend_units.clone(),
        }
    }

    /// Reads an attribute of a unit's type for its owner; 0 for an undeclared type.
    fn stat(&self, unit: &Unit, read: impl Fn(&UnitType, Option<&Player>) -> i32) -> i32 {
        match self.data.type_of(unit) {
            Some(unit_type) => read(unit_type, self.data.owner_of(unit)),
            None => 0,
        }
    }
}

/// Context constants for main battles and bombardment.
#[derive(Debug, Clone, Default)]
pub struct BattleConditions {
    pub territory_effects: Vec<TerritoryEffect>,
    pub battle_round: u32,
    /// The player whose turn it is, i.e. the attacker.
    pub attacker: Option<String>,
}

impl BattleConditions {
    /// True when defenders of `defender` are limited to strength 1 this round.
    fn is_first_round_limited(&self, data: &GameData, defender: &str) -> bool {
        if self.battle_round != 1 {
            return false;
        }
        let Some(defender) = data.player(defender) else {
            return false;
        };
        if defender.negate_dominating_first_round_attack {
            return false;
        }
        self.attacker
            .as_deref()
            .and_then(|a| data.player(a))
            .is_some_and(|a| a.dominating_first_round_attack)
    }
}

/// Strength and roll formulas for one kind of combat.
#[derive(Debug, Clone)]
pub enum CombatValue<'a> {
    MainOffense(Combatants<'a>, BattleConditions),
    MainDefense(Combatants<'a>, BattleConditions),
    AaOffense(Combatants<'a>),
    AaDefense(Combatants<'a>),
    AirBattleOffense(Combatants<'a>),
    AirBattleDefense(Combatants<'a>),
    Bombardment(Combatants<'a>, BattleConditions),
}

impl<'a> CombatValue<'a> {
    pub fn combatants(&self) -> &Combatants<'a> {
        match self {
            CombatValue::MainOffense(c, _)
            | CombatValue::MainDefense(c, _)
            | CombatValue::Bombardment(c, _)
            | CombatValue::AaOffense(c)
            | CombatValue::AaDefense(c)
            | CombatValue::AirBattleOffense(c)
            | CombatValue::AirBattleDefense(c) => c,
        }
    }

    fn combatants_mut(&mut self) -> &mut Combatants<'a> {
        match self {
            CombatValue::MainOffense(c, _)
            | CombatValue::MainDefense(c, _)
            | CombatValue::Bombardment(c, _)
            | CombatValue::AaOffense(c)
            | CombatValue::AaDefense(c)
            | CombatValue::AirBattleOffense(c)
            | CombatValue::AirBattleDefense(c) => c,
        }
    }

    pub fn data(&self) -> &'a GameData {
        self.combatants().data
    }

    pub fn friend_units(&self) -> &[Unit] {
        &self.combatants().friend_units
    }

    pub fn enemy_units(&self) -> &[Unit] {
        &self.combatants().enemy_units
    }

    pub fn supports(&self) -> &SupportPools {
        &self.combatants().supports
    }

    /// The side whose units this combat value measures.
    pub fn side(&self) -> Side {
        match self {
            CombatValue::MainOffense(..)
            | CombatValue::AaOffense(_)
            | CombatValue::AirBattleOffense(_)
            | CombatValue::Bombardment(..) => Side::Offense,
            CombatValue::MainDefense(..)
            | CombatValue::AaDefense(_)
            | CombatValue::AirBattleDefense(_) => Side::Defense,
        }
    }

    /// Dice sides a unit rolls against.
    ///
    /// Offensive AA fire may use a per-type die; everything else uses the game's.
    pub fn dice_sides(&self, unit: &Unit) -> i32 {
        let data = self.data();
        if let CombatValue::AaOffense(_) = self {
            let sides = data
                .type_of(unit)
                .map_or(-1, |t| t.offensive_attack_aa_max_die_sides);
            if sides >= 1 {
                return sides;
            }
        }
        data.dice_sides()
    }

    /// True if the unit keeps its best die when rolling several.
    pub fn choose_best_roll(&self, unit: &Unit) -> bool {
        let data = self.data();
        data.properties.lhtr_heavy_bombers
            || data.type_of(unit).is_some_and(|t| t.choose_best_roll)
    }

    /// Computes the unit's strength, drawing strength support from the pools.
    pub fn strength(&mut self, unit: &Unit, ledger: &mut SupportLedger) -> StrengthValue {
        let dice_sides = self.dice_sides(unit);
        match self {
            CombatValue::MainOffense(c, cond) => {
                let mut strength =
                    StrengthValue::of(dice_sides, c.stat(unit, |t, p| t.attack(p)));
                let marine = c.stat(unit, |t, _| t.is_marine);
                if unit.was_amphibious && marine != 0 {
                    strength = strength.add(marine);
                }
                strength = strength.add(territory_effect_bonus(
                    &cond.territory_effects,
                    &unit.unit_type,
                    Side::Offense,
                ));
                let (friends, enemies) = c.supports.strength_support(unit, ledger);
                strength.add(friends).add(enemies)
            }
            CombatValue::MainDefense(c, cond) => {
                let base = c.stat(unit, |t, p| t.defense(p));
                if cond.is_first_round_limited(c.data, &unit.owner) {
                    let enemies = c
                        .supports
                        .strength_from_enemies
                        .give_support_to_unit(unit, ledger);
                    return StrengthValue::of(dice_sides, base.min(1)).add(enemies);
                }
                let terrain =
                    territory_effect_bonus(&cond.territory_effects, &unit.unit_type, Side::Defense);
                let (friends, enemies) = c.supports.strength_support(unit, ledger);
                StrengthValue::of(dice_sides, base)
                    .add(terrain)
                    .add(friends)
                    .add(enemies)
            }
            CombatValue::AaOffense(c) => {
                let base = c.stat(unit, |t, _| t.offensive_attack_aa);
                let (friends, enemies) = c.supports.strength_support(unit, ledger);
                StrengthValue::of(dice_sides, base).add(friends).add(enemies)
            }
            CombatValue::AaDefense(c) => {
                let base = c.stat(unit, |t, _| t.attack_aa);
                let (friends, enemies) = c.supports.strength_support(unit, ledger);
                StrengthValue::of(dice_sides, base).add(friends).add(enemies)
            }
            CombatValue::AirBattleOffense(c) => {
                let base = c.stat(unit, |t, _| t.air_attack);
                let (friends, enemies) = c.supports.strength_support(unit, ledger);
                StrengthValue::of(dice_sides, base).add(friends).add(enemies)
            }
            CombatValue::AirBattleDefense(c) => {
                let base = c.stat(unit, |t, _| t.air_defense);
                let (friends, enemies) = c.supports.strength_support(unit, ledger);
                StrengthValue::of(dice_sides, base).add(friends).add(enemies)
            }
            CombatValue::Bombardment(c, cond) => {
                let base = c.stat(unit, |t, p| t.bombard(p));
                let terrain =
                    territory_effect_bonus(&cond.territory_effects, &unit.unit_type, Side::Offense);
                let (friends, enemies) = c.supports.strength_support(unit, ledger);
                StrengthValue::of(dice_sides, base)
                    .add(terrain)
                    .add(friends)
                    .add(enemies)
            }
        }
    }

    /// Computes the unit's number of rolls, drawing roll support from the pools.
    pub fn roll(&mut self, unit: &Unit, ledger: &mut SupportLedger) -> RollValue {
        let dice_sides = self.dice_sides(unit);
        let base = match self {
            CombatValue::MainOffense(c, _) | CombatValue::Bombardment(c, _) => {
                c.stat(unit, |t, p| t.attack_rolls(p))
            }
            CombatValue::MainDefense(c, _) => c.stat(unit, |t, p| t.defense_rolls(p)),
            CombatValue::AaOffense(_)
            | CombatValue::AaDefense(_)
            | CombatValue::AirBattleOffense(_)
            | CombatValue::AirBattleDefense(_) => 1,
        };
        let support = self.combatants_mut().supports.roll_support(unit, ledger);
        RollValue::of(dice_sides, base).add(support)
    }

    /// The same variant with empty support pools and no units, for
    /// support-independent baselines.
    pub fn build_with_no_unit_supports(&self) -> CombatValue<'a> {
        match self {
            CombatValue::MainOffense(c, cond) => {
                CombatValue::MainOffense(c.without_supports(), cond.clone())
            }
            CombatValue::MainDefense(c, cond) => {
                CombatValue::MainDefense(c.without_supports(), cond.clone())
            }
            CombatValue::AaOffense(c) => CombatValue::AaOffense(c.without_supports()),
            CombatValue::AaDefense(c) => CombatValue::AaDefense(c.without_supports()),
            CombatValue::AirBattleOffense(c) => CombatValue::AirBattleOffense(c.without_supports()),
            CombatValue::AirBattleDefense(c) => CombatValue::AirBattleDefense(c.without_supports()),
            CombatValue::Bombardment(c, cond) => {
                CombatValue::Bombardment(c.without_supports(), cond.clone())
            }
        }
    }

    /// The mirrored combat value: offense and defense exchanged, with
    /// friend and enemy units and pools swapped. Bombardment mirrors to a
    /// main-battle defense.
    pub fn build_opposite_combat_value(&self) -> CombatValue<'a> {
        match self {
            CombatValue::MainOffense(c, cond) => {
                CombatValue::MainDefense(c.opposite(), cond.clone())
            }
            CombatValue::MainDefense(c, cond) => {
                CombatValue::MainOffense(c.opposite(), cond.clone())
            }
            CombatValue::AaOffense(c) => CombatValue::AaDefense(c.opposite()),
            CombatValue::AaDefense(c) => CombatValue::AaOffense(c.opposite()),
            CombatValue::AirBattleOffense(c) => CombatValue::AirBattleDefense(c.opposite()),
            CombatValue::AirBattleDefense(c) => CombatValue::AirBattleOffense(c.opposite()),
            CombatValue::Bombardment(c, cond) => {
                CombatValue::MainDefense(c.opposite(), cond.clone())
            }
        }
    }

    /// Orders units strongest first by their support-free strength relative
    /// to their dice sides. Units with zero strength go last.
    ///
    /// Strengths come from `build_with_no_unit_supports`, so the ordering
    /// never touches this combat value's pools.
    pub fn unit_comparator(&self) -> impl FnMut(&Unit, &Unit) -> Ordering + 'a {
        let mut baseline = self.build_with_no_unit_supports();
        let mut cache: HashMap<UnitId, (i64, i64)> = HashMap::new();
        move |a: &Unit, b: &Unit| {
            let (sa, da) = baseline_strength(&mut baseline, &mut cache, a);
            let (sb, db) = baseline_strength(&mut baseline, &mut cache, b);
            (sa == 0)
                .cmp(&(sb == 0))
                .then_with(|| (sb * da).cmp(&(sa * db)))
        }
    }

    /// Sorts units strongest first; equal units keep their order.
    pub fn sort_units(&self, units: &mut [Unit]) {
        units.sort_by(self.unit_comparator());
    }
}

fn baseline_strength(
    baseline: &mut CombatValue<'_>,
    cache: &mut HashMap<UnitId, (i64, i64)>,
    unit: &Unit,
) -> (i64, i64) {
    if let Some(hit) = cache.get(&unit.id) {
        return *hit;
    }
    let mut scratch = SupportLedger::new();
    let strength = baseline.strength(unit, &mut scratch).value();
    let entry = (i64::from(strength), i64::from(baseline.dice_sides(unit)));
    cache.insert(unit.id, entry);
    entry
}
