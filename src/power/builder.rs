//! Assembly of combat values for each kind of battle step.

use std::sync::Arc;

use crate::ruleset::{GameData, Side, SupportRule, TerritoryEffect, Unit, UnitId};

use super::combat_value::{BattleConditions, CombatValue, Combatants, SupportPools};
use super::support::{AvailableSupports, SupportCalculator};

/// Errors raised when the builder is given units or players the ruleset
/// does not declare.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("unit {unit} has undeclared type '{unit_type}'")]
    UnknownUnitType { unit: UnitId, unit_type: String },

    #[error("unit {unit} has undeclared owner '{owner}'")]
    UnknownOwner { unit: UnitId, owner: String },

    #[error("attacker '{0}' is not a declared player")]
    UnknownAttacker(String),
}

/// Wires units, rules, and battle context into a [`CombatValue`].
///
/// Friendly support comes from the friendly units for `side`; enemy
/// support comes from the enemy units acting on the opposite side.
#[derive(Debug, Clone)]
pub struct CombatValueBuilder<'a> {
    data: &'a GameData,
    friendly_units: Vec<Unit>,
    enemy_units: Vec<Unit>,
    side: Side,
    territory_effects: Vec<TerritoryEffect>,
    battle_round: u32,
    attacker: Option<String>,
}

impl<'a> CombatValueBuilder<'a> {
    pub fn new(data: &'a GameData) -> Self {
        CombatValueBuilder {
            data,
            friendly_units: Vec::new(),
            enemy_units: Vec::new(),
            side: Side::Offense,
            territory_effects: Vec::new(),
            battle_round: 1,
            attacker: None,
        }
    }

    pub fn friendly_units(mut self, units: Vec<Unit>) -> Self {
        self.friendly_units = units;
        self
    }

    pub fn enemy_units(mut self, units: Vec<Unit>) -> Self {
        self.enemy_units = units;
        self
    }

    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn territory_effects(mut self, effects: Vec<TerritoryEffect>) -> Self {
        self.territory_effects = effects;
        self
    }

    pub fn battle_round(mut self, round: u32) -> Self {
        self.battle_round = round;
        self
    }

    /// The player whose turn it is.
    pub fn attacker(mut self, player: &str) -> Self {
        self.attacker = Some(player.to_string());
        self
    }

    /// Main battle value for `side`.
    pub fn main_combat_value(self) -> Result<CombatValue<'a>, BuildError> {
        self.validate()?;
        let pools = self.pools(
            &self.data.support_rules(),
            self.side,
            SupportRule::strength,
            SupportRule::roll,
        );
        let conditions = self.conditions();
        let (combatants, side) = self.into_combatants(pools);
        Ok(match side {
            Side::Offense => CombatValue::MainOffense(combatants, conditions),
            Side::Defense => CombatValue::MainDefense(combatants, conditions),
        })
    }

    /// Anti-aircraft fire value for `side`, drawing on AA support rules.
    pub fn aa_combat_value(self) -> Result<CombatValue<'a>, BuildError> {
        self.validate()?;
        let pools = self.pools(
            &self.data.support_aa_rules(),
            self.side,
            SupportRule::aa_strength,
            SupportRule::aa_roll,
        );
        let (combatants, side) = self.into_combatants(pools);
        Ok(match side {
            Side::Offense => CombatValue::AaOffense(combatants),
            Side::Defense => CombatValue::AaDefense(combatants),
        })
    }

    /// Air-to-air battle value for `side`.
    pub fn air_battle_combat_value(self) -> Result<CombatValue<'a>, BuildError> {
        self.validate()?;
        let pools = self.pools(
            &self.data.support_rules(),
            self.side,
            SupportRule::strength,
            SupportRule::roll,
        );
        let (combatants, side) = self.into_combatants(pools);
        Ok(match side {
            Side::Offense => CombatValue::AirBattleOffense(combatants),
            Side::Defense => CombatValue::AirBattleDefense(combatants),
        })
    }

    /// Naval bombardment value. Bombarding units always attack, so `side`
    /// is ignored.
    pub fn bombardment_combat_value(self) -> Result<CombatValue<'a>, BuildError> {
        self.validate()?;
        let pools = self.pools(
            &self.data.support_rules(),
            Side::Offense,
            SupportRule::strength,
            SupportRule::roll,
        );
        let conditions = self.conditions();
        let (combatants, _) = self.into_combatants(pools);
        Ok(CombatValue::Bombardment(combatants, conditions))
    }

    fn validate(&self) -> Result<(), BuildError> {
        for unit in self.friendly_units.iter().chain(&self.enemy_units) {
            if self.data.unit_type(&unit.unit_type).is_none() {
                return Err(BuildError::UnknownUnitType {
                    unit: unit.id,
                    unit_type: unit.unit_type.clone(),
                });
            }
            if self.data.player(&unit.owner).is_none() {
                return Err(BuildError::UnknownOwner {
                    unit: unit.id,
                    owner: unit.owner.clone(),
                });
            }
        }
        if let Some(attacker) = &self.attacker {
            if self.data.player(attacker).is_none() {
                return Err(BuildError::UnknownAttacker(attacker.clone()));
            }
        }
        Ok(())
    }

    fn pools(
        &self,
        rules: &[Arc<SupportRule>],
        side: Side,
        strength: fn(&SupportRule) -> bool,
        roll: fn(&SupportRule) -> bool,
    ) -> SupportPools {
        let friends = AvailableSupports::get_sorted_support(&SupportCalculator::new(
            &self.friendly_units,
            rules,
            side,
            true,
            self.data,
        ));
        let enemies = AvailableSupports::get_sorted_support(&SupportCalculator::new(
            &self.enemy_units,
            rules,
            side.opposite(),
            false,
            self.data,
        ));
        tracing::debug!(
            ?side,
            friendly = friends.total_left(),
            enemy = enemies.total_left(),
            "support pools built"
        );
        SupportPools {
            strength_from_friends: friends.filter(strength),
            strength_from_enemies: enemies.filter(strength),
            roll_from_friends: friends.filter(roll),
            roll_from_enemies: enemies.filter(roll),
        }
    }

    fn conditions(&self) -> BattleConditions {
        BattleConditions {
            territory_effects: self.territory_effects.clone(),
            battle_round: self.battle_round,
            attacker: self.attacker.clone(),
        }
    }

    fn into_combatants(self, supports: SupportPools) -> (Combatants<'a>, Side) {
        let combatants = Combatants {
            data: self.data,
            supports,
            friend_units: self.friendly_units,
            enemy_units: self.enemy_units,
        };
        (combatants, self.side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::ledger::SupportLedger;
    use crate::ruleset::{BonusType, GameProperties, Player, SupportDice, UnitType};

    fn data() -> GameData {
        let mut data = GameData::new(GameProperties::default());
        let mut infantry = UnitType::named("infantry");
        infantry.attack = 1;
        infantry.defense = 2;
        data.add_unit_type(infantry);
        let mut artillery = UnitType::named("artillery");
        artillery.attack = 2;
        artillery.defense = 2;
        data.add_unit_type(artillery);
        let mut gun = UnitType::named("aaGun");
        gun.attack_aa = 1;
        data.add_unit_type(gun);
        let mut battleship = UnitType::named("battleship");
        battleship.attack = 4;
        battleship.bombard = 4;
        data.add_unit_type(battleship);
        data.add_player(Player::named("Germans"));
        data.add_player(Player::named("British"));

        data.add_rule(
            SupportRule::new("artillery", "artillery")
                .with_players(&["Germans", "British"])
                .with_receivers(&["infantry"]),
        );
        data.add_rule(
            SupportRule::new("artilleryRolls", "artillery")
                .with_players(&["Germans"])
                .with_receivers(&["infantry"])
                .with_dice(SupportDice::ROLL)
                .with_bonus_type(BonusType::new("rolls", 1)),
        );
        data.add_rule(
            SupportRule::new("jamming", "artillery")
                .with_side(Side::Offense)
                .with_allied(false)
                .with_players(&["Germans"])
                .with_receivers(&["aaGun"])
                .with_dice(SupportDice::AA_STRENGTH)
                .with_bonus(-1),
        );
        data
    }

    #[test]
    fn main_offense_splits_strength_and_roll_pools() {
        let data = data();
        let value = CombatValueBuilder::new(&data)
            .friendly_units(vec![Unit::new(1, "artillery", "Germans")])
            .side(Side::Offense)
            .attacker("Germans")
            .main_combat_value()
            .unwrap();
        assert!(matches!(value, CombatValue::MainOffense(..)));
        let supports = value.supports();
        assert_eq!(supports.strength_from_friends.total_left(), 1);
        assert_eq!(supports.roll_from_friends.total_left(), 1);
        assert!(supports.strength_from_enemies.is_empty());

        let mut value = value;
        let infantry = Unit::new(10, "infantry", "Germans");
        let mut ledger = SupportLedger::new();
        assert_eq!(value.strength(&infantry, &mut ledger).value(), 2);
        assert_eq!(value.roll(&infantry, &mut ledger).value(), 2);
        assert_eq!(ledger.received_by(UnitId(10)), 2);
    }

    #[test]
    fn defense_side_uses_defence_rules() {
        let data = data();
        let value = CombatValueBuilder::new(&data)
            .friendly_units(vec![Unit::new(1, "artillery", "British")])
            .side(Side::Defense)
            .main_combat_value()
            .unwrap();
        assert!(matches!(value, CombatValue::MainDefense(..)));
        // the artillery rules are offence-only
        assert!(value.supports().strength_from_friends.is_empty());
    }

    #[test]
    fn aa_value_takes_enemy_aa_support() {
        let data = data();
        let mut value = CombatValueBuilder::new(&data)
            .friendly_units(vec![Unit::new(1, "aaGun", "British")])
            .enemy_units(vec![Unit::new(2, "artillery", "Germans")])
            .side(Side::Defense)
            .aa_combat_value()
            .unwrap();
        assert!(matches!(value, CombatValue::AaDefense(_)));
        assert_eq!(value.supports().strength_from_enemies.total_left(), 1);
        assert!(value.supports().roll_from_enemies.is_empty());
        let gun = Unit::new(1, "aaGun", "British");
        let strength = value.strength(&gun, &mut SupportLedger::new());
        assert!(strength.is_zero());
    }

    #[test]
    fn air_and_bombardment_variants() {
        let data = data();
        let air = CombatValueBuilder::new(&data)
            .side(Side::Defense)
            .air_battle_combat_value()
            .unwrap();
        assert!(matches!(air, CombatValue::AirBattleDefense(_)));

        let mut bombard = CombatValueBuilder::new(&data)
            .friendly_units(vec![Unit::new(1, "battleship", "Germans")])
            .side(Side::Defense)
            .territory_effects(vec![TerritoryEffect::new("coast").with_offense("battleship", 1)])
            .battle_round(1)
            .bombardment_combat_value()
            .unwrap();
        assert!(matches!(bombard, CombatValue::Bombardment(..)));
        let ship = Unit::new(1, "battleship", "Germans");
        assert_eq!(bombard.strength(&ship, &mut SupportLedger::new()).value(), 5);
    }

    #[test]
    fn rejects_undeclared_units_and_players() {
        let data = data();
        let err = CombatValueBuilder::new(&data)
            .friendly_units(vec![Unit::new(7, "zeppelin", "Germans")])
            .main_combat_value()
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownUnitType { unit: UnitId(7), .. }));

        let err = CombatValueBuilder::new(&data)
            .enemy_units(vec![Unit::new(8, "infantry", "Martians")])
            .main_combat_value()
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownOwner { .. }));

        let err = CombatValueBuilder::new(&data)
            .attacker("Nobody")
            .aa_combat_value()
            .unwrap_err();
        assert_eq!(err.to_string(), "attacker 'Nobody' is not a declared player");
    }
}
