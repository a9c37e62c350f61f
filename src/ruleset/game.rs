//! The validated ruleset a battle is computed against.
//!
//! Holds global properties, unit types, players, support rules, and
//! territory effects. Built by the loader or directly in code; read-only
//! once handed to the power engine.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::support::SupportRule;
use super::territory::TerritoryEffect;
use super::unit::{Unit, UnitType};

/// Game-wide options that affect combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProperties {
    #[serde(default = "default_dice_sides")]
    pub dice_sides: i32,
    /// Every multi-roll unit keeps its best die (LHTR heavy bombers).
    #[serde(default)]
    pub lhtr_heavy_bombers: bool,
}

fn default_dice_sides() -> i32 {
    6
}

impl Default for GameProperties {
    fn default() -> Self {
        GameProperties {
            dice_sides: default_dice_sides(),
            lhtr_heavy_bombers: false,
        }
    }
}

/// A player and the parts of its rules/tech state combat depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub techs: BTreeSet<String>,
    /// Defenders roll at most 1 in the first round when this player attacks.
    #[serde(default)]
    pub dominating_first_round_attack: bool,
    /// This player's defenders ignore a dominating first round attack.
    #[serde(default)]
    pub negate_dominating_first_round_attack: bool,
}

impl Player {
    pub fn named(name: &str) -> Self {
        Player {
            name: name.to_string(),
            ..Player::default()
        }
    }

    pub fn has_tech(&self, tech: &str) -> bool {
        self.techs.contains(tech)
    }
}

/// Everything the power engine reads from the ruleset.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    pub properties: GameProperties,
    pub unit_types: BTreeMap<String, UnitType>,
    pub players: BTreeMap<String, Player>,
    /// Rules in declaration order.
    pub rules: Vec<Arc<SupportRule>>,
    pub territory_effects: BTreeMap<String, TerritoryEffect>,
}

impl GameData {
    pub fn new(properties: GameProperties) -> Self {
        GameData {
            properties,
            ..GameData::default()
        }
    }

    pub fn add_unit_type(&mut self, unit_type: UnitType) {
        self.unit_types.insert(unit_type.name.clone(), unit_type);
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.name.clone(), player);
    }

    pub fn add_rule(&mut self, rule: SupportRule) {
        self.rules.push(Arc::new(rule));
    }

    pub fn add_territory_effect(&mut self, effect: TerritoryEffect) {
        self.territory_effects.insert(effect.name.clone(), effect);
    }

    pub fn dice_sides(&self) -> i32 {
        self.properties.dice_sides
    }

    pub fn unit_type(&self, name: &str) -> Option<&UnitType> {
        self.unit_types.get(name)
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    /// Returns the type of a unit, or None with a warning if it is undeclared.
    pub fn type_of(&self, unit: &Unit) -> Option<&UnitType> {
        let found = self.unit_types.get(&unit.unit_type);
        if found.is_none() {
            tracing::warn!(
                unit = %unit.id,
                unit_type = %unit.unit_type,
                "unit type not declared; using zero values"
            );
        }
        found
    }

    pub fn owner_of(&self, unit: &Unit) -> Option<&Player> {
        self.players.get(&unit.owner)
    }

    /// Returns true if the named player owns the given tech.
    pub fn player_has_tech(&self, player: &str, tech: &str) -> bool {
        self.player(player).is_some_and(|p| p.has_tech(tech))
    }

    /// Rules that modify strength or rolls in main, air, and bombardment combat.
    pub fn support_rules(&self) -> Vec<Arc<SupportRule>> {
        self.rules.iter().filter(|r| r.is_main()).cloned().collect()
    }

    /// Rules that modify anti-aircraft strength or rolls.
    pub fn support_aa_rules(&self) -> Vec<Arc<SupportRule>> {
        self.rules.iter().filter(|r| r.is_aa()).cloned().collect()
    }

    /// Looks up a list of territory effects by name, skipping unknown ones.
    pub fn effects_named(&self, names: &[&str]) -> Vec<TerritoryEffect> {
        names
            .iter()
            .filter_map(|n| self.territory_effects.get(*n).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::support::SupportDice;

    #[test]
    fn rule_lists_split_by_dice_kind() {
        let mut data = GameData::new(GameProperties::default());
        data.add_rule(SupportRule::new("arty", "artillery"));
        data.add_rule(SupportRule::new("radar", "aaGun").with_dice(SupportDice::AA_STRENGTH));
        data.add_rule(SupportRule::new("rolls", "bomber").with_dice(SupportDice::ROLL));

        let main: Vec<_> = data.support_rules().iter().map(|r| r.name.clone()).collect();
        let aa: Vec<_> = data.support_aa_rules().iter().map(|r| r.name.clone()).collect();
        assert_eq!(main, vec!["arty", "rolls"]);
        assert_eq!(aa, vec!["radar"]);
    }

    #[test]
    fn default_properties() {
        let p = GameProperties::default();
        assert_eq!(p.dice_sides, 6);
        assert!(!p.lhtr_heavy_bombers);
    }

    #[test]
    fn tech_lookup() {
        let mut data = GameData::default();
        let mut p = Player::named("Russians");
        p.techs.insert("improvedArtillerySupport".to_string());
        data.add_player(p);
        assert!(data.player_has_tech("Russians", "improvedArtillerySupport"));
        assert!(!data.player_has_tech("Russians", "jetPower"));
        assert!(!data.player_has_tech("Nobody", "improvedArtillerySupport"));
    }

    #[test]
    fn unknown_unit_type_is_none() {
        let data = GameData::default();
        let unit = Unit::new(1, "mystery", "Russians");
        assert!(data.type_of(&unit).is_none());
    }
}
