//! Ruleset loading from JSON.
//!
//! The file form uses plain strings for enumerated fields (`"offence"`,
//! `"2:artillery"`, `"strength:roll"`); they are parsed and cross-checked
//! here so that the power engine can trust every name it sees.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::game::{GameData, GameProperties, Player};
use super::support::{BonusType, SupportDice, SupportRule};
use super::territory::TerritoryEffect;
use super::unit::UnitType;

/// Errors that can occur while loading a ruleset.
#[derive(Debug, thiserror::Error)]
pub enum RulesetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse ruleset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dice sides must be at least 1, got {0}")]
    InvalidDiceSides(i32),

    #[error("invalid bonus type '{0}'")]
    InvalidBonusType(String),

    #[error("invalid side '{value}' on rule '{rule}'")]
    InvalidSide { rule: String, value: String },

    #[error("invalid faction '{value}' on rule '{rule}'")]
    InvalidFaction { rule: String, value: String },

    #[error("invalid dice '{value}' on rule '{rule}'")]
    InvalidDice { rule: String, value: String },

    #[error("support number {number} on rule '{rule}' is out of range")]
    InvalidNumber { rule: String, number: i32 },

    #[error("'{rule}' refers to unknown unit type '{unit_type}'")]
    UnknownUnitType { rule: String, unit_type: String },

    #[error("'{rule}' refers to unknown player '{player}'")]
    UnknownPlayer { rule: String, player: String },

    #[error("duplicate unit type '{0}'")]
    DuplicateUnitType(String),

    #[error("duplicate player '{0}'")]
    DuplicatePlayer(String),

    #[error("duplicate support rule '{0}'")]
    DuplicateRule(String),

    #[error("duplicate territory effect '{0}'")]
    DuplicateTerritoryEffect(String),
}

/// The ruleset document as written on disk.
#[derive(Debug, Clone, Deserialize)]
struct RulesetFile {
    #[serde(default)]
    properties: GameProperties,
    #[serde(default)]
    unit_types: Vec<UnitType>,
    #[serde(default)]
    players: Vec<Player>,
    #[serde(default)]
    support_rules: Vec<RuleInput>,
    #[serde(default)]
    territory_effects: Vec<TerritoryEffect>,
}

/// A support rule as written in the ruleset document.
#[derive(Debug, Clone, Deserialize)]
struct RuleInput {
    name: String,
    giver: String,
    #[serde(default)]
    receivers: Vec<String>,
    #[serde(default)]
    players: Vec<String>,
    #[serde(default = "default_side")]
    side: String,
    #[serde(default = "default_faction")]
    faction: String,
    #[serde(default)]
    bonus: i32,
    bonus_type: String,
    #[serde(default = "default_dice")]
    dice: String,
    #[serde(default)]
    number: i32,
    #[serde(default)]
    improved_by_tech: Option<String>,
}

fn default_side() -> String {
    "offence".to_string()
}

fn default_faction() -> String {
    "allied".to_string()
}

fn default_dice() -> String {
    "strength".to_string()
}

/// Loads a ruleset from a JSON file at the given path.
pub fn load_ruleset(path: &Path) -> Result<GameData, RulesetError> {
    let json = fs::read_to_string(path).map_err(|source| RulesetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_ruleset_from_str(&json)
}

/// Loads a ruleset from a JSON string.
pub fn load_ruleset_from_str(json: &str) -> Result<GameData, RulesetError> {
    let file: RulesetFile = serde_json::from_str(json)?;
    let data = build_game_data(file)?;
    tracing::info!(
        unit_types = data.unit_types.len(),
        players = data.players.len(),
        rules = data.rules.len(),
        territory_effects = data.territory_effects.len(),
        dice_sides = data.dice_sides(),
        "loaded ruleset"
    );
    Ok(data)
}

fn build_game_data(file: RulesetFile) -> Result<GameData, RulesetError> {
    if file.properties.dice_sides < 1 {
        return Err(RulesetError::InvalidDiceSides(file.properties.dice_sides));
    }
    let mut data = GameData::new(file.properties);

    for unit_type in file.unit_types {
        if data.unit_types.contains_key(&unit_type.name) {
            return Err(RulesetError::DuplicateUnitType(unit_type.name));
        }
        data.add_unit_type(unit_type);
    }

    for player in file.players {
        if data.players.contains_key(&player.name) {
            return Err(RulesetError::DuplicatePlayer(player.name));
        }
        data.add_player(player);
    }

    for effect in file.territory_effects {
        if data.territory_effects.contains_key(&effect.name) {
            return Err(RulesetError::DuplicateTerritoryEffect(effect.name));
        }
        for unit_type in effect.combat_offense.keys().chain(effect.combat_defense.keys()) {
            check_unit_type(&data, &effect.name, unit_type)?;
        }
        data.add_territory_effect(effect);
    }

    let mut seen = BTreeSet::new();
    for input in file.support_rules {
        if !seen.insert(input.name.clone()) {
            return Err(RulesetError::DuplicateRule(input.name));
        }
        let rule = parse_rule(&data, input)?;
        data.add_rule(rule);
    }

    Ok(data)
}

fn check_unit_type(data: &GameData, owner: &str, unit_type: &str) -> Result<(), RulesetError> {
    if data.unit_type(unit_type).is_none() {
        return Err(RulesetError::UnknownUnitType {
            rule: owner.to_string(),
            unit_type: unit_type.to_string(),
        });
    }
    Ok(())
}

/// Parses a colon-separated pair of flags such as `"offence:defence"`.
fn parse_flags(value: &str, first: &[&str], second: &[&str]) -> Option<(bool, bool)> {
    let mut flags = (false, false);
    for part in value.split(':').map(str::trim) {
        if first.contains(&part) {
            flags.0 = true;
        } else if second.contains(&part) {
            flags.1 = true;
        } else {
            return None;
        }
    }
    Some(flags)
}

/// Largest per-giver support count a rule may declare.
const MAX_SUPPORT_NUMBER: i32 = 1_000;

fn parse_rule(data: &GameData, input: RuleInput) -> Result<SupportRule, RulesetError> {
    let name = input.name;
    if !(0..=MAX_SUPPORT_NUMBER).contains(&input.number) {
        return Err(RulesetError::InvalidNumber {
            rule: name,
            number: input.number,
        });
    }

    check_unit_type(data, &name, &input.giver)?;
    for receiver in &input.receivers {
        check_unit_type(data, &name, receiver)?;
    }
    for player in &input.players {
        if data.player(player).is_none() {
            return Err(RulesetError::UnknownPlayer {
                rule: name,
                player: player.clone(),
            });
        }
    }

    let Some((offence, defence)) =
        parse_flags(&input.side, &["offence", "offense"], &["defence", "defense"])
    else {
        return Err(RulesetError::InvalidSide {
            rule: name,
            value: input.side,
        });
    };
    let Some((allied, enemy)) = parse_flags(&input.faction, &["allied"], &["enemy"]) else {
        return Err(RulesetError::InvalidFaction {
            rule: name,
            value: input.faction,
        });
    };
    let Some(dice) = SupportDice::parse(&input.dice) else {
        return Err(RulesetError::InvalidDice {
            rule: name,
            value: input.dice,
        });
    };
    let bonus_type = BonusType::parse(&input.bonus_type)
        .ok_or_else(|| RulesetError::InvalidBonusType(input.bonus_type.clone()))?;

    Ok(SupportRule {
        name,
        giver_type: input.giver,
        receiver_types: input.receivers.into_iter().collect(),
        players: input.players,
        offence,
        defence,
        allied,
        enemy,
        bonus: input.bonus,
        bonus_type,
        dice,
        number: input.number,
        improved_by_tech: input.improved_by_tech,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULESET: &str = r#"{
        "properties": { "dice_sides": 6 },
        "unit_types": [
            { "name": "infantry", "attack": 1, "defense": 2 },
            { "name": "artillery", "attack": 2, "defense": 2 }
        ],
        "players": [
            { "name": "Russians", "techs": ["improvedArtillerySupport"] }
        ],
        "support_rules": [
            {
                "name": "artyAttack",
                "giver": "artillery",
                "receivers": ["infantry"],
                "players": ["Russians"],
                "side": "offence",
                "faction": "allied",
                "bonus": 1,
                "bonus_type": "ArtyOld",
                "dice": "strength",
                "number": 1,
                "improved_by_tech": "improvedArtillerySupport"
            }
        ],
        "territory_effects": [
            { "name": "forest", "combat_defense": { "infantry": 1 } }
        ]
    }"#;

    #[test]
    fn loads_valid_ruleset() {
        let data = load_ruleset_from_str(RULESET).unwrap();
        assert_eq!(data.dice_sides(), 6);
        assert_eq!(data.unit_types.len(), 2);
        assert_eq!(data.rules.len(), 1);
        let rule = &data.rules[0];
        assert!(rule.offence && !rule.defence);
        assert!(rule.allied && !rule.enemy);
        assert_eq!(rule.bonus_type, BonusType::new("ArtyOld", 1));
        assert!(rule.supports("infantry"));
        assert_eq!(rule.improved_by_tech.as_deref(), Some("improvedArtillerySupport"));
        assert!(data.territory_effects.contains_key("forest"));
    }

    #[test]
    fn both_sides_parse() {
        let json = RULESET.replace(r#""side": "offence""#, r#""side": "offence:defence""#);
        let data = load_ruleset_from_str(&json).unwrap();
        assert!(data.rules[0].offence && data.rules[0].defence);
    }

    #[test]
    fn rejects_unknown_receiver() {
        let json = RULESET.replace(r#""receivers": ["infantry"]"#, r#""receivers": ["tank"]"#);
        match load_ruleset_from_str(&json) {
            Err(RulesetError::UnknownUnitType { rule, unit_type }) => {
                assert_eq!(rule, "artyAttack");
                assert_eq!(unit_type, "tank");
            }
            other => panic!("expected UnknownUnitType, got {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_player() {
        let json = RULESET.replace(r#""players": ["Russians"]"#, r#""players": ["Martians"]"#);
        assert!(matches!(
            load_ruleset_from_str(&json),
            Err(RulesetError::UnknownPlayer { .. })
        ));
    }

    #[test]
    fn rejects_bad_bonus_type() {
        let json = RULESET.replace(r#""ArtyOld""#, r#""0:ArtyOld""#);
        assert!(matches!(
            load_ruleset_from_str(&json),
            Err(RulesetError::InvalidBonusType(_))
        ));
    }

    #[test]
    fn rejects_bad_side() {
        let json = RULESET.replace(r#""side": "offence""#, r#""side": "sideways""#);
        assert!(matches!(
            load_ruleset_from_str(&json),
            Err(RulesetError::InvalidSide { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_support_number() {
        for number in ["-1", "2147483647"] {
            let json = RULESET.replace(r#""number": 1,"#, &format!(r#""number": {number},"#));
            match load_ruleset_from_str(&json) {
                Err(RulesetError::InvalidNumber { rule, number: n }) => {
                    assert_eq!(rule, "artyAttack");
                    assert_eq!(n.to_string(), number);
                }
                other => panic!("expected InvalidNumber, got {:?}", other),
            }
        }
    }

    #[test]
    fn rejects_zero_dice_sides() {
        let json = RULESET.replace(r#""dice_sides": 6"#, r#""dice_sides": 0"#);
        assert!(matches!(
            load_ruleset_from_str(&json),
            Err(RulesetError::InvalidDiceSides(0))
        ));
    }

    #[test]
    fn rejects_duplicate_unit_type() {
        let json = RULESET.replace(
            r#"{ "name": "artillery", "attack": 2, "defense": 2 }"#,
            r#"{ "name": "infantry", "attack": 2, "defense": 2 }"#,
        );
        assert!(matches!(
            load_ruleset_from_str(&json),
            Err(RulesetError::DuplicateUnitType(_))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            load_ruleset_from_str("{ not json"),
            Err(RulesetError::Json(_))
        ));
    }

    #[test]
    fn empty_receivers_are_accepted() {
        let json = RULESET.replace(r#""receivers": ["infantry"]"#, r#""receivers": []"#);
        let data = load_ruleset_from_str(&json).unwrap();
        assert!(data.rules[0].receiver_types.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_ruleset(Path::new("/nonexistent/ruleset.json")).unwrap_err();
        assert!(matches!(err, RulesetError::Io { .. }));
    }
}
