//! Support rule declarations.
//!
//! A support rule lets units of one type improve (or, against enemies,
//! worsen) the strength or rolls of units of other types. Rules that share
//! a bonus type compete for a common stacking quota.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of a battle a unit or rule is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Offense,
    Defense,
}

impl Side {
    pub const fn opposite(self) -> Side {
        match self {
            Side::Offense => Side::Defense,
            Side::Defense => Side::Offense,
        }
    }
}

/// A stacking group shared by support rules.
///
/// `count` is how many times bonuses of this type may stack on one unit.
/// Parsed from `"name"` (count 1) or `"count:name"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BonusType {
    pub name: String,
    pub count: i32,
}

impl BonusType {
    pub fn new(name: &str, count: i32) -> Self {
        BonusType {
            name: name.to_string(),
            count,
        }
    }

    /// Parses the ruleset form of a bonus type. Returns None for an empty
    /// name or a count that is not a positive integer.
    pub fn parse(s: &str) -> Option<BonusType> {
        let s = s.trim();
        let (count, name) = match s.split_once(':') {
            Some((count, name)) => (count.trim().parse::<i32>().ok()?, name.trim()),
            None => (1, s),
        };
        if name.is_empty() || count < 1 {
            return None;
        }
        Some(BonusType::new(name, count))
    }
}

impl fmt::Display for BonusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.count, self.name)
        }
    }
}

/// The dice values a support rule modifies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupportDice {
    pub strength: bool,
    pub roll: bool,
    pub aa_strength: bool,
    pub aa_roll: bool,
}

impl SupportDice {
    pub const STRENGTH: SupportDice = SupportDice {
        strength: true,
        roll: false,
        aa_strength: false,
        aa_roll: false,
    };
    pub const ROLL: SupportDice = SupportDice {
        strength: false,
        roll: true,
        aa_strength: false,
        aa_roll: false,
    };
    pub const AA_STRENGTH: SupportDice = SupportDice {
        strength: false,
        roll: false,
        aa_strength: true,
        aa_roll: false,
    };
    pub const AA_ROLL: SupportDice = SupportDice {
        strength: false,
        roll: false,
        aa_strength: false,
        aa_roll: true,
    };

    /// Parses a colon-separated list such as `"strength:roll"` or `"AAstrength"`.
    pub fn parse(s: &str) -> Option<SupportDice> {
        let mut dice = SupportDice::default();
        for part in s.split(':').map(str::trim) {
            match part {
                "strength" => dice.strength = true,
                "roll" => dice.roll = true,
                "AAstrength" => dice.aa_strength = true,
                "AAroll" => dice.aa_roll = true,
                _ => return None,
            }
        }
        Some(dice)
    }
}

/// A declared support rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportRule {
    pub name: String,
    /// The unit type that gives this support.
    pub giver_type: String,
    /// Unit types that may receive it. Empty means the rule is inert.
    pub receiver_types: BTreeSet<String>,
    /// Owners whose units may give it. Empty means the rule is inert.
    pub players: Vec<String>,
    pub offence: bool,
    pub defence: bool,
    pub allied: bool,
    pub enemy: bool,
    pub bonus: i32,
    pub bonus_type: BonusType,
    pub dice: SupportDice,
    /// How many units each giver can support.
    pub number: i32,
    /// Tech that doubles a giver's capacity when its owner has it.
    pub improved_by_tech: Option<String>,
}

impl SupportRule {
    /// Creates an offensive, allied, +1 strength rule with a count-1 bonus
    /// type named after the rule and no players or receivers yet.
    pub fn new(name: &str, giver_type: &str) -> Self {
        SupportRule {
            name: name.to_string(),
            giver_type: giver_type.to_string(),
            receiver_types: BTreeSet::new(),
            players: Vec::new(),
            offence: true,
            defence: false,
            allied: true,
            enemy: false,
            bonus: 1,
            bonus_type: BonusType::new(name, 1),
            dice: SupportDice::STRENGTH,
            number: 1,
            improved_by_tech: None,
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.offence = side == Side::Offense;
        self.defence = side == Side::Defense;
        self
    }

    pub fn with_both_sides(mut self) -> Self {
        self.offence = true;
        self.defence = true;
        self
    }

    /// Sets whether the rule supports allies (`true`) or hinders enemies (`false`).
    pub fn with_allied(mut self, allied: bool) -> Self {
        self.allied = allied;
        self.enemy = !allied;
        self
    }

    pub fn with_players(mut self, players: &[&str]) -> Self {
        self.players = players.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_receivers(mut self, receivers: &[&str]) -> Self {
        self.receiver_types = receivers.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn with_bonus_type(mut self, bonus_type: BonusType) -> Self {
        self.bonus_type = bonus_type;
        self
    }

    pub fn with_dice(mut self, dice: SupportDice) -> Self {
        self.dice = dice;
        self
    }

    pub fn with_number(mut self, number: i32) -> Self {
        self.number = number;
        self
    }

    pub fn with_improving_tech(mut self, tech: &str) -> Self {
        self.improved_by_tech = Some(tech.to_string());
        self
    }

    pub fn applies_to_side(&self, side: Side) -> bool {
        match side {
            Side::Offense => self.offence,
            Side::Defense => self.defence,
        }
    }

    /// Returns true if the rule matches givers that are allied (or enemies)
    /// of the receiving units.
    pub fn applies_to_faction(&self, allied: bool) -> bool {
        if allied {
            self.allied
        } else {
            self.enemy
        }
    }

    pub fn supports(&self, unit_type: &str) -> bool {
        self.receiver_types.contains(unit_type)
    }

    pub fn strength(&self) -> bool {
        self.dice.strength
    }

    pub fn roll(&self) -> bool {
        self.dice.roll
    }

    pub fn aa_strength(&self) -> bool {
        self.dice.aa_strength
    }

    pub fn aa_roll(&self) -> bool {
        self.dice.aa_roll
    }

    /// Rule used in main, air, and bombardment combat.
    pub fn is_main(&self) -> bool {
        self.dice.strength || self.dice.roll
    }

    /// Rule used in anti-aircraft fire.
    pub fn is_aa(&self) -> bool {
        self.dice.aa_strength || self.dice.aa_roll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonus_type_parse_forms() {
        assert_eq!(BonusType::parse("arty"), Some(BonusType::new("arty", 1)));
        assert_eq!(BonusType::parse("2:arty"), Some(BonusType::new("arty", 2)));
        assert_eq!(BonusType::parse(" 3 : arty "), Some(BonusType::new("arty", 3)));
        assert_eq!(BonusType::parse(""), None);
        assert_eq!(BonusType::parse("0:arty"), None);
        assert_eq!(BonusType::parse("x:arty"), None);
        assert_eq!(BonusType::parse("2:"), None);
    }

    #[test]
    fn bonus_type_display_matches_parse() {
        assert_eq!(BonusType::new("arty", 1).to_string(), "arty");
        assert_eq!(BonusType::new("arty", 2).to_string(), "2:arty");
    }

    #[test]
    fn same_name_different_count_is_a_different_group() {
        assert_ne!(BonusType::new("arty", 1), BonusType::new("arty", 2));
    }

    #[test]
    fn support_dice_parse() {
        let both = SupportDice::parse("strength:roll").unwrap();
        assert!(both.strength && both.roll && !both.aa_strength);
        assert_eq!(SupportDice::parse("AAroll"), Some(SupportDice::AA_ROLL));
        assert_eq!(SupportDice::parse("luck"), None);
    }

    #[test]
    fn side_and_faction_flags() {
        let rule = SupportRule::new("r", "artillery")
            .with_side(Side::Defense)
            .with_allied(false);
        assert!(rule.applies_to_side(Side::Defense));
        assert!(!rule.applies_to_side(Side::Offense));
        assert!(rule.applies_to_faction(false));
        assert!(!rule.applies_to_faction(true));
        assert_eq!(Side::Offense.opposite(), Side::Defense);
    }

    #[test]
    fn main_and_aa_rule_kinds() {
        let main = SupportRule::new("m", "artillery");
        let aa = SupportRule::new("a", "radar").with_dice(SupportDice::AA_STRENGTH);
        assert!(main.is_main() && !main.is_aa());
        assert!(aa.is_aa() && !aa.is_main());
    }
}
