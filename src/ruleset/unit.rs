//! Units and their type attributes.
//!
//! A `Unit` is a lightweight handle (identity, type name, owner) and a
//! `UnitType` carries the combat attributes shared by every unit of that
//! type. The power engine only ever reads these.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::game::Player;

/// Opaque identity of a unit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit taking part in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: String,
    pub owner: String,
    #[serde(default)]
    pub hits: u32,
    /// Set when the unit landed from a transport this turn.
    #[serde(default)]
    pub was_amphibious: bool,
}

impl Unit {
    /// Creates an undamaged, non-amphibious unit.
    pub fn new(id: u32, unit_type: &str, owner: &str) -> Self {
        Unit {
            id: UnitId(id),
            unit_type: unit_type.to_string(),
            owner: owner.to_string(),
            hits: 0,
            was_amphibious: false,
        }
    }

    /// Returns the same unit flagged as having landed amphibiously.
    pub fn amphibious(mut self) -> Self {
        self.was_amphibious = true;
        self
    }
}

/// A per-tech modifier to a unit type's base values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechBonus {
    pub tech: String,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub attack_rolls: i32,
    #[serde(default)]
    pub defense_rolls: i32,
}

/// Combat attributes of a unit type.
///
/// Die-side and AA-attack fields use -1 as "not set": die sides fall back
/// to the game's dice, and `max_aa_attacks == -1` means infinite attacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    pub name: String,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default = "one")]
    pub attack_rolls: i32,
    #[serde(default = "one")]
    pub defense_rolls: i32,
    #[serde(default)]
    pub offensive_attack_aa: i32,
    #[serde(default)]
    pub attack_aa: i32,
    #[serde(default = "unset")]
    pub offensive_attack_aa_max_die_sides: i32,
    #[serde(default = "unset")]
    pub attack_aa_max_die_sides: i32,
    #[serde(default = "unset")]
    pub max_aa_attacks: i32,
    #[serde(default)]
    pub may_over_stack_aa: bool,
    #[serde(default)]
    pub air_attack: i32,
    #[serde(default)]
    pub air_defense: i32,
    /// Bombardment strength; 0 means the unit bombards at its attack.
    #[serde(default)]
    pub bombard: i32,
    /// Marine bonus granted when attacking amphibiously.
    #[serde(default)]
    pub is_marine: i32,
    #[serde(default)]
    pub choose_best_roll: bool,
    #[serde(default)]
    pub tech_bonuses: Vec<TechBonus>,
}

fn one() -> i32 {
    1
}

fn unset() -> i32 {
    -1
}

impl UnitType {
    /// Creates a unit type with only a name; every value at its default.
    pub fn named(name: &str) -> Self {
        UnitType {
            name: name.to_string(),
            attack: 0,
            defense: 0,
            attack_rolls: 1,
            defense_rolls: 1,
            offensive_attack_aa: 0,
            attack_aa: 0,
            offensive_attack_aa_max_die_sides: -1,
            attack_aa_max_die_sides: -1,
            max_aa_attacks: -1,
            may_over_stack_aa: false,
            air_attack: 0,
            air_defense: 0,
            bombard: 0,
            is_marine: 0,
            choose_best_roll: false,
            tech_bonuses: Vec::new(),
        }
    }

    fn tech_sum(&self, owner: Option<&Player>, pick: impl Fn(&TechBonus) -> i32) -> i32 {
        let Some(owner) = owner else {
            return 0;
        };
        self.tech_bonuses
            .iter()
            .filter(|b| owner.has_tech(&b.tech))
            .map(pick)
            .sum()
    }

    /// Attack value for the given owner, including tech bonuses.
    pub fn attack(&self, owner: Option<&Player>) -> i32 {
        self.attack + self.tech_sum(owner, |b| b.attack)
    }

    /// Defense value for the given owner, including tech bonuses.
    pub fn defense(&self, owner: Option<&Player>) -> i32 {
        self.defense + self.tech_sum(owner, |b| b.defense)
    }

    pub fn attack_rolls(&self, owner: Option<&Player>) -> i32 {
        self.attack_rolls + self.tech_sum(owner, |b| b.attack_rolls)
    }

    pub fn defense_rolls(&self, owner: Option<&Player>) -> i32 {
        self.defense_rolls + self.tech_sum(owner, |b| b.defense_rolls)
    }

    /// Bombardment strength, falling back to attack when no explicit value is set.
    pub fn bombard(&self, owner: Option<&Player>) -> i32 {
        if self.bombard > 0 {
            self.bombard
        } else {
            self.attack(owner)
        }
    }

    /// Returns true if this type's AA attacks are unlimited.
    pub fn is_infinite_aa(&self) -> bool {
        self.max_aa_attacks == -1
    }
}
