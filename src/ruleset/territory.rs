//! Terrain-driven combat modifiers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::support::Side;

/// A territory effect such as "forest" or "mountain".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryEffect {
    pub name: String,
    /// Unit type to attack modifier.
    #[serde(default)]
    pub combat_offense: BTreeMap<String, i32>,
    /// Unit type to defense modifier.
    #[serde(default)]
    pub combat_defense: BTreeMap<String, i32>,
}

impl TerritoryEffect {
    pub fn new(name: &str) -> Self {
        TerritoryEffect {
            name: name.to_string(),
            ..TerritoryEffect::default()
        }
    }

    pub fn with_offense(mut self, unit_type: &str, bonus: i32) -> Self {
        self.combat_offense.insert(unit_type.to_string(), bonus);
        self
    }

    pub fn with_defense(mut self, unit_type: &str, bonus: i32) -> Self {
        self.combat_defense.insert(unit_type.to_string(), bonus);
        self
    }

    /// The modifier this effect applies to a unit type on the given side.
    pub fn bonus(&self, unit_type: &str, side: Side) -> i32 {
        let table = match side {
            Side::Offense => &self.combat_offense,
            Side::Defense => &self.combat_defense,
        };
        table.get(unit_type).copied().unwrap_or(0)
    }
}

/// Sums the modifiers of every effect for a unit type; absent entries count as zero.
pub fn territory_effect_bonus(effects: &[TerritoryEffect], unit_type: &str, side: Side) -> i32 {
    effects.iter().map(|e| e.bonus(unit_type, side)).sum()
}
