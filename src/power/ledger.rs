//! Record of which unit supported which.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ruleset::UnitId;

/// Accumulated support: giver to receiver to total bonus amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportLedger {
    given: BTreeMap<UnitId, BTreeMap<UnitId, i32>>,
}

impl SupportLedger {
    pub fn new() -> Self {
        SupportLedger::default()
    }

    pub fn record(&mut self, giver: UnitId, receiver: UnitId, amount: i32) {
        *self
            .given
            .entry(giver)
            .or_default()
            .entry(receiver)
            .or_insert(0) += amount;
    }

    /// Adds every entry of `other` into this ledger.
    pub fn merge(&mut self, other: &SupportLedger) {
        for (giver, receivers) in &other.given {
            for (receiver, amount) in receivers {
                self.record(*giver, *receiver, *amount);
            }
        }
    }

    /// Receivers and amounts supported by one giver.
    pub fn given_by(&self, giver: UnitId) -> Option<&BTreeMap<UnitId, i32>> {
        self.given.get(&giver)
    }

    /// Total amount a receiver got from all givers.
    pub fn received_by(&self, receiver: UnitId) -> i32 {
        self.given
            .values()
            .filter_map(|r| r.get(&receiver))
            .sum()
    }

    /// Sum of every recorded amount.
    pub fn total(&self) -> i32 {
        self.given.values().flat_map(|r| r.values()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.given.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &BTreeMap<UnitId, i32>)> {
        self.given.iter().map(|(g, r)| (*g, r))
    }
}
