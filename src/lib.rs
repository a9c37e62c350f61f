//! Combat power engine library.
//!
//! Exposes the ruleset data model and loader, and the power engine that
//! turns units and support rules into per-unit strength, rolls, and power.

pub mod power;
pub mod ruleset;
