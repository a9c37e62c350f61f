//! Dice-bounded strength and roll values.
//!
//! Both carry the dice sides they are measured against. Arithmetic is done
//! on the raw value and only clamped when read, so a large penalty can be
//! offset by later bonuses. `is_zero` tests the raw value, not the clamped
//! one; callers rely on the difference.

use serde::Serialize;

/// A unit's strength: the die face at or below which it hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StrengthValue {
    dice_sides: i32,
    value: i32,
}

impl StrengthValue {
    pub const fn of(dice_sides: i32, value: i32) -> Self {
        StrengthValue { dice_sides, value }
    }

    /// Returns a new value with `extra` added to the raw value.
    #[must_use]
    pub const fn add(self, extra: i32) -> Self {
        StrengthValue {
            dice_sides: self.dice_sides,
            value: self.value + extra,
        }
    }

    /// The strength clamped to `[0, dice_sides]`.
    pub fn value(self) -> i32 {
        self.value.max(0).min(self.dice_sides)
    }

    /// True only when the unclamped value is exactly zero.
    pub const fn is_zero(self) -> bool {
        self.value == 0
    }

    pub const fn raw(self) -> i32 {
        self.value
    }

    pub const fn dice_sides(self) -> i32 {
        self.dice_sides
    }
}

/// The number of dice a unit rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RollValue {
    dice_sides: i32,
    value: i32,
}

impl RollValue {
    pub const fn of(dice_sides: i32, value: i32) -> Self {
        RollValue { dice_sides, value }
    }

    #[must_use]
    pub const fn add(self, extra: i32) -> Self {
        RollValue {
            dice_sides: self.dice_sides,
            value: self.value + extra,
        }
    }

    /// The roll count clamped to `[0, dice_sides]`.
    pub fn value(self) -> i32 {
        self.value.max(0).min(self.dice_sides)
    }

    /// True only when the unclamped value is exactly zero.
    pub const fn is_zero(self) -> bool {
        self.value == 0
    }

    pub const fn raw(self) -> i32 {
        self.value
    }

    pub const fn dice_sides(self) -> i32 {
        self.dice_sides
    }
}
