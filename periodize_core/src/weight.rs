//! Unit-aware weight quantities and the training max.
//!
//! All arithmetic is done in `Decimal` so that snapping to 2.5 kg / 5 lb
//! increments is exact.

use crate::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pounds per kilogram
pub const LBS_PER_KG: Decimal = dec!(2.20462);

/// Highest intensity fraction accepted by [`TrainingMax::calculate_working_weight`]
pub const MAX_INTENSITY: Decimal = dec!(1.5);

/// Unit of a weight quantity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kilograms,
    Pounds,
}

impl WeightUnit {
    /// Plate increment used when rounding working weights
    pub fn default_increment(self) -> Decimal {
        match self {
            WeightUnit::Kilograms => dec!(2.5),
            WeightUnit::Pounds => dec!(5),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            WeightUnit::Kilograms => "kg",
            WeightUnit::Pounds => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for WeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "kg" | "kgs" | "kilograms" => Ok(WeightUnit::Kilograms),
            "lb" | "lbs" | "pounds" => Ok(WeightUnit::Pounds),
            other => Err(Error::validation(format!("unknown weight unit: {}", other))),
        }
    }
}

/// Snap `value` to the nearest multiple of `increment`, midpoints away from zero
fn snap(value: Decimal, increment: Decimal) -> Result<Decimal> {
    let steps = value
        .checked_div(increment)
        .ok_or_else(|| overflow("rounding", value))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    steps
        .checked_mul(increment)
        .map(|v| v.normalize())
        .ok_or_else(|| overflow("rounding", value))
}

fn overflow(op: &str, value: Decimal) -> Error {
    Error::validation(format!("{} {} is out of range", op, value))
}

#[derive(Deserialize)]
struct RawWeight {
    value: Decimal,
    unit: WeightUnit,
}

/// A non-negative weight in a given unit
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawWeight")]
pub struct Weight {
    value: Decimal,
    unit: WeightUnit,
}

impl TryFrom<RawWeight> for Weight {
    type Error = Error;

    fn try_from(raw: RawWeight) -> Result<Self> {
        Weight::new(raw.value, raw.unit)
    }
}

impl Weight {
    pub fn new(value: Decimal, unit: WeightUnit) -> Result<Self> {
        if value < Decimal::ZERO {
            return Err(Error::validation(format!(
                "weight cannot be negative: {}",
                value
            )));
        }
        Ok(Self {
            value: value.normalize(),
            unit,
        })
    }

    pub fn kilograms(value: Decimal) -> Result<Self> {
        Self::new(value, WeightUnit::Kilograms)
    }

    pub fn pounds(value: Decimal) -> Result<Self> {
        Self::new(value, WeightUnit::Pounds)
    }

    pub fn zero(unit: WeightUnit) -> Self {
        Self {
            value: Decimal::ZERO,
            unit,
        }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn unit(&self) -> WeightUnit {
        self.unit
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    fn require_same_unit(&self, other: &Weight) -> Result<()> {
        if self.unit != other.unit {
            return Err(Error::validation(format!(
                "unit mismatch: {} vs {}",
                self.unit, other.unit
            )));
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Weight) -> Result<Weight> {
        self.require_same_unit(other)?;
        let value = self
            .value
            .checked_add(other.value)
            .ok_or_else(|| overflow("weight", self.value))?;
        Weight::new(value, self.unit)
    }

    /// Subtract, rejecting a negative result
    pub fn checked_sub(&self, other: &Weight) -> Result<Weight> {
        self.require_same_unit(other)?;
        Weight::new(self.value - other.value, self.unit)
    }

    /// Subtract, flooring the result at zero
    pub fn saturating_sub(&self, other: &Weight) -> Result<Weight> {
        self.require_same_unit(other)?;
        let value = (self.value - other.value).max(Decimal::ZERO);
        Weight::new(value, self.unit)
    }

    /// Convert to another unit (rounded to 2 decimal places)
    pub fn convert_to(&self, unit: WeightUnit) -> Weight {
        let value = match (self.unit, unit) {
            (a, b) if a == b => self.value,
            (WeightUnit::Kilograms, WeightUnit::Pounds) => self.value * LBS_PER_KG,
            (WeightUnit::Pounds, WeightUnit::Kilograms) => self.value / LBS_PER_KG,
            _ => self.value,
        };
        Weight {
            value: value.round_dp(2).normalize(),
            unit,
        }
    }

    /// Snap to the nearest multiple of `increment` (midpoints round up)
    pub fn round_to_increment(&self, increment: Decimal) -> Result<Weight> {
        if increment <= Decimal::ZERO {
            return Err(Error::validation(format!(
                "rounding increment must be positive: {}",
                increment
            )));
        }
        Weight::new(snap(self.value, increment)?, self.unit)
    }

    pub fn is_multiple_of(&self, increment: Decimal) -> bool {
        !increment.is_zero() && (self.value % increment).is_zero()
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.unit)
    }
}

/// Manual or automatic change to a training max
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum TrainingMaxAdjustment {
    /// Percentage points, e.g. `2` for +2%
    Percent(Decimal),
    /// Signed amount in the training max's unit
    Absolute(Decimal),
}

#[derive(Deserialize)]
struct RawTrainingMax {
    value: Decimal,
    unit: WeightUnit,
}

/// Reference maximum that working weights are derived from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawTrainingMax")]
pub struct TrainingMax {
    value: Decimal,
    unit: WeightUnit,
}

impl TryFrom<RawTrainingMax> for TrainingMax {
    type Error = Error;

    fn try_from(raw: RawTrainingMax) -> Result<Self> {
        TrainingMax::new(raw.value, raw.unit)
    }
}

impl TrainingMax {
    pub fn new(value: Decimal, unit: WeightUnit) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(Error::validation(format!(
                "training max must be positive: {}",
                value
            )));
        }
        Ok(Self {
            value: value.normalize(),
            unit,
        })
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn unit(&self) -> WeightUnit {
        self.unit
    }

    pub fn as_weight(&self) -> Weight {
        Weight {
            value: self.value,
            unit: self.unit,
        }
    }

    /// Working weight for an intensity fraction in (0, 1.5]
    pub fn calculate_working_weight(&self, intensity: Decimal) -> Result<Weight> {
        if intensity <= Decimal::ZERO || intensity > MAX_INTENSITY {
            return Err(Error::validation(format!(
                "intensity must be in (0, {}]: {}",
                MAX_INTENSITY, intensity
            )));
        }
        let raw = self
            .value
            .checked_mul(intensity)
            .ok_or_else(|| overflow("working weight for training max", self.value))?;
        Weight::new(snap(raw, self.unit.default_increment())?, self.unit)
    }

    /// Apply an adjustment and re-round to the unit increment
    pub fn apply_adjustment(&self, adjustment: TrainingMaxAdjustment) -> Result<TrainingMax> {
        let raw = match adjustment {
            TrainingMaxAdjustment::Percent(pct) => (pct / Decimal::ONE_HUNDRED)
                .checked_add(Decimal::ONE)
                .and_then(|factor| self.value.checked_mul(factor)),
            TrainingMaxAdjustment::Absolute(delta) => self.value.checked_add(delta),
        }
        .ok_or_else(|| overflow("adjusted training max", self.value))?;
        let rounded = snap(raw, self.unit.default_increment())?;
        if rounded <= Decimal::ZERO {
            return Err(Error::validation(format!(
                "adjustment {:?} would leave training max at {}",
                adjustment, rounded
            )));
        }
        TrainingMax::new(rounded, self.unit)
    }
}

impl fmt::Display for TrainingMax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.unit)
    }
}
