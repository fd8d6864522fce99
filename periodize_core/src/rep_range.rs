//! Ordered (minimum, target, maximum) rep prescription.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Widest allowed spread between minimum and maximum
pub const MAX_RANGE_SPREAD: u32 = 10;

#[derive(Deserialize)]
struct RawRepRange {
    minimum: u32,
    target: u32,
    maximum: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawRepRange")]
pub struct RepRange {
    minimum: u32,
    target: u32,
    maximum: u32,
}

impl TryFrom<RawRepRange> for RepRange {
    type Error = Error;

    fn try_from(raw: RawRepRange) -> Result<Self> {
        RepRange::new(raw.minimum, raw.target, raw.maximum)
    }
}

impl RepRange {
    pub fn new(minimum: u32, target: u32, maximum: u32) -> Result<Self> {
        if minimum == 0 {
            return Err(Error::validation("rep range minimum must be positive"));
        }
        if !(minimum <= target && target <= maximum) {
            return Err(Error::validation(format!(
                "rep range must satisfy minimum <= target <= maximum, got {}/{}/{}",
                minimum, target, maximum
            )));
        }
        if maximum - minimum > MAX_RANGE_SPREAD {
            return Err(Error::validation(format!(
                "rep range spread {} exceeds {}",
                maximum - minimum,
                MAX_RANGE_SPREAD
            )));
        }
        Ok(Self {
            minimum,
            target,
            maximum,
        })
    }

    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    pub fn is_below_minimum(&self, reps: u32) -> bool {
        reps < self.minimum
    }

    pub fn meets_or_exceeds_maximum(&self, reps: u32) -> bool {
        reps >= self.maximum
    }

    pub fn contains(&self, reps: u32) -> bool {
        (self.minimum..=self.maximum).contains(&reps)
    }
}

impl fmt::Display for RepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} (target {})", self.minimum, self.maximum, self.target)
    }
}
