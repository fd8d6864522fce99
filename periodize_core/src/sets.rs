//! Prescribed and as-performed sets.

use crate::{Error, Result, Weight};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct RawPlannedSet {
    set_number: u32,
    weight: Weight,
    target_reps: u32,
    #[serde(default)]
    is_amrap: bool,
}

/// One prescribed set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawPlannedSet")]
pub struct PlannedSet {
    set_number: u32,
    weight: Weight,
    target_reps: u32,
    is_amrap: bool,
}

impl TryFrom<RawPlannedSet> for PlannedSet {
    type Error = Error;

    fn try_from(raw: RawPlannedSet) -> Result<Self> {
        PlannedSet::new(raw.set_number, raw.weight, raw.target_reps, raw.is_amrap)
    }
}

impl PlannedSet {
    pub fn new(set_number: u32, weight: Weight, target_reps: u32, is_amrap: bool) -> Result<Self> {
        if set_number == 0 {
            return Err(Error::validation("planned set number must be positive"));
        }
        if target_reps == 0 {
            return Err(Error::validation("planned target reps must be positive"));
        }
        Ok(Self {
            set_number,
            weight,
            target_reps,
            is_amrap,
        })
    }

    pub fn set_number(&self) -> u32 {
        self.set_number
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn target_reps(&self) -> u32 {
        self.target_reps
    }

    pub fn is_amrap(&self) -> bool {
        self.is_amrap
    }
}

#[derive(Deserialize)]
struct RawCompletedSet {
    set_number: u32,
    weight: Weight,
    actual_reps: u32,
    #[serde(default)]
    was_amrap: bool,
}

/// One set as it was actually performed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawCompletedSet")]
pub struct CompletedSet {
    set_number: u32,
    weight: Weight,
    actual_reps: u32,
    was_amrap: bool,
}

impl TryFrom<RawCompletedSet> for CompletedSet {
    type Error = Error;

    fn try_from(raw: RawCompletedSet) -> Result<Self> {
        CompletedSet::new(raw.set_number, raw.weight, raw.actual_reps, raw.was_amrap)
    }
}

impl CompletedSet {
    pub fn new(set_number: u32, weight: Weight, actual_reps: u32, was_amrap: bool) -> Result<Self> {
        if set_number == 0 {
            return Err(Error::validation("completed set number must be positive"));
        }
        Ok(Self {
            set_number,
            weight,
            actual_reps,
            was_amrap,
        })
    }

    pub fn set_number(&self) -> u32 {
        self.set_number
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn actual_reps(&self) -> u32 {
        self.actual_reps
    }

    pub fn was_amrap(&self) -> bool {
        self.was_amrap
    }

    /// Actual minus target reps against a planned set
    pub fn rep_delta(&self, planned: &PlannedSet) -> i64 {
        i64::from(self.actual_reps) - i64::from(planned.target_reps)
    }
}
