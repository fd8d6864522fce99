//! Progression strategies.
//!
//! Each exercise carries exactly one of three rule sets:
//! - Linear: percentage of a training max, adjusted by the AMRAP top set
//! - RepsPerSet: fixed weight, add sets until the target, then add weight
//! - MinimalSets: hit a total rep target in as few sets as possible
//!
//! `plan` is pure. `apply` is the only path that changes progression state
//! after a completed day.

use crate::periodization::week_parameters;
use crate::{
    Equipment, Error, ExercisePerformance, PlannedSet, RepRange, Result, TrainingMax,
    TrainingMaxAdjustment, Weight,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Training max adjustment, in percentage points, for an AMRAP delta
pub fn amrap_adjustment_percent(delta: i64) -> Decimal {
    match delta {
        d if d >= 5 => dec!(3),
        4 => dec!(2),
        3 => dec!(1.5),
        2 => dec!(1),
        1 => dec!(0.5),
        0 => Decimal::ZERO,
        -1 => dec!(-2),
        _ => dec!(-5),
    }
}

/// What a progression update changed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressionChange {
    Unchanged,
    TrainingMax {
        from: TrainingMax,
        to: TrainingMax,
    },
    Sets {
        from: u32,
        to: u32,
    },
    Weight {
        from: Weight,
        to: Weight,
        sets_from: u32,
        sets_to: u32,
    },
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionKind {
    Linear,
    RepsPerSet,
    MinimalSets,
}

impl fmt::Display for ProgressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressionKind::Linear => write!(f, "linear"),
            ProgressionKind::RepsPerSet => write!(f, "reps_per_set"),
            ProgressionKind::MinimalSets => write!(f, "minimal_sets"),
        }
    }
}

// ============================================================================
// Linear
// ============================================================================

#[derive(Deserialize)]
struct RawLinearProgression {
    training_max: TrainingMax,
    use_amrap: bool,
    base_sets_per_exercise: u32,
    #[serde(default)]
    normal_rep_offset: u32,
}

/// Percentage-of-training-max progression driven by the AMRAP set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawLinearProgression")]
pub struct LinearProgression {
    training_max: TrainingMax,
    use_amrap: bool,
    base_sets_per_exercise: u32,
    /// Normal sets target this many reps fewer than the AMRAP set
    #[serde(default)]
    normal_rep_offset: u32,
}

impl TryFrom<RawLinearProgression> for LinearProgression {
    type Error = Error;

    fn try_from(raw: RawLinearProgression) -> Result<Self> {
        Ok(LinearProgression::new(raw.training_max, raw.use_amrap, raw.base_sets_per_exercise)?
            .with_normal_rep_offset(raw.normal_rep_offset))
    }
}

impl LinearProgression {
    pub fn new(training_max: TrainingMax, use_amrap: bool, base_sets_per_exercise: u32) -> Result<Self> {
        if base_sets_per_exercise == 0 {
            return Err(Error::validation("base sets per exercise must be positive"));
        }
        Ok(Self {
            training_max,
            use_amrap,
            base_sets_per_exercise,
            normal_rep_offset: 0,
        })
    }

    pub fn with_normal_rep_offset(mut self, offset: u32) -> Self {
        self.normal_rep_offset = offset;
        self
    }

    pub fn training_max(&self) -> TrainingMax {
        self.training_max
    }

    pub fn use_amrap(&self) -> bool {
        self.use_amrap
    }

    pub fn base_sets_per_exercise(&self) -> u32 {
        self.base_sets_per_exercise
    }

    pub fn normal_rep_offset(&self) -> u32 {
        self.normal_rep_offset
    }

    pub fn plan(&self, week: u32) -> Result<Vec<PlannedSet>> {
        let params = week_parameters(week);
        let weight = self.training_max.calculate_working_weight(params.intensity)?;
        let sets = if params.sets == 0 {
            self.base_sets_per_exercise
        } else {
            params.sets
        };
        let amrap_last = self.use_amrap && !params.is_deload;
        let normal_reps = params
            .target_reps
            .saturating_sub(self.normal_rep_offset)
            .max(1);

        (1..=sets)
            .map(|n| {
                let is_amrap = amrap_last && n == sets;
                let reps = if is_amrap { params.target_reps } else { normal_reps };
                PlannedSet::new(n, weight, reps, is_amrap)
            })
            .collect()
    }

    pub fn apply(&mut self, performance: &ExercisePerformance) -> Result<ProgressionChange> {
        if !self.use_amrap {
            return Ok(ProgressionChange::Unchanged);
        }
        let Some(delta) = performance.amrap_delta() else {
            tracing::debug!("No AMRAP set matched, training max unchanged");
            return Ok(ProgressionChange::Unchanged);
        };

        let pct = amrap_adjustment_percent(delta);
        if pct.is_zero() {
            return Ok(ProgressionChange::Unchanged);
        }

        let from = self.training_max;
        let to = from.apply_adjustment(TrainingMaxAdjustment::Percent(pct))?;
        if to == from {
            tracing::debug!("AMRAP delta {} -> {}% rounds back to {}", delta, pct, from);
            return Ok(ProgressionChange::Unchanged);
        }
        self.training_max = to;
        tracing::debug!(
            "Linear progression: AMRAP delta {} -> {}%, training max {} -> {}",
            delta,
            pct,
            from,
            to
        );
        Ok(ProgressionChange::TrainingMax { from, to })
    }

    pub fn adjust_training_max(&mut self, adjustment: TrainingMaxAdjustment) -> Result<ProgressionChange> {
        let from = self.training_max;
        let to = from.apply_adjustment(adjustment)?;
        if to == from {
            return Ok(ProgressionChange::Unchanged);
        }
        self.training_max = to;
        Ok(ProgressionChange::TrainingMax { from, to })
    }
}

// ============================================================================
// RepsPerSet
// ============================================================================

#[derive(Deserialize)]
struct RawRepsPerSetProgression {
    current_weight: Weight,
    rep_range: RepRange,
    current_set_count: u32,
    starting_sets: u32,
    target_sets: u32,
    max_sets: u32,
}

/// Fixed-weight progression: earn sets, then earn weight
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawRepsPerSetProgression")]
pub struct RepsPerSetProgression {
    current_weight: Weight,
    rep_range: RepRange,
    current_set_count: u32,
    starting_sets: u32,
    target_sets: u32,
    max_sets: u32,
}

impl TryFrom<RawRepsPerSetProgression> for RepsPerSetProgression {
    type Error = Error;

    fn try_from(raw: RawRepsPerSetProgression) -> Result<Self> {
        RepsPerSetProgression::new(
            raw.current_weight,
            raw.rep_range,
            raw.starting_sets,
            raw.target_sets,
            raw.max_sets,
        )?
        .with_current_set_count(raw.current_set_count)
    }
}

impl RepsPerSetProgression {
    /// Starts at `starting_sets`
    pub fn new(
        current_weight: Weight,
        rep_range: RepRange,
        starting_sets: u32,
        target_sets: u32,
        max_sets: u32,
    ) -> Result<Self> {
        if starting_sets == 0 || max_sets == 0 {
            return Err(Error::validation("set counts must be positive"));
        }
        if starting_sets > target_sets {
            return Err(Error::validation(format!(
                "starting sets {} exceed target sets {}",
                starting_sets, target_sets
            )));
        }
        if starting_sets > max_sets {
            return Err(Error::validation(format!(
                "starting sets {} exceed max sets {}",
                starting_sets, max_sets
            )));
        }
        Ok(Self {
            current_weight,
            rep_range,
            current_set_count: starting_sets,
            starting_sets,
            target_sets,
            max_sets,
        })
    }

    /// Resume from a set count other than the starting one
    pub fn with_current_set_count(mut self, count: u32) -> Result<Self> {
        if count == 0 || count > self.max_sets {
            return Err(Error::validation(format!(
                "set count {} outside 1..={}",
                count, self.max_sets
            )));
        }
        self.current_set_count = count;
        Ok(self)
    }

    pub fn current_weight(&self) -> Weight {
        self.current_weight
    }

    pub fn rep_range(&self) -> RepRange {
        self.rep_range
    }

    pub fn current_set_count(&self) -> u32 {
        self.current_set_count
    }

    pub fn starting_sets(&self) -> u32 {
        self.starting_sets
    }

    pub fn target_sets(&self) -> u32 {
        self.target_sets
    }

    pub fn max_sets(&self) -> u32 {
        self.max_sets
    }

    pub fn plan(&self) -> Result<Vec<PlannedSet>> {
        (1..=self.current_set_count)
            .map(|n| PlannedSet::new(n, self.current_weight, self.rep_range.target(), false))
            .collect()
    }

    pub fn apply(
        &mut self,
        performance: &ExercisePerformance,
        equipment: Equipment,
    ) -> Result<ProgressionChange> {
        let increment = equipment.increment_weight(self.current_weight.unit())?;
        let sets_from = self.current_set_count;
        let weight_from = self.current_weight;

        if performance.all_sets_meet_maximum(&self.rep_range) {
            let ceiling = self.target_sets.min(self.max_sets);
            if self.current_set_count < ceiling {
                self.current_set_count += 1;
                tracing::debug!(
                    "RepsPerSet progression: all sets at max, sets {} -> {}",
                    sets_from,
                    self.current_set_count
                );
                return Ok(ProgressionChange::Sets {
                    from: sets_from,
                    to: self.current_set_count,
                });
            }
            self.current_set_count = self.starting_sets;
            self.current_weight = self.current_weight.checked_add(&increment)?;
        } else if performance.any_set_below_minimum(&self.rep_range) {
            if self.current_set_count > 1 {
                self.current_set_count -= 1;
                tracing::debug!(
                    "RepsPerSet progression: set below minimum, sets {} -> {}",
                    sets_from,
                    self.current_set_count
                );
                return Ok(ProgressionChange::Sets {
                    from: sets_from,
                    to: self.current_set_count,
                });
            }
            self.current_weight = self.current_weight.saturating_sub(&increment)?;
        } else {
            return Ok(ProgressionChange::Unchanged);
        }

        tracing::debug!(
            "RepsPerSet progression: weight {} -> {}, sets {} -> {}",
            weight_from,
            self.current_weight,
            sets_from,
            self.current_set_count
        );
        Ok(ProgressionChange::Weight {
            from: weight_from,
            to: self.current_weight,
            sets_from,
            sets_to: self.current_set_count,
        })
    }
}

// ============================================================================
// MinimalSets
// ============================================================================

#[derive(Deserialize)]
struct RawMinimalSetsProgression {
    current_weight: Weight,
    target_total_reps: u32,
    current_set_count: u32,
    minimum_sets: u32,
    maximum_sets: u32,
}

/// Total-rep target spread over as few sets as possible
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawMinimalSetsProgression")]
pub struct MinimalSetsProgression {
    current_weight: Weight,
    target_total_reps: u32,
    current_set_count: u32,
    minimum_sets: u32,
    maximum_sets: u32,
}

impl TryFrom<RawMinimalSetsProgression> for MinimalSetsProgression {
    type Error = Error;

    fn try_from(raw: RawMinimalSetsProgression) -> Result<Self> {
        MinimalSetsProgression::new(
            raw.current_weight,
            raw.target_total_reps,
            raw.minimum_sets,
            raw.minimum_sets,
            raw.maximum_sets,
        )?
        .with_current_set_count(raw.current_set_count)
    }
}

impl MinimalSetsProgression {
    pub fn new(
        current_weight: Weight,
        target_total_reps: u32,
        starting_sets: u32,
        minimum_sets: u32,
        maximum_sets: u32,
    ) -> Result<Self> {
        if target_total_reps == 0 {
            return Err(Error::validation("target total reps must be positive"));
        }
        if minimum_sets == 0 || minimum_sets > maximum_sets {
            return Err(Error::validation(format!(
                "set bounds must satisfy 1 <= minimum <= maximum, got {}..={}",
                minimum_sets, maximum_sets
            )));
        }
        if !(minimum_sets..=maximum_sets).contains(&starting_sets) {
            return Err(Error::validation(format!(
                "starting sets {} outside {}..={}",
                starting_sets, minimum_sets, maximum_sets
            )));
        }
        Ok(Self {
            current_weight,
            target_total_reps,
            current_set_count: starting_sets,
            minimum_sets,
            maximum_sets,
        })
    }

    /// Resume from a set count other than the starting one
    pub fn with_current_set_count(mut self, count: u32) -> Result<Self> {
        if !(self.minimum_sets..=self.maximum_sets).contains(&count) {
            return Err(Error::validation(format!(
                "set count {} outside {}..={}",
                count, self.minimum_sets, self.maximum_sets
            )));
        }
        self.current_set_count = count;
        Ok(self)
    }

    pub fn current_weight(&self) -> Weight {
        self.current_weight
    }

    pub fn target_total_reps(&self) -> u32 {
        self.target_total_reps
    }

    pub fn current_set_count(&self) -> u32 {
        self.current_set_count
    }

    pub fn minimum_sets(&self) -> u32 {
        self.minimum_sets
    }

    pub fn maximum_sets(&self) -> u32 {
        self.maximum_sets
    }

    /// Reps per set when the total is split evenly (rounded up)
    pub fn reps_per_set(&self) -> u32 {
        self.target_total_reps.div_ceil(self.current_set_count)
    }

    pub fn plan(&self) -> Result<Vec<PlannedSet>> {
        let reps = self.reps_per_set();
        (1..=self.current_set_count)
            .map(|n| PlannedSet::new(n, self.current_weight, reps, false))
            .collect()
    }

    pub fn apply(&mut self, performance: &ExercisePerformance) -> Result<ProgressionChange> {
        let from = self.current_set_count;
        let total = performance.total_reps();
        let used = performance.sets_used();

        let next = if total < u64::from(self.target_total_reps) {
            from + 1
        } else if used < from {
            used
        } else {
            from
        };
        self.current_set_count = next.clamp(self.minimum_sets, self.maximum_sets);

        if self.current_set_count == from {
            return Ok(ProgressionChange::Unchanged);
        }
        tracing::debug!(
            "MinimalSets progression: {} reps in {} sets (target {}), sets {} -> {}",
            total,
            used,
            self.target_total_reps,
            from,
            self.current_set_count
        );
        Ok(ProgressionChange::Sets {
            from,
            to: self.current_set_count,
        })
    }
}

// ============================================================================
// Closed set of strategies
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Progression {
    Linear(LinearProgression),
    RepsPerSet(RepsPerSetProgression),
    MinimalSets(MinimalSetsProgression),
}

impl Progression {
    pub fn kind(&self) -> ProgressionKind {
        match self {
            Progression::Linear(_) => ProgressionKind::Linear,
            Progression::RepsPerSet(_) => ProgressionKind::RepsPerSet,
            Progression::MinimalSets(_) => ProgressionKind::MinimalSets,
        }
    }

    /// Planned sets for a program week
    pub fn plan(&self, week: u32) -> Result<Vec<PlannedSet>> {
        match self {
            Progression::Linear(p) => p.plan(week),
            Progression::RepsPerSet(p) => p.plan(),
            Progression::MinimalSets(p) => p.plan(),
        }
    }

    /// Update progression state from a completed performance
    pub fn apply(
        &mut self,
        performance: &ExercisePerformance,
        equipment: Equipment,
    ) -> Result<ProgressionChange> {
        match self {
            Progression::Linear(p) => p.apply(performance),
            Progression::RepsPerSet(p) => p.apply(performance, equipment),
            Progression::MinimalSets(p) => p.apply(performance),
        }
    }

    pub fn training_max(&self) -> Option<TrainingMax> {
        match self {
            Progression::Linear(p) => Some(p.training_max()),
            _ => None,
        }
    }

    pub fn current_weight(&self) -> Option<Weight> {
        match self {
            Progression::Linear(_) => None,
            Progression::RepsPerSet(p) => Some(p.current_weight()),
            Progression::MinimalSets(p) => Some(p.current_weight()),
        }
    }

    pub fn set_count(&self) -> Option<u32> {
        match self {
            Progression::Linear(_) => None,
            Progression::RepsPerSet(p) => Some(p.current_set_count()),
            Progression::MinimalSets(p) => Some(p.current_set_count()),
        }
    }

    /// Manual training max override (Linear only)
    pub fn adjust_training_max(&mut self, adjustment: TrainingMaxAdjustment) -> Option<Result<ProgressionChange>> {
        match self {
            Progression::Linear(p) => Some(p.adjust_training_max(adjustment)),
            _ => None,
        }
    }

    /// Manual weight override (RepsPerSet / MinimalSets only)
    pub fn set_weight(&mut self, weight: Weight) -> Option<ProgressionChange> {
        let (slot, sets) = match self {
            Progression::Linear(_) => return None,
            Progression::RepsPerSet(p) => (&mut p.current_weight, p.current_set_count),
            Progression::MinimalSets(p) => (&mut p.current_weight, p.current_set_count),
        };
        let from = *slot;
        *slot = weight;
        Some(ProgressionChange::Weight {
            from,
            to: weight,
            sets_from: sets,
            sets_to: sets,
        })
    }
}
