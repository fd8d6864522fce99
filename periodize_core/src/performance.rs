//! One exercise's completed sets for a day, measured against the plan.

use crate::{CompletedSet, Error, PlannedSet, RepRange, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExercisePerformance {
    exercise_id: Uuid,
    planned_sets: Vec<PlannedSet>,
    completed_sets: Vec<CompletedSet>,
    completed_at: DateTime<Utc>,
}

impl ExercisePerformance {
    /// Build a performance record
    ///
    /// Requires at least one planned and one completed set, and never more
    /// completed sets than planned.
    pub fn new(
        exercise_id: Uuid,
        planned_sets: Vec<PlannedSet>,
        completed_sets: Vec<CompletedSet>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self> {
        if planned_sets.is_empty() {
            return Err(Error::validation("performance needs at least one planned set"));
        }
        if completed_sets.is_empty() {
            return Err(Error::rule(
                crate::Rule::EmptyPerformance,
                format!("exercise {}", exercise_id),
            ));
        }
        if completed_sets.len() > planned_sets.len() {
            return Err(Error::rule(
                crate::Rule::TooManyCompletedSets,
                format!(
                    "exercise {} ({} completed, {} planned)",
                    exercise_id,
                    completed_sets.len(),
                    planned_sets.len()
                ),
            ));
        }
        Ok(Self {
            exercise_id,
            planned_sets,
            completed_sets,
            completed_at,
        })
    }

    pub fn exercise_id(&self) -> Uuid {
        self.exercise_id
    }

    pub fn planned_sets(&self) -> &[PlannedSet] {
        &self.planned_sets
    }

    pub fn completed_sets(&self) -> &[CompletedSet] {
        &self.completed_sets
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn sets_used(&self) -> u32 {
        self.completed_sets.len() as u32
    }

    /// Sum of reps across completed sets, widened so large logs cannot overflow
    pub fn total_reps(&self) -> u64 {
        self.completed_sets
            .iter()
            .map(|s| u64::from(s.actual_reps()))
            .sum()
    }

    /// The planned AMRAP set paired with the completed set it was run as
    ///
    /// A completed set flagged `was_amrap` wins; otherwise the completed set
    /// with the planned AMRAP set's number is used.
    pub fn amrap_pair(&self) -> Option<(&PlannedSet, &CompletedSet)> {
        let planned = self.planned_sets.iter().find(|s| s.is_amrap())?;
        let completed = self
            .completed_sets
            .iter()
            .find(|s| s.was_amrap())
            .or_else(|| {
                self.completed_sets
                    .iter()
                    .find(|s| s.set_number() == planned.set_number())
            })?;
        Some((planned, completed))
    }

    /// Actual minus target reps on the AMRAP set, if one was matched
    pub fn amrap_delta(&self) -> Option<i64> {
        self.amrap_pair()
            .map(|(planned, completed)| completed.rep_delta(planned))
    }

    /// AMRAP delta, 0 when no AMRAP set was matched
    pub fn amrap_delta_or_zero(&self) -> i64 {
        self.amrap_delta().unwrap_or(0)
    }

    pub fn all_sets_meet_maximum(&self, range: &RepRange) -> bool {
        self.completed_sets
            .iter()
            .all(|s| range.meets_or_exceeds_maximum(s.actual_reps()))
    }

    pub fn any_set_below_minimum(&self, range: &RepRange) -> bool {
        self.completed_sets
            .iter()
            .any(|s| range.is_below_minimum(s.actual_reps()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rule, Weight};
    use rust_decimal_macros::dec;

    fn planned(n: u32, reps: u32, amrap: bool) -> PlannedSet {
        PlannedSet::new(n, Weight::kilograms(dec!(75)).unwrap(), reps, amrap).unwrap()
    }

    fn done(n: u32, reps: u32, amrap: bool) -> CompletedSet {
        CompletedSet::new(n, Weight::kilograms(dec!(75)).unwrap(), reps, amrap).unwrap()
    }

    fn plan() -> Vec<PlannedSet> {
        vec![
            planned(1, 10, false),
            planned(2, 10, false),
            planned(3, 10, true),
        ]
    }

    #[test]
    fn test_more_completed_than_planned_rejected() {
        let err = ExercisePerformance::new(
            Uuid::new_v4(),
            vec![planned(1, 10, false)],
            vec![done(1, 10, false), done(2, 10, false)],
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::TooManyCompletedSets));
    }

    #[test]
    fn test_empty_sets_rejected() {
        assert!(ExercisePerformance::new(Uuid::new_v4(), plan(), vec![], Utc::now()).is_err());
        assert!(
            ExercisePerformance::new(Uuid::new_v4(), vec![], vec![done(1, 5, false)], Utc::now())
                .is_err()
        );
    }

    #[test]
    fn test_amrap_delta_by_flag() {
        // User skipped set 2; the AMRAP set is recorded as set 2 but flagged
        let perf = ExercisePerformance::new(
            Uuid::new_v4(),
            plan(),
            vec![done(1, 10, false), done(2, 14, true)],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(perf.amrap_delta(), Some(4));
    }

    #[test]
    fn test_amrap_delta_by_set_number() {
        let perf = ExercisePerformance::new(
            Uuid::new_v4(),
            plan(),
            vec![done(1, 10, false), done(2, 10, false), done(3, 9, false)],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(perf.amrap_delta(), Some(-1));
    }

    #[test]
    fn test_no_amrap_match_is_zero() {
        let perf = ExercisePerformance::new(
            Uuid::new_v4(),
            plan(),
            vec![done(1, 10, false)],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(perf.amrap_delta(), None);
        assert_eq!(perf.amrap_delta_or_zero(), 0);
    }

    #[test]
    fn test_range_queries() {
        let range = RepRange::new(8, 10, 12).unwrap();
        let perf = ExercisePerformance::new(
            Uuid::new_v4(),
            plan(),
            vec![done(1, 12, false), done(2, 13, false), done(3, 7, false)],
            Utc::now(),
        )
        .unwrap();
        assert!(!perf.all_sets_meet_maximum(&range));
        assert!(perf.any_set_below_minimum(&range));
        assert_eq!(perf.total_reps(), 32);
        assert_eq!(perf.sets_used(), 3);
    }

    #[test]
    fn test_total_reps_does_not_overflow() {
        let perf = ExercisePerformance::new(
            Uuid::new_v4(),
            plan(),
            vec![done(1, u32::MAX, false), done(2, u32::MAX, false), done(3, 1, true)],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(perf.total_reps(), 2 * u64::from(u32::MAX) + 1);
        assert_eq!(perf.amrap_delta(), Some(-9));
    }
}
