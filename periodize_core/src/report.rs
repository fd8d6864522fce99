//! Read-only views of a workout for display layers.

use crate::periodization::week_parameters;
use crate::{
    Exercise, ExerciseCategory, Equipment, ProgressionKind, TrainingMax, Weight, Workout,
    WorkoutStatus,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Current progression numbers for one exercise
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ExerciseSnapshot {
    pub id: Uuid,
    pub name: String,
    pub external_id: Option<String>,
    pub category: ExerciseCategory,
    pub equipment: Equipment,
    pub day: u32,
    pub order_in_day: u32,
    pub progression: ProgressionKind,
    pub training_max: Option<TrainingMax>,
    pub current_weight: Option<Weight>,
    pub set_count: Option<u32>,
}

impl From<&Exercise> for ExerciseSnapshot {
    fn from(exercise: &Exercise) -> Self {
        let progression = exercise.progression();
        ExerciseSnapshot {
            id: exercise.id(),
            name: exercise.name().to_string(),
            external_id: exercise.external_id().map(str::to_string),
            category: exercise.category(),
            equipment: exercise.equipment(),
            day: exercise.assigned_day(),
            order_in_day: exercise.order_in_day(),
            progression: progression.kind(),
            training_max: progression.training_max(),
            current_weight: progression.current_weight(),
            set_count: progression.set_count(),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WorkoutSummary {
    pub id: Uuid,
    pub name: String,
    pub status: WorkoutStatus,
    pub variant_days: u32,
    pub total_weeks: u32,
    pub current_week: u32,
    pub current_block: u32,
    pub current_day: u32,
    pub is_deload_week: bool,
    pub week_intensity: Decimal,
    pub days_completed_this_week: Vec<u32>,
    pub activities_logged: usize,
    pub exercises: Vec<ExerciseSnapshot>,
}

impl Workout {
    pub fn summary(&self) -> WorkoutSummary {
        let mut exercises: Vec<ExerciseSnapshot> =
            self.exercises().iter().map(ExerciseSnapshot::from).collect();
        exercises.sort_by_key(|e| (e.day, e.order_in_day));

        WorkoutSummary {
            id: self.id(),
            name: self.name().to_string(),
            status: self.status(),
            variant_days: self.variant().days_per_week(),
            total_weeks: self.total_weeks(),
            current_week: self.current_week(),
            current_block: self.current_block(),
            current_day: self.current_day(),
            is_deload_week: self.is_deload_week(),
            week_intensity: week_parameters(self.current_week()).intensity,
            days_completed_this_week: self.completed_days(self.current_week()).into_iter().collect(),
            activities_logged: self.activities().len(),
            exercises,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinearProgression, Progression, ProgramVariant, RepRange, RepsPerSetProgression, WeightUnit};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summary_reports_progression_numbers() {
        let mut w = Workout::new("u", "Summary", ProgramVariant::FiveDay, 21, Utc::now()).unwrap();
        w.add_exercise(
            Exercise::new(
                "Curl",
                ExerciseCategory::Isolation,
                Equipment::Cable,
                2,
                1,
                Progression::RepsPerSet(
                    RepsPerSetProgression::new(
                        Weight::kilograms(dec!(20)).unwrap(),
                        RepRange::new(10, 12, 15).unwrap(),
                        2,
                        4,
                        5,
                    )
                    .unwrap(),
                ),
            )
            .unwrap(),
        )
        .unwrap();
        w.add_exercise(
            Exercise::new(
                "Bench",
                ExerciseCategory::Compound,
                Equipment::Barbell,
                1,
                1,
                Progression::Linear(
                    LinearProgression::new(
                        TrainingMax::new(dec!(90), WeightUnit::Kilograms).unwrap(),
                        true,
                        4,
                    )
                    .unwrap(),
                ),
            )
            .unwrap(),
        )
        .unwrap();

        let summary = w.summary();
        assert_eq!(summary.variant_days, 5);
        assert_eq!(summary.week_intensity, dec!(0.75));
        assert_eq!(summary.exercises[0].name, "Bench");
        assert_eq!(summary.exercises[0].training_max.unwrap().value(), dec!(90));
        assert_eq!(summary.exercises[1].set_count, Some(2));
        assert_eq!(summary.exercises[1].current_weight.unwrap().value(), dec!(20));
        assert!(summary.exercises[1].training_max.is_none());
    }
}
