//! Workout aggregate and program state machine.
//!
//! Lifecycle:
//! - `NotStarted` → `start()` → `Active`
//! - `Active` ⇄ `Paused` via `pause()` / `deactivate()` / `set_as_active()`
//! - `Active` → `Completed` when the final week's last day is logged
//!
//! `complete_day` is all-or-nothing: progression changes are computed on a
//! copy of the exercise list and swapped in together with the new activity.

use crate::periodization::{block_for_week, is_deload_week, PROGRAM_WEEKS};
use crate::{
    CompletedSet, Error, Exercise, ExercisePerformance, PlannedSet, ProgressionChange, Result,
    Rule, TrainingMaxAdjustment, Weight,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Training days per week
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProgramVariant {
    FourDay,
    FiveDay,
    SixDay,
}

impl ProgramVariant {
    pub fn days_per_week(self) -> u32 {
        match self {
            ProgramVariant::FourDay => 4,
            ProgramVariant::FiveDay => 5,
            ProgramVariant::SixDay => 6,
        }
    }

    pub fn from_days(days: u32) -> Result<Self> {
        match days {
            4 => Ok(ProgramVariant::FourDay),
            5 => Ok(ProgramVariant::FiveDay),
            6 => Ok(ProgramVariant::SixDay),
            other => Err(Error::validation(format!(
                "program variant must be 4, 5 or 6 days, got {}",
                other
            ))),
        }
    }
}

impl FromStr for ProgramVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let days: u32 = s
            .trim()
            .trim_end_matches("-day")
            .parse()
            .map_err(|_| Error::validation(format!("unknown program variant: {}", s)))?;
        Self::from_days(days)
    }
}

impl fmt::Display for ProgramVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-day", self.days_per_week())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    NotStarted,
    Active,
    Paused,
    Completed,
}

impl fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkoutStatus::NotStarted => "not started",
            WorkoutStatus::Active => "active",
            WorkoutStatus::Paused => "paused",
            WorkoutStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// One logged training day. Never edited once recorded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutActivity {
    pub id: Uuid,
    pub day: u32,
    pub week_number: u32,
    pub block_number: u32,
    pub performances: Vec<ExercisePerformance>,
    pub completed_at: DateTime<Utc>,
}

/// Caller-supplied sets for one exercise on a day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseLog {
    pub exercise_id: Uuid,
    pub completed_sets: Vec<CompletedSet>,
    /// Temporary substitution: record the sets but leave progression alone
    #[serde(default)]
    pub skip_progression: bool,
}

/// Result of a successful `complete_day`
#[derive(Clone, Debug, PartialEq)]
pub struct DayOutcome {
    pub activity_id: Uuid,
    pub changes: Vec<(Uuid, ProgressionChange)>,
    pub week_advanced: bool,
    pub program_completed: bool,
}

/// Planned sets for one exercise on a day
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PlannedExercise {
    pub exercise_id: Uuid,
    pub name: String,
    pub order_in_day: u32,
    pub sets: Vec<PlannedSet>,
}

#[derive(Deserialize)]
struct RawWorkout {
    id: Uuid,
    user_id: String,
    name: String,
    variant: ProgramVariant,
    total_weeks: u32,
    current_week: u32,
    current_block: u32,
    current_day: u32,
    status: WorkoutStatus,
    exercises: Vec<Exercise>,
    completed_activities: Vec<WorkoutActivity>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawWorkout")]
pub struct Workout {
    id: Uuid,
    user_id: String,
    name: String,
    variant: ProgramVariant,
    total_weeks: u32,
    current_week: u32,
    current_block: u32,
    current_day: u32,
    status: WorkoutStatus,
    exercises: Vec<Exercise>,
    completed_activities: Vec<WorkoutActivity>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

/// Stored documents must describe a reachable state
impl TryFrom<RawWorkout> for Workout {
    type Error = Error;

    fn try_from(raw: RawWorkout) -> Result<Self> {
        let days = raw.variant.days_per_week();
        if !(1..=PROGRAM_WEEKS).contains(&raw.total_weeks) {
            return Err(Error::validation(format!(
                "total weeks must be within 1..={}, got {}",
                PROGRAM_WEEKS, raw.total_weeks
            )));
        }
        if !(1..=raw.total_weeks).contains(&raw.current_week) {
            return Err(Error::validation(format!(
                "current week {} outside 1..={}",
                raw.current_week, raw.total_weeks
            )));
        }
        if raw.current_block != block_for_week(raw.current_week) {
            return Err(Error::validation(format!(
                "block {} does not match week {}",
                raw.current_block, raw.current_week
            )));
        }
        if !(1..=days).contains(&raw.current_day) {
            return Err(Error::validation(format!(
                "current day {} outside 1..={}",
                raw.current_day, days
            )));
        }

        let mut ids = HashSet::new();
        for exercise in &raw.exercises {
            if !(1..=days).contains(&exercise.assigned_day()) {
                return Err(Error::validation(format!(
                    "exercise {} assigned to day {} of a {} program",
                    exercise.name(),
                    exercise.assigned_day(),
                    raw.variant
                )));
            }
            if !ids.insert(exercise.id()) {
                return Err(Error::rule(
                    Rule::DuplicateExercise,
                    format!("exercise {}", exercise.id()),
                ));
            }
        }
        if let Some(activity) = raw
            .completed_activities
            .iter()
            .find(|a| a.week_number == 0 || a.week_number > raw.current_week)
        {
            return Err(Error::validation(format!(
                "activity {} has week {} outside 1..={}",
                activity.id, activity.week_number, raw.current_week
            )));
        }

        Ok(Self {
            id: raw.id,
            user_id: raw.user_id,
            name: raw.name,
            variant: raw.variant,
            total_weeks: raw.total_weeks,
            current_week: raw.current_week,
            current_block: raw.current_block,
            current_day: raw.current_day,
            status: raw.status,
            exercises: raw.exercises,
            completed_activities: raw.completed_activities,
            created_at: raw.created_at,
            started_at: raw.started_at,
            completed_at: raw.completed_at,
        })
    }
}

impl Workout {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        variant: ProgramVariant,
        total_weeks: u32,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if !(1..=PROGRAM_WEEKS).contains(&total_weeks) {
            return Err(Error::validation(format!(
                "total weeks must be within 1..={}, got {}",
                PROGRAM_WEEKS, total_weeks
            )));
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::validation("workout name cannot be empty"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name,
            variant,
            total_weeks,
            current_week: 1,
            current_block: 1,
            current_day: 1,
            status: WorkoutStatus::NotStarted,
            exercises: Vec::new(),
            completed_activities: Vec::new(),
            created_at: now,
            started_at: None,
            completed_at: None,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> ProgramVariant {
        self.variant
    }

    pub fn total_weeks(&self) -> u32 {
        self.total_weeks
    }

    pub fn current_week(&self) -> u32 {
        self.current_week
    }

    pub fn current_block(&self) -> u32 {
        self.current_block
    }

    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    pub fn status(&self) -> WorkoutStatus {
        self.status
    }

    pub fn is_deload_week(&self) -> bool {
        is_deload_week(self.current_week)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn exercise(&self, id: Uuid) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id() == id)
    }

    /// Exercises assigned to `day`, in order
    pub fn exercises_for_day(&self, day: u32) -> Vec<&Exercise> {
        let mut list: Vec<_> = self
            .exercises
            .iter()
            .filter(|e| e.assigned_day() == day)
            .collect();
        list.sort_by_key(|e| e.order_in_day());
        list
    }

    pub fn activities(&self) -> &[WorkoutActivity] {
        &self.completed_activities
    }

    pub fn activities_for_week(&self, week: u32) -> Vec<&WorkoutActivity> {
        self.completed_activities
            .iter()
            .filter(|a| a.week_number == week)
            .collect()
    }

    /// Distinct days already logged for `week`
    pub fn completed_days(&self, week: u32) -> BTreeSet<u32> {
        self.completed_activities
            .iter()
            .filter(|a| a.week_number == week)
            .map(|a| a.day)
            .collect()
    }

    /// Days that have at least one exercise assigned
    pub fn scheduled_days(&self) -> BTreeSet<u32> {
        self.exercises.iter().map(|e| e.assigned_day()).collect()
    }

    // ------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------

    fn entity(&self) -> String {
        format!("workout {}", self.id)
    }

    fn require_active(&self) -> Result<()> {
        if self.status != WorkoutStatus::Active {
            return Err(Error::rule(Rule::WorkoutNotActive, self.entity()));
        }
        Ok(())
    }

    fn require_not_completed(&self) -> Result<()> {
        if self.status == WorkoutStatus::Completed {
            return Err(Error::rule(Rule::WorkoutCompleted, self.entity()));
        }
        Ok(())
    }

    fn require_day_in_program(&self, day: u32) -> Result<()> {
        if day == 0 || day > self.variant.days_per_week() {
            return Err(Error::rule(
                Rule::DayNotInProgram,
                format!("{} day {}", self.entity(), day),
            ));
        }
        Ok(())
    }

    fn exercise_mut(&mut self, id: Uuid) -> Result<&mut Exercise> {
        self.exercises
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| Error::NotFound {
                kind: "exercise",
                id: id.to_string(),
            })
    }

    // ------------------------------------------------------------------
    // Program setup
    // ------------------------------------------------------------------

    pub fn add_exercise(&mut self, exercise: Exercise) -> Result<()> {
        self.require_not_completed()?;
        self.require_day_in_program(exercise.assigned_day())?;
        if self.exercise(exercise.id()).is_some() {
            return Err(Error::rule(
                Rule::DuplicateExercise,
                format!("exercise {}", exercise.id()),
            ));
        }
        tracing::debug!(
            "Adding {} to day {} of workout {}",
            exercise.name(),
            exercise.assigned_day(),
            self.id
        );
        self.exercises.push(exercise);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status != WorkoutStatus::NotStarted {
            return Err(Error::rule(Rule::InvalidTransition, self.entity()));
        }
        if self.exercises.is_empty() {
            return Err(Error::rule(Rule::NoExercises, self.entity()));
        }
        self.status = WorkoutStatus::Active;
        self.current_week = 1;
        self.current_block = 1;
        self.current_day = self.next_open_day();
        self.started_at = Some(now);
        tracing::info!("Started workout {} ({})", self.name, self.variant);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.to_paused("Paused")
    }

    /// Park this workout (e.g. when another one becomes active)
    pub fn deactivate(&mut self) -> Result<()> {
        self.to_paused("Deactivated")
    }

    fn to_paused(&mut self, verb: &str) -> Result<()> {
        if self.status != WorkoutStatus::Active {
            return Err(Error::rule(Rule::InvalidTransition, self.entity()));
        }
        self.status = WorkoutStatus::Paused;
        tracing::info!("{} workout {} at week {}", verb, self.name, self.current_week);
        Ok(())
    }

    pub fn set_as_active(&mut self) -> Result<()> {
        if self.status != WorkoutStatus::Paused {
            return Err(Error::rule(Rule::InvalidTransition, self.entity()));
        }
        self.status = WorkoutStatus::Active;
        tracing::info!("Resumed workout {} at week {}", self.name, self.current_week);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Planning and day completion
    // ------------------------------------------------------------------

    /// What to lift on `day` in the current week
    pub fn plan_for_day(&self, day: u32) -> Result<Vec<PlannedExercise>> {
        self.require_day_in_program(day)?;
        self.exercises_for_day(day)
            .into_iter()
            .map(|e| {
                Ok(PlannedExercise {
                    exercise_id: e.id(),
                    name: e.name().to_string(),
                    order_in_day: e.order_in_day(),
                    sets: e.plan(self.current_week)?,
                })
            })
            .collect()
    }

    /// Log a training day, apply progression and advance the program
    pub fn complete_day(
        &mut self,
        day: u32,
        logs: Vec<ExerciseLog>,
        now: DateTime<Utc>,
    ) -> Result<DayOutcome> {
        self.require_active()?;
        self.require_day_in_program(day)?;

        let day_entity = || format!("workout {} day {}", self.id, day);
        if !self.scheduled_days().contains(&day) {
            return Err(Error::rule(Rule::DayHasNoExercises, day_entity()));
        }
        if self.completed_days(self.current_week).contains(&day) {
            return Err(Error::rule(Rule::DayAlreadyCompleted, day_entity()));
        }
        if logs.is_empty() {
            return Err(Error::rule(Rule::EmptyPerformance, day_entity()));
        }

        let week = self.current_week;
        let mut exercises = self.exercises.clone();
        let mut seen = HashSet::new();
        let mut performances = Vec::with_capacity(logs.len());
        let mut changes = Vec::with_capacity(logs.len());

        for log in logs {
            if !seen.insert(log.exercise_id) {
                return Err(Error::rule(
                    Rule::DuplicateExercise,
                    format!("exercise {}", log.exercise_id),
                ));
            }
            let exercise = exercises
                .iter_mut()
                .find(|e| e.id() == log.exercise_id)
                .ok_or_else(|| Error::NotFound {
                    kind: "exercise",
                    id: log.exercise_id.to_string(),
                })?;
            if exercise.assigned_day() != day {
                return Err(Error::rule(
                    Rule::ExerciseNotAssignedToDay,
                    format!("exercise {} on day {}", exercise.name(), day),
                ));
            }

            let planned = exercise.plan(week)?;
            let performance =
                ExercisePerformance::new(exercise.id(), planned, log.completed_sets, now)?;
            let change = if log.skip_progression {
                tracing::debug!("Skipping progression for {}", exercise.name());
                ProgressionChange::Unchanged
            } else {
                exercise.apply(&performance)?
            };
            changes.push((exercise.id(), change));
            performances.push(performance);
        }

        let activity = WorkoutActivity {
            id: Uuid::new_v4(),
            day,
            week_number: week,
            block_number: self.current_block,
            performances,
            completed_at: now,
        };
        let activity_id = activity.id;

        // commit
        self.exercises = exercises;
        self.completed_activities.push(activity);
        tracing::info!(
            "Completed day {} of week {} (block {}) for workout {}",
            day,
            week,
            self.current_block,
            self.name
        );

        let mut outcome = DayOutcome {
            activity_id,
            changes,
            week_advanced: false,
            program_completed: false,
        };

        if self.week_is_filled(week) {
            if week >= self.total_weeks {
                self.status = WorkoutStatus::Completed;
                self.completed_at = Some(now);
                outcome.program_completed = true;
                tracing::info!("Workout {} completed after {} weeks", self.name, week);
            } else {
                self.advance_week();
                outcome.week_advanced = true;
            }
        } else {
            self.current_day = self.next_open_day();
        }

        Ok(outcome)
    }

    fn week_is_filled(&self, week: u32) -> bool {
        let done = self.completed_days(week);
        self.scheduled_days().iter().all(|d| done.contains(d))
    }

    /// Lowest scheduled day not yet logged this week
    fn next_open_day(&self) -> u32 {
        let done = self.completed_days(self.current_week);
        self.scheduled_days()
            .into_iter()
            .find(|d| !done.contains(d))
            .unwrap_or(1)
    }

    fn advance_week(&mut self) {
        self.current_week += 1;
        self.current_block = block_for_week(self.current_week);
        self.current_day = self.next_open_day();
        tracing::info!(
            "Workout {} advanced to week {} (block {}{})",
            self.name,
            self.current_week,
            self.current_block,
            if self.is_deload_week() { ", deload" } else { "" }
        );
    }

    /// Move to the next week without logging the remaining days
    pub fn progress_to_next_week(&mut self) -> Result<u32> {
        self.require_active()?;
        if self.current_week >= self.total_weeks {
            return Err(Error::rule(Rule::FinalWeekReached, self.entity()));
        }
        self.advance_week();
        Ok(self.current_week)
    }

    // ------------------------------------------------------------------
    // Corrections
    // ------------------------------------------------------------------

    pub fn substitute_exercise(
        &mut self,
        exercise_id: Uuid,
        new_name: impl Into<String>,
        new_external_id: Option<String>,
    ) -> Result<()> {
        self.require_not_completed()?;
        self.exercise_mut(exercise_id)?
            .substitute(new_name, new_external_id)
    }

    pub fn adjust_training_max(
        &mut self,
        exercise_id: Uuid,
        adjustment: TrainingMaxAdjustment,
    ) -> Result<ProgressionChange> {
        self.require_not_completed()?;
        let exercise = self.exercise_mut(exercise_id)?;
        let entity = format!("exercise {}", exercise.name());
        let change = exercise
            .progression_mut()
            .adjust_training_max(adjustment)
            .ok_or_else(|| Error::rule(Rule::WrongProgressionKind, entity))??;
        tracing::info!("Manual training max adjustment: {:?}", change);
        Ok(change)
    }

    pub fn adjust_weight(&mut self, exercise_id: Uuid, weight: Weight) -> Result<ProgressionChange> {
        self.require_not_completed()?;
        let exercise = self.exercise_mut(exercise_id)?;
        let entity = format!("exercise {}", exercise.name());
        let change = exercise
            .progression_mut()
            .set_weight(weight)
            .ok_or_else(|| Error::rule(Rule::WrongProgressionKind, entity))?;
        tracing::info!("Manual weight adjustment: {:?}", change);
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Equipment, ExerciseCategory, LinearProgression, MinimalSetsProgression, Progression,
        RepRange, RepsPerSetProgression, TrainingMax, WeightUnit,
    };
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn linear_exercise(name: &str, day: u32) -> Exercise {
        let progression = Progression::Linear(
            LinearProgression::new(
                TrainingMax::new(dec!(100), WeightUnit::Kilograms).unwrap(),
                true,
                4,
            )
            .unwrap(),
        );
        Exercise::new(
            name,
            ExerciseCategory::Compound,
            Equipment::Barbell,
            day,
            1,
            progression,
        )
        .unwrap()
    }

    fn four_day_workout(total_weeks: u32) -> Workout {
        let mut w = Workout::new(
            "user-1",
            "Hypertrophy",
            ProgramVariant::FourDay,
            total_weeks,
            Utc::now(),
        )
        .unwrap();
        for (day, name) in ["Squat", "Bench", "Deadlift", "Press"].iter().enumerate() {
            w.add_exercise(linear_exercise(name, day as u32 + 1)).unwrap();
        }
        w
    }

    /// Log every planned set at exactly the target
    fn logs_at_target(w: &Workout, day: u32) -> Vec<ExerciseLog> {
        w.plan_for_day(day)
            .unwrap()
            .into_iter()
            .map(|p| ExerciseLog {
                exercise_id: p.exercise_id,
                completed_sets: p
                    .sets
                    .iter()
                    .map(|s| {
                        CompletedSet::new(s.set_number(), s.weight(), s.target_reps(), s.is_amrap())
                            .unwrap()
                    })
                    .collect(),
                skip_progression: false,
            })
            .collect()
    }

    fn complete_week(w: &mut Workout) {
        for day in 1..=4 {
            let logs = logs_at_target(w, day);
            w.complete_day(day, logs, Utc::now()).unwrap();
        }
    }

    #[test]
    fn test_start_requires_exercises() {
        let mut w = Workout::new("u", "Empty", ProgramVariant::FiveDay, 21, Utc::now()).unwrap();
        let err = w.start(Utc::now()).unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::NoExercises));
        assert_eq!(w.status(), WorkoutStatus::NotStarted);
    }

    #[test]
    fn test_total_weeks_validated() {
        assert!(Workout::new("u", "W", ProgramVariant::FourDay, 0, Utc::now()).is_err());
        assert!(Workout::new("u", "W", ProgramVariant::FourDay, 22, Utc::now()).is_err());
    }

    #[test]
    fn test_complete_day_requires_active() {
        let mut w = four_day_workout(21);
        let logs = logs_at_target(&w, 1);
        let err = w.complete_day(1, logs, Utc::now()).unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::WorkoutNotActive));
        assert!(w.activities().is_empty());
    }

    #[test]
    fn test_day_outside_variant_rejected() {
        let mut w = four_day_workout(21);
        w.start(Utc::now()).unwrap();
        let err = w.complete_day(5, vec![], Utc::now()).unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::DayNotInProgram));
    }

    #[test]
    fn test_day_without_exercises_rejected() {
        let mut w = Workout::new("u", "W", ProgramVariant::FiveDay, 21, Utc::now()).unwrap();
        w.add_exercise(linear_exercise("Squat", 1)).unwrap();
        w.start(Utc::now()).unwrap();
        let err = w.complete_day(2, vec![], Utc::now()).unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::DayHasNoExercises));
    }

    #[test]
    fn test_exercise_from_other_day_rejected_atomically() {
        let mut w = four_day_workout(21);
        w.start(Utc::now()).unwrap();
        let before = w.clone();

        let mut logs = logs_at_target(&w, 1);
        logs.extend(logs_at_target(&w, 2));
        let err = w.complete_day(1, logs, Utc::now()).unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::ExerciseNotAssignedToDay));
        assert_eq!(w, before);
    }

    #[test]
    fn test_unknown_exercise_is_not_found() {
        let mut w = four_day_workout(21);
        w.start(Utc::now()).unwrap();
        let logs = vec![ExerciseLog {
            exercise_id: Uuid::new_v4(),
            completed_sets: vec![],
            skip_progression: false,
        }];
        assert!(w.complete_day(1, logs, Utc::now()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_too_many_sets_rejected_without_mutation() {
        let mut w = four_day_workout(21);
        w.start(Utc::now()).unwrap();
        let before = w.clone();
        let mut logs = logs_at_target(&w, 1);
        let extra = *logs[0].completed_sets.last().unwrap();
        logs[0].completed_sets.push(extra);
        let err = w.complete_day(1, logs, Utc::now()).unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::TooManyCompletedSets));
        assert_eq!(w, before);
    }

    #[test]
    fn test_day_cannot_be_logged_twice_in_a_week() {
        let mut w = four_day_workout(21);
        w.start(Utc::now()).unwrap();
        let logs = logs_at_target(&w, 1);
        w.complete_day(1, logs.clone(), Utc::now()).unwrap();
        assert_eq!(w.current_day(), 2);
        let err = w.complete_day(1, logs, Utc::now()).unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::DayAlreadyCompleted));
    }

    #[test]
    fn test_amrap_adjusts_training_max_through_workout() {
        let mut w = four_day_workout(21);
        w.start(Utc::now()).unwrap();
        let mut logs = logs_at_target(&w, 1);
        let sets = &mut logs[0].completed_sets;
        let last = sets.pop().unwrap();
        sets.push(
            CompletedSet::new(last.set_number(), last.weight(), last.actual_reps() + 4, true)
                .unwrap(),
        );
        let id = logs[0].exercise_id;

        let outcome = w.complete_day(1, logs, Utc::now()).unwrap();
        assert_eq!(outcome.changes.len(), 1);
        let tm = w.exercise(id).unwrap().progression().training_max().unwrap();
        assert_eq!(tm.value(), dec!(102.5));
    }

    #[test]
    fn test_skip_progression_records_but_keeps_state() {
        let mut w = four_day_workout(21);
        w.start(Utc::now()).unwrap();
        let mut logs = logs_at_target(&w, 1);
        logs[0].skip_progression = true;
        let sets = &mut logs[0].completed_sets;
        let last = sets.pop().unwrap();
        sets.push(CompletedSet::new(last.set_number(), last.weight(), 0, true).unwrap());
        let id = logs[0].exercise_id;

        w.complete_day(1, logs, Utc::now()).unwrap();
        assert_eq!(w.activities().len(), 1);
        let tm = w.exercise(id).unwrap().progression().training_max().unwrap();
        assert_eq!(tm.value(), dec!(100));
    }

    #[test]
    fn test_week_six_rolls_into_deload() {
        crate::logging::init_test();
        let mut w = four_day_workout(21);
        w.start(Utc::now()).unwrap();
        for _ in 1..6 {
            w.progress_to_next_week().unwrap();
        }
        assert_eq!(w.current_week(), 6);
        complete_week(&mut w);
        assert_eq!(w.current_week(), 7);
        assert_eq!(w.current_block(), 1);
        assert!(w.is_deload_week());
        assert_eq!(w.current_day(), 1);

        complete_week(&mut w);
        assert_eq!(w.current_week(), 8);
        assert_eq!(w.current_block(), 2);
    }

    #[test]
    fn test_final_week_completes_program() {
        crate::logging::init_test();
        let mut w = four_day_workout(21);
        w.start(Utc::now()).unwrap();
        while w.current_week() < 21 {
            w.progress_to_next_week().unwrap();
        }
        assert_eq!(w.current_block(), 3);
        let err = w.progress_to_next_week().unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::FinalWeekReached));

        complete_week(&mut w);
        assert_eq!(w.status(), WorkoutStatus::Completed);
        assert_eq!(w.current_week(), 21);
        assert!(w.completed_at().is_some());

        let logs = logs_at_target(&w, 1);
        assert!(w.complete_day(1, logs, Utc::now()).is_err());
        assert!(w.pause().is_err());
    }

    #[test]
    fn test_pause_and_resume_keep_cursor() {
        let mut w = four_day_workout(21);
        assert!(w.pause().is_err());
        w.start(Utc::now()).unwrap();
        w.progress_to_next_week().unwrap();
        w.pause().unwrap();
        assert_eq!(w.status(), WorkoutStatus::Paused);
        assert!(w.progress_to_next_week().is_err());
        w.set_as_active().unwrap();
        assert_eq!(w.current_week(), 2);
        w.deactivate().unwrap();
        assert_eq!(w.status(), WorkoutStatus::Paused);
        assert!(w.start(Utc::now()).is_err());
    }

    #[test]
    fn test_substitution_preserves_progression() {
        let mut w = four_day_workout(21);
        let id = w.exercises()[0].id();
        w.start(Utc::now()).unwrap();
        w.adjust_training_max(id, TrainingMaxAdjustment::Absolute(dec!(20)))
            .unwrap();
        let before = w.exercise(id).unwrap().progression().clone();
        w.substitute_exercise(id, "Front Squat", Some("fs-1".into()))
            .unwrap();
        let ex = w.exercise(id).unwrap();
        assert_eq!(ex.name(), "Front Squat");
        assert_eq!(ex.progression(), &before);
    }

    #[test]
    fn test_manual_overrides_check_kind() {
        let mut w = four_day_workout(21);
        let linear_id = w.exercises()[0].id();
        let rps = Exercise::new(
            "Lateral Raise",
            ExerciseCategory::Isolation,
            Equipment::Dumbbell,
            1,
            2,
            Progression::RepsPerSet(
                RepsPerSetProgression::new(
                    Weight::kilograms(dec!(10)).unwrap(),
                    RepRange::new(8, 10, 12).unwrap(),
                    3,
                    5,
                    5,
                )
                .unwrap(),
            ),
        )
        .unwrap();
        let rps_id = rps.id();
        w.add_exercise(rps).unwrap();

        let err = w
            .adjust_weight(linear_id, Weight::kilograms(dec!(50)).unwrap())
            .unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::WrongProgressionKind));
        let err = w
            .adjust_training_max(rps_id, TrainingMaxAdjustment::Percent(dec!(5)))
            .unwrap_err();
        assert_eq!(err.violated_rule(), Some(Rule::WrongProgressionKind));

        w.adjust_weight(rps_id, Weight::kilograms(dec!(12)).unwrap())
            .unwrap();
        assert_eq!(
            w.exercise(rps_id).unwrap().progression().current_weight().unwrap().value(),
            dec!(12)
        );
        assert!(w
            .adjust_weight(Uuid::new_v4(), Weight::kilograms(dec!(1)).unwrap())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_mixed_day_applies_each_strategy() {
        let mut w = Workout::new("u", "Mixed", ProgramVariant::FourDay, 21, Utc::now()).unwrap();
        w.add_exercise(linear_exercise("Squat", 1)).unwrap();
        let dips = Exercise::new(
            "Dips",
            ExerciseCategory::Accessory,
            Equipment::Bodyweight,
            1,
            2,
            Progression::MinimalSets(
                MinimalSetsProgression::new(Weight::kilograms(dec!(0)).unwrap(), 40, 6, 3, 10)
                    .unwrap(),
            ),
        )
        .unwrap();
        let dips_id = dips.id();
        w.add_exercise(dips).unwrap();
        w.start(Utc::now()).unwrap();

        let mut logs = logs_at_target(&w, 1);
        let dip_log = logs.iter_mut().find(|l| l.exercise_id == dips_id).unwrap();
        // 6 planned sets of 7; only 38 reps done
        let reps = [7, 7, 6, 6, 6, 6];
        dip_log.completed_sets = dip_log
            .completed_sets
            .iter()
            .zip(reps)
            .map(|(s, r)| CompletedSet::new(s.set_number(), s.weight(), r, false).unwrap())
            .collect();

        w.complete_day(1, logs, Utc::now()).unwrap();
        assert_eq!(
            w.exercise(dips_id).unwrap().progression().set_count(),
            Some(7)
        );
        assert_eq!(w.activities()[0].performances.len(), 2);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Complete(u32),
        Advance,
        Pause,
        Resume,
        Substitute,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u32..=5).prop_map(Op::Complete),
            Just(Op::Advance),
            Just(Op::Pause),
            Just(Op::Resume),
            Just(Op::Substitute),
        ]
    }

    #[test]
    fn test_deserialize_rejects_unreachable_cursor() {
        let mut w = four_day_workout(14);
        w.start(Utc::now()).unwrap();
        complete_week(&mut w);
        let doc = serde_json::to_value(&w).unwrap();
        let back: Workout = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(back, w);

        let tampered = [
            ("current_block", serde_json::json!(2)),
            ("current_week", serde_json::json!(0)),
            ("current_week", serde_json::json!(15)),
            ("current_day", serde_json::json!(5)),
            ("total_weeks", serde_json::json!(22)),
        ];
        for (field, value) in tampered {
            let mut bad = doc.clone();
            bad[field] = value.clone();
            assert!(
                serde_json::from_value::<Workout>(bad).is_err(),
                "{} = {} should be rejected",
                field,
                value
            );
        }
    }

    #[test]
    fn test_deserialize_rejects_bad_exercise_layout() {
        let w = four_day_workout(21);
        let doc = serde_json::to_value(&w).unwrap();

        let mut off_program = doc.clone();
        off_program["exercises"][0]["assigned_day"] = serde_json::json!(6);
        assert!(serde_json::from_value::<Workout>(off_program).is_err());

        let mut duplicated = doc.clone();
        let first = duplicated["exercises"][0].clone();
        duplicated["exercises"].as_array_mut().unwrap().push(first);
        assert!(serde_json::from_value::<Workout>(duplicated).is_err());
    }

    proptest! {
        #[test]
        fn prop_activity_log_is_append_only(ops in proptest::collection::vec(op_strategy(), 1..40)) {
            let mut w = four_day_workout(3);
            w.start(Utc::now()).unwrap();
            let mut last_len = 0;
            for op in ops {
                let snapshot: Vec<Uuid> = w.activities().iter().map(|a| a.id).collect();
                let _ = match op {
                    Op::Complete(day) => {
                        let logs = if (1..=4).contains(&day) { logs_at_target(&w, day) } else { vec![] };
                        w.complete_day(day, logs, Utc::now()).map(|_| ())
                    }
                    Op::Advance => w.progress_to_next_week().map(|_| ()),
                    Op::Pause => w.pause(),
                    Op::Resume => w.set_as_active(),
                    Op::Substitute => {
                        let id = w.exercises()[0].id();
                        w.substitute_exercise(id, "Swap", None)
                    }
                };
                let len = w.activities().len();
                prop_assert!(len >= last_len);
                // earlier entries are untouched
                for (i, id) in snapshot.iter().enumerate() {
                    prop_assert_eq!(w.activities()[i].id, *id);
                }
                prop_assert_eq!(w.current_block(), block_for_week(w.current_week()));
                last_len = len;
            }
            // every reachable state survives a store/load cycle
            let back: Workout = serde_json::from_str(&serde_json::to_string(&w).unwrap()).unwrap();
            prop_assert_eq!(back, w);
        }

        #[test]
        fn prop_substitution_preserves_state(names in proptest::collection::vec("[A-Za-z ]{1,20}", 1..8)) {
            let mut w = four_day_workout(21);
            let id = w.exercises()[0].id();
            let before = w.exercise(id).unwrap().progression().clone();
            for name in names {
                if name.trim().is_empty() {
                    continue;
                }
                w.substitute_exercise(id, name, Some("ext".into())).unwrap();
                prop_assert_eq!(w.exercise(id).unwrap().progression(), &before);
            }
        }
    }
}
