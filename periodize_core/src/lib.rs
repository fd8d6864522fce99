#![forbid(unsafe_code)]

//! Core domain model and business logic for periodized strength programs.
//!
//! This crate provides:
//! - Value types (weights, training maxes, rep ranges, sets)
//! - The 21-week periodization table
//! - Progression strategies (Linear, RepsPerSet, MinimalSets)
//! - The `Workout` aggregate and its state machine
//! - Persistence (JSON documents, CSV export) and program templates

pub mod error;
pub mod config;
pub mod logging;
pub mod weight;
pub mod rep_range;
pub mod periodization;
pub mod sets;
pub mod performance;
pub mod progression;
pub mod exercise;
pub mod workout;
pub mod report;
pub mod repository;
pub mod export;
pub mod template;

// Re-export commonly used types
pub use error::{Error, Result, Rule};
pub use config::Config;
pub use weight::{TrainingMax, TrainingMaxAdjustment, Weight, WeightUnit};
pub use rep_range::RepRange;
pub use periodization::{week_parameters, WeekParameters};
pub use sets::{CompletedSet, PlannedSet};
pub use performance::ExercisePerformance;
pub use progression::{
    LinearProgression, MinimalSetsProgression, Progression, ProgressionChange, ProgressionKind,
    RepsPerSetProgression,
};
pub use exercise::{Equipment, Exercise, ExerciseCategory};
pub use workout::{
    DayOutcome, ExerciseLog, PlannedExercise, ProgramVariant, Workout, WorkoutActivity,
    WorkoutStatus,
};
pub use report::{ExerciseSnapshot, WorkoutSummary};
pub use repository::{FileWorkoutRepository, WorkoutRepository};
pub use export::export_activities_csv;
pub use template::{default_template, ProgramTemplate};
