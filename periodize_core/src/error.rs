//! Error types for the periodize_core library.

use std::fmt;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Domain rules that an operation can break
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    WorkoutNotActive,
    WorkoutCompleted,
    InvalidTransition,
    NoExercises,
    DayNotInProgram,
    DayHasNoExercises,
    DayAlreadyCompleted,
    EmptyPerformance,
    ExerciseNotAssignedToDay,
    DuplicateExercise,
    TooManyCompletedSets,
    FinalWeekReached,
    WrongProgressionKind,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Rule::WorkoutNotActive => "workout is not active",
            Rule::WorkoutCompleted => "workout is already completed",
            Rule::InvalidTransition => "status transition is not allowed",
            Rule::NoExercises => "workout has no exercises",
            Rule::DayNotInProgram => "day is not part of the program",
            Rule::DayHasNoExercises => "no exercises are assigned to this day",
            Rule::DayAlreadyCompleted => "day was already completed this week",
            Rule::EmptyPerformance => "no performance data supplied",
            Rule::ExerciseNotAssignedToDay => "exercise is not assigned to this day",
            Rule::DuplicateExercise => "exercise appears more than once",
            Rule::TooManyCompletedSets => "more completed sets than planned sets",
            Rule::FinalWeekReached => "program is already at its final week",
            Rule::WrongProgressionKind => "operation does not apply to this progression type",
        };
        f.write_str(msg)
    }
}

/// Core error type for periodize_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input to a value-object constructor
    #[error("Validation error: {0}")]
    Validation(String),

    /// A domain rule rejected the operation
    #[error("Rule violation on {entity}: {rule}")]
    RuleViolation { rule: Rule, entity: String },

    /// Unknown workout or exercise
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn rule(rule: Rule, entity: impl Into<String>) -> Self {
        Error::RuleViolation {
            rule,
            entity: entity.into(),
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// The broken rule, if this is a rule violation
    pub fn violated_rule(&self) -> Option<Rule> {
        match self {
            Error::RuleViolation { rule, .. } => Some(*rule),
            _ => None,
        }
    }

    /// True for errors the caller maps to an absent result
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
