//! Program templates.
//!
//! A template describes the exercises of a program (TOML on disk or one of
//! the built-in defaults) and builds a fresh `Workout` from them.

use crate::periodization::PROGRAM_WEEKS;
use crate::{
    Config, Equipment, Error, Exercise, ExerciseCategory, LinearProgression,
    MinimalSetsProgression, ProgramVariant, Progression, RepRange, RepsPerSetProgression,
    Result, TrainingMax, Weight, WeightUnit, Workout,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgramTemplate {
    pub name: String,
    /// Training days per week (4, 5 or 6)
    pub days_per_week: u32,
    #[serde(default = "default_total_weeks")]
    pub total_weeks: u32,
    #[serde(default)]
    pub unit: Option<WeightUnit>,
    pub exercises: Vec<ExerciseTemplate>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseTemplate {
    pub name: String,
    pub category: ExerciseCategory,
    pub equipment: Equipment,
    pub day: u32,
    pub order: u32,
    #[serde(default)]
    pub external_id: Option<String>,
    pub progression: ProgressionTemplate,
}

/// Progression settings; omitted bounds come from `Config`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressionTemplate {
    Linear {
        training_max: f64,
        #[serde(default)]
        use_amrap: Option<bool>,
        #[serde(default)]
        base_sets: Option<u32>,
    },
    RepsPerSet {
        weight: f64,
        rep_range: [u32; 3],
        starting_sets: u32,
        target_sets: u32,
        #[serde(default)]
        max_sets: Option<u32>,
    },
    MinimalSets {
        weight: f64,
        target_total_reps: u32,
        #[serde(default)]
        starting_sets: Option<u32>,
        #[serde(default)]
        minimum_sets: Option<u32>,
        #[serde(default)]
        maximum_sets: Option<u32>,
    },
}

fn default_total_weeks() -> u32 {
    PROGRAM_WEEKS
}

fn decimal(value: f64, what: &str) -> Result<Decimal> {
    Decimal::try_from(value)
        .map(|d| d.normalize())
        .map_err(|e| Error::validation(format!("invalid {} {}: {}", what, value, e)))
}

impl ProgressionTemplate {
    fn build(&self, unit: WeightUnit, config: &Config) -> Result<Progression> {
        let defaults = &config.progression;
        let progression = match self {
            ProgressionTemplate::Linear {
                training_max,
                use_amrap,
                base_sets,
            } => Progression::Linear(
                LinearProgression::new(
                    TrainingMax::new(decimal(*training_max, "training max")?, unit)?,
                    use_amrap.unwrap_or(defaults.use_amrap),
                    base_sets.unwrap_or(defaults.linear_base_sets),
                )?
                .with_normal_rep_offset(defaults.linear_normal_rep_offset),
            ),
            ProgressionTemplate::RepsPerSet {
                weight,
                rep_range,
                starting_sets,
                target_sets,
                max_sets,
            } => Progression::RepsPerSet(RepsPerSetProgression::new(
                Weight::new(decimal(*weight, "weight")?, unit)?,
                RepRange::new(rep_range[0], rep_range[1], rep_range[2])?,
                *starting_sets,
                *target_sets,
                max_sets.unwrap_or(defaults.reps_per_set_max_sets.max(*target_sets)),
            )?),
            ProgressionTemplate::MinimalSets {
                weight,
                target_total_reps,
                starting_sets,
                minimum_sets,
                maximum_sets,
            } => {
                let minimum = minimum_sets.unwrap_or(defaults.minimal_sets_minimum);
                let maximum = maximum_sets.unwrap_or(defaults.minimal_sets_maximum);
                Progression::MinimalSets(MinimalSetsProgression::new(
                    Weight::new(decimal(*weight, "weight")?, unit)?,
                    *target_total_reps,
                    starting_sets.unwrap_or(minimum),
                    minimum,
                    maximum,
                )?)
            }
        };
        Ok(progression)
    }
}

impl ProgramTemplate {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let template = Self::from_toml(&contents)?;
        tracing::info!("Loaded program template {:?} from {:?}", template.name, path);
        Ok(template)
    }

    /// Build a not-yet-started workout for `user_id`
    pub fn build(&self, user_id: &str, config: &Config, now: DateTime<Utc>) -> Result<Workout> {
        let variant = ProgramVariant::from_days(self.days_per_week)?;
        let unit = self.unit.unwrap_or(config.units.default_unit);
        let mut workout = Workout::new(user_id, self.name.clone(), variant, self.total_weeks, now)?;

        for ex in &self.exercises {
            let mut exercise = Exercise::new(
                ex.name.clone(),
                ex.category,
                ex.equipment,
                ex.day,
                ex.order,
                ex.progression.build(unit, config)?,
            )?;
            if let Some(external_id) = &ex.external_id {
                exercise = exercise.with_external_id(external_id.clone());
            }
            workout.add_exercise(exercise)?;
        }

        tracing::info!(
            "Built workout {:?} with {} exercises ({})",
            self.name,
            workout.exercises().len(),
            variant
        );
        Ok(workout)
    }
}

// ============================================================================
// Built-in templates
// ============================================================================

fn linear(name: &str, day: u32, order: u32, training_max: f64) -> ExerciseTemplate {
    ExerciseTemplate {
        name: name.into(),
        category: ExerciseCategory::Compound,
        equipment: Equipment::Barbell,
        day,
        order,
        external_id: None,
        progression: ProgressionTemplate::Linear {
            training_max,
            use_amrap: None,
            base_sets: None,
        },
    }
}

fn reps_per_set(name: &str, equipment: Equipment, day: u32, order: u32, weight: f64) -> ExerciseTemplate {
    ExerciseTemplate {
        name: name.into(),
        category: ExerciseCategory::Isolation,
        equipment,
        day,
        order,
        external_id: None,
        progression: ProgressionTemplate::RepsPerSet {
            weight,
            rep_range: [8, 10, 12],
            starting_sets: 3,
            target_sets: 5,
            max_sets: None,
        },
    }
}

fn minimal_sets(name: &str, day: u32, order: u32) -> ExerciseTemplate {
    ExerciseTemplate {
        name: name.into(),
        category: ExerciseCategory::Accessory,
        equipment: Equipment::Bodyweight,
        day,
        order,
        external_id: None,
        progression: ProgressionTemplate::MinimalSets {
            weight: 0.0,
            target_total_reps: 40,
            starting_sets: Some(6),
            minimum_sets: None,
            maximum_sets: None,
        },
    }
}

fn build_default_template(variant: ProgramVariant) -> ProgramTemplate {
    let mut exercises = vec![
        linear("Back Squat", 1, 1, 100.0),
        reps_per_set("Leg Curl", Equipment::Machine, 1, 2, 30.0),
        linear("Bench Press", 2, 1, 80.0),
        reps_per_set("Dumbbell Row", Equipment::Dumbbell, 2, 2, 24.0),
        linear("Deadlift", 3, 1, 120.0),
        minimal_sets("Pull-up", 3, 2),
        linear("Overhead Press", 4, 1, 50.0),
        minimal_sets("Dip", 4, 2),
    ];
    if variant.days_per_week() >= 5 {
        exercises.push(linear("Front Squat", 5, 1, 80.0));
        exercises.push(reps_per_set("Lateral Raise", Equipment::Dumbbell, 5, 2, 8.0));
    }
    if variant.days_per_week() >= 6 {
        exercises.push(linear("Incline Bench Press", 6, 1, 70.0));
        exercises.push(reps_per_set("Cable Curl", Equipment::Cable, 6, 2, 15.0));
    }

    ProgramTemplate {
        name: format!("Default {} program", variant),
        days_per_week: variant.days_per_week(),
        total_weeks: PROGRAM_WEEKS,
        unit: Some(WeightUnit::Kilograms),
        exercises,
    }
}

static DEFAULT_TEMPLATES: Lazy<[ProgramTemplate; 3]> = Lazy::new(|| {
    [
        build_default_template(ProgramVariant::FourDay),
        build_default_template(ProgramVariant::FiveDay),
        build_default_template(ProgramVariant::SixDay),
    ]
});

/// Cached built-in template for a variant
pub fn default_template(variant: ProgramVariant) -> &'static ProgramTemplate {
    match variant {
        ProgramVariant::FourDay => &DEFAULT_TEMPLATES[0],
        ProgramVariant::FiveDay => &DEFAULT_TEMPLATES[1],
        ProgramVariant::SixDay => &DEFAULT_TEMPLATES[2],
    }
}
