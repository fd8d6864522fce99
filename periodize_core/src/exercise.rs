//! Exercise entity: a named lift on a program day with its progression.

use crate::{
    Error, ExercisePerformance, PlannedSet, Progression, ProgressionChange, Result, Weight,
    WeightUnit,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    Compound,
    Accessory,
    Isolation,
}

/// Equipment an exercise is loaded with
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Machine,
    Cable,
    Kettlebell,
    Bodyweight,
}

impl Equipment {
    /// Smallest practical load jump for this equipment
    pub fn increment(self, unit: WeightUnit) -> Decimal {
        match (self, unit) {
            (Equipment::Barbell, WeightUnit::Kilograms) => dec!(2.5),
            (Equipment::Barbell, WeightUnit::Pounds) => dec!(5),
            (Equipment::Dumbbell, WeightUnit::Kilograms) => dec!(2),
            (Equipment::Dumbbell, WeightUnit::Pounds) => dec!(5),
            (Equipment::Machine, WeightUnit::Kilograms) => dec!(5),
            (Equipment::Machine, WeightUnit::Pounds) => dec!(10),
            (Equipment::Cable, WeightUnit::Kilograms) => dec!(2.5),
            (Equipment::Cable, WeightUnit::Pounds) => dec!(5),
            (Equipment::Kettlebell, WeightUnit::Kilograms) => dec!(4),
            (Equipment::Kettlebell, WeightUnit::Pounds) => dec!(10),
            // added load (vest, belt)
            (Equipment::Bodyweight, WeightUnit::Kilograms) => dec!(2.5),
            (Equipment::Bodyweight, WeightUnit::Pounds) => dec!(5),
        }
    }

    pub fn increment_weight(self, unit: WeightUnit) -> Result<Weight> {
        Weight::new(self.increment(unit), unit)
    }
}

impl FromStr for Equipment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "barbell" => Ok(Equipment::Barbell),
            "dumbbell" => Ok(Equipment::Dumbbell),
            "machine" => Ok(Equipment::Machine),
            "cable" => Ok(Equipment::Cable),
            "kettlebell" => Ok(Equipment::Kettlebell),
            "bodyweight" => Ok(Equipment::Bodyweight),
            other => Err(Error::validation(format!("unknown equipment: {}", other))),
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Equipment::Barbell => "barbell",
            Equipment::Dumbbell => "dumbbell",
            Equipment::Machine => "machine",
            Equipment::Cable => "cable",
            Equipment::Kettlebell => "kettlebell",
            Equipment::Bodyweight => "bodyweight",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    id: Uuid,
    name: String,
    external_id: Option<String>,
    category: ExerciseCategory,
    equipment: Equipment,
    assigned_day: u32,
    order_in_day: u32,
    progression: Progression,
}

impl Exercise {
    pub fn new(
        name: impl Into<String>,
        category: ExerciseCategory,
        equipment: Equipment,
        assigned_day: u32,
        order_in_day: u32,
        progression: Progression,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::validation("exercise name cannot be empty"));
        }
        if assigned_day == 0 {
            return Err(Error::validation("assigned day must be positive"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            external_id: None,
            category,
            equipment,
            assigned_day,
            order_in_day,
            progression,
        })
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    pub fn category(&self) -> ExerciseCategory {
        self.category
    }

    pub fn equipment(&self) -> Equipment {
        self.equipment
    }

    pub fn assigned_day(&self) -> u32 {
        self.assigned_day
    }

    pub fn order_in_day(&self) -> u32 {
        self.order_in_day
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub(crate) fn progression_mut(&mut self) -> &mut Progression {
        &mut self.progression
    }

    pub fn plan(&self, week: u32) -> Result<Vec<PlannedSet>> {
        self.progression.plan(week)
    }

    pub fn apply(&mut self, performance: &ExercisePerformance) -> Result<ProgressionChange> {
        self.progression.apply(performance, self.equipment)
    }

    /// Swap the lift's name and template id; progression state is kept
    pub fn substitute(&mut self, new_name: impl Into<String>, new_external_id: Option<String>) -> Result<()> {
        let new_name = new_name.into();
        if new_name.trim().is_empty() {
            return Err(Error::validation("exercise name cannot be empty"));
        }
        tracing::info!("Substituting exercise {} ({} -> {})", self.id, self.name, new_name);
        self.name = new_name;
        self.external_id = new_external_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinearProgression, TrainingMax};

    fn squat() -> Exercise {
        let progression = Progression::Linear(
            LinearProgression::new(
                TrainingMax::new(dec!(140), WeightUnit::Kilograms).unwrap(),
                true,
                4,
            )
            .unwrap(),
        );
        Exercise::new(
            "Back Squat",
            ExerciseCategory::Compound,
            Equipment::Barbell,
            1,
            1,
            progression,
        )
        .unwrap()
        .with_external_id("squat-001")
    }

    #[test]
    fn test_new_validates() {
        let p = squat().progression().clone();
        assert!(Exercise::new("  ", ExerciseCategory::Compound, Equipment::Barbell, 1, 1, p.clone()).is_err());
        assert!(Exercise::new("Squat", ExerciseCategory::Compound, Equipment::Barbell, 0, 1, p).is_err());
    }

    #[test]
    fn test_substitution_keeps_progression() {
        let mut ex = squat();
        let before = ex.progression().clone();
        let id = ex.id();
        ex.substitute("Safety Bar Squat", Some("ssb-002".into())).unwrap();
        assert_eq!(ex.name(), "Safety Bar Squat");
        assert_eq!(ex.external_id(), Some("ssb-002"));
        assert_eq!(ex.id(), id);
        assert_eq!(ex.progression(), &before);
    }

    #[test]
    fn test_equipment_increments() {
        assert_eq!(Equipment::Barbell.increment(WeightUnit::Kilograms), dec!(2.5));
        assert_eq!(Equipment::Machine.increment(WeightUnit::Pounds), dec!(10));
        assert_eq!("Dumbbell".parse::<Equipment>().unwrap(), Equipment::Dumbbell);
        assert!("sandbag".parse::<Equipment>().is_err());
    }
}
