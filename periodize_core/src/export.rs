//! CSV export of a workout's activity history.
//!
//! One row per completed set, oldest activity first.

use crate::{Result, Workout};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ActivityRow {
    pub activity_id: String,
    pub week: u32,
    pub block: u32,
    pub day: u32,
    pub exercise: String,
    pub set_number: u32,
    pub weight: String,
    pub unit: String,
    pub target_reps: Option<u32>,
    pub actual_reps: u32,
    pub amrap: bool,
    pub completed_at: String,
}

/// Flatten the activity log into rows
pub fn activity_rows(workout: &Workout) -> Vec<ActivityRow> {
    let mut rows = Vec::new();
    for activity in workout.activities() {
        for performance in &activity.performances {
            let name = workout
                .exercise(performance.exercise_id())
                .map(|e| e.name().to_string())
                .unwrap_or_else(|| performance.exercise_id().to_string());

            for set in performance.completed_sets() {
                let target = performance
                    .planned_sets()
                    .iter()
                    .find(|p| p.set_number() == set.set_number())
                    .map(|p| p.target_reps());
                rows.push(ActivityRow {
                    activity_id: activity.id.to_string(),
                    week: activity.week_number,
                    block: activity.block_number,
                    day: activity.day,
                    exercise: name.clone(),
                    set_number: set.set_number(),
                    weight: set.weight().value().normalize().to_string(),
                    unit: set.weight().unit().symbol().to_string(),
                    target_reps: target,
                    actual_reps: set.actual_reps(),
                    amrap: set.was_amrap(),
                    completed_at: activity.completed_at.to_rfc3339(),
                });
            }
        }
    }
    rows
}

/// Write the activity history to `path`, replacing any existing file
///
/// Returns the number of rows written.
pub fn export_activities_csv(workout: &Workout, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let rows = activity_rows(workout);
    let mut writer = csv::Writer::from_path(path)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    tracing::info!("Exported {} set rows for workout {} to {:?}", rows.len(), workout.id(), path);
    Ok(rows.len())
}
