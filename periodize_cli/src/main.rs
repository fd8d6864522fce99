use chrono::Utc;
use clap::{Parser, Subcommand};
use periodize_core::*;
use rust_decimal::Decimal;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "periodize")]
#[command(about = "Periodized strength program tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a workout from a template file or the built-in default
    Init {
        /// Workout name
        #[arg(long)]
        name: Option<String>,

        /// Training days per week when using the built-in template (4, 5 or 6)
        #[arg(long, default_value = "4")]
        days: ProgramVariant,

        /// Program template (TOML)
        #[arg(long, conflicts_with = "days")]
        template: Option<PathBuf>,

        /// Override the template's program length
        #[arg(long)]
        weeks: Option<u32>,

        #[arg(long, default_value = "local")]
        user: String,
    },

    /// List stored workouts
    List,

    /// Start a not-yet-started workout
    Start { workout: String },

    /// Show program status and current progression numbers
    Show {
        workout: String,

        #[arg(long)]
        json: bool,
    },

    /// Show the planned sets for a day of the current week
    Plan {
        workout: String,

        /// Defaults to the next day to train
        #[arg(long)]
        day: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Log a completed day from a JSON file of exercise logs
    Log {
        workout: String,

        #[arg(long)]
        day: u32,

        /// JSON array of {exercise_id, completed_sets, skip_progression}
        #[arg(long)]
        file: PathBuf,

        /// Record the sets without changing any progression
        #[arg(long)]
        skip_progression: bool,
    },

    /// Move to the next week without logging the remaining days
    Advance { workout: String },

    /// Pause an active workout
    Pause { workout: String },

    /// Resume a paused workout
    Resume { workout: String },

    /// Rename an exercise permanently, keeping its progression
    Substitute {
        workout: String,

        /// Exercise id or name
        #[arg(long)]
        exercise: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        external_id: Option<String>,
    },

    /// Adjust the training max of a Linear exercise
    AdjustTm {
        workout: String,

        /// Exercise id or name
        #[arg(long)]
        exercise: String,

        /// Percentage change, e.g. -5
        #[arg(long, allow_negative_numbers = true, conflicts_with = "absolute")]
        percent: Option<Decimal>,

        /// Absolute change in the training max unit
        #[arg(long, allow_negative_numbers = true)]
        absolute: Option<Decimal>,
    },

    /// Set the working weight of a RepsPerSet or MinimalSets exercise
    SetWeight {
        workout: String,

        /// Exercise id or name
        #[arg(long)]
        exercise: String,

        #[arg(long)]
        weight: Decimal,

        /// Defaults to the exercise's current unit
        #[arg(long)]
        unit: Option<WeightUnit>,
    },

    /// Show the logged activity history
    History {
        workout: String,

        #[arg(long)]
        json: bool,
    },

    /// Export the activity history to CSV
    Export {
        workout: String,

        /// Defaults to <data-dir>/exports/<workout-id>.csv
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    periodize_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let repo = FileWorkoutRepository::new(data_dir.join("workouts"));

    match cli.command {
        Commands::Init {
            name,
            days,
            template,
            weeks,
            user,
        } => cmd_init(&repo, &config, name, days, template, weeks, &user),
        Commands::List => cmd_list(&repo),
        Commands::Start { workout } => {
            let (w, _) = repo.update(repo.resolve(&workout)?, |w| w.start(Utc::now()))?;
            println!("✓ Started {} (week {}, day {})", w.name(), w.current_week(), w.current_day());
            Ok(())
        }
        Commands::Show { workout, json } => cmd_show(&repo, &workout, json),
        Commands::Plan { workout, day, json } => cmd_plan(&repo, &workout, day, json),
        Commands::Log {
            workout,
            day,
            file,
            skip_progression,
        } => cmd_log(&repo, &workout, day, file, skip_progression),
        Commands::Advance { workout } => {
            let (_, week) = repo.update(repo.resolve(&workout)?, |w| w.progress_to_next_week())?;
            println!("✓ Advanced to week {}", week);
            Ok(())
        }
        Commands::Pause { workout } => {
            let (w, _) = repo.update(repo.resolve(&workout)?, |w| w.pause())?;
            println!("✓ {} is {}", w.name(), w.status());
            Ok(())
        }
        Commands::Resume { workout } => {
            let (w, _) = repo.update(repo.resolve(&workout)?, |w| w.set_as_active())?;
            println!("✓ {} is {}", w.name(), w.status());
            Ok(())
        }
        Commands::Substitute {
            workout,
            exercise,
            name,
            external_id,
        } => {
            repo.update(repo.resolve(&workout)?, |w| {
                let id = find_exercise(w, &exercise)?;
                w.substitute_exercise(id, name.clone(), external_id)
            })?;
            println!("✓ {} is now {}", exercise, name);
            Ok(())
        }
        Commands::AdjustTm {
            workout,
            exercise,
            percent,
            absolute,
        } => {
            let adjustment = match (percent, absolute) {
                (Some(p), None) => TrainingMaxAdjustment::Percent(p),
                (None, Some(a)) => TrainingMaxAdjustment::Absolute(a),
                _ => {
                    return Err(Error::Validation(
                        "exactly one of --percent or --absolute is required".into(),
                    ))
                }
            };
            let (_, change) = repo.update(repo.resolve(&workout)?, |w| {
                let id = find_exercise(w, &exercise)?;
                w.adjust_training_max(id, adjustment)
            })?;
            println!("✓ {}: {}", exercise, describe_change(&change));
            Ok(())
        }
        Commands::SetWeight {
            workout,
            exercise,
            weight,
            unit,
        } => {
            let (_, change) = repo.update(repo.resolve(&workout)?, |w| {
                let id = find_exercise(w, &exercise)?;
                let unit = match unit {
                    Some(u) => u,
                    None => w
                        .exercise(id)
                        .and_then(|e| e.progression().current_weight())
                        .map(|cw| cw.unit())
                        .unwrap_or(config.units.default_unit),
                };
                w.adjust_weight(id, Weight::new(weight, unit)?)
            })?;
            println!("✓ {}: {}", exercise, describe_change(&change));
            Ok(())
        }
        Commands::History { workout, json } => cmd_history(&repo, &workout, json),
        Commands::Export { workout, output } => {
            let w = load_workout(&repo, &workout)?;
            let path = output.unwrap_or_else(|| {
                data_dir.join("exports").join(format!("{}.csv", w.id()))
            });
            let count = export_activities_csv(&w, &path)?;
            println!("✓ Exported {} sets", count);
            println!("  CSV: {}", path.display());
            Ok(())
        }
    }
}

fn load_workout(repo: &FileWorkoutRepository, needle: &str) -> Result<Workout> {
    let id = repo.resolve(needle)?;
    repo.load(id)?.ok_or_else(|| Error::NotFound {
        kind: "workout",
        id: id.to_string(),
    })
}

/// Match an exercise by id, id prefix or case-insensitive name
fn find_exercise(workout: &Workout, needle: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(needle) {
        return Ok(id);
    }
    let matches: Vec<Uuid> = workout
        .exercises()
        .iter()
        .filter(|e| e.name().eq_ignore_ascii_case(needle) || e.id().to_string().starts_with(needle))
        .map(|e| e.id())
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(Error::NotFound {
            kind: "exercise",
            id: needle.to_string(),
        }),
        _ => Err(Error::Validation(format!("exercise {} is ambiguous", needle))),
    }
}

fn cmd_init(
    repo: &FileWorkoutRepository,
    config: &Config,
    name: Option<String>,
    days: ProgramVariant,
    template: Option<PathBuf>,
    weeks: Option<u32>,
    user: &str,
) -> Result<()> {
    let mut template = match template {
        Some(path) => ProgramTemplate::load_from(&path)?,
        None => default_template(days).clone(),
    };
    if let Some(name) = name {
        template.name = name;
    }
    if let Some(weeks) = weeks {
        template.total_weeks = weeks;
    }

    let workout = template.build(user, config, Utc::now())?;
    repo.save(&workout)?;

    println!("Created workout {}", workout.id());
    println!("  {} ({}, {} weeks, {} exercises)", workout.name(), workout.variant(), workout.total_weeks(), workout.exercises().len());
    Ok(())
}

fn cmd_list(repo: &FileWorkoutRepository) -> Result<()> {
    let ids = repo.list()?;
    if ids.is_empty() {
        println!("No workouts found.");
        return Ok(());
    }
    for id in ids {
        match repo.load(id)? {
            Some(w) => println!(
                "{}  {:<28} {:<11} week {}/{}",
                w.id(),
                w.name(),
                w.status().to_string(),
                w.current_week(),
                w.total_weeks()
            ),
            None => tracing::warn!("Workout {} disappeared while listing", id),
        }
    }
    Ok(())
}

fn cmd_show(repo: &FileWorkoutRepository, needle: &str, json: bool) -> Result<()> {
    let summary = load_workout(repo, needle)?.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n{} [{}]", summary.name, summary.status);
    println!(
        "  Week {}/{} (block {}){}",
        summary.current_week,
        summary.total_weeks,
        summary.current_block,
        if summary.is_deload_week { " - deload" } else { "" }
    );
    println!("  Intensity: {}%", (summary.week_intensity * Decimal::ONE_HUNDRED).normalize());
    println!("  Next day: {} of {}", summary.current_day, summary.variant_days);
    println!("  Days done this week: {:?}", summary.days_completed_this_week);
    println!();

    for e in &summary.exercises {
        let numbers = match (e.training_max, e.current_weight, e.set_count) {
            (Some(tm), _, _) => format!("TM {}", tm.as_weight()),
            (None, Some(weight), Some(sets)) => format!("{} x {} sets", weight, sets),
            _ => String::new(),
        };
        println!(
            "  Day {} #{} {:<24} {:<14} {}",
            e.day,
            e.order_in_day,
            e.name,
            e.progression.to_string(),
            numbers
        );
    }
    println!();
    Ok(())
}

fn cmd_plan(repo: &FileWorkoutRepository, needle: &str, day: Option<u32>, json: bool) -> Result<()> {
    let workout = load_workout(repo, needle)?;
    let day = day.unwrap_or(workout.current_day());
    let plan = workout.plan_for_day(day)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("\nWeek {} day {}{}", workout.current_week(), day, if workout.is_deload_week() { " (deload)" } else { "" });
    for entry in &plan {
        println!("\n  {}  [{}]", entry.name, entry.exercise_id);
        for set in &entry.sets {
            println!(
                "    {}. {} x {}{}",
                set.set_number(),
                set.weight(),
                set.target_reps(),
                if set.is_amrap() { "+ (AMRAP)" } else { "" }
            );
        }
    }
    println!();
    Ok(())
}

fn cmd_log(
    repo: &FileWorkoutRepository,
    needle: &str,
    day: u32,
    file: PathBuf,
    skip_progression: bool,
) -> Result<()> {
    let contents = std::fs::read_to_string(&file)?;
    let mut logs: Vec<ExerciseLog> = serde_json::from_str(&contents)?;
    if skip_progression {
        for log in &mut logs {
            log.skip_progression = true;
        }
    }

    let (workout, outcome) = repo.update(repo.resolve(needle)?, |w| w.complete_day(day, logs, Utc::now()))?;

    println!("✓ Day {} logged", day);
    for (exercise_id, change) in &outcome.changes {
        let name = workout
            .exercise(*exercise_id)
            .map(|e| e.name().to_string())
            .unwrap_or_else(|| exercise_id.to_string());
        println!("  {}: {}", name, describe_change(change));
    }
    if outcome.program_completed {
        println!("✓ Program completed!");
    } else if outcome.week_advanced {
        println!("✓ Week {} begins", workout.current_week());
    }
    Ok(())
}

fn cmd_history(repo: &FileWorkoutRepository, needle: &str, json: bool) -> Result<()> {
    let workout = load_workout(repo, needle)?;
    if json {
        println!("{}", serde_json::to_string_pretty(workout.activities())?);
        return Ok(());
    }
    if workout.activities().is_empty() {
        println!("No days logged yet.");
        return Ok(());
    }

    for activity in workout.activities() {
        println!(
            "{}  week {} day {}",
            activity.completed_at.format("%Y-%m-%d %H:%M"),
            activity.week_number,
            activity.day
        );
        for performance in &activity.performances {
            let name = workout
                .exercise(performance.exercise_id())
                .map(|e| e.name().to_string())
                .unwrap_or_else(|| performance.exercise_id().to_string());
            let sets: Vec<String> = performance
                .completed_sets()
                .iter()
                .map(|s| format!("{}x{}", s.weight(), s.actual_reps()))
                .collect();
            println!("  {:<24} {}", name, sets.join(", "));
        }
    }
    Ok(())
}

fn describe_change(change: &ProgressionChange) -> String {
    match change {
        ProgressionChange::Unchanged => "unchanged".to_string(),
        ProgressionChange::TrainingMax { from, to } => {
            format!("training max {} -> {}", from.as_weight(), to.as_weight())
        }
        ProgressionChange::Sets { from, to } => format!("sets {} -> {}", from, to),
        ProgressionChange::Weight {
            from,
            to,
            sets_from,
            sets_to,
        } => format!("weight {} -> {}, sets {} -> {}", from, to, sets_from, sets_to),
    }
}
