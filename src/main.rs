//! dogfit - guided exercise playback for dog fitness sessions

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use tracing::{Level, info};

use dogfit::db::Database;
use dogfit::error::PlaybackError;
use dogfit::exercises::{Difficulty, Exercise};
use dogfit::history::{DateFilter, HistoryEntry, StampCard, filter_history, total_minutes};
use dogfit::playback::{Presets, assemble};
use dogfit::profile::{ActivityLevel, DogProfile};
use dogfit::recommend::{self, LocalGenerator, RecommendationGenerator, Sources, parse_recommendations};
use dogfit::tui::{PlayOutcome, PlayerApp};

#[derive(Parser)]
#[command(name = "dogfit")]
#[command(author, version, about = "Guided fitness sessions for your dog")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "DOGFIT_DB", default_value = "dogfit.db")]
    db: String,

    /// JSON file with default warmup/cooldown steps
    #[arg(long, global = true, env = "DOGFIT_PRESETS")]
    presets: Option<PathBuf>,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage dog profiles
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Replace the selected dog's recommendations with a generator response file
    Import {
        file: PathBuf,
    },

    /// Manage custom exercises
    #[command(subcommand)]
    Custom(CustomCommand),

    /// List exercises for the selected dog
    List,

    /// Show exercise details
    Show {
        id: String,
    },

    /// Play an exercise step by step
    Play {
        id: String,

        /// Start at the first main step
        #[arg(long)]
        skip_warmup: bool,
    },

    /// Completed sessions for the selected dog
    History {
        /// all, today, week or month
        #[arg(long, default_value = "all")]
        period: DateFilter,

        /// easy, medium or hard
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },

    /// Stamp card
    Stamps,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Create a profile and select it
    Add {
        name: String,

        #[arg(long, default_value = "12")]
        age_months: u32,

        #[arg(long, default_value = "")]
        sex: String,

        #[arg(long, default_value = "")]
        breed: String,

        #[arg(long, default_value = "10.0")]
        weight: f64,

        /// low, medium or high
        #[arg(long, default_value = "medium")]
        activity: ActivityLevel,

        /// Health issue tag, repeatable (e.g. --health joint)
        #[arg(long = "health")]
        health_issues: Vec<String>,

        /// Available equipment, repeatable
        #[arg(long)]
        equipment: Vec<String>,
    },

    /// List profiles
    List,

    /// Select the active profile
    Select {
        id: i64,
    },

    /// Delete a profile with its exercises and history
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum CustomCommand {
    /// Add exercises from a JSON file (single object or list)
    Add {
        file: PathBuf,
    },

    /// Delete a custom exercise
    Delete {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // stdout belongs to the playback view
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let db = Database::open(&cli.db)?;

    match cli.command {
        Some(Commands::Profile(cmd)) => run_profile(&db, cmd)?,

        Some(Commands::Import { file }) => {
            let profile = require_profile(&db)?;
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let import = parse_recommendations(&text)?;
            let stored = db.replace_recommendations(profile_id(&profile)?, &import.exercises)?;
            println!("Imported {} exercises for {}", stored, profile.name);
            if let Some(summary) = import.summary {
                println!("\n{}", summary);
            }
        }

        Some(Commands::Custom(CustomCommand::Add { file })) => {
            let profile = require_profile(&db)?;
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let import = parse_recommendations(&text)?;
            for exercise in &import.exercises {
                db.add_custom_exercise(profile_id(&profile)?, exercise)?;
                println!("Added custom exercise: {} (id: {})", exercise.name, exercise.id);
            }
        }

        Some(Commands::Custom(CustomCommand::Delete { id })) => {
            let profile = require_profile(&db)?;
            if db.delete_custom_exercise(profile_id(&profile)?, &id)? {
                println!("Deleted custom exercise {}", id);
            } else {
                println!("No custom exercise with id {}", id);
            }
        }

        Some(Commands::Show { id }) => {
            let exercise = resolve_or_explain(&db, &id)?;
            print_exercise(&exercise);
        }

        Some(Commands::Play { id, skip_warmup }) => {
            let presets = Presets::load_or_default(cli.presets.as_deref())?;
            play(&db, &presets, &id, skip_warmup)?;
        }

        Some(Commands::History { period, difficulty }) => {
            let profile = require_profile(&db)?;
            let entries = db.get_history(profile_id(&profile)?)?;
            let filtered = filter_history(&entries, period, difficulty, Local::now());

            println!("History for {}", profile.name);
            println!("{:-<60}", "");
            for e in &filtered {
                println!(
                    "{} | {:24} | {:6} | {:3} min{}",
                    e.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    e.exercise_name,
                    e.difficulty.label(),
                    e.duration_minutes,
                    if e.is_custom { " | custom" } else { "" }
                );
            }
            println!("{:-<60}", "");
            println!("{} sessions, {} minutes", filtered.len(), total_minutes(&filtered));
        }

        Some(Commands::Stamps) => print_stamps(StampCard::new(db.get_stamps()?)),

        Some(Commands::List) | None => list_exercises(&db)?,
    }

    Ok(())
}

fn run_profile(db: &Database, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Add {
            name,
            age_months,
            sex,
            breed,
            weight,
            activity,
            health_issues,
            equipment,
        } => {
            let profile = DogProfile {
                id: None,
                name: name.clone(),
                age_months,
                sex,
                breed,
                weight_kg: weight,
                activity_level: activity,
                health_issues,
                equipment,
                ..Default::default()
            };
            let id = db.save_profile(&profile)?;
            db.set_selected_profile(Some(id))?;
            println!("Created profile {} (id: {}), now selected", name, id);
        }

        ProfileCommand::List => {
            let selected = db.selected_profile()?;
            let profiles = db.list_profiles()?;
            if profiles.is_empty() {
                println!("No profiles yet. Create one with `dogfit profile add <name>`.");
            }
            for p in profiles {
                let (years, months) = p.age_years_months();
                println!(
                    "{} {:>3} | {:16} | {}y {}m | {:.1} kg | activity {}",
                    if p.id == selected { "*" } else { " " },
                    p.id.unwrap_or_default(),
                    p.name,
                    years,
                    months,
                    p.weight_kg,
                    p.activity_level.label()
                );
            }
        }

        ProfileCommand::Select { id } => {
            let Some(profile) = db.get_profile(id)? else {
                bail!("no profile with id {}", id);
            };
            db.set_selected_profile(Some(id))?;
            println!("Selected {}", profile.name);
        }

        ProfileCommand::Delete { id } => {
            if db.delete_profile(id)? {
                println!("Deleted profile {}", id);
            } else {
                println!("No profile with id {}", id);
            }
        }
    }
    Ok(())
}

fn selected_profile(db: &Database) -> Result<Option<DogProfile>> {
    match db.selected_profile()? {
        Some(id) => db.get_profile(id),
        None => Ok(None),
    }
}

fn require_profile(db: &Database) -> Result<DogProfile> {
    match selected_profile(db)? {
        Some(profile) => Ok(profile),
        None => bail!("no dog profile selected; create one with `dogfit profile add <name>`"),
    }
}

fn profile_id(profile: &DogProfile) -> Result<i64> {
    profile.id.context("profile has no id")
}

/// Look up `id` across the selected dog's pools and the local generator
fn resolve_exercise(db: &Database, id: &str) -> Result<Result<Exercise, PlaybackError>> {
    let profile = selected_profile(db)?;
    let (fetched, custom) = match profile.as_ref().and_then(|p| p.id) {
        Some(pid) => (db.get_recommendations(pid)?, db.get_custom_exercises(pid)?),
        None => (Vec::new(), Vec::new()),
    };

    let sources = Sources {
        fetched: &fetched,
        custom: &custom,
        fallback_profile: profile.as_ref(),
    };
    Ok(recommend::resolve(id, &sources, &LocalGenerator).map(|resolved| {
        info!("resolved {} from {:?}", resolved.exercise.id, resolved.origin);
        resolved.exercise
    }))
}

fn resolve_or_explain(db: &Database, id: &str) -> Result<Exercise> {
    match resolve_exercise(db, id)? {
        Ok(exercise) => Ok(exercise),
        Err(err) => bail!("{}", err.hint()),
    }
}

fn play(db: &Database, presets: &Presets, id: &str, skip_warmup: bool) -> Result<()> {
    let exercise = resolve_or_explain(db, id)?;
    let session = match assemble(&exercise, skip_warmup, &presets.warmup, &presets.cooldown) {
        Ok(session) => session,
        Err(err) => bail!("{}", err.hint()),
    };

    let mut app = PlayerApp::new(exercise.clone(), session);
    if app.run()? == PlayOutcome::Abandoned {
        println!("Session stopped early, nothing recorded.");
        return Ok(());
    }

    match selected_profile(db)?.and_then(|p| HistoryEntry::from_completion(&exercise, &p, Utc::now())) {
        Some(entry) => {
            db.add_history(&entry)?;
        }
        None => println!("No profile selected, session not added to history."),
    }

    let card = StampCard::new(db.add_stamp()?);
    println!("Completed: {}", exercise.name);
    print_stamps(card);
    Ok(())
}

fn list_exercises(db: &Database) -> Result<()> {
    let Some(profile) = selected_profile(db)? else {
        println!("No dog profile selected. Create one with `dogfit profile add <name>`.");
        return Ok(());
    };
    let pid = profile_id(&profile)?;

    let mut fetched = db.get_recommendations(pid)?;
    let custom = db.get_custom_exercises(pid)?;
    let generated = fetched.is_empty();
    if generated {
        fetched = LocalGenerator.generate(&profile);
    }

    println!("Exercises for {}", profile.name);
    println!("{:-<60}", "");
    if generated {
        println!("(no imported recommendations, showing generated suggestions)");
    }
    for e in fetched.iter().chain(custom.iter()) {
        println!(
            "{:>16} | {:24} | {:6} | {:3} min{}",
            e.id,
            e.name,
            e.difficulty.label(),
            e.duration_minutes,
            if e.is_custom { " | custom" } else { "" }
        );
    }
    Ok(())
}

fn print_exercise(exercise: &Exercise) {
    println!("{} ({})", exercise.name, exercise.id);
    println!("{:-<60}", "");
    if !exercise.description.is_empty() {
        println!("{}\n", exercise.description);
    }
    println!("Difficulty: {}", exercise.difficulty.label());
    println!("Duration:   {} min", exercise.duration_minutes);
    if !exercise.equipment.is_empty() {
        println!("Equipment:  {}", exercise.equipment.join(", "));
    }

    print_list("Warmup", &exercise.warmup_steps);
    println!("\nSteps:");
    for (i, step) in exercise.steps.iter().enumerate() {
        println!("  {:>2}. {} ({}s)", i + 1, step.text, step.duration_seconds);
    }
    print_list("Cooldown", &exercise.cooldown_steps);
    print_list("Benefits", &exercise.benefits);

    let total = exercise.total_duration_seconds();
    println!("\nTotal step time: {}m {:02}s", total / 60, total % 60);
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{}:", title);
    for item in items {
        println!("  - {}", item);
    }
}

fn print_stamps(card: StampCard) {
    println!("Stamps: {}", card.count);
    if card.has_badge() {
        println!("Badge unlocked!");
    } else {
        println!("{} more for the badge", card.remaining_for_badge());
    }
}
