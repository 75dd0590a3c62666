use gymlog_core::api::{self, AppState};
use gymlog_core::*;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gymlog")]
#[command(about = "Workout tracking server with AI coaching", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server (default)
    Serve {
        /// Override the configured listen host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// List the exercise catalog
    Exercises {
        /// Match against name or target muscle (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Exact category, or "all"
        #[arg(long)]
        category: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show progress stats for the configured user
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_path) = match cli.config {
        Some(path) => (Config::load_from(&path)?, Some(path)),
        None => Config::load()?,
    };

    gymlog_core::logging::init(&config.logging);

    match &config_path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("No config file found, using defaults"),
    }

    let errors = validate_seed_exercises(seed_exercises());
    if !errors.is_empty() {
        eprintln!("Exercise catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Other("Invalid exercise catalog".into()));
    }

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(config, host, port),
        Some(Commands::Exercises {
            search,
            category,
            json,
        }) => cmd_exercises(ExerciseFilter { search, category }, json),
        Some(Commands::Stats { json }) => cmd_stats(&config, json),
        None => {
            // Default to "serve" command
            cmd_serve(config, None, None)
        }
    }
}

fn cmd_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let advisor = FallbackAdvisor::from_config(&config.advice)?;
    let state = AppState::new(
        SharedStore::new(MemStore::new()),
        advisor,
        config.server.user_id.clone(),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(&config.server, state))
}

fn cmd_exercises(filter: ExerciseFilter, json: bool) -> Result<()> {
    let exercises = MemStore::new().list_exercises(&filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&exercises)?);
        return Ok(());
    }

    if exercises.is_empty() {
        println!("No exercises match.");
        return Ok(());
    }

    println!(
        "{:<16} {:<10} {:<13} {}",
        "NAME", "CATEGORY", "DIFFICULTY", "EQUIPMENT"
    );
    for exercise in &exercises {
        println!(
            "{:<16} {:<10} {:<13} {}",
            exercise.name, exercise.category, exercise.difficulty, exercise.equipment
        );
        if let Some(muscles) = &exercise.target_muscles {
            println!("  → {}", muscles.join(", "));
        }
    }

    Ok(())
}

fn cmd_stats(config: &Config, json: bool) -> Result<()> {
    let stats = MemStore::new().user_stats(&config.server.user_id);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    display_stats(&config.server.user_id, &stats);
    Ok(())
}

fn display_stats(user_id: &str, stats: &UserStats) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PROGRESS FOR {}", user_id);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Weekly workouts:     {}", stats.weekly_workouts);
    println!("  Total weight lifted: {} lbs", stats.total_weight);
    println!("  Current streak:      {} days", stats.streak);
    println!();

    for day in &stats.weekly_progress {
        let bar = "█".repeat((day.duration.max(0) / 10) as usize);
        println!("  {:<4} {:>4} min {}", day.day, day.duration, bar);
    }

    println!();
}
