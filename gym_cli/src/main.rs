mod render;
mod shell;

use clap::{Parser, Subcommand};
use gym_core::*;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gymtrack")]
#[command(about = "Gym workout log with estimated one-rep max tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (default)
    Shell,

    /// Estimate a one-rep max without logging anything
    Estimate {
        /// Weight lifted in kg
        #[arg(long)]
        weight: f64,

        /// Repetitions performed
        #[arg(long)]
        reps: u32,
    },

    /// Show the active configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    gym_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Shell) | None => cmd_shell(data_dir, &config),
        Some(Commands::Estimate { weight, reps }) => cmd_estimate(weight, reps),
        Some(Commands::Config { init }) => cmd_config(&config, init),
    }
}

fn cmd_shell(data_dir: PathBuf, config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let today = chrono::Local::now().date_naive();

    let mut shell = shell::Shell::new(stdin.lock(), stdout.lock(), data_dir, config, today)?;
    shell.run()
}

fn cmd_estimate(weight: f64, reps: u32) -> Result<()> {
    validate_set(weight, reps)?;

    let estimate = estimate_one_rep_max(weight, reps);
    println!(
        "Estimated 1RM for {} kg x {}: {} kg",
        render::kg(weight),
        reps,
        render::kg(estimate)
    );
    Ok(())
}

fn cmd_config(config: &Config, init: bool) -> Result<()> {
    let path = Config::default_config_path();

    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            config.save()?;
            println!("✓ Wrote default config to {}", path.display());
        }
    }

    println!("Config file: {}", path.display());
    println!("  data_dir:       {}", config.data.data_dir.display());
    println!(
        "  calendar years: {}-{}",
        config.calendar.first_year, config.calendar.last_year
    );
    Ok(())
}
