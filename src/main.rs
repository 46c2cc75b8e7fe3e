use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rl_experiment::checkpoint::ResultsAccumulator;
use rl_experiment::config::AppConfig;
use rl_experiment::runner;

/// Run reinforcement-learning experiments with periodic offline evaluation.
#[derive(Parser)]
#[command(
    name = "rl-experiment",
    about = "Run an RL experiment with periodic evaluation and checkpoints"
)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the total timestep budget
    #[arg(long)]
    total_timesteps: Option<usize>,

    /// Override the number of sequential runs
    #[arg(long)]
    runs: Option<usize>,

    /// Override the results directory
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Append runs to an existing results file instead of starting empty
    #[arg(long)]
    append_to: Option<PathBuf>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config_found = cli.config.exists();
    let mut config = if config_found {
        AppConfig::load(&cli.config)
            .with_context(|| format!("loading config from {}", cli.config.display()))?
    } else {
        AppConfig::default()
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if !config_found {
        warn!(path = %cli.config.display(), "config file not found, using defaults");
    }

    // Apply CLI overrides
    if let Some(total_timesteps) = cli.total_timesteps {
        config.experiment.total_timesteps = total_timesteps;
    }
    if let Some(runs) = cli.runs {
        config.checkpoint.runs = runs;
    }
    if let Some(save_dir) = cli.save_dir {
        config.checkpoint.save_dir = save_dir;
    }
    config.validate().context("validating configuration")?;

    let mut results = match &cli.append_to {
        Some(path) => ResultsAccumulator::load(path)
            .with_context(|| format!("loading results from {}", path.display()))?,
        None => ResultsAccumulator::new(
            runner::experiment_metadata(&config).context("building experiment metadata")?,
        ),
    };

    let path = runner::run_all(&config, &mut results).context("running experiments")?;
    info!(
        runs = config.checkpoint.runs,
        total_runs = results.total_runs(),
        path = %path.display(),
        "experiments finished"
    );

    Ok(())
}
