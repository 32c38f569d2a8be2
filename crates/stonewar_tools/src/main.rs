//! Stonewar - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stonewar-tools")]
#[command(about = "Development tools for Stonewar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate battle config files
    Validate {
        /// Config file or directory of .ron files
        #[arg(default_value = "assets/config")]
        path: PathBuf,
    },
    /// Show how a silo pays for a composition
    Transmute {
        /// Silo contents as earth,fire,ice,wind
        #[arg(long)]
        silo: String,
        /// Needed composition as earth,fire,ice,wind
        #[arg(long)]
        need: String,
    },
    /// Summarize a stored battle log
    Inspect {
        /// Path to a bincode battle log
        path: PathBuf,
    },
    /// Run a two-unit battle where everyone passes
    PassBattle {
        /// Battle config to play under
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn run(command: Commands) -> stonewar_tools::Result<()> {
    match command {
        Commands::Validate { path } => {
            tracing::info!("Validating config files in: {}", path.display());
            let files = stonewar_tools::validate::validate_data_path(&path)?;
            tracing::info!(files = files.len(), "Validation passed");
        }
        Commands::Transmute { silo, need } => {
            let silo = stonewar_tools::transmute::parse_composition(&silo)?;
            let need = stonewar_tools::transmute::parse_composition(&need)?;
            println!("{}", stonewar_tools::transmute::describe_plan(silo, need)?);
        }
        Commands::Inspect { path } => {
            let log = stonewar_tools::inspect::load_log(&path)?;
            println!("{}", stonewar_tools::inspect::summarize(&log));
        }
        Commands::PassBattle { config } => {
            let config = match config {
                Some(path) => stonewar_tools::validate::validate_config_file(&path)?,
                None => stonewar_core::config::BattleConfig::default(),
            };
            println!("{}", stonewar_tools::pass_battle::run_pass_battle(config)?);
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
