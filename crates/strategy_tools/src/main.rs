//! Strategy Core - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strategy_tools::simulate::{self, SimulationConfig, StageKind};
use strategy_tools::validate::{load_data_file, validate_data_path};
use strategy_tools::ToolError;

#[derive(Parser)]
#[command(name = "strategy-tools")]
#[command(about = "Development tools for the strategic simulation core")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate game data files
    Validate {
        /// Data file, or directory of .ron files
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },

    /// Run a stage headless and print a JSON summary
    Simulate {
        /// Game data file
        #[arg(default_value = "assets/data/game_data.ron")]
        file: PathBuf,

        /// Stage to run
        #[arg(short, long, value_enum, default_value = "society")]
        stage: StageKind,

        /// Number of frames
        #[arg(short, long, default_value = "600")]
        frames: u32,

        /// Seconds per frame
        #[arg(short, long, default_value = "0.1")]
        delta: f32,

        /// Structures standing at the start (society stage, repeatable)
        #[arg(long = "prebuilt")]
        prebuilt: Vec<String>,

        /// Starting amount of every resource
        #[arg(long, default_value = "0")]
        stock: f32,

        /// Technology to research from the start
        #[arg(long)]
        research: Option<String>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), ToolError> {
    match command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {}", path.display());
            let files = validate_data_path(&path)?;
            tracing::info!(files = files.len(), "Validation passed");
        }
        Commands::Simulate {
            file,
            stage,
            frames,
            delta,
            prebuilt,
            stock,
            research,
        } => {
            let data = load_data_file(&file)?;
            let config = SimulationConfig {
                stage,
                frames,
                delta,
                prebuilt,
                stock,
                research,
            };

            let summary = simulate::run(data, &config)?;
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{json}");
        }
    }
    Ok(())
}
