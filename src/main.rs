use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use localcast::{
    Coordinate, PodcastConfig, PodcastService, PromptAssembler, Providers, telemetry, web,
};

#[derive(Parser)]
#[command(
    name = "localcast",
    version,
    about = "Generates a short spoken podcast about the area around a coordinate"
)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the API and the frontend
    Serve {
        /// Overrides server.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the prompt document assembled for a coordinate
    Prompt {
        #[arg(long, default_value_t = 51.5074, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, default_value_t = -0.1278, allow_hyphen_values = true)]
        longitude: f64,
        /// Seed for category choice and sampling
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = PodcastConfig::load_from_path(cli.config)?;
    let _telemetry = telemetry::init(&config.logging, &config.telemetry)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            config.require_api_keys()?;
            let service = Arc::new(PodcastService::from_config(&config)?);
            web::run(&config, service).await
        }
        Command::Prompt {
            latitude,
            longitude,
            seed,
        } => {
            let coordinate = Coordinate::new(latitude, longitude)?;
            let mut assembler = PromptAssembler::new(Providers::from_config(&config)?);
            if let Some(seed) = seed {
                assembler = assembler.with_seed(seed);
            }
            let prompt = assembler.build_prompt(&coordinate, config.timezone()?).await;
            println!("{prompt}");
            Ok(())
        }
    }
}
