//! Swarm CLI - runs the cube swarm headless and reports on it

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, run, OutputFormat};

#[derive(Parser)]
#[command(name = "swarm")]
#[command(about = "Simulate a large swarm of bouncing cubes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spawn the swarm and run the frame loop
    Run {
        /// Path to a swarm.toml config file
        #[arg(long)]
        config: Option<String>,

        /// Number of particles
        #[arg(long)]
        count: Option<usize>,

        /// Frames to simulate before exiting
        #[arg(long, default_value = "600")]
        frames: u64,

        /// Seed for a reproducible population
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads for the physics passes (0 = one per core)
        #[arg(long)]
        threads: Option<usize>,

        /// Write the per-particle color lookup to this PNG
        #[arg(long)]
        dump_colors: Option<String>,

        /// Summary format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Ignore the frame-rate cap
        #[arg(long)]
        uncapped: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Path to a swarm.toml config file (defaults otherwise)
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            count,
            frames,
            seed,
            threads,
            dump_colors,
            format,
            uncapped,
        } => run::run(run::RunArgs {
            config,
            count,
            frames,
            seed,
            threads,
            dump_colors,
            format,
            uncapped,
        }),
        Commands::Config { config } => config::run(config.as_deref()),
    }
}
