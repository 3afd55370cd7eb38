//! CLI command implementations

pub mod config;
pub mod run;

use anyhow::{Context, Result};
use swarm_particles::SwarmConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Load `path`, or fall back to defaults
pub fn load_config(path: Option<&str>) -> Result<SwarmConfig> {
    match path {
        Some(path) => SwarmConfig::load(path).context(format!("Failed to load config from {}", path)),
        None => Ok(SwarmConfig::default()),
    }
}
