//! Config command — prints the effective configuration

use super::load_config;
use anyhow::{Context, Result};

pub fn run(path: Option<&str>) -> Result<()> {
    let config = load_config(path)?;
    let text = config
        .to_toml_string()
        .context("Failed to serialize configuration")?;
    print!("{}", text);
    Ok(())
}
