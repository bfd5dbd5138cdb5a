//! CLI module for the cache registry
//!
//! Provides subcommands for exercising the configured providers:
//! - `demo`: write and read back a value through every provider
//! - `check`: construct every provider and report failures

pub mod check;
pub mod demo;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Cache Registry - named in-process and distributed cache providers
#[derive(Parser)]
#[command(name = "cache-registry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Round-trip a short-lived value through every configured provider
    Demo(demo::DemoArgs),

    /// Construct every configured provider and report which ones failed
    Check,
}

/// Loads `.env`, configuration and logging shared by every subcommand
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}
