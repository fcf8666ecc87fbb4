//! CLI module for the application key manager
//!
//! Provides subcommands:
//! - `migrate`: apply or revert the database schema
//! - `generate`: generate a key pair offline and print it
//! - `keys`: list, add and delete the keys of an application

pub mod generate;
pub mod keys;
pub mod migrate;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// Application keys - SSH and PGP key lifecycle for applications
#[derive(Parser)]
#[command(name = "application-keys")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply pending schema migrations, or revert the latest one
    Migrate(migrate::MigrateArgs),

    /// Generate a key pair without storing it
    Generate(generate::GenerateArgs),

    /// Manage the keys of an application
    Keys(keys::KeysArgs),
}

/// Load configuration and install logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    let config = AppConfig::load()?;
    init_logging(&config.logging);
    Ok(config)
}
