//! Command-line argument parsing
//!
//! Supports:
//! - Replaying a scripted signal session against an in-memory surface
//! - Printing the config file location and effective config

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trigger-character signals for editable surfaces
#[derive(Parser, Debug)]
#[command(name = "sigil", version, about = "Trigger-character signals for editable surfaces")]
pub struct CliArgs {
    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replay a YAML script and print the resulting surface content
    Replay {
        /// Script to replay
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Print the outcome as JSON (content, tokens, session state)
        #[arg(long)]
        json: bool,
    },
    /// Print the config path and the effective config
    Config,
}

/// What the binary should do, after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupMode {
    Replay { script: PathBuf, json: bool },
    ShowConfig,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub mode: StartupMode,
    /// Explicit config file, if given
    pub config_path: Option<PathBuf>,
}

impl CliArgs {
    /// Convert parsed CLI args into startup configuration
    pub fn into_config(self) -> Result<StartupConfig, String> {
        if let Some(path) = &self.config {
            if path.is_dir() {
                return Err(format!("config path is a directory: {}", path.display()));
            }
        }

        let mode = match self.command {
            Command::Replay { script, json } => {
                if script.is_dir() {
                    return Err(format!("replay script is a directory: {}", script.display()));
                }
                StartupMode::Replay { script, json }
            }
            Command::Config => StartupMode::ShowConfig,
        };

        Ok(StartupConfig {
            mode,
            config_path: self.config,
        })
    }
}
