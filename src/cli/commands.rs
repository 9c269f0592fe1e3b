use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rdash",
    about = "Terminal dashboard and CLI shortcuts for Render services",
    version
)]
pub struct Cli {
    /// Path to config.toml (defaults to ~/.config/rdash/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the tracked-service list
    Service {
        #[command(subcommand)]
        action: ServiceCommand,
    },

    /// `rdash <alias> <action>`: jump straight to a service page
    /// (logs, events, metrics, settings, deploys) or print its status
    #[command(external_subcommand)]
    Shortcut(Vec<String>),
}

#[derive(Subcommand)]
pub enum ServiceCommand {
    /// Search by name (or look up a srv- id) and add it to the config
    Add {
        /// Service name, partial name, or srv- id
        term: String,
    },

    /// List configured services
    List,

    /// Remove a service from the config
    Remove {
        /// Service alias or id
        alias: String,
    },
}
