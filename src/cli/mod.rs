pub mod commands;
pub mod display;
pub mod services;
pub mod shortcut;

use std::path::PathBuf;

use crate::cli::commands::{Commands, ServiceCommand};

/// Route a parsed CLI subcommand to its handler.
pub async fn handle_command(cmd: Commands, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    match cmd {
        Commands::Service { action } => match action {
            ServiceCommand::Add { term } => services::add(&term, config_path.as_deref()).await,
            ServiceCommand::List => services::list(config_path.as_deref()),
            ServiceCommand::Remove { alias } => {
                services::remove(&alias, config_path.as_deref()).await
            }
        },
        Commands::Shortcut(args) => shortcut::handle(args, config_path.as_deref()).await,
    }
}
