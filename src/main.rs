mod api;
mod cache;
mod cli;
mod config;
mod dashboard;
mod error;
mod links;
mod models;
mod utils;

use clap::Parser;
use cli::commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(cmd) => cli::handle_command(cmd, cli.config).await,
        None => dashboard::run(cli.config.as_deref())
            .await
            .map_err(Into::into),
    };

    if let Err(e) = result {
        cli::display::print_error(&e.to_string());
        std::process::exit(1);
    }
}
