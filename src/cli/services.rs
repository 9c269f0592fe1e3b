use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::path::Path;

use crate::api::RenderClient;
use crate::cache::{ResponseCache, DEFAULT_TTL};
use crate::cli::display;
use crate::config::{paths, settings, ServiceConfig};
use crate::error::RdashError;
use crate::models::Service;
use crate::utils;

const SEARCH_LIMIT: u32 = 100;

fn open_client(config: &settings::AppConfig) -> Result<RenderClient, RdashError> {
    let cache = ResponseCache::new(paths::cache_dir(), DEFAULT_TTL);
    RenderClient::new(&config.api_key, &config.credential_source, cache)
}

/// `rdash service add <term>`: look up a service on the account and record
/// it in the config with user-chosen aliases.
pub async fn add(term: &str, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = settings::load_allow_empty(config_path)?;
    let client = open_client(&config)?;

    let matches: Vec<Service> = if term.starts_with("srv-") {
        println!("Looking up service {}...", term);
        vec![client.get_service(term).await?]
    } else {
        println!("Searching for services matching '{}'...", term);
        let all = client.list_services(SEARCH_LIMIT, true).await?;
        if all.is_empty() {
            return Err(RdashError::Config(
                "No services found in your Render account".to_string(),
            )
            .into());
        }

        let needle = term.to_lowercase();
        let found: Vec<Service> = all
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&needle) || s.id.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        if found.is_empty() {
            println!();
            println!("Available services:");
            for svc in all.iter().take(10) {
                println!("  {} ({})", svc.name, svc.id);
            }
            if all.len() > 10 {
                println!("  ... and {} more", all.len() - 10);
            }
            println!();
            println!("Or add by id directly: rdash service add srv-xxxxxxxxxxxxx");
            return Err(RdashError::ServiceNotFound(term.to_string()).into());
        }
        found
    };

    let mut matches = matches;
    let service = if matches.len() == 1 {
        matches.remove(0)
    } else {
        let options: Vec<String> = matches
            .iter()
            .map(|s| format!("{} ({}) - {}", s.name, s.id, s.service_type))
            .collect();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select a service")
            .items(&options)
            .default(0)
            .interact()?;
        matches.remove(selection)
    };

    println!();
    println!("Found: {} ({})", style(&service.name).bold(), service.id);

    let default_alias = utils::slugify(&service.name);
    let primary: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Alias for this service")
        .default(default_alias)
        .interact_text()?;

    let additional: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Additional aliases (comma-separated, empty to skip)")
        .allow_empty(true)
        .interact_text()?;

    let mut aliases = vec![primary.clone()];
    aliases.extend(
        additional
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
    );

    settings::add_service(
        config_path,
        ServiceConfig {
            id: service.id.clone(),
            name: service.name.clone(),
            aliases,
            priority: 1,
        },
    )?;

    display::print_success(&format!("Added {} to the config", service.name));
    println!();
    println!("You can now use:");
    println!("  rdash {} logs", primary);
    println!("  rdash {} status", primary);
    Ok(())
}

pub fn list(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = settings::load_allow_empty(config_path)?;
    if config.services.is_empty() {
        println!("  {}", style("No services configured.").dim());
        println!("  Add one with: rdash service add <name>");
        return Ok(());
    }

    let mut services = config.services;
    services.sort_by_key(|s| s.priority);
    display::print_service_configs(&services);
    Ok(())
}

/// `rdash service remove <alias>`: exact alias or id match, with a
/// confirmation prompt before the config is rewritten.
pub async fn remove(alias: &str, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = settings::load_allow_empty(config_path)?;
    let needle = alias.to_lowercase();

    let service = config
        .services
        .iter()
        .find(|s| s.id == alias || s.aliases.iter().any(|a| a.to_lowercase() == needle))
        .ok_or_else(|| RdashError::ServiceNotFound(alias.to_string()))?;

    let confirm = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Remove {} ({})?", service.name, service.id))
        .default(false)
        .interact()?;

    if !confirm {
        println!("  Cancelled.");
        return Ok(());
    }

    settings::remove_service(config_path, &service.id)?;
    display::print_success(&format!("Removed {} from the config", service.name));
    Ok(())
}
