use std::path::Path;

use crate::api::RenderClient;
use crate::cache::{ResponseCache, DEFAULT_TTL};
use crate::cli::display;
use crate::config::{paths, settings};
use crate::error::RdashError;
use crate::links::{self, DashboardAction};

const USAGE: &str = "Usage: rdash <service> <action>\n\n\
Actions:\n  \
logs      - Open service logs in the browser\n  \
events    - Open service events in the browser\n  \
metrics   - Open service metrics in the browser\n  \
settings  - Open service settings in the browser\n  \
deploys   - Open service deploys in the browser\n  \
status    - Print current service status\n\n\
Pass --no-browser to print the URL instead of launching the browser";

/// Handle `rdash <alias> <action>`, the quick-jump surface.
pub async fn handle(args: Vec<String>, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut no_browser = false;
    let mut words = Vec::new();
    for arg in args {
        if arg == "--no-browser" {
            no_browser = true;
        } else {
            words.push(arg);
        }
    }

    let [alias, action_raw] = words.as_slice() else {
        return Err(RdashError::Config(USAGE.to_string()).into());
    };
    let action_raw = action_raw.to_lowercase();

    let config = settings::load(config_path)?;
    let service_config = match settings::find_service_by_alias(&config.services, alias)? {
        Some(svc) => svc,
        None => {
            println!("No service found matching '{}'", alias);
            println!();
            println!("Available services:");
            for svc in &config.services {
                let aliases = if svc.aliases.is_empty() {
                    "no aliases".to_string()
                } else {
                    svc.aliases.join(", ")
                };
                println!("  {} ({})", svc.name, aliases);
            }
            return Err(RdashError::ServiceNotFound(alias.clone()).into());
        }
    };

    if action_raw == "status" {
        let cache = ResponseCache::new(paths::cache_dir(), DEFAULT_TTL);
        let client = RenderClient::new(&config.api_key, &config.credential_source, cache)?;
        let service = client.get_service_with_deploy(&service_config.id).await?;
        display::print_service_status(&service);
        return Ok(());
    }

    let Some(action) = DashboardAction::parse(&action_raw) else {
        return Err(RdashError::Config(format!(
            "Invalid action '{}'. Valid actions: logs, events, metrics, settings, deploys, status",
            action_raw
        ))
        .into());
    };

    let url = links::service_url(&service_config.id, action);

    if no_browser {
        println!("{}", url);
        return Ok(());
    }

    if links::open_in_browser(&url) {
        println!("Opening {} for {}...", action.label(), service_config.name);
        println!("URL: {}", url);
    } else {
        println!("Could not open a browser. Open this URL manually:");
        println!("{}", url);
    }
    Ok(())
}
