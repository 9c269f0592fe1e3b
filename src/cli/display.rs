use console::style;

use crate::config::ServiceConfig;
use crate::models::{Service, ServiceStatus};
use crate::utils;

pub fn print_success(msg: &str) {
    println!("  {} {}", style("OK").green().bold(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("  {} {}", style("ERROR").red().bold(), msg);
}

pub fn format_status(status: ServiceStatus) -> String {
    match status {
        ServiceStatus::Available => style("Available").green().to_string(),
        ServiceStatus::Deploying => style("Deploying").yellow().to_string(),
        ServiceStatus::Failed => style("Failed").red().bold().to_string(),
        ServiceStatus::Suspended => style("Suspended").dim().to_string(),
        ServiceStatus::Unknown => style("Unknown").to_string(),
    }
}

/// Detailed status block for `rdash <alias> status`.
pub fn print_service_status(service: &Service) {
    println!();
    println!(
        "  {} {}",
        format_status(service.status),
        style(&service.name).bold()
    );
    println!("  {} {}", style("Type:").dim(), service.service_type);
    if let Some(url) = service.display_url() {
        println!("  {} {}", style("URL:").dim(), url);
    }

    match &service.latest_deploy {
        None => println!("  {} none", style("Deploys:").dim()),
        Some(deploy) => {
            println!(
                "  {} {} ({})",
                style("Deploy:").dim(),
                deploy.status,
                utils::time_ago(deploy.created_at)
            );
            if let Some(message) = &deploy.commit_message {
                println!("  {} {}", style("Commit:").dim(), message.lines().next().unwrap_or(""));
            }
            if let (Some(sha), Some(url)) = (&deploy.commit_sha, deploy.commit_url()) {
                println!(
                    "  {} {} - {}",
                    style("Change:").dim(),
                    utils::short_sha(sha),
                    url
                );
            }
        }
    }
    println!();
}

pub fn print_service_configs(services: &[ServiceConfig]) {
    println!();
    println!("  Configured services ({}):", services.len());
    println!();
    for svc in services {
        let aliases = if svc.aliases.is_empty() {
            "no aliases".to_string()
        } else {
            svc.aliases.join(", ")
        };
        println!("  {}", style(&svc.name).bold());
        println!("    {} {}", style("ID:").dim(), svc.id);
        println!("    {} {}", style("Aliases:").dim(), aliases);
        println!();
    }
}
