pub const DASHBOARD_BASE_URL: &str = "https://dashboard.render.com";

/// Pages on the hosted dashboard we can deep-link into for a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    Logs,
    Events,
    Metrics,
    Settings,
    Deploys,
    EnvVars,
}

impl DashboardAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "logs" => Some(DashboardAction::Logs),
            "events" => Some(DashboardAction::Events),
            "metrics" => Some(DashboardAction::Metrics),
            "settings" => Some(DashboardAction::Settings),
            "deploys" => Some(DashboardAction::Deploys),
            "env" | "env_vars" => Some(DashboardAction::EnvVars),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DashboardAction::Logs => "logs",
            DashboardAction::Events => "events",
            DashboardAction::Metrics => "metrics",
            DashboardAction::Settings => "settings",
            DashboardAction::Deploys => "deploys",
            DashboardAction::EnvVars => "env vars",
        }
    }

    // The settings page is the service root; env vars live under /env.
    fn suffix(&self) -> &'static str {
        match self {
            DashboardAction::Logs => "/logs",
            DashboardAction::Events => "/events",
            DashboardAction::Metrics => "/metrics",
            DashboardAction::Settings => "",
            DashboardAction::Deploys => "/deploys",
            DashboardAction::EnvVars => "/env",
        }
    }
}

pub fn service_url(service_id: &str, action: DashboardAction) -> String {
    format!(
        "{}/web/{}{}",
        DASHBOARD_BASE_URL,
        service_id,
        action.suffix()
    )
}

/// Launch the default browser. Failure is reported, not fatal; callers print
/// the URL so the user can open it by hand.
pub fn open_in_browser(url: &str) -> bool {
    webbrowser::open(url).is_ok()
}
