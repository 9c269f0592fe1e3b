use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Available,
    Deploying,
    Suspended,
    Failed,
    Unknown,
}

impl ServiceStatus {
    /// Map a raw API status string onto the enum. Unrecognized values become
    /// `Unknown` rather than failing the whole payload.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "available" => ServiceStatus::Available,
            "deploying" => ServiceStatus::Deploying,
            "suspended" => ServiceStatus::Suspended,
            "failed" | "unavailable" => ServiceStatus::Failed,
            _ => ServiceStatus::Unknown,
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Available => write!(f, "Available"),
            ServiceStatus::Deploying => write!(f, "Deploying"),
            ServiceStatus::Suspended => write!(f, "Suspended"),
            ServiceStatus::Failed => write!(f, "Failed"),
            ServiceStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeployStatus {
    Live,
    BuildFailed,
    Canceled,
    Created,
    BuildInProgress,
    UpdateInProgress,
    Deactivated,
}

impl DeployStatus {
    /// Unrecognized values fall back to `Created`, the conservative
    /// "not yet known" state.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "live" => DeployStatus::Live,
            "build_failed" => DeployStatus::BuildFailed,
            "canceled" => DeployStatus::Canceled,
            "created" => DeployStatus::Created,
            "build_in_progress" => DeployStatus::BuildInProgress,
            "update_in_progress" => DeployStatus::UpdateInProgress,
            "deactivated" => DeployStatus::Deactivated,
            _ => DeployStatus::Created,
        }
    }
}

impl std::fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployStatus::Live => write!(f, "Live"),
            DeployStatus::BuildFailed => write!(f, "Build failed"),
            DeployStatus::Canceled => write!(f, "Canceled"),
            DeployStatus::Created => write!(f, "Created"),
            DeployStatus::BuildInProgress => write!(f, "Build in progress"),
            DeployStatus::UpdateInProgress => write!(f, "Update in progress"),
            DeployStatus::Deactivated => write!(f, "Deactivated"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Deploy {
    pub id: String,
    pub status: DeployStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub commit_sha: Option<String>,
    pub commit_message: Option<String>,
    pub repo_url: Option<String>,
}

impl Deploy {
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self.status,
            DeployStatus::BuildInProgress
                | DeployStatus::UpdateInProgress
                | DeployStatus::Created
        )
    }

    /// Link to the commit that produced this deploy, when both the repo URL
    /// and the sha are known.
    pub fn commit_url(&self) -> Option<String> {
        match (&self.repo_url, &self.commit_sha) {
            (Some(repo), Some(sha)) => Some(format!("{}/commit/{}", repo, sha)),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub service_type: String,
    pub status: ServiceStatus,
    pub url: Option<String>,
    pub custom_domain: Option<String>,
    pub latest_deploy: Option<Deploy>,
}

impl Service {
    /// Attach the latest deploy. An in-progress deploy is a stronger signal
    /// than the service's own status field, so it forces `Deploying`.
    pub fn with_latest_deploy(mut self, deploy: Option<Deploy>) -> Self {
        if deploy.as_ref().is_some_and(|d| d.is_in_progress()) {
            self.status = ServiceStatus::Deploying;
        }
        self.latest_deploy = deploy;
        self
    }

    /// Address to show for this service: the operator-assigned custom domain
    /// takes precedence over the platform-assigned URL.
    pub fn display_url(&self) -> Option<String> {
        if let Some(domain) = &self.custom_domain {
            Some(format!("https://{}", domain))
        } else {
            self.url.clone()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}
