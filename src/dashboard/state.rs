use chrono::{DateTime, Utc};

use crate::config::ServiceConfig;
use crate::dashboard::refresh::{CycleOutcome, ServiceOutcome};
use crate::error::RdashError;
use crate::models::{EnvVar, Service};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Overlay showing environment variables for one service. `vars` is `None`
/// while the fetch is still in flight.
#[derive(Debug)]
pub struct EnvVarModal {
    pub service_id: String,
    pub service_name: String,
    pub vars: Option<Vec<EnvVar>>,
    pub error: Option<String>,
}

/// One card in the display set.
#[derive(Debug)]
pub struct ServiceEntry {
    pub config: ServiceConfig,
    pub service: Service,
}

/// In-memory state behind the dashboard: the display set keyed by service
/// id, focus, the search filter, and per-cycle diagnostics. Mutated only
/// between render passes on the UI task, so no locking is involved.
#[derive(Debug)]
pub struct DashboardState {
    entries: Vec<ServiceEntry>,
    selected_id: Option<String>,
    pub input_mode: InputMode,
    pub filter: String,
    pub modal: Option<EnvVarModal>,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub failures: Vec<(String, String)>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            selected_id: None,
            input_mode: InputMode::Normal,
            filter: String::new(),
            modal: None,
            last_refreshed: None,
            failures: Vec::new(),
        }
    }

    /// Merge one cycle's outcomes into the display set: replace or insert on
    /// success, evict on failure so stale data is never shown. Focus sticks
    /// to the same service id across the merge where possible. The
    /// last-refreshed stamp is bumped exactly once per cycle no matter how
    /// many individual services failed.
    pub fn apply_cycle(&mut self, outcome: CycleOutcome) {
        let mut failures = Vec::new();

        for ServiceOutcome { config, result } in outcome.services {
            match result {
                Ok(service) => self.upsert(config, service),
                Err(e) => {
                    tracing::warn!("fetch failed for {}: {}", config.id, e);
                    failures.push((config.name.clone(), e.to_string()));
                    self.evict(&config.id);
                }
            }
        }

        self.failures = failures;
        self.last_refreshed = Some(Utc::now());
        self.ensure_selection();
    }

    fn upsert(&mut self, config: ServiceConfig, service: Service) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.config.id == config.id) {
            entry.config = config;
            entry.service = service;
        } else {
            self.entries.push(ServiceEntry { config, service });
            self.entries
                .sort_by(|a, b| {
                    a.config
                        .priority
                        .cmp(&b.config.priority)
                        .then_with(|| a.config.name.cmp(&b.config.name))
                });
        }
    }

    fn evict(&mut self, id: &str) {
        self.entries.retain(|e| e.config.id != id);
    }

    fn ensure_selection(&mut self) {
        let (still_there, first_id) = {
            let visible = self.visible();
            (
                self.selected_id
                    .as_deref()
                    .is_some_and(|id| visible.iter().any(|e| e.config.id == id)),
                visible.first().map(|e| e.config.id.clone()),
            )
        };
        if !still_there {
            self.selected_id = first_id;
        }
    }

    /// Entries matching the current search filter, in display order.
    pub fn visible(&self) -> Vec<&ServiceEntry> {
        if self.filter.is_empty() {
            return self.entries.iter().collect();
        }
        let needle = self.filter.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.config.name.to_lowercase().contains(&needle)
                    || e.config.id.to_lowercase().contains(&needle)
                    || e.config
                        .aliases
                        .iter()
                        .any(|a| a.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected_id.as_deref()?;
        self.visible().iter().position(|e| e.config.id == id)
    }

    pub fn selected_entry(&self) -> Option<&ServiceEntry> {
        let id = self.selected_id.as_deref()?;
        self.entries.iter().find(|e| e.config.id == id)
    }

    pub fn move_selection(&mut self, step: i64) {
        let next_id = {
            let visible = self.visible();
            if visible.is_empty() {
                None
            } else {
                let current = self
                    .selected_id
                    .as_deref()
                    .and_then(|id| visible.iter().position(|e| e.config.id == id))
                    .unwrap_or(0) as i64;
                let next = (current + step).clamp(0, visible.len() as i64 - 1) as usize;
                Some(visible[next].config.id.clone())
            }
        };
        self.selected_id = next_id;
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
        self.ensure_selection();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.ensure_selection();
    }

    pub fn accept_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.filter.clear();
        self.ensure_selection();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.ensure_selection();
    }

    pub fn open_env_modal(&mut self) -> Option<String> {
        let entry = self.selected_entry()?;
        let id = entry.config.id.clone();
        self.modal = Some(EnvVarModal {
            service_id: id.clone(),
            service_name: entry.config.name.clone(),
            vars: None,
            error: None,
        });
        Some(id)
    }

    /// Apply an env-var fetch result, unless the modal was closed or moved
    /// to another service while the request was in flight.
    pub fn resolve_env_modal(
        &mut self,
        service_id: &str,
        result: Result<Vec<EnvVar>, RdashError>,
    ) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        if modal.service_id != service_id {
            return;
        }
        match result {
            Ok(vars) => modal.vars = Some(vars),
            Err(e) => modal.error = Some(e.to_string()),
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}
