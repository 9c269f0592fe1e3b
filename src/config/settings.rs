use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::paths;
use crate::error::RdashError;

pub const ENV_API_KEY: &str = "RENDER_API_KEY";

/// One tracked service, as declared in `[[services]]`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: i64,
}

fn default_priority() -> i64 {
    1
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct RenderSettings {
    #[serde(default)]
    api_key: String,
    #[serde(default = "default_refresh_interval")]
    refresh_interval: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    30
}

/// On-disk shape of config.toml.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
struct ConfigFile {
    #[serde(default)]
    render: RenderSettings,
    #[serde(default)]
    services: Vec<ServiceConfig>,
}

/// Fully resolved configuration for a session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    /// Where the key came from, used in authentication error messages.
    pub credential_source: String,
    pub refresh_interval: u64,
    pub services: Vec<ServiceConfig>,
}

pub fn load(config_path: Option<&Path>) -> Result<AppConfig, RdashError> {
    load_with(config_path, false)
}

/// Like `load`, but tolerates an empty service list. Used by `service add`,
/// which is how services get into the config in the first place.
pub fn load_allow_empty(config_path: Option<&Path>) -> Result<AppConfig, RdashError> {
    load_with(config_path, true)
}

fn load_with(config_path: Option<&Path>, allow_empty: bool) -> Result<AppConfig, RdashError> {
    let path = resolve_path(config_path);
    let file = read_config_file(&path)?;
    resolve(file, allow_empty)
}

fn resolve_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(paths::config_path)
}

fn read_config_file(path: &Path) -> Result<ConfigFile, RdashError> {
    if !path.exists() {
        // A missing file is an empty config; the api-key env fallback may
        // still make it usable for `service add`.
        return Ok(ConfigFile::default());
    }
    let content = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&content)?;
    Ok(file)
}

fn resolve(file: ConfigFile, allow_empty: bool) -> Result<AppConfig, RdashError> {
    let (api_key, credential_source) = resolve_api_key(&file.render.api_key)?;

    let mut services = Vec::with_capacity(file.services.len());
    for (i, mut svc) in file.services.into_iter().enumerate() {
        if svc.id.is_empty() {
            return Err(RdashError::Config(format!(
                "Service at index {} is missing the required 'id' field",
                i
            )));
        }
        if services.iter().any(|s: &ServiceConfig| s.id == svc.id) {
            return Err(RdashError::Config(format!(
                "Duplicate service id '{}' in config",
                svc.id
            )));
        }
        if svc.name.is_empty() {
            svc.name = svc.id.clone();
        }
        services.push(svc);
    }

    if services.is_empty() && !allow_empty {
        return Err(RdashError::Config(
            "No services configured. Add one with: rdash service add <name>".to_string(),
        ));
    }

    Ok(AppConfig {
        api_key,
        credential_source,
        refresh_interval: file.render.refresh_interval,
        services,
    })
}

/// Resolve the API key from the config value (with `${VAR}` substitution) or
/// the RENDER_API_KEY environment variable, tracking which source supplied it.
fn resolve_api_key(raw: &str) -> Result<(String, String), RdashError> {
    if let Some(var) = raw.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        return match std::env::var(var) {
            Ok(value) if !value.is_empty() => Ok((value, var.to_string())),
            _ => Err(RdashError::Config(format!(
                "Environment variable {} is not set. Export it with: export {}=<your-key>",
                var, var
            ))),
        };
    }
    if !raw.is_empty() {
        return Ok((raw.to_string(), "config.toml api_key".to_string()));
    }
    match std::env::var(ENV_API_KEY) {
        Ok(value) if !value.is_empty() => Ok((value, ENV_API_KEY.to_string())),
        _ => Err(RdashError::Config(format!(
            "No API key configured. Set render.api_key in {} or export {}",
            resolve_path(None).display(),
            ENV_API_KEY
        ))),
    }
}

pub fn add_service(config_path: Option<&Path>, service: ServiceConfig) -> Result<(), RdashError> {
    let path = resolve_path(config_path);
    let mut file = read_config_file(&path)?;
    if file.services.iter().any(|s| s.id == service.id) {
        return Err(RdashError::Config(format!(
            "Service '{}' is already in the config",
            service.id
        )));
    }
    file.services.push(service);
    save_config_file(&path, &file)
}

pub fn remove_service(config_path: Option<&Path>, id: &str) -> Result<(), RdashError> {
    let path = resolve_path(config_path);
    let mut file = read_config_file(&path)?;
    let before = file.services.len();
    file.services.retain(|s| s.id != id);
    if file.services.len() == before {
        return Err(RdashError::ServiceNotFound(id.to_string()));
    }
    save_config_file(&path, &file)
}

fn save_config_file(path: &Path, file: &ConfigFile) -> Result<(), RdashError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content =
        toml::to_string_pretty(file).map_err(|e| RdashError::Config(e.to_string()))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Find a service by alias or name. Exact alias matches win; otherwise a
/// case-insensitive substring match over aliases and name. More than one
/// candidate is a config error listing the choices.
pub fn find_service_by_alias<'a>(
    services: &'a [ServiceConfig],
    alias: &str,
) -> Result<Option<&'a ServiceConfig>, RdashError> {
    let needle = alias.to_lowercase();

    let mut matches: Vec<&ServiceConfig> = Vec::new();
    for svc in services {
        if svc.aliases.iter().any(|a| a.to_lowercase() == needle) {
            return Ok(Some(svc));
        }
        if svc.aliases.iter().any(|a| a.to_lowercase().contains(&needle))
            || svc.name.to_lowercase().contains(&needle)
        {
            matches.push(svc);
        }
    }

    match matches.len() {
        0 => Ok(None),
        1 => Ok(Some(matches[0])),
        _ => {
            let listing = matches
                .iter()
                .map(|s| format!("  {} (aliases: {})", s.name, s.aliases.join(", ")))
                .collect::<Vec<_>>()
                .join("\n");
            Err(RdashError::Config(format!(
                "Multiple services match '{}':\n{}\nUse a more specific alias",
                alias, listing
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svc(id: &str, name: &str, aliases: &[&str]) -> ServiceConfig {
        ServiceConfig {
            id: id.to_string(),
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            priority: 1,
        }
    }

    #[test]
    fn resolves_literal_api_key_and_defaults() {
        let file: ConfigFile = toml::from_str(
            r#"
            [render]
            api_key = "rnd_test"

            [[services]]
            id = "srv-1"
            aliases = ["chat"]
            "#,
        )
        .unwrap();
        let config = resolve(file, false).unwrap();
        assert_eq!(config.api_key, "rnd_test");
        assert_eq!(config.credential_source, "config.toml api_key");
        assert_eq!(config.refresh_interval, 30);
        // name defaults to the id
        assert_eq!(config.services[0].name, "srv-1");
        assert_eq!(config.services[0].priority, 1);
    }

    #[test]
    fn substitutes_env_var_placeholder() {
        std::env::set_var("RDASH_TEST_KEY_SUB", "rnd_from_env");
        let file: ConfigFile = toml::from_str(
            r#"
            [render]
            api_key = "${RDASH_TEST_KEY_SUB}"

            [[services]]
            id = "srv-1"
            "#,
        )
        .unwrap();
        let config = resolve(file, false).unwrap();
        assert_eq!(config.api_key, "rnd_from_env");
        assert_eq!(config.credential_source, "RDASH_TEST_KEY_SUB");
    }

    #[test]
    fn missing_placeholder_var_is_a_config_error() {
        let file: ConfigFile = toml::from_str(
            r#"
            [render]
            api_key = "${RDASH_TEST_KEY_UNSET}"

            [[services]]
            id = "srv-1"
            "#,
        )
        .unwrap();
        let err = resolve(file, false).unwrap_err();
        assert!(matches!(err, RdashError::Config(_)));
        assert!(err.to_string().contains("RDASH_TEST_KEY_UNSET"));
    }

    #[test]
    fn empty_service_list_is_rejected_unless_allowed() {
        let file: ConfigFile = toml::from_str(
            r#"
            [render]
            api_key = "rnd_test"
            "#,
        )
        .unwrap();
        assert!(resolve(file.clone(), false).is_err());
        let config = resolve(file, true).unwrap();
        assert!(config.services.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let file: ConfigFile = toml::from_str(
            r#"
            [render]
            api_key = "rnd_test"

            [[services]]
            id = "srv-1"

            [[services]]
            id = "srv-1"
            "#,
        )
        .unwrap();
        let err = resolve(file, false).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn exact_alias_match_wins_over_substring() {
        let services = vec![
            svc("srv-1", "chat-backend", &["chat"]),
            svc("srv-2", "chat-worker", &["chatw"]),
        ];
        let found = find_service_by_alias(&services, "chat").unwrap().unwrap();
        assert_eq!(found.id, "srv-1");
    }

    #[test]
    fn substring_match_on_name() {
        let services = vec![
            svc("srv-1", "accounts-api", &[]),
            svc("srv-2", "auth-api", &["auth"]),
        ];
        let found = find_service_by_alias(&services, "accounts")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "srv-1");
    }

    #[test]
    fn ambiguous_alias_is_an_error() {
        let services = vec![
            svc("srv-1", "chat-backend", &[]),
            svc("srv-2", "chat-worker", &[]),
        ];
        assert!(find_service_by_alias(&services, "chat").is_err());
    }

    #[test]
    fn unmatched_alias_is_none() {
        let services = vec![svc("srv-1", "chat-backend", &["chat"])];
        assert!(find_service_by_alias(&services, "billing")
            .unwrap()
            .is_none());
    }

    #[test]
    fn add_and_remove_edit_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render]\napi_key = \"rnd_test\"\n").unwrap();

        add_service(Some(&path), svc("srv-9", "billing", &["bill"])).unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.services.len(), 1);
        assert_eq!(config.services[0].aliases, vec!["bill"]);

        // adding the same id again is rejected
        assert!(add_service(Some(&path), svc("srv-9", "billing", &[])).is_err());

        remove_service(Some(&path), "srv-9").unwrap();
        assert!(remove_service(Some(&path), "srv-9").is_err());
        let config = load_allow_empty(Some(&path)).unwrap();
        assert!(config.services.is_empty());
    }
}
