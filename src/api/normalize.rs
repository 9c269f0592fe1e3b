//! Best-effort decoding of raw API payloads into the internal model.
//!
//! The remote schema is not fully documented and has shifted between
//! revisions, so every field is read through an ordered fallback chain and
//! failures degrade field-by-field instead of rejecting the whole object.
//! Bulk endpoints skip unusable elements rather than failing the batch.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{Deploy, DeployStatus, EnvVar, Service, ServiceStatus};

// Key chains observed against the live API; re-check against the API docs
// before extending.
const DEPLOY_ID_KEYS: &[&str] = &["id", "deployId"];
const CUSTOM_DOMAIN_KEYS: &[&str] = &["name", "domain", "domainName"];
const COMMIT_SHA_KEYS: &[&str] = &["id", "sha"];
const REPO_URL_KEYS: &[&str] = &["repo", "repoUrl"];

/// First string value found under any of `keys`, in order.
fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
}

/// Responses come either bare or wrapped in a single-key envelope such as
/// `{"service": {...}}`.
fn unwrap_envelope<'a>(value: &'a Value, key: &str) -> &'a Value {
    match value.get(key) {
        Some(inner) if inner.is_object() => inner,
        _ => value,
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn strip_git_suffix(url: &str) -> String {
    url.strip_suffix(".git").unwrap_or(url).to_string()
}

pub fn service_from_value(value: &Value, fallback_id: &str) -> Service {
    let data = unwrap_envelope(value, "service");
    let id = first_str(data, &["id"]).unwrap_or(fallback_id).to_string();
    let name = first_str(data, &["name"]).unwrap_or(&id).to_string();
    let service_type = first_str(data, &["type"]).unwrap_or("unknown").to_string();
    let status = ServiceStatus::parse(first_str(data, &["status"]).unwrap_or("unknown"));
    let url = data
        .get("serviceDetails")
        .and_then(|details| details.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let custom_domain = extract_custom_domain(data);

    Service {
        id,
        name,
        service_type,
        status,
        url,
        custom_domain,
        latest_deploy: None,
    }
}

/// Custom domains show up in two places depending on service type: a
/// top-level `customDomains` array, or one nested under `serviceDetails`.
fn extract_custom_domain(data: &Value) -> Option<String> {
    let locations = [
        data.get("customDomains"),
        data.get("serviceDetails")
            .and_then(|details| details.get("customDomains")),
    ];
    for location in locations.iter().flatten() {
        if let Some(entry) = location.as_array().and_then(|a| a.first()) {
            if let Some(domain) = first_str(entry, CUSTOM_DOMAIN_KEYS) {
                return Some(domain.to_string());
            }
        }
    }
    None
}

/// Decode a list response (`[...]` or `{"services": [...]}`). Elements that
/// are not objects or carry no usable id are skipped silently; partial
/// success beats all-or-nothing for bulk queries.
pub fn service_list_from_value(value: &Value) -> Vec<Service> {
    list_items(value, "services")
        .iter()
        .filter_map(|item| {
            if !item.is_object() {
                return None;
            }
            let data = unwrap_envelope(item, "service");
            first_str(data, &["id"])?;
            Some(service_from_value(data, ""))
        })
        .collect()
}

pub fn deploy_from_value(value: &Value) -> Deploy {
    let data = unwrap_envelope(value, "deploy");
    let commit = data.get("commit").filter(|c| c.is_object());

    Deploy {
        id: first_str(data, DEPLOY_ID_KEYS).unwrap_or("unknown").to_string(),
        status: DeployStatus::parse(first_str(data, &["status"]).unwrap_or("created")),
        created_at: parse_timestamp(first_str(data, &["createdAt"])).unwrap_or_else(Utc::now),
        finished_at: parse_timestamp(first_str(data, &["finishedAt"])),
        commit_sha: commit
            .and_then(|c| first_str(c, COMMIT_SHA_KEYS))
            .map(str::to_string),
        commit_message: commit
            .and_then(|c| first_str(c, &["message"]))
            .map(str::to_string),
        repo_url: first_str(data, REPO_URL_KEYS)
            .or_else(|| commit.and_then(|c| first_str(c, REPO_URL_KEYS)))
            .map(|url| strip_git_suffix(url)),
    }
}

/// First deploy out of a page-size-1 listing, or `None` when the service has
/// no deploys or the payload is unusable.
pub fn latest_deploy_from_value(value: &Value) -> Option<Deploy> {
    let items = list_items(value, "deploys");
    let first = items.first()?;
    if !first.is_object() {
        return None;
    }
    Some(deploy_from_value(first))
}

pub fn env_vars_from_value(value: &Value) -> Vec<EnvVar> {
    list_items(value, "envVars")
        .iter()
        .filter_map(|item| {
            let data = unwrap_envelope(item, "envVar");
            let key = first_str(data, &["key"])?;
            Some(EnvVar {
                key: key.to_string(),
                value: first_str(data, &["value"]).unwrap_or("").to_string(),
            })
        })
        .collect()
}

fn list_items<'a>(value: &'a Value, envelope_key: &str) -> &'a [Value] {
    match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => value
            .get(envelope_key)
            .and_then(Value::as_array)
            .map(|items| items.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn service_decodes_enveloped_and_bare_payloads() {
        let bare = json!({"id": "srv-1", "name": "chat", "type": "web_service", "status": "available"});
        let wrapped = json!({"service": {"id": "srv-1", "name": "chat", "type": "web_service", "status": "available"}});

        let a = service_from_value(&bare, "srv-1");
        let b = service_from_value(&wrapped, "srv-1");
        assert_eq!(a, b);
        assert_eq!(a.name, "chat");
        assert_eq!(a.status, ServiceStatus::Available);
    }

    #[test]
    fn service_fields_degrade_to_defaults() {
        let svc = service_from_value(&json!({}), "srv-9");
        assert_eq!(svc.id, "srv-9");
        assert_eq!(svc.name, "srv-9");
        assert_eq!(svc.service_type, "unknown");
        assert_eq!(svc.status, ServiceStatus::Unknown);
        assert_eq!(svc.url, None);
        assert_eq!(svc.custom_domain, None);
    }

    #[test]
    fn unknown_status_string_does_not_fail_the_object() {
        let svc = service_from_value(&json!({"id": "srv-1", "status": "exploded"}), "srv-1");
        assert_eq!(svc.status, ServiceStatus::Unknown);
    }

    #[test]
    fn url_comes_from_service_details() {
        let svc = service_from_value(
            &json!({"id": "srv-1", "serviceDetails": {"url": "https://chat.onrender.com"}}),
            "srv-1",
        );
        assert_eq!(svc.url.as_deref(), Some("https://chat.onrender.com"));
    }

    #[test]
    fn custom_domain_checks_top_level_then_nested_details() {
        let top = json!({"id": "srv-1", "customDomains": [{"name": "chat.example.com"}]});
        assert_eq!(
            service_from_value(&top, "srv-1").custom_domain.as_deref(),
            Some("chat.example.com")
        );

        let nested = json!({
            "id": "srv-1",
            "serviceDetails": {"customDomains": [{"domainName": "nested.example.com"}]}
        });
        assert_eq!(
            service_from_value(&nested, "srv-1").custom_domain.as_deref(),
            Some("nested.example.com")
        );

        let neither = json!({"id": "srv-1", "customDomains": []});
        assert_eq!(service_from_value(&neither, "srv-1").custom_domain, None);
    }

    #[test]
    fn custom_domain_field_fallback_order() {
        let entry = json!({"id": "srv-1", "customDomains": [{"domain": "b.example.com", "name": "a.example.com"}]});
        // "name" is checked before "domain"
        assert_eq!(
            service_from_value(&entry, "srv-1").custom_domain.as_deref(),
            Some("a.example.com")
        );
    }

    #[test]
    fn deploy_id_falls_back_then_uses_sentinel() {
        let secondary = deploy_from_value(&json!({"deployId": "dep-2", "status": "live"}));
        assert_eq!(secondary.id, "dep-2");

        let missing = deploy_from_value(&json!({"status": "live"}));
        assert_eq!(missing.id, "unknown");
    }

    #[test]
    fn deploy_timestamps_parse_or_default() {
        let parsed = deploy_from_value(&json!({
            "id": "dep-1",
            "createdAt": "2024-05-01T12:00:00Z",
            "finishedAt": "2024-05-01T12:05:00Z"
        }));
        assert_eq!(parsed.created_at.to_rfc3339(), "2024-05-01T12:00:00+00:00");
        assert!(parsed.finished_at.is_some());

        let before = Utc::now();
        let defaulted = deploy_from_value(&json!({"id": "dep-1", "createdAt": "not-a-date"}));
        assert!(defaulted.created_at >= before);
        assert_eq!(defaulted.finished_at, None);
    }

    #[test]
    fn commit_metadata_is_best_effort() {
        let no_commit = deploy_from_value(&json!({"id": "dep-1"}));
        assert_eq!(no_commit.commit_sha, None);
        assert_eq!(no_commit.commit_message, None);
        assert_eq!(no_commit.repo_url, None);

        let with_commit = deploy_from_value(&json!({
            "id": "dep-1",
            "commit": {"id": "abc1234", "message": "fix login", "repo": "https://github.com/acme/chat.git"}
        }));
        assert_eq!(with_commit.commit_sha.as_deref(), Some("abc1234"));
        assert_eq!(with_commit.commit_message.as_deref(), Some("fix login"));
        // trailing .git is stripped for link construction
        assert_eq!(
            with_commit.repo_url.as_deref(),
            Some("https://github.com/acme/chat")
        );
    }

    #[test]
    fn repo_url_prefers_the_deploy_payload_over_the_commit_block() {
        let deploy = deploy_from_value(&json!({
            "id": "dep-1",
            "repo": "https://github.com/acme/top",
            "commit": {"repo": "https://github.com/acme/nested"}
        }));
        assert_eq!(deploy.repo_url.as_deref(), Some("https://github.com/acme/top"));
    }

    #[test]
    fn latest_deploy_handles_empty_and_enveloped_lists() {
        assert_eq!(latest_deploy_from_value(&json!({"deploys": []})), None);
        assert_eq!(latest_deploy_from_value(&json!([])), None);
        assert_eq!(latest_deploy_from_value(&json!("oops")), None);

        let enveloped = json!({"deploys": [{"deploy": {"id": "dep-1", "status": "live"}}]});
        let deploy = latest_deploy_from_value(&enveloped).unwrap();
        assert_eq!(deploy.id, "dep-1");
        assert_eq!(deploy.status, DeployStatus::Live);
    }

    #[test]
    fn service_list_skips_unusable_elements() {
        let value = json!([
            {"service": {"id": "srv-1", "name": "chat", "status": "available"}},
            "not-an-object",
            {"service": {"name": "no id here"}},
            {"id": "srv-2", "name": "auth", "status": "suspended"}
        ]);
        let services = service_list_from_value(&value);
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].id, "srv-1");
        assert_eq!(services[1].id, "srv-2");
        assert_eq!(services[1].status, ServiceStatus::Suspended);
    }

    #[test]
    fn env_vars_decode_and_skip_keyless_entries() {
        let value = json!([
            {"envVar": {"key": "DATABASE_URL", "value": "postgres://db"}},
            {"key": "PLAIN", "value": "1"},
            {"envVar": {"value": "orphan"}}
        ]);
        let vars = env_vars_from_value(&value);
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].key, "DATABASE_URL");
        assert_eq!(vars[1].key, "PLAIN");
    }
}
