use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;

use crate::api::normalize;
use crate::cache::ResponseCache;
use crate::error::RdashError;
use crate::models::{Deploy, EnvVar, Service};

pub const BASE_URL: &str = "https://api.render.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One authenticated API session. The underlying connection pool lives as
/// long as the client and is released when it drops, on every exit path.
pub struct RenderClient {
    http: reqwest::Client,
    base_url: String,
    credential_source: String,
    cache: ResponseCache,
}

impl RenderClient {
    /// `credential_source` names where the API key came from (config file or
    /// environment variable) so authentication failures can say which one to
    /// fix. The cache is constructed once per session and injected here.
    pub fn new(
        api_key: &str,
        credential_source: &str,
        cache: ResponseCache,
    ) -> Result<Self, RdashError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| RdashError::Config("API key contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: BASE_URL.to_string(),
            credential_source: credential_source.to_string(),
            cache,
        })
    }

    #[cfg(test)]
    pub fn set_base_url(&mut self, base_url: String) {
        self.base_url = base_url;
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, RdashError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        Err(match status.as_u16() {
            401 => RdashError::Auth(self.credential_source.clone()),
            404 => RdashError::NotFound(path.to_string()),
            429 => RdashError::RateLimited,
            code => RdashError::Api {
                status: code,
                body: response.text().await.unwrap_or_default(),
            },
        })
    }

    /// Current details and status for a single service.
    pub async fn get_service(&self, service_id: &str) -> Result<Service, RdashError> {
        let data = self.get_json(&format!("/services/{}", service_id), &[]).await?;
        Ok(normalize::service_from_value(&data, service_id))
    }

    /// Most recent deploy for a service. `Ok(None)` means the service has no
    /// deploys (or the payload was unusable); `Err` is an actual API failure.
    pub async fn get_latest_deploy(
        &self,
        service_id: &str,
    ) -> Result<Option<Deploy>, RdashError> {
        let data = self
            .get_json(
                &format!("/services/{}/deploys", service_id),
                &[("limit", "1".to_string())],
            )
            .await?;
        Ok(normalize::latest_deploy_from_value(&data))
    }

    /// Service details with the latest deploy attached. Deploy lookup
    /// failures are absorbed: deploy absence must never take down a status
    /// fetch.
    pub async fn get_service_with_deploy(&self, service_id: &str) -> Result<Service, RdashError> {
        let service = self.get_service(service_id).await?;

        let deploy = match self.get_latest_deploy(service_id).await {
            Ok(deploy) => deploy,
            Err(e) => {
                tracing::debug!("deploy lookup failed for {}: {}", service_id, e);
                None
            }
        };

        Ok(service.with_latest_deploy(deploy))
    }

    /// List services for the authenticated account, optionally through the
    /// TTL cache. Cache writes are best-effort and never fail the call.
    pub async fn list_services(
        &self,
        limit: u32,
        use_cache: bool,
    ) -> Result<Vec<Service>, RdashError> {
        let cache_key = format!("services_list_{}", limit);

        if use_cache {
            if let Some(cached) = self.cache.get(&cache_key) {
                match serde_json::from_value::<Vec<Service>>(cached) {
                    Ok(services) => return Ok(services),
                    Err(e) => {
                        tracing::debug!("discarding undecodable cache entry: {}", e);
                        self.cache.clear(&cache_key);
                    }
                }
            }
        }

        let data = self
            .get_json("/services", &[("limit", limit.to_string())])
            .await?;
        let services = normalize::service_list_from_value(&data);

        if use_cache && !services.is_empty() {
            if let Ok(plain) = serde_json::to_value(&services) {
                self.cache.set(&cache_key, &plain);
            }
        }

        Ok(services)
    }

    /// Environment variables for a service. Deliberately never cached:
    /// secrets must not persist in the read-through cache.
    pub async fn get_env_vars(&self, service_id: &str) -> Result<Vec<EnvVar>, RdashError> {
        let data = self
            .get_json(&format!("/services/{}/env-vars", service_id), &[])
            .await?;
        Ok(normalize::env_vars_from_value(&data))
    }
}
