use std::time::Duration;

use fog_common::Secret;
use log::*;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// The base URL of the hosted store, e.g. `https://xyz.example.co`. The REST interface lives under `/rest/v1`.
    pub url: String,
    pub service_key: Secret<String>,
    /// Every call is bounded by this timeout. A timeout is reported as a transport failure of that call.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { url: String::default(), service_key: Secret::default(), timeout: DEFAULT_TIMEOUT }
    }
}

impl StoreConfig {
    pub fn new(url: &str, service_key: Secret<String>) -> Self {
        Self { url: url.trim_end_matches('/').to_string(), service_key, ..Default::default() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn new_from_env_or_default() -> Self {
        let url = std::env::var("FOG_STORE_URL").unwrap_or_else(|_| {
            error!("🪛️ FOG_STORE_URL is not set. Please set it to the base URL of the resource store.");
            String::default()
        });
        let service_key = Secret::new(std::env::var("FOG_STORE_SERVICE_KEY").unwrap_or_else(|_| {
            warn!("🪛️ FOG_STORE_SERVICE_KEY is not set. Store requests will be unauthenticated.");
            String::default()
        }));
        let timeout = std::env::var("FOG_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for FOG_HTTP_TIMEOUT ({s}). {e}. Using the default."))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self::new(&url, service_key).with_timeout(timeout)
    }

    pub fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{collection}", self.url)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rest_url_strips_trailing_slash() {
        let config = StoreConfig::new("https://store.example.com/", Secret::new("key".into()));
        assert_eq!(config.rest_url("orders"), "https://store.example.com/rest/v1/orders");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
