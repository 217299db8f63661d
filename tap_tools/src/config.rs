use std::time::Duration;

use fog_common::Secret;
use log::*;

pub const DEFAULT_TAP_API_URL: &str = "https://api.tap.company/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct TapConfig {
    pub api_url: String,
    pub secret_key: Secret<String>,
    /// When set, session tokens are exchanged at this endpoint using `client_id` and `secret_key` instead of sending
    /// the secret key on every call.
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub timeout: Duration,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_TAP_API_URL.to_string(),
            secret_key: Secret::default(),
            token_url: None,
            client_id: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TapConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("FOG_TAP_API_URL").unwrap_or_else(|_| {
            info!("🪛️ FOG_TAP_API_URL not set, using {DEFAULT_TAP_API_URL}");
            DEFAULT_TAP_API_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("FOG_TAP_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ FOG_TAP_SECRET_KEY not set. Online payments will be rejected by the gateway.");
            String::default()
        }));
        let token_url = std::env::var("FOG_TAP_TOKEN_URL").ok().filter(|s| !s.is_empty());
        let client_id = std::env::var("FOG_TAP_CLIENT_ID").ok().filter(|s| !s.is_empty());
        if token_url.is_some() && client_id.is_none() {
            warn!("🪛️ FOG_TAP_TOKEN_URL is set but FOG_TAP_CLIENT_ID is not. Token exchange will fail.");
        }
        let timeout = std::env::var("FOG_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { api_url: api_url.trim_end_matches('/').to_string(), secret_key, token_url, client_id, timeout }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }
}
