use chrono::{DateTime, Duration, Utc};
use fog_common::Secret;
use log::*;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::TapApiError;

/// Credentials are refreshed this long before they actually expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A bearer credential for the gateway.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    pub token: Secret<String>,
    /// `None` means the credential never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionCredential {
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token: Secret::new(token), expires_at }
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expires) => expires - Duration::seconds(EXPIRY_MARGIN_SECS) > now,
        }
    }
}

/// Somewhere a fresh [`SessionCredential`] can be obtained from.
#[allow(async_fn_in_trait)]
pub trait CredentialSource {
    async fn fetch_credential(&self) -> Result<SessionCredential, TapApiError>;
}

/// A long-lived secret key, used as-is.
#[derive(Debug, Clone)]
pub struct StaticKey(pub Secret<String>);

impl CredentialSource for StaticKey {
    async fn fetch_credential(&self) -> Result<SessionCredential, TapApiError> {
        if self.0.reveal().is_empty() {
            return Err(TapApiError::Credential("No gateway secret key has been configured".into()));
        }
        Ok(SessionCredential { token: self.0.clone(), expires_at: None })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Exchanges a client id and secret for a short-lived session token (OAuth2 `client_credentials` grant).
#[derive(Clone)]
pub struct TokenExchange {
    token_url: String,
    client_id: String,
    client_secret: Secret<String>,
    client: Client,
}

impl TokenExchange {
    pub fn new(token_url: String, client_id: String, client_secret: Secret<String>, client: Client) -> Self {
        Self { token_url, client_id, client_secret, client }
    }
}

impl CredentialSource for TokenExchange {
    async fn fetch_credential(&self) -> Result<SessionCredential, TapApiError> {
        debug!("💳️ Requesting a new gateway session token from {}", self.token_url);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.reveal().as_str()),
        ];
        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| TapApiError::Credential(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TapApiError::Credential(format!("Token endpoint returned {status}. {message}")));
        }
        let token =
            response.json::<TokenResponse>().await.map_err(|e| TapApiError::Credential(format!("Bad token body. {e}")))?;
        let expires_at = token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
        Ok(SessionCredential::new(token.access_token, expires_at))
    }
}

/// The credential sources the gateway client knows how to use.
#[derive(Clone)]
pub enum GatewayCredentials {
    Static(StaticKey),
    Exchange(TokenExchange),
}

impl CredentialSource for GatewayCredentials {
    async fn fetch_credential(&self) -> Result<SessionCredential, TapApiError> {
        match self {
            Self::Static(s) => s.fetch_credential().await,
            Self::Exchange(e) => e.fetch_credential().await,
        }
    }
}

/// Caches the current credential and refreshes it on demand.
///
/// Concurrent callers that find the cached credential stale serialise on the write lock, and only the first of them
/// goes to the source.
pub struct CredentialHolder<S> {
    source: S,
    cached: RwLock<Option<SessionCredential>>,
}

impl<S: CredentialSource> CredentialHolder<S> {
    pub fn new(source: S) -> Self {
        Self { source, cached: RwLock::new(None) }
    }

    pub async fn get_or_refresh(&self) -> Result<SessionCredential, TapApiError> {
        {
            let cached = self.cached.read().await;
            if let Some(cred) = cached.as_ref().filter(|c| c.is_fresh_at(Utc::now())) {
                return Ok(cred.clone());
            }
        }
        let mut cached = self.cached.write().await;
        if let Some(cred) = cached.as_ref().filter(|c| c.is_fresh_at(Utc::now())) {
            return Ok(cred.clone());
        }
        let cred = self.source.fetch_credential().await?;
        trace!("💳️ Gateway credential refreshed. Expires at {:?}", cred.expires_at);
        *cached = Some(cred.clone());
        Ok(cred)
    }

    /// Drops the cached credential so that the next call to [`Self::get_or_refresh`] fetches a new one.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}
