use std::sync::Arc;

use log::*;
use reqwest::{header::CONTENT_TYPE, Client, Method, StatusCode};
use serde_json::Value;

use crate::{
    charge::{Charge, NewCharge},
    config::TapConfig,
    credentials::{CredentialHolder, GatewayCredentials, StaticKey, TokenExchange},
    helpers::is_valid_charge_id,
    TapApiError,
};

#[derive(Clone)]
pub struct TapApi {
    config: TapConfig,
    client: Arc<Client>,
    credentials: Arc<CredentialHolder<GatewayCredentials>>,
}

impl TapApi {
    /// Creates a client whose credential source is picked from `config`: a token exchange when a token URL and client
    /// id are configured, otherwise the static secret key.
    pub fn new(config: TapConfig) -> Result<Self, TapApiError> {
        let client =
            Client::builder().timeout(config.timeout).build().map_err(|e| TapApiError::Initialization(e.to_string()))?;
        let source = match (&config.token_url, &config.client_id) {
            (Some(url), Some(id)) => {
                info!("💳️ Gateway calls will use session tokens from {url}");
                GatewayCredentials::Exchange(TokenExchange::new(
                    url.clone(),
                    id.clone(),
                    config.secret_key.clone(),
                    client.clone(),
                ))
            },
            _ => GatewayCredentials::Static(StaticKey(config.secret_key.clone())),
        };
        Ok(Self::with_credentials(config, client, source))
    }

    pub fn with_credentials(config: TapConfig, client: Client, source: GatewayCredentials) -> Self {
        Self { config, client: Arc::new(client), credentials: Arc::new(CredentialHolder::new(source)) }
    }

    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    /// Creates a hosted-page charge. The returned charge carries the URL the customer must be sent to.
    pub async fn create_charge(&self, charge: &NewCharge) -> Result<Charge, TapApiError> {
        let body = charge.to_request_body();
        let value = self.rest_query(Method::POST, "/charges", Some(&body)).await?;
        let charge = Charge::from_value(value).map_err(|e| TapApiError::JsonError(e.to_string()))?;
        if charge.id.is_empty() {
            return Err(TapApiError::MissingField("id"));
        }
        debug!("💳️ Created charge {} ({})", charge.id, charge.status);
        Ok(charge)
    }

    /// Fetches the gateway's current view of a charge.
    pub async fn get_charge(&self, charge_id: &str) -> Result<Charge, TapApiError> {
        if !is_valid_charge_id(charge_id) {
            warn!("💳️ Refusing to look up malformed charge id {charge_id:?}");
            return Err(TapApiError::InvalidChargeId(charge_id.to_string()));
        }
        let path = format!("/charges/{charge_id}");
        let value = self.rest_query(Method::GET, &path, None).await?;
        Charge::from_value(value).map_err(|e| TapApiError::JsonError(e.to_string()))
    }

    /// Sends an authenticated request. If the gateway rejects the credential, it is discarded and the request is sent
    /// once more with a freshly obtained one.
    async fn rest_query(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, TapApiError> {
        match self.send_once(method.clone(), path, body).await {
            Err(TapApiError::QueryError { status, .. }) if status == StatusCode::UNAUTHORIZED.as_u16() => {
                warn!("💳️ Gateway rejected the credential for {method} {path}. Refreshing and retrying once.");
                self.credentials.invalidate().await;
                self.send_once(method, path, body).await
            },
            result => result,
        }
    }

    async fn send_once(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, TapApiError> {
        let credential = self.credentials.get_or_refresh().await?;
        let url = self.config.url(path);
        trace!("💳️ {method} {url}");
        let mut req = self
            .client
            .request(method.clone(), url)
            .bearer_auth(credential.token.reveal())
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }
        let response = req.send().await.map_err(|e| TapApiError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ {method} {path} successful. {status}");
            response.json::<Value>().await.map_err(|e| TapApiError::JsonError(e.to_string()))
        } else {
            let message = response.text().await.map_err(|e| TapApiError::Transport(e.to_string()))?;
            debug!("💳️ {method} {path} failed with {status}: {message}");
            Err(TapApiError::QueryError { status: status.as_u16(), message })
        }
    }
}
