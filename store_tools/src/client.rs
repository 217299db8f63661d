use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
    RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{config::StoreConfig, Filter, Query, StoreError};

const RETURN_REPRESENTATION: &str = "return=representation";

/// Executes row-level calls against the store's REST interface.
///
/// The client is cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct StoreClient {
    config: StoreConfig,
    client: Arc<Client>,
}

impl StoreClient {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::with_capacity(3);
        let key = config.service_key.reveal().as_str();
        let api_key = HeaderValue::from_str(key).map_err(|e| StoreError::Initialization(e.to_string()))?;
        let bearer =
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| StoreError::Initialization(e.to_string()))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Fetch the rows in `collection` matching `query`.
    pub async fn get<T: DeserializeOwned>(&self, collection: &str, query: &Query) -> Result<Vec<T>, StoreError> {
        let params = query.to_params();
        self.rest_query::<Vec<T>, ()>(Method::GET, collection, &params, None).await
    }

    /// Fetch at most one row in `collection` matching `query`.
    pub async fn get_one<T: DeserializeOwned>(&self, collection: &str, query: Query) -> Result<Option<T>, StoreError> {
        let rows = self.get::<T>(collection, &query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row (an object) or several rows (an array) and return the created rows.
    pub async fn insert<T: DeserializeOwned, B: Serialize>(
        &self,
        collection: &str,
        rows: &B,
    ) -> Result<Vec<T>, StoreError> {
        self.rest_query::<Vec<T>, B>(Method::POST, collection, &[], Some(rows)).await
    }

    /// Apply `patch` to every row matching `filters` and return the rows that were changed. An empty result means no
    /// row matched.
    pub async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        collection: &str,
        filters: &[Filter],
        patch: &B,
    ) -> Result<Vec<T>, StoreError> {
        if filters.is_empty() {
            return Err(StoreError::UnfilteredMutation("update", collection.to_string()));
        }
        let params = filters.iter().map(Filter::to_param).collect::<Vec<_>>();
        self.rest_query::<Vec<T>, B>(Method::PATCH, collection, &params, Some(patch)).await
    }

    /// Delete every row matching `filters` and return the deleted rows.
    pub async fn delete<T: DeserializeOwned>(&self, collection: &str, filters: &[Filter]) -> Result<Vec<T>, StoreError> {
        if filters.is_empty() {
            return Err(StoreError::UnfilteredMutation("delete", collection.to_string()));
        }
        let params = filters.iter().map(Filter::to_param).collect::<Vec<_>>();
        self.rest_query::<Vec<T>, ()>(Method::DELETE, collection, &params, None).await
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        collection: &str,
        params: &[(String, String)],
        body: Option<&B>,
    ) -> Result<T, StoreError> {
        let req = self.request(method.clone(), collection, params, body);
        let response = req.send().await.map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| StoreError::Transport(e.to_string()))?;
        if !status.is_success() {
            debug!("🗄️ {method} {collection} failed with {status}: {text}");
            return Err(StoreError::QueryError { status: status.as_u16(), message: text });
        }
        trace!("🗄️ {method} {collection} successful. {status}");
        if text.trim().is_empty() {
            return Err(StoreError::EmptyResponse);
        }
        serde_json::from_str::<T>(&text).map_err(|e| StoreError::JsonError(e.to_string()))
    }

    /// Every call asks for the affected rows back. Conditional updates and deletes rely on this to tell whether their
    /// filters matched.
    fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        collection: &str,
        params: &[(String, String)],
        body: Option<&B>,
    ) -> RequestBuilder {
        let url = self.config.rest_url(collection);
        trace!("🗄️ {method} {url} {params:?}");
        let mut req = self.client.request(method, url).header("Prefer", RETURN_REPRESENTATION);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        req
    }
}
