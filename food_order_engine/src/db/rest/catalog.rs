use serde_json::Value;
use store_tools::{Query, StoreClient};

use crate::traits::{CatalogKind, StorageError};

pub async fn fetch_catalog(kind: CatalogKind, tenant_id: &str, client: &StoreClient) -> Result<Vec<Value>, StorageError> {
    let query = Query::new().eq("tenant_id", tenant_id);
    Ok(client.get::<Value>(kind.collection(), &query).await?)
}
