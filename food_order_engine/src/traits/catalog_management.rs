use serde_json::Value;

use crate::traits::{CatalogKind, StorageError};

/// Read access to catalog rows. Rows are passed through without interpretation.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_catalog(&self, kind: CatalogKind) -> Result<Vec<Value>, StorageError>;
}
