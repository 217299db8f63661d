use std::fmt::Debug;

use log::*;
use serde_json::Value;

use crate::{
    fog_api::errors::CatalogError,
    traits::{CatalogKind, CatalogManagement},
};

/// Read-only pass-through to the menu and delivery-zone collections.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn list(&self, kind: CatalogKind) -> Result<Vec<Value>, CatalogError> {
        let rows = self.db.fetch_catalog(kind).await?;
        trace!("📋️ {} {kind} rows fetched", rows.len());
        Ok(rows)
    }

    pub async fn categories(&self) -> Result<Vec<Value>, CatalogError> {
        self.list(CatalogKind::Categories).await
    }

    pub async fn items(&self) -> Result<Vec<Value>, CatalogError> {
        self.list(CatalogKind::Items).await
    }

    pub async fn modifier_groups(&self) -> Result<Vec<Value>, CatalogError> {
        self.list(CatalogKind::ModifierGroups).await
    }

    pub async fn delivery_zones(&self) -> Result<Vec<Value>, CatalogError> {
        self.list(CatalogKind::DeliveryZones).await
    }
}
