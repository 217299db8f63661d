use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use store_tools::{Filter, Query, StoreClient};

use super::collections::{CUSTOMERS, LOYALTY_SETTINGS, LOYALTY_TRANSACTIONS};
use crate::{
    db_types::{Customer, LoyaltyEntry, LoyaltySettings, NewLoyaltyEntry},
    traits::StorageError,
};

#[derive(Serialize)]
struct SettingsRow<'a> {
    tenant_id: &'a str,
    #[serde(flatten)]
    settings: &'a LoyaltySettings,
}

pub async fn fetch_loyalty_settings(
    tenant_id: &str,
    client: &StoreClient,
) -> Result<Option<LoyaltySettings>, StorageError> {
    let query = Query::new().eq("tenant_id", tenant_id);
    Ok(client.get_one::<LoyaltySettings>(LOYALTY_SETTINGS, query).await?)
}

/// Updates the tenant's settings row, inserting one if there is none yet.
pub async fn save_loyalty_settings(
    settings: &LoyaltySettings,
    tenant_id: &str,
    client: &StoreClient,
) -> Result<LoyaltySettings, StorageError> {
    let row = SettingsRow { tenant_id, settings };
    let updated = client.update::<LoyaltySettings, _>(LOYALTY_SETTINGS, &[Filter::eq("tenant_id", tenant_id)], &row).await?;
    if let Some(saved) = updated.into_iter().next() {
        return Ok(saved);
    }
    let inserted = client.insert::<LoyaltySettings, _>(LOYALTY_SETTINGS, &row).await?;
    inserted
        .into_iter()
        .next()
        .ok_or_else(|| StorageError::UnexpectedResponse("no loyalty settings row was returned".into()))
}

pub async fn fetch_customer(customer_id: &str, client: &StoreClient) -> Result<Option<Customer>, StorageError> {
    let query = Query::new().eq("id", customer_id);
    Ok(client.get_one::<Customer>(CUSTOMERS, query).await?)
}

pub async fn update_customer_points(customer_id: &str, points: i64, client: &StoreClient) -> Result<(), StorageError> {
    let patch = json!({ "loyalty_points": points, "updated_at": Utc::now() });
    let rows = client.update::<Value, _>(CUSTOMERS, &[Filter::eq("id", customer_id)], &patch).await?;
    if rows.is_empty() {
        return Err(StorageError::DatabaseError(format!("Customer {customer_id} does not exist")));
    }
    Ok(())
}

pub async fn insert_loyalty_entry(entry: &NewLoyaltyEntry, client: &StoreClient) -> Result<LoyaltyEntry, StorageError> {
    let rows = client.insert::<LoyaltyEntry, _>(LOYALTY_TRANSACTIONS, entry).await?;
    rows.into_iter().next().ok_or_else(|| StorageError::UnexpectedResponse("no loyalty entry row was returned".into()))
}
