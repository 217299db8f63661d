use store_tools::{Direction, Query, StoreClient};

use super::collections::COUPONS;
use crate::{db_types::Coupon, traits::StorageError};

const ACTIVE: &str = "active";

pub async fn fetch_active_coupon(
    code: &str,
    tenant_id: &str,
    client: &StoreClient,
) -> Result<Option<Coupon>, StorageError> {
    let query = Query::new().eq("code", code).eq("tenant_id", tenant_id).eq("status", ACTIVE);
    Ok(client.get_one::<Coupon>(COUPONS, query).await?)
}

pub async fn fetch_active_coupons(tenant_id: &str, client: &StoreClient) -> Result<Vec<Coupon>, StorageError> {
    let query = Query::new().eq("tenant_id", tenant_id).eq("status", ACTIVE).order_by("code", Direction::Asc);
    Ok(client.get::<Coupon>(COUPONS, &query).await?)
}
