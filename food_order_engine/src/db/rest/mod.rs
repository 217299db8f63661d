mod catalog;
mod coupons;
mod db;
mod loyalty;
mod orders;

pub use db::RestStore;
use store_tools::StoreError;

use crate::traits::StorageError;

impl From<StoreError> for StorageError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::JsonError(msg) => StorageError::UnexpectedResponse(msg),
            StoreError::EmptyResponse => StorageError::UnexpectedResponse("empty response".into()),
            e => StorageError::DatabaseError(e.to_string()),
        }
    }
}

/// Collection names in the resource store.
pub(crate) mod collections {
    pub const ORDERS: &str = "orders";
    pub const ORDER_ITEMS: &str = "order_items";
    pub const ORDER_ITEM_MODIFIERS: &str = "order_item_modifiers";
    pub const PAYMENTS: &str = "payments";
    pub const COUPONS: &str = "coupons";
    pub const LOYALTY_SETTINGS: &str = "loyalty_settings";
    pub const CUSTOMERS: &str = "customers";
    pub const LOYALTY_TRANSACTIONS: &str = "loyalty_transactions";
}
