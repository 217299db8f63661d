use crate::{
    db_types::{Customer, LoyaltyEntry, LoyaltySettings, NewLoyaltyEntry},
    traits::StorageError,
};

/// Loyalty configuration, customer point balances and the append-only points ledger.
#[allow(async_fn_in_trait)]
pub trait LoyaltyManagement {
    /// The tenant's loyalty settings, or `None` if they have never been saved.
    async fn fetch_loyalty_settings(&self) -> Result<Option<LoyaltySettings>, StorageError>;

    /// Creates or replaces the tenant's loyalty settings.
    async fn save_loyalty_settings(&self, settings: &LoyaltySettings) -> Result<LoyaltySettings, StorageError>;

    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<Customer>, StorageError>;

    /// Overwrites the customer's point balance.
    async fn update_customer_points(&self, customer_id: &str, points: i64) -> Result<(), StorageError>;

    async fn insert_loyalty_entry(&self, entry: &NewLoyaltyEntry) -> Result<LoyaltyEntry, StorageError>;
}
