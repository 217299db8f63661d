use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use serde_json::Value;
use store_tools::{StoreClient, StoreConfig, StoreError};

use super::{catalog, coupons, loyalty, orders};
use crate::{
    db_types::{
        Coupon,
        Customer,
        LoyaltyEntry,
        LoyaltySettings,
        NewItemModifierRecord,
        NewLoyaltyEntry,
        NewOrderItemRecord,
        NewOrderRecord,
        NewPaymentRecord,
        Order,
        OrderId,
        OrderItem,
        OrderItemModifier,
        OrderStatusUpdate,
        PaymentRecord,
    },
    traits::{
        CatalogKind,
        CatalogManagement,
        CouponManagement,
        LoyaltyManagement,
        OrderManagement,
        OrderQueryFilter,
        StorageError,
    },
};

/// The resource-store backend. All tenant-wide queries are scoped to `tenant_id`.
#[derive(Clone)]
pub struct RestStore {
    client: StoreClient,
    tenant_id: String,
}

impl Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RestStore ({}, tenant {})", self.client.config().url, self.tenant_id)
    }
}

impl RestStore {
    pub fn new(client: StoreClient, tenant_id: String) -> Self {
        Self { client, tenant_id }
    }

    pub fn new_with_config(config: StoreConfig, tenant_id: String) -> Result<Self, StoreError> {
        let client = StoreClient::new(config)?;
        info!("🗄️ Resource store client created for tenant {tenant_id}");
        Ok(Self::new(client, tenant_id))
    }

    pub fn url(&self) -> &str {
        self.client.config().url.as_str()
    }

    pub fn tenant_id(&self) -> &str {
        self.tenant_id.as_str()
    }
}

impl OrderManagement for RestStore {
    async fn insert_order(&self, order: &NewOrderRecord) -> Result<Order, StorageError> {
        let order = orders::insert_order(order, &self.client).await?;
        debug!("🗄️ Order {} saved with id {}", order.order_number, order.id);
        Ok(order)
    }

    async fn insert_order_item(&self, item: &NewOrderItemRecord) -> Result<OrderItem, StorageError> {
        orders::insert_order_item(item, &self.client).await
    }

    async fn insert_item_modifiers(&self, modifiers: &[NewItemModifierRecord]) -> Result<(), StorageError> {
        orders::insert_item_modifiers(modifiers, &self.client).await
    }

    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, StorageError> {
        orders::fetch_order_by_id(order_id, &self.client).await
    }

    async fn fetch_order_by_number(&self, order_number: &str) -> Result<Option<Order>, StorageError> {
        orders::fetch_order_by_number(order_number, &self.tenant_id, &self.client).await
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, StorageError> {
        orders::fetch_order_items(order_id, &self.client).await
    }

    async fn fetch_item_modifiers(&self, order_item_ids: &[String]) -> Result<Vec<OrderItemModifier>, StorageError> {
        orders::fetch_item_modifiers(order_item_ids, &self.client).await
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        update: &OrderStatusUpdate,
    ) -> Result<Option<Order>, StorageError> {
        orders::update_order_status(order_id, update, &self.client).await
    }

    async fn set_payment_reference(&self, order_id: &OrderId, reference: &str) -> Result<(), StorageError> {
        orders::set_payment_reference(order_id, reference, &self.client).await
    }

    async fn mark_order_paid(&self, order_id: &OrderId) -> Result<Option<Order>, StorageError> {
        orders::mark_order_paid(order_id, &self.client).await
    }

    async fn delete_provisional_order(&self, order_id: &OrderId) -> Result<bool, StorageError> {
        orders::delete_provisional_order(order_id, &self.client).await
    }

    async fn insert_payment_record(&self, payment: &NewPaymentRecord) -> Result<PaymentRecord, StorageError> {
        orders::insert_payment_record(payment, &self.client).await
    }

    async fn fetch_payments_for_orders(&self, order_ids: &[OrderId]) -> Result<Vec<PaymentRecord>, StorageError> {
        orders::fetch_payments_for_orders(order_ids, &self.client).await
    }

    async fn list_orders(&self, filter: &OrderQueryFilter) -> Result<Vec<Order>, StorageError> {
        orders::list_orders(filter, &self.tenant_id, &self.client).await
    }

    async fn fetch_provisional_orders(&self, created_before: DateTime<Utc>) -> Result<Vec<Order>, StorageError> {
        orders::fetch_provisional_orders(created_before, &self.tenant_id, &self.client).await
    }
}

impl CouponManagement for RestStore {
    async fn fetch_active_coupon(&self, code: &str) -> Result<Option<Coupon>, StorageError> {
        coupons::fetch_active_coupon(code, &self.tenant_id, &self.client).await
    }

    async fn fetch_active_coupons(&self) -> Result<Vec<Coupon>, StorageError> {
        coupons::fetch_active_coupons(&self.tenant_id, &self.client).await
    }
}

impl LoyaltyManagement for RestStore {
    async fn fetch_loyalty_settings(&self) -> Result<Option<LoyaltySettings>, StorageError> {
        loyalty::fetch_loyalty_settings(&self.tenant_id, &self.client).await
    }

    async fn save_loyalty_settings(&self, settings: &LoyaltySettings) -> Result<LoyaltySettings, StorageError> {
        loyalty::save_loyalty_settings(settings, &self.tenant_id, &self.client).await
    }

    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<Customer>, StorageError> {
        loyalty::fetch_customer(customer_id, &self.client).await
    }

    async fn update_customer_points(&self, customer_id: &str, points: i64) -> Result<(), StorageError> {
        loyalty::update_customer_points(customer_id, points, &self.client).await
    }

    async fn insert_loyalty_entry(&self, entry: &NewLoyaltyEntry) -> Result<LoyaltyEntry, StorageError> {
        loyalty::insert_loyalty_entry(entry, &self.client).await
    }
}

impl CatalogManagement for RestStore {
    async fn fetch_catalog(&self, kind: CatalogKind) -> Result<Vec<Value>, StorageError> {
        catalog::fetch_catalog(kind, &self.tenant_id, &self.client).await
    }
}
