use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{
        NewItemModifierRecord,
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
    traits::{data_objects::OrderQueryFilter, LoyaltyManagement},
};

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The store returned an unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Persistence for orders and everything owned by an order.
///
/// Deleting an order deletes its line items, their modifier selections and its payment record with it.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order row and returns it as stored, including its store-assigned id and `created_at`.
    async fn insert_order(&self, order: &NewOrderRecord) -> Result<Order, StorageError>;

    async fn insert_order_item(&self, item: &NewOrderItemRecord) -> Result<OrderItem, StorageError>;

    async fn insert_item_modifiers(&self, modifiers: &[NewItemModifierRecord]) -> Result<(), StorageError>;

    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, StorageError>;

    async fn fetch_order_by_number(&self, order_number: &str) -> Result<Option<Order>, StorageError>;

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, StorageError>;

    async fn fetch_item_modifiers(&self, order_item_ids: &[String]) -> Result<Vec<OrderItemModifier>, StorageError>;

    /// Applies the status change. Returns `None` if the order does not exist.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        update: &OrderStatusUpdate,
    ) -> Result<Option<Order>, StorageError>;

    /// Records the gateway charge id against a provisional order.
    async fn set_payment_reference(&self, order_id: &OrderId, reference: &str) -> Result<(), StorageError>;

    /// Sets `payment_status` to `paid` (and `status` to `pending`) **only if** the order is not already paid.
    ///
    /// Returns the updated order if this call made the change, or `None` if the order was already paid or does not
    /// exist. Exactly one of any number of concurrent callers receives `Some`.
    async fn mark_order_paid(&self, order_id: &OrderId) -> Result<Option<Order>, StorageError>;

    /// Deletes the order **only if** its payment status is still `payment_pending`. Returns whether a row was deleted.
    async fn delete_provisional_order(&self, order_id: &OrderId) -> Result<bool, StorageError>;

    async fn insert_payment_record(&self, payment: &NewPaymentRecord) -> Result<PaymentRecord, StorageError>;

    async fn fetch_payments_for_orders(&self, order_ids: &[OrderId]) -> Result<Vec<PaymentRecord>, StorageError>;

    /// Orders matching `filter`, newest first.
    async fn list_orders(&self, filter: &OrderQueryFilter) -> Result<Vec<Order>, StorageError>;

    /// Orders still awaiting online payment that were created before `created_before`, oldest first.
    async fn fetch_provisional_orders(&self, created_before: DateTime<Utc>) -> Result<Vec<Order>, StorageError>;
}

/// Everything the order workflow needs from a backend. Implemented for every type that provides both halves.
pub trait OrderBackend: OrderManagement + LoyaltyManagement {}

impl<T: OrderManagement + LoyaltyManagement> OrderBackend for T {}
