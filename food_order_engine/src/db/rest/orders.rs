use chrono::{DateTime, Utc};
use log::*;
use serde_json::{json, Value};
use store_tools::{Direction, Filter, Query, StoreClient};

use super::collections::{ORDERS, ORDER_ITEMS, ORDER_ITEM_MODIFIERS, PAYMENTS};
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
        OrderStatus,
        OrderStatusUpdate,
        PaymentRecord,
        PaymentStatus,
    },
    traits::{OrderQueryFilter, StorageError},
};

fn first<T>(rows: Vec<T>, what: &str) -> Result<T, StorageError> {
    rows.into_iter().next().ok_or_else(|| StorageError::UnexpectedResponse(format!("no {what} row was returned")))
}

pub async fn insert_order(order: &NewOrderRecord, client: &StoreClient) -> Result<Order, StorageError> {
    let rows = client.insert::<Order, _>(ORDERS, order).await?;
    first(rows, "order")
}

pub async fn insert_order_item(item: &NewOrderItemRecord, client: &StoreClient) -> Result<OrderItem, StorageError> {
    let rows = client.insert::<OrderItem, _>(ORDER_ITEMS, item).await?;
    first(rows, "order item")
}

pub async fn insert_item_modifiers(
    modifiers: &[NewItemModifierRecord],
    client: &StoreClient,
) -> Result<(), StorageError> {
    if modifiers.is_empty() {
        return Ok(());
    }
    let _ = client.insert::<Value, _>(ORDER_ITEM_MODIFIERS, &modifiers).await?;
    Ok(())
}

pub async fn fetch_order_by_id(order_id: &OrderId, client: &StoreClient) -> Result<Option<Order>, StorageError> {
    let query = Query::new().eq("id", order_id);
    Ok(client.get_one::<Order>(ORDERS, query).await?)
}

pub async fn fetch_order_by_number(
    order_number: &str,
    tenant_id: &str,
    client: &StoreClient,
) -> Result<Option<Order>, StorageError> {
    let query = Query::new().eq("order_number", order_number).eq("tenant_id", tenant_id);
    Ok(client.get_one::<Order>(ORDERS, query).await?)
}

pub async fn fetch_order_items(order_id: &OrderId, client: &StoreClient) -> Result<Vec<OrderItem>, StorageError> {
    let query = Query::new().eq("order_id", order_id).order_by("created_at", Direction::Asc);
    Ok(client.get::<OrderItem>(ORDER_ITEMS, &query).await?)
}

pub async fn fetch_item_modifiers(
    order_item_ids: &[String],
    client: &StoreClient,
) -> Result<Vec<OrderItemModifier>, StorageError> {
    if order_item_ids.is_empty() {
        return Ok(Vec::new());
    }
    let query = Query::new().filter(Filter::in_list("order_item_id", order_item_ids));
    Ok(client.get::<OrderItemModifier>(ORDER_ITEM_MODIFIERS, &query).await?)
}

pub async fn update_order_status(
    order_id: &OrderId,
    update: &OrderStatusUpdate,
    client: &StoreClient,
) -> Result<Option<Order>, StorageError> {
    let rows = client.update::<Order, _>(ORDERS, &[Filter::eq("id", order_id)], update).await?;
    Ok(rows.into_iter().next())
}

pub async fn set_payment_reference(
    order_id: &OrderId,
    reference: &str,
    client: &StoreClient,
) -> Result<(), StorageError> {
    let patch = json!({ "payment_reference": reference, "updated_at": Utc::now() });
    let rows = client.update::<Value, _>(ORDERS, &[Filter::eq("id", order_id)], &patch).await?;
    if rows.is_empty() {
        return Err(StorageError::DatabaseError(format!("Order {order_id} does not exist")));
    }
    Ok(())
}

/// The `payment_status=neq.paid` filter makes the paid transition a compare-and-set: the store only returns the row to
/// the caller whose update changed it.
fn unpaid_order_filters(order_id: &OrderId) -> [Filter; 2] {
    [Filter::eq("id", order_id), Filter::neq("payment_status", PaymentStatus::Paid)]
}

/// Only orders still waiting on their online payment may be discarded.
fn provisional_order_filters(order_id: &OrderId) -> [Filter; 2] {
    [Filter::eq("id", order_id), Filter::eq("payment_status", PaymentStatus::PaymentPending)]
}

pub async fn mark_order_paid(order_id: &OrderId, client: &StoreClient) -> Result<Option<Order>, StorageError> {
    let filters = unpaid_order_filters(order_id);
    let patch = json!({
        "payment_status": PaymentStatus::Paid,
        "status": OrderStatus::Pending,
        "updated_at": Utc::now(),
    });
    let rows = client.update::<Order, _>(ORDERS, &filters, &patch).await?;
    Ok(rows.into_iter().next())
}

pub async fn delete_provisional_order(order_id: &OrderId, client: &StoreClient) -> Result<bool, StorageError> {
    let filters = provisional_order_filters(order_id);
    let rows = client.delete::<Value>(ORDERS, &filters).await?;
    trace!("🗄️ {} provisional order rows deleted for {order_id}", rows.len());
    Ok(!rows.is_empty())
}

pub async fn insert_payment_record(
    payment: &NewPaymentRecord,
    client: &StoreClient,
) -> Result<PaymentRecord, StorageError> {
    let rows = client.insert::<PaymentRecord, _>(PAYMENTS, payment).await?;
    first(rows, "payment")
}

pub async fn fetch_payments_for_orders(
    order_ids: &[OrderId],
    client: &StoreClient,
) -> Result<Vec<PaymentRecord>, StorageError> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let query = Query::new().filter(Filter::in_list("order_id", order_ids));
    Ok(client.get::<PaymentRecord>(PAYMENTS, &query).await?)
}

pub async fn list_orders(
    filter: &OrderQueryFilter,
    tenant_id: &str,
    client: &StoreClient,
) -> Result<Vec<Order>, StorageError> {
    let mut query = Query::new().eq("tenant_id", tenant_id).order_by("created_at", Direction::Desc).limit(filter.limit);
    if let Some(status) = filter.status {
        query = query.eq("status", status);
    }
    if let Some(excluded) = filter.exclude_payment_status {
        query = query.filter(Filter::neq("payment_status", excluded));
    }
    Ok(client.get::<Order>(ORDERS, &query).await?)
}

pub async fn fetch_provisional_orders(
    created_before: DateTime<Utc>,
    tenant_id: &str,
    client: &StoreClient,
) -> Result<Vec<Order>, StorageError> {
    let query = Query::new()
        .eq("tenant_id", tenant_id)
        .eq("payment_status", PaymentStatus::PaymentPending)
        .filter(Filter::lt("created_at", created_before.to_rfc3339()))
        .order_by("created_at", Direction::Asc);
    Ok(client.get::<Order>(ORDERS, &query).await?)
}
