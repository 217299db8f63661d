use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;

use super::prepare_env::random_id;
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
        OrderStatus,
        OrderStatusUpdate,
        PaymentRecord,
        PaymentStatus,
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

#[derive(Default)]
struct Tables {
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    modifiers: Vec<OrderItemModifier>,
    payments: Vec<PaymentRecord>,
    coupons: Vec<Coupon>,
    loyalty_settings: Option<LoyaltySettings>,
    customers: HashMap<String, Customer>,
    ledger: Vec<LoyaltyEntry>,
    catalog: HashMap<CatalogKind, Vec<Value>>,
    fail_line_items: bool,
    fail_payment_records: bool,
}

/// A backend that keeps everything in memory. Clones share the same tables.
///
/// Each operation runs under a single lock, so the conditional updates behave like the store's row-level
/// compare-and-set.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_coupon(&self, coupon: Coupon) {
        self.tables.lock().await.coupons.push(coupon);
    }

    pub async fn add_customer(&self, customer: Customer) {
        self.tables.lock().await.customers.insert(customer.id.clone(), customer);
    }

    pub async fn add_catalog_row(&self, kind: CatalogKind, row: Value) {
        self.tables.lock().await.catalog.entry(kind).or_default().push(row);
    }

    /// Makes every subsequent line-item insert fail.
    pub async fn fail_line_items(&self, fail: bool) {
        self.tables.lock().await.fail_line_items = fail;
    }

    /// Makes every subsequent payment record insert fail.
    pub async fn fail_payment_records(&self, fail: bool) {
        self.tables.lock().await.fail_payment_records = fail;
    }

    pub async fn all_orders(&self) -> Vec<Order> {
        self.tables.lock().await.orders.clone()
    }

    pub async fn all_items(&self) -> Vec<OrderItem> {
        self.tables.lock().await.items.clone()
    }

    pub async fn all_payments(&self) -> Vec<PaymentRecord> {
        self.tables.lock().await.payments.clone()
    }

    pub async fn ledger(&self) -> Vec<LoyaltyEntry> {
        self.tables.lock().await.ledger.clone()
    }

    pub async fn customer(&self, customer_id: &str) -> Option<Customer> {
        self.tables.lock().await.customers.get(customer_id).cloned()
    }

    /// Back-dates an order, for exercising age-based logic.
    pub async fn set_created_at(&self, order_id: &OrderId, created_at: DateTime<Utc>) {
        let mut tables = self.tables.lock().await;
        if let Some(order) = tables.orders.iter_mut().find(|o| &o.id == order_id) {
            order.created_at = created_at;
        }
    }
}

fn order_from_record(record: &NewOrderRecord) -> Order {
    Order {
        id: OrderId::from(random_id()),
        order_number: record.order_number.clone(),
        tenant_id: Some(record.tenant_id.clone()),
        branch_id: Some(record.branch_id.clone()),
        customer_id: record.customer_id.clone(),
        user_id: Some(record.user_id.clone()),
        order_type: record.order_type,
        channel: Some(record.channel.to_string()),
        status: record.status,
        payment_status: record.payment_status,
        payment_method: record.payment_method,
        payment_reference: None,
        customer_name: record.customer_name.clone(),
        customer_phone: record.customer_phone.clone(),
        customer_email: record.customer_email.clone(),
        delivery_address: record.delivery_address.clone(),
        delivery_instructions: record.delivery_instructions.clone(),
        subtotal: record.subtotal,
        discount_amount: record.discount_amount,
        delivery_fee: record.delivery_fee,
        tax_amount: record.tax_amount,
        service_charge: record.service_charge,
        total_amount: record.total_amount,
        coupon_code: record.coupon_code.clone(),
        loyalty_points_redeemed: record.loyalty_points_redeemed,
        notes: record.notes.clone(),
        created_at: Utc::now(),
        updated_at: None,
        accepted_at: None,
        completed_at: None,
    }
}

impl OrderManagement for MemoryStore {
    async fn insert_order(&self, order: &NewOrderRecord) -> Result<Order, StorageError> {
        let order = order_from_record(order);
        self.tables.lock().await.orders.push(order.clone());
        Ok(order)
    }

    async fn insert_order_item(&self, item: &NewOrderItemRecord) -> Result<OrderItem, StorageError> {
        let mut tables = self.tables.lock().await;
        if tables.fail_line_items {
            return Err(StorageError::DatabaseError("order_items is unavailable".into()));
        }
        let item = OrderItem {
            id: random_id(),
            order_id: item.order_id.clone(),
            item_id: item.item_id.clone(),
            item_name_en: item.item_name_en.clone(),
            item_name_ar: item.item_name_ar.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
            notes: item.notes.clone(),
            status: Some(item.status.to_string()),
        };
        tables.items.push(item.clone());
        Ok(item)
    }

    async fn insert_item_modifiers(&self, modifiers: &[NewItemModifierRecord]) -> Result<(), StorageError> {
        let mut tables = self.tables.lock().await;
        tables.modifiers.extend(modifiers.iter().map(|m| OrderItemModifier {
            id: Some(random_id()),
            order_item_id: m.order_item_id.clone(),
            modifier_id: m.modifier_id.clone(),
            modifier_name: m.modifier_name.clone(),
            price: m.price,
        }));
        Ok(())
    }

    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, StorageError> {
        Ok(self.tables.lock().await.orders.iter().find(|o| &o.id == order_id).cloned())
    }

    async fn fetch_order_by_number(&self, order_number: &str) -> Result<Option<Order>, StorageError> {
        Ok(self.tables.lock().await.orders.iter().find(|o| o.order_number == order_number).cloned())
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, StorageError> {
        Ok(self.tables.lock().await.items.iter().filter(|i| &i.order_id == order_id).cloned().collect())
    }

    async fn fetch_item_modifiers(&self, order_item_ids: &[String]) -> Result<Vec<OrderItemModifier>, StorageError> {
        let tables = self.tables.lock().await;
        Ok(tables.modifiers.iter().filter(|m| order_item_ids.contains(&m.order_item_id)).cloned().collect())
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        update: &OrderStatusUpdate,
    ) -> Result<Option<Order>, StorageError> {
        let mut tables = self.tables.lock().await;
        let Some(order) = tables.orders.iter_mut().find(|o| &o.id == order_id) else {
            return Ok(None);
        };
        order.status = update.status;
        order.updated_at = Some(update.updated_at);
        if update.accepted_at.is_some() {
            order.accepted_at = update.accepted_at;
        }
        if update.completed_at.is_some() {
            order.completed_at = update.completed_at;
        }
        Ok(Some(order.clone()))
    }

    async fn set_payment_reference(&self, order_id: &OrderId, reference: &str) -> Result<(), StorageError> {
        let mut tables = self.tables.lock().await;
        let order = tables
            .orders
            .iter_mut()
            .find(|o| &o.id == order_id)
            .ok_or_else(|| StorageError::DatabaseError(format!("Order {order_id} does not exist")))?;
        order.payment_reference = Some(reference.to_string());
        Ok(())
    }

    async fn mark_order_paid(&self, order_id: &OrderId) -> Result<Option<Order>, StorageError> {
        let mut tables = self.tables.lock().await;
        let order = tables.orders.iter_mut().find(|o| &o.id == order_id && o.payment_status != PaymentStatus::Paid);
        Ok(order.map(|o| {
            o.payment_status = PaymentStatus::Paid;
            o.status = OrderStatus::Pending;
            o.updated_at = Some(Utc::now());
            o.clone()
        }))
    }

    async fn delete_provisional_order(&self, order_id: &OrderId) -> Result<bool, StorageError> {
        let mut tables = self.tables.lock().await;
        let before = tables.orders.len();
        tables.orders.retain(|o| !(&o.id == order_id && o.payment_status == PaymentStatus::PaymentPending));
        if tables.orders.len() == before {
            return Ok(false);
        }
        let item_ids =
            tables.items.iter().filter(|i| &i.order_id == order_id).map(|i| i.id.clone()).collect::<Vec<_>>();
        tables.modifiers.retain(|m| !item_ids.contains(&m.order_item_id));
        tables.items.retain(|i| &i.order_id != order_id);
        tables.payments.retain(|p| &p.order_id != order_id);
        Ok(true)
    }

    async fn insert_payment_record(&self, payment: &NewPaymentRecord) -> Result<PaymentRecord, StorageError> {
        let mut tables = self.tables.lock().await;
        if tables.fail_payment_records {
            return Err(StorageError::DatabaseError("payments is unavailable".into()));
        }
        let record = PaymentRecord {
            id: random_id(),
            order_id: payment.order_id.clone(),
            provider: payment.provider.clone(),
            transaction_id: payment.transaction_id.clone(),
            amount: payment.amount,
            currency: payment.currency.clone(),
            status: payment.status.clone(),
            raw_response: payment.raw_response.clone(),
            created_at: Some(Utc::now()),
        };
        tables.payments.push(record.clone());
        Ok(record)
    }

    async fn fetch_payments_for_orders(&self, order_ids: &[OrderId]) -> Result<Vec<PaymentRecord>, StorageError> {
        let tables = self.tables.lock().await;
        Ok(tables.payments.iter().filter(|p| order_ids.contains(&p.order_id)).cloned().collect())
    }

    async fn list_orders(&self, filter: &OrderQueryFilter) -> Result<Vec<Order>, StorageError> {
        let tables = self.tables.lock().await;
        let mut orders = tables.orders.iter().filter(|o| filter.matches(o)).cloned().collect::<Vec<_>>();
        // Newest first; later inserts win ties
        orders.reverse();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(usize::try_from(filter.limit).unwrap_or(usize::MAX));
        Ok(orders)
    }

    async fn fetch_provisional_orders(&self, created_before: DateTime<Utc>) -> Result<Vec<Order>, StorageError> {
        let tables = self.tables.lock().await;
        let mut orders = tables
            .orders
            .iter()
            .filter(|o| o.payment_status == PaymentStatus::PaymentPending && o.created_at < created_before)
            .cloned()
            .collect::<Vec<_>>();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(orders)
    }
}

impl CouponManagement for MemoryStore {
    async fn fetch_active_coupon(&self, code: &str) -> Result<Option<Coupon>, StorageError> {
        let tables = self.tables.lock().await;
        Ok(tables.coupons.iter().find(|c| c.code == code && c.status.as_deref() == Some("active")).cloned())
    }

    async fn fetch_active_coupons(&self) -> Result<Vec<Coupon>, StorageError> {
        let tables = self.tables.lock().await;
        Ok(tables.coupons.iter().filter(|c| c.status.as_deref() == Some("active")).cloned().collect())
    }
}

impl LoyaltyManagement for MemoryStore {
    async fn fetch_loyalty_settings(&self) -> Result<Option<LoyaltySettings>, StorageError> {
        Ok(self.tables.lock().await.loyalty_settings.clone())
    }

    async fn save_loyalty_settings(&self, settings: &LoyaltySettings) -> Result<LoyaltySettings, StorageError> {
        self.tables.lock().await.loyalty_settings = Some(settings.clone());
        Ok(settings.clone())
    }

    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<Customer>, StorageError> {
        Ok(self.tables.lock().await.customers.get(customer_id).cloned())
    }

    async fn update_customer_points(&self, customer_id: &str, points: i64) -> Result<(), StorageError> {
        let mut tables = self.tables.lock().await;
        let customer = tables
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| StorageError::DatabaseError(format!("Customer {customer_id} does not exist")))?;
        customer.loyalty_points = points;
        Ok(())
    }

    async fn insert_loyalty_entry(&self, entry: &NewLoyaltyEntry) -> Result<LoyaltyEntry, StorageError> {
        let entry = LoyaltyEntry {
            id: random_id(),
            customer_id: entry.customer_id.clone(),
            order_id: entry.order_id.clone(),
            points_earned: entry.points_earned,
            points_spent: entry.points_spent,
            balance_after: entry.balance_after,
            description: entry.description.clone(),
            created_at: Some(Utc::now()),
        };
        self.tables.lock().await.ledger.push(entry.clone());
        Ok(entry)
    }
}

impl CatalogManagement for MemoryStore {
    async fn fetch_catalog(&self, kind: CatalogKind) -> Result<Vec<Value>, StorageError> {
        Ok(self.tables.lock().await.catalog.get(&kind).cloned().unwrap_or_default())
    }
}
