use std::fmt::Display;

use fog_common::Money;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db_types::{Order, OrderId, OrderStatus, PaymentStatus};

//--------------------------------------   OrderQueryFilter   --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub status: Option<OrderStatus>,
    /// Orders with this payment status are left out.
    pub exclude_payment_status: Option<PaymentStatus>,
    pub limit: u64,
}

impl Default for OrderQueryFilter {
    fn default() -> Self {
        Self { status: None, exclude_payment_status: None, limit: 50 }
    }
}

impl OrderQueryFilter {
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn excluding_payment_status(mut self, status: PaymentStatus) -> Self {
        self.exclude_payment_status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.status.map(|s| s == order.status).unwrap_or(true) &&
            self.exclude_payment_status.map(|s| s != order.payment_status).unwrap_or(true)
    }
}

//--------------------------------------     CatalogKind      --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Categories,
    Items,
    ModifierGroups,
    DeliveryZones,
}

impl CatalogKind {
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Categories => "menu_categories",
            Self::Items => "menu_items",
            Self::ModifierGroups => "modifier_groups",
            Self::DeliveryZones => "delivery_zones",
        }
    }
}

impl Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

//--------------------------------------       Charges        --------------------------------------------------------
/// What the workflow asks a payment provider to charge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    pub order_id: OrderId,
    pub order_number: String,
    pub amount: Money,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
}

impl ChargeRequest {
    pub fn for_order(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            amount: order.total_amount,
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            customer_email: order.customer_email.clone(),
        }
    }
}

/// A charge the customer can now complete on the provider's hosted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeSession {
    pub charge_id: String,
    pub payment_url: String,
}

/// The provider's verdict on a charge, reduced to what reconciliation acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    Captured,
    /// The customer (or the provider) has not finished yet.
    InProgress,
    /// The charge will never be captured. Carries the provider's status.
    Failed(String),
    /// A status outside the known vocabulary.
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeReport {
    pub charge_id: String,
    pub outcome: ChargeOutcome,
    /// The provider's own status string.
    pub status: String,
    pub amount: Money,
    pub currency: String,
    /// The order the charge was created for, as stored on the charge itself.
    pub order_id: Option<OrderId>,
    pub order_number: Option<String>,
    pub raw: Value,
}

//--------------------------------------   SubWriteFailure    --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubWriteKind {
    LineItem,
    Modifiers,
    PaymentReference,
    PaymentRecord,
    Loyalty,
}

/// A write that belongs to an order but failed after the order itself was stored. The order stands; these are
/// reported so that the caller (or an operator) can repair them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubWriteFailure {
    pub kind: SubWriteKind,
    /// The item id, charge id or customer id the write was about.
    pub target: String,
    pub detail: String,
}

impl SubWriteFailure {
    pub fn new<T: Display, D: Display>(kind: SubWriteKind, target: T, detail: D) -> Self {
        Self { kind, target: target.to_string(), detail: detail.to_string() }
    }
}
