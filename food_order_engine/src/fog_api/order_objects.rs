use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderId, OrderItem, OrderItemModifier, PaymentRecord},
    traits::{ChargeSession, SubWriteFailure},
};

//--------------------------------------  OrderCreationResult  -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreationResult {
    pub id: OrderId,
    pub order_number: String,
    /// `pending` for orders that go straight to the kitchen, `awaiting_payment` for online orders.
    pub status: String,
    pub requires_payment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_sub_writes: Vec<SubWriteFailure>,
}

impl OrderCreationResult {
    pub fn placed(order: &Order, failed_sub_writes: Vec<SubWriteFailure>) -> Self {
        Self {
            id: order.id.clone(),
            order_number: order.order_number.clone(),
            status: order.status.to_string(),
            requires_payment: false,
            payment_url: None,
            charge_id: None,
            created_at: order.created_at,
            failed_sub_writes,
        }
    }

    pub fn awaiting_payment(order: &Order, session: ChargeSession, failed_sub_writes: Vec<SubWriteFailure>) -> Self {
        Self {
            id: order.id.clone(),
            order_number: order.order_number.clone(),
            status: "awaiting_payment".to_string(),
            requires_payment: true,
            payment_url: Some(session.payment_url),
            charge_id: Some(session.charge_id),
            created_at: order.created_at,
            failed_sub_writes,
        }
    }
}

//--------------------------------------  ReconciliationResult  ------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStatus {
    Paid,
    Pending,
    Failed,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub success: bool,
    pub status: ReconcileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_sub_writes: Vec<SubWriteFailure>,
}

impl ReconciliationResult {
    fn new(status: ReconcileStatus, order: Option<&Order>, message: &str) -> Self {
        Self {
            success: status == ReconcileStatus::Paid,
            status,
            order_id: order.map(|o| o.id.clone()),
            order_number: order.map(|o| o.order_number.clone()),
            message: message.to_string(),
            failed_sub_writes: Vec::new(),
        }
    }

    pub fn paid(order: &Order, message: &str) -> Self {
        Self::new(ReconcileStatus::Paid, Some(order), message)
    }

    pub fn pending(order: &Order, message: &str) -> Self {
        Self::new(ReconcileStatus::Pending, Some(order), message)
    }

    pub fn failed(order: &Order, message: &str) -> Self {
        Self::new(ReconcileStatus::Failed, Some(order), message)
    }

    /// A failed payment whose order has already been discarded.
    pub fn discarded(order_id: &OrderId, order_number: Option<&str>, message: &str) -> Self {
        Self {
            order_id: Some(order_id.clone()),
            order_number: order_number.map(String::from),
            ..Self::new(ReconcileStatus::Failed, None, message)
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(ReconcileStatus::NotFound, None, message)
    }

    pub fn with_failures(mut self, failures: Vec<SubWriteFailure>) -> Self {
        self.failed_sub_writes = failures;
        self
    }
}

//--------------------------------------     Order views      --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemWithModifiers {
    #[serde(flatten)]
    pub item: OrderItem,
    pub modifiers: Vec<OrderItemModifier>,
}

/// An order together with its line items and their modifier selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<ItemWithModifiers>,
}

/// An order as shown in the admin list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub payment: Option<PaymentRecord>,
}

//--------------------------------------   ProvisionalSweep   --------------------------------------------------------
/// What one pass over stale provisional orders did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionalSweep {
    pub examined: usize,
    pub paid: usize,
    pub discarded: usize,
    pub still_pending: usize,
    pub errors: usize,
}
