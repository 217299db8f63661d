use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use fog_common::Money;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

//--------------------------------------       OrderId       ---------------------------------------------------------
/// The store-assigned, opaque identifier of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

//--------------------------------------      OrderType      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Delivery,
    Pickup,
}

//--------------------------------------     OrderStatus     ---------------------------------------------------------
/// The kitchen and delivery lifecycle of an order.
///
/// Any status may follow any other; only the timestamps written alongside the change depend on the new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        Self::Pending,
        Self::Accepted,
        Self::Preparing,
        Self::Ready,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Delivered, completed and cancelled orders are finished. Moving an order into one of these stamps `completed_at`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Completed | Self::Cancelled)
    }

    /// The accepted status strings, for error messages.
    pub fn valid_values() -> String {
        Self::ALL.iter().map(OrderStatus::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| ConversionError(format!("Invalid status. Must be one of: {}", Self::valid_values())))
    }
}

//--------------------------------------    PaymentStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Cash orders, settled on delivery or collection.
    Pending,
    /// A provisional online order whose charge has not been confirmed yet.
    PaymentPending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PaymentPending => "payment_pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//--------------------------------------    PaymentMethod    ---------------------------------------------------------
/// How the customer intends to pay. Only [`PaymentMethod::Online`] goes through the card gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentMethod {
    #[default]
    Cash,
    /// Card on delivery or at the counter.
    Card,
    Online,
}

impl PaymentMethod {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Online => "online",
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tap" | "online" => Self::Online,
            "card" => Self::Card,
            _ => Self::Cash,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.as_deref().map(PaymentMethod::from).unwrap_or_default())
    }
}

//--------------------------------------   DeliveryAddress   ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub area: String,
    pub block: String,
    #[serde(default)]
    pub street: Option<String>,
    pub building: String,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub apartment: Option<String>,
    #[serde(default)]
    pub additional_directions: Option<String>,
    #[serde(default)]
    pub geo_lat: Option<f64>,
    #[serde(default)]
    pub geo_lng: Option<f64>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
/// A modifier chosen for a line item. Name and price are a snapshot taken when the order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierSelection {
    #[serde(default)]
    pub modifier_id: Option<String>,
    #[serde(alias = "modifier_name")]
    pub name: String,
    #[serde(default, alias = "price_adjustment")]
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub item_id: String,
    pub item_name_en: String,
    #[serde(default)]
    pub item_name_ar: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<ModifierSelection>,
}

/// An order as submitted by the storefront.
///
/// Monetary totals are taken as given; they are not recomputed from catalog prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_type: OrderType,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default)]
    pub delivery_instructions: Option<String>,
    pub items: Vec<NewOrderItem>,
    pub subtotal: Money,
    #[serde(default)]
    pub discount_amount: Money,
    #[serde(default)]
    pub delivery_fee: Money,
    #[serde(default)]
    pub tax_amount: Money,
    #[serde(default)]
    pub service_charge: Money,
    pub total_amount: Money,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub loyalty_points_redeemed: i64,
}

impl NewOrder {
    /// Checks the shape of the request. Returns a human-readable reason for the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.customer_name.trim().is_empty() {
            return Err("Customer name is required".into());
        }
        if self.customer_phone.trim().is_empty() {
            return Err("Customer phone is required".into());
        }
        if self.items.is_empty() {
            return Err("An order must contain at least one item".into());
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity < 1) {
            return Err(format!("Item {} has quantity {}. Quantities must be at least 1", item.item_id, item.quantity));
        }
        let amounts = [
            ("subtotal", self.subtotal),
            ("discount_amount", self.discount_amount),
            ("delivery_fee", self.delivery_fee),
            ("tax_amount", self.tax_amount),
            ("service_charge", self.service_charge),
            ("total_amount", self.total_amount),
        ];
        if let Some((name, _)) = amounts.iter().find(|(_, v)| v.is_negative()) {
            return Err(format!("{name} cannot be negative"));
        }
        if self.loyalty_points_redeemed < 0 {
            return Err("loyalty_points_redeemed cannot be negative".into());
        }
        Ok(())
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
/// An order row as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub order_type: OrderType,
    #[serde(default)]
    pub channel: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// The gateway charge id for online orders.
    #[serde(default)]
    pub payment_reference: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default)]
    pub delivery_instructions: Option<String>,
    pub subtotal: Money,
    #[serde(default)]
    pub discount_amount: Money,
    #[serde(default)]
    pub delivery_fee: Money,
    #[serde(default)]
    pub tax_amount: Money,
    #[serde(default)]
    pub service_charge: Money,
    pub total_amount: Money,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub loyalty_points_redeemed: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// The fields written when an order is first stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrderRecord {
    pub tenant_id: String,
    pub branch_id: String,
    pub user_id: String,
    pub order_number: String,
    pub order_type: OrderType,
    pub channel: &'static str,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub delivery_address: Option<DeliveryAddress>,
    pub delivery_instructions: Option<String>,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub delivery_fee: Money,
    pub tax_amount: Money,
    pub service_charge: Money,
    pub total_amount: Money,
    pub coupon_code: Option<String>,
    pub loyalty_points_redeemed: i64,
    pub notes: Option<String>,
}

/// A status change, together with the timestamps it implies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl OrderStatusUpdate {
    pub fn new(status: OrderStatus, now: DateTime<Utc>) -> Self {
        let accepted_at = (status == OrderStatus::Accepted).then_some(now);
        let completed_at = status.is_terminal().then_some(now);
        Self { status, updated_at: now, accepted_at, completed_at }
    }
}

//--------------------------------------      OrderItem      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: OrderId,
    pub item_id: String,
    pub item_name_en: String,
    #[serde(default)]
    pub item_name_ar: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrderItemRecord {
    pub order_id: OrderId,
    pub item_id: String,
    pub item_name_en: String,
    pub item_name_ar: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub notes: Option<String>,
    pub status: &'static str,
}

impl NewOrderItemRecord {
    pub fn new(order_id: &OrderId, item: &NewOrderItem) -> Self {
        Self {
            order_id: order_id.clone(),
            item_id: item.item_id.clone(),
            item_name_en: item.item_name_en.clone(),
            item_name_ar: item.item_name_ar.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
            notes: item.notes.clone(),
            status: "pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemModifier {
    #[serde(default)]
    pub id: Option<String>,
    pub order_item_id: String,
    #[serde(default)]
    pub modifier_id: Option<String>,
    pub modifier_name: String,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewItemModifierRecord {
    pub order_item_id: String,
    pub modifier_id: Option<String>,
    pub modifier_name: String,
    pub price: Money,
}

impl NewItemModifierRecord {
    pub fn new(order_item_id: &str, selection: &ModifierSelection) -> Self {
        Self {
            order_item_id: order_item_id.to_string(),
            modifier_id: selection.modifier_id.clone(),
            modifier_name: selection.name.clone(),
            price: selection.price,
        }
    }
}

//--------------------------------------    PaymentRecord    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    pub order_id: OrderId,
    pub provider: String,
    pub transaction_id: String,
    pub amount: Money,
    #[serde(default)]
    pub currency: String,
    pub status: String,
    /// The provider's response, kept verbatim for audit.
    #[serde(default)]
    pub raw_response: Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPaymentRecord {
    pub order_id: OrderId,
    pub provider: String,
    pub transaction_id: String,
    pub amount: Money,
    pub currency: String,
    pub status: String,
    pub raw_response: Value,
}

//--------------------------------------       Coupon        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[default]
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub discount_type: DiscountType,
    /// A percentage for [`DiscountType::Percentage`] coupons, an amount in major units for fixed ones.
    #[serde(default)]
    pub discount_value: f64,
    #[serde(default)]
    pub min_order_amount: Option<Money>,
    /// Only applies to percentage coupons.
    #[serde(default)]
    pub max_discount_amount: Option<Money>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

//--------------------------------------       Loyalty       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltySettings {
    pub enabled: bool,
    /// Points earned per whole currency unit spent.
    pub points_per_kwd: f64,
    /// Orders with a total below this earn no points.
    pub min_order_amount: Money,
    pub earn_on_tax: bool,
    pub earn_on_delivery_fee: bool,
    /// Currency value of a single point when redeemed.
    pub redemption_rate: f64,
    pub min_points_to_redeem: i64,
    pub max_redemption_percent: f64,
    pub points_expiry_days: Option<i64>,
    pub expiry_type: Option<String>,
    pub notes: Option<String>,
}

impl Default for LoyaltySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            points_per_kwd: 1.0,
            min_order_amount: Money::default(),
            earn_on_tax: false,
            earn_on_delivery_fee: false,
            redemption_rate: 0.01,
            min_points_to_redeem: 0,
            max_redemption_percent: 100.0,
            points_expiry_days: None,
            expiry_type: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub loyalty_points: i64,
}

/// One line of the append-only points ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyEntry {
    pub id: String,
    pub customer_id: String,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub points_earned: i64,
    pub points_spent: i64,
    pub balance_after: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLoyaltyEntry {
    pub customer_id: String,
    pub order_id: Option<OrderId>,
    pub points_earned: i64,
    pub points_spent: i64,
    pub balance_after: i64,
    pub description: Option<String>,
}
