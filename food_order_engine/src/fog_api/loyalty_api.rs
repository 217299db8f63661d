use std::fmt::Debug;

use fog_common::{Money, MINOR_UNITS_PER_MAJOR};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{LoyaltySettings, NewLoyaltyEntry, Order},
    fog_api::errors::LoyaltyError,
    traits::LoyaltyManagement,
};

/// The points movement applied to a customer for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyDelta {
    pub customer_id: String,
    pub earned: i64,
    pub spent: i64,
    pub balance: i64,
}

pub struct LoyaltyApi<B> {
    db: B,
}

impl<B> Debug for LoyaltyApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LoyaltyApi")
    }
}

impl<B> LoyaltyApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> LoyaltyApi<B>
where B: LoyaltyManagement
{
    /// The tenant's settings, or the defaults if none have been saved yet.
    pub async fn settings(&self) -> Result<LoyaltySettings, LoyaltyError> {
        current_settings(&self.db).await
    }

    pub async fn save_settings(&self, settings: LoyaltySettings) -> Result<LoyaltySettings, LoyaltyError> {
        validate_settings(&settings)?;
        let saved = self.db.save_loyalty_settings(&settings).await?;
        info!("⭐️ Loyalty settings saved. Enabled: {}, {} points per unit", saved.enabled, saved.points_per_kwd);
        Ok(saved)
    }

    pub async fn apply_order_delta(&self, order: &Order) -> Result<Option<LoyaltyDelta>, LoyaltyError> {
        apply_order_delta(&self.db, order).await
    }
}

pub(crate) async fn current_settings<B: LoyaltyManagement>(db: &B) -> Result<LoyaltySettings, LoyaltyError> {
    let settings = db.fetch_loyalty_settings().await?.unwrap_or_else(|| {
        debug!("⭐️ No loyalty settings saved for this tenant. Using defaults.");
        LoyaltySettings::default()
    });
    Ok(settings)
}

fn validate_settings(settings: &LoyaltySettings) -> Result<(), LoyaltyError> {
    if settings.points_per_kwd < 0.0 || !settings.points_per_kwd.is_finite() {
        return Err(LoyaltyError::InvalidSettings("points_per_kwd must be zero or more".into()));
    }
    if settings.redemption_rate < 0.0 || !settings.redemption_rate.is_finite() {
        return Err(LoyaltyError::InvalidSettings("redemption_rate must be zero or more".into()));
    }
    if !(0.0..=100.0).contains(&settings.max_redemption_percent) {
        return Err(LoyaltyError::InvalidSettings("max_redemption_percent must be between 0 and 100".into()));
    }
    if settings.min_order_amount.is_negative() || settings.min_points_to_redeem < 0 {
        return Err(LoyaltyError::InvalidSettings("Minimums cannot be negative".into()));
    }
    if settings.points_expiry_days.is_some_and(|d| d < 0) {
        return Err(LoyaltyError::InvalidSettings("points_expiry_days cannot be negative".into()));
    }
    Ok(())
}

/// The points an order earns under `settings`.
///
/// The earning base is the subtotal less the discount, plus tax and the delivery fee when the settings say so.
/// Disabled programmes, and orders whose total is below the programme minimum, earn nothing.
pub fn points_earned(settings: &LoyaltySettings, order: &Order) -> i64 {
    if !settings.enabled || order.total_amount < settings.min_order_amount {
        return 0;
    }
    let mut base = order.subtotal - order.discount_amount;
    if settings.earn_on_tax {
        base += order.tax_amount;
    }
    if settings.earn_on_delivery_fee {
        base += order.delivery_fee;
    }
    if base <= Money::default() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    let points = (base.value() as f64 * settings.points_per_kwd / MINOR_UNITS_PER_MAJOR as f64).floor() as i64;
    points.max(0)
}

/// Applies the points earned and redeemed on `order` to the ordering customer and appends a ledger entry.
///
/// The new balance is carried forward from the customer's current balance and never drops below zero. Orders without
/// a customer id, and orders that neither earn nor redeem points, change nothing and return `None`.
pub(crate) async fn apply_order_delta<B: LoyaltyManagement>(
    db: &B,
    order: &Order,
) -> Result<Option<LoyaltyDelta>, LoyaltyError> {
    let Some(customer_id) = order.customer_id.as_deref().filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    let settings = current_settings(db).await?;
    let earned = points_earned(&settings, order);
    let spent = order.loyalty_points_redeemed.max(0);
    if earned == 0 && spent == 0 {
        trace!("⭐️ Order {} neither earns nor redeems points", order.order_number);
        return Ok(None);
    }
    let customer =
        db.fetch_customer(customer_id).await?.ok_or_else(|| LoyaltyError::CustomerNotFound(customer_id.to_string()))?;
    let balance = (customer.loyalty_points + earned - spent).max(0);
    db.update_customer_points(customer_id, balance).await?;
    let entry = NewLoyaltyEntry {
        customer_id: customer_id.to_string(),
        order_id: Some(order.id.clone()),
        points_earned: earned,
        points_spent: spent,
        balance_after: balance,
        description: Some(format!("Order {}", order.order_number)),
    };
    db.insert_loyalty_entry(&entry).await?;
    info!("⭐️ Customer {customer_id}: +{earned} -{spent} points for order {}. Balance {balance}", order.order_number);
    Ok(Some(LoyaltyDelta { customer_id: customer_id.to_string(), earned, spent, balance }))
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;
    use crate::db_types::{OrderId, OrderStatus, OrderType, PaymentMethod, PaymentStatus};

    fn order(subtotal: i64, discount: i64, tax: i64, delivery: i64) -> Order {
        let subtotal = Money::from_minor(subtotal);
        let discount_amount = Money::from_minor(discount);
        let tax_amount = Money::from_minor(tax);
        let delivery_fee = Money::from_minor(delivery);
        Order {
            id: OrderId::from("o1"),
            order_number: "WEB-20240301-0001".into(),
            tenant_id: None,
            branch_id: None,
            customer_id: Some("c1".into()),
            user_id: None,
            order_type: OrderType::Delivery,
            channel: None,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Cash,
            payment_reference: None,
            customer_name: "Sara".into(),
            customer_phone: "99999999".into(),
            customer_email: None,
            delivery_address: None,
            delivery_instructions: None,
            subtotal,
            discount_amount,
            delivery_fee,
            tax_amount,
            service_charge: Money::default(),
            total_amount: subtotal - discount_amount + delivery_fee + tax_amount,
            coupon_code: None,
            loyalty_points_redeemed: 0,
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
            accepted_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn earning_base() {
        let settings = LoyaltySettings::default();
        // 12.750 - 1.000 = 11.750 -> 11 points
        assert_eq!(points_earned(&settings, &order(12_750, 1_000, 500, 750)), 11);
        let generous = LoyaltySettings { earn_on_tax: true, earn_on_delivery_fee: true, ..LoyaltySettings::default() };
        // 11.750 + 0.500 + 0.750 = 13.000
        assert_eq!(points_earned(&generous, &order(12_750, 1_000, 500, 750)), 13);
        let double = LoyaltySettings { points_per_kwd: 2.5, ..LoyaltySettings::default() };
        assert_eq!(points_earned(&double, &order(3_300, 0, 0, 0)), 8);
    }

    #[test]
    fn no_points_when_disabled_or_below_minimum() {
        let disabled = LoyaltySettings { enabled: false, ..LoyaltySettings::default() };
        assert_eq!(points_earned(&disabled, &order(10_000, 0, 0, 0)), 0);
        let min = LoyaltySettings { min_order_amount: Money::from_major(5), ..LoyaltySettings::default() };
        assert_eq!(points_earned(&min, &order(4_000, 0, 0, 500)), 0);
        assert_eq!(points_earned(&min, &order(4_500, 0, 0, 500)), 4);
        assert_eq!(points_earned(&LoyaltySettings::default(), &order(2_000, 5_000, 0, 0)), 0);
    }

    #[test]
    fn settings_validation() {
        assert!(validate_settings(&LoyaltySettings::default()).is_ok());
        let bad = LoyaltySettings { max_redemption_percent: 120.0, ..LoyaltySettings::default() };
        assert!(matches!(validate_settings(&bad), Err(LoyaltyError::InvalidSettings(_))));
        let bad = LoyaltySettings { points_per_kwd: -1.0, ..LoyaltySettings::default() };
        assert!(validate_settings(&bad).is_err());
    }
}
