use std::fmt::Debug;

use chrono::{DateTime, Utc};
use fog_common::{Money, DEFAULT_CURRENCY_CODE};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Coupon, DiscountType},
    fog_api::errors::CouponError,
    traits::CouponManagement,
};

/// The outcome of a successful coupon validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponValidation {
    pub valid: bool,
    pub coupon_id: String,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub discount_amount: Money,
    pub description: String,
}

pub struct CouponApi<B> {
    db: B,
}

impl<B> Debug for CouponApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CouponApi")
    }
}

impl<B> CouponApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CouponApi<B>
where B: CouponManagement
{
    /// Looks up `code` (case-insensitively) among the tenant's active coupons and evaluates it against `subtotal`.
    pub async fn validate(&self, code: &str, subtotal: Money) -> Result<CouponValidation, CouponError> {
        let code = code.trim().to_uppercase();
        let coupon = self.db.fetch_active_coupon(&code).await?.ok_or_else(|| {
            debug!("🎟️ Coupon {code} is unknown or inactive");
            CouponError::NotFound(code.clone())
        })?;
        let result = evaluate_coupon(&coupon, subtotal, Utc::now());
        match &result {
            Ok(v) => debug!("🎟️ Coupon {code} is valid for {subtotal}. Discount: {}", v.discount_amount),
            Err(e) => debug!("🎟️ Coupon {code} rejected for {subtotal}. {e}"),
        }
        result
    }

    pub async fn active_coupons(&self) -> Result<Vec<Coupon>, CouponError> {
        Ok(self.db.fetch_active_coupons().await?)
    }
}

/// Evaluates `coupon` against `subtotal` at time `now`.
///
/// Checks run in this order: minimum order amount, start date, expiry. Percentage discounts are capped by
/// `max_discount_amount` when one is set. Fixed discounts are returned as they are, even when they exceed the
/// subtotal. The discount is held in minor units, i.e. it is already rounded to three decimal places.
pub fn evaluate_coupon(coupon: &Coupon, subtotal: Money, now: DateTime<Utc>) -> Result<CouponValidation, CouponError> {
    let min_order = coupon.min_order_amount.unwrap_or_default();
    if subtotal < min_order {
        return Err(CouponError::InvalidRequest(format!(
            "Minimum order amount for this coupon is {min_order} {DEFAULT_CURRENCY_CODE}"
        )));
    }
    if coupon.starts_at.is_some_and(|starts| starts > now) {
        return Err(CouponError::InvalidRequest("Coupon is not yet valid".into()));
    }
    if coupon.expires_at.is_some_and(|expires| expires < now) {
        return Err(CouponError::InvalidRequest("Coupon has expired".into()));
    }
    let discount_amount = match coupon.discount_type {
        DiscountType::Percentage => {
            let raw = subtotal.percent(coupon.discount_value);
            match coupon.max_discount_amount {
                Some(cap) if cap > Money::default() && raw > cap => cap,
                _ => raw,
            }
        },
        DiscountType::Fixed => Money::try_from(coupon.discount_value)
            .map_err(|e| CouponError::InvalidRequest(format!("Coupon {} is misconfigured. {e}", coupon.code)))?,
    };
    Ok(CouponValidation {
        valid: true,
        coupon_id: coupon.id.clone(),
        code: coupon.code.clone(),
        discount_type: coupon.discount_type,
        discount_value: coupon.discount_value,
        discount_amount,
        description: coupon.description.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod test {
    use chrono::Duration;

    use super::*;

    fn percent20() -> Coupon {
        Coupon {
            id: "cp-1".into(),
            tenant_id: None,
            code: "PERCENT20".into(),
            description: Some("20% off".into()),
            discount_type: DiscountType::Percentage,
            discount_value: 20.0,
            min_order_amount: Some(Money::from_major(5)),
            max_discount_amount: Some(Money::from_major(10)),
            starts_at: None,
            expires_at: None,
            status: Some("active".into()),
        }
    }

    fn fixed5() -> Coupon {
        Coupon {
            id: "cp-2".into(),
            code: "FIXED5".into(),
            description: None,
            discount_type: DiscountType::Fixed,
            discount_value: 5.0,
            min_order_amount: Some(Money::from_major(10)),
            max_discount_amount: None,
            ..percent20()
        }
    }

    #[test]
    fn percentage_discount() {
        let now = Utc::now();
        let v = evaluate_coupon(&percent20(), Money::from_major(10), now).unwrap();
        assert!(v.valid);
        assert_eq!(v.discount_amount, Money::from_minor(2_000));
        assert_eq!(v.description, "20% off");
    }

    #[test]
    fn percentage_discount_is_capped() {
        let v = evaluate_coupon(&percent20(), Money::from_major(100), Utc::now()).unwrap();
        assert_eq!(v.discount_amount, Money::from_major(10));
    }

    #[test]
    fn zero_cap_means_uncapped() {
        let coupon = Coupon { max_discount_amount: Some(Money::default()), ..percent20() };
        let v = evaluate_coupon(&coupon, Money::from_major(100), Utc::now()).unwrap();
        assert_eq!(v.discount_amount, Money::from_major(20));
    }

    #[test]
    fn below_minimum() {
        let err = evaluate_coupon(&percent20(), Money::from_major(3), Utc::now()).unwrap_err();
        match err {
            CouponError::InvalidRequest(msg) => assert_eq!(msg, "Minimum order amount for this coupon is 5.000 KWD"),
            e => panic!("Unexpected error {e}"),
        }
    }

    #[test]
    fn fixed_discount_is_verbatim() {
        let v = evaluate_coupon(&fixed5(), Money::from_major(15), Utc::now()).unwrap();
        assert_eq!(v.discount_amount, Money::from_minor(5_000));
        let big = Coupon { discount_value: 20.0, min_order_amount: None, ..fixed5() };
        let v = evaluate_coupon(&big, Money::from_major(15), Utc::now()).unwrap();
        assert_eq!(v.discount_amount, Money::from_major(20));
    }

    #[test]
    fn date_window() {
        let now = Utc::now();
        let expired = Coupon { expires_at: Some(now - Duration::days(1)), ..percent20() };
        assert!(matches!(
            evaluate_coupon(&expired, Money::from_major(10), now),
            Err(CouponError::InvalidRequest(m)) if m == "Coupon has expired"
        ));
        let future = Coupon { starts_at: Some(now + Duration::days(1)), ..percent20() };
        assert!(matches!(
            evaluate_coupon(&future, Money::from_major(10), now),
            Err(CouponError::InvalidRequest(m)) if m == "Coupon is not yet valid"
        ));
        // The minimum is checked before the dates
        assert!(matches!(
            evaluate_coupon(&expired, Money::from_major(1), now),
            Err(CouponError::InvalidRequest(m)) if m.starts_with("Minimum order amount")
        ));
    }

    #[test]
    fn fractional_percentages_round_to_minor_units() {
        let coupon = Coupon { discount_value: 12.5, max_discount_amount: None, ..percent20() };
        let v = evaluate_coupon(&coupon, Money::from_minor(7_777), Utc::now()).unwrap();
        // 7.777 * 12.5% = 0.972125
        assert_eq!(v.discount_amount, Money::from_minor(972));
    }
}
