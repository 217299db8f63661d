mod support;

use chrono::{Duration, Utc};
use fog_common::Money;
use food_order_engine::{
    db_types::{Coupon, DiscountType, LoyaltySettings, PaymentMethod},
    test_utils::MemoryStore,
    traits::CatalogKind,
    CatalogApi,
    CouponApi,
    CouponError,
    LoyaltyApi,
    LoyaltyError,
};
use serde_json::json;
use support::{customer, new_order, setup};

fn coupon(code: &str, discount_type: DiscountType, value: f64) -> Coupon {
    Coupon {
        id: format!("cp-{code}"),
        tenant_id: Some("tenant-1".into()),
        code: code.into(),
        description: None,
        discount_type,
        discount_value: value,
        min_order_amount: None,
        max_discount_amount: None,
        starts_at: None,
        expires_at: None,
        status: Some("active".into()),
    }
}

#[tokio::test]
async fn coupon_codes_are_case_insensitive() {
    let store = MemoryStore::new();
    store.add_coupon(coupon("PERCENT20", DiscountType::Percentage, 20.0)).await;
    let api = CouponApi::new(store);
    let v = api.validate("  percent20", Money::from_minor(12_345)).await.unwrap();
    assert!(v.valid);
    assert_eq!(v.code, "PERCENT20");
    // 20% of 12.345, rounded to three decimals
    assert_eq!(v.discount_amount, Money::from_minor(2_469));
}

#[tokio::test]
async fn inactive_and_unknown_coupons() {
    let store = MemoryStore::new();
    store.add_coupon(Coupon { status: Some("disabled".into()), ..coupon("OLD", DiscountType::Fixed, 1.0) }).await;
    let api = CouponApi::new(store);
    let err = api.validate("OLD", Money::from_major(50)).await.unwrap_err();
    assert!(matches!(err, CouponError::NotFound(_)));
    assert_eq!(err.to_string(), "Coupon not found or expired");
    assert!(matches!(api.validate("NOPE", Money::from_major(50)).await, Err(CouponError::NotFound(_))));
    assert!(api.active_coupons().await.unwrap().is_empty());
}

#[tokio::test]
async fn coupon_rules_are_applied() {
    let store = MemoryStore::new();
    let now = Utc::now();
    store
        .add_coupon(Coupon { min_order_amount: Some(Money::from_major(10)), ..coupon("FIXED5", DiscountType::Fixed, 5.0) })
        .await;
    store.add_coupon(Coupon { expires_at: Some(now - Duration::hours(1)), ..coupon("GONE", DiscountType::Fixed, 1.0) }).await;
    let api = CouponApi::new(store);
    assert_eq!(api.active_coupons().await.unwrap().len(), 2);

    let v = api.validate("fixed5", Money::from_major(10)).await.unwrap();
    assert_eq!(v.discount_amount, Money::from_major(5));
    assert!(matches!(
        api.validate("fixed5", Money::from_minor(9_999)).await,
        Err(CouponError::InvalidRequest(m)) if m == "Minimum order amount for this coupon is 10.000 KWD"
    ));
    assert!(matches!(
        api.validate("gone", Money::from_major(10)).await,
        Err(CouponError::InvalidRequest(m)) if m == "Coupon has expired"
    ));
}

#[tokio::test]
async fn loyalty_settings_fall_back_to_defaults() {
    let api = LoyaltyApi::new(MemoryStore::new());
    let settings = api.settings().await.unwrap();
    assert_eq!(settings, LoyaltySettings::default());

    let custom = LoyaltySettings { points_per_kwd: 2.5, earn_on_delivery_fee: true, ..LoyaltySettings::default() };
    let saved = api.save_settings(custom.clone()).await.unwrap();
    assert_eq!(saved, custom);
    assert_eq!(api.settings().await.unwrap(), custom);

    let bad = LoyaltySettings { max_redemption_percent: 150.0, ..LoyaltySettings::default() };
    assert!(matches!(api.save_settings(bad).await, Err(LoyaltyError::InvalidSettings(_))));
    assert_eq!(api.settings().await.unwrap(), custom);
}

#[tokio::test]
async fn settings_drive_points_earned() {
    let (api, store, _gateway) = setup();
    store.add_customer(customer("cust-9", 0)).await;
    let loyalty = LoyaltyApi::new(store.clone());
    loyalty
        .save_settings(LoyaltySettings { points_per_kwd: 2.0, earn_on_delivery_fee: true, ..LoyaltySettings::default() })
        .await
        .unwrap();

    let mut order = new_order(PaymentMethod::Cash);
    order.customer_id = Some("cust-9".into());
    order.delivery_fee = Money::from_minor(500);
    order.discount_amount = Money::from_major(2);
    order.total_amount = Money::from_minor(8_500);
    api.create_order(order).await.unwrap();
    // (10 - 2 + 0.5) * 2
    assert_eq!(store.customer("cust-9").await.unwrap().loyalty_points, 17);
}

#[tokio::test]
async fn redemption_never_goes_negative() {
    let (api, store, _gateway) = setup();
    store.add_customer(customer("cust-3", 2)).await;
    LoyaltyApi::new(store.clone())
        .save_settings(LoyaltySettings { enabled: false, ..LoyaltySettings::default() })
        .await
        .unwrap();
    let mut order = new_order(PaymentMethod::Cash);
    order.customer_id = Some("cust-3".into());
    order.loyalty_points_redeemed = 50;
    api.create_order(order).await.unwrap();
    assert_eq!(store.customer("cust-3").await.unwrap().loyalty_points, 0);
    let ledger = store.ledger().await;
    assert_eq!(ledger[0].points_earned, 0);
    assert_eq!(ledger[0].points_spent, 50);
    assert_eq!(ledger[0].balance_after, 0);
}

#[tokio::test]
async fn catalog_rows_pass_through() {
    let store = MemoryStore::new();
    store.add_catalog_row(CatalogKind::Categories, json!({ "id": "cat-1", "name_en": "Burgers" })).await;
    store.add_catalog_row(CatalogKind::DeliveryZones, json!({ "id": "z-1", "area": "Salmiya", "fee": 0.5 })).await;
    let api = CatalogApi::new(store);
    let categories = api.categories().await.unwrap();
    assert_eq!(categories, vec![json!({ "id": "cat-1", "name_en": "Burgers" })]);
    assert_eq!(api.delivery_zones().await.unwrap()[0]["area"], "Salmiya");
    assert!(api.items().await.unwrap().is_empty());
    assert!(api.modifier_groups().await.unwrap().is_empty());
}
