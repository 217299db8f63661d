use actix_web::{http::StatusCode, test::TestRequest};
use fog_common::Money;
use food_order_engine::db_types::{Coupon, DiscountType, LoyaltySettings};
use serde_json::json;

use super::helpers::TestServer;

fn percent_coupon(code: &str, percent: f64) -> Coupon {
    Coupon {
        id: format!("cp-{code}"),
        tenant_id: Some("tenant-1".into()),
        code: code.into(),
        description: Some("Weekend special".into()),
        discount_type: DiscountType::Percentage,
        discount_value: percent,
        min_order_amount: Some(Money::from_major(5)),
        max_discount_amount: None,
        starts_at: None,
        expires_at: None,
        status: Some("active".into()),
    }
}

#[actix_web::test]
async fn list_active_coupons() {
    let server = TestServer::new();
    server.store.add_coupon(percent_coupon("PERCENT20", 20.0)).await;
    server.store.add_coupon(Coupon { status: Some("paused".into()), ..percent_coupon("OLD10", 10.0) }).await;
    let (status, coupons) = server.call_json(TestRequest::get().uri("/api/coupons")).await;
    assert_eq!(status, StatusCode::OK);
    let coupons = coupons.as_array().unwrap();
    assert_eq!(coupons.len(), 1);
    assert_eq!(coupons[0]["code"], "PERCENT20");
}

#[actix_web::test]
async fn validate_coupon() {
    let server = TestServer::new();
    server.store.add_coupon(percent_coupon("PERCENT20", 20.0)).await;

    let req = TestRequest::post().uri("/api/coupons/validate?code=percent20&subtotal=12.345");
    let (status, result) = server.call_json(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["valid"], true);
    assert_eq!(result["code"], "PERCENT20");
    assert_eq!(result["discount_amount"], json!(2.469));

    let req = TestRequest::post().uri("/api/coupons/validate?code=PERCENT20&subtotal=4.5");
    let (status, body) = server.call_json(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Minimum order amount for this coupon is 5.000 KWD");

    let req = TestRequest::post().uri("/api/coupons/validate?code=FREEFOOD&subtotal=20");
    let (status, body) = server.call_json(req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Coupon not found or expired" }));

    let req = TestRequest::post().uri("/api/coupons/validate?code=PERCENT20");
    let (status, _) = server.call(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn loyalty_settings_round_trip() {
    let server = TestServer::new();
    let (status, settings) = server.call_json(TestRequest::get().uri("/api/loyalty/settings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings, serde_json::to_value(LoyaltySettings::default()).unwrap());

    let update = LoyaltySettings { points_per_kwd: 3.0, min_points_to_redeem: 100, ..LoyaltySettings::default() };
    let req = TestRequest::put().uri("/api/loyalty/settings").set_json(&update);
    let (status, saved) = server.call_json(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["points_per_kwd"], json!(3.0));

    let (_, settings) = server.call_json(TestRequest::get().uri("/api/loyalty/settings")).await;
    assert_eq!(settings["min_points_to_redeem"], 100);
}

#[actix_web::test]
async fn invalid_loyalty_settings_are_rejected() {
    let server = TestServer::new();
    let bad = LoyaltySettings { points_per_kwd: -1.0, ..LoyaltySettings::default() };
    let req = TestRequest::put().uri("/api/loyalty/settings").set_json(&bad);
    let (status, body) = server.call_json(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    let (_, settings) = server.call_json(TestRequest::get().uri("/api/loyalty/settings")).await;
    assert_eq!(settings["points_per_kwd"], json!(1.0));
}
