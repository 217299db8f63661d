use actix_web::{http::StatusCode, test::TestRequest};
use food_order_engine::{db_types::PaymentMethod, traits::ChargeOutcome};
use serde_json::{json, Value};

use super::helpers::{shawarma_order, TestServer};
use crate::config::ServerOptions;

async fn place_online_order(server: &TestServer) -> Value {
    let req = TestRequest::post().uri("/api/orders").set_json(shawarma_order(PaymentMethod::Online));
    let (status, created) = server.call_json(req).await;
    assert_eq!(status, StatusCode::OK);
    created
}

#[actix_web::test]
async fn verify_captured_charge() {
    let server = TestServer::new();
    let created = place_online_order(&server).await;
    server.gateway.set_outcome("chg_1", ChargeOutcome::Captured).await;

    let (status, result) = server.call_json(TestRequest::get().uri("/api/payment/verify/chg_1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], true);
    assert_eq!(result["status"], "paid");
    assert_eq!(result["order_id"], created["id"]);
    assert_eq!(result["order_number"], created["order_number"]);

    // The paid order now shows up for the kitchen, with its payment
    let (_, orders) = server.call_json(TestRequest::get().uri("/api/admin/orders")).await;
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["payment_status"], "paid");
    assert_eq!(orders[0]["payment"]["transaction_id"], "chg_1");

    // Polling again changes nothing
    let (status, result) = server.call_json(TestRequest::get().uri("/api/payment/verify/chg_1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["status"], "paid");
    assert_eq!(server.store.all_payments().await.len(), 1);
}

#[actix_web::test]
async fn verify_unknown_charge() {
    let server = TestServer::new();
    let (status, result) = server.call_json(TestRequest::get().uri("/api/payment/verify/chg_fake")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], false);
    assert_eq!(result["status"], "not_found");
}

#[actix_web::test]
async fn pending_charge_by_order_id() {
    let server = TestServer::new();
    let created = place_online_order(&server).await;
    let id = created["id"].as_str().unwrap();
    let (status, result) = server.call_json(TestRequest::get().uri(&format!("/api/payment/status/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["status"], "pending");
    assert_eq!(server.store.all_orders().await.len(), 1);
}

#[actix_web::test]
async fn declined_charge_discards_the_order() {
    let server = TestServer::new();
    let created = place_online_order(&server).await;
    let id = created["id"].as_str().unwrap();
    server.gateway.set_outcome("chg_1", ChargeOutcome::Failed("DECLINED".into())).await;

    let (status, result) = server.call_json(TestRequest::get().uri(&format!("/api/payment/status/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["status"], "failed");
    assert!(server.store.all_orders().await.is_empty());
    assert!(server.store.all_items().await.is_empty());

    let (status, result) = server.call_json(TestRequest::get().uri(&format!("/api/payment/status/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["status"], "not_found");
}

#[actix_web::test]
async fn webhook_reconciles_charge() {
    let server = TestServer::new();
    place_online_order(&server).await;
    server.gateway.set_outcome("chg_1", ChargeOutcome::Captured).await;
    let req = TestRequest::post().uri("/api/payment/webhook").set_json(json!({ "id": "chg_1", "status": "CAPTURED" }));
    let (status, result) = server.call_json(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["status"], "paid");
    assert_eq!(server.store.all_payments().await.len(), 1);
}

#[actix_web::test]
async fn webhook_for_unknown_charge_is_acknowledged() {
    let server = TestServer::new();
    let req = TestRequest::post().uri("/api/payment/webhook").set_json(json!({ "id": "chg_nobody" }));
    let (status, result) = server.call_json(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["status"], "not_found");
}

#[actix_web::test]
async fn webhook_whitelist() {
    let options = ServerOptions {
        use_x_forwarded_for: true,
        use_forwarded: false,
        webhook_whitelist: Some(vec!["203.0.113.10".parse().unwrap()]),
    };
    let server = TestServer::new().with_options(options);
    place_online_order(&server).await;
    server.gateway.set_outcome("chg_1", ChargeOutcome::Captured).await;

    let req = TestRequest::post()
        .uri("/api/payment/webhook")
        .insert_header(("X-Forwarded-For", "198.51.100.99"))
        .set_json(json!({ "id": "chg_1" }));
    let (status, body) = server.call_json(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "This address may not call this endpoint" }));
    assert!(server.store.all_payments().await.is_empty());

    let req = TestRequest::post()
        .uri("/api/payment/webhook")
        .insert_header(("X-Forwarded-For", "203.0.113.10"))
        .set_json(json!({ "id": "chg_1" }));
    let (status, result) = server.call_json(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["status"], "paid");
}
