use actix_web::{http::StatusCode, test::TestRequest};
use food_order_engine::db_types::{OrderStatus, PaymentMethod, PaymentStatus};
use serde_json::json;

use super::helpers::{shawarma_order, TestServer};

#[actix_web::test]
async fn health_check() {
    let server = TestServer::new();
    let (status, body) = server.call(TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn place_cash_order_and_fetch_it() {
    let server = TestServer::new();
    let req = TestRequest::post().uri("/api/orders").set_json(shawarma_order(PaymentMethod::Cash));
    let (status, created) = server.call_json(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["requires_payment"], false);
    assert!(created.get("payment_url").is_none());
    let id = created["id"].as_str().unwrap().to_string();
    let number = created["order_number"].as_str().unwrap().to_string();
    assert!(number.starts_with("WEB-"));

    let (status, order) = server.call_json(TestRequest::get().uri(&format!("/api/orders/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["customer_name"], "Yousef");
    assert_eq!(order["total_amount"], json!(5.5));
    assert_eq!(order["items"].as_array().unwrap().len(), 1);

    let (status, order) = server.call_json(TestRequest::get().uri(&format!("/api/orders/number/{number}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["id"], id.as_str());
}

#[actix_web::test]
async fn online_order_is_hidden_until_paid() {
    let server = TestServer::new();
    let req = TestRequest::post().uri("/api/orders").set_json(shawarma_order(PaymentMethod::Online));
    let (status, created) = server.call_json(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["requires_payment"], true);
    assert_eq!(created["payment_url"], "https://pay.example.com/chg_1");
    assert_eq!(created["charge_id"], "chg_1");

    let (status, orders) = server.call_json(TestRequest::get().uri("/api/admin/orders")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(orders.as_array().unwrap().is_empty());
    assert_eq!(server.store.all_orders().await[0].payment_status, PaymentStatus::PaymentPending);
}

#[actix_web::test]
async fn malformed_order_bodies_are_rejected() {
    let server = TestServer::new();
    let req = TestRequest::post().uri("/api/orders").set_json(json!({ "customer_name": "Yousef" }));
    let (status, body) = server.call_json(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("missing field"));

    let mut order = shawarma_order(PaymentMethod::Cash);
    order.customer_name = "  ".into();
    let (status, body) = server.call_json(TestRequest::post().uri("/api/orders").set_json(order)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Customer name is required" }));
    assert!(server.store.all_orders().await.is_empty());
}

#[actix_web::test]
async fn unknown_orders_are_404() {
    let server = TestServer::new();
    let (status, body) = server.call_json(TestRequest::get().uri("/api/orders/ord-missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order ord-missing not found");
    let (status, _) = server.call(TestRequest::get().uri("/api/orders/number/WEB-20240101-0001")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn update_order_status() {
    let server = TestServer::new();
    let req = TestRequest::post().uri("/api/orders").set_json(shawarma_order(PaymentMethod::Cash));
    let (_, created) = server.call_json(req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = TestRequest::patch().uri(&format!("/api/orders/{id}/status?status=accepted"));
    let (status, body) = server.call_json(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "status": "accepted" }));
    let order = server.store.all_orders().await.remove(0);
    assert_eq!(order.status, OrderStatus::Accepted);

    let req = TestRequest::patch().uri(&format!("/api/orders/{id}/status?status=eaten"));
    let (status, body) = server.call_json(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid status. Must be one of: pending, accepted"));

    let req = TestRequest::patch().uri(&format!("/api/orders/{id}/status"));
    let (status, _) = server.call(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::patch().uri("/api/orders/ord-missing/status?status=ready");
    let (status, _) = server.call(req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_list_filters_by_status() {
    let server = TestServer::new();
    for _ in 0..3 {
        let req = TestRequest::post().uri("/api/orders").set_json(shawarma_order(PaymentMethod::Cash));
        let (status, _) = server.call(req).await;
        assert_eq!(status, StatusCode::OK);
    }
    let id = server.store.all_orders().await[0].id.to_string();
    let (status, _) = server.call(TestRequest::patch().uri(&format!("/api/orders/{id}/status?status=ready"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, orders) = server.call_json(TestRequest::get().uri("/api/admin/orders")).await;
    assert_eq!(orders.as_array().unwrap().len(), 3);
    let (_, orders) = server.call_json(TestRequest::get().uri("/api/admin/orders?status=ready")).await;
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], id.as_str());
    assert!(orders[0]["payment"].is_null());
    let (_, orders) = server.call_json(TestRequest::get().uri("/api/admin/orders?limit=2")).await;
    assert_eq!(orders.as_array().unwrap().len(), 2);
    let (status, _) = server.call(TestRequest::get().uri("/api/admin/orders?status=lost")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
