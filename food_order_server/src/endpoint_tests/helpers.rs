use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use fog_common::Money;
use food_order_engine::{
    db_types::{NewOrder, NewOrderItem, OrderType, PaymentMethod},
    test_utils::{prepare_env::prepare_test_env, MemoryStore, TestGateway},
    CatalogApi,
    CouponApi,
    LoyaltyApi,
    OrderFlowApi,
    OrderFlowConfig,
};
use log::debug;
use serde_json::Value;

use crate::{config::ServerOptions, routes::health, server::configure_routes};

/// An app wired to in-memory backends. The store and gateway are shared with every request, so tests can arrange
/// state before a call and inspect it afterwards.
pub struct TestServer {
    pub store: MemoryStore,
    pub gateway: TestGateway,
    pub options: ServerOptions,
}

impl TestServer {
    pub fn new() -> Self {
        prepare_test_env();
        Self { store: MemoryStore::new(), gateway: TestGateway::new(), options: ServerOptions::default() }
    }

    pub fn with_options(mut self, options: ServerOptions) -> Self {
        self.options = options;
        self
    }

    /// Sends `req` through a freshly initialised app and returns the status and body.
    pub async fn call(&self, req: TestRequest) -> (StatusCode, String) {
        let config = OrderFlowConfig {
            tenant_id: "tenant-1".into(),
            branch_id: "branch-1".into(),
            web_user_id: "web-user".into(),
            provider_name: "tap".into(),
        };
        let app = App::new()
            .app_data(web::Data::new(OrderFlowApi::new(self.store.clone(), self.gateway.clone(), config)))
            .app_data(web::Data::new(CouponApi::new(self.store.clone())))
            .app_data(web::Data::new(LoyaltyApi::new(self.store.clone())))
            .app_data(web::Data::new(CatalogApi::new(self.store.clone())))
            .app_data(web::Data::new(self.options.clone()))
            .configure(configure_routes::<MemoryStore, TestGateway>)
            .service(health);
        let service = test::init_service(app).await;
        debug!("🚀️ Making request");
        let res = test::call_service(&service, req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    /// Like [`TestServer::call`], but parses the body as JSON.
    pub async fn call_json(&self, req: TestRequest) -> (StatusCode, Value) {
        let (status, body) = self.call(req).await;
        let value = serde_json::from_str(&body).unwrap_or_else(|e| panic!("Body is not JSON ({e}): {body}"));
        (status, value)
    }
}

/// A 5.500 KWD pickup order for two shawarmas.
pub fn shawarma_order(payment_method: PaymentMethod) -> NewOrder {
    NewOrder {
        order_type: OrderType::Pickup,
        customer_id: None,
        customer_name: "Yousef".into(),
        customer_phone: "+96566554433".into(),
        customer_email: None,
        delivery_address: None,
        delivery_instructions: None,
        items: vec![NewOrderItem {
            item_id: "item-shawarma".into(),
            item_name_en: "Chicken Shawarma".into(),
            item_name_ar: "شاورما دجاج".into(),
            quantity: 2,
            unit_price: Money::from_minor(2_750),
            total_price: Money::from_minor(5_500),
            notes: None,
            modifiers: vec![],
        }],
        subtotal: Money::from_minor(5_500),
        discount_amount: Money::default(),
        delivery_fee: Money::default(),
        tax_amount: Money::default(),
        service_charge: Money::default(),
        total_amount: Money::from_minor(5_500),
        notes: None,
        coupon_code: None,
        payment_method,
        loyalty_points_redeemed: 0,
    }
}
