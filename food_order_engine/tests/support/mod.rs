#![allow(dead_code)]
use fog_common::Money;
use food_order_engine::{
    db_types::{Customer, NewOrder, NewOrderItem, ModifierSelection, OrderType, PaymentMethod},
    test_utils::{prepare_env::prepare_test_env, MemoryStore, TestGateway},
    OrderFlowApi,
    OrderFlowConfig,
};

pub type TestApi = OrderFlowApi<MemoryStore, TestGateway>;

pub fn flow_config() -> OrderFlowConfig {
    OrderFlowConfig {
        tenant_id: "tenant-1".into(),
        branch_id: "branch-1".into(),
        web_user_id: "web-user".into(),
        provider_name: "tap".into(),
    }
}

pub fn setup() -> (TestApi, MemoryStore, TestGateway) {
    prepare_test_env();
    let store = MemoryStore::new();
    let gateway = TestGateway::new();
    let api = OrderFlowApi::new(store.clone(), gateway.clone(), flow_config());
    (api, store, gateway)
}

pub fn burger(quantity: i64) -> NewOrderItem {
    NewOrderItem {
        item_id: "item-burger".into(),
        item_name_en: "Classic Burger".into(),
        item_name_ar: "برجر كلاسيك".into(),
        quantity,
        unit_price: Money::from_minor(2_250),
        total_price: Money::from_minor(2_250) * quantity,
        notes: None,
        modifiers: vec![ModifierSelection {
            modifier_id: Some("mod-cheese".into()),
            name: "Extra cheese".into(),
            price: Money::from_minor(250),
        }],
    }
}

pub fn fries() -> NewOrderItem {
    NewOrderItem {
        item_id: "item-fries".into(),
        item_name_en: "Fries".into(),
        item_name_ar: String::new(),
        quantity: 1,
        unit_price: Money::from_minor(750),
        total_price: Money::from_minor(750),
        notes: Some("No salt".into()),
        modifiers: vec![],
    }
}

/// A 10 KWD pickup order.
pub fn new_order(payment_method: PaymentMethod) -> NewOrder {
    NewOrder {
        order_type: OrderType::Pickup,
        customer_id: None,
        customer_name: "Fatima".into(),
        customer_phone: "+96599112233".into(),
        customer_email: Some("fatima@example.com".into()),
        delivery_address: None,
        delivery_instructions: None,
        items: vec![burger(4), fries()],
        subtotal: Money::from_major(10),
        discount_amount: Money::default(),
        delivery_fee: Money::default(),
        tax_amount: Money::default(),
        service_charge: Money::default(),
        total_amount: Money::from_major(10),
        notes: None,
        coupon_code: None,
        payment_method,
        loyalty_points_redeemed: 0,
    }
}

pub fn customer(id: &str, points: i64) -> Customer {
    Customer { id: id.into(), name: Some("Fatima".into()), phone: None, email: None, loyalty_points: points }
}
