//! # Food ordering gateway server
//! This crate hosts the HTTP surface of the food ordering backend. It is responsible for:
//! Accepting orders from the storefront and starting online card payments for them.
//! Reconciling payment confirmations from the gateway (webhook, customer poll and a background sweep) onto orders.
//! Serving coupons, loyalty settings and the menu catalog to the storefront and the admin console.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orders`, `/api/orders/{order_id}`, `/api/orders/number/{order_number}`, `/api/orders/{order_id}/status`
//! * `/api/admin/orders`
//! * `/api/payment/webhook`, `/api/payment/verify/{charge_id}`, `/api/payment/status/{order_id}`
//! * `/api/coupons`, `/api/coupons/validate`
//! * `/api/loyalty/settings`
//! * `/api/menu/categories`, `/api/menu/items`, `/api/menu/modifier-groups`, `/api/delivery-zones`

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod reconcile_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
