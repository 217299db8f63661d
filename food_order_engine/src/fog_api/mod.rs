//! # Food ordering engine public API
//!
//! The API is split by concern so that callers only need a backend for the parts they use.
//!
//! * [`order_flow_api`] creates orders, starts online payments, reconciles charges back onto orders and serves the
//!   admin order list.
//! * [`coupon_api`] validates coupon codes against a subtotal.
//! * [`loyalty_api`] manages loyalty settings and applies the points earned and spent on an order.
//! * [`catalog_api`] passes menu and delivery-zone rows through.
//!
//! # API usage
//!
//! Every API is built from a backend that implements the traits it needs:
//!
//! ```rust,ignore
//! use food_order_engine::{CouponApi, RestStore};
//! let store = RestStore::new(client, tenant);
//! let coupons = CouponApi::new(store);
//! let result = coupons.validate("percent20", Money::from_major(10)).await?;
//! ```
pub mod catalog_api;
pub mod coupon_api;
pub mod errors;
pub mod loyalty_api;
pub mod order_flow_api;
pub mod order_objects;
