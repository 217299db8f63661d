//! Food Ordering Engine
//!
//! This library holds the core logic of the food ordering backend. It knows nothing about HTTP; the server crate
//! exposes it over a REST interface.
//!
//! The library is divided into three main sections:
//! 1. Backend contracts ([`mod@traits`]) and their implementations. The resource store ([`RestStore`]) persists
//!    orders, coupons, loyalty data and the catalog. The hosted-page card gateway ([`TapGateway`]) takes online
//!    payments. The data types shared with backends live in [`mod@db_types`].
//! 2. The public API ([`mod@fog_api`]). [`OrderFlowApi`] owns the order lifecycle: creating orders, starting online
//!    payments, reconciling charges back onto orders and sweeping provisional orders that were never paid.
//!    [`CouponApi`], [`LoyaltyApi`] and [`CatalogApi`] cover the rest.
//! 3. Test support ([`mod@test_utils`], behind the `test_utils` feature): an in-memory backend and a scriptable
//!    payment provider.
mod db;

pub mod db_types;
pub mod fog_api;
pub mod gateway;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use db::rest::RestStore;
pub use fog_api::{
    catalog_api::CatalogApi,
    coupon_api::{CouponApi, CouponValidation},
    errors::{CatalogError, CouponError, LoyaltyError, OrderFlowError},
    loyalty_api::{LoyaltyApi, LoyaltyDelta},
    order_flow_api::{OrderFlowApi, OrderFlowConfig},
    order_objects,
};
pub use gateway::{TapGateway, TapGatewayConfig};
pub use traits::{OrderBackend, PaymentProvider, ProviderError, StorageError};
