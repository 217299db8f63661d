//! # Backend contracts
//!
//! The engine never talks to a particular store or payment gateway directly. Backends implement the traits in this
//! module and the APIs in [`crate::fog_api`] are generic over them.
//!
//! * [`OrderManagement`] stores orders, their line items and modifier snapshots, and payment records. Its conditional
//!   mutations ([`OrderManagement::mark_order_paid`], [`OrderManagement::delete_provisional_order`]) are what make
//!   payment reconciliation safe to run more than once.
//! * [`CouponManagement`] looks up active coupons.
//! * [`LoyaltyManagement`] reads and writes loyalty settings, customer balances and the points ledger.
//! * [`CatalogManagement`] reads menu and delivery-zone rows.
//! * [`PaymentProvider`] creates hosted-page charges and reports their status.
mod catalog_management;
mod coupon_management;
mod data_objects;
mod loyalty_management;
mod order_management;
mod payment_provider;

pub use catalog_management::CatalogManagement;
pub use coupon_management::CouponManagement;
pub use data_objects::{
    CatalogKind,
    ChargeOutcome,
    ChargeReport,
    ChargeRequest,
    ChargeSession,
    OrderQueryFilter,
    SubWriteFailure,
    SubWriteKind,
};
pub use loyalty_management::LoyaltyManagement;
pub use order_management::{OrderBackend, OrderManagement, StorageError};
pub use payment_provider::{PaymentProvider, ProviderError};
