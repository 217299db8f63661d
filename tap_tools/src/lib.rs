//! # Tap tools
//!
//! Client for the hosted-payment-page card gateway. The gateway creates a charge, hands back a URL the customer is
//! redirected to (3-D Secure and card capture happen there), and can later be asked for the authoritative status of
//! that charge.
mod api;
mod charge;
mod config;
mod credentials;
mod error;
mod helpers;

pub use api::TapApi;
pub use charge::{Charge, ChargeCustomer, ChargePhone, ChargeReference, ChargeStatus, ChargeTransaction, NewCharge};
pub use config::TapConfig;
pub use credentials::{CredentialHolder, CredentialSource, GatewayCredentials, SessionCredential, StaticKey, TokenExchange};
pub use error::TapApiError;
pub use helpers::{is_valid_charge_id, split_phone_number};
