use thiserror::Error;

use crate::traits::{ProviderError, StorageError};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Payment provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Could not start the online payment: {0}")]
    ChargeCreation(String),
}

#[derive(Debug, Clone, Error)]
pub enum CouponError {
    #[error("Coupon not found or expired")]
    NotFound(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Error)]
pub enum LoyaltyError {
    #[error("Invalid loyalty settings: {0}")]
    InvalidSettings(String),
    #[error("Customer {0} does not exist")]
    CustomerNotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
