use std::fmt::Display;

use fog_common::Money;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponValidationRequest {
    pub code: String,
    pub subtotal: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminOrdersQuery {
    pub status: Option<String>,
    pub limit: Option<u64>,
}

/// The gateway posts the whole charge object. Only its id is used; the charge status is always fetched again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeNotification {
    pub id: String,
}
