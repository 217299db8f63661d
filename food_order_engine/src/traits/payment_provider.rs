use thiserror::Error;

use crate::traits::{ChargeReport, ChargeRequest, ChargeSession};

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("The payment provider has no charge with id {0}")]
    ChargeNotFound(String),
    #[error("Payment provider error: {0}")]
    GatewayError(String),
    #[error("The payment provider returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// A hosted-page card payment provider.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Starts a charge for an order. The order id and number travel with the charge so that the charge alone is
    /// enough to find the order again.
    async fn create_charge(&self, request: &ChargeRequest) -> Result<ChargeSession, ProviderError>;

    /// The provider's authoritative view of the charge.
    async fn fetch_charge(&self, charge_id: &str) -> Result<ChargeReport, ProviderError>;
}
