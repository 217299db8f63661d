use std::collections::BTreeMap;

use fog_common::DEFAULT_CURRENCY_CODE;
use log::*;
use tap_tools::{
    split_phone_number,
    Charge,
    ChargeCustomer,
    ChargePhone,
    ChargeReference,
    ChargeStatus,
    NewCharge,
    TapApi,
    TapApiError,
};

use crate::{
    db_types::OrderId,
    traits::{ChargeOutcome, ChargeReport, ChargeRequest, ChargeSession, PaymentProvider, ProviderError},
};

pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:3000/payment-result";
pub const DEFAULT_COUNTRY_CODE: &str = "965";
pub const PROVIDER_NAME: &str = "tap";

#[derive(Debug, Clone)]
pub struct TapGatewayConfig {
    pub currency: String,
    /// Where the customer is sent after the hosted payment page.
    pub redirect_url: String,
    /// Where the gateway posts charge updates.
    pub webhook_url: Option<String>,
    pub default_country_code: String,
}

impl Default for TapGatewayConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            webhook_url: None,
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

/// [`PaymentProvider`] backed by the hosted-page card gateway.
#[derive(Clone)]
pub struct TapGateway {
    api: TapApi,
    config: TapGatewayConfig,
}

impl TapGateway {
    pub fn new(api: TapApi, config: TapGatewayConfig) -> Self {
        Self { api, config }
    }

    fn new_charge(&self, request: &ChargeRequest) -> NewCharge {
        let (country_code, number) = split_phone_number(&request.customer_phone, &self.config.default_country_code);
        let metadata = BTreeMap::from([
            ("order_id".to_string(), request.order_id.to_string()),
            ("order_number".to_string(), request.order_number.clone()),
        ]);
        NewCharge {
            amount: request.amount,
            currency: self.config.currency.clone(),
            description: format!("Order {}", request.order_number),
            customer: ChargeCustomer {
                first_name: request.customer_name.clone(),
                email: request.customer_email.clone().filter(|e| !e.is_empty()),
                phone: ChargePhone { country_code, number },
            },
            metadata,
            reference: ChargeReference {
                transaction: Some(request.order_number.clone()),
                order: Some(request.order_id.to_string()),
            },
            redirect_url: self.config.redirect_url.clone(),
            post_url: self.config.webhook_url.clone(),
        }
    }
}

fn outcome_of(status: &ChargeStatus) -> ChargeOutcome {
    match status {
        ChargeStatus::Captured => ChargeOutcome::Captured,
        s if s.is_terminal_failure() => ChargeOutcome::Failed(s.to_string()),
        s if s.is_in_progress() => ChargeOutcome::InProgress,
        s => ChargeOutcome::Unknown(s.to_string()),
    }
}

/// Reduces a gateway charge to a [`ChargeReport`]. The order id is read from the charge metadata, falling back to the
/// charge's order reference.
pub(crate) fn report_from_charge(charge: Charge) -> ChargeReport {
    let order_id = charge
        .metadata_str("order_id")
        .or_else(|| charge.reference.as_ref().and_then(|r| r.order.clone()))
        .filter(|id| !id.is_empty())
        .map(OrderId::from);
    let order_number = charge
        .metadata_str("order_number")
        .or_else(|| charge.reference.as_ref().and_then(|r| r.transaction.clone()));
    ChargeReport {
        outcome: outcome_of(&charge.status),
        status: charge.status.to_string(),
        charge_id: charge.id,
        amount: charge.amount,
        currency: charge.currency,
        order_id,
        order_number,
        raw: charge.raw,
    }
}

impl From<TapApiError> for ProviderError {
    fn from(e: TapApiError) -> Self {
        match e {
            TapApiError::JsonError(msg) => ProviderError::InvalidResponse(msg),
            TapApiError::MissingField(field) => ProviderError::InvalidResponse(format!("missing {field}")),
            e => ProviderError::GatewayError(e.to_string()),
        }
    }
}

impl PaymentProvider for TapGateway {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<ChargeSession, ProviderError> {
        let charge = self.api.create_charge(&self.new_charge(request)).await?;
        let payment_url = charge.redirect_url().map(String::from).ok_or_else(|| {
            error!("💳️ Charge {} was created without a payment page URL", charge.id);
            ProviderError::InvalidResponse(format!("Charge {} has no payment page URL", charge.id))
        })?;
        Ok(ChargeSession { charge_id: charge.id, payment_url })
    }

    async fn fetch_charge(&self, charge_id: &str) -> Result<ChargeReport, ProviderError> {
        match self.api.get_charge(charge_id).await {
            Ok(charge) => Ok(report_from_charge(charge)),
            Err(e) if e.is_not_found() => Err(ProviderError::ChargeNotFound(charge_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
