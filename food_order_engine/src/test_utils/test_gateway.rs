use std::{collections::HashMap, sync::Arc};

use serde_json::json;
use tokio::sync::Mutex;

use crate::traits::{ChargeOutcome, ChargeReport, ChargeRequest, ChargeSession, PaymentProvider, ProviderError};

#[derive(Default)]
struct Ledger {
    next_id: u64,
    charges: HashMap<String, (ChargeRequest, ChargeOutcome)>,
    fail_create: bool,
    fetch_count: usize,
}

/// A scriptable payment provider. New charges start out in progress; tests move them along with
/// [`TestGateway::set_outcome`].
#[derive(Clone, Default)]
pub struct TestGateway {
    ledger: Arc<Mutex<Ledger>>,
}

impl TestGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `create_charge` call fail.
    pub async fn fail_create(&self, fail: bool) {
        self.ledger.lock().await.fail_create = fail;
    }

    pub async fn set_outcome(&self, charge_id: &str, outcome: ChargeOutcome) {
        if let Some(entry) = self.ledger.lock().await.charges.get_mut(charge_id) {
            entry.1 = outcome;
        }
    }

    pub async fn charge_count(&self) -> usize {
        self.ledger.lock().await.charges.len()
    }

    pub async fn fetch_count(&self) -> usize {
        self.ledger.lock().await.fetch_count
    }

    pub async fn request_for(&self, charge_id: &str) -> Option<ChargeRequest> {
        self.ledger.lock().await.charges.get(charge_id).map(|(r, _)| r.clone())
    }
}

fn status_of(outcome: &ChargeOutcome) -> String {
    match outcome {
        ChargeOutcome::Captured => "CAPTURED".to_string(),
        ChargeOutcome::InProgress => "INITIATED".to_string(),
        ChargeOutcome::Failed(s) | ChargeOutcome::Unknown(s) => s.clone(),
    }
}

impl PaymentProvider for TestGateway {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<ChargeSession, ProviderError> {
        let mut ledger = self.ledger.lock().await;
        if ledger.fail_create {
            return Err(ProviderError::GatewayError("card gateway is unavailable".into()));
        }
        ledger.next_id += 1;
        let charge_id = format!("chg_{}", ledger.next_id);
        ledger.charges.insert(charge_id.clone(), (request.clone(), ChargeOutcome::InProgress));
        let payment_url = format!("https://pay.example.com/{charge_id}");
        Ok(ChargeSession { charge_id, payment_url })
    }

    async fn fetch_charge(&self, charge_id: &str) -> Result<ChargeReport, ProviderError> {
        let mut ledger = self.ledger.lock().await;
        ledger.fetch_count += 1;
        let (request, outcome) =
            ledger.charges.get(charge_id).ok_or_else(|| ProviderError::ChargeNotFound(charge_id.to_string()))?;
        let status = status_of(outcome);
        Ok(ChargeReport {
            charge_id: charge_id.to_string(),
            outcome: outcome.clone(),
            raw: json!({ "id": charge_id, "status": status, "amount": request.amount }),
            status,
            amount: request.amount,
            currency: "KWD".to_string(),
            order_id: Some(request.order_id.clone()),
            order_number: Some(request.order_number.clone()),
        })
    }
}
