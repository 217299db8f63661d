use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use fog_common::Money;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

//--------------------------------------     ChargeStatus     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeStatus {
    Initiated,
    InProgress,
    Authorized,
    Captured,
    Cancelled,
    Failed,
    Declined,
    Restricted,
    Void,
    TimedOut,
    Abandoned,
    /// Anything the gateway reports that is not in the vocabulary above.
    Unknown(String),
}

impl ChargeStatus {
    /// The charge will never be captured.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::Cancelled |
                Self::Failed |
                Self::Declined |
                Self::Restricted |
                Self::Void |
                Self::TimedOut |
                Self::Abandoned
        )
    }

    /// The customer has not finished (or the gateway has not finished processing) the payment.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Initiated | Self::InProgress | Self::Authorized)
    }
}

impl FromStr for ChargeStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "INITIATED" => Self::Initiated,
            "IN_PROGRESS" => Self::InProgress,
            "AUTHORIZED" => Self::Authorized,
            "CAPTURED" => Self::Captured,
            "CANCELLED" | "CANCELED" => Self::Cancelled,
            "FAILED" => Self::Failed,
            "DECLINED" => Self::Declined,
            "RESTRICTED" => Self::Restricted,
            "VOID" => Self::Void,
            "TIMEDOUT" | "TIMED_OUT" => Self::TimedOut,
            "ABANDONED" => Self::Abandoned,
            _ => Self::Unknown(s.to_string()),
        };
        Ok(status)
    }
}

impl Display for ChargeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initiated => "INITIATED",
            Self::InProgress => "IN_PROGRESS",
            Self::Authorized => "AUTHORIZED",
            Self::Captured => "CAPTURED",
            Self::Cancelled => "CANCELLED",
            Self::Failed => "FAILED",
            Self::Declined => "DECLINED",
            Self::Restricted => "RESTRICTED",
            Self::Void => "VOID",
            Self::TimedOut => "TIMEDOUT",
            Self::Abandoned => "ABANDONED",
            Self::Unknown(s) => s.as_str(),
        };
        f.write_str(s)
    }
}

impl<'de> Deserialize<'de> for ChargeStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(Self::Unknown(s)))
    }
}

impl Serialize for ChargeStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

//--------------------------------------      NewCharge       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct ChargePhone {
    pub country_code: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargeCustomer {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: ChargePhone,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChargeReference {
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

/// A request for a hosted-page charge.
#[derive(Debug, Clone)]
pub struct NewCharge {
    pub amount: Money,
    pub currency: String,
    pub description: String,
    pub customer: ChargeCustomer,
    /// Free-form key/value pairs stored on the charge and echoed back on every read.
    pub metadata: BTreeMap<String, String>,
    pub reference: ChargeReference,
    /// Where the customer lands after leaving the hosted page.
    pub redirect_url: String,
    /// Where the gateway pushes status callbacks, if anywhere.
    pub post_url: Option<String>,
}

impl NewCharge {
    pub(crate) fn to_request_body(&self) -> Value {
        let mut body = serde_json::json!({
            "amount": self.amount.as_major(),
            "currency": self.currency,
            "threeDSecure": true,
            "save_card": false,
            "description": self.description,
            "metadata": self.metadata,
            "reference": self.reference,
            "receipt": { "email": false, "sms": false },
            "customer": self.customer,
            "source": { "id": "src_all" },
            "redirect": { "url": self.redirect_url },
        });
        if let Some(url) = &self.post_url {
            body["post"] = serde_json::json!({ "url": url });
        }
        body
    }
}

//--------------------------------------        Charge        ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChargeTransaction {
    #[serde(default)]
    pub url: Option<String>,
}

/// A charge as reported by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub id: String,
    pub status: ChargeStatus,
    #[serde(default)]
    pub amount: Money,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub transaction: Option<ChargeTransaction>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default)]
    pub reference: Option<ChargeReference>,
    /// The complete response body, kept for audit.
    #[serde(skip)]
    pub raw: Value,
}

impl Charge {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let mut charge = serde_json::from_value::<Charge>(raw.clone())?;
        charge.raw = raw;
        Ok(charge)
    }

    /// The URL of the hosted payment page for this charge.
    pub fn redirect_url(&self) -> Option<&str> {
        self.transaction.as_ref().and_then(|t| t.url.as_deref())
    }

    /// Reads a metadata value as a string, whether the gateway stored it as a string or a number.
    pub fn metadata_str(&self, key: &str) -> Option<String> {
        match self.metadata.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
