use thiserror::Error;

#[derive(Debug, Error)]
pub enum TapApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Request to the payment gateway failed: {0}")]
    Transport(String),
    #[error("Gateway query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Could not obtain a gateway session credential: {0}")]
    Credential(String),
    #[error("The gateway response is missing the {0} field")]
    MissingField(&'static str),
    #[error("{0} is not a valid charge id")]
    InvalidChargeId(String),
}

impl TapApiError {
    /// A malformed charge id can never name a charge, so it counts as not found too.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::QueryError { status: 404, .. } | Self::InvalidChargeId(_))
    }
}
