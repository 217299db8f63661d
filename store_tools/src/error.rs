use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Request to the store failed: {0}")]
    Transport(String),
    #[error("Store query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("The store returned an empty response")]
    EmptyResponse,
    #[error("Refusing to {0} rows in {1} without a filter")]
    UnfilteredMutation(&'static str, String),
}

impl StoreError {
    /// The HTTP status the store answered with, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::QueryError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
