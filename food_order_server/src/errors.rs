use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use food_order_engine::{CatalogError, CouponError, LoyaltyError, OrderFlowError};
use log::*;
use thiserror::Error;

const BACKEND_ERROR_MESSAGE: &str = "An error occurred on the backend of the server.";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("This address may not call this endpoint")]
    ForbiddenPeer,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::ForbiddenPeer => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors are reported verbatim. Server errors are logged in full and answered with an opaque message.
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("💻️ Request failed. {self}");
            BACKEND_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": message }).to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::Validation(msg) => Self::InvalidRequestBody(msg),
            OrderFlowError::NotFound(msg) => Self::NoRecordFound(msg),
            e => Self::BackendError(e.to_string()),
        }
    }
}

impl From<CouponError> for ServerError {
    fn from(e: CouponError) -> Self {
        match e {
            CouponError::NotFound(_) => Self::NoRecordFound(e.to_string()),
            CouponError::InvalidRequest(msg) => Self::InvalidRequestBody(msg),
            e => Self::BackendError(e.to_string()),
        }
    }
}

impl From<LoyaltyError> for ServerError {
    fn from(e: LoyaltyError) -> Self {
        match e {
            LoyaltyError::InvalidSettings(_) => Self::InvalidRequestBody(e.to_string()),
            LoyaltyError::CustomerNotFound(_) => Self::NoRecordFound(e.to_string()),
            e => Self::BackendError(e.to_string()),
        }
    }
}

impl From<CatalogError> for ServerError {
    fn from(e: CatalogError) -> Self {
        Self::BackendError(e.to_string())
    }
}
