use crate::config::ConfigError;
use crate::listings::engagement::{EngagementError, ResponseLedgerError};
use crate::listings::promotion::PromotionError;
use crate::listings::registry::ParseListingTypeError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    ListingType(ParseListingTypeError),
    Ledger(ResponseLedgerError),
    Engagement(EngagementError),
    Promotion(PromotionError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::ListingType(err) => write!(f, "listing type error: {}", err),
            AppError::Ledger(err) => write!(f, "response ledger error: {}", err),
            AppError::Engagement(err) => write!(f, "engagement error: {}", err),
            AppError::Promotion(err) => write!(f, "promotion error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::ListingType(err) => Some(err),
            AppError::Ledger(err) => Some(err),
            AppError::Engagement(err) => Some(err),
            AppError::Promotion(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ListingType(_) => StatusCode::BAD_REQUEST,
            AppError::Ledger(ResponseLedgerError::AlreadyResponded) => StatusCode::CONFLICT,
            AppError::Ledger(ResponseLedgerError::ResponseNotFound)
            | AppError::Engagement(EngagementError::ConfirmationNotFound)
            | AppError::Promotion(PromotionError::ListingNotFound) => StatusCode::NOT_FOUND,
            AppError::Promotion(PromotionError::InvalidDuration(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Ledger(_)
            | AppError::Engagement(_)
            | AppError::Promotion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ParseListingTypeError> for AppError {
    fn from(value: ParseListingTypeError) -> Self {
        Self::ListingType(value)
    }
}

impl From<ResponseLedgerError> for AppError {
    fn from(value: ResponseLedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<EngagementError> for AppError {
    fn from(value: EngagementError) -> Self {
        Self::Engagement(value)
    }
}

impl From<PromotionError> for AppError {
    fn from(value: PromotionError) -> Self {
        Self::Promotion(value)
    }
}
