use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Result type for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur in the pricing domain
#[derive(Debug, Error)]
pub enum PricingError {
    /// Location provider failed, timed out, or returned unusable data.
    /// Recovered inside the resolver; never returned from facade operations.
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    /// Country code is malformed or not a recognized ISO 3166-1 alpha-2 code.
    /// Recovered by classifying as `Global`.
    #[error("Invalid country code: {0:?}")]
    InvalidCountryCode(String),

    /// No lock record exists for the account yet
    #[error("Account {0} has no pricing lock")]
    NotRegistered(Uuid),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pricing catalog failed validation or could not be loaded
    #[error("Pricing configuration error: {0}")]
    Configuration(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::NotRegistered(id) => {
                AppError::NotFound(format!("Account {} is not registered", id))
            }
            PricingError::InvalidInput(msg) => AppError::BadRequest(msg),
            PricingError::Database(e) => AppError::Database(e),
            // Lookup failures are degraded locally; reaching this arm is a bug
            // but it must still not leak provider detail.
            PricingError::LocationUnavailable(_) | PricingError::InvalidCountryCode(_) => {
                AppError::InternalServerError("Pricing temporarily unavailable".to_string())
            }
            PricingError::Configuration(msg) | PricingError::Internal(msg) => {
                tracing::error!(error = %msg, "Pricing engine failure");
                AppError::InternalServerError("Internal error".to_string())
            }
        }
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<tokio::task::JoinError> for PricingError {
    fn from(err: tokio::task::JoinError) -> Self {
        PricingError::Internal(format!("Lock task failed: {}", err))
    }
}
