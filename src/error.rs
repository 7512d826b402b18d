use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    domain::{
        cart::CartError, customization::CustomizationError, order::OrderValidationError,
        status::TransitionError,
    },
    notify::NotifyError,
    response::ApiResponse,
    services::tracking_service::TrackingError,
    store::StoreError,
};

pub const SEND_FAILED_MESSAGE: &str = "Failed to send order. Please try again or call us.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error(transparent)]
    Validation(#[from] OrderValidationError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Customization(#[from] CustomizationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{}", SEND_FAILED_MESSAGE)]
    Notification(#[from] NotifyError),

    #[error(transparent)]
    Tracking(#[from] TrackingError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorData {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    pub retryable: bool,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::Customization(_)
            | AppError::Transition(_) => StatusCode::BAD_REQUEST,
            AppError::Cart(CartError::LineNotFound) => StatusCode::NOT_FOUND,
            AppError::Cart(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(StoreError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Notification(_) => StatusCode::BAD_GATEWAY,
            AppError::Tracking(err) => match err {
                TrackingError::NotFound => StatusCode::NOT_FOUND,
                TrackingError::PermissionDenied => StatusCode::FORBIDDEN,
                TrackingError::Network => StatusCode::SERVICE_UNAVAILABLE,
                TrackingError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller may simply try the same request again.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Store(err) => err.is_retryable(),
            AppError::Notification(_) | AppError::Tracking(_) => true,
            _ => false,
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            AppError::Tracking(err) => Some(err.code()),
            AppError::Cart(CartError::AmbiguousLine { .. }) => Some("ambiguous-line"),
            AppError::Store(StoreError::Unavailable(_)) => Some("store-unavailable"),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = ApiResponse::failure(
            self.to_string(),
            ErrorData {
                error: self.to_string(),
                code: self.code(),
                retryable: self.is_retryable(),
            },
        );

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_outage_is_retryable_503() {
        let err = AppError::from(StoreError::Unavailable("connection refused".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.is_retryable());
    }

    #[test]
    fn validation_is_final_400() {
        let err = AppError::from(OrderValidationError::NameTooShort);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Name must be at least 2 characters");
    }

    #[test]
    fn failed_email_keeps_customer_message() {
        let err = AppError::from(NotifyError::Transport("timeout".into()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), SEND_FAILED_MESSAGE);
    }

    #[test]
    fn tracking_errors_carry_their_code() {
        let err = AppError::from(TrackingError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), Some("not-found"));
        assert!(err.is_retryable());
    }
}
