//! Storefront domain error
//!
//! `ShopError` is what services return. It converts into the shared
//! `AppError` at the HTTP boundary, so handlers can use `?` directly.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::llm::CompletionError;
use crate::store::StoreError;
use crate::stripe::PaymentError;

/// Message shown when the planner cannot produce a plan
pub const PLAN_FAILED_MESSAGE: &str =
    "Failed to generate plan. Please check your API key and try again.";

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    /// Rejected input; the code says which rule (`ValidationFailed` when generic)
    #[error("validation failed ({0}): {1}")]
    Validation(ErrorCode, String),

    /// Caller does not own the resource (or it does not exist)
    #[error("not authorized")]
    NotAuthorized,

    #[error("not found: {0}")]
    NotFound(ErrorCode),

    #[error("cart is empty")]
    EmptyCart,

    /// The payment provider refused to open a checkout session
    #[error("payment setup failed: {0}")]
    PaymentSetup(String),

    #[error("external service failed: {0}")]
    ExternalService(String),

    #[error("plan generation failed: {0}")]
    PlanGeneration(String),

    /// An order already exists for this checkout session. Only raised inside
    /// fulfillment, which absorbs it.
    #[error("order already exists for session {0}")]
    DuplicateFulfillment(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PaymentError> for ShopError {
    fn from(e: PaymentError) -> Self {
        ShopError::ExternalService(e.to_string())
    }
}

impl From<CompletionError> for ShopError {
    fn from(e: CompletionError) -> Self {
        ShopError::PlanGeneration(e.to_string())
    }
}

impl ShopError {
    /// Generic validation failure
    pub fn invalid(msg: impl Into<String>) -> Self {
        ShopError::Validation(ErrorCode::ValidationFailed, msg.into())
    }
}

impl From<validator::ValidationErrors> for ShopError {
    fn from(e: validator::ValidationErrors) -> Self {
        ShopError::Validation(ErrorCode::ValidationFailed, e.to_string())
    }
}

impl From<ShopError> for AppError {
    fn from(e: ShopError) -> Self {
        match e {
            ShopError::Validation(code, msg) => AppError::with_message(code, msg),
            ShopError::NotAuthorized => AppError::permission_denied("Not authorized"),
            ShopError::NotFound(code) => AppError::new(code),
            ShopError::EmptyCart => AppError::new(ErrorCode::CartEmpty),
            ShopError::PaymentSetup(msg) => {
                tracing::error!(error = %msg, "Checkout session creation failed");
                AppError::new(ErrorCode::PaymentSetupFailed)
            }
            ShopError::ExternalService(msg) => {
                tracing::error!(error = %msg, "External service error");
                AppError::new(ErrorCode::ExternalServiceError)
            }
            ShopError::PlanGeneration(msg) => {
                tracing::error!(error = %msg, "Plan generation error");
                AppError::with_message(ErrorCode::PlanGenerationFailed, PLAN_FAILED_MESSAGE)
            }
            ShopError::DuplicateFulfillment(session_id) => {
                AppError::new(ErrorCode::AlreadyExists).with_detail("session_id", session_id)
            }
            ShopError::Store(store_err) => {
                tracing::error!(error = %store_err, "Store error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ShopResult<T> = Result<T, ShopError>;
