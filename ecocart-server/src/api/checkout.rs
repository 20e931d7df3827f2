//! Checkout endpoints: session creation and the confirmation-page fallback

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::UserIdentity;
use crate::services::checkout::{self, CheckoutUrls};
use crate::services::fulfillment;
use crate::state::AppState;

use super::ApiResult;

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// POST /api/checkout
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<CheckoutResponse> {
    let url = checkout::create_checkout(
        state.store.as_ref(),
        state.payments.as_ref(),
        &identity.user_id,
        &state.currency,
        &CheckoutUrls::for_app(&state.app_url),
    )
    .await?;
    Ok(Json(CheckoutResponse { url }))
}

#[derive(Deserialize)]
pub struct ConfirmQuery {
    pub session_id: Option<String>,
}

/// Which confirmation view the client should render
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfirmResponse {
    InvalidSession,
    Success { session_id: String },
}

/// GET /api/checkout/confirm?session_id=
///
/// Fallback for a late or missing webhook. Fulfillment errors are logged and
/// never shown: the customer has paid, so the page always reports success.
pub async fn confirm(
    State(state): State<AppState>,
    Query(query): Query<ConfirmQuery>,
) -> Json<ConfirmResponse> {
    let Some(session_id) = query.session_id.filter(|s| !s.is_empty()) else {
        return Json(ConfirmResponse::InvalidSession);
    };

    match fulfillment::confirm_session(
        state.store.as_ref(),
        state.payments.as_ref(),
        &session_id,
    )
    .await
    {
        Ok(Some(outcome)) => {
            tracing::info!(session_id = %session_id, ?outcome, "Confirmation page fulfillment");
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "Confirmation page fulfillment failed");
        }
    }

    Json(ConfirmResponse::Success { session_id })
}
