//! Stripe webhook handler
//!
//! POST /stripe/webhook: handles Stripe events (raw body for signature verification)

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use shared::error::{AppError, ErrorCode};

use crate::services::fulfillment::{self, FulfillmentOutcome};
use crate::state::AppState;
use crate::stripe::{self, CheckoutSession};

/// Handle incoming Stripe webhook events
///
/// Must receive raw body (not JSON) for HMAC signature verification.
/// Rejections carry an `ApiResponse` body; a 5xx asks Stripe to redeliver.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // 1. Get Stripe-Signature header
    let sig_header = match headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
    {
        Some(s) => s,
        None => {
            tracing::warn!("Missing Stripe-Signature header");
            return AppError::with_message(
                ErrorCode::WebhookSignatureInvalid,
                "Missing Stripe-Signature header",
            )
            .into_response();
        }
    };

    // 2. Verify signature
    if let Err(e) =
        stripe::verify_webhook_signature(&body, sig_header, &state.stripe_webhook_secret)
    {
        tracing::warn!(error = e, "Webhook signature verification failed");
        return AppError::new(ErrorCode::WebhookSignatureInvalid).into_response();
    }

    // 3. Parse JSON event
    let event: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse webhook JSON");
            return AppError::with_message(ErrorCode::InvalidRequest, "Malformed event payload")
                .into_response();
        }
    };

    let event_type = event["type"].as_str().unwrap_or("");
    tracing::info!(
        event_type = event_type,
        event_id = event["id"].as_str().unwrap_or(""),
        "Received Stripe webhook"
    );

    // 4. Handle event types
    match event_type {
        "checkout.session.completed" => handle_session_paid(&state, &event, true).await,
        "checkout.session.async_payment_succeeded" => {
            handle_session_paid(&state, &event, false).await
        }
        _ => {
            tracing::debug!(event_type = event_type, "Unhandled webhook event type");
            StatusCode::OK.into_response()
        }
    }
}

/// Fulfil the session in `data.object`.
///
/// `checkout.session.completed` also fires for delayed payment methods before
/// the money arrives, so that event only fulfils when the session
/// [`is_paid`](CheckoutSession::is_paid); `async_payment_succeeded` is paid by
/// definition.
async fn handle_session_paid(
    state: &AppState,
    event: &serde_json::Value,
    require_paid_status: bool,
) -> Response {
    let Some(obj) = event.get("data").and_then(|d| d.get("object")) else {
        tracing::warn!("Checkout event missing data.object");
        return session_invalid("Checkout event missing data.object");
    };

    let session: CheckoutSession = match serde_json::from_value(obj.clone()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse checkout session");
            return session_invalid("Malformed checkout session");
        }
    };

    if require_paid_status && !session.is_paid() {
        tracing::info!(
            session_id = %session.id,
            payment_status = %session.payment_status,
            "Checkout completed but not paid yet, waiting for async payment"
        );
        return StatusCode::OK.into_response();
    }

    let paid = match session.paid_session() {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(session_id = %session.id, error = e, "Checkout session metadata invalid");
            return session_invalid(e);
        }
    };

    match fulfillment::fulfill(state.store.as_ref(), &paid).await {
        Ok(FulfillmentOutcome::CartMissing) => StatusCode::NOT_FOUND.into_response(),
        Ok(outcome) => {
            tracing::info!(session_id = %paid.session_id, ?outcome, "Webhook fulfillment done");
            StatusCode::OK.into_response()
        }
        Err(e) => {
            tracing::error!(session_id = %paid.session_id, error = %e, "Webhook fulfillment failed");
            // 一律 500，Stripe 会重试
            AppError::new(ErrorCode::DatabaseError)
                .with_detail("session_id", paid.session_id)
                .into_response()
        }
    }
}

fn session_invalid(msg: &str) -> Response {
    AppError::with_message(ErrorCode::PaymentSessionInvalid, msg).into_response()
}
