//! Stripe integration via REST API (no SDK dependency)
//!
//! Only hosted checkout is used: create a session for the cart, read it back
//! on the confirmation page, and verify webhook signatures.

mod signature;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

pub use signature::{signature_header, verify_webhook_signature, verify_webhook_signature_at};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("stripe request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("stripe rejected request: {0}")]
    Rejected(String),
    #[error("unexpected stripe response: {0}")]
    Malformed(String),
}

/// One hosted-checkout line
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLineItem {
    pub name: String,
    pub image: Option<String>,
    /// Unit price in minor units
    pub unit_amount: i64,
    pub quantity: i32,
}

/// Identifies the cart a session pays for
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMetadata {
    pub user_id: String,
    pub cart_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub currency: String,
    pub line_items: Vec<CheckoutLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: SessionMetadata,
}

/// Checkout session as returned by Stripe (the fields we read)
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub payment_status: String,
    /// Captured total in minor units, after discounts
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

/// A paid session with everything fulfillment needs
#[derive(Debug, Clone, PartialEq)]
pub struct PaidSession {
    pub session_id: String,
    pub user_id: String,
    pub cart_id: String,
    pub amount_total: i64,
}

impl CheckoutSession {
    /// Funds are captured, or the session needed none (100% discount)
    pub fn is_paid(&self) -> bool {
        matches!(self.payment_status.as_str(), "paid" | "no_payment_required")
    }

    /// Extract metadata and total. Does not check the payment status.
    pub fn paid_session(&self) -> Result<PaidSession, &'static str> {
        let metadata = self.metadata.as_ref().ok_or("Session has no metadata")?;
        let user_id = metadata
            .get("userId")
            .filter(|s| !s.is_empty())
            .ok_or("Session metadata missing userId")?;
        let cart_id = metadata
            .get("cartId")
            .filter(|s| !s.is_empty())
            .ok_or("Session metadata missing cartId")?;
        let amount_total = self.amount_total.ok_or("Session missing amount_total")?;

        Ok(PaidSession {
            session_id: self.id.clone(),
            user_id: user_id.clone(),
            cart_id: cart_id.clone(),
            amount_total,
        })
    }
}

/// Payment provider seam
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session, returning its redirect URL
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<String, PaymentError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError>;
}

/// Stripe REST client
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
        }
    }
}

/// Form fields for `POST /v1/checkout/sessions`
fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("metadata[userId]".to_string(), request.metadata.user_id.clone()),
        ("metadata[cartId]".to_string(), request.metadata.cart_id.clone()),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        if let Some(image) = item.image.as_ref().filter(|s| !s.is_empty()) {
            form.push((
                format!("{prefix}[price_data][product_data][images][0]"),
                image.clone(),
            ));
        }
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }

    form
}

/// Read a Stripe response body, turning API errors into `Rejected`
async fn read_json(resp: reqwest::Response) -> Result<serde_json::Value, PaymentError> {
    let status = resp.status();
    let body: serde_json::Value = resp.json().await?;
    if !status.is_success() {
        let message = body["error"]["message"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(PaymentError::Rejected(message));
    }
    Ok(body)
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<String, PaymentError> {
        let resp = self
            .http
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&checkout_form(request))
            .send()
            .await?;
        let body = read_json(resp).await?;

        body["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| PaymentError::Malformed(format!("checkout session without url: {body}")))
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError> {
        let resp = self
            .http
            .get(format!("{STRIPE_API_BASE}/checkout/sessions/{session_id}"))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;
        let body = read_json(resp).await?;

        serde_json::from_value(body).map_err(|e| PaymentError::Malformed(e.to_string()))
    }
}
