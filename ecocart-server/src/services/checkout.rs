//! Checkout: turn the caller's cart into a hosted payment session

use shared::error::ErrorCode;
use shared::util::major_to_minor;

use crate::error::{ShopError, ShopResult};
use crate::store::CartStore;
use crate::stripe::{CheckoutLineItem, CheckoutRequest, PaymentGateway, SessionMetadata};

/// Redirect targets for a hosted session
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutUrls {
    /// Stripe substitutes `{CHECKOUT_SESSION_ID}` on redirect
    pub fn for_app(app_url: &str) -> Self {
        let base = app_url.trim_end_matches('/');
        Self {
            success_url: format!("{base}/success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{base}/?canceled=true"),
        }
    }
}

/// Create a checkout session for the owner's cart and return its URL.
///
/// Line prices come from the current catalog. Nothing is written locally;
/// the order only exists once fulfillment sees the paid session.
pub async fn create_checkout<S>(
    store: &S,
    payments: &dyn PaymentGateway,
    owner_id: &str,
    currency: &str,
    urls: &CheckoutUrls,
) -> ShopResult<String>
where
    S: CartStore + ?Sized,
{
    let cart = store
        .find_cart_by_owner(owner_id)
        .await?
        .ok_or(ShopError::EmptyCart)?;
    let lines = store.list_lines(&cart.id).await?;
    if lines.is_empty() {
        return Err(ShopError::EmptyCart);
    }

    let line_items = lines
        .iter()
        .map(|line| {
            let unit_amount = major_to_minor(line.product.price).ok_or_else(|| {
                ShopError::Validation(
                    ErrorCode::ProductInvalidPrice,
                    format!("price out of range for {}", line.product.id),
                )
            })?;
            Ok(CheckoutLineItem {
                name: line.product.name.clone(),
                image: Some(line.product.image.clone()).filter(|s| !s.is_empty()),
                unit_amount,
                quantity: line.item.quantity,
            })
        })
        .collect::<ShopResult<Vec<_>>>()?;

    let request = CheckoutRequest {
        currency: currency.to_string(),
        line_items,
        success_url: urls.success_url.clone(),
        cancel_url: urls.cancel_url.clone(),
        metadata: SessionMetadata {
            user_id: owner_id.to_string(),
            cart_id: cart.id.clone(),
        },
    };

    let url = payments
        .create_checkout_session(&request)
        .await
        .map_err(|e| ShopError::PaymentSetup(e.to_string()))?;
    tracing::info!(owner_id = %owner_id, cart_id = %cart.id, lines = lines.len(), "Checkout session created");
    Ok(url)
}
