//! Order fulfillment
//!
//! Converts a paid checkout session into an order and empties the source
//! cart. Two independent triggers run this for the same session and may race:
//! the Stripe webhook and the customer's confirmation page.
//!
//! Exactly-once rests on the unique `orders.stripe_session_id` key: the order
//! insert either wins or fails with a duplicate, and the loser treats that as
//! "already fulfilled". Both branches then clear the cart, so a run that
//! crashed between insert and clear is repaired by the next trigger.

use serde::Serialize;
use shared::error::ErrorCode;
use shared::models::{NewOrder, NewOrderItem, Order, OrderStatus};
use shared::util::{minor_to_major, now_millis};

use crate::error::{ShopError, ShopResult};
use crate::store::{CartStore, OrderStore, StoreError};
use crate::stripe::{PaidSession, PaymentGateway};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FulfillmentOutcome {
    /// This run created the order
    Created { order_id: String },
    /// Another run (or an earlier attempt) already created it
    AlreadyFulfilled,
    /// The referenced cart does not exist and no order exists for the session
    CartMissing,
    /// The cart has no items and no order exists; nothing was created
    EmptyCart,
}

pub async fn fulfill<S>(store: &S, session: &PaidSession) -> ShopResult<FulfillmentOutcome>
where
    S: CartStore + OrderStore + ?Sized,
{
    let Some(cart) = store.find_cart(&session.cart_id).await? else {
        if store.find_order_by_session(&session.session_id).await?.is_some() {
            return Ok(FulfillmentOutcome::AlreadyFulfilled);
        }
        tracing::warn!(
            session_id = %session.session_id,
            cart_id = %session.cart_id,
            "Paid session references a missing cart"
        );
        return Ok(FulfillmentOutcome::CartMissing);
    };

    if cart.owner_id != session.user_id {
        tracing::warn!(
            session_id = %session.session_id,
            cart_owner = %cart.owner_id,
            metadata_user = %session.user_id,
            "Session metadata user does not own the cart"
        );
    }

    let lines = store.list_lines(&cart.id).await?;
    if lines.is_empty() {
        if store.find_order_by_session(&session.session_id).await?.is_some() {
            return Ok(FulfillmentOutcome::AlreadyFulfilled);
        }
        tracing::error!(
            session_id = %session.session_id,
            cart_id = %cart.id,
            amount_total = session.amount_total,
            "Paid session with empty cart, no order created; needs manual reconciliation"
        );
        return Ok(FulfillmentOutcome::EmptyCart);
    }

    let new_order = NewOrder {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: session.user_id.clone(),
        total_amount: minor_to_major(session.amount_total),
        stripe_session_id: session.session_id.clone(),
        status: OrderStatus::Processing,
        items: lines
            .iter()
            .map(|line| NewOrderItem {
                product_id: line.item.product_id.clone(),
                quantity: line.item.quantity,
                price: line.product.price,
            })
            .collect(),
        created_at: now_millis(),
    };

    let outcome = match create_order(store, &new_order).await {
        Ok(order) => {
            tracing::info!(
                order_id = %order.id,
                session_id = %order.stripe_session_id,
                total = %order.total_amount,
                items = new_order.items.len(),
                "Order created from paid session"
            );
            FulfillmentOutcome::Created { order_id: order.id }
        }
        Err(ShopError::DuplicateFulfillment(session_id)) => {
            tracing::debug!(session_id = %session_id, "Order already exists for session");
            FulfillmentOutcome::AlreadyFulfilled
        }
        Err(e) => return Err(e),
    };

    let removed = store.clear_cart(&cart.id).await?;
    tracing::debug!(cart_id = %cart.id, removed, "Cart cleared after fulfillment");

    Ok(outcome)
}

/// Confirmation-page trigger: look the session up at the provider and
/// fulfil it if paid. `Ok(None)` means the session is not paid yet.
pub async fn confirm_session<S>(
    store: &S,
    payments: &dyn PaymentGateway,
    session_id: &str,
) -> ShopResult<Option<FulfillmentOutcome>>
where
    S: CartStore + OrderStore + ?Sized,
{
    let session = payments.retrieve_session(session_id).await?;
    if !session.is_paid() {
        tracing::info!(
            session_id = %session_id,
            payment_status = %session.payment_status,
            "Confirmed session is not paid yet"
        );
        return Ok(None);
    }

    let paid = session
        .paid_session()
        .map_err(|e| ShopError::Validation(ErrorCode::PaymentSessionInvalid, e.to_string()))?;
    fulfill(store, &paid).await.map(Some)
}

/// Insert the order, surfacing a session conflict as `DuplicateFulfillment`
async fn create_order<S>(store: &S, order: &NewOrder) -> ShopResult<Order>
where
    S: OrderStore + ?Sized,
{
    store.insert_order(order).await.map_err(|e| match e {
        StoreError::Duplicate(_) => ShopError::DuplicateFulfillment(order.stripe_session_id.clone()),
        other => ShopError::Store(other),
    })
}
