//! Order history and status changes

use shared::error::ErrorCode;
use shared::models::{Order, OrderDetail, OrderStatus};

use crate::error::{ShopError, ShopResult};
use crate::store::OrderStore;

/// The owner's orders, newest first, with items and products
pub async fn list_orders<S>(store: &S, owner_id: &str) -> ShopResult<Vec<OrderDetail>>
where
    S: OrderStore + ?Sized,
{
    Ok(store.list_orders_for_owner(owner_id).await?)
}

/// Move an order forward in its lifecycle
pub async fn advance_status<S>(store: &S, order_id: &str, next: OrderStatus) -> ShopResult<Order>
where
    S: OrderStore + ?Sized,
{
    let mut order = store
        .find_order(order_id)
        .await?
        .ok_or(ShopError::NotFound(ErrorCode::OrderNotFound))?;

    if order.status.is_terminal() {
        return Err(ShopError::Validation(
            ErrorCode::OrderInvalidTransition,
            format!("order is already {}", order.status.as_db()),
        ));
    }
    if !order.status.can_transition_to(next) {
        return Err(ShopError::Validation(
            ErrorCode::OrderInvalidTransition,
            format!(
                "cannot move order from {} to {}",
                order.status.as_db(),
                next.as_db()
            ),
        ));
    }

    store.update_order_status(order_id, next).await?;
    tracing::info!(
        order_id = %order_id,
        from = order.status.as_db(),
        to = next.as_db(),
        "Order status changed"
    );

    order.status = next;
    Ok(order)
}
