//! Cart operations
//!
//! One cart per owner, created lazily on first add. Adding a product already
//! in the cart accumulates its quantity, up to [`MAX_LINE_QUANTITY`] per line.

use futures::future::join_all;
use serde::Serialize;
use shared::error::ErrorCode;
use shared::models::{CartItem, CartItemInput, CartView, MAX_LINE_QUANTITY};
use shared::util::now_millis;

use crate::error::{ShopError, ShopResult};
use crate::store::{CartStore, CatalogStore, StoreError};

/// Result of a batch add
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAddResult {
    pub added: usize,
    pub failed: usize,
}

pub async fn add_item<S>(
    store: &S,
    owner_id: &str,
    product_id: &str,
    quantity: i32,
) -> ShopResult<CartItem>
where
    S: CartStore + CatalogStore + ?Sized,
{
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(quantity_error());
    }
    if store.find_product(product_id).await?.is_none() {
        return Err(ShopError::NotFound(ErrorCode::ProductNotFound));
    }

    let now = now_millis();
    let cart = store.get_or_create_cart(owner_id, now).await?;
    let item = store
        .upsert_item(&cart.id, product_id, quantity, now)
        .await
        .map_err(|e| match e {
            StoreError::Constraint(_) => quantity_error(),
            other => ShopError::Store(other),
        })?;

    tracing::debug!(
        owner_id = %owner_id,
        product_id = %product_id,
        quantity = item.quantity,
        "Cart item upserted"
    );
    Ok(item)
}

fn quantity_error() -> ShopError {
    ShopError::Validation(
        ErrorCode::CartInvalidQuantity,
        format!("quantity must be between 1 and {MAX_LINE_QUANTITY}"),
    )
}

/// Add several entries concurrently; each succeeds or fails on its own
pub async fn add_all_items<S>(
    store: &S,
    owner_id: &str,
    entries: &[CartItemInput],
) -> BatchAddResult
where
    S: CartStore + CatalogStore + ?Sized,
{
    let results = join_all(
        entries
            .iter()
            .map(|entry| add_item(store, owner_id, &entry.product_id, entry.quantity)),
    )
    .await;

    let mut summary = BatchAddResult::default();
    for (entry, result) in entries.iter().zip(results) {
        match result {
            Ok(_) => summary.added += 1,
            Err(e) => {
                tracing::warn!(
                    owner_id = %owner_id,
                    product_id = %entry.product_id,
                    error = %e,
                    "Batch add entry failed"
                );
                summary.failed += 1;
            }
        }
    }
    summary
}

/// Delete an item from the caller's own cart.
///
/// Unknown items and items in someone else's cart both fail with
/// `NotAuthorized`, so existence is not revealed.
pub async fn remove_item<S>(store: &S, owner_id: &str, item_id: &str) -> ShopResult<()>
where
    S: CartStore + ?Sized,
{
    let Some(item) = store.find_item(item_id).await? else {
        return Err(ShopError::NotAuthorized);
    };
    let owned = store
        .find_cart(&item.cart_id)
        .await?
        .is_some_and(|cart| cart.owner_id == owner_id);
    if !owned {
        tracing::warn!(owner_id = %owner_id, item_id = %item_id, "Cart item removal denied");
        return Err(ShopError::NotAuthorized);
    }

    store.delete_item(item_id).await?;
    Ok(())
}

/// The caller's cart with items sorted by product ID, if it exists
pub async fn list_cart<S>(store: &S, owner_id: &str) -> ShopResult<Option<CartView>>
where
    S: CartStore + ?Sized,
{
    let Some(cart) = store.find_cart_by_owner(owner_id).await? else {
        return Ok(None);
    };
    let items = store.list_lines(&cart.id).await?;
    Ok(Some(CartView { cart, items }))
}
