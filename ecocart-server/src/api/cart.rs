//! Cart endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::json;
use shared::models::{CartItem, CartItemInput, CartView};

use crate::auth::UserIdentity;
use crate::services::cart::{self, BatchAddResult};
use crate::state::AppState;

use super::ApiResult;

#[derive(Deserialize)]
pub struct BatchAddRequest {
    pub items: Vec<CartItemInput>,
}

/// GET /api/cart
///
/// `null` when the user has never added anything.
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Option<CartView>> {
    Ok(Json(
        cart::list_cart(state.store.as_ref(), &identity.user_id).await?,
    ))
}

/// POST /api/cart/items
pub async fn add_item(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(input): Json<CartItemInput>,
) -> ApiResult<CartItem> {
    let item = cart::add_item(
        state.store.as_ref(),
        &identity.user_id,
        &input.product_id,
        input.quantity,
    )
    .await?;
    Ok(Json(item))
}

/// POST /api/cart/items/batch
pub async fn add_items(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<BatchAddRequest>,
) -> Json<BatchAddResult> {
    Json(cart::add_all_items(state.store.as_ref(), &identity.user_id, &req.items).await)
}

/// DELETE /api/cart/items/{id}
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(item_id): Path<String>,
) -> ApiResult<serde_json::Value> {
    cart::remove_item(state.store.as_ref(), &identity.user_id, &item_id).await?;
    Ok(Json(json!({ "success": true })))
}
