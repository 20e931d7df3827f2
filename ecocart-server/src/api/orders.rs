//! Order history

use axum::{Extension, Json, extract::State};
use shared::models::OrderDetail;

use crate::auth::UserIdentity;
use crate::services::orders;
use crate::state::AppState;

use super::ApiResult;

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<OrderDetail>> {
    Ok(Json(
        orders::list_orders(state.store.as_ref(), &identity.user_id).await?,
    ))
}
