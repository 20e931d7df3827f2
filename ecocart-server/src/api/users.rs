//! Identity sync endpoint

use axum::{Extension, Json, extract::State};
use serde_json::json;

use crate::auth::UserIdentity;
use crate::services::users::{self, SyncUserRequest};
use crate::state::AppState;

use super::ApiResult;

/// POST /api/users/sync
pub async fn sync(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<SyncUserRequest>,
) -> ApiResult<serde_json::Value> {
    users::sync_user(state.store.as_ref(), &identity.user_id, req).await?;
    Ok(Json(json!({ "success": true })))
}
