//! Admin dashboard endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{Order, OrderStatus};

use crate::services::dashboard::{self, FinancialMetrics};
use crate::services::orders;
use crate::state::AppState;

use super::ApiResult;

/// GET /api/admin/metrics
pub async fn metrics(State(state): State<AppState>) -> ApiResult<FinancialMetrics> {
    let metrics = dashboard::financial_metrics(state.store.as_ref(), chrono::Utc::now()).await?;
    Ok(Json(metrics))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// PATCH /api/admin/orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Order> {
    let order = orders::advance_status(state.store.as_ref(), &order_id, req.status).await?;
    Ok(Json(order))
}
