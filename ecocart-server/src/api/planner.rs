//! Budget meal planner endpoint

use axum::{Json, extract::State};

use crate::services::planner::{self, MealPlan, PlanRequest};
use crate::state::AppState;

use super::ApiResult;

/// POST /api/planner
pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> ApiResult<MealPlan> {
    let plan =
        planner::generate_plan(state.store.as_ref(), state.completions.as_ref(), &req).await?;
    Ok(Json(plan))
}
