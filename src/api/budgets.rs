//! Budget routes under `/api/budgets`.

use super::{
    AppState, Owner,
    error::{ApiError, ApiResult},
};
use crate::core::{
    alerts,
    budget::{self, BudgetFilter, BudgetInput},
    reconcile,
    report::BudgetStatus,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
struct BudgetQuery {
    active: Option<String>,
    category: Option<String>,
}

impl BudgetQuery {
    fn into_filter(self) -> ApiResult<BudgetFilter> {
        let active = match self.active.as_deref().map(str::trim) {
            None | Some("" | "all") => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "active must be true or false, got {other}"
                )));
            }
        };
        Ok(BudgetFilter {
            active,
            category: category_filter(self.category),
        })
    }
}

/// Drops an empty or `all` category, which both mean no filter.
pub(super) fn category_filter(category: Option<String>) -> Option<String> {
    category.filter(|c| !c.is_empty() && c != "all")
}

async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Query(query): Query<BudgetQuery>,
) -> ApiResult<Json<Value>> {
    let filter = query.into_filter()?;
    let budgets: Vec<BudgetStatus> = reconcile::reconcile_all(&state.db, &user_id, &filter)
        .await?
        .into_iter()
        .map(BudgetStatus::from)
        .collect();

    Ok(Json(json!({ "success": true, "budgets": budgets })))
}

async fn create_budget(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Json(input): Json<BudgetInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let threshold = state.settings.budgets.default_alert_threshold;
    let created = budget::create_budget(&state.db, &user_id, input, threshold).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Budget created successfully",
            "budget": BudgetStatus::from(created),
        })),
    ))
}

async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
) -> ApiResult<Json<Value>> {
    let alerts = alerts::evaluate(&state.db, &user_id).await?;
    Ok(Json(json!({ "success": true, "alerts": alerts })))
}

async fn get_budget(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let limit = state.settings.budgets.recent_transactions_limit;
    let detail = budget::get_budget_detail(&state.db, &user_id, id, limit).await?;

    Ok(Json(json!({
        "success": true,
        "budget": detail.budget,
        "recentTransactions": detail.recent_transactions,
    })))
}

async fn update_budget(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Path(id): Path<i64>,
    Json(input): Json<BudgetInput>,
) -> ApiResult<Json<Value>> {
    let updated = budget::update_budget(&state.db, &user_id, id, input).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Budget updated successfully",
        "budget": BudgetStatus::from(updated),
    })))
}

async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    budget::delete_budget(&state.db, &user_id, id).await?;
    Ok(Json(json!({ "success": true, "message": "Budget deleted successfully" })))
}

/// Routes mounted under `/api`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/alerts", get(list_alerts))
        .route(
            "/budgets/{id}",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
}
