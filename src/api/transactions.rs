//! Transaction routes under `/api/transactions`.

use super::{
    AppState, Owner,
    budgets::category_filter,
    error::{ApiError, ApiResult},
};
use crate::{
    core::{
        dates,
        report,
        transaction::{self, DateRange, TransactionFilter, TransactionInput},
    },
    entities::TransactionType,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    page: Option<u64>,
    limit: Option<u64>,
    #[serde(rename = "type")]
    transaction_type: Option<String>,
    category: Option<String>,
    #[serde(default, deserialize_with = "dates::deserialize_option")]
    start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "dates::deserialize_option")]
    end_date: Option<DateTime<Utc>>,
    search: Option<String>,
}

fn parse_type_filter(raw: Option<&str>) -> ApiResult<Option<TransactionType>> {
    match raw.map(str::trim) {
        None | Some("" | "all") => Ok(None),
        Some("income") => Ok(Some(TransactionType::Income)),
        Some("expense") => Ok(Some(TransactionType::Expense)),
        Some(other) => Err(ApiError::BadRequest(format!(
            "type must be income, expense or all, got {other}"
        ))),
    }
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let limits = &state.settings.transactions;
    let filter = TransactionFilter {
        transaction_type: parse_type_filter(query.transaction_type.as_deref())?,
        category: category_filter(query.category),
        range: DateRange {
            start: query.start_date,
            end: query.end_date,
        },
        search: query.search,
        page: query.page.unwrap_or(1).max(1),
        limit: query
            .limit
            .unwrap_or(limits.default_page_size)
            .clamp(1, limits.max_page_size),
    };

    let page = transaction::list_transactions(&state.db, &user_id, &filter).await?;
    Ok(Json(json!({
        "success": true,
        "transactions": page.transactions,
        "pagination": page.pagination,
    })))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Json(input): Json<TransactionInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let created = transaction::create_transaction(&state.db, &user_id, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Transaction created successfully",
            "transaction": created,
        })),
    ))
}

async fn transaction_stats(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Query(range): Query<DateRange>,
) -> ApiResult<Json<Value>> {
    let stats = report::transaction_stats(&state.db, &user_id, &range).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let found = transaction::get_transaction(&state.db, &user_id, id).await?;
    Ok(Json(json!({ "success": true, "transaction": found })))
}

async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Path(id): Path<i64>,
    Json(input): Json<TransactionInput>,
) -> ApiResult<Json<Value>> {
    let updated = transaction::update_transaction(&state.db, &user_id, id, input).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Transaction updated successfully",
        "transaction": updated,
    })))
}

async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Owner(user_id): Owner,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    transaction::soft_delete_transaction(&state.db, &user_id, id).await?;
    Ok(Json(json!({ "success": true, "message": "Transaction deleted successfully" })))
}

/// Routes mounted under `/api`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/stats", get(transaction_stats))
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}
