//! Budget reconciliation - recomputes each budget's cached `spent` from transactions.
//!
//! Reconciliation is read-triggered: list, detail and alert reads recompute
//! `spent` and persist it immediately. Transaction writes never touch budgets,
//! so a stored `spent` can be stale between reads, but nothing returned to a
//! caller ever is.
//!
//! Concurrent reconciliations of the same budget are not coordinated. Each one
//! writes the sum it observed; the last write wins. `spent` is a cache, so this
//! only affects what the next raw read of the row sees.

use crate::{
    core::budget::{BudgetFilter, budgets_query},
    core::transaction::budget_window_condition,
    entities::{Budget, Transaction, budget, transaction},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func},
};
use tracing::{debug, info, instrument};

/// Sums the expenses that count against `budget`. No matches sums to zero.
#[instrument(skip(db, budget), fields(budget_id = budget.id))]
pub async fn sum_spent<C>(db: &C, budget: &budget::Model) -> Result<f64>
where
    C: ConnectionTrait,
{
    let total: Option<Option<f64>> = Transaction::find()
        .select_only()
        .column_as(
            Expr::expr(Func::sum(Expr::col(transaction::Column::Amount))),
            "total",
        )
        .filter(budget_window_condition(budget))
        .into_tuple::<Option<f64>>()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0.0))
}

/// Recomputes `spent` for one budget and persists it.
///
/// The write is a single-row UPDATE of `spent` and `spent_refreshed_at`, issued
/// even when the value did not change. The returned model carries the values
/// that were written.
pub async fn reconcile<C>(db: &C, budget: budget::Model) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    let spent = sum_spent(db, &budget).await?;
    let refreshed_at = Utc::now();

    let result = Budget::update_many()
        .col_expr(budget::Column::Spent, Expr::value(spent))
        .col_expr(budget::Column::SpentRefreshedAt, Expr::value(refreshed_at))
        .filter(budget::Column::Id.eq(budget.id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::BudgetNotFound { id: budget.id });
    }

    debug!(budget_id = budget.id, spent, "Reconciled budget");
    Ok(budget::Model {
        spent,
        spent_refreshed_at: Some(refreshed_at),
        ..budget
    })
}

/// Reconciles every budget of `user_id` matching `filter`, newest first.
///
/// Budgets are processed one at a time inside a single database transaction.
/// Any failure aborts the batch and rolls back the writes already made, so a
/// caller either gets every budget reconciled or an error and no changes.
#[instrument(skip(db, filter))]
pub async fn reconcile_all(
    db: &DatabaseConnection,
    user_id: &str,
    filter: &BudgetFilter,
) -> Result<Vec<budget::Model>> {
    let txn = db.begin().await?;

    let budgets = budgets_query(user_id, filter)
        .order_by_desc(budget::Column::CreatedAt)
        .order_by_desc(budget::Column::Id)
        .all(&txn)
        .await?;

    let mut reconciled = Vec::with_capacity(budgets.len());
    for budget in budgets {
        reconciled.push(reconcile(&txn, budget).await?);
    }

    txn.commit().await?;

    info!(count = reconciled.len(), "Reconciled budgets");
    Ok(reconciled)
}
