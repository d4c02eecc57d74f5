//! Budget alerts - derives warning and exceeded signals from reconciled budgets.
//!
//! Alerts are never stored. Each evaluation reconciles the eligible budgets and
//! builds a fresh list; a budget below its threshold simply produces no entry.

use crate::{
    core::{
        budget::{BudgetFilter, budgets_query},
        reconcile,
        report::{calculate_progress, calculate_remaining, round_progress},
    },
    entities::budget,
    errors::Result,
};
use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Threshold reached but still under the ceiling
    Warning,
    /// Ceiling reached or passed
    Exceeded,
}

/// One alert for one budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    /// Reconciled budget snapshot
    pub budget: budget::Model,
    /// Progress percentage rounded half-up
    pub progress: i64,
    /// Freshly computed spent
    pub spent: f64,
    /// Ceiling minus spent; negative when exceeded
    pub remaining: f64,
    /// Warning or exceeded
    #[serde(rename = "type")]
    pub kind: AlertKind,
}

/// Classifies an unrounded progress value against a threshold.
///
/// Returns `None` below the threshold. At or above 100% the budget is exceeded
/// regardless of the threshold.
#[must_use]
pub fn classify(progress: f64, threshold: f64) -> Option<AlertKind> {
    if progress < threshold {
        None
    } else if progress >= 100.0 {
        Some(AlertKind::Exceeded)
    } else {
        Some(AlertKind::Warning)
    }
}

/// Builds the alert for an already reconciled budget, if it has crossed its threshold.
#[must_use]
pub fn alert_for(budget: budget::Model) -> Option<Alert> {
    let progress = calculate_progress(budget.spent, budget.amount);
    let kind = classify(progress, budget.alert_threshold)?;

    Some(Alert {
        progress: round_progress(progress),
        spent: budget.spent,
        remaining: calculate_remaining(budget.spent, budget.amount),
        kind,
        budget,
    })
}

/// Reconciles the user's active, notifying budgets and returns their alerts.
///
/// Alerts come out in budget creation order. Like the budget listing, the
/// reconciliation writes run in one transaction and any failure aborts the
/// whole evaluation.
#[instrument(skip(db))]
pub async fn evaluate(db: &DatabaseConnection, user_id: &str) -> Result<Vec<Alert>> {
    let txn = db.begin().await?;

    let filter = BudgetFilter {
        active: Some(true),
        category: None,
    };
    let budgets = budgets_query(user_id, &filter)
        .filter(budget::Column::Notifications.eq(true))
        .order_by_asc(budget::Column::CreatedAt)
        .order_by_asc(budget::Column::Id)
        .all(&txn)
        .await?;

    let mut alerts = Vec::new();
    for budget in budgets {
        let budget = reconcile::reconcile(&txn, budget).await?;
        if let Some(alert) = alert_for(budget) {
            alerts.push(alert);
        }
    }

    txn.commit().await?;

    info!(count = alerts.len(), "Evaluated budget alerts");
    Ok(alerts)
}
