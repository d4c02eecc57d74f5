//! Report generation business logic.
//!
//! This module derives the display values of a budget (progress and remaining)
//! and aggregates transaction statistics. Progress and remaining are never
//! stored; everything that shows a budget goes through [`BudgetStatus`] so the
//! numbers are computed the same way everywhere.

use crate::{
    core::transaction::{DateRange, date_range_condition},
    entities::{Transaction, TransactionType, budget, transaction},
    errors::Result,
};
use chrono::Datelike;
use sea_orm::{DatabaseConnection, QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A budget together with its derived display values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    /// The budget snapshot
    #[serde(flatten)]
    pub budget: budget::Model,
    /// Percent of the ceiling consumed (unrounded)
    pub progress: f64,
    /// Ceiling minus spent; negative when overspent
    pub remaining: f64,
}

impl From<budget::Model> for BudgetStatus {
    fn from(budget: budget::Model) -> Self {
        let progress = calculate_progress(budget.spent, budget.amount);
        let remaining = calculate_remaining(budget.spent, budget.amount);
        Self {
            budget,
            progress,
            remaining,
        }
    }
}

/// Calculates how much of a budget has been consumed, as a percentage.
///
/// - 0% = nothing spent
/// - 100% = ceiling reached
/// - above 100% = overspent
///
/// A non-positive ceiling cannot be consumed proportionally; it is reported
/// as 100% so the budget reads as exceeded instead of dividing by zero.
#[must_use]
pub fn calculate_progress(spent: f64, amount: f64) -> f64 {
    if amount <= 0.0 {
        return 100.0;
    }

    (spent / amount) * 100.0
}

/// Calculates the amount left before the ceiling. Negative when overspent.
#[must_use]
pub fn calculate_remaining(spent: f64, amount: f64) -> f64 {
    amount - spent
}

/// Rounds a progress percentage to the nearest integer, halves rounding up.
#[must_use]
pub fn round_progress(progress: f64) -> i64 {
    // Cast safety: progress is a finite percentage; realistic values are far inside i64.
    #[allow(clippy::cast_possible_truncation)]
    let rounded = (progress + 0.5).floor() as i64;
    rounded
}

/// Totals for one transaction type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeTotal {
    /// Income or expense
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Sum of amounts
    pub total: f64,
    /// Number of transactions
    pub count: u64,
}

/// Expense totals for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// Category exactly as stored
    pub category: String,
    /// Sum of expense amounts
    pub total: f64,
    /// Number of expenses
    pub count: u64,
}

/// Totals for one type within one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: u32,
    /// Income or expense
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Sum of amounts
    pub total: f64,
    /// Number of transactions
    pub count: u64,
}

/// Aggregated statistics over a user's live transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionStats {
    /// Per-type totals (income first)
    pub overview: Vec<TypeTotal>,
    /// Expense totals per category, largest first
    pub categories: Vec<CategoryTotal>,
    /// Per-month, per-type totals in chronological order
    pub monthly: Vec<MonthlyTotal>,
}

/// Aggregates a user's non-deleted transactions within an optional date range.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - Owner whose transactions are aggregated
/// * `range` - Inclusive bounds; either side may be open
pub async fn transaction_stats(
    db: &DatabaseConnection,
    user_id: &str,
    range: &DateRange,
) -> Result<TransactionStats> {
    let transactions = Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::IsDeleted.eq(false))
        .filter(date_range_condition(range))
        .order_by_asc(transaction::Column::Date)
        .all(db)
        .await?;

    Ok(summarize_transactions(&transactions))
}

/// Folds transactions into overview, category and monthly totals.
#[must_use]
pub fn summarize_transactions(transactions: &[transaction::Model]) -> TransactionStats {
    let mut overview: BTreeMap<TransactionType, (f64, u64)> = BTreeMap::new();
    let mut categories: HashMap<&str, (f64, u64)> = HashMap::new();
    let mut monthly: BTreeMap<(i32, u32, TransactionType), (f64, u64)> = BTreeMap::new();

    for tx in transactions {
        accumulate(overview.entry(tx.transaction_type).or_default(), tx.amount);
        if tx.transaction_type == TransactionType::Expense {
            accumulate(categories.entry(tx.category.as_str()).or_default(), tx.amount);
        }
        let key = (tx.date.year(), tx.date.month(), tx.transaction_type);
        accumulate(monthly.entry(key).or_default(), tx.amount);
    }

    let mut categories: Vec<CategoryTotal> = categories
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
        })
        .collect();
    categories.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    TransactionStats {
        overview: overview
            .into_iter()
            .map(|(transaction_type, (total, count))| TypeTotal {
                transaction_type,
                total,
                count,
            })
            .collect(),
        categories,
        monthly: monthly
            .into_iter()
            .map(|((year, month, transaction_type), (total, count))| MonthlyTotal {
                year,
                month,
                transaction_type,
                total,
                count,
            })
            .collect(),
    }
}

fn accumulate(slot: &mut (f64, u64), amount: f64) {
    slot.0 += amount;
    slot.1 += 1;
}
