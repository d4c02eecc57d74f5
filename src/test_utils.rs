//! Shared test utilities for the budget tracker.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        budget::{self, BudgetInput},
        transaction::{self, TransactionInput},
    },
    entities::{self, BudgetPeriod, PaymentMethod, TransactionType},
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Midnight UTC on the given calendar day.
///
/// # Panics
/// Panics on an invalid date; only meant for literal test dates.
#[allow(clippy::unwrap_used)]
pub fn ymd(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Budget input with sensible defaults.
///
/// # Defaults
/// * `name`: `"<category> budget"`
/// * window: 2024-01-01 to 2024-01-31 (midnight UTC)
/// * `period`, `alert_threshold`, `is_active`, `notifications`: unset
pub fn budget_input(category: &str, amount: f64) -> BudgetInput {
    BudgetInput {
        name: format!("{category} budget"),
        amount,
        category: category.to_string(),
        period: None,
        start_date: ymd(2024, 1, 1),
        end_date: ymd(2024, 1, 31),
        alert_threshold: None,
        is_active: None,
        notifications: None,
    }
}

/// Creates a January 2024 budget with an 80% threshold.
pub async fn create_test_budget(
    db: &DatabaseConnection,
    user_id: &str,
    category: &str,
    amount: f64,
) -> Result<entities::budget::Model> {
    budget::create_budget(db, user_id, budget_input(category, amount), 80.0).await
}

/// Expense input dated 2024-01-15 with description `"Test transaction"`.
pub fn expense_input(category: &str, amount: f64) -> TransactionInput {
    TransactionInput {
        amount,
        transaction_type: TransactionType::Expense,
        category: category.to_string(),
        subcategory: String::new(),
        description: "Test transaction".to_string(),
        date: Some(ymd(2024, 1, 15)),
        payment_method: PaymentMethod::Card,
        location: String::new(),
        currency: "USD".to_string(),
    }
}

/// Creates an expense on `date`.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    user_id: &str,
    category: &str,
    amount: f64,
    date: DateTime<Utc>,
) -> Result<entities::transaction::Model> {
    let mut input = expense_input(category, amount);
    input.date = Some(date);
    transaction::create_transaction(db, user_id, input).await
}

/// Creates an income transaction on `date`.
pub async fn create_test_income(
    db: &DatabaseConnection,
    user_id: &str,
    category: &str,
    amount: f64,
    date: DateTime<Utc>,
) -> Result<entities::transaction::Model> {
    let mut input = expense_input(category, amount);
    input.transaction_type = TransactionType::Income;
    input.date = Some(date);
    transaction::create_transaction(db, user_id, input).await
}

/// In-memory budget model for pure computations; never persisted.
pub fn sample_budget(category: &str, amount: f64) -> entities::budget::Model {
    entities::budget::Model {
        id: 1,
        user_id: "user1".to_string(),
        name: format!("{category} budget"),
        amount,
        spent: 0.0,
        spent_refreshed_at: None,
        category: category.to_string(),
        period: BudgetPeriod::Monthly,
        start_date: ymd(2024, 1, 1),
        end_date: ymd(2024, 1, 31),
        alert_threshold: 80.0,
        is_active: true,
        notifications: true,
        created_at: ymd(2024, 1, 1),
        updated_at: ymd(2024, 1, 1),
    }
}

/// In-memory transaction model for pure computations; never persisted.
pub fn sample_transaction(
    transaction_type: TransactionType,
    category: &str,
    amount: f64,
    date: DateTime<Utc>,
) -> entities::transaction::Model {
    entities::transaction::Model {
        id: 1,
        user_id: "user1".to_string(),
        amount,
        transaction_type,
        category: category.to_string(),
        subcategory: String::new(),
        description: "Test transaction".to_string(),
        date,
        payment_method: PaymentMethod::Cash,
        location: String::new(),
        currency: "USD".to_string(),
        is_deleted: false,
        created_at: date,
        updated_at: date,
    }
}
