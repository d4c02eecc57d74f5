//! Budget business logic - Handles budget definitions owned by a user.
//!
//! Provides functions for creating, retrieving, updating, and deleting budgets.
//! `spent` is never written here except for its initial zero; the reconciler in
//! [`crate::core::reconcile`] owns it.

use crate::{
    core::{dates, reconcile, report::BudgetStatus, transaction::recent_budget_transactions},
    entities::{Budget, BudgetPeriod, budget, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Select, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Smallest accepted budget ceiling
pub const MIN_BUDGET_AMOUNT: f64 = 1.0;

/// Client-supplied fields of a budget, used for both create and update.
///
/// There is no `spent` field; clients cannot set it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    /// Display name
    pub name: String,
    /// Spending ceiling
    pub amount: f64,
    /// Category matched exactly against transaction categories
    pub category: String,
    /// Informational period; defaults to monthly on create
    #[serde(default)]
    pub period: Option<BudgetPeriod>,
    /// Window start (inclusive)
    #[serde(deserialize_with = "dates::deserialize")]
    pub start_date: DateTime<Utc>,
    /// Window end (inclusive)
    #[serde(deserialize_with = "dates::deserialize")]
    pub end_date: DateTime<Utc>,
    /// Alert threshold percentage; defaults from settings on create
    #[serde(default)]
    pub alert_threshold: Option<f64>,
    /// Defaults to true on create
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Defaults to true on create
    #[serde(default)]
    pub notifications: Option<bool>,
}

/// Optional filters for listing budgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetFilter {
    /// Only budgets with this active flag
    pub active: Option<bool>,
    /// Only budgets with this exact category
    pub category: Option<String>,
}

/// A reconciled budget with the transactions that count against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDetail {
    /// Budget with fresh `spent` and derived values
    pub budget: BudgetStatus,
    /// Most recent matching transactions, newest first
    pub recent_transactions: Vec<transaction::Model>,
}

/// Validates a budget input: name, amount, category, window and threshold.
pub fn validate_budget_input(input: &BudgetInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::Validation {
            field: "name",
            message: "Budget name is required".to_string(),
        });
    }

    if !input.amount.is_finite() || input.amount < MIN_BUDGET_AMOUNT {
        return Err(Error::InvalidAmount {
            amount: input.amount,
        });
    }

    if input.category.trim().is_empty() {
        return Err(Error::Validation {
            field: "category",
            message: "Category is required".to_string(),
        });
    }

    if input.end_date <= input.start_date {
        return Err(Error::InvalidDateRange {
            start: input.start_date,
            end: input.end_date,
        });
    }

    if let Some(threshold) = input.alert_threshold {
        validate_threshold(threshold)?;
    }

    Ok(())
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(Error::Validation {
            field: "alertThreshold",
            message: format!("Alert threshold must be a positive percentage, got {threshold}"),
        });
    }
    Ok(())
}

/// Creates a budget for `user_id`, filling unspecified options with defaults.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - Owner of the new budget
/// * `input` - Client-supplied fields
/// * `default_alert_threshold` - Threshold used when the input has none
pub async fn create_budget(
    db: &DatabaseConnection,
    user_id: &str,
    input: BudgetInput,
    default_alert_threshold: f64,
) -> Result<budget::Model> {
    validate_budget_input(&input)?;
    let alert_threshold = input.alert_threshold.unwrap_or(default_alert_threshold);
    validate_threshold(alert_threshold)?;

    let now = Utc::now();
    let model = budget::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(input.name.trim().to_string()),
        amount: Set(input.amount),
        spent: Set(0.0),
        spent_refreshed_at: Set(None),
        category: Set(input.category),
        period: Set(input.period.unwrap_or_default()),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        alert_threshold: Set(alert_threshold),
        is_active: Set(input.is_active.unwrap_or(true)),
        notifications: Set(input.notifications.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    info!(budget_id = result.id, user_id, category = %result.category, "Created budget");
    Ok(result)
}

/// Base query for a user's budgets with optional filters applied.
#[must_use]
pub fn budgets_query(user_id: &str, filter: &BudgetFilter) -> Select<Budget> {
    let mut query = Budget::find().filter(budget::Column::UserId.eq(user_id));
    if let Some(active) = filter.active {
        query = query.filter(budget::Column::IsActive.eq(active));
    }
    if let Some(category) = &filter.category {
        query = query.filter(budget::Column::Category.eq(category.as_str()));
    }
    query
}

/// Finds a budget by id, scoped to its owner.
pub async fn get_budget<C>(db: &C, user_id: &str, budget_id: i64) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    Budget::find_by_id(budget_id)
        .filter(budget::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::BudgetNotFound { id: budget_id })
}

/// Reconciles a budget and returns it with its most recent matching transactions.
pub async fn get_budget_detail(
    db: &DatabaseConnection,
    user_id: &str,
    budget_id: i64,
    transaction_limit: u64,
) -> Result<BudgetDetail> {
    let budget = get_budget(db, user_id, budget_id).await?;
    let budget = reconcile::reconcile(db, budget).await?;
    let recent_transactions = recent_budget_transactions(db, &budget, transaction_limit).await?;

    Ok(BudgetDetail {
        budget: budget.into(),
        recent_transactions,
    })
}

/// Replaces the editable fields of a budget. Unset optional fields keep their values.
pub async fn update_budget(
    db: &DatabaseConnection,
    user_id: &str,
    budget_id: i64,
    input: BudgetInput,
) -> Result<budget::Model> {
    validate_budget_input(&input)?;

    let existing = get_budget(db, user_id, budget_id).await?;
    let period = input.period.unwrap_or(existing.period);
    let alert_threshold = input.alert_threshold.unwrap_or(existing.alert_threshold);
    let is_active = input.is_active.unwrap_or(existing.is_active);
    let notifications = input.notifications.unwrap_or(existing.notifications);

    let mut active_model: budget::ActiveModel = existing.into();
    active_model.name = Set(input.name.trim().to_string());
    active_model.amount = Set(input.amount);
    active_model.category = Set(input.category);
    active_model.period = Set(period);
    active_model.start_date = Set(input.start_date);
    active_model.end_date = Set(input.end_date);
    active_model.alert_threshold = Set(alert_threshold);
    active_model.is_active = Set(is_active);
    active_model.notifications = Set(notifications);
    active_model.updated_at = Set(Utc::now());

    let updated = active_model.update(db).await?;
    debug!(budget_id, user_id, "Updated budget");
    Ok(updated)
}

/// Permanently deletes a budget owned by `user_id`.
pub async fn delete_budget(db: &DatabaseConnection, user_id: &str, budget_id: i64) -> Result<()> {
    let result = Budget::delete_many()
        .filter(budget::Column::Id.eq(budget_id))
        .filter(budget::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::BudgetNotFound { id: budget_id });
    }

    info!(budget_id, user_id, "Deleted budget");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_budget_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Empty name
        let mut input = budget_input("food", 1000.0);
        input.name = "   ".to_string();
        let result = create_budget(&db, "user1", input, 80.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { field: "name", .. }
        ));

        // Amount below minimum
        let result = create_budget(&db, "user1", budget_input("food", 0.5), 80.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0.5 }
        ));

        let result = create_budget(&db, "user1", budget_input("food", 0.0), 80.0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        // Missing category
        let result = create_budget(&db, "user1", budget_input("", 100.0), 80.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "category",
                ..
            }
        ));

        // End not after start
        let mut input = budget_input("food", 100.0);
        input.end_date = input.start_date;
        let result = create_budget(&db, "user1", input, 80.0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidDateRange { .. }));

        // Non-positive threshold
        let mut input = budget_input("food", 100.0);
        input.alert_threshold = Some(0.0);
        let result = create_budget(&db, "user1", input, 80.0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "alertThreshold",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_budget_defaults() -> Result<()> {
        let db = setup_test_db().await?;

        let budget = create_budget(&db, "user1", budget_input("food", 1000.0), 75.0).await?;

        assert_eq!(budget.name, "food budget");
        assert_eq!(budget.amount, 1000.0);
        assert_eq!(budget.spent, 0.0);
        assert!(budget.spent_refreshed_at.is_none());
        assert_eq!(budget.period, BudgetPeriod::Monthly);
        assert_eq!(budget.alert_threshold, 75.0);
        assert!(budget.is_active);
        assert!(budget.notifications);

        Ok(())
    }

    #[test]
    fn test_input_ignores_client_spent() {
        let input: BudgetInput = serde_json::from_str(
            r#"{
                "name": "Food",
                "amount": 500,
                "spent": 499,
                "category": "food",
                "startDate": "2024-01-01",
                "endDate": "2024-01-31",
                "period": "weekly"
            }"#,
        )
        .unwrap();
        assert_eq!(input.amount, 500.0);
        assert_eq!(input.period, Some(BudgetPeriod::Weekly));
        assert!(input.alert_threshold.is_none());
        assert!(validate_budget_input(&input).is_ok());
    }

    #[tokio::test]
    async fn test_get_budget_scoped_by_owner() -> Result<()> {
        let db = setup_test_db().await?;

        let budget = create_test_budget(&db, "user1", "food", 1000.0).await?;

        assert_eq!(get_budget(&db, "user1", budget.id).await?, budget);

        let result = get_budget(&db, "intruder", budget.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::BudgetNotFound { id } if id == budget.id
        ));

        let result = get_budget(&db, "user1", 999).await;
        assert!(matches!(result.unwrap_err(), Error::BudgetNotFound { id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_budget_keeps_unset_options_and_spent() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = budget_input("food", 1000.0);
        input.alert_threshold = Some(60.0);
        input.notifications = Some(false);
        let budget = create_budget(&db, "user1", input, 80.0).await?;

        create_test_expense(&db, "user1", "food", 300.0, ymd(2024, 1, 10)).await?;
        crate::core::reconcile::reconcile(&db, budget.clone()).await?;

        let mut update = budget_input("food", 2000.0);
        update.name = "  Groceries ".to_string();
        let updated = update_budget(&db, "user1", budget.id, update).await?;

        assert_eq!(updated.name, "Groceries");
        assert_eq!(updated.amount, 2000.0);
        assert_eq!(updated.alert_threshold, 60.0);
        assert!(!updated.notifications);
        assert_eq!(updated.spent, 300.0);

        let result = update_budget(&db, "intruder", budget.id, budget_input("food", 10.0)).await;
        assert!(matches!(result.unwrap_err(), Error::BudgetNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_budget_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let budget = create_test_budget(&db, "user1", "food", 1000.0).await?;

        let result = delete_budget(&db, "intruder", budget.id).await;
        assert!(matches!(result.unwrap_err(), Error::BudgetNotFound { .. }));

        delete_budget(&db, "user1", budget.id).await?;
        assert!(Budget::find_by_id(budget.id).one(&db).await?.is_none());

        let result = delete_budget(&db, "user1", budget.id).await;
        assert!(matches!(result.unwrap_err(), Error::BudgetNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_budget_detail_reconciles_and_lists_recent() -> Result<()> {
        let db = setup_test_db().await?;

        let budget = create_test_budget(&db, "user1", "food", 1000.0).await?;
        for day in 1..=12 {
            create_test_expense(&db, "user1", "food", 10.0, ymd(2024, 1, day)).await?;
        }
        create_test_expense(&db, "user1", "rent", 500.0, ymd(2024, 1, 20)).await?;

        let detail = get_budget_detail(&db, "user1", budget.id, 10).await?;

        assert_eq!(detail.budget.budget.spent, 120.0);
        assert_eq!(detail.budget.progress, 12.0);
        assert_eq!(detail.budget.remaining, 880.0);
        assert_eq!(detail.recent_transactions.len(), 10);
        assert_eq!(detail.recent_transactions[0].date, ymd(2024, 1, 12));
        assert!(detail.recent_transactions.iter().all(|t| t.category == "food"));

        // Persisted, not just returned
        let stored = get_budget(&db, "user1", budget.id).await?;
        assert_eq!(stored.spent, 120.0);
        assert!(stored.spent_refreshed_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_budgets_query_filters() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_budget(&db, "user1", "food", 100.0).await?;
        let mut inactive = budget_input("travel", 500.0);
        inactive.is_active = Some(false);
        create_budget(&db, "user1", inactive, 80.0).await?;
        create_test_budget(&db, "user2", "food", 100.0).await?;

        let all = budgets_query("user1", &BudgetFilter::default()).all(&db).await?;
        assert_eq!(all.len(), 2);

        let active = BudgetFilter {
            active: Some(true),
            category: None,
        };
        let active = budgets_query("user1", &active).all(&db).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].category, "food");

        let travel = BudgetFilter {
            active: None,
            category: Some("travel".to_string()),
        };
        let travel = budgets_query("user1", &travel).all(&db).await?;
        assert_eq!(travel.len(), 1);
        assert!(!travel[0].is_active);

        Ok(())
    }
}
