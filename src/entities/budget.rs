//! Budget entity - A spending ceiling for one category over an explicit date window.
//!
//! `spent` is a cached projection written only by the reconciler. It is never
//! authoritative: every read path recomputes it from transactions first, and
//! `spent_refreshed_at` records when that last happened.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Informational budget period; the date window is always explicit
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Weekly
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Monthly
    #[default]
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Yearly
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the budget
    pub user_id: String,
    /// Display name (e.g., "Groceries")
    pub name: String,
    /// Spending ceiling
    pub amount: f64,
    /// Cached sum of matching expenses, overwritten on every reconciliation
    pub spent: f64,
    /// When `spent` was last recomputed; `None` until the first reconciliation
    pub spent_refreshed_at: Option<DateTimeUtc>,
    /// Must equal transaction categories exactly for them to count
    pub category: String,
    /// Informational period label
    pub period: BudgetPeriod,
    /// First instant of the window (inclusive)
    pub start_date: DateTimeUtc,
    /// Last instant of the window (inclusive)
    pub end_date: DateTimeUtc,
    /// Percentage of `amount` at which alerts start
    pub alert_threshold: f64,
    /// Inactive budgets are skipped by the alert evaluator
    pub is_active: bool,
    /// Whether this budget participates in alerts
    pub notifications: bool,
    /// When the budget was created
    pub created_at: DateTimeUtc,
    /// When the budget definition was last modified
    pub updated_at: DateTimeUtc,
}

/// Budgets have no foreign-key relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
