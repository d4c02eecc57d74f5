//! Transaction business logic - Handles all transaction-related operations.
//!
//! Every query here is scoped by owner and ignores soft-deleted rows. Deleting
//! only flips `is_deleted`; rows are never removed. Budgets are not touched by
//! transaction writes: their `spent` value is recomputed on read by
//! [`crate::core::reconcile`].

use crate::{
    core::dates,
    entities::{PaymentMethod, Transaction, TransactionType, budget, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, PaginatorTrait, QueryOrder, QuerySelect, Select, Set,
    prelude::*,
    sea_query::{Expr, LikeExpr},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Smallest accepted transaction amount
pub const MIN_TRANSACTION_AMOUNT: f64 = 0.01;

/// Longest accepted description, in characters
pub const MAX_DESCRIPTION_LEN: usize = 200;

const LIKE_ESCAPE: char = '!';

/// Client-supplied fields of a transaction, used for both create and update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    /// Positive amount
    pub amount: f64,
    /// Income or expense
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Free-form category, stored verbatim
    pub category: String,
    /// Optional finer-grained category
    #[serde(default)]
    pub subcategory: String,
    /// Required description
    pub description: String,
    /// When the money moved; defaults to now
    #[serde(default, deserialize_with = "dates::deserialize_option")]
    pub date: Option<DateTime<Utc>>,
    /// How it was paid
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Free-form location
    #[serde(default)]
    pub location: String,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Inclusive date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// Earliest included instant
    #[serde(default, rename = "startDate", deserialize_with = "dates::deserialize_option")]
    pub start: Option<DateTime<Utc>>,
    /// Latest included instant
    #[serde(default, rename = "endDate", deserialize_with = "dates::deserialize_option")]
    pub end: Option<DateTime<Utc>>,
}

/// Filters for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only this type
    pub transaction_type: Option<TransactionType>,
    /// Only this exact category
    pub category: Option<String>,
    /// Inclusive date bounds
    pub range: DateRange,
    /// Case-insensitive substring of description or category
    pub search: Option<String>,
    /// 1-based page number
    pub page: u64,
    /// Page size
    pub limit: u64,
}

/// Pagination metadata returned with a page of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page (1-based)
    pub current: u64,
    /// Total number of pages
    pub pages: u64,
    /// Total number of matching transactions
    pub total: u64,
}

/// One page of transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionPage {
    /// Transactions on this page, newest first
    pub transactions: Vec<transaction::Model>,
    /// Paging metadata
    pub pagination: Pagination,
}

/// Checks amount, category and description of a transaction input.
///
/// Category is only checked for presence; it is stored exactly as given.
pub fn validate_transaction_input(input: &TransactionInput) -> Result<()> {
    if !input.amount.is_finite() || input.amount < MIN_TRANSACTION_AMOUNT {
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

    if input.description.trim().is_empty() {
        return Err(Error::Validation {
            field: "description",
            message: "Description is required".to_string(),
        });
    }

    if input.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::Validation {
            field: "description",
            message: format!("Description must be at most {MAX_DESCRIPTION_LEN} characters"),
        });
    }

    if input.currency.trim().is_empty() {
        return Err(Error::Validation {
            field: "currency",
            message: "Currency cannot be empty".to_string(),
        });
    }

    Ok(())
}

/// Records a new transaction for `user_id` after validating the input.
pub async fn create_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    input: TransactionInput,
) -> Result<transaction::Model> {
    validate_transaction_input(&input)?;

    let now = Utc::now();
    let model = transaction::ActiveModel {
        user_id: Set(user_id.to_string()),
        amount: Set(input.amount),
        transaction_type: Set(input.transaction_type),
        category: Set(input.category),
        subcategory: Set(input.subcategory),
        description: Set(input.description),
        date: Set(input.date.unwrap_or(now)),
        payment_method: Set(input.payment_method),
        location: Set(input.location),
        currency: Set(input.currency),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    debug!(transaction_id = result.id, user_id, "Created transaction");
    Ok(result)
}

fn live_transaction(user_id: &str, transaction_id: i64) -> Select<Transaction> {
    Transaction::find_by_id(transaction_id)
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::IsDeleted.eq(false))
}

/// Retrieves a live transaction owned by `user_id`.
pub async fn get_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    transaction_id: i64,
) -> Result<transaction::Model> {
    live_transaction(user_id, transaction_id)
        .one(db)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })
}

/// Builds the inclusive date condition for an optional range.
#[must_use]
pub fn date_range_condition(range: &DateRange) -> Condition {
    let mut condition = Condition::all();
    if let Some(start) = range.start {
        condition = condition.add(transaction::Column::Date.gte(start));
    }
    if let Some(end) = range.end {
        condition = condition.add(transaction::Column::Date.lte(end));
    }
    condition
}

/// Condition selecting the transactions that count against `budget`.
///
/// Matches the budget's owner, expense type, the exact (case-sensitive)
/// category string, a date inside `[start_date, end_date]` inclusive, and
/// live rows only.
#[must_use]
pub fn budget_window_condition(budget: &budget::Model) -> Condition {
    Condition::all()
        .add(transaction::Column::UserId.eq(budget.user_id.as_str()))
        .add(transaction::Column::TransactionType.eq(TransactionType::Expense))
        .add(transaction::Column::Category.eq(budget.category.as_str()))
        .add(transaction::Column::Date.gte(budget.start_date))
        .add(transaction::Column::Date.lte(budget.end_date))
        .add(transaction::Column::IsDeleted.eq(false))
}

/// Retrieves the most recent transactions counting against `budget`, newest first.
pub async fn recent_budget_transactions<C>(
    db: &C,
    budget: &budget::Model,
    limit: u64,
) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(budget_window_condition(budget))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a page of live transactions matching `filter`, newest first.
///
/// `search` is a literal substring of the description or category. A page past
/// the last one comes back empty.
pub async fn list_transactions(
    db: &DatabaseConnection,
    user_id: &str,
    filter: &TransactionFilter,
) -> Result<TransactionPage> {
    let page = filter.page.max(1);
    let limit = filter.limit.max(1);

    let mut query = Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::IsDeleted.eq(false))
        .filter(date_range_condition(&filter.range));

    if let Some(transaction_type) = filter.transaction_type {
        query = query.filter(transaction::Column::TransactionType.eq(transaction_type));
    }
    if let Some(category) = &filter.category {
        query = query.filter(transaction::Column::Category.eq(category.as_str()));
    }
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(search) = search {
        // SQLite LIKE is case-insensitive for ASCII
        query = query.filter(
            Condition::any()
                .add(transaction::Column::Description.like(contains_pattern(search)))
                .add(transaction::Column::Category.like(contains_pattern(search))),
        );
    }

    let paginator = query
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .paginate(db, limit);

    let total = paginator.num_items().await?;
    let pages = total.div_ceil(limit);
    // Past the last page there is nothing to fetch; the offset could also overflow
    let transactions = if page > pages {
        Vec::new()
    } else {
        paginator.fetch_page(page - 1).await?
    };

    Ok(TransactionPage {
        transactions,
        pagination: Pagination {
            current: page,
            pages,
            total,
        },
    })
}

/// Builds a `LIKE` substring pattern that matches `%` and `_` in `search` literally.
fn contains_pattern(search: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape(LIKE_ESCAPE)
}

/// Replaces the editable fields of a live transaction owned by `user_id`.
pub async fn update_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    transaction_id: i64,
    input: TransactionInput,
) -> Result<transaction::Model> {
    validate_transaction_input(&input)?;

    let existing = get_transaction(db, user_id, transaction_id).await?;
    let date = input.date.unwrap_or(existing.date);

    let mut active_model: transaction::ActiveModel = existing.into();
    active_model.amount = Set(input.amount);
    active_model.transaction_type = Set(input.transaction_type);
    active_model.category = Set(input.category);
    active_model.subcategory = Set(input.subcategory);
    active_model.description = Set(input.description);
    active_model.date = Set(date);
    active_model.payment_method = Set(input.payment_method);
    active_model.location = Set(input.location);
    active_model.currency = Set(input.currency);
    active_model.updated_at = Set(Utc::now());

    active_model.update(db).await.map_err(Into::into)
}

/// Marks a live transaction as deleted.
///
/// This is a single conditional UPDATE, so two concurrent deletes cannot both
/// succeed: the second finds no live row and reports not found.
pub async fn soft_delete_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    transaction_id: i64,
) -> Result<()> {
    let result = Transaction::update_many()
        .col_expr(transaction::Column::IsDeleted, Expr::value(true))
        .col_expr(transaction::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(transaction::Column::Id.eq(transaction_id))
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::IsDeleted.eq(false))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::TransactionNotFound { id: transaction_id });
    }

    debug!(transaction_id, user_id, "Soft-deleted transaction");
    Ok(())
}
