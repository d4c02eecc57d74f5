//! Database configuration module for the budget tracker.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. Creation is
//! idempotent, which lets the server call it on every startup.

use crate::entities::{Budget, BudgetColumn, Transaction, TransactionColumn};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Fallback used when neither `DATABASE_URL` nor config.toml provide a URL.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/budget_tracker.sqlite?mode=rwc";

/// Gets the database URL from the environment, then the configured value, then the default.
///
/// `DATABASE_URL` always wins so deployments can override config.toml.
#[must_use]
pub fn get_database_url(configured: Option<&str>) -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        configured
            .unwrap_or(DEFAULT_DATABASE_URL)
            .to_string()
    })
}

/// Establishes a connection to the database at `database_url`.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    ensure_sqlite_dir(database_url)?;
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the parent directory of a file-backed `SQLite` URL.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or(rest);
    let parent = Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Creates all tables and indexes if they do not exist yet.
///
/// The composite index on transactions covers the reconciliation filter
/// (owner, category, date) so summing a budget window stays an index range scan.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut transaction_table = schema.create_table_from_entity(Transaction);
    transaction_table.if_not_exists();
    let mut budget_table = schema.create_table_from_entity(Budget);
    budget_table.if_not_exists();

    db.execute(builder.build(&transaction_table)).await?;
    db.execute(builder.build(&budget_table)).await?;

    let transaction_window_index = Index::create()
        .if_not_exists()
        .name("idx_transactions_owner_category_date")
        .table(Transaction)
        .col(TransactionColumn::UserId)
        .col(TransactionColumn::Category)
        .col(TransactionColumn::Date)
        .to_owned();
    let budget_owner_index = Index::create()
        .if_not_exists()
        .name("idx_budgets_owner")
        .table(Budget)
        .col(BudgetColumn::UserId)
        .to_owned();

    db.execute(builder.build(&transaction_window_index)).await?;
    db.execute(builder.build(&budget_owner_index)).await?;

    info!("Database tables ready");
    Ok(())
}
