//! Unified error types for the budget tracker.
//!
//! Storage failures bubble up unchanged as [`Error::Database`]; everything else
//! is either a rejected input or a missing record scoped to the requesting owner.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Every failure the library can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any failure reported by the storage layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A required field is missing or malformed
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending input field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// Amount is non-finite or below the allowed minimum
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Budget window does not end after it starts
    #[error("End date {end} must be after start date {start}")]
    InvalidDateRange {
        /// Window start
        start: DateTime<Utc>,
        /// Window end
        end: DateTime<Utc>,
    },

    /// Budget does not exist or belongs to another owner
    #[error("Budget not found: {id}")]
    BudgetNotFound {
        /// Requested budget id
        id: i64,
    },

    /// Transaction does not exist, is soft-deleted, or belongs to another owner
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Requested transaction id
        id: i64,
    },

    /// I/O failure (config file, socket binding)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the requested record does not exist for the caller.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BudgetNotFound { .. } | Self::TransactionNotFound { .. }
        )
    }

    /// True for errors caused by the caller's input rather than the system.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidAmount { .. }
                | Self::InvalidDateRange { .. }
                | Self::BudgetNotFound { .. }
                | Self::TransactionNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
