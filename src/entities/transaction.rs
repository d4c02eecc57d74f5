//! Transaction entity - Represents a single money movement owned by one user.
//!
//! Transactions are never removed by the application; deletion sets `is_deleted`
//! and every query in `core` filters on that flag.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a money movement
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out; the only type counted against budgets
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// How the transaction was paid
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash
    #[default]
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Debit or credit card
    #[sea_orm(string_value = "card")]
    Card,
    /// Bank transfer
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Digital wallet
    #[sea_orm(string_value = "digital_wallet")]
    DigitalWallet,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the transaction
    pub user_id: String,
    /// Always positive; direction comes from `transaction_type`
    pub amount: f64,
    /// Income or expense
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Free-form category, stored exactly as submitted
    pub category: String,
    /// Optional finer-grained category
    pub subcategory: String,
    /// Human-readable description
    pub description: String,
    /// When the money moved
    pub date: DateTimeUtc,
    /// How it was paid
    pub payment_method: PaymentMethod,
    /// Free-form location
    pub location: String,
    /// ISO currency code
    pub currency: String,
    /// Soft delete flag - if true, the transaction is ignored everywhere
    pub is_deleted: bool,
    /// When the row was inserted
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Transactions are linked to budgets by category, not by foreign key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
