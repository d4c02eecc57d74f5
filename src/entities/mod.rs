//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use budget::{
    BudgetPeriod, Column as BudgetColumn, Entity as Budget, Model as BudgetModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    PaymentMethod, TransactionType,
};
