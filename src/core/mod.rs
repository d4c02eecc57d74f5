//! Core business logic - framework-agnostic budget, transaction, reconciliation
//! and reporting operations.

/// Budget alert evaluation
pub mod alerts;
/// Budget definitions
pub mod budget;
/// Flexible date parsing for inputs and filters
pub mod dates;
/// Read-triggered recomputation of budget `spent`
pub mod reconcile;
/// Derived budget values and transaction statistics
pub mod report;
/// Transaction store
pub mod transaction;
