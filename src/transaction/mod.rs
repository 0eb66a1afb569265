//! Transactions record money that a user earned or spent.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the data needed to create one
//! - Database functions for storing, filtering and paging transactions
//! - The aggregation engine behind the financial summary
//! - The REST endpoints for transactions

mod aggregation;
mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;
mod summary;
mod validation;

pub use aggregation::{CategoryTotal, DateRange, FinancialSummary, MonthlyTotal, summarize};
pub use create::create_transaction_endpoint;
pub use db::{
    create_transaction, create_transaction_table, get_user_transaction, total_expenses_between,
};
pub use delete::delete_transaction_endpoint;
pub use domain::{NewTransaction, Transaction, TransactionId};
pub use edit::{patch_transaction_endpoint, update_transaction_endpoint};
pub use list::{get_transaction_endpoint, list_transactions_endpoint};
pub use summary::get_summary_endpoint;
