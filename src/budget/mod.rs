//! Monthly budgets and how much of them has been spent.
//!
//! A budget sets a spending limit for one calendar month, either for a
//! single expense category or, without a category, for all expenses.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;
mod progress;
mod validation;

pub use create::create_budget_endpoint;
pub use db::{create_budget, create_budget_table};
pub use delete::delete_budget_endpoint;
pub use domain::{Budget, BudgetId, BudgetResponse, NewBudget};
pub use edit::{patch_budget_endpoint, update_budget_endpoint};
pub use list::{current_month_budgets_endpoint, get_budget_endpoint, list_budgets_endpoint};
pub use progress::{BudgetProgress, budget_period, compute_progress};
