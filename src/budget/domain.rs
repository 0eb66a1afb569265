//! Budget domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Amount,
    auth::UserID,
    budget::progress::BudgetProgress,
    category::{CategoryId, CategoryName},
    database_id::DatabaseId,
    json::{deserialize_some, rfc3339},
};

/// Database identifier for a budget.
pub type BudgetId = DatabaseId;

/// A spending limit for one month, as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub id: BudgetId,
    /// The owner of the budget.
    #[serde(rename = "user")]
    pub user_id: UserID,
    /// The month of the year, 1 to 12.
    pub month: u8,
    pub year: u16,
    pub amount: Amount,
    /// The expense category the budget is for, `None` for an overall budget.
    pub category: Option<CategoryId>,
    pub category_name: Option<CategoryName>,
    #[serde(serialize_with = "rfc3339::serialize")]
    pub created_at: OffsetDateTime,
    #[serde(serialize_with = "rfc3339::serialize")]
    pub updated_at: OffsetDateTime,
}

/// A budget along with what has been spent against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetResponse {
    #[serde(flatten)]
    pub budget: Budget,
    #[serde(flatten)]
    pub progress: BudgetProgress,
}

/// The validated data needed to insert or replace a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The owner of the budget.
    pub user_id: UserID,
    /// The month of the year, 1 to 12.
    pub month: u8,
    /// The year, 2000 to 2100.
    pub year: u16,
    /// The spending limit for the month.
    pub amount: Amount,
    /// An expense category of the owner, `None` for an overall budget.
    pub category_id: Option<CategoryId>,
}

/// The body of create, update and partial update requests for budgets.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BudgetData {
    #[serde(default)]
    pub month: Option<i64>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// `Some(None)` makes the budget an overall budget.
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<CategoryId>>,
}
