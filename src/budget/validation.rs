//! Rules that a budget must satisfy before it is written.

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Amount, Error, TransactionType,
    amount::AmountError,
    auth::UserID,
    budget::domain::BudgetId,
    category::{CategoryId, resolve_category_reference},
};

/// The earliest year a budget can be set for.
pub const MIN_YEAR: i64 = 2000;
/// The latest year a budget can be set for.
pub const MAX_YEAR: i64 = 2100;

pub fn validate_month(month: i64) -> Result<u8, Error> {
    match u8::try_from(month) {
        Ok(month) if (1..=12).contains(&month) => Ok(month),
        _ => Err(Error::invalid_field(
            "month",
            "Month must be between 1 and 12.",
        )),
    }
}

pub fn validate_year(year: i64) -> Result<u16, Error> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        u16::try_from(year).map_err(|_| year_error())
    } else {
        Err(year_error())
    }
}

fn year_error() -> Error {
    Error::invalid_field(
        "year",
        format!("Year must be between {MIN_YEAR} and {MAX_YEAR}."),
    )
}

/// Validate the amount of a budget.
///
/// # Errors
///
/// Returns an [Error::InvalidField] for `amount` if it is not greater than
/// zero, has fractions of a cent or is too large.
pub fn parse_budget_amount(value: Decimal) -> Result<Amount, Error> {
    Amount::new(value).map_err(|error| match error {
        AmountError::NotPositive => {
            Error::invalid_field("amount", "Budget amount must be greater than zero.")
        }
        error => Error::invalid_field("amount", error.to_string()),
    })
}

/// Check that a budget's category, if any, is one of the user's expense categories.
pub fn validate_budget_category(
    category_id: Option<CategoryId>,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    let category = resolve_category_reference(category_id, user_id, connection)?;

    if category.category_type != TransactionType::Expense {
        return Err(Error::BudgetCategoryNotExpense);
    }

    Ok(())
}

/// Check that the user has no other budget for the same month, year and category.
///
/// `exclude` is the budget being updated, if any.
pub fn validate_unique_budget(
    user_id: UserID,
    month: u8,
    year: u16,
    category_id: Option<CategoryId>,
    exclude: Option<BudgetId>,
    connection: &Connection,
) -> Result<(), Error> {
    let exists: bool = connection.query_row(
        "SELECT EXISTS (SELECT 1 FROM budget \
            WHERE user_id = ?1 AND month = ?2 AND year = ?3 AND category_id IS ?4 \
            AND (?5 IS NULL OR id != ?5))",
        (user_id.as_i64(), month, year, category_id, exclude),
        |row| row.get(0),
    )?;

    if exists {
        Err(Error::DuplicateBudget)
    } else {
        Ok(())
    }
}
