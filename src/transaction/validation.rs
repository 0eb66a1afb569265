//! Rules that a transaction must satisfy before it is written.

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Amount, Error, TransactionType,
    amount::AmountError,
    auth::UserID,
    category::{CategoryId, resolve_category_reference},
    json::iso_date,
};

/// Validate the amount of a transaction.
///
/// # Errors
///
/// Returns an [Error::InvalidField] for `amount` if it is not greater than
/// zero, has fractions of a cent or is too large.
pub fn parse_amount(value: Decimal) -> Result<Amount, Error> {
    Amount::new(value).map_err(|error| match error {
        AmountError::NotPositive => {
            Error::invalid_field("amount", "Amount must be greater than zero.")
        }
        error => Error::invalid_field("amount", error.to_string()),
    })
}

/// Parse a `YYYY-MM-DD` date from a request body.
pub fn parse_date(raw_date: &str, field: &'static str) -> Result<Date, Error> {
    iso_date::parse(raw_date).map_err(|_| {
        Error::invalid_field(
            field,
            "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
        )
    })
}

/// Check that the category exists, belongs to `user_id` and is for `transaction_type`.
///
/// # Errors
///
/// Returns an error if the category does not exist, belongs to another user
/// or is for the other transaction type.
pub fn validate_category(
    category_id: CategoryId,
    user_id: UserID,
    transaction_type: TransactionType,
    connection: &Connection,
) -> Result<(), Error> {
    let category = resolve_category_reference(category_id, user_id, connection)?;

    if category.category_type != transaction_type {
        return Err(Error::CategoryTypeMismatch {
            category_type: category.category_type,
            transaction_type,
        });
    }

    Ok(())
}
