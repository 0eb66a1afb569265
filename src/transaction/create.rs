//! Transaction creation endpoint.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    Error, TransactionType,
    app_state::{DbState, lock_connection},
    auth::UserID,
    json::{not_null, required},
    transaction::{
        create_transaction,
        domain::{NewTransaction, Transaction, TransactionData},
        validation::{parse_amount, parse_date, validate_category},
    },
};

/// Create a transaction owned by the current user.
///
/// # Errors
///
/// Returns a field error if a field is missing or invalid, or if the category
/// belongs to another user or is for the other transaction type.
pub async fn create_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<TransactionData>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let Json(data) = payload?;

    let transaction_type: TransactionType = required(data.transaction_type, "type")?.parse()?;
    let amount = parse_amount(required(data.amount, "amount")?)?;
    let category_id = required(not_null(data.category, "category")?, "category")?;
    let date = parse_date(&required(data.date, "date")?, "date")?;
    let description = data.description.flatten();

    let connection = lock_connection(&state.db_connection)?;
    validate_category(category_id, user_id, transaction_type, &connection)?;

    let transaction = create_transaction(
        NewTransaction {
            user_id,
            transaction_type,
            amount,
            category_id,
            date,
            description,
        },
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
