//! Endpoints for updating transactions.

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::{
    Error, TransactionType,
    app_state::{DbState, lock_connection},
    auth::UserID,
    json::{not_null, required},
    transaction::{
        db::{get_user_transaction, update_transaction},
        domain::{NewTransaction, Transaction, TransactionData, TransactionId},
        validation::{parse_amount, parse_date, validate_category},
    },
};

/// Validate `data` against the stored transaction and write the result.
///
/// Fields missing from a partial update keep their stored values. The
/// category is checked against the merged type, so changing only the type of
/// a transaction fails if its category is for the other type.
fn edit_transaction(
    state: &DbState,
    user_id: UserID,
    transaction_id: TransactionId,
    data: TransactionData,
    partial: bool,
) -> Result<Transaction, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let existing = get_user_transaction(transaction_id, user_id, &connection)?;

    let data = if partial {
        data
    } else {
        TransactionData {
            transaction_type: Some(required(data.transaction_type, "type")?),
            amount: Some(required(data.amount, "amount")?),
            category: Some(Some(required(not_null(data.category, "category")?, "category")?)),
            date: Some(required(data.date, "date")?),
            description: data.description,
        }
    };

    let transaction_type: TransactionType = match data.transaction_type {
        Some(raw_type) => raw_type.parse()?,
        None => existing.transaction_type,
    };
    let amount = match data.amount {
        Some(amount) => parse_amount(amount)?,
        None => existing.amount,
    };
    let category_id = not_null(data.category, "category")?.unwrap_or(existing.category);
    let date = match data.date {
        Some(raw_date) => parse_date(&raw_date, "date")?,
        None => existing.date,
    };
    let description = data.description.unwrap_or(existing.description);

    validate_category(category_id, user_id, transaction_type, &connection)?;

    update_transaction(
        transaction_id,
        NewTransaction {
            user_id,
            transaction_type,
            amount,
            category_id,
            date,
            description,
        },
        &connection,
    )
}

/// Replace the fields of one of the current user's transactions.
///
/// A missing description keeps its stored value.
pub async fn update_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<TransactionData>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let Path(transaction_id) = path?;
    let Json(data) = payload?;

    edit_transaction(&state, user_id, transaction_id, data, false).map(Json)
}

/// Update only the given fields of one of the current user's transactions.
pub async fn patch_transaction_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<TransactionData>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let Path(transaction_id) = path?;
    let Json(data) = payload?;

    edit_transaction(&state, user_id, transaction_id, data, true).map(Json)
}

#[cfg(test)]
mod edit_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, State},
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error, TransactionType,
        app_state::DbState,
        auth::User,
        category::Category,
        test_utils::{create_test_category, create_test_user, get_test_connection},
        transaction::{
            create_transaction,
            domain::{NewTransaction, Transaction, TransactionData},
            validation::parse_amount,
        },
    };

    use super::{patch_transaction_endpoint, update_transaction_endpoint};

    struct Fixture {
        state: DbState,
        alice: User,
        bob: User,
        rent: Category,
        salary: Category,
        transaction: Transaction,
    }

    fn get_fixture() -> Fixture {
        let connection = get_test_connection();
        let alice = create_test_user(&connection, "alice");
        let bob = create_test_user(&connection, "bob");
        let groceries =
            create_test_category(&connection, &alice, "Groceries", TransactionType::Expense);
        let rent = create_test_category(&connection, &alice, "Rent", TransactionType::Expense);
        let salary = create_test_category(&connection, &alice, "Salary", TransactionType::Income);
        let transaction = create_transaction(
            NewTransaction {
                user_id: alice.id,
                transaction_type: TransactionType::Expense,
                amount: parse_amount(dec!(25.00)).unwrap(),
                category_id: groceries.id,
                date: date!(2024 - 05 - 01),
                description: Some("Market".to_owned()),
            },
            &connection,
        )
        .unwrap();

        Fixture {
            state: DbState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            alice,
            bob,
            rent,
            salary,
            transaction,
        }
    }

    #[tokio::test]
    async fn patch_changes_only_given_fields() {
        let fixture = get_fixture();

        let Json(updated) = patch_transaction_endpoint(
            State(fixture.state),
            Extension(fixture.alice.id),
            Ok(Path(fixture.transaction.id)),
            Ok(Json(TransactionData {
                amount: Some(dec!(30.10)),
                ..Default::default()
            })),
        )
        .await
        .unwrap();

        assert_eq!(updated.amount.cents(), 3010);
        assert_eq!(updated.category, fixture.transaction.category);
        assert_eq!(updated.description.as_deref(), Some("Market"));
        assert_eq!(updated.created_at, fixture.transaction.created_at);
    }

    #[tokio::test]
    async fn patch_with_huge_amount_is_a_field_error() {
        let fixture = get_fixture();

        let result = patch_transaction_endpoint(
            State(fixture.state.clone()),
            Extension(fixture.alice.id),
            Ok(Path(fixture.transaction.id)),
            Ok(Json(TransactionData {
                amount: Some(Decimal::MAX),
                ..Default::default()
            })),
        )
        .await;

        assert_eq!(
            result.err(),
            Some(Error::invalid_field(
                "amount",
                "Ensure that there are no more than 10 digits in total."
            ))
        );
        assert!(fixture.state.db_connection.lock().is_ok());
    }

    #[tokio::test]
    async fn patch_null_category_is_rejected() {
        let fixture = get_fixture();

        let result = patch_transaction_endpoint(
            State(fixture.state),
            Extension(fixture.alice.id),
            Ok(Path(fixture.transaction.id)),
            Ok(Json(TransactionData {
                category: Some(None),
                ..Default::default()
            })),
        )
        .await;

        assert_eq!(
            result.err(),
            Some(Error::invalid_field("category", "This field may not be null."))
        );
    }

    #[tokio::test]
    async fn patch_can_clear_description() {
        let fixture = get_fixture();

        let Json(updated) = patch_transaction_endpoint(
            State(fixture.state),
            Extension(fixture.alice.id),
            Ok(Path(fixture.transaction.id)),
            Ok(Json(TransactionData {
                description: Some(None),
                ..Default::default()
            })),
        )
        .await
        .unwrap();

        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn patch_type_without_matching_category_fails() {
        let fixture = get_fixture();

        let result = patch_transaction_endpoint(
            State(fixture.state),
            Extension(fixture.alice.id),
            Ok(Path(fixture.transaction.id)),
            Ok(Json(TransactionData {
                transaction_type: Some("income".to_owned()),
                ..Default::default()
            })),
        )
        .await;

        assert_eq!(
            result.err(),
            Some(Error::CategoryTypeMismatch {
                category_type: TransactionType::Expense,
                transaction_type: TransactionType::Income,
            })
        );
    }

    #[tokio::test]
    async fn put_replaces_all_fields() {
        let fixture = get_fixture();

        let Json(updated) = update_transaction_endpoint(
            State(fixture.state),
            Extension(fixture.alice.id),
            Ok(Path(fixture.transaction.id)),
            Ok(Json(TransactionData {
                transaction_type: Some("income".to_owned()),
                amount: Some(dec!(1000)),
                category: Some(Some(fixture.salary.id)),
                date: Some("2024-05-31".to_owned()),
                description: None,
            })),
        )
        .await
        .unwrap();

        assert_eq!(updated.transaction_type, TransactionType::Income);
        assert_eq!(updated.category_name.as_ref(), "Salary");
        assert_eq!(updated.date, date!(2024 - 05 - 31));
    }

    #[tokio::test]
    async fn put_requires_amount() {
        let fixture = get_fixture();

        let result = update_transaction_endpoint(
            State(fixture.state),
            Extension(fixture.alice.id),
            Ok(Path(fixture.transaction.id)),
            Ok(Json(TransactionData {
                transaction_type: Some("expense".to_owned()),
                amount: None,
                category: Some(Some(fixture.rent.id)),
                date: Some("2024-05-31".to_owned()),
                description: None,
            })),
        )
        .await;

        assert_eq!(
            result.err(),
            Some(Error::invalid_field("amount", "This field is required."))
        );
    }

    #[tokio::test]
    async fn other_user_cannot_edit() {
        let fixture = get_fixture();

        let result = patch_transaction_endpoint(
            State(fixture.state),
            Extension(fixture.bob.id),
            Ok(Path(fixture.transaction.id)),
            Ok(Json(TransactionData::default())),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
