//! Category deletion endpoint.

use axum::{
    Extension,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};

use crate::{
    Error,
    app_state::{DbState, lock_connection},
    auth::UserID,
    category::{CategoryId, db::delete_category},
};

/// Delete one of the current user's categories and the budgets that use it.
///
/// Categories that transactions still use cannot be deleted.
pub async fn delete_category_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<CategoryId>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(category_id) = path?;
    let connection = lock_connection(&state.db_connection)?;

    delete_category(category_id, user_id, &connection)?;
    tracing::info!("User {user_id} deleted category {category_id}");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use serde_json::json;

    use crate::{
        Error, TransactionType,
        app_state::DbState,
        category::get_category,
        test_utils::{create_test_category, create_test_user, get_test_connection, parse_json_body},
    };

    use super::delete_category_endpoint;

    #[tokio::test]
    async fn delete_category_endpoint_succeeds() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "alice");
        let category = create_test_category(&connection, &user, "Rent", TransactionType::Expense);
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let status = delete_category_endpoint(
            State(state.clone()),
            Extension(user.id),
            Ok(Path(category.id)),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(
            get_category(category.id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_used_category_is_a_conflict() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "alice");
        let category = create_test_category(&connection, &user, "Rent", TransactionType::Expense);
        connection
            .execute(
                "INSERT INTO \"transaction\" (user_id, type, amount_cents, category_id, date, created_at, updated_at)
                VALUES (?1, 'expense', 1000, ?2, '2024-01-01', '2024-01-01 00:00:00.0 +00:00:00', '2024-01-01 00:00:00.0 +00:00:00')",
                (user.id.as_i64(), category.id),
            )
            .unwrap();
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response =
            delete_category_endpoint(State(state), Extension(user.id), Ok(Path(category.id)))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "detail": "Cannot delete this category because 1 transaction(s) use it." })
        );
    }

    #[tokio::test]
    async fn delete_other_users_category_is_not_found() {
        let connection = get_test_connection();
        let alice = create_test_user(&connection, "alice");
        let bob = create_test_user(&connection, "bob");
        let category = create_test_category(&connection, &alice, "Rent", TransactionType::Expense);
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result =
            delete_category_endpoint(State(state), Extension(bob.id), Ok(Path(category.id))).await;

        assert_eq!(result, Err(Error::NotFound));
    }

    #[tokio::test]
    async fn delete_other_users_used_category_is_not_found() {
        let connection = get_test_connection();
        let alice = create_test_user(&connection, "alice");
        let bob = create_test_user(&connection, "bob");
        let category = create_test_category(&connection, &alice, "Rent", TransactionType::Expense);
        connection
            .execute(
                "INSERT INTO \"transaction\" (user_id, type, amount_cents, category_id, date, created_at, updated_at)
                VALUES (?1, 'expense', 1000, ?2, '2024-01-01', '2024-01-01 00:00:00.0 +00:00:00', '2024-01-01 00:00:00.0 +00:00:00')",
                (alice.id.as_i64(), category.id),
            )
            .unwrap();
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response =
            delete_category_endpoint(State(state), Extension(bob.id), Ok(Path(category.id)))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
