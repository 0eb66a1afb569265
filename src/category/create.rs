//! Category creation endpoint.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    Error, TransactionType,
    app_state::{DbState, lock_connection},
    auth::UserID,
    category::{
        Category, CategoryName, NewCategory, create_category, domain::CategoryData,
        validation::validate_unique_name,
    },
    json::required,
};

/// Create a category owned by the current user.
///
/// # Errors
///
/// Returns a field error if the name or type is missing or invalid, or if the
/// user already has a category with the same name.
pub async fn create_category_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<CategoryData>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let Json(data) = payload?;
    let name = CategoryName::new(&required(data.name, "name")?)?;
    let category_type: TransactionType = required(data.category_type, "type")?.parse()?;

    let connection = lock_connection(&state.db_connection)?;
    validate_unique_name(user_id, &name, None, &connection)?;

    let category = create_category(
        NewCategory {
            name,
            category_type,
            user_id,
        },
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[cfg(test)]
mod create_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    use crate::{
        Error, TransactionType,
        app_state::DbState,
        auth::User,
        category::{domain::CategoryData, list_categories},
        test_utils::{create_test_category, create_test_user, get_test_connection, parse_json_body},
    };

    use super::create_category_endpoint;

    fn get_state_and_user() -> (DbState, User) {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "alice");

        (
            DbState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    fn category_data(name: &str, category_type: &str) -> CategoryData {
        CategoryData {
            name: Some(name.to_owned()),
            category_type: Some(category_type.to_owned()),
        }
    }

    #[tokio::test]
    async fn create_category_succeeds() {
        let (state, user) = get_state_and_user();

        let response = create_category_endpoint(
            State(state.clone()),
            Extension(user.id),
            Ok(Json(category_data("Side Hustle", "income"))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = parse_json_body(response).await;
        assert_eq!(body["name"], "Side Hustle");
        assert_eq!(body["type"], "income");
        assert_eq!(body["user"], json!(user.id.as_i64()));

        let categories =
            list_categories(user.id, None, None, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(categories.len(), 1);
    }

    #[tokio::test]
    async fn create_duplicate_category_fails() {
        let (state, user) = get_state_and_user();
        create_test_category(
            &state.db_connection.lock().unwrap(),
            &user,
            "Rent",
            TransactionType::Expense,
        );

        let response = create_category_endpoint(
            State(state),
            Extension(user.id),
            Ok(Json(category_data("Rent", "expense"))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "name": ["You already have a category with this name."] })
        );
    }

    #[tokio::test]
    async fn create_category_with_invalid_type_fails() {
        let (state, user) = get_state_and_user();

        let result = create_category_endpoint(
            State(state),
            Extension(user.id),
            Ok(Json(category_data("Rent", "transfer"))),
        )
        .await;

        assert_eq!(
            result.err(),
            Some(Error::invalid_field(
                "type",
                "\"transfer\" is not a valid choice."
            ))
        );
    }

    #[tokio::test]
    async fn create_category_without_name_fails() {
        let (state, user) = get_state_and_user();
        let data = CategoryData {
            name: None,
            category_type: Some("expense".to_owned()),
        };

        let result = create_category_endpoint(State(state), Extension(user.id), Ok(Json(data))).await;

        assert_eq!(
            result.err(),
            Some(Error::invalid_field("name", "This field is required."))
        );
    }
}
