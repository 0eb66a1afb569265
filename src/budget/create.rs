//! Budget creation endpoint.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    Error,
    app_state::{DbState, lock_connection},
    auth::UserID,
    budget::{
        create_budget,
        db::with_progress,
        domain::{BudgetData, BudgetResponse, NewBudget},
        validation::{
            parse_budget_amount, validate_budget_category, validate_month, validate_unique_budget,
            validate_year,
        },
    },
    json::required,
};

/// Create a budget owned by the current user.
///
/// Leaving out the category, or setting it to `null`, creates an overall budget.
pub async fn create_budget_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<BudgetData>, JsonRejection>,
) -> Result<(StatusCode, Json<BudgetResponse>), Error> {
    let Json(data) = payload?;

    let month = validate_month(required(data.month, "month")?)?;
    let year = validate_year(required(data.year, "year")?)?;
    let amount = parse_budget_amount(required(data.amount, "amount")?)?;
    let category_id = data.category.flatten();

    let connection = lock_connection(&state.db_connection)?;
    validate_budget_category(category_id, user_id, &connection)?;
    validate_unique_budget(user_id, month, year, category_id, None, &connection)?;

    let budget = create_budget(
        NewBudget {
            user_id,
            month,
            year,
            amount,
            category_id,
        },
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(with_progress(budget, &connection)?)))
}

#[cfg(test)]
mod create_budget_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::{
        Error, TransactionType,
        app_state::DbState,
        auth::User,
        budget::domain::BudgetData,
        category::Category,
        test_utils::{create_test_category, create_test_user, get_test_connection, parse_json_body},
    };

    use super::create_budget_endpoint;

    fn get_state_user_and_categories() -> (DbState, User, Category, Category) {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "alice");
        let rent = create_test_category(&connection, &user, "Rent", TransactionType::Expense);
        let salary = create_test_category(&connection, &user, "Salary", TransactionType::Income);

        (
            DbState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
            rent,
            salary,
        )
    }

    fn budget_data(category: Option<&Category>) -> BudgetData {
        BudgetData {
            month: Some(1),
            year: Some(2024),
            amount: Some(dec!(1000)),
            category: Some(category.map(|category| category.id)),
        }
    }

    #[tokio::test]
    async fn create_budget_succeeds() {
        let (state, user, rent, _) = get_state_user_and_categories();

        let response = create_budget_endpoint(
            State(state),
            Extension(user.id),
            Ok(Json(budget_data(Some(&rent)))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = parse_json_body(response).await;
        assert_eq!(body["amount"], "1000.00");
        assert_eq!(body["category"], json!(rent.id));
        assert_eq!(body["category_name"], "Rent");
        assert_eq!(body["actual_expenses"], json!(0.0));
        assert_eq!(body["remaining"], json!(1000.0));
        assert_eq!(body["percentage_used"], json!(0.0));
    }

    #[tokio::test]
    async fn income_category_is_rejected() {
        let (state, user, _, salary) = get_state_user_and_categories();

        let response = create_budget_endpoint(
            State(state),
            Extension(user.id),
            Ok(Json(budget_data(Some(&salary)))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "category": ["Budget can only be set for expense categories."] })
        );
    }

    #[tokio::test]
    async fn month_out_of_range_is_rejected() {
        let (state, user, _, _) = get_state_user_and_categories();
        let data = BudgetData {
            month: Some(13),
            ..budget_data(None)
        };

        let result = create_budget_endpoint(State(state), Extension(user.id), Ok(Json(data))).await;

        assert_eq!(
            result.err(),
            Some(Error::invalid_field(
                "month",
                "Month must be between 1 and 12."
            ))
        );
    }

    #[tokio::test]
    async fn second_overall_budget_for_month_is_rejected() {
        let (state, user, _, _) = get_state_user_and_categories();
        create_budget_endpoint(
            State(state.clone()),
            Extension(user.id),
            Ok(Json(budget_data(None))),
        )
        .await
        .unwrap();

        let response = create_budget_endpoint(
            State(state),
            Extension(user.id),
            Ok(Json(BudgetData {
                category: None,
                ..budget_data(None)
            })),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "non_field_errors": ["The fields user, month, year, category must make a unique set."] })
        );
    }
}
