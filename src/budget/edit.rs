//! Endpoints for updating budgets.

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::{
    Error,
    app_state::{DbState, lock_connection},
    auth::UserID,
    budget::{
        db::{get_user_budget, update_budget, with_progress},
        domain::{BudgetData, BudgetId, BudgetResponse, NewBudget},
        validation::{
            parse_budget_amount, validate_budget_category, validate_month, validate_unique_budget,
            validate_year,
        },
    },
    json::required,
};

fn edit_budget(
    state: &DbState,
    user_id: UserID,
    budget_id: BudgetId,
    data: BudgetData,
    partial: bool,
) -> Result<BudgetResponse, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let existing = get_user_budget(budget_id, user_id, &connection)?;

    let data = if partial {
        data
    } else {
        BudgetData {
            month: Some(required(data.month, "month")?),
            year: Some(required(data.year, "year")?),
            amount: Some(required(data.amount, "amount")?),
            // A full update without a category makes an overall budget.
            category: Some(data.category.flatten()),
        }
    };

    let month = match data.month {
        Some(month) => validate_month(month)?,
        None => existing.month,
    };
    let year = match data.year {
        Some(year) => validate_year(year)?,
        None => existing.year,
    };
    let amount = match data.amount {
        Some(amount) => parse_budget_amount(amount)?,
        None => existing.amount,
    };
    let category_id = data.category.unwrap_or(existing.category);

    validate_budget_category(category_id, user_id, &connection)?;
    validate_unique_budget(
        user_id,
        month,
        year,
        category_id,
        Some(budget_id),
        &connection,
    )?;

    let budget = update_budget(
        budget_id,
        NewBudget {
            user_id,
            month,
            year,
            amount,
            category_id,
        },
        &connection,
    )?;

    with_progress(budget, &connection)
}

/// Replace the fields of one of the current user's budgets.
pub async fn update_budget_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<BudgetId>, PathRejection>,
    payload: Result<Json<BudgetData>, JsonRejection>,
) -> Result<Json<BudgetResponse>, Error> {
    let Path(budget_id) = path?;
    let Json(data) = payload?;

    edit_budget(&state, user_id, budget_id, data, false).map(Json)
}

/// Update only the given fields of one of the current user's budgets.
pub async fn patch_budget_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<BudgetId>, PathRejection>,
    payload: Result<Json<BudgetData>, JsonRejection>,
) -> Result<Json<BudgetResponse>, Error> {
    let Path(budget_id) = path?;
    let Json(data) = payload?;

    edit_budget(&state, user_id, budget_id, data, true).map(Json)
}
