//! Budget deletion endpoint.

use axum::{
    Extension,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};

use crate::{
    Error,
    app_state::{DbState, lock_connection},
    auth::UserID,
    budget::{db::delete_budget, domain::BudgetId},
};

/// Delete one of the current user's budgets.
pub async fn delete_budget_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<BudgetId>, PathRejection>,
) -> Result<StatusCode, Error> {
    let Path(budget_id) = path?;
    let connection = lock_connection(&state.db_connection)?;

    delete_budget(budget_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
