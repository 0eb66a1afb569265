//! Endpoints for updating categories.

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
    category::{
        Category, CategoryId, CategoryName,
        db::update_category,
        domain::CategoryData,
        get_user_category,
        validation::{validate_type_change, validate_unique_name},
    },
    json::required,
};

fn edit_category(
    state: &DbState,
    user_id: UserID,
    category_id: CategoryId,
    data: CategoryData,
    partial: bool,
) -> Result<Category, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let existing = get_user_category(category_id, user_id, &connection)?;

    let (raw_name, raw_type) = if partial {
        (data.name, data.category_type)
    } else {
        (
            Some(required(data.name, "name")?),
            Some(required(data.category_type, "type")?),
        )
    };

    let name = match raw_name {
        Some(name) => CategoryName::new(&name)?,
        None => existing.name.clone(),
    };
    let category_type: TransactionType = match raw_type {
        Some(category_type) => category_type.parse()?,
        None => existing.category_type,
    };

    validate_unique_name(user_id, &name, Some(category_id), &connection)?;
    validate_type_change(&existing, category_type, &connection)?;

    update_category(category_id, user_id, name, category_type, &connection)
}

/// Replace the name and type of one of the current user's categories.
pub async fn update_category_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<CategoryId>, PathRejection>,
    payload: Result<Json<CategoryData>, JsonRejection>,
) -> Result<Json<Category>, Error> {
    let Path(category_id) = path?;
    let Json(data) = payload?;

    edit_category(&state, user_id, category_id, data, false).map(Json)
}

/// Update only the given fields of one of the current user's categories.
pub async fn patch_category_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<CategoryId>, PathRejection>,
    payload: Result<Json<CategoryData>, JsonRejection>,
) -> Result<Json<Category>, Error> {
    let Path(category_id) = path?;
    let Json(data) = payload?;

    edit_category(&state, user_id, category_id, data, true).map(Json)
}
