//! Endpoints for reading categories.

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use serde::Deserialize;

use crate::{
    Error, TransactionType,
    app_state::{DbState, lock_connection},
    auth::UserID,
    category::{Category, CategoryId, get_user_category, list_categories},
};

/// The query parameters for listing categories.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    /// Only include categories of this type.
    #[serde(default, rename = "type")]
    pub category_type: Option<String>,
    /// The raw ordering, e.g. "-created_at".
    #[serde(default)]
    pub ordering: Option<String>,
}

/// Parse the value of a `type` filter.
///
/// An empty value means no filter.
pub(crate) fn parse_type_filter(raw: Option<&str>) -> Result<Option<TransactionType>, Error> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            Error::invalid_field(
                "type",
                format!("Select a valid choice. {raw} is not one of the available choices."),
            )
        }),
    }
}

/// Parse the value of a `category` filter on transactions or budgets.
///
/// An empty value means no filter. A well-formed ID of a category the user
/// does not have simply matches nothing.
pub(crate) fn parse_category_filter(raw: Option<&str>) -> Result<Option<CategoryId>, Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            Error::invalid_field(
                "category",
                "Select a valid choice. That choice is not one of the available choices.",
            )
        }),
    }
}

/// List the current user's categories.
pub async fn list_categories_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<Vec<Category>>, Error> {
    let Query(query) = query?;
    let category_type = parse_type_filter(query.category_type.as_deref())?;

    let connection = lock_connection(&state.db_connection)?;
    let categories = list_categories(
        user_id,
        category_type,
        query.ordering.as_deref(),
        &connection,
    )?;

    Ok(Json(categories))
}

/// Get one of the current user's categories.
pub async fn get_category_endpoint(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<CategoryId>, PathRejection>,
) -> Result<Json<Category>, Error> {
    let Path(category_id) = path?;
    let connection = lock_connection(&state.db_connection)?;

    get_user_category(category_id, user_id, &connection).map(Json)
}
