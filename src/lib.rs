//! Fintrack is a backend for tracking personal finances.
//!
//! Users record income and expense transactions against categories and set
//! monthly budgets that are compared against what they actually spent.
//!
//! This library provides a REST API that serves JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::{Map, Value, json};
use tokio::signal;

mod amount;
mod app_state;
mod auth;
mod budget;
mod category;
mod database_id;
mod db;
pub mod endpoints;
mod json;
mod logging;
mod ordering;
mod pagination;
mod routing;
mod timezone;
mod transaction;
mod transaction_type;

#[cfg(test)]
mod test_utils;

pub use amount::Amount;
pub use app_state::AppState;
pub use auth::{
    NewUser, PasswordHash, User, UserID, Username, ValidatedPassword, create_user,
    get_user_by_username, update_password,
};
pub use budget::{NewBudget, create_budget};
pub use category::{Category, seed_default_categories};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{NewTransaction, create_transaction};
pub use transaction_type::TransactionType;

use crate::category::CategoryId;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// Every variant maps onto an HTTP status and a JSON body in the
/// [IntoResponse] implementation. Field errors are keyed by the name of the
/// offending field so that clients can show them next to the matching input.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A single field of the request failed validation.
    #[error("invalid {field}: {message}")]
    InvalidField {
        /// The name of the field as it appears in the request.
        field: &'static str,
        /// A message describing how to fix the value.
        message: String,
    },

    /// The username or password was not included in a registration request.
    #[error("username and password are required")]
    MissingCredentials,

    /// The username or password was not included in a log-in request.
    #[error("username and password must both be provided to log in")]
    IncompleteLogIn,

    /// The password given at registration is shorter than
    /// [auth::MIN_PASSWORD_LENGTH] characters.
    #[error("password is too short")]
    PasswordTooShort,

    /// Another user already registered this username.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// The username does not exist or the password does not match.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request to a protected route did not include an auth token.
    #[error("authentication credentials were not provided")]
    MissingToken,

    /// The auth token is malformed or does not belong to any user.
    #[error("invalid auth token")]
    InvalidToken,

    /// Tried to log out a user that has no token.
    #[error("the user does not have an active session")]
    NoActiveSession,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The user already has a category with this name.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category referenced by a transaction or budget belongs to another user.
    #[error("the category {0} belongs to another user")]
    CategoryNotOwned(CategoryId),

    /// The category of a transaction is for a different transaction type.
    #[error("the category is for {category_type} but the transaction is {transaction_type}")]
    CategoryTypeMismatch {
        /// The type of the referenced category.
        category_type: TransactionType,
        /// The type requested for the transaction.
        transaction_type: TransactionType,
    },

    /// Budgets may only reference expense categories.
    #[error("budgets can only be set for expense categories")]
    BudgetCategoryNotExpense,

    /// The type of a category cannot change while transactions reference it.
    #[error("cannot change the type of a category that has transactions")]
    CategoryTypeLocked,

    /// The user already has a budget for the month, year and category.
    #[error("a budget for this month, year and category already exists")]
    DuplicateBudget,

    /// The category cannot be deleted while transactions reference it.
    #[error("the category is used by {0} transaction(s)")]
    CategoryInUse(u64),

    /// The requested resource was not found.
    ///
    /// Resources owned by other users are reported as not found too.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The requested page is past the last page of results.
    #[error("invalid page")]
    InvalidPage,

    /// The request body or query string could not be parsed.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl Error {
    /// Shorthand for creating an [Error::InvalidField].
    pub(crate) fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Could not parse path parameter: {}", rejection.body_text());
        Error::NotFound
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::MalformedRequest(rejection.body_text())
    }
}

/// Build a JSON object of the form `{"<field>": ["<message>"]}`.
fn field_error_body(field: &str, message: String) -> Value {
    let mut body = Map::new();
    body.insert(field.to_owned(), json!([message]));

    Value::Object(body)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::InvalidField { field, message } => {
                (StatusCode::BAD_REQUEST, field_error_body(field, message))
            }
            Error::MissingCredentials => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Username and password are required" }),
            ),
            Error::IncompleteLogIn => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Please provide both username and password" }),
            ),
            Error::PasswordTooShort => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!(
                    "Password must be at least {} characters",
                    auth::MIN_PASSWORD_LENGTH
                ) }),
            ),
            Error::DuplicateUsername(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Username already exists" }),
            ),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid credentials" }),
            ),
            Error::MissingToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "detail": "Authentication credentials were not provided." }),
            ),
            Error::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "detail": "Invalid token." }),
            ),
            Error::NoActiveSession => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "No active session to log out." }),
            ),
            Error::DuplicateCategoryName(_) => (
                StatusCode::BAD_REQUEST,
                field_error_body(
                    "name",
                    "You already have a category with this name.".to_owned(),
                ),
            ),
            Error::CategoryNotOwned(_) => (
                StatusCode::BAD_REQUEST,
                field_error_body("category", "Invalid category selection.".to_owned()),
            ),
            Error::CategoryTypeMismatch {
                category_type,
                transaction_type,
            } => (
                StatusCode::BAD_REQUEST,
                field_error_body(
                    "category",
                    format!(
                        "Selected category is for {category_type}, but transaction type is {transaction_type}."
                    ),
                ),
            ),
            Error::BudgetCategoryNotExpense => (
                StatusCode::BAD_REQUEST,
                field_error_body(
                    "category",
                    "Budget can only be set for expense categories.".to_owned(),
                ),
            ),
            Error::CategoryTypeLocked => (
                StatusCode::BAD_REQUEST,
                field_error_body(
                    "type",
                    "Cannot change the type of a category that is used by transactions."
                        .to_owned(),
                ),
            ),
            Error::DuplicateBudget => (
                StatusCode::BAD_REQUEST,
                field_error_body(
                    "non_field_errors",
                    "The fields user, month, year, category must make a unique set.".to_owned(),
                ),
            ),
            Error::CategoryInUse(count) => (
                StatusCode::CONFLICT,
                json!({ "detail": format!(
                    "Cannot delete this category because {count} transaction(s) use it."
                ) }),
            ),
            Error::NotFound => (StatusCode::NOT_FOUND, json!({ "detail": "Not found." })),
            Error::InvalidPage => (StatusCode::NOT_FOUND, json!({ "detail": "Invalid page." })),
            Error::MalformedRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "detail": message }))
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An unexpected error occurred." }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
