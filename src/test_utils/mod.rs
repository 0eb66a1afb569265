#![allow(missing_docs)]

use axum::{
    body::Body,
    http::{HeaderValue, Response},
};
use rusqlite::Connection;
use serde_json::Value;

use crate::{
    AppState, PaginationConfig, TransactionType,
    auth::{NewUser, PasswordHash, User, Username, create_user},
    category::{Category, CategoryName, NewCategory, create_category},
    db::initialize,
};

/// The bcrypt cost used in tests, the lowest bcrypt allows.
pub(crate) const TEST_PASSWORD_COST: u32 = 4;

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "Etc/UTC", PaginationConfig::default())
        .expect("Could not create app state")
        .with_password_cost(TEST_PASSWORD_COST)
}

/// Create a user whose password is "password123".
#[track_caller]
pub(crate) fn create_test_user(connection: &Connection, username: &str) -> User {
    create_user(
        NewUser {
            username: Username::new_unchecked(username),
            password_hash: PasswordHash::from_raw_password("password123", TEST_PASSWORD_COST)
                .expect("Could not hash password"),
            email: String::new(),
        },
        connection,
    )
    .expect("Could not create test user")
}

#[track_caller]
pub(crate) fn create_test_category(
    connection: &Connection,
    user: &User,
    name: &str,
    category_type: TransactionType,
) -> Category {
    create_category(
        NewCategory {
            name: CategoryName::new_unchecked(name),
            category_type,
            user_id: user.id,
        },
        connection,
    )
    .expect("Could not create test category")
}

pub(crate) fn token_header(key: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Token {key}")).expect("Invalid header value")
}

pub(crate) async fn parse_json_body(response: Response<Body>) -> Value {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not valid JSON")
}
