//! Exchanges a username and password for the user's auth token.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::{DbState, lock_connection},
    auth::{UserProfile, get_user_by_username, token::get_or_create_token},
};

/// The body of a log-in request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// The user's username.
    #[serde(default)]
    pub username: Option<String>,
    /// The user's password in plain text.
    #[serde(default)]
    pub password: Option<String>,
}

/// The body of a successful log-in response.
#[derive(Debug, Clone, Serialize)]
pub struct LogInResponse {
    /// The auth token to send with later requests.
    pub token: String,
    /// The user's details.
    pub user: UserProfile,
}

/// Handler for log-in requests via the POST method.
///
/// Returns the user's existing token, or a new one if they logged out.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The username or password is missing.
/// - The username does not exist or the password is not correct.
/// - An internal error occurred when verifying the password.
pub async fn post_log_in(
    State(state): State<DbState>,
    payload: Result<Json<LogInData>, JsonRejection>,
) -> Result<Json<LogInResponse>, Error> {
    let Json(data) = payload?;
    let username = data.username.unwrap_or_default();
    let password = data.password.unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return Err(Error::IncompleteLogIn);
    }

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        match get_user_by_username(&username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    if !user.password_hash.verify(&password)? {
        tracing::info!("Failed log-in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = {
        let connection = lock_connection(&state.db_connection)?;
        get_or_create_token(user.id, &connection)?
    };

    Ok(Json(LogInResponse {
        token: token.key,
        user: user.into(),
    }))
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        Error,
        app_state::DbState,
        auth::{NewUser, PasswordHash, Username, create_user, get_or_create_token},
        endpoints,
        test_utils::get_test_connection,
    };

    use super::{LogInData, post_log_in};

    fn get_test_state() -> DbState {
        let connection = get_test_connection();
        create_user(
            NewUser {
                username: Username::new_unchecked("alice"),
                password_hash: PasswordHash::from_raw_password("password123", 4).unwrap(),
                email: "alice@example.com".to_owned(),
            },
            &connection,
        )
        .expect("Could not create test user");

        DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn log_in_data(username: &str, password: &str) -> LogInData {
        LogInData {
            username: Some(username.to_owned()),
            password: Some(password.to_owned()),
        }
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_state();

        let Json(response) = post_log_in(
            State(state.clone()),
            Ok(Json(log_in_data("alice", "password123"))),
        )
        .await
        .unwrap();

        assert_eq!(response.user.username.as_str(), "alice");
        assert_eq!(response.user.email, "alice@example.com");
        let connection = state.db_connection.lock().unwrap();
        let token = get_or_create_token(response.user.id, &connection).unwrap();
        assert_eq!(response.token, token.key);
    }

    #[tokio::test]
    async fn log_in_twice_returns_same_token() {
        let state = get_test_state();

        let Json(first) = post_log_in(
            State(state.clone()),
            Ok(Json(log_in_data("alice", "password123"))),
        )
        .await
        .unwrap();
        let Json(second) = post_log_in(
            State(state),
            Ok(Json(log_in_data("alice", "password123"))),
        )
        .await
        .unwrap();

        assert_eq!(first.token, second.token);
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let state = get_test_state();

        let result = post_log_in(State(state), Ok(Json(log_in_data("alice", "wrongpassword")))).await;

        assert_eq!(result.err(), Some(Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_user() {
        let state = get_test_state();

        let result = post_log_in(State(state), Ok(Json(log_in_data("bob", "password123")))).await;

        assert_eq!(result.err(), Some(Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn log_in_rejects_missing_fields() {
        let app = Router::new()
            .route(endpoints::LOG_IN, post(post_log_in))
            .with_state(get_test_state());
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "alice" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Please provide both username and password" }));
    }

    #[tokio::test]
    async fn log_in_with_bad_credentials_is_unauthorized() {
        let app = Router::new()
            .route(endpoints::LOG_IN, post(post_log_in))
            .with_state(get_test_state());
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": "alice", "password": "wrongpassword" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "error": "Invalid credentials" }));
    }
}
