//! Registration of new users.
//!
//! A new user gets the default categories and an auth token straight away, so
//! that clients can log the user in without a second request.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{
        NewUser, PasswordHash, UserProfile, Username, ValidatedPassword, create_user,
        get_user_by_username, token::create_token, user::validate_email,
    },
    category::seed_default_categories,
};

/// The state needed for registering a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used to hash the new user's password.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The body of a registration request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    /// The name the user will log in with.
    #[serde(default)]
    pub username: Option<String>,
    /// The user's password in plain text.
    #[serde(default)]
    pub password: Option<String>,
    /// The user's email address, optional.
    #[serde(default)]
    pub email: Option<String>,
}

/// The body of a successful registration response.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    /// The new user's auth token.
    pub token: String,
    /// The new user's details.
    pub user: UserProfile,
    /// A message for the client to display.
    pub message: &'static str,
}

/// Handler for registration requests.
///
/// Creates the user, their default categories and their auth token in one
/// SQL transaction, so a failure leaves nothing behind.
///
/// # Errors
///
/// This function will return an error if:
/// - the username or password is missing.
/// - the password is too short.
/// - the username is taken or malformed.
/// - the email address is malformed.
/// - an internal error occurred while hashing the password or writing to the database.
pub async fn register_user(
    State(state): State<RegistrationState>,
    payload: Result<Json<RegisterData>, JsonRejection>,
) -> Result<(StatusCode, Json<RegistrationResponse>), Error> {
    let Json(data) = payload?;
    let raw_username = data.username.unwrap_or_default();
    let raw_password = data.password.unwrap_or_default();
    let email = data.email.unwrap_or_default();

    if raw_username.is_empty() || raw_password.is_empty() {
        return Err(Error::MissingCredentials);
    }

    let password = ValidatedPassword::new(&raw_password)?;
    let username = Username::new(&raw_username)?;
    validate_email(&email)?;

    {
        let connection = lock_connection(&state.db_connection)?;
        match get_user_by_username(username.as_str(), &connection) {
            Ok(_) => return Err(Error::DuplicateUsername(raw_username)),
            Err(Error::NotFound) => {}
            Err(error) => return Err(error),
        }
    }

    // Hash outside the lock.
    let password_hash = PasswordHash::new(password, state.password_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = connection.unchecked_transaction()?;

    let user = create_user(
        NewUser {
            username,
            password_hash,
            email,
        },
        &transaction,
    )?;
    seed_default_categories(user.id, &transaction)?;
    let token = create_token(user.id, &transaction)?;

    transaction.commit()?;

    tracing::info!("Registered user {} ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            token: token.key,
            user: user.into(),
            message: "Registration successful",
        }),
    ))
}

#[cfg(test)]
mod register_user_tests {
    use axum::{
        Json,
        extract::{FromRef, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use serde_json::json;

    use crate::{
        Error,
        auth::{get_token_user, get_user_by_username},
        category::list_categories,
        test_utils::{create_test_user, get_test_state, parse_json_body},
    };

    use super::{RegisterData, RegistrationState, register_user};

    fn register_data(username: &str, password: &str) -> RegisterData {
        RegisterData {
            username: Some(username.to_owned()),
            password: Some(password.to_owned()),
            email: None,
        }
    }

    #[tokio::test]
    async fn register_creates_user_categories_and_token() {
        let state = RegistrationState::from_ref(&get_test_state());

        let response = register_user(
            State(state.clone()),
            Ok(Json(register_data("alice", "password123"))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = parse_json_body(response).await;
        assert_eq!(body["message"], "Registration successful");
        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["user"]["email"], "");

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_username("alice", &connection).unwrap();
        assert!(user.password_hash.verify("password123").unwrap());
        assert_eq!(body["user"]["id"], json!(user.id.as_i64()));

        let key = body["token"].as_str().unwrap();
        assert_eq!(key.len(), 40);
        assert_eq!(get_token_user(key, &connection), Ok(user.id));

        let categories = list_categories(user.id, None, None, &connection).unwrap();
        assert_eq!(categories.len(), 12);
    }

    #[tokio::test]
    async fn register_fails_without_password() {
        let state = RegistrationState::from_ref(&get_test_state());
        let data = RegisterData {
            username: Some("alice".to_owned()),
            ..Default::default()
        };

        let result = register_user(State(state), Ok(Json(data))).await;

        assert_eq!(result.err(), Some(Error::MissingCredentials));
    }

    #[tokio::test]
    async fn register_fails_with_short_password() {
        let state = RegistrationState::from_ref(&get_test_state());

        let response = register_user(State(state), Ok(Json(register_data("alice", "short"))))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "error": "Password must be at least 8 characters" })
        );
    }

    #[tokio::test]
    async fn register_fails_with_existing_username() {
        let app_state = get_test_state();
        create_test_user(&app_state.db_connection.lock().unwrap(), "alice");
        let state = RegistrationState::from_ref(&app_state);

        let response = register_user(
            State(state),
            Ok(Json(register_data("alice", "password123"))),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "error": "Username already exists" })
        );
    }

    #[tokio::test]
    async fn register_fails_with_invalid_email() {
        let state = RegistrationState::from_ref(&get_test_state());
        let data = RegisterData {
            email: Some("not-an-email".to_owned()),
            ..register_data("alice", "password123")
        };

        let result = register_user(State(state.clone()), Ok(Json(data))).await;

        assert!(matches!(
            result,
            Err(Error::InvalidField { field: "email", .. })
        ));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_user_by_username("alice", &connection),
            Err(Error::NotFound)
        );
    }
}
