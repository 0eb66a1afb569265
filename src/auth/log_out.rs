//! Logging out deletes the caller's auth token.

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};

use crate::{
    Error,
    app_state::{DbState, lock_connection},
    auth::{UserID, token::delete_token_for_user},
};

/// Invalidate the auth token of the current user.
///
/// The client needs to log in again to get a new token.
///
/// # Errors
///
/// Returns [Error::NoActiveSession] if the token was already deleted, e.g. by a
/// concurrent log-out request.
pub async fn post_log_out(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_token_for_user(user_id, &connection)?;

    tracing::info!("User {user_id} logged out");

    Ok(Json(json!({ "message": "Successfully logged out" })))
}

#[cfg(test)]
mod log_out_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use serde_json::json;

    use crate::{
        Error,
        app_state::DbState,
        auth::{get_or_create_token, get_token_user},
        test_utils::{create_test_user, get_test_connection},
    };

    use super::post_log_out;

    #[tokio::test]
    async fn log_out_deletes_token() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "alice");
        let token = get_or_create_token(user.id, &connection).unwrap();
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = post_log_out(State(state.clone()), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.0, json!({ "message": "Successfully logged out" }));
        assert_eq!(
            get_token_user(&token.key, &state.db_connection.lock().unwrap()),
            Err(Error::InvalidToken)
        );
    }

    #[tokio::test]
    async fn log_out_without_token_fails() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "alice");
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result = post_log_out(State(state), Extension(user.id)).await;

        assert_eq!(result.err(), Some(Error::NoActiveSession));
    }
}
