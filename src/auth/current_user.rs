//! Returns the details of the authenticated user.

use axum::{Extension, Json, extract::State};

use crate::{
    Error,
    app_state::{DbState, lock_connection},
    auth::{UserID, UserProfile, user::get_user_by_id},
};

/// Get the profile of the user that owns the request's auth token.
pub async fn get_current_user(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<UserProfile>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user_by_id(user_id, &connection)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod current_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, response::IntoResponse};
    use serde_json::json;

    use crate::{
        Error,
        app_state::DbState,
        auth::UserID,
        test_utils::{create_test_user, get_test_connection, parse_json_body},
    };

    use super::get_current_user;

    #[tokio::test]
    async fn returns_public_fields_only() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "alice");
        let state = DbState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_current_user(State(state), Extension(user.id))
            .await
            .into_response();

        assert_eq!(
            parse_json_body(response).await,
            json!({
                "id": user.id.as_i64(),
                "username": "alice",
                "email": "",
                "first_name": "",
                "last_name": "",
            })
        );
    }

    #[tokio::test]
    async fn deleted_user_is_not_found() {
        let state = DbState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let result = get_current_user(State(state), Extension(UserID::new(42))).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
