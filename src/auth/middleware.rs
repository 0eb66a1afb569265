//! Authentication middleware that resolves the `Authorization` header to a user.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    app_state::{DbState, lock_connection},
    auth::{UserID, token::get_token_user},
};

/// The scheme clients must put before the key in the `Authorization` header.
const TOKEN_SCHEME: &str = "Token";

/// Extract the token key from an `Authorization: Token <key>` header.
///
/// # Errors
///
/// Returns [Error::MissingToken] if there is no `Authorization` header or it uses
/// another scheme, or [Error::InvalidToken] if the header is malformed.
fn get_token_key(headers: &HeaderMap) -> Result<&str, Error> {
    let header = headers.get(AUTHORIZATION).ok_or(Error::MissingToken)?;
    let header = header.to_str().map_err(|_| Error::InvalidToken)?;

    let mut parts = header.split_whitespace();

    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => {}
        _ => return Err(Error::MissingToken),
    }

    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(key),
        _ => Err(Error::InvalidToken),
    }
}

fn authenticate(state: &DbState, headers: &HeaderMap) -> Result<UserID, Error> {
    let key = get_token_key(headers)?;
    let connection = lock_connection(&state.db_connection)?;

    get_token_user(key, &connection)
}

/// Middleware function that checks for a valid auth token.
///
/// The user ID is placed into the request extensions and the request is
/// executed normally if the token is valid, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<DbState>, mut request: Request, next: Next) -> Response {
    match authenticate(&state, request.headers()) {
        Ok(user_id) => {
            request.extensions_mut().insert(user_id);
            next.run(request).await
        }
        Err(error) => error.into_response(),
    }
}
