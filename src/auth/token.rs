//! Opaque auth tokens that identify the user making a request.
//!
//! Each user has at most one token. Logging in reuses the existing token and
//! logging out deletes it.

use rand::RngCore;
use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, db::timestamp_now};

/// The number of random bytes in a token key.
const KEY_BYTES: usize = 20;

/// A token for authorization and authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The secret the client sends in the `Authorization` header, 40 hex characters.
    pub key: String,
    /// The user the token belongs to.
    pub user_id: UserID,
    /// When the token was issued.
    pub created_at: OffsetDateTime,
}

/// Generate a new random token key.
fn generate_key() -> String {
    let mut key_bytes = [0u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut key_bytes);

    hex::encode(key_bytes)
}

/// Create the auth token table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_token_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS auth_token (
                key TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_token_row(row: &Row) -> Result<Token, rusqlite::Error> {
    Ok(Token {
        key: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        created_at: row.get(2)?,
    })
}

/// Issue a new token for `user_id`.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the user already has a token or the user does not exist.
pub fn create_token(user_id: UserID, connection: &Connection) -> Result<Token, Error> {
    let token = Token {
        key: generate_key(),
        user_id,
        created_at: timestamp_now(),
    };

    connection.execute(
        "INSERT INTO auth_token (key, user_id, created_at) VALUES (?1, ?2, ?3)",
        (&token.key, token.user_id.as_i64(), token.created_at),
    )?;

    Ok(token)
}

/// Get the token of `user_id`, creating one if the user does not have one.
///
/// # Errors
///
/// Returns an [Error::SqlError] if an SQL related error occurred.
pub fn get_or_create_token(user_id: UserID, connection: &Connection) -> Result<Token, Error> {
    let existing_token = connection
        .prepare("SELECT key, user_id, created_at FROM auth_token WHERE user_id = :user_id")?
        .query_row(&[(":user_id", &user_id.as_i64())], map_token_row)
        .optional()?;

    match existing_token {
        Some(token) => Ok(token),
        None => create_token(user_id, connection),
    }
}

/// Get the ID of the user that owns the token `key`.
///
/// # Errors
///
/// Returns [Error::InvalidToken] if no user has the token.
pub fn get_token_user(key: &str, connection: &Connection) -> Result<UserID, Error> {
    connection
        .prepare("SELECT user_id FROM auth_token WHERE key = :key")?
        .query_row(&[(":key", &key)], |row| row.get(0).map(UserID::new))
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::InvalidToken,
            error => error.into(),
        })
}

/// Delete the token of `user_id`.
///
/// # Errors
///
/// Returns [Error::NoActiveSession] if the user does not have a token.
pub fn delete_token_for_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM auth_token WHERE user_id = ?1",
        (user_id.as_i64(),),
    )?;

    if rows_affected == 0 {
        return Err(Error::NoActiveSession);
    }

    Ok(())
}
