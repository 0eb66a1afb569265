//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::PasswordHash,
    db::{is_unique_violation, timestamp_now},
};

/// The maximum number of characters in a username.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A username that only contains letters, digits and the characters `@.+-_`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Username(String);

impl Username {
    /// Create and validate a username.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingCredentials] if `raw_username` is empty, or an
    /// [Error::InvalidField] if it is too long or contains a disallowed character.
    pub fn new(raw_username: &str) -> Result<Self, Error> {
        if raw_username.is_empty() {
            return Err(Error::MissingCredentials);
        }

        if raw_username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(Error::invalid_field(
                "username",
                format!("Ensure this field has no more than {MAX_USERNAME_LENGTH} characters."),
            ));
        }

        let is_allowed =
            |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');

        if !raw_username.chars().all(is_allowed) {
            return Err(Error::invalid_field(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, \
                and @/./+/-/_ characters.",
            ));
        }

        Ok(Self(raw_username.to_owned()))
    }

    /// Create a username without validation.
    ///
    /// The caller should ensure the username was validated, e.g. by reading it from the database.
    pub fn new_unchecked(raw_username: &str) -> Self {
        Self(raw_username.to_owned())
    }

    /// The username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check that a non-empty email address looks like one.
///
/// Email addresses are optional, so an empty string is accepted.
///
/// # Errors
///
/// Returns an [Error::InvalidField] if `email` is not empty and does not contain
/// an '@' with text on either side.
pub fn validate_email(email: &str) -> Result<(), Error> {
    if email.is_empty() {
        return Ok(());
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(Error::invalid_field("email", "Enter a valid email address.")),
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The unique name the user logs in with.
    pub username: Username,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The user's email address, may be empty.
    pub email: String,
    /// The user's first name, may be empty.
    pub first_name: String,
    /// The user's last name, may be empty.
    pub last_name: String,
    /// When the user registered.
    pub date_joined: OffsetDateTime,
}

/// The public details of a user that are sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    /// The user's ID.
    pub id: UserID,
    /// The user's username.
    pub username: Username,
    /// The user's email address.
    pub email: String,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// The data needed to register a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The unique name the user logs in with.
    pub username: Username,
    /// The hash of the user's password.
    pub password_hash: PasswordHash,
    /// The user's email address, may be empty.
    pub email: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                email TEXT NOT NULL DEFAULT '',
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                date_joined TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a [Error::DuplicateUsername] if the username is taken, or
/// [Error::SqlError] if another SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let date_joined = timestamp_now();

    connection
        .execute(
            "INSERT INTO user (username, password, email, date_joined) VALUES (?1, ?2, ?3, ?4)",
            (
                new_user.username.as_str(),
                new_user.password_hash.as_ref(),
                &new_user.email,
                date_joined,
            ),
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateUsername(new_user.username.to_string())
            } else {
                error.into()
            }
        })?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: new_user.username,
        password_hash: new_user.password_hash,
        email: new_user.email,
        first_name: String::new(),
        last_name: String::new(),
        date_joined,
    })
}

const SELECT_USER: &str =
    "SELECT id, username, password, email, first_name, last_name, date_joined FROM user";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_username: String = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        username: Username::new_unchecked(&raw_username),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        email: row.get(3)?,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        date_joined: row.get(6)?,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user with the username `username`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER} WHERE username = :username"))?
        .query_row(&[(":username", &username)], map_user_row)
        .map_err(|error| error.into())
}

/// Replace the password hash of the user `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
