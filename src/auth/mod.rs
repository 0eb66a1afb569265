//! User accounts, passwords and token authentication.

mod current_user;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use current_user::get_current_user;
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use password::{MIN_PASSWORD_LENGTH, PasswordHash, ValidatedPassword};
pub use register_user::register_user;
pub use token::create_token_table;
pub use user::{
    NewUser, User, UserID, UserProfile, Username, create_user, create_user_table,
    get_user_by_username, update_password,
};

#[cfg(test)]
pub use token::{get_or_create_token, get_token_user};
#[cfg(test)]
pub use user::get_user_by_id;
