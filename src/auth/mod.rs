//! User accounts, passwords and cookie-based sessions.

mod cookie;
mod email;
mod log_in;
mod log_out;
mod middleware;
mod ownership;
mod password;
mod register;
mod session;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use email::Email;
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use ownership::ensure_owner;
pub use password::{PasswordHash, ValidatedPassword};
pub use register::register_user;
pub use session::get_session;
pub(super) use token::Token;
pub use user::{
    NewUser, User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id,
    update_password,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub use middleware::AuthState;
