//! The endpoint for registering a new user account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{Email, NewUser, PasswordHash, User, ValidatedPassword, create_user, set_auth_cookie},
};

/// The state needed for registering a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data sent by the client to create an account.
#[derive(Clone, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Create a user account and log the new user in.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidEmail] if the email address is malformed.
/// - [Error::TooWeak] if the password is easy to guess.
/// - [Error::DuplicateEmail] if the email address is already registered.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Json(user_data): Json<RegisterForm>,
) -> Result<(StatusCode, PrivateCookieJar, Json<User>), Error> {
    let email = Email::new(&user_data.email)?;
    let name = user_data
        .name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty());

    let mut user_inputs = vec![email.as_str()];
    if let Some(name) = &name {
        user_inputs.push(name);
    }
    let validated_password = ValidatedPassword::new(&user_data.password, &user_inputs)?;

    let password_hash = PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)
        .inspect_err(|error| tracing::error!("an error occurred while hashing a password: {error}"))?;

    let user = create_user(
        NewUser {
            email,
            name,
            password_hash,
        },
        &*lock_connection(&state.db_connection)?,
    )?;

    tracing::info!("Registered user {}", user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((StatusCode::CREATED, jar, Json(user)))
}
