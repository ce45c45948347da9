//! The log-in endpoint. The auth module handles the lower level cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{Email, User, get_user_by_email, set_auth_cookie},
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client to log in.
///
/// The password is a plain string. There is no need for validation here since
/// it will be compared against the hash in the database.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInData {
    pub email: String,
    pub password: String,
    /// Keep the session alive for a week instead of a few minutes.
    #[serde(default)]
    pub remember_me: bool,
}

/// Handler for log-in requests.
///
/// On success the auth cookie is set and the user is returned.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the email is not registered or the
/// password does not match, or an internal error if the password could not be verified.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<LogInData>,
) -> Result<(PrivateCookieJar, Json<User>), Error> {
    let email = Email::new(&credentials.email).map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    if !user.password_hash.verify(&credentials.password)? {
        tracing::debug!("Failed log-in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let cookie_duration = if credentials.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let jar = set_auth_cookie(jar, user.id, cookie_duration)?;

    Ok((jar, Json(user)))
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State};
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        app_state::create_cookie_key,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, Email, NewUser, PasswordHash,
            ValidatedPassword, create_user,
        },
        db::initialize,
    };

    use super::{LogInData, LoginState, post_log_in};

    const PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_state() -> LoginState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_user(
            NewUser {
                email: Email::new("test@example.com").unwrap(),
                name: None,
                password_hash: PasswordHash::new(ValidatedPassword::new_unchecked(PASSWORD), 4)
                    .unwrap(),
            },
            &connection,
        )
        .unwrap();

        LoginState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn credentials(email: &str, password: &str, remember_me: bool) -> LogInData {
        LogInData {
            email: email.to_owned(),
            password: password.to_owned(),
            remember_me,
        }
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let (jar, Json(user)) = post_log_in(
            State(state),
            jar,
            Json(credentials("Test@Example.com", PASSWORD, false)),
        )
        .await
        .unwrap();

        assert_eq!(user.email.as_str(), "test@example.com");
        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        assert_date_time_close(
            cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION,
        );
    }

    #[tokio::test]
    async fn remember_me_extends_cookie_to_one_week() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let (jar, _) = post_log_in(
            State(state),
            jar,
            Json(credentials("test@example.com", PASSWORD, true)),
        )
        .await
        .unwrap();

        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        assert_date_time_close(
            cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + Duration::days(7),
        );
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let result = post_log_in(
            State(state),
            jar,
            Json(credentials("test@example.com", "wrongpassword", false)),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let result = post_log_in(
            State(state),
            jar,
            Json(credentials("nobody@example.com", PASSWORD, false)),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidCredentials)));
    }
}
