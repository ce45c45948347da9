use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    app_state::lock_connection,
    auth::{User, UserID, get_user_by_id},
};

/// The state needed to look up the session user.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Return the user the session cookie belongs to.
///
/// A cookie for a user that has since been deleted is treated as no session.
pub async fn get_session(
    State(state): State<SessionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<User>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match get_user_by_id(user_id, &connection) {
        Ok(user) => Ok(Json(user)),
        Err(Error::NotFound) => Err(Error::Unauthorized),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod session_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Json, extract::State};
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{Email, NewUser, PasswordHash, UserID, create_user},
        db::initialize,
    };

    use super::{SessionState, get_session};

    fn get_test_state() -> (SessionState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            NewUser {
                email: Email::new("test@example.com").unwrap(),
                name: None,
                password_hash: PasswordHash::new_unchecked("hunter2"),
            },
            &connection,
        )
        .unwrap();

        (
            SessionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn returns_session_user() {
        let (state, user_id) = get_test_state();

        let Json(user) = get_session(State(state), Extension(user_id)).await.unwrap();

        assert_eq!(user.id, user_id);
    }

    #[tokio::test]
    async fn deleted_user_is_unauthorized() {
        let (state, user_id) = get_test_state();
        let stale_id = UserID::new(user_id.as_i64() + 1);

        let result = get_session(State(state), Extension(stale_id)).await;

        assert!(matches!(result, Err(Error::Unauthorized)));
    }
}
