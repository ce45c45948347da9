//! User Interface Preferences
//!
//! Stores per-user interface state on the server, currently whether the
//! sidebar is collapsed. Users without a saved row get the defaults.

use std::sync::{Arc, Mutex};

use axum::{Extension, Json, extract::FromRef, extract::State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, app_state::lock_connection, auth::UserID, extract::JsonBody};

/// A user's interface preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub sidebar_collapsed: bool,
}

/// The state needed by the preference endpoints.
#[derive(Debug, Clone)]
pub struct PreferencesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PreferencesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Create the user_preferences table in the database.
///
/// Each user has at most one row, keyed by their user ID.
pub fn create_preferences_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_preferences (
            user_id INTEGER PRIMARY KEY,
            sidebar_collapsed INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Get the preferences of `user_id`, or the defaults if none were saved.
pub fn get_preferences(user_id: UserID, connection: &Connection) -> Result<Preferences, Error> {
    let result = connection
        .prepare("SELECT sidebar_collapsed FROM user_preferences WHERE user_id = ?1")?
        .query_row([user_id.as_i64()], |row| {
            Ok(Preferences {
                sidebar_collapsed: row.get(0)?,
            })
        });

    match result {
        Ok(preferences) => Ok(preferences),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Preferences::default()),
        Err(error) => Err(error.into()),
    }
}

/// Save the preferences of `user_id`, replacing any saved before.
pub fn save_preferences(
    user_id: UserID,
    preferences: Preferences,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO user_preferences (user_id, sidebar_collapsed) VALUES (?1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET sidebar_collapsed = excluded.sidebar_collapsed",
        (user_id.as_i64(), preferences.sidebar_collapsed),
    )?;

    Ok(())
}

/// A route handler that returns the session user's preferences.
pub async fn get_preferences_endpoint(
    State(state): State<PreferencesState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Preferences>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_preferences(user_id, &connection).map(Json)
}

/// A route handler that stores the session user's preferences and echoes them back.
pub async fn update_preferences_endpoint(
    State(state): State<PreferencesState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(preferences): JsonBody<Preferences>,
) -> Result<Json<Preferences>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    save_preferences(user_id, preferences, &connection)?;

    Ok(Json(preferences))
}
