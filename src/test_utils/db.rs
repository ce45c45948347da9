use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    auth::{Email, NewUser, PasswordHash, UserID, create_user},
    db::initialize,
};

/// An initialized in-memory database.
#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Insert a user with a throwaway password hash.
#[track_caller]
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> UserID {
    create_user(
        NewUser {
            email: Email::new(email).expect("Invalid test email"),
            name: None,
            password_hash: PasswordHash::new_unchecked("hunter2"),
        },
        connection,
    )
    .expect("Could not create test user")
    .id
}

pub(crate) fn shared_connection(connection: Connection) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(connection))
}
