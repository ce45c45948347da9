//! easybudget is a web service for tracking personal finances.
//!
//! Users sign in, record income and expense transactions, sort them into
//! categories, set budgets and savings goals, view reports, and bulk-import
//! transactions from bank statements.
//!
//! This library provides a JSON REST API backed by a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod category;
mod database_id;
mod db;
mod endpoints;
mod extract;
mod goal;
mod import;
mod logging;
mod preferences;
mod report;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    Email, NewUser, PasswordHash, User, UserID, ValidatedPassword, create_user,
    get_user_by_email, update_password,
};
pub use budget::{BudgetFields, create_budget};
pub use category::{CategoryEmoji, CategoryName, create_category};
pub use db::initialize as initialize_db;
pub use goal::{GoalFields, create_goal};
pub use import::{
    ColumnMapping, CsvExtractor, ImportPreview, PdfExtractor, PreviewRow, RawRow, RowError,
    StatementExtractor, StatementTable, TypeConfig, reconcile_rows,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{Transaction, TransactionBuilder, TransactionType, create_transaction};

use crate::category::CategoryId;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// Every variant maps onto one of the API error kinds (unauthorized, not
/// found, forbidden, validation, conflict or internal) in [Error::status_code].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a valid session cookie.
    #[error("you must be logged in to do that")]
    Unauthorized,

    /// The email and password combination did not match a registered user.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// The resource exists but belongs to another user.
    #[error("you do not have permission to access this resource")]
    Forbidden,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A required field was missing or a value was out of range.
    #[error("{0}")]
    ValidationError(String),

    /// The request conflicts with existing data.
    #[error("{0}")]
    Conflict(String),

    /// An account with the email address already exists.
    #[error("an account with this email address already exists")]
    DuplicateEmail,

    /// The user already has a category with this name (ignoring case).
    #[error("a category named \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The string is not a valid email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A category emoji must be exactly one emoji.
    #[error("\"{0}\" is not a single emoji")]
    InvalidEmoji(String),

    /// The category ID does not refer to one of the user's categories.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// The start of a date range is after its end.
    #[error("the start date must not be after the end date")]
    InvalidDateRange,

    /// The uploaded file could not be read from the multipart form.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The uploaded file is not a supported statement type.
    #[error("unsupported file type \"{0}\", upload a CSV file")]
    UnsupportedFileType(String),

    /// The statement format is recognised, but rows cannot be extracted from it.
    #[error("cannot extract transactions from {0} statements yet")]
    UnsupportedStatement(String),

    /// The CSV had issues that prevented it from being parsed.
    #[error("could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// There was an error formatting the expiry of the auth cookie.
    #[error("could not format cookie expiry date-time: {0}")]
    InvalidDateFormat(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Any other unexpected error.
    #[error("{0}")]
    InternalError(String),
}

impl Error {
    /// The HTTP status code that the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Conflict(_) | Error::DuplicateEmail | Error::DuplicateCategoryName(_) => {
                StatusCode::CONFLICT
            }
            Error::ValidationError(_)
            | Error::InvalidEmail(_)
            | Error::TooWeak(_)
            | Error::EmptyCategoryName
            | Error::InvalidEmoji(_)
            | Error::InvalidCategory(_)
            | Error::InvalidDateRange
            | Error::MultipartError(_)
            | Error::UnsupportedFileType(_)
            | Error::UnsupportedStatement(_)
            | Error::InvalidCSV(_) => StatusCode::BAD_REQUEST,
            Error::HashingError(_)
            | Error::InvalidDateFormat(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_)
            | Error::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
