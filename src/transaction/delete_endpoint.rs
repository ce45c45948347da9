//! Transaction deletion endpoint.

use axum::{Extension, extract::State, http::StatusCode};

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    database_id::IdQuery,
    extract::QueryParams,
    transaction::{TransactionState, core::delete_transaction, get_owned_transaction},
};

/// A route handler for deleting one of the session user's transactions.
///
/// Deleting another user's transaction fails with 403 and leaves it untouched.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let transaction = get_owned_transaction(query.id, user_id, &connection)?;

    delete_transaction(transaction.id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
