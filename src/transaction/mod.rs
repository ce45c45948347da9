//! Transactions record money earned or spent by a user.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{CategoryId, get_owned_category},
};

mod bulk_endpoint;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod range;

pub use bulk_endpoint::{BulkTransactionItem, create_transactions_in_bulk_endpoint};
pub use core::{
    Transaction, TransactionBuilder, TransactionFilter, TransactionType, create_transaction,
    create_transaction_table, get_owned_transaction, query_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::update_transaction_endpoint;
pub use list_endpoint::get_transactions_endpoint;
pub use range::DateRange;

#[cfg(test)]
pub use core::get_transaction;

/// The state needed by the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone used to work out "today" for default date ranges.
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Check that `category_id`, if given, refers to one of the user's categories.
///
/// # Errors
/// Returns [Error::InvalidCategory] if the category does not exist or belongs
/// to another user.
pub(crate) fn ensure_category_is_usable(
    category_id: Option<CategoryId>,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    match get_owned_category(category_id, user_id, connection) {
        Ok(_) => Ok(()),
        Err(Error::NotFound | Error::Forbidden) => Err(Error::InvalidCategory(category_id)),
        Err(error) => Err(error),
    }
}
