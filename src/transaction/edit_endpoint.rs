//! Transaction update endpoint.

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    category::CategoryId,
    extract::JsonBody,
    transaction::{
        Transaction, TransactionState, TransactionType, core::TransactionId,
        core::update_transaction, ensure_category_is_usable, get_owned_transaction,
    },
};

/// The replacement fields for an existing transaction.
///
/// Optional fields that are omitted are cleared.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionData {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub title: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub date: Date,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A route handler for replacing one of the session user's transactions.
///
/// # Errors
///
/// Returns a 404 error if the transaction does not exist, a 403 error if it
/// belongs to someone else and a 400 error for invalid fields.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<UpdateTransactionData>,
) -> Result<Json<Transaction>, Error> {
    let builder = Transaction::build(data.transaction_type, data.amount, data.date, &data.title)
        .category_id(data.category_id)
        .note(data.note)
        .image_url(data.image_url);

    let connection = lock_connection(&state.db_connection)?;
    let transaction = get_owned_transaction(data.id, user_id, &connection)?;
    let builder = builder.validate()?;
    ensure_category_is_usable(builder.category_id, user_id, &connection)?;

    let updated = update_transaction(transaction.id, builder, &connection)?;

    Ok(Json(updated))
}
