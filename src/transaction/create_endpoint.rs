//! Transaction creation endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    category::CategoryId,
    extract::JsonBody,
    transaction::{
        Transaction, TransactionState, TransactionType, create_transaction,
        ensure_category_is_usable,
    },
};

/// The fields of a new transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransactionData {
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

/// A route handler for creating a new transaction for the session user.
///
/// # Errors
///
/// Returns a 400 error for a blank title, a negative amount or a category the
/// user does not own.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<NewTransactionData>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let builder = Transaction::build(data.transaction_type, data.amount, data.date, &data.title)
        .category_id(data.category_id)
        .note(data.note)
        .image_url(data.image_url)
        .validate()?;

    let connection = lock_connection(&state.db_connection)?;
    ensure_category_is_usable(builder.category_id, user_id, &connection)?;
    let transaction = create_transaction(user_id, builder, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        category::{CategoryEmoji, CategoryName, create_category},
        extract::JsonBody,
        test_utils::{create_test_user, get_test_connection, shared_connection},
        transaction::{TransactionState, TransactionType, get_transaction},
    };

    use super::{NewTransactionData, create_transaction_endpoint};

    fn get_state() -> (TransactionState, UserID, UserID) {
        let connection = get_test_connection();
        let alice = create_test_user("a@example.com", &connection);
        let bob = create_test_user("b@example.com", &connection);

        (
            TransactionState {
                db_connection: shared_connection(connection),
                local_timezone: "Etc/UTC".to_owned(),
            },
            alice,
            bob,
        )
    }

    fn lunch() -> NewTransactionData {
        NewTransactionData {
            transaction_type: TransactionType::Expense,
            amount: 12.5,
            title: "Lunch".to_owned(),
            category_id: None,
            date: date!(2025 - 06 - 01),
            note: Some("with Bob".to_owned()),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, alice, _) = get_state();

        let (status, transaction) = create_transaction_endpoint(
            State(state.clone()),
            Extension(alice),
            JsonBody(lunch()),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(transaction.user_id, alice);
        assert_eq!(transaction.title, "Lunch");
        assert_eq!(transaction.note.as_deref(), Some("with Bob"));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_transaction(transaction.id, &connection), Ok(transaction.0));
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let (state, alice, _) = get_state();

        let result = create_transaction_endpoint(
            State(state),
            Extension(alice),
            JsonBody(NewTransactionData {
                title: "  ".to_owned(),
                ..lunch()
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[tokio::test]
    async fn negative_amount_is_rejected() {
        let (state, alice, _) = get_state();

        let result = create_transaction_endpoint(
            State(state),
            Extension(alice),
            JsonBody(NewTransactionData {
                amount: -1.0,
                ..lunch()
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[tokio::test]
    async fn another_users_category_is_rejected() {
        let (state, alice, bob) = get_state();
        let bobs_category = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                bob,
                CategoryName::new_unchecked("Food"),
                CategoryEmoji::default(),
                &connection,
            )
            .unwrap()
        };

        let result = create_transaction_endpoint(
            State(state),
            Extension(alice),
            JsonBody(NewTransactionData {
                category_id: Some(bobs_category.id),
                ..lunch()
            }),
        )
        .await;

        let error = result.unwrap_err();
        assert_eq!(error, Error::InvalidCategory(bobs_category.id));
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }
}
