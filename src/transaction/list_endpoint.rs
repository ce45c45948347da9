//! Lists the session user's transactions.

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use time::{Date, Duration};

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    category::CategoryId,
    extract::QueryParams,
    timezone::get_local_date,
    transaction::{
        DateRange, Transaction, TransactionFilter, TransactionState, TransactionType,
        query_transactions,
    },
};

/// How far back the listing goes when `from` is not given.
const DEFAULT_LISTING_SPAN: Duration = Duration::days(30);

/// Query parameters for listing transactions. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub category_id: Option<CategoryId>,
}

/// A route handler that returns the user's transactions in a date range, newest first.
///
/// `to` defaults to today in the server's timezone and `from` to 30 days before `to`.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let range = DateRange::from_query(query.from, query.to, today, DEFAULT_LISTING_SPAN)?;
    let filter = TransactionFilter {
        range,
        transaction_type: query.transaction_type,
        category_id: query.category_id,
    };

    let connection = lock_connection(&state.db_connection)?;
    let transactions = query_transactions(user_id, filter, &connection)?;

    Ok(Json(transactions))
}

#[cfg(test)]
mod get_transactions_endpoint_tests {
    use axum::{Extension, extract::State};
    use time::{Duration, OffsetDateTime, macros::date};

    use crate::{
        Error,
        extract::QueryParams,
        test_utils::{create_test_user, get_test_connection, shared_connection},
        transaction::{Transaction, TransactionState, TransactionType, create_transaction},
    };

    use super::{TransactionQuery, get_transactions_endpoint};

    #[tokio::test]
    async fn returns_range_newest_first() {
        let connection = get_test_connection();
        let alice = create_test_user("a@example.com", &connection);
        let first = create_transaction(
            alice,
            Transaction::build(TransactionType::Expense, 1.0, date!(2025 - 01 - 10), "First"),
            &connection,
        )
        .unwrap();
        let second = create_transaction(
            alice,
            Transaction::build(TransactionType::Income, 2.0, date!(2025 - 01 - 20), "Second"),
            &connection,
        )
        .unwrap();
        create_transaction(
            alice,
            Transaction::build(TransactionType::Income, 3.0, date!(2025 - 02 - 20), "Later"),
            &connection,
        )
        .unwrap();
        let state = TransactionState {
            db_connection: shared_connection(connection),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let transactions = get_transactions_endpoint(
            State(state),
            Extension(alice),
            QueryParams(TransactionQuery {
                from: Some(date!(2025 - 01 - 01)),
                to: Some(date!(2025 - 01 - 31)),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(transactions.0, vec![second, first]);
    }

    #[tokio::test]
    async fn defaults_to_last_thirty_days() {
        let connection = get_test_connection();
        let alice = create_test_user("a@example.com", &connection);
        let today = OffsetDateTime::now_utc().date();
        let recent = create_transaction(
            alice,
            Transaction::build(TransactionType::Expense, 1.0, today, "Recent"),
            &connection,
        )
        .unwrap();
        create_transaction(
            alice,
            Transaction::build(
                TransactionType::Expense,
                1.0,
                today - Duration::days(45),
                "Old",
            ),
            &connection,
        )
        .unwrap();
        let state = TransactionState {
            db_connection: shared_connection(connection),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let transactions = get_transactions_endpoint(
            State(state),
            Extension(alice),
            QueryParams(TransactionQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(transactions.0, vec![recent]);
    }

    #[tokio::test]
    async fn reversed_range_is_rejected() {
        let connection = get_test_connection();
        let alice = create_test_user("a@example.com", &connection);
        let state = TransactionState {
            db_connection: shared_connection(connection),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let result = get_transactions_endpoint(
            State(state),
            Extension(alice),
            QueryParams(TransactionQuery {
                from: Some(date!(2025 - 02 - 01)),
                to: Some(date!(2025 - 01 - 01)),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::InvalidDateRange);
    }

    #[test]
    fn query_string_uses_api_names() {
        let query: TransactionQuery =
            serde_urlencoded::from_str("from=2025-01-01&type=income&categoryId=4").unwrap();

        assert_eq!(query.from, Some(date!(2025 - 01 - 01)));
        assert_eq!(query.to, None);
        assert_eq!(query.transaction_type, Some(TransactionType::Income));
        assert_eq!(query.category_id, Some(4));
    }
}
