//! Creates many transactions in one request, e.g. after importing a bank statement.

use std::collections::HashMap;

use axum::{Extension, Json, extract::State, http::StatusCode};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    category::{CategoryEmoji, CategoryId, CategoryName, create_category, find_category_by_name},
    extract::JsonBody,
    transaction::{
        Transaction, TransactionBuilder, TransactionState, TransactionType, create_transaction,
    },
};

/// One transaction in a bulk request.
///
/// `category` is a category name. It is matched against the user's categories
/// ignoring case and created if the user does not have it yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkTransactionItem {
    pub date: Date,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// The request body for the bulk endpoint.
#[derive(Debug, Deserialize)]
pub struct BulkTransactionsData {
    pub transactions: Vec<BulkTransactionItem>,
}

/// The response body for the bulk endpoint.
#[derive(Debug, Serialize)]
pub struct BulkTransactionsResult {
    /// The number of transactions created.
    pub created: usize,
    pub transactions: Vec<Transaction>,
}

/// A route handler that creates all of the given transactions or none of them.
///
/// # Errors
///
/// Returns a 400 error if the list is empty or any item is invalid, in which
/// case nothing is written.
pub async fn create_transactions_in_bulk_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<BulkTransactionsData>,
) -> Result<(StatusCode, Json<BulkTransactionsResult>), Error> {
    if data.transactions.is_empty() {
        return Err(Error::ValidationError(
            "at least one transaction is required".to_owned(),
        ));
    }

    let items = data
        .transactions
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            validate_item(item).map_err(|error| match error {
                Error::ValidationError(message) => {
                    Error::ValidationError(format!("transaction {}: {message}", index + 1))
                }
                error => error,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let connection = lock_connection(&state.db_connection)?;
    let transactions = insert_all(user_id, items, &connection)?;

    tracing::debug!(
        "Created {} transactions in bulk for user {}",
        transactions.len(),
        user_id
    );

    Ok((
        StatusCode::CREATED,
        Json(BulkTransactionsResult {
            created: transactions.len(),
            transactions,
        }),
    ))
}

fn validate_item(
    item: BulkTransactionItem,
) -> Result<(TransactionBuilder, Option<CategoryName>), Error> {
    let builder =
        Transaction::build(item.transaction_type, item.amount, item.date, &item.description)
            .validate()?;

    let category = match item.category.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(CategoryName::new(name)?),
        _ => None,
    };

    Ok((builder, category))
}

fn insert_all(
    user_id: UserID,
    items: Vec<(TransactionBuilder, Option<CategoryName>)>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    let sql_transaction = connection.unchecked_transaction()?;
    let mut category_ids: HashMap<String, CategoryId> = HashMap::new();
    let mut transactions = Vec::with_capacity(items.len());

    for (builder, category) in items {
        let category_id = match category {
            Some(name) => Some(resolve_category(
                user_id,
                name,
                &mut category_ids,
                &sql_transaction,
            )?),
            None => None,
        };

        transactions.push(create_transaction(
            user_id,
            builder.category_id(category_id),
            &sql_transaction,
        )?);
    }

    sql_transaction.commit()?;

    Ok(transactions)
}

fn resolve_category(
    user_id: UserID,
    name: CategoryName,
    cache: &mut HashMap<String, CategoryId>,
    connection: &Connection,
) -> Result<CategoryId, Error> {
    let key = name.key();

    if let Some(id) = cache.get(&key) {
        return Ok(*id);
    }

    let id = match find_category_by_name(user_id, name.as_ref(), connection)? {
        Some(category) => category.id,
        None => {
            tracing::debug!("Creating category {name} during bulk insert");
            create_category(user_id, name, CategoryEmoji::default(), connection)?.id
        }
    };
    cache.insert(key, id);

    Ok(id)
}

#[cfg(test)]
mod bulk_endpoint_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use time::{Duration, macros::date};

    use crate::{
        Error,
        auth::UserID,
        category::{CategoryEmoji, CategoryName, create_category, get_categories},
        extract::JsonBody,
        test_utils::{create_test_user, get_test_connection, shared_connection},
        transaction::{
            DateRange, TransactionFilter, TransactionState, TransactionType, query_transactions,
        },
    };

    use super::{BulkTransactionItem, BulkTransactionsData, create_transactions_in_bulk_endpoint};

    fn get_state() -> (TransactionState, UserID) {
        let connection = get_test_connection();
        let user_id = create_test_user("a@example.com", &connection);
        create_category(
            user_id,
            CategoryName::new_unchecked("Groceries"),
            CategoryEmoji::default(),
            &connection,
        )
        .unwrap();

        (
            TransactionState {
                db_connection: shared_connection(connection),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user_id,
        )
    }

    fn item(description: &str, amount: f64, category: Option<&str>) -> BulkTransactionItem {
        BulkTransactionItem {
            date: date!(2024 - 03 - 15),
            description: description.to_owned(),
            amount,
            transaction_type: TransactionType::Expense,
            category: category.map(str::to_owned),
        }
    }

    fn count_transactions(state: &TransactionState, user_id: UserID) -> usize {
        let connection = state.db_connection.lock().unwrap();
        let range = DateRange::new(
            date!(2024 - 03 - 15) - Duration::days(365),
            date!(2024 - 03 - 15) + Duration::days(365),
        )
        .unwrap();

        query_transactions(
            user_id,
            TransactionFilter {
                range,
                transaction_type: None,
                category_id: None,
            },
            &connection,
        )
        .unwrap()
        .len()
    }

    #[tokio::test]
    async fn creates_all_and_resolves_categories() {
        let (state, user_id) = get_state();

        let (status, result) = create_transactions_in_bulk_endpoint(
            State(state.clone()),
            Extension(user_id),
            JsonBody(BulkTransactionsData {
                transactions: vec![
                    item("Supermarket", 50.0, Some("groceries")),
                    item("Bus", 3.5, Some("Transport")),
                    item("Train", 6.0, Some("TRANSPORT")),
                    item("Misc", 1.0, None),
                ],
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(result.created, 4);

        let connection = state.db_connection.lock().unwrap();
        let categories = get_categories(user_id, &connection).unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_ref()).collect();
        assert_eq!(names, ["Groceries", "Transport"]);

        let transactions = &result.transactions;
        assert_eq!(transactions[0].category_id, Some(categories[0].id));
        assert_eq!(transactions[1].category_id, Some(categories[1].id));
        assert_eq!(transactions[2].category_id, Some(categories[1].id));
        assert_eq!(transactions[3].category_id, None);
    }

    #[tokio::test]
    async fn matches_existing_category_with_non_ascii_case() {
        let (state, user_id) = get_state();
        let cafe = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                user_id,
                CategoryName::new_unchecked("Caffè"),
                CategoryEmoji::default(),
                &connection,
            )
            .unwrap()
        };

        let (_, result) = create_transactions_in_bulk_endpoint(
            State(state.clone()),
            Extension(user_id),
            JsonBody(BulkTransactionsData {
                transactions: vec![item("Espresso", 1.2, Some("CAFFÈ"))],
            }),
        )
        .await
        .unwrap();

        assert_eq!(result.transactions[0].category_id, Some(cafe.id));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_categories(user_id, &connection).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_list_is_rejected() {
        let (state, user_id) = get_state();

        let result = create_transactions_in_bulk_endpoint(
            State(state),
            Extension(user_id),
            JsonBody(BulkTransactionsData {
                transactions: vec![],
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[tokio::test]
    async fn one_invalid_item_writes_nothing() {
        let (state, user_id) = get_state();

        let result = create_transactions_in_bulk_endpoint(
            State(state.clone()),
            Extension(user_id),
            JsonBody(BulkTransactionsData {
                transactions: vec![item("Good", 1.0, Some("New")), item(" ", 2.0, None)],
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::ValidationError(message)) if message.starts_with("transaction 2")));
        assert_eq!(count_transactions(&state, user_id), 0);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_categories(user_id, &connection).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn zero_amount_item_is_rejected() {
        let (state, user_id) = get_state();

        let result = create_transactions_in_bulk_endpoint(
            State(state.clone()),
            Extension(user_id),
            JsonBody(BulkTransactionsData {
                transactions: vec![item("Fee", 2.0, None), item("Refund", 0.0, None)],
            }),
        )
        .await;

        assert!(matches!(
            result,
            Err(Error::ValidationError(message))
                if message.starts_with("transaction 2: amount must be a positive number")
        ));
        assert_eq!(count_transactions(&state, user_id), 0);
    }

    #[test]
    fn item_uses_api_field_names() {
        let item: BulkTransactionItem = serde_json::from_value(serde_json::json!({
            "date": "2024-07-02",
            "description": "Salary",
            "amount": 2500.0,
            "type": "INCOME",
        }))
        .unwrap();

        assert_eq!(item.transaction_type, TransactionType::Income);
        assert_eq!(item.category, None);
    }
}
