//! Route handlers for creating, listing, updating and deleting budgets.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    budget::{
        Budget, BudgetFields, BudgetSpending, BudgetState, create_budget,
        core::{BudgetId, delete_budget, update_budget},
        get_budget_spending, get_owned_budget, parse_month,
    },
    category::CategoryId,
    database_id::IdQuery,
    extract::{JsonBody, QueryParams},
    timezone::get_local_date,
    transaction::{DateRange, ensure_category_is_usable},
};

/// The fields of a new budget.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudgetData {
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(alias = "budget")]
    pub amount: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// The replacement fields for an existing budget.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetData {
    pub id: BudgetId,
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(alias = "budget")]
    pub amount: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// The month to report spending for, e.g. `?month=2025-03`.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    pub month: Option<String>,
}

/// Create a budget for the session user.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<NewBudgetData>,
) -> Result<(StatusCode, Json<Budget>), Error> {
    let fields = BudgetFields::new(
        &data.name,
        data.emoji.as_deref(),
        data.amount,
        data.color.as_deref(),
        data.category_id,
    )?;

    let connection = lock_connection(&state.db_connection)?;
    ensure_category_is_usable(fields.category_id, user_id, &connection)?;
    let budget = create_budget(user_id, fields, &connection)?;

    Ok((StatusCode::CREATED, Json(budget)))
}

/// List the session user's budgets with how much was spent in the requested
/// month, which defaults to the current month.
pub async fn get_budgets_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<BudgetQuery>,
) -> Result<Json<Vec<BudgetSpending>>, Error> {
    let (year, month) = match query.month.as_deref() {
        Some(month) => parse_month(month)?,
        None => {
            let today = get_local_date(&state.local_timezone)?;
            (today.year(), today.month())
        }
    };
    let range = DateRange::month(year, month)?;

    let connection = lock_connection(&state.db_connection)?;
    let budgets = get_budget_spending(user_id, range, &connection)?;

    Ok(Json(budgets))
}

/// Replace one of the session user's budgets.
pub async fn update_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<UpdateBudgetData>,
) -> Result<Json<Budget>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let budget = get_owned_budget(data.id, user_id, &connection)?;

    let fields = BudgetFields::new(
        &data.name,
        data.emoji.as_deref(),
        data.amount,
        data.color.as_deref(),
        data.category_id,
    )?;
    ensure_category_is_usable(fields.category_id, user_id, &connection)?;

    let updated = update_budget(budget.id, fields, &connection)?;

    Ok(Json(updated))
}

/// Delete one of the session user's budgets.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let budget = get_owned_budget(query.id, user_id, &connection)?;

    delete_budget(budget.id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
