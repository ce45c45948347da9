//! Category deletion endpoint.

use axum::{Extension, extract::State, http::StatusCode};

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    category::{CategoryState, db::delete_category, get_owned_category},
    database_id::IdQuery,
    extract::QueryParams,
};

/// Delete one of the session user's categories.
///
/// Transactions and budgets in the category are kept and become uncategorized.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let category = get_owned_category(query.id, user_id, &connection)?;

    delete_category(category.id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
