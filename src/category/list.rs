//! Category listing endpoint.

use axum::{Extension, Json, extract::State};

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    category::{Category, CategoryState, get_categories},
};

/// List the session user's categories ordered by name.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_categories(user_id, &connection).map(Json)
}
