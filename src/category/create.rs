//! Category creation endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    category::{Category, CategoryEmoji, CategoryName, CategoryState, create_category},
    extract::JsonBody,
};

/// The data for creating a category. The emoji defaults to 📁.
#[derive(Debug, Deserialize)]
pub struct NewCategoryData {
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
}

/// Create a category for the session user.
///
/// # Errors
///
/// Returns a 400 error for a blank name or invalid emoji and a 409 error if
/// the user already has a category with that name (ignoring case).
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(new_category): JsonBody<NewCategoryData>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let name = CategoryName::new(&new_category.name)?;
    let emoji = CategoryEmoji::new_or_default(new_category.emoji.as_deref())?;

    let connection = lock_connection(&state.db_connection)?;
    let category = create_category(user_id, name, emoji, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}
