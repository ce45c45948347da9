//! Category update endpoint.

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    category::{
        Category, CategoryEmoji, CategoryId, CategoryName, CategoryState, db::update_category,
        get_owned_category,
    },
    extract::JsonBody,
};

/// The data for updating a category. Omitting the emoji keeps the current one.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryData {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
}

/// Rename a category or change its emoji.
///
/// # Errors
///
/// Returns 404 if the category does not exist, 403 if it belongs to another
/// user, 409 if the new name is taken and 400 for invalid input.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<UpdateCategoryData>,
) -> Result<Json<Category>, Error> {
    let name = CategoryName::new(&data.name)?;

    let connection = lock_connection(&state.db_connection)?;
    let category = get_owned_category(data.id, user_id, &connection)?;

    let emoji = match data.emoji.as_deref() {
        Some(emoji) => CategoryEmoji::new(emoji)?,
        None => category.emoji,
    };

    update_category(category.id, name, emoji, &connection).map(Json)
}
