//! Categories group a user's transactions, e.g. 'Groceries' or 'Salary'.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    create_category, create_category_table, find_category_by_name, get_categories,
    get_owned_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryEmoji, CategoryId, CategoryName, category_name_key};
pub use edit::update_category_endpoint;
pub use list::get_categories_endpoint;

#[cfg(test)]
pub use db::{delete_category, get_category, update_category};

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
