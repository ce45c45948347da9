//! Budgets cap how much a user wants to spend on something each month.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod core;
mod endpoints;
mod month;

pub use core::{
    Budget, BudgetFields, BudgetSpending, DEFAULT_BUDGET_COLOR, create_budget,
    create_budget_table, get_budget_spending, get_owned_budget,
};
pub use endpoints::{
    create_budget_endpoint, delete_budget_endpoint, get_budgets_endpoint, update_budget_endpoint,
};
pub use month::parse_month;

#[cfg(test)]
pub use core::{delete_budget, update_budget};

/// The state needed by the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone used to work out the current month.
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
